//! markscan-core - Core library for comment-mark scanning
//!
//! This crate provides the core functionality for extracting typed,
//! hierarchical comment marks (TODO, FIXME, SECTION, MARK, NOTE, ...) from
//! source code, one line at a time, against a configurable tag or pattern
//! set.
//!
//! # Features
//!
//! - **Fault-isolated patterns**: A malformed user pattern disables only
//!   its own rule; scanning never fails on bad configuration.
//! - **Two recognition modes**: a flat tag list (legacy) or per-category
//!   pattern lists with `heading`/`description`/`writer` named captures.
//! - **Hierarchy assembly**: SECTION/MARK group subsequent method
//!   signatures as children in script files.
//! - **Neighbor navigation**: next/previous mark relative to a cursor
//!   line, with wrap-around.
//! - **Multiple output formats**: JSON, YAML, ANSI-colored terminal
//!   output, and plain-text summaries.
//!
//! # Example
//!
//! ```rust,no_run
//! use markscan_core::{format_output, MarkConfig, MarkScanner, OutputFormat};
//! use std::path::PathBuf;
//!
//! // Create a scanner
//! let config = MarkConfig::new(PathBuf::from("."));
//! let scanner = MarkScanner::new(config).unwrap();
//!
//! // Scan the workspace
//! let result = scanner.scan().unwrap();
//!
//! // Format output
//! let json = format_output(&result, OutputFormat::Json).unwrap();
//! println!("{}", json);
//! ```

pub mod config;
pub mod models;
pub mod output;
pub mod pattern;
pub mod scanner;

// Re-exports for convenience
pub use config::{ConfigError, FileFilter, MarkConfig, DEFAULT_TAGS};
pub use models::{
    find_neighbor, flatten_marks, CategoryCounts, ContentType, Direction, DocumentMarks,
    MarkCategory, MarkEntity, MarkKind, MarkMap, ScanMetadata, ScanStats, Span,
};
pub use output::{format_document, format_output, FormatError, OutputFormat};
pub use pattern::{CompiledPattern, PatternMatch, RuleSet};
pub use scanner::{MarkScanner, ScanError};
