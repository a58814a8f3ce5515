//! Output formatting module
//!
//! This module provides formatters for JSON, YAML, ANSI, and plain-text
//! summary output of mark maps and per-document mark lists.

pub mod ansi;
mod json;
mod yaml;

pub use ansi::{format_ansi, format_document_ansi};
pub use json::format_json;
pub use yaml::format_yaml;

use crate::models::{CategoryCounts, DocumentMarks, MarkEntity, MarkMap};
use thiserror::Error;

/// Output format errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Available output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format
    #[default]
    Json,
    /// YAML format
    Yaml,
    /// ANSI colored text
    Ansi,
    /// Plain text summary
    Summary,
}

/// Format a workspace mark map in the specified format
pub fn format_output(data: &MarkMap, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => format_json(data),
        OutputFormat::Yaml => format_yaml(data),
        OutputFormat::Ansi => Ok(format_ansi(data)),
        OutputFormat::Summary => Ok(format_summary(data)),
    }
}

/// Format a single document's marks in the specified format
pub fn format_document(data: &DocumentMarks, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).map_err(FormatError::from),
        OutputFormat::Yaml => serde_yaml::to_string(data).map_err(FormatError::from),
        OutputFormat::Ansi => Ok(format_document_ansi(data)),
        OutputFormat::Summary => Ok(format_document_summary(data)),
    }
}

/// Format counts the way the status summary presents them
fn format_counts(counts: &CategoryCounts) -> String {
    format!(
        "Sections: {}  TODOs: {}  Notes: {}",
        counts.sections, counts.todos, counts.notes
    )
}

/// Format as plain text summary
fn format_summary(data: &MarkMap) -> String {
    let mut output = String::new();

    output.push_str("Mark Scan Results\n");
    output.push_str("=================\n\n");
    output.push_str(&format!("Root: {}\n", data.root.display()));
    output.push_str(&format!("Total Files: {}\n", data.stats.total_files));
    output.push_str(&format!("Total Lines: {}\n", data.stats.total_lines));
    output.push_str(&format!("Total Marks: {}\n", data.stats.total_marks));
    output.push_str(&format!(
        "Files with marks: {}\n",
        data.stats.files_with_marks
    ));
    output.push_str(&format!("\n{}\n", format_counts(&data.stats.counts)));

    output.push_str(&format!(
        "\nScan Duration: {}ms\n",
        data.metadata.scan_duration_ms
    ));
    output.push_str(&format!(
        "Processing Speed: {:.2} files/sec\n",
        data.metadata.files_per_second
    ));

    output
}

/// Format a single document's marks as a plain text outline
fn format_document_summary(data: &DocumentMarks) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", data.path.display()));
    output.push_str(&format!("Lines: {}\n", data.total_lines));
    output.push_str(&format!("Marks: {}\n", data.total_marks()));
    output.push_str(&format!(
        "{}\n",
        format_counts(&CategoryCounts::tally(data.flatten()))
    ));

    if data.marks.is_empty() {
        output.push_str("\nNo marks found\n");
        return output;
    }

    output.push_str("\nOutline:\n");
    for mark in &data.marks {
        output.push_str(&format_mark_summary(mark, 0));
    }

    output
}

fn format_mark_summary(mark: &MarkEntity, indent: usize) -> String {
    let mut output = String::new();
    let indent_str = "  ".repeat(indent);

    output.push_str(&format!(
        "{}[{}] {} ({})\n",
        indent_str,
        mark.kind.as_tag(),
        mark.label,
        mark.description
    ));

    for child in &mark.children {
        output.push_str(&format_mark_summary(child, indent + 1));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentType, MarkKind, ScanMetadata, ScanStats};
    use std::path::{Path, PathBuf};

    fn test_document() -> DocumentMarks {
        let mut section = MarkEntity::new(
            MarkKind::Section,
            "Init".to_string(),
            Path::new("app.ts"),
            0,
            18,
        );
        section.children.push(MarkEntity::new(
            MarkKind::Method,
            "boot()".to_string(),
            Path::new("app.ts"),
            2,
            20,
        ));

        DocumentMarks {
            path: PathBuf::from("app.ts"),
            absolute_path: PathBuf::from("/proj/app.ts"),
            content_type: ContentType::TypeScript,
            total_lines: 12,
            marks: vec![
                section,
                MarkEntity::new(MarkKind::Todo, "wire config".into(), Path::new("app.ts"), 5, 22),
            ],
        }
    }

    fn test_map() -> MarkMap {
        let files = vec![test_document()];
        MarkMap {
            root: PathBuf::from("/proj"),
            stats: ScanStats {
                total_files: 1,
                total_lines: 12,
                total_marks: 3,
                files_with_marks: 1,
                counts: CategoryCounts {
                    sections: 1,
                    todos: 1,
                    notes: 0,
                    methods: 1,
                },
            },
            metadata: ScanMetadata {
                scan_duration_ms: 4,
                files_per_second: 250.0,
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                tool_version: "0.1.0".to_string(),
            },
            files,
        }
    }

    #[test]
    fn test_format_summary() {
        let output = format_output(&test_map(), OutputFormat::Summary).unwrap();
        assert!(output.contains("Total Marks: 3"));
        assert!(output.contains("Sections: 1  TODOs: 1  Notes: 0"));
    }

    #[test]
    fn test_format_document_summary() {
        let output = format_document(&test_document(), OutputFormat::Summary).unwrap();
        assert!(output.contains("[SECTION] Init (Line 1)"));
        assert!(output.contains("  [METHOD] boot() (Line 3)"));
        assert!(output.contains("[TODO] wire config"));
    }

    #[test]
    fn test_format_document_empty() {
        let mut doc = test_document();
        doc.marks.clear();
        let output = format_document(&doc, OutputFormat::Summary).unwrap();
        assert!(output.contains("No marks found"));
    }

    #[test]
    fn test_format_dispatch() {
        let map = test_map();
        assert!(format_output(&map, OutputFormat::Json).is_ok());
        assert!(format_output(&map, OutputFormat::Yaml).is_ok());
        assert!(format_output(&map, OutputFormat::Ansi).is_ok());
    }
}
