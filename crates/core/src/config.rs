//! Configuration module for the mark scanner
//!
//! This module provides the scanner's option set (tags, per-category pattern
//! lists, file-selection controls) and the ignore filtering logic used by
//! workspace-wide scans. Every option has a documented default; a missing
//! option never causes a hard failure.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Tags recognized when no per-category patterns are configured
pub const DEFAULT_TAGS: [&str; 8] = [
    "TODO", "FIXME", "NOTE", "INFO", "SECTION", "MARK", "BUG", "HACK",
];

/// Configuration for the mark scanner
///
/// Two recognition modes are supported: a flat tag list (legacy mode) and
/// per-category pattern lists. When any pattern list is non-empty the
/// pattern lists win; otherwise the tag list is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkConfig {
    /// Root directory for workspace scans
    pub root: PathBuf,

    /// Fixed tag names recognized in legacy mode
    pub tags: Vec<String>,

    /// Section-category patterns (structural marks)
    pub section_patterns: Vec<String>,

    /// Extra section patterns, tried after the base list
    pub additional_section_patterns: Vec<String>,

    /// Todo-category patterns
    pub todo_patterns: Vec<String>,

    /// Extra todo patterns, tried after the base list
    pub additional_todo_patterns: Vec<String>,

    /// Note-category patterns
    pub note_patterns: Vec<String>,

    /// Extra note patterns, tried after the base list
    pub additional_note_patterns: Vec<String>,

    /// Glob patterns selecting files for workspace scans (empty = all)
    pub include_patterns: Vec<String>,

    /// Glob patterns excluding files from workspace scans
    pub exclude_patterns: Vec<String>,

    /// Maximum number of files per workspace scan
    pub limit: Option<usize>,

    /// Whether method-signature children are recognized in script files
    pub scan_methods: bool,

    /// Number of threads for parallel processing
    pub threads: usize,

    /// Maximum file size to process (bytes)
    pub max_file_size: usize,

    /// Whether to follow symlinks
    pub follow_symlinks: bool,

    /// Whether to include hidden files
    pub include_hidden: bool,
}

impl Default for MarkConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tags: DEFAULT_TAGS.iter().map(|t| t.to_string()).collect(),
            section_patterns: Vec::new(),
            additional_section_patterns: Vec::new(),
            todo_patterns: Vec::new(),
            additional_todo_patterns: Vec::new(),
            note_patterns: Vec::new(),
            additional_note_patterns: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            limit: None,
            scan_methods: true,
            threads: num_cpus(),
            max_file_size: 10 * 1024 * 1024, // 10 MB
            follow_symlinks: false,
            include_hidden: false,
        }
    }
}

impl MarkConfig {
    /// Create new config with root directory
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    /// Set the recognized tag list (builder pattern)
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set section patterns (builder pattern)
    pub fn with_section_patterns(mut self, patterns: Vec<String>) -> Self {
        self.section_patterns = patterns;
        self
    }

    /// Set todo patterns (builder pattern)
    pub fn with_todo_patterns(mut self, patterns: Vec<String>) -> Self {
        self.todo_patterns = patterns;
        self
    }

    /// Set note patterns (builder pattern)
    pub fn with_note_patterns(mut self, patterns: Vec<String>) -> Self {
        self.note_patterns = patterns;
        self
    }

    /// Set include globs (builder pattern)
    pub fn with_include_patterns(mut self, patterns: Vec<String>) -> Self {
        self.include_patterns = patterns;
        self
    }

    /// Set exclude globs (builder pattern)
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Set the file limit for workspace scans (builder pattern)
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Enable or disable method-signature children (builder pattern)
    pub fn with_scan_methods(mut self, scan: bool) -> Self {
        self.scan_methods = scan;
        self
    }

    /// Set number of threads (builder pattern)
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set max file size (builder pattern)
    pub fn with_max_file_size(mut self, size: usize) -> Self {
        self.max_file_size = size;
        self
    }

    /// Set follow symlinks (builder pattern)
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set include hidden files (builder pattern)
    pub fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Effective section patterns: base list first, then additional
    pub fn effective_section_patterns(&self) -> impl Iterator<Item = &str> {
        self.section_patterns
            .iter()
            .chain(&self.additional_section_patterns)
            .map(String::as_str)
    }

    /// Effective todo patterns: base list first, then additional
    pub fn effective_todo_patterns(&self) -> impl Iterator<Item = &str> {
        self.todo_patterns
            .iter()
            .chain(&self.additional_todo_patterns)
            .map(String::as_str)
    }

    /// Effective note patterns: base list first, then additional
    pub fn effective_note_patterns(&self) -> impl Iterator<Item = &str> {
        self.note_patterns
            .iter()
            .chain(&self.additional_note_patterns)
            .map(String::as_str)
    }

    /// Whether any per-category pattern list is configured
    pub fn uses_pattern_rules(&self) -> bool {
        !(self.section_patterns.is_empty()
            && self.additional_section_patterns.is_empty()
            && self.todo_patterns.is_empty()
            && self.additional_todo_patterns.is_empty()
            && self.note_patterns.is_empty()
            && self.additional_note_patterns.is_empty())
    }
}

/// Get number of available CPUs
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Filter for selecting files during workspace scans
pub struct FileFilter {
    /// Gitignore rules
    gitignore: Option<Gitignore>,

    /// Include globs (None = include everything)
    include: Option<GlobSet>,

    /// User exclude globs
    exclude: GlobSet,

    /// Default ignore patterns
    default_ignores: GlobSet,

    /// Whether to include hidden files
    include_hidden: bool,
}

impl FileFilter {
    /// Create a new file filter from config
    pub fn new(config: &MarkConfig) -> Result<Self, ConfigError> {
        let gitignore = Self::build_gitignore(&config.root)?;

        let include = if config.include_patterns.is_empty() {
            None
        } else {
            Some(Self::build_globset(&config.include_patterns)?)
        };

        let exclude = Self::build_globset(&config.exclude_patterns)?;

        let default_patterns = vec![
            "**/node_modules/**",
            "**/.git/**",
            "**/__pycache__/**",
            "**/.venv/**",
            "**/venv/**",
            "**/dist/**",
            "**/build/**",
            "**/target/**",
            "**/coverage/**",
            "**/*.min.js",
            "**/*.bundle.js",
            "**/*.map",
            "**/vendor/**",
        ];
        let default_ignores = Self::build_globset(
            &default_patterns.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        )?;

        Ok(Self {
            gitignore,
            include,
            exclude,
            default_ignores,
            include_hidden: config.include_hidden,
        })
    }

    /// Build gitignore from root directory
    fn build_gitignore(root: &Path) -> Result<Option<Gitignore>, ConfigError> {
        let gitignore_path = root.join(".gitignore");
        if !gitignore_path.exists() {
            return Ok(None);
        }

        let mut builder = GitignoreBuilder::new(root);
        builder.add(&gitignore_path);

        match builder.build() {
            Ok(gi) => Ok(Some(gi)),
            Err(_) => Ok(None), // Ignore gitignore errors
        }
    }

    /// Build a globset from patterns
    fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob(e.to_string()))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| ConfigError::InvalidGlob(e.to_string()))
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let path_str = path.to_string_lossy();

        // Check hidden files
        if !self.include_hidden {
            if let Some(name) = path.file_name() {
                if name.to_string_lossy().starts_with('.') {
                    return true;
                }
            }
        }

        // Check default ignores
        if self.default_ignores.is_match(&*path_str) {
            return true;
        }

        // Check user excludes
        if self.exclude.is_match(&*path_str) {
            return true;
        }

        // Check gitignore
        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Check if a file matches the include globs (directories always pass)
    pub fn matches_include(&self, path: &Path) -> bool {
        match &self.include {
            Some(include) => include.is_match(&*path.to_string_lossy()),
            None => true,
        }
    }
}
