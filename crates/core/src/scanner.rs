//! Mark scanner module
//!
//! This module provides the line-level, document-level, and workspace-level
//! scanning drivers. Scanning never fails on malformed input: bad patterns
//! are disabled at compile time, unreadable files yield empty results.

use crate::config::{ConfigError, FileFilter, MarkConfig};
use crate::models::{
    CategoryCounts, ContentType, DocumentMarks, MarkEntity, MarkKind, MarkMap, ScanMetadata,
    ScanStats,
};
use crate::pattern::RuleSet;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

/// Scanner errors
///
/// These can only arise while (re)building a scanner or its thread pool;
/// scanning itself absorbs all malformed-input conditions.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

/// Compiled scanner state: config plus the rule table and file filter
/// derived from it. Rebuilt as a unit on reconfigure and swapped behind an
/// `Arc`, so an in-flight scan never observes a half-updated rule set.
struct ScannerState {
    config: MarkConfig,
    rules: RuleSet,
    filter: FileFilter,
}

/// Main mark scanner
pub struct MarkScanner {
    state: RwLock<Arc<ScannerState>>,
}

impl MarkScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: MarkConfig) -> Result<Self, ScanError> {
        Ok(Self {
            state: RwLock::new(Arc::new(Self::build_state(config)?)),
        })
    }

    /// Replace the configuration, recompiling patterns and rule tables
    ///
    /// Reload is explicit: stale compiled patterns are never silently
    /// reused across a configuration change.
    pub fn reconfigure(&self, config: MarkConfig) -> Result<(), ScanError> {
        let state = Arc::new(Self::build_state(config)?);
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        *guard = state;
        Ok(())
    }

    fn build_state(config: MarkConfig) -> Result<ScannerState, ScanError> {
        let filter = FileFilter::new(&config)?;
        let rules = RuleSet::build(&config);
        Ok(ScannerState {
            config,
            rules,
            filter,
        })
    }

    /// Snapshot the current state for one scan
    fn state(&self) -> Arc<ScannerState> {
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Scan a single line, returning at most one mark (first-match-wins)
    pub fn scan_line(&self, line: &str, line_number: usize, source: &Path) -> Option<MarkEntity> {
        let state = self.state();
        line_entity(&state.rules, line, line_number, source)
    }

    /// Scan a document's text with hierarchy assembly
    ///
    /// Single forward pass: structural marks (SECTION/MARK) become the
    /// current parent; in script files, lines matching the method recognizer
    /// attach to the current parent as children. A method seen before any
    /// structural mark is dropped.
    pub fn scan_document(&self, source: &Path, text: &str) -> Vec<MarkEntity> {
        let state = self.state();
        let content_type = ContentType::from_path(source);
        let scan_methods = content_type.supports_method_scan();

        let mut marks: Vec<MarkEntity> = Vec::new();
        let mut current_parent: Option<usize> = None;

        for (line_number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(mark) = line_entity(&state.rules, line, line_number, source) {
                let structural = mark.kind.is_structural();
                marks.push(mark);
                if structural {
                    current_parent = Some(marks.len() - 1);
                }
                continue;
            }

            if scan_methods {
                if let Some(parent) = current_parent {
                    if let Some(label) = state.rules.match_method(line) {
                        marks[parent].children.push(MarkEntity::new(
                            MarkKind::Method,
                            label,
                            source,
                            line_number,
                            line.len(),
                        ));
                    }
                }
            }
        }

        marks
    }

    /// Flat scan of a file on disk: no hierarchy, no method children
    ///
    /// Never fails: any read or decoding error yields an empty result.
    pub fn scan_file(&self, path: &Path) -> Vec<MarkEntity> {
        let state = self.state();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
                return Vec::new();
            }
        };

        flat_marks(&state.rules, &text, path)
    }

    /// Scan the configured root directory and return a mark map
    pub fn scan(&self) -> Result<MarkMap, ScanError> {
        let state = self.state();
        let start = Instant::now();

        let mut source_files = Self::find_source_files(&state);
        if let Some(limit) = state.config.limit {
            source_files.truncate(limit);
        }

        let files: Vec<DocumentMarks> = if state.config.threads == 1 {
            source_files
                .iter()
                .filter_map(|path| Self::scan_workspace_file(&state, path))
                .collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(state.config.threads)
                .build()
                .map_err(|e| ScanError::ThreadPoolError(e.to_string()))?;

            pool.install(|| {
                source_files
                    .par_iter()
                    .filter_map(|path| Self::scan_workspace_file(&state, path))
                    .collect()
            })
        };

        let stats = calculate_stats(&files);

        let duration = start.elapsed();
        let file_count = files.len();
        let metadata = ScanMetadata {
            scan_duration_ms: duration.as_millis() as u64,
            files_per_second: if duration.as_secs_f64() > 0.0 {
                file_count as f64 / duration.as_secs_f64()
            } else {
                file_count as f64
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(MarkMap {
            root: state.config.root.clone(),
            files,
            stats,
            metadata,
        })
    }

    /// Find all files matching the configured filters
    fn find_source_files(state: &ScannerState) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&state.config.root)
            .follow_links(state.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // The root itself is never filtered, only its contents
                if e.depth() == 0 {
                    return true;
                }
                if e.file_type().is_dir() {
                    return !state.filter.should_ignore(e.path(), true);
                }
                true
            });

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();

            if state.filter.should_ignore(path, false) {
                continue;
            }

            if !state.filter.matches_include(path) {
                continue;
            }

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() as usize > state.config.max_file_size {
                    continue;
                }
            }

            files.push(path.to_path_buf());
        }

        files
    }

    /// Flat-scan a single workspace file into its document entry
    ///
    /// Workspace sweeps cover files not open in an editor, so hierarchy and
    /// method recognition are omitted. Unreadable or non-UTF-8 files
    /// contribute nothing.
    fn scan_workspace_file(state: &ScannerState, path: &Path) -> Option<DocumentMarks> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "skipping unreadable file");
                return None;
            }
        };

        let relative_path = path
            .strip_prefix(&state.config.root)
            .unwrap_or(path)
            .to_path_buf();
        let absolute_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let marks = flat_marks(&state.rules, &text, &relative_path);

        Some(DocumentMarks {
            path: relative_path,
            absolute_path,
            content_type: ContentType::from_path(path),
            total_lines: text.lines().count(),
            marks,
        })
    }
}

/// Recognize one line against the rule table and build its mark
fn line_entity(
    rules: &RuleSet,
    line: &str,
    line_number: usize,
    source: &Path,
) -> Option<MarkEntity> {
    if line.trim().is_empty() {
        return None;
    }

    let found = rules.match_line(line)?;
    let mut mark = MarkEntity::new(found.kind, found.label, source, line_number, line.len());
    mark.heading_level = found.heading_level;
    mark.writer = found.writer;
    Some(mark)
}

/// Flat, stateless map over a text's lines
fn flat_marks(rules: &RuleSet, text: &str, source: &Path) -> Vec<MarkEntity> {
    text.lines()
        .enumerate()
        .filter_map(|(line_number, line)| line_entity(rules, line, line_number, source))
        .collect()
}

/// Calculate scan statistics
fn calculate_stats(files: &[DocumentMarks]) -> ScanStats {
    let total_files = files.len();
    let total_lines: usize = files.iter().map(|f| f.total_lines).sum();
    let total_marks: usize = files.iter().map(|f| f.total_marks()).sum();
    let files_with_marks = files.iter().filter(|f| f.has_marks()).count();

    let mut counts = CategoryCounts::default();
    for file in files {
        counts.merge(&CategoryCounts::tally(file.flatten()));
    }

    ScanStats {
        total_files,
        total_lines,
        total_marks,
        files_with_marks,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn scanner() -> MarkScanner {
        MarkScanner::new(MarkConfig::default()).unwrap()
    }

    #[test]
    fn test_scan_line_extracts_label_and_line() {
        let scanner = scanner();
        let mark = scanner
            .scan_line("// TODO: add JWT validation", 7, Path::new("auth.ts"))
            .unwrap();

        assert_eq!(mark.kind, MarkKind::Todo);
        assert_eq!(mark.label, "add JWT validation");
        assert_eq!(mark.line_number, 7);
        assert_eq!(mark.description, "Line 8");
        assert_eq!(mark.id, "auth.ts:7");
    }

    #[test]
    fn test_blank_lines_never_produce_marks() {
        let scanner = scanner();
        assert!(scanner.scan_line("", 0, Path::new("x.ts")).is_none());
        assert!(scanner.scan_line("   \t  ", 1, Path::new("x.ts")).is_none());
    }

    #[test]
    fn test_document_hierarchy() {
        let scanner = scanner();
        let text = "// MARK: Auth\nfunction login() {}\n// MARK: Users\nfunction createUser() {}\n";
        let marks = scanner.scan_document(Path::new("app.ts"), text);

        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].label, "Auth");
        assert_eq!(marks[0].children.len(), 1);
        assert_eq!(marks[0].children[0].label, "login()");
        assert_eq!(marks[0].children[0].kind, MarkKind::Method);
        assert_eq!(marks[1].label, "Users");
        assert_eq!(marks[1].children.len(), 1);
        assert_eq!(marks[1].children[0].label, "createUser()");
    }

    #[test]
    fn test_method_before_structural_mark_is_dropped() {
        let scanner = scanner();
        let text = "function orphan() {}\n// MARK: Group\nfunction adopted() {}\n";
        let marks = scanner.scan_document(Path::new("app.ts"), text);

        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].children.len(), 1);
        assert_eq!(marks[0].children[0].label, "adopted()");
    }

    #[test]
    fn test_methods_only_in_script_files() {
        let scanner = scanner();
        let text = "// MARK: Group\nfunction helper() {}\n";
        let marks = scanner.scan_document(Path::new("script.py"), text);

        assert_eq!(marks.len(), 1);
        assert!(marks[0].children.is_empty());
    }

    #[test]
    fn test_methods_disabled_by_config() {
        let scanner =
            MarkScanner::new(MarkConfig::default().with_scan_methods(false)).unwrap();
        let text = "// MARK: Group\nfunction helper() {}\n";
        let marks = scanner.scan_document(Path::new("app.ts"), text);

        assert_eq!(marks.len(), 1);
        assert!(marks[0].children.is_empty());
    }

    #[test]
    fn test_non_structural_marks_stay_top_level() {
        let scanner = scanner();
        let text = "// MARK: Auth\n// TODO: rotate keys\nfunction login() {}\n";
        let marks = scanner.scan_document(Path::new("app.ts"), text);

        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].kind, MarkKind::Mark);
        assert_eq!(marks[1].kind, MarkKind::Todo);
        // The TODO does not steal the parent pointer
        assert_eq!(marks[0].children.len(), 1);
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let scanner = scanner();
        let text = "// SECTION: Init\n// TODO: wire up config\nx = 1\n// NOTE: pure function\n";

        let first = scanner.scan_document(Path::new("app.py"), text);
        let second = scanner.scan_document(Path::new("app.py"), text);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.line_number, b.line_number);
            assert_eq!(a.label, b.label);
            assert_eq!(a.id, b.id);
        }
    }

    #[test]
    fn test_scan_file_missing_path_returns_empty() {
        let scanner = scanner();
        let marks = scanner.scan_file(Path::new("/does/not/exist.ts"));
        assert!(marks.is_empty());
    }

    #[test]
    fn test_scan_file_is_flat() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ts");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "// MARK: Auth\nfunction login() {{}}\n// TODO: tokens").unwrap();

        let scanner = scanner();
        let marks = scanner.scan_file(&path);

        assert_eq!(marks.len(), 2);
        assert!(marks.iter().all(|m| m.children.is_empty()));
    }

    #[test]
    fn test_reconfigure_swaps_rules() {
        let scanner = scanner();
        assert!(scanner
            .scan_line("// TODO: before", 0, Path::new("x.ts"))
            .is_some());

        scanner
            .reconfigure(MarkConfig::default().with_tags(vec!["XXX".into()]))
            .unwrap();

        assert!(scanner
            .scan_line("// TODO: after", 0, Path::new("x.ts"))
            .is_none());
        let mark = scanner
            .scan_line("// XXX: new tag", 0, Path::new("x.ts"))
            .unwrap();
        assert_eq!(mark.kind, MarkKind::Custom("XXX".into()));
    }

    #[test]
    fn test_scan_line_carries_heading_and_writer() {
        let config = MarkConfig::default().with_section_patterns(vec![
            r"//\s*(?P<heading>#+)\s*(?P<description>.*?)\s*@(?P<writer>\w+)$".into(),
        ]);
        let scanner = MarkScanner::new(config).unwrap();

        let mark = scanner
            .scan_line("// ## Request pipeline @bob", 12, Path::new("srv.ts"))
            .unwrap();

        assert_eq!(mark.kind, MarkKind::Section);
        assert_eq!(mark.label, "Request pipeline");
        assert_eq!(mark.heading_level, Some(2));
        assert_eq!(mark.writer.as_deref(), Some("bob"));
    }

    #[test]
    fn test_invalid_user_pattern_does_not_break_scanner() {
        let config = MarkConfig::default()
            .with_todo_patterns(vec!["(bad[".into(), r"//\s*TODO[:\s]+(?P<description>.*)".into()]);
        let scanner = MarkScanner::new(config).unwrap();

        let mark = scanner
            .scan_line("// TODO: survives bad sibling", 3, Path::new("x.rs"))
            .unwrap();
        assert_eq!(mark.label, "survives bad sibling");
    }

    fn create_test_project() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();

        let mut ts = fs::File::create(root.join("app.ts")).unwrap();
        writeln!(
            ts,
            "// SECTION: Setup\n// TODO: add validation\nconst x = 1;\n// NOTE: pure"
        )
        .unwrap();

        let mut py = fs::File::create(root.join("job.py")).unwrap();
        writeln!(py, "# FIXME: flaky on CI\nprint('hi')").unwrap();

        let mut plain = fs::File::create(root.join("README.md")).unwrap();
        writeln!(plain, "no annotations here").unwrap();

        (dir, root)
    }

    #[test]
    fn test_workspace_scan() {
        let (_dir, root) = create_test_project();
        let scanner = MarkScanner::new(MarkConfig::new(root)).unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(result.stats.total_files, 3);
        assert_eq!(result.stats.files_with_marks, 2);
        assert_eq!(result.stats.counts.sections, 1);
        assert_eq!(result.stats.counts.todos, 2); // TODO + FIXME
        assert_eq!(result.stats.counts.notes, 1);
        assert_eq!(result.stats.total_marks, 4);
    }

    #[test]
    fn test_workspace_scan_include_patterns() {
        let (_dir, root) = create_test_project();
        let config = MarkConfig::new(root).with_include_patterns(vec!["**/*.py".into()]);
        let scanner = MarkScanner::new(config).unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(result.stats.total_files, 1);
        assert_eq!(result.stats.counts.todos, 1);
    }

    #[test]
    fn test_workspace_scan_limit() {
        let (_dir, root) = create_test_project();
        let config = MarkConfig::new(root).with_limit(Some(1)).with_threads(1);
        let scanner = MarkScanner::new(config).unwrap();
        let result = scanner.scan().unwrap();

        assert_eq!(result.stats.total_files, 1);
    }
}
