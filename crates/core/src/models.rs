//! Data models for comment-mark scanning
//!
//! This module defines the core data structures used throughout the markscan
//! tool, including mark kinds, mark entities, and per-file and workspace-wide
//! scan results.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Kind of a recognized mark
///
/// Fixed tags cover the built-in annotation vocabulary; `Custom` carries any
/// user-configured tag (uppercase-normalized). `Method` is reserved for child
/// entities produced by signature recognition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Section,
    Mark,
    Todo,
    Fixme,
    Note,
    Info,
    Bug,
    Hack,
    Method,
    Custom(String),
}

impl MarkKind {
    /// Resolve a tag string to a kind, case-insensitively
    pub fn from_tag(tag: &str) -> Self {
        let upper = tag.trim().to_uppercase();
        match upper.as_str() {
            "SECTION" => MarkKind::Section,
            "MARK" => MarkKind::Mark,
            "TODO" => MarkKind::Todo,
            "FIXME" => MarkKind::Fixme,
            "NOTE" => MarkKind::Note,
            "INFO" => MarkKind::Info,
            "BUG" => MarkKind::Bug,
            "HACK" => MarkKind::Hack,
            "METHOD" => MarkKind::Method,
            _ => MarkKind::Custom(upper),
        }
    }

    /// Uppercase tag form of this kind
    pub fn as_tag(&self) -> &str {
        match self {
            MarkKind::Section => "SECTION",
            MarkKind::Mark => "MARK",
            MarkKind::Todo => "TODO",
            MarkKind::Fixme => "FIXME",
            MarkKind::Note => "NOTE",
            MarkKind::Info => "INFO",
            MarkKind::Bug => "BUG",
            MarkKind::Hack => "HACK",
            MarkKind::Method => "METHOD",
            MarkKind::Custom(tag) => tag,
        }
    }

    /// Structural kinds own children and group outline entries
    pub fn is_structural(&self) -> bool {
        matches!(self, MarkKind::Section | MarkKind::Mark)
    }

    /// Generic category used for summary aggregation
    pub fn category(&self) -> MarkCategory {
        match self {
            MarkKind::Section | MarkKind::Mark => MarkCategory::Section,
            MarkKind::Todo | MarkKind::Fixme | MarkKind::Bug | MarkKind::Hack => {
                MarkCategory::Todo
            }
            MarkKind::Note | MarkKind::Info | MarkKind::Custom(_) => MarkCategory::Note,
            MarkKind::Method => MarkCategory::Method,
        }
    }
}

impl Serialize for MarkKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for MarkKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(MarkKind::from_tag(&tag))
    }
}

/// Generic categories a kind collapses into for status summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkCategory {
    Section,
    Todo,
    Note,
    Method,
}

/// Byte-column span of a matched line, used for selection/highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Starting column (always 0: a mark covers its whole line)
    pub start: usize,

    /// Ending column (byte length of the line)
    pub end: usize,
}

impl Span {
    /// Span covering an entire line of the given byte length
    pub fn whole_line(len: usize) -> Self {
        Self { start: 0, end: len }
    }
}

/// One recognized annotation or structural item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkEntity {
    /// Stable identifier, unique per (source, line) within a scan
    pub id: String,

    /// Originating document/file
    pub source: PathBuf,

    /// Zero-based line index within the source at time of scan
    pub line_number: usize,

    /// Start/end columns covering the matched line
    pub span: Span,

    /// The mark's category (fixed tag, custom tag, or generic category)
    pub kind: MarkKind,

    /// Extracted annotation text, trimmed
    pub label: String,

    /// Positional descriptor, purely presentational
    pub description: String,

    /// Nesting depth inferred from a heading-style prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_level: Option<usize>,

    /// Attributed author from the pattern's `writer` capture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer: Option<String>,

    /// Child marks; populated only for structural kinds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MarkEntity>,
}

impl MarkEntity {
    /// Create a new mark for a matched line
    pub fn new(
        kind: MarkKind,
        label: String,
        source: &Path,
        line_number: usize,
        line_len: usize,
    ) -> Self {
        let id = if kind == MarkKind::Method {
            format!("{}:method:{}", source.display(), line_number)
        } else {
            format!("{}:{}", source.display(), line_number)
        };

        Self {
            id,
            source: source.to_path_buf(),
            line_number,
            span: Span::whole_line(line_len),
            kind,
            label,
            description: format!("Line {}", line_number + 1),
            heading_level: None,
            writer: None,
            children: Vec::new(),
        }
    }

    /// Flatten this mark and its children into a line-ordered list
    pub fn flatten(&self) -> Vec<&MarkEntity> {
        let mut result = vec![self];
        for child in &self.children {
            result.extend(child.flatten());
        }
        result
    }

    /// Count this mark and all children
    pub fn total_marks(&self) -> usize {
        1 + self.children.iter().map(|c| c.total_marks()).sum::<usize>()
    }
}

/// Flatten a top-level mark sequence, children included
///
/// Children lie strictly between their parent and the next structural mark,
/// so the depth-first order is also line order.
pub fn flatten_marks(marks: &[MarkEntity]) -> Vec<&MarkEntity> {
    marks.iter().flat_map(|m| m.flatten()).collect()
}

/// Direction for neighbor navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Find the neighboring mark relative to a cursor line, with wrap-around
///
/// `flat` must be line-ordered (as produced by [`flatten_marks`]). `Next`
/// resolves to the first mark strictly below the cursor, wrapping to the
/// first mark; `Previous` to the last mark strictly above, wrapping to the
/// last mark.
pub fn find_neighbor<'a>(
    flat: &[&'a MarkEntity],
    cursor_line: usize,
    direction: Direction,
) -> Option<&'a MarkEntity> {
    if flat.is_empty() {
        return None;
    }

    match direction {
        Direction::Next => flat
            .iter()
            .find(|m| m.line_number > cursor_line)
            .or_else(|| flat.first())
            .copied(),
        Direction::Previous => flat
            .iter()
            .rev()
            .find(|m| m.line_number < cursor_line)
            .or_else(|| flat.last())
            .copied(),
    }
}

/// Content type of a scanned source, from its file extension
///
/// Script-family files additionally get method-signature (child) recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    JavaScript,
    TypeScript,
    Other,
}

impl ContentType {
    /// Determine content type from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => ContentType::JavaScript,
            "ts" | "mts" | "cts" | "tsx" => ContentType::TypeScript,
            _ => ContentType::Other,
        }
    }

    /// Determine content type from a path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(ContentType::Other)
    }

    /// Whether method-signature children are recognized for this type
    pub fn supports_method_scan(&self) -> bool {
        matches!(self, ContentType::JavaScript | ContentType::TypeScript)
    }
}

/// Per-category mark counts, mirroring the status summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub sections: usize,
    pub todos: usize,
    pub notes: usize,
    pub methods: usize,
}

impl CategoryCounts {
    /// Tally counts over a mark list
    pub fn tally<'a>(marks: impl IntoIterator<Item = &'a MarkEntity>) -> Self {
        let mut counts = Self::default();
        for mark in marks {
            match mark.kind.category() {
                MarkCategory::Section => counts.sections += 1,
                MarkCategory::Todo => counts.todos += 1,
                MarkCategory::Note => counts.notes += 1,
                MarkCategory::Method => counts.methods += 1,
            }
        }
        counts
    }

    /// Total across all categories
    pub fn total(&self) -> usize {
        self.sections + self.todos + self.notes + self.methods
    }

    /// Merge another tally into this one
    pub fn merge(&mut self, other: &CategoryCounts) {
        self.sections += other.sections;
        self.todos += other.todos;
        self.notes += other.notes;
        self.methods += other.methods;
    }
}

/// Marks extracted from a single source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMarks {
    /// Path to the source file (relative to the scan root)
    pub path: PathBuf,

    /// Absolute path to the source file
    pub absolute_path: PathBuf,

    /// Content type of the source file
    pub content_type: ContentType,

    /// Total number of lines in the file
    pub total_lines: usize,

    /// Top-level marks in line order
    pub marks: Vec<MarkEntity>,
}

impl DocumentMarks {
    /// Total marks including children
    pub fn total_marks(&self) -> usize {
        self.marks.iter().map(|m| m.total_marks()).sum()
    }

    /// Flatten all marks into a line-ordered list
    pub fn flatten(&self) -> Vec<&MarkEntity> {
        flatten_marks(&self.marks)
    }

    /// Whether any mark was found
    pub fn has_marks(&self) -> bool {
        !self.marks.is_empty()
    }
}

/// Workspace-wide scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkMap {
    /// Scan root directory
    pub root: PathBuf,

    /// All scanned files that produced marks
    pub files: Vec<DocumentMarks>,

    /// Summary statistics
    pub stats: ScanStats,

    /// Scan metadata
    pub metadata: ScanMetadata,
}

/// Summary statistics for a workspace scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStats {
    /// Total files scanned
    pub total_files: usize,

    /// Total lines across all files
    pub total_lines: usize,

    /// Total marks found
    pub total_marks: usize,

    /// Files that produced at least one mark
    pub files_with_marks: usize,

    /// Per-category breakdown
    pub counts: CategoryCounts,
}

/// Metadata about the scan operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    /// Duration of scan in milliseconds
    pub scan_duration_ms: u64,

    /// Files processed per second
    pub files_per_second: f64,

    /// ISO timestamp of scan
    pub timestamp: String,

    /// Tool version
    pub tool_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark_at(line: usize) -> MarkEntity {
        MarkEntity::new(
            MarkKind::Todo,
            format!("task {line}"),
            Path::new("test.rs"),
            line,
            20,
        )
    }

    #[test]
    fn test_kind_from_tag_case_insensitive() {
        assert_eq!(MarkKind::from_tag("todo"), MarkKind::Todo);
        assert_eq!(MarkKind::from_tag("Fixme"), MarkKind::Fixme);
        assert_eq!(MarkKind::from_tag("SECTION"), MarkKind::Section);
        assert_eq!(
            MarkKind::from_tag("review"),
            MarkKind::Custom("REVIEW".to_string())
        );
    }

    #[test]
    fn test_structural_kinds() {
        assert!(MarkKind::Section.is_structural());
        assert!(MarkKind::Mark.is_structural());
        assert!(!MarkKind::Todo.is_structural());
        assert!(!MarkKind::Custom("REVIEW".into()).is_structural());
    }

    #[test]
    fn test_entity_id_and_description() {
        let mark = mark_at(4);
        assert_eq!(mark.id, "test.rs:4");
        assert_eq!(mark.description, "Line 5");
        assert_eq!(mark.span, Span { start: 0, end: 20 });
    }

    #[test]
    fn test_neighbor_navigation_with_wrap() {
        let marks: Vec<MarkEntity> = [2, 10, 20].into_iter().map(mark_at).collect();
        let flat: Vec<&MarkEntity> = marks.iter().collect();

        let next = find_neighbor(&flat, 15, Direction::Next).unwrap();
        assert_eq!(next.line_number, 20);
        let prev = find_neighbor(&flat, 15, Direction::Previous).unwrap();
        assert_eq!(prev.line_number, 10);

        // Wrap-around at both ends
        let wrapped_next = find_neighbor(&flat, 25, Direction::Next).unwrap();
        assert_eq!(wrapped_next.line_number, 2);
        let wrapped_prev = find_neighbor(&flat, 1, Direction::Previous).unwrap();
        assert_eq!(wrapped_prev.line_number, 20);
    }

    #[test]
    fn test_neighbor_empty() {
        assert!(find_neighbor(&[], 5, Direction::Next).is_none());
    }

    #[test]
    fn test_flatten_includes_children() {
        let mut parent = MarkEntity::new(
            MarkKind::Mark,
            "Auth".to_string(),
            Path::new("a.ts"),
            0,
            15,
        );
        parent.children.push(MarkEntity::new(
            MarkKind::Method,
            "login()".to_string(),
            Path::new("a.ts"),
            2,
            25,
        ));

        let marks = vec![parent, mark_at(5)];
        let flat = flatten_marks(&marks);
        let lines: Vec<usize> = flat.iter().map(|m| m.line_number).collect();
        assert_eq!(lines, vec![0, 2, 5]);
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(ContentType::from_extension("ts"), ContentType::TypeScript);
        assert_eq!(ContentType::from_extension("jsx"), ContentType::JavaScript);
        assert_eq!(ContentType::from_extension("py"), ContentType::Other);
        assert!(ContentType::TypeScript.supports_method_scan());
        assert!(!ContentType::Other.supports_method_scan());
    }

    #[test]
    fn test_category_counts() {
        let marks = vec![
            MarkEntity::new(MarkKind::Section, "s".into(), Path::new("x"), 0, 5),
            MarkEntity::new(MarkKind::Todo, "t".into(), Path::new("x"), 1, 5),
            MarkEntity::new(MarkKind::Fixme, "f".into(), Path::new("x"), 2, 5),
            MarkEntity::new(MarkKind::Note, "n".into(), Path::new("x"), 3, 5),
        ];
        let counts = CategoryCounts::tally(marks.iter());
        assert_eq!(counts.sections, 1);
        assert_eq!(counts.todos, 2);
        assert_eq!(counts.notes, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_kind_serde_round_trip() {
        let json = serde_json::to_string(&MarkKind::Custom("REVIEW".into())).unwrap();
        assert_eq!(json, "\"REVIEW\"");
        let kind: MarkKind = serde_json::from_str("\"fixme\"").unwrap();
        assert_eq!(kind, MarkKind::Fixme);
    }
}
