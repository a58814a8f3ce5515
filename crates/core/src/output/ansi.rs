//! ANSI colored output formatter
//!
//! This module provides colorful terminal output for mark maps and
//! per-document outlines.

use crate::models::{DocumentMarks, MarkEntity, MarkKind, MarkMap};

// ANSI escape codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

const BRIGHT_RED: &str = "\x1b[91m";
const BRIGHT_GREEN: &str = "\x1b[92m";
const BRIGHT_YELLOW: &str = "\x1b[93m";
const BRIGHT_BLUE: &str = "\x1b[94m";

const BG_BLUE: &str = "\x1b[44m";

/// Get color for a mark kind
///
/// Unknown (custom) kinds fall back to a default presentation rather
/// than failing.
fn kind_color(kind: &MarkKind) -> &'static str {
    match kind {
        MarkKind::Section | MarkKind::Mark => BRIGHT_BLUE,
        MarkKind::Todo => BRIGHT_YELLOW,
        MarkKind::Fixme | MarkKind::Bug => BRIGHT_RED,
        MarkKind::Hack => MAGENTA,
        MarkKind::Note | MarkKind::Info => BRIGHT_GREEN,
        MarkKind::Method => CYAN,
        MarkKind::Custom(_) => WHITE,
    }
}

/// Get icon for a mark kind
fn kind_icon(kind: &MarkKind) -> &'static str {
    match kind {
        MarkKind::Section | MarkKind::Mark => "§",
        MarkKind::Todo => "✎",
        MarkKind::Fixme | MarkKind::Bug => "⚠",
        MarkKind::Hack => "⚒",
        MarkKind::Note | MarkKind::Info => "✦",
        MarkKind::Method => "ƒ",
        MarkKind::Custom(_) => "•",
    }
}

/// Format a workspace mark map as ANSI colored text
pub fn format_ansi(data: &MarkMap) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{}{}  Mark Scan Results  {}{}\n\n",
        BOLD, BG_BLUE, RESET, RESET
    ));

    output.push_str(&format!(
        "{}Root:{} {}\n\n",
        BOLD,
        RESET,
        data.root.display()
    ));

    output.push_str(&format!(
        "{}Files:{} {}  {}Lines:{} {}  {}Marks:{} {}\n\n",
        BOLD,
        RESET,
        data.stats.total_files,
        BOLD,
        RESET,
        data.stats.total_lines,
        BOLD,
        RESET,
        data.stats.total_marks
    ));

    for file in &data.files {
        if file.has_marks() {
            output.push_str(&format_document_ansi(file));
        }
    }

    output.push_str(&format!(
        "\n{}Scan completed in {}ms ({:.2} files/sec){}\n",
        DIM,
        data.metadata.scan_duration_ms,
        data.metadata.files_per_second,
        RESET
    ));

    output
}

/// Format a single document's marks as ANSI colored text
pub fn format_document_ansi(file: &DocumentMarks) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}{}{} {}({} lines){}\n",
        BOLD,
        file.path.display(),
        RESET,
        DIM,
        file.total_lines,
        RESET
    ));

    if file.marks.is_empty() {
        output.push_str(&format!("   {}no marks{}\n\n", DIM, RESET));
        return output;
    }

    for mark in &file.marks {
        output.push_str(&format_mark_ansi(mark, 1));
    }

    output.push('\n');
    output
}

/// Format a single mark with indentation
fn format_mark_ansi(mark: &MarkEntity, indent: usize) -> String {
    let mut output = String::new();
    let indent_str = "   ".repeat(indent);

    let color = kind_color(&mark.kind);
    let icon = kind_icon(&mark.kind);

    output.push_str(&format!(
        "{}{}{} {}{} {}{}{} {}{}{}",
        indent_str,
        color,
        icon,
        mark.kind.as_tag(),
        RESET,
        BOLD,
        mark.label,
        RESET,
        DIM,
        mark.description,
        RESET
    ));

    if let Some(ref writer) = mark.writer {
        output.push_str(&format!(" {}by {}{}", YELLOW, writer, RESET));
    }

    output.push('\n');

    for child in &mark.children {
        output.push_str(&format_mark_ansi(child, indent + 1));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_format_document_ansi() {
        let mut parent = MarkEntity::new(
            MarkKind::Mark,
            "Auth".to_string(),
            Path::new("app.ts"),
            0,
            14,
        );
        parent.children.push(MarkEntity::new(
            MarkKind::Method,
            "login()".to_string(),
            Path::new("app.ts"),
            2,
            20,
        ));

        let doc = DocumentMarks {
            path: PathBuf::from("app.ts"),
            absolute_path: PathBuf::from("/proj/app.ts"),
            content_type: ContentType::TypeScript,
            total_lines: 10,
            marks: vec![parent],
        };

        let output = format_document_ansi(&doc);
        assert!(output.contains("app.ts"));
        assert!(output.contains("MARK"));
        assert!(output.contains("Auth"));
        assert!(output.contains("login()"));
    }

    #[test]
    fn test_kind_icons() {
        assert_eq!(kind_icon(&MarkKind::Todo), "✎");
        assert_eq!(kind_icon(&MarkKind::Section), "§");
        assert_eq!(kind_icon(&MarkKind::Custom("REVIEW".into())), "•");
    }

    #[test]
    fn test_custom_kind_gets_default_presentation() {
        assert_eq!(kind_color(&MarkKind::Custom("ANYTHING".into())), WHITE);
    }
}
