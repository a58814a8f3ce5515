//! JSON output formatter

use crate::models::MarkMap;
use crate::output::FormatError;

/// Format a mark map as pretty-printed JSON
pub fn format_json(data: &MarkMap) -> Result<String, FormatError> {
    serde_json::to_string_pretty(data).map_err(FormatError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CategoryCounts, ContentType, DocumentMarks, MarkEntity, MarkKind, ScanMetadata, ScanStats,
    };
    use std::path::{Path, PathBuf};

    #[test]
    fn test_format_json() {
        let data = MarkMap {
            root: PathBuf::from("/proj"),
            files: vec![DocumentMarks {
                path: PathBuf::from("app.ts"),
                absolute_path: PathBuf::from("/proj/app.ts"),
                content_type: ContentType::TypeScript,
                total_lines: 3,
                marks: vec![MarkEntity::new(
                    MarkKind::Todo,
                    "add tests".to_string(),
                    Path::new("app.ts"),
                    1,
                    20,
                )],
            }],
            stats: ScanStats {
                total_files: 1,
                total_lines: 3,
                total_marks: 1,
                files_with_marks: 1,
                counts: CategoryCounts {
                    todos: 1,
                    ..Default::default()
                },
            },
            metadata: ScanMetadata {
                scan_duration_ms: 1,
                files_per_second: 1000.0,
                timestamp: "2024-01-01T00:00:00Z".to_string(),
                tool_version: "0.1.0".to_string(),
            },
        };

        let json = format_json(&data).unwrap();
        assert!(json.contains("\"kind\": \"TODO\""));
        assert!(json.contains("\"label\": \"add tests\""));
        assert!(json.contains("\"line_number\": 1"));
    }
}
