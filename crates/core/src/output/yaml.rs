//! YAML output formatter

use crate::models::MarkMap;
use crate::output::FormatError;

/// Format a mark map as YAML
pub fn format_yaml(data: &MarkMap) -> Result<String, FormatError> {
    serde_yaml::to_string(data).map_err(FormatError::from)
}
