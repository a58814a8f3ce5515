//! Pattern compilation for mark recognition
//!
//! This module turns user-supplied pattern strings into safely-executable
//! line matchers and assembles them into the priority-ordered rule table the
//! scanner runs per line. A malformed pattern disables only its own rule:
//! compilation logs the failure and yields a matcher that never matches, so
//! one bad user pattern can never break the scan.

use crate::config::MarkConfig;
use crate::models::MarkKind;
use regex::Regex;

/// Named capture group conventions understood by the compiler
const GROUP_TAG: &str = "tag";
const GROUP_HEADING: &str = "heading";
const GROUP_DESCRIPTION: &str = "description";
const GROUP_WRITER: &str = "writer";

/// A compiled, always-safe line matcher
///
/// Invalid pattern strings compile to the disabled variant, which matches
/// no input.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Option<Regex>,
    source: String,
}

/// Captures extracted from a successful pattern match
#[derive(Debug, Clone)]
pub struct PatternMatch {
    /// Matched tag name, when the pattern captures one
    pub tag: Option<String>,

    /// Extracted annotation text, trimmed (whole match when no
    /// `description` group is present)
    pub label: String,

    /// Length of the `heading` capture, when present and non-empty
    pub heading_level: Option<usize>,

    /// Trimmed `writer` capture, when present and non-empty
    pub writer: Option<String>,
}

impl CompiledPattern {
    /// Compile a pattern string, recovering from syntax errors
    ///
    /// Never fails: a malformed pattern is logged and replaced with a
    /// matcher that matches nothing.
    pub fn compile(pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => Self {
                regex: Some(regex),
                source: pattern.to_string(),
            },
            Err(err) => {
                tracing::warn!(pattern, error = %err, "invalid mark pattern, rule disabled");
                Self::never(pattern)
            }
        }
    }

    /// A matcher that matches no input
    pub fn never(pattern: &str) -> Self {
        Self {
            regex: None,
            source: pattern.to_string(),
        }
    }

    /// Whether this matcher was disabled by a compilation failure
    pub fn is_disabled(&self) -> bool {
        self.regex.is_none()
    }

    /// The original pattern string
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Test a line, exposing matched groups by name on success
    pub fn match_line(&self, line: &str) -> Option<PatternMatch> {
        let regex = self.regex.as_ref()?;
        let caps = regex.captures(line)?;

        let label = caps
            .name(GROUP_DESCRIPTION)
            .map(|m| m.as_str())
            .or_else(|| caps.get(0).map(|m| m.as_str()))
            .unwrap_or_default()
            .trim()
            .to_string();

        let tag = caps.name(GROUP_TAG).map(|m| m.as_str().to_string());

        let heading_level = caps
            .name(GROUP_HEADING)
            .map(|m| m.as_str().chars().count())
            .filter(|n| *n > 0);

        let writer = caps
            .name(GROUP_WRITER)
            .map(|m| m.as_str().trim().to_string())
            .filter(|w| !w.is_empty());

        Some(PatternMatch {
            tag,
            label,
            heading_level,
            writer,
        })
    }
}

/// How a rule resolves the kind of a matched line
#[derive(Debug, Clone)]
enum RuleKind {
    /// Pattern-mode rule: kind fixed by the rule's category
    Fixed(MarkKind),

    /// Legacy-mode rule: kind taken from the `tag` capture
    TagTable,
}

/// One (kind, matcher) entry in the priority-ordered rule table
#[derive(Debug, Clone)]
struct Rule {
    kind: RuleKind,
    pattern: CompiledPattern,
}

/// A line recognized by the rule table
#[derive(Debug, Clone)]
pub struct LineMatch {
    pub kind: MarkKind,
    pub label: String,
    pub heading_level: Option<usize>,
    pub writer: Option<String>,
}

/// Secondary recognizer for declarative method/function signatures
#[derive(Debug, Clone)]
pub struct MethodRule {
    signature: CompiledPattern,
    control_flow: CompiledPattern,
}

/// Matches named function/method/class-member definitions in script files.
/// The name capture deliberately stops at the first `(`, `=` or `:` so that
/// both classic declarations and arrow-function bindings are caught.
const METHOD_SIGNATURE: &str = r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?(?:(?:var|let|const|function|class)\s+)?(?P<name>[A-Za-z0-9_$]+)\s*(?:(?:=|:)\s*(?:async\s+)?(?:function\s*)?(?:\(|[^;{]+=>)|\()";

/// Control-flow keywords that must not be mistaken for declarations
const CONTROL_FLOW: &str = r"^\s*(?:if|for|while|switch|catch|return)\b";

impl MethodRule {
    fn new() -> Self {
        Self {
            signature: CompiledPattern::compile(METHOD_SIGNATURE),
            control_flow: CompiledPattern::compile(CONTROL_FLOW),
        }
    }

    /// Recognize a declarative signature, returning its display label
    pub fn match_line(&self, line: &str) -> Option<String> {
        if self.control_flow.match_line(line).is_some() {
            return None;
        }

        let regex = self.signature.regex.as_ref()?;
        let caps = regex.captures(line)?;
        let name = caps.name("name")?.as_str();
        if name == "constructor" {
            return None;
        }

        Some(format!("{name}()"))
    }
}

/// Priority-ordered rule table, built once per configuration load
///
/// Pattern mode orders rules structural-first: sections, then todos, then
/// notes, base patterns before additional ones within each category. Legacy
/// mode holds a single generic rule over the escaped tag alternation.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    method_rule: Option<MethodRule>,
}

impl RuleSet {
    /// Build the rule table for a configuration
    pub fn build(config: &MarkConfig) -> Self {
        let mut rules = Vec::new();

        if config.uses_pattern_rules() {
            for pattern in config.effective_section_patterns() {
                rules.push(Rule {
                    kind: RuleKind::Fixed(MarkKind::Section),
                    pattern: CompiledPattern::compile(pattern),
                });
            }
            for pattern in config.effective_todo_patterns() {
                rules.push(Rule {
                    kind: RuleKind::Fixed(MarkKind::Todo),
                    pattern: CompiledPattern::compile(pattern),
                });
            }
            for pattern in config.effective_note_patterns() {
                rules.push(Rule {
                    kind: RuleKind::Fixed(MarkKind::Note),
                    pattern: CompiledPattern::compile(pattern),
                });
            }
        } else {
            rules.push(Rule {
                kind: RuleKind::TagTable,
                pattern: Self::compile_tag_rule(&config.tags),
            });
        }

        let method_rule = config.scan_methods.then(MethodRule::new);

        Self { rules, method_rule }
    }

    /// Build the legacy-mode generic rule from a tag list
    ///
    /// Tag names are escaped before embedding so special characters in a
    /// user-supplied tag cannot corrupt the alternation.
    fn compile_tag_rule(tags: &[String]) -> CompiledPattern {
        let alternation = tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            return CompiledPattern::never("");
        }

        let pattern = format!(
            r"(?i)(?://|#|/\*)\s*(?P<tag>{alternation})[:\s]+(?P<description>.*?)(?:\*/)?\s*$"
        );
        CompiledPattern::compile(&pattern)
    }

    /// Try rules in priority order; first match with a non-empty label wins
    ///
    /// A match whose trimmed label is empty counts as a non-match and the
    /// next rule is tried.
    pub fn match_line(&self, line: &str) -> Option<LineMatch> {
        for rule in &self.rules {
            let Some(found) = rule.pattern.match_line(line) else {
                continue;
            };
            if found.label.is_empty() {
                continue;
            }

            let kind = match &rule.kind {
                RuleKind::Fixed(kind) => kind.clone(),
                RuleKind::TagTable => match &found.tag {
                    Some(tag) => MarkKind::from_tag(tag),
                    None => continue,
                },
            };

            return Some(LineMatch {
                kind,
                label: found.label,
                heading_level: found.heading_level,
                writer: found.writer,
            });
        }
        None
    }

    /// Recognize a method-signature child, when enabled
    pub fn match_method(&self, line: &str) -> Option<String> {
        self.method_rule.as_ref()?.match_line(line)
    }
}
