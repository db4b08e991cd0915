use serde::Deserialize;
use std::fmt;

pub const DEFAULT_TARGET: &str = "index.js";
pub const DEFAULT_RESTART_HINT: &str = "npm run dev";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct FixPlan {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub ranges: Vec<RemovalRange>,
    #[serde(default)]
    pub rules: Vec<SubstitutionRule>,
}

impl FixPlan {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.ranges.is_empty() && self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyPlan);
        }

        if self.meta.target.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                context: "meta".to_string(),
                field: "target",
            });
        }

        for range in &self.ranges {
            if range.ensure_duplicate && range.is_empty() {
                issues.push(ValidationIssue::InvalidCombo {
                    context: range.describe(),
                    message: "ensure_duplicate requires a non-empty range".to_string(),
                });
            }
            if let Some(Verify::Hash { expected, .. }) = &range.verify {
                if parse_hash(expected).is_none() {
                    issues.push(ValidationIssue::InvalidCombo {
                        context: range.describe(),
                        message: format!("invalid hash value: {expected}"),
                    });
                }
            }
        }

        // Sorted by start, any overlap shows up between neighbours.
        let mut live: Vec<&RemovalRange> = self.ranges.iter().filter(|r| !r.is_empty()).collect();
        live.sort_by_key(|r| r.start);
        for window in live.windows(2) {
            let (first, second) = (window[0], window[1]);
            if second.start < first.end {
                issues.push(ValidationIssue::OverlappingRanges {
                    first: (first.start, first.end),
                    second: (second.start, second.end),
                });
            }
        }

        for (idx, rule) in self.rules.iter().enumerate() {
            if rule.pattern.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    context: format!("rule #{}", idx + 1),
                    field: "pattern",
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_restart_hint")]
    pub restart_hint: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            target: default_target(),
            restart_hint: default_restart_hint(),
        }
    }
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

fn default_restart_hint() -> String {
    DEFAULT_RESTART_HINT.to_string()
}

/// A contiguous block of lines to delete: zero-based, end-exclusive.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RemovalRange {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub label: Option<String>,
    /// Expected content of the block before it is deleted
    #[serde(default)]
    pub verify: Option<Verify>,
    /// Require the block's first non-blank line to survive elsewhere in the file
    #[serde(default)]
    pub ensure_duplicate: bool,
}

impl RemovalRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            label: None,
            verify: None,
            ensure_duplicate: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Clamp `end` to `len`. Inverted ranges collapse to an empty span at `start`.
    pub fn clamped(&self, len: usize) -> (usize, usize) {
        let start = self.start.min(len);
        let end = self.end.min(len).max(start);
        (start, end)
    }

    fn describe(&self) -> String {
        match &self.label {
            Some(label) => format!("range [{}, {}) '{label}'", self.start, self.end),
            None => format!("range [{}, {})", self.start, self.end),
        }
    }
}

/// A regex and the replacement template written in its place.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl SubstitutionRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            label: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Verify {
    ExactMatch {
        expected_text: String,
    },
    Hash {
        /// Defaults to xxh3
        algorithm: Option<HashAlgorithm>,
        expected: String,
    },
}

/// Only xxh3 is supported; other names fail to deserialize.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlgorithm {
    Xxh3,
}

/// Parse a hex hash value, with or without a `0x` prefix.
pub fn parse_hash(value: &str) -> Option<u64> {
    u64::from_str_radix(value.trim().trim_start_matches("0x"), 16).ok()
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyPlan,
    MissingField {
        context: String,
        field: &'static str,
    },
    OverlappingRanges {
        first: (usize, usize),
        second: (usize, usize),
    },
    InvalidCombo {
        context: String,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPlan => {
                write!(f, "fix plan contains no ranges and no rules")
            }
            ValidationIssue::MissingField { context, field } => {
                write!(f, "{context} missing required field '{field}'")
            }
            ValidationIssue::OverlappingRanges { first, second } => write!(
                f,
                "ranges [{}, {}) and [{}, {}) overlap",
                first.0, first.1, second.0, second.1
            ),
            ValidationIssue::InvalidCombo { context, message } => {
                write!(f, "{context} has invalid configuration: {message}")
            }
        }
    }
}
