//! Whole-document regex substitution.

use crate::config::schema::SubstitutionRule;
use crate::error::PatchError;
use regex::Regex;

/// Minimum similarity for a line to be offered as a near miss.
const HINT_THRESHOLD: f64 = 0.8;

/// A substitution rule with its pattern compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: SubstitutionRule,
    regex: Regex,
}

impl CompiledRule {
    pub fn new(rule: SubstitutionRule) -> Result<Self, PatchError> {
        let regex = Regex::new(&rule.pattern).map_err(|source| PatchError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        Ok(Self { rule, regex })
    }
}

/// Compile every rule, failing on the first bad pattern.
pub fn compile_rules(rules: &[SubstitutionRule]) -> Result<Vec<CompiledRule>, PatchError> {
    rules.iter().cloned().map(CompiledRule::new).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub pattern: String,
    pub label: Option<String>,
    pub occurrences: usize,
}

/// A rule whose pattern matched nothing. Not fatal.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternNotFound {
    pub pattern: String,
    pub label: Option<String>,
    /// Closest existing line to what the pattern looks for, if any is close
    pub closest: Option<(usize, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionOutcome {
    pub text: String,
    pub matched: Vec<RuleMatch>,
    pub unmatched: Vec<PatternNotFound>,
}

impl SubstitutionOutcome {
    /// Number of rules that matched at least once.
    pub fn applied(&self) -> usize {
        self.matched.len()
    }
}

/// Apply `rules` in order, each against the text left by the previous one.
pub fn apply_substitutions(text: &str, rules: &[CompiledRule]) -> SubstitutionOutcome {
    let mut text = text.to_string();
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for compiled in rules {
        let occurrences = compiled.regex.find_iter(&text).count();
        if occurrences == 0 {
            unmatched.push(PatternNotFound {
                pattern: compiled.rule.pattern.clone(),
                label: compiled.rule.label.clone(),
                closest: closest_line(&text, &compiled.rule.pattern),
            });
            continue;
        }

        text = compiled
            .regex
            .replace_all(&text, compiled.rule.replacement.as_str())
            .into_owned();
        matched.push(RuleMatch {
            pattern: compiled.rule.pattern.clone(),
            label: compiled.rule.label.clone(),
            occurrences,
        });
    }

    SubstitutionOutcome {
        text,
        matched,
        unmatched,
    }
}

/// Find the line that most resembles what `pattern` was looking for,
/// comparing a same-length window from the first non-blank character.
fn closest_line(text: &str, pattern: &str) -> Option<(usize, String)> {
    let needle = pattern_literal(pattern);
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    let width = needle.chars().count();

    let mut best: Option<(f64, usize, &str)> = None;
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        let window: String = trimmed.chars().take(width).collect();
        let score = strsim::normalized_levenshtein(&window, needle);
        if score >= HINT_THRESHOLD && best.map_or(true, |(s, _, _)| score > s) {
            best = Some((score, idx, trimmed));
        }
    }

    best.map(|(_, idx, line)| (idx, line.trim_end().to_string()))
}

/// Rough literal reading of a pattern: whitespace classes become a space and
/// escapes are dropped. `app\.post\('/x',\s*async` -> `app.post('/x', async`.
fn pattern_literal(pattern: &str) -> String {
    let collapsed = pattern
        .replace(r"\s*", " ")
        .replace(r"\s+", " ")
        .replace(r"\s", " ");

    let mut literal = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                literal.push(next);
            }
        } else {
            literal.push(c);
        }
    }
    literal
}
