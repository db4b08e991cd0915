//! Line-range removal.
//!
//! The primary strategy computes the full exclusion set up front and filters
//! once, so the order of ranges never matters. [`remove_ranges_sequential`]
//! keeps the bottom-to-top deletion strategy for comparison.

use crate::config::schema::RemovalRange;
use crate::error::PatchError;
use crate::verify::BlockVerification;
use std::collections::HashSet;

/// A range as it was actually applied, after clamping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedSpan {
    pub start: usize,
    /// Clamped, exclusive
    pub end: usize,
    pub label: Option<String>,
}

impl RemovedSpan {
    pub fn count(&self) -> usize {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalOutcome {
    pub lines: Vec<String>,
    /// Non-empty spans, highest start first
    pub removed: Vec<RemovedSpan>,
}

impl RemovalOutcome {
    pub fn removed_count(&self) -> usize {
        self.removed.iter().map(RemovedSpan::count).sum()
    }
}

/// Remove every index covered by `ranges` from `lines`.
///
/// Ends past the sequence are clamped; empty or inverted ranges do nothing.
/// Each range's `verify` and `ensure_duplicate` checks run against the input
/// before anything is dropped.
pub fn remove_ranges(lines: &[String], ranges: &[RemovalRange]) -> Result<RemovalOutcome, PatchError> {
    let mut excluded = HashSet::new();
    let mut removed = Vec::new();

    for range in ranges {
        let (start, end) = range.clamped(lines.len());
        if start == end {
            continue;
        }
        excluded.extend(start..end);
        removed.push(RemovedSpan {
            start,
            end,
            label: range.label.clone(),
        });
    }
    removed.sort_by(|a, b| b.start.cmp(&a.start));

    for range in ranges {
        check_range(lines, range, &excluded)?;
    }

    let kept = lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| !excluded.contains(idx))
        .map(|(_, line)| line.clone())
        .collect();

    Ok(RemovalOutcome {
        lines: kept,
        removed,
    })
}

/// Delete ranges one at a time, highest start first.
///
/// Produces the same lines as [`remove_ranges`] for disjoint ranges. No
/// content checks are made.
pub fn remove_ranges_sequential(lines: &[String], ranges: &[RemovalRange]) -> Vec<String> {
    let mut ordered: Vec<&RemovalRange> = ranges.iter().collect();
    ordered.sort_by(|a, b| b.start.cmp(&a.start));

    let mut lines = lines.to_vec();
    for range in ordered {
        let (start, end) = range.clamped(lines.len());
        lines.drain(start..end);
    }
    lines
}

fn check_range(
    lines: &[String],
    range: &RemovalRange,
    excluded: &HashSet<usize>,
) -> Result<(), PatchError> {
    let (start, end) = range.clamped(lines.len());
    if start == end {
        // Nothing is removed, so there is nothing to guard
        return Ok(());
    }
    let block = &lines[start..end];

    if let Some(verify) = &range.verify {
        let expected = BlockVerification::try_from(verify)?;
        if !expected.matches(&block.concat()) {
            return Err(PatchError::RangeVerification {
                start: range.start,
                end: range.end,
                reason: "block content does not match the expected text".to_string(),
            });
        }
    }

    if range.ensure_duplicate {
        let Some(first) = block.iter().map(|l| l.trim()).find(|l| !l.is_empty()) else {
            return Err(PatchError::RangeVerification {
                start: range.start,
                end: range.end,
                reason: "block is blank".to_string(),
            });
        };

        let survives = lines
            .iter()
            .enumerate()
            .any(|(idx, line)| !excluded.contains(&idx) && line.trim() == first);
        if !survives {
            return Err(PatchError::RangeVerification {
                start: range.start,
                end: range.end,
                reason: format!("no surviving copy of {first:?}"),
            });
        }
    }

    Ok(())
}
