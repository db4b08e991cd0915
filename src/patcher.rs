//! The fix pipeline: load -> remove ranges -> substitute -> save.
//!
//! Each stage takes its input by reference and returns a new value, so
//! [`Patcher::transform`] can run and be checked without touching the disk.
//! [`Patcher::run`] adds the I/O on either side.
//!
//! The target is read, rewritten and replaced without locking. Two runs
//! against the same file at once race; callers must ensure exclusive access.

use crate::config::schema::{FixPlan, RemovalRange};
use crate::document::{self, SaveOptions, SaveResult};
use crate::error::PatchError;
use crate::ranges::{remove_ranges, RemovedSpan};
use crate::substitute::{apply_substitutions, compile_rules, CompiledRule, SubstitutionOutcome};
use std::path::{Path, PathBuf};

/// A validated plan with its rules compiled, ready to run.
#[derive(Debug, Clone)]
pub struct Patcher {
    ranges: Vec<RemovalRange>,
    rules: Vec<CompiledRule>,
}

/// Result of the in-memory stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub original_lines: usize,
    pub removed: Vec<RemovedSpan>,
    pub lines_after_removal: usize,
    pub substitution: SubstitutionOutcome,
}

impl Transformation {
    pub fn removed_count(&self) -> usize {
        self.removed.iter().map(RemovedSpan::count).sum()
    }

    /// Line count of the final text, counted the way editors show it.
    pub fn final_lines(&self) -> usize {
        self.substitution.text.lines().count()
    }

    pub fn text(&self) -> &str {
        &self.substitution.text
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub save: SaveOptions,
    /// Compute everything, write nothing
    pub dry_run: bool,
}

/// Everything a run did, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchReport {
    pub target: PathBuf,
    pub original: String,
    pub transformation: Transformation,
    /// None for dry runs
    pub saved: Option<SaveResult>,
}

impl Patcher {
    /// Validate `plan` and compile its rules.
    pub fn new(plan: &FixPlan) -> Result<Self, PatchError> {
        plan.validate()?;
        Ok(Self {
            ranges: plan.ranges.clone(),
            rules: compile_rules(&plan.rules)?,
        })
    }

    pub fn ranges(&self) -> &[RemovalRange] {
        &self.ranges
    }

    /// Run the removal and substitution stages over already-loaded lines.
    pub fn transform(&self, lines: &[String]) -> Result<Transformation, PatchError> {
        let removal = remove_ranges(lines, &self.ranges)?;
        let lines_after_removal = removal.lines.len();
        let substitution = apply_substitutions(&document::join_lines(&removal.lines), &self.rules);

        Ok(Transformation {
            original_lines: lines.len(),
            removed: removal.removed,
            lines_after_removal,
            substitution,
        })
    }

    /// Load `target`, transform it and write the result.
    pub fn run(&self, target: &Path, options: &RunOptions) -> Result<PatchReport, PatchError> {
        let lines = document::load(target)?;
        let transformation = self.transform(&lines)?;

        let saved = if options.dry_run {
            None
        } else {
            Some(document::save(
                target,
                transformation.text(),
                &options.save,
            )?)
        };

        Ok(PatchReport {
            target: target.to_path_buf(),
            original: document::join_lines(&lines),
            transformation,
            saved,
        })
    }
}
