//! Route Patcher: fix-plan driven cleanup of generated server sources
//!
//! Applies a fix plan to a single text file in two passes: drop fixed line
//! ranges (duplicated route handlers), then run an ordered list of regex
//! substitutions over the remaining text (inserting `authMiddleware` into
//! route declarations).
//!
//! # Pipeline
//!
//! `load -> remove_ranges -> apply_substitutions -> save`
//!
//! Every stage returns a new value. [`Patcher::transform`] runs the middle
//! two in memory; [`Patcher::run`] wraps them with file I/O.
//!
//! # Safety
//!
//! - Range ends are clamped; inverted ranges are no-ops
//! - Optional per-range content verification (exact text or xxh3 hash)
//! - Atomic file writes (tempfile + fsync + rename), optional backup
//! - UTF-8 validation on load
//! - Substitutions are naturally idempotent for the built-in plan
//!
//! # Example
//!
//! ```no_run
//! use route_patcher::{builtin_plan, Patcher, RunOptions};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let plan = builtin_plan()?;
//! let patcher = Patcher::new(&plan)?;
//! let report = patcher.run(Path::new("index.js"), &RunOptions::default())?;
//! println!("{} rules applied", report.transformation.substitution.applied());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod patcher;
pub mod ranges;
pub mod substitute;
pub mod verify;

// Re-exports
pub use config::{
    builtin_plan, load_from_path, load_from_str, ConfigError, FixPlan, PlanOrigin, RemovalRange,
    SubstitutionRule, ValidationError,
};
pub use document::{load, save, SaveOptions, SaveResult};
pub use error::PatchError;
pub use patcher::{PatchReport, Patcher, RunOptions, Transformation};
pub use ranges::{remove_ranges, remove_ranges_sequential, RemovalOutcome, RemovedSpan};
pub use substitute::{
    apply_substitutions, compile_rules, CompiledRule, PatternNotFound, RuleMatch,
    SubstitutionOutcome,
};
pub use verify::BlockVerification;
