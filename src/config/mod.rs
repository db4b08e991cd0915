pub mod loader;
pub mod schema;

pub use loader::{builtin_plan, load_from_path, load_from_str, ConfigError, PlanOrigin};
pub use schema::{
    parse_hash, FixPlan, HashAlgorithm, Metadata, RemovalRange, SubstitutionRule,
    ValidationError, ValidationIssue, Verify, DEFAULT_RESTART_HINT, DEFAULT_TARGET,
};
