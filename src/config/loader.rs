use crate::config::schema::{FixPlan, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Fix plan shipped with the binary, applied when no `--plan` is given.
const BUILTIN_PLAN: &str = include_str!("../../plans/api-fixes.toml");

/// Where a plan's text came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOrigin {
    File(PathBuf),
    Builtin,
}

impl fmt::Display for PlanOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanOrigin::File(path) => write!(f, "{}", path.display()),
            PlanOrigin::Builtin => f.write_str("built-in plan"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        origin: Option<PlanOrigin>,
        source: toml_edit::de::Error,
    },
    Validation {
        origin: Option<PlanOrigin>,
        source: ValidationError,
    },
}

impl ConfigError {
    fn with_origin(self, origin: PlanOrigin) -> Self {
        match self {
            ConfigError::Io { .. } => self,
            ConfigError::Toml {
                origin: None,
                source,
            } => ConfigError::Toml {
                origin: Some(origin),
                source,
            },
            ConfigError::Validation {
                origin: None,
                source,
            } => ConfigError::Validation {
                origin: Some(origin),
                source,
            },
            other => other,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(
                    f,
                    "failed to read fix plan from {}: {}",
                    path.display(),
                    source
                )
            }
            ConfigError::Toml { origin, source } => match origin {
                Some(origin) => write!(f, "failed to parse fix plan TOML ({}): {}", origin, source),
                None => write!(f, "failed to parse fix plan TOML: {}", source),
            },
            ConfigError::Validation { origin, source } => match origin {
                Some(origin) => write!(f, "invalid fix plan ({}): {}", origin, source),
                None => write!(f, "invalid fix plan: {}", source),
            },
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            ConfigError::Validation { source, .. } => Some(source),
        }
    }
}

pub fn load_from_str(input: &str) -> Result<FixPlan, ConfigError> {
    let plan: FixPlan = toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml {
        origin: None,
        source,
    })?;
    plan.validate().map_err(|source| ConfigError::Validation {
        origin: None,
        source,
    })?;
    Ok(plan)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<FixPlan, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.with_origin(PlanOrigin::File(path.to_path_buf())))
}

/// The built-in plan: three duplicate handler blocks and the auth rewrites.
pub fn builtin_plan() -> Result<FixPlan, ConfigError> {
    load_from_str(BUILTIN_PLAN).map_err(|error| error.with_origin(PlanOrigin::Builtin))
}
