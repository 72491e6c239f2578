use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the loader does with a read that has a zero length or an end past the
/// coordinate type.
///
/// The same choice applies to every read of a build.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadPolicy {
    /// Abort the build on the first malformed read.
    #[default]
    Strict,
    /// Drop malformed reads from both the coordinate index and the tree, and keep going.
    Skip,
}

impl std::str::FromStr for LoadPolicy {
    type Err = BuildConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(LoadPolicy::Strict),
            "skip" => Ok(LoadPolicy::Skip),
            _ => Err(BuildConfigError::InvalidPolicy(s.to_string())),
        }
    }
}

/// Options for [`StabIndex::build`](crate::StabIndex::build).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub policy: LoadPolicy,
    /// Draw a progress bar on stderr during the loader pass.
    pub progress: bool,
}

/// A build configuration file, e.g.
///
/// ```toml
/// policy = "skip"
/// progress = true
/// narrow = false
/// ```
///
/// Every key is optional.
#[derive(Deserialize, Serialize, Debug, PartialEq, Default)]
pub struct BuildConfig {
    pub policy: Option<LoadPolicy>,
    pub progress: Option<bool>,
    pub narrow: Option<bool>,
}

#[derive(Error, Debug)]
pub enum BuildConfigError {
    #[error("Invalid load policy `{0}`. Valid options are 'strict' or 'skip'")]
    InvalidPolicy(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl TryFrom<&Path> for BuildConfig {
    type Error = BuildConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}

impl From<&BuildConfig> for BuildOptions {
    fn from(config: &BuildConfig) -> Self {
        BuildOptions {
            policy: config.policy.unwrap_or_default(),
            progress: config.progress.unwrap_or(false),
        }
    }
}
