// error.rs - Error types shared by every stage

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FilterError>;

/// Fatal conditions of a filtering run.
///
/// Pruned sites and blacklisted loci are expected outcomes and never travel
/// through this type.
#[derive(Error, Debug)]
pub enum FilterError {
    /// Malformed or out-of-range parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    Configuration { parameter: String, reason: String },

    /// Inputs that contradict each other (unknown locus, duplicate sample, ...)
    #[error("Data consistency error: {0}")]
    DataConsistency(String),

    /// A report or input file could not be opened, read or written
    #[error("Unable to access '{path}': {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage removed every locus
    #[error("No loci remain after {stage}")]
    Exhaustion { stage: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FilterError {
    pub fn configuration(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::DataConsistency(message.into())
    }

    pub fn resource(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Resource {
            path: path.into(),
            source,
        }
    }

    pub fn exhausted(stage: impl Into<String>) -> Self {
        Self::Exhaustion {
            stage: stage.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FilterError::configuration("minor_allele_freq", "must be between 0 and 0.5");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'minor_allele_freq': must be between 0 and 0.5"
        );

        let err = FilterError::exhausted("locus constraints");
        assert_eq!(err.to_string(), "No loci remain after locus constraints");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = FilterError::resource("out/batch_1.WL", io);
        assert!(err.to_string().starts_with("Unable to access 'out/batch_1.WL'"));
    }
}
