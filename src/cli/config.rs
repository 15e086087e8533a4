// config.rs - Configuration file support

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub dataset: Option<String>,
    pub summaries: Option<String>,
    pub out_path: Option<String>,
    pub batch_id: Option<u32>,
    pub whitelist: Option<String>,
    pub blacklist: Option<String>,
    pub filtered_dataset: Option<String>,

    // Locus constraints
    pub min_depth: Option<u32>,
    pub lnl_limit: Option<f64>,
    pub sample_limit: Option<f64>,
    pub min_populations: Option<usize>,

    // Site pruning
    pub minor_allele_freq: Option<f64>,
    pub max_obs_het: Option<f64>,

    // Paralog clustering
    pub cluster_similarity: Option<f64>,

    // Performance
    pub threads: Option<usize>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| FilterError::resource(path, e))?;
        let config: Config = toml::from_str(&content)?;

        log::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| FilterError::configuration("config", e.to_string()))?;
        fs::write(path, content).map_err(|e| FilterError::resource(path, e))?;

        log::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# locfilter.toml - Configuration file for locfilter
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Dataset JSON file (catalog, samples and genotype calls)
dataset = "/path/to/dataset.json"

# Population summaries for the constraint-filtered catalog
summaries = "/path/to/summaries.json"

# Output directory for batch_<id>.pmerge.log and batch_<id>.WL
out_path = "results"

# Batch identifier
batch_id = 1

# Optional marker lists
# whitelist = "whitelist.tsv"
# blacklist = "blacklist.tsv"

# Write the filtered dataset as JSON
# filtered_dataset = "results/filtered.json"

# =============================================================================
# LOCUS CONSTRAINTS
# =============================================================================

# Minimum read depth of a genotype call (0 = no filter)
min_depth = 0

# Minimum log likelihood of a genotype call (omit for no filter)
# lnl_limit = -10.0

# Minimum fraction of a population's samples genotyped (values above 1 are percentages)
sample_limit = 0.75

# Minimum number of populations a locus must be present in
min_populations = 1

# =============================================================================
# SITE PRUNING
# =============================================================================

# Minimum minor allele frequency (0-0.5)
minor_allele_freq = 0.05

# Maximum observed heterozygosity (0-1)
max_obs_het = 0.7

# =============================================================================
# PARALOG CLUSTERING
# =============================================================================

# Sequence similarity above which loci are clustered (0 = disabled)
cluster_similarity = 0.95

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.batch_id, Some(1));
        assert_eq!(config.cluster_similarity, Some(0.95));
        assert!(config.lnl_limit.is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locfilter.toml");
        let config = Config {
            dataset: Some("data.json".to_string()),
            min_depth: Some(4),
            lnl_limit: Some(-12.5),
            ..Config::new()
        };
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "min_depth = \"deep\"").unwrap();
        assert!(matches!(Config::from_file(&path), Err(FilterError::Toml(_))));
    }
}
