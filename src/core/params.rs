// params.rs - Filter thresholds shared by every stage

use crate::error::{FilterError, Result};
use serde::{Deserialize, Serialize};

/// Thresholds for the constraint, pruning and clustering stages.
///
/// Ratios are fractions in `[0, 1]`; a value of zero disables the
/// corresponding rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Minimum read depth of a genotype call
    pub min_stack_depth: u32,
    /// Minimum log likelihood of a genotype call; `None` disables the filter
    pub lnl_limit: Option<f64>,
    /// Minimum fraction of a population's samples genotyped at a locus or site
    pub sample_limit: f64,
    /// Minimum number of populations a locus must be present in
    pub population_limit: usize,
    pub minor_allele_freq: f64,
    pub max_obs_het: f64,
    /// Sequence identity above which two loci are clustered; 0 disables clustering
    pub cluster_similarity: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_stack_depth: 0,
            lnl_limit: None,
            sample_limit: 0.0,
            population_limit: 1,
            minor_allele_freq: 0.0,
            max_obs_het: 1.0,
            cluster_similarity: 0.0,
        }
    }
}

fn check_range(parameter: &str, value: f64, max: f64) -> Result<()> {
    if !(0.0..=max).contains(&value) {
        return Err(FilterError::configuration(
            parameter,
            format!("must be between 0 and {} (got {})", max, value),
        ));
    }
    Ok(())
}

impl FilterParams {
    pub fn validate(&self) -> Result<()> {
        check_range("sample_limit", self.sample_limit, 1.0)?;
        check_range("minor_allele_freq", self.minor_allele_freq, 0.5)?;
        check_range("max_obs_het", self.max_obs_het, 1.0)?;
        check_range("cluster_similarity", self.cluster_similarity, 1.0)?;
        if let Some(lnl) = self.lnl_limit {
            if lnl.is_nan() {
                return Err(FilterError::configuration("lnl_limit", "must be a number"));
            }
        }
        Ok(())
    }

    /// Lower the population limit to the number of populations present
    pub fn clamp_populations(&mut self, population_count: usize) {
        if self.population_limit > population_count {
            log::warn!(
                "Population limit ({}) larger than number of populations present, adjusting parameter to {}",
                self.population_limit,
                population_count
            );
            self.population_limit = population_count;
        }
    }

    /// True when no per-call or per-locus constraint is active
    pub fn constraints_disabled(&self) -> bool {
        self.sample_limit == 0.0
            && self.population_limit == 0
            && self.min_stack_depth == 0
            && self.lnl_limit.is_none()
    }

    pub fn clustering_enabled(&self) -> bool {
        self.cluster_similarity > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let params = FilterParams::default();
        assert!(params.validate().is_ok());
        assert!(!params.constraints_disabled());
        assert!(!params.clustering_enabled());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let params = FilterParams {
            minor_allele_freq: 0.6,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("minor_allele_freq"));

        let params = FilterParams {
            sample_limit: -0.1,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_clamp_populations() {
        let mut params = FilterParams {
            population_limit: 5,
            ..Default::default()
        };
        params.clamp_populations(3);
        assert_eq!(params.population_limit, 3);
        params.clamp_populations(10);
        assert_eq!(params.population_limit, 3);
    }

    #[test]
    fn test_constraints_disabled() {
        let params = FilterParams {
            population_limit: 0,
            ..Default::default()
        };
        assert!(params.constraints_disabled());

        let params = FilterParams {
            population_limit: 0,
            lnl_limit: Some(-10.0),
            ..Default::default()
        };
        assert!(!params.constraints_disabled());
    }
}
