// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::core::FilterParams;
use crate::error::{FilterError, Result};
use crate::output::BatchPaths;
use std::path::PathBuf;

/// Validated run settings
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub params: FilterParams,
    pub dataset: PathBuf,
    pub summaries: PathBuf,
    pub batch_id: u32,
    pub paths: BatchPaths,
    pub whitelist: Option<PathBuf>,
    pub blacklist: Option<PathBuf>,
    pub filtered_dataset: Option<PathBuf>,
    pub threads: Option<usize>,
}

/// Ratios given above 1 are read as percentages
pub fn normalize_ratio(value: f64) -> f64 {
    if value > 1.0 {
        value / 100.0
    } else {
        value
    }
}

fn required_path(value: &Option<String>, flag: &str) -> Result<PathBuf> {
    value
        .as_ref()
        .map(PathBuf::from)
        .ok_or_else(|| FilterError::configuration(flag, "is required"))
}

fn existing_path(value: &Option<String>, flag: &str) -> Result<Option<PathBuf>> {
    let Some(path) = value.as_ref().map(PathBuf::from) else {
        return Ok(None);
    };
    if !path.exists() {
        return Err(FilterError::configuration(
            flag,
            format!("file '{}' does not exist", path.display()),
        ));
    }
    Ok(Some(path))
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult> {
    let dataset = required_path(&args.dataset, "dataset")?;
    let summaries = required_path(&args.summaries, "summaries")?;
    let batch_id = args
        .batch_id
        .ok_or_else(|| FilterError::configuration("batch_id", "is required"))?;

    if let Some(n) = args.threads {
        if n == 0 {
            return Err(FilterError::configuration("threads", "must be at least 1"));
        }
    }

    let params = FilterParams {
        min_stack_depth: args.min_depth,
        lnl_limit: args.lnl_limit,
        sample_limit: normalize_ratio(args.sample_limit),
        population_limit: args.min_populations,
        minor_allele_freq: normalize_ratio(args.minor_allele_freq),
        max_obs_het: normalize_ratio(args.max_obs_het),
        cluster_similarity: normalize_ratio(args.cluster_similarity),
    };
    params.validate()?;

    let out_dir = PathBuf::from(args.out_path.as_deref().unwrap_or("."));

    Ok(ValidationResult {
        params,
        dataset,
        summaries,
        batch_id,
        paths: BatchPaths::new(&out_dir, batch_id),
        whitelist: existing_path(&args.whitelist, "whitelist")?,
        blacklist: existing_path(&args.blacklist, "blacklist")?,
        filtered_dataset: args.filtered_dataset.as_ref().map(PathBuf::from),
        threads: args.threads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(cli: &[&str]) -> Args {
        Args::from_args(&["locfilter"], cli).unwrap()
    }

    const BASE: [&str; 6] = ["--dataset", "d.json", "--summaries", "s.json", "--batch-id", "2"];

    #[test]
    fn test_percentages_normalized() {
        let mut cli = BASE.to_vec();
        cli.extend(["--sample-limit", "75", "--minor-allele-freq", "5", "--cluster-similarity", "0.9"]);
        let result = validate_args(&parse(&cli)).unwrap();

        assert_eq!(result.params.sample_limit, 0.75);
        assert_eq!(result.params.minor_allele_freq, 0.05);
        assert_eq!(result.params.cluster_similarity, 0.9);
        assert!(result.paths.log.ends_with("batch_2.pmerge.log"));
    }

    #[test]
    fn test_out_of_range_maf() {
        let mut cli = BASE.to_vec();
        cli.extend(["--minor-allele-freq", "0.7"]);
        let err = validate_args(&parse(&cli)).unwrap_err();
        assert!(matches!(err, FilterError::Configuration { .. }));
    }

    #[test]
    fn test_required_arguments() {
        assert!(validate_args(&parse(&["--dataset", "d.json", "--summaries", "s.json"])).is_err());
        assert!(validate_args(&parse(&["--summaries", "s.json", "--batch-id", "1"])).is_err());

        let mut cli = BASE.to_vec();
        cli.extend(["--threads", "0"]);
        assert!(validate_args(&parse(&cli)).is_err());
    }

    #[test]
    fn test_missing_marker_file() {
        let mut cli = BASE.to_vec();
        cli.extend(["--blacklist", "/nonexistent/blacklist.tsv"]);
        assert!(validate_args(&parse(&cli)).is_err());
    }
}
