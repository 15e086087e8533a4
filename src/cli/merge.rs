// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::error::Result;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.dataset.is_none() {
            self.dataset = config.dataset;
        }
        if self.summaries.is_none() {
            self.summaries = config.summaries;
        }
        if self.out_path.is_none() {
            self.out_path = config.out_path;
        }
        if self.batch_id.is_none() {
            self.batch_id = config.batch_id;
        }
        if self.whitelist.is_none() {
            self.whitelist = config.whitelist;
        }
        if self.blacklist.is_none() {
            self.blacklist = config.blacklist;
        }
        if self.filtered_dataset.is_none() {
            self.filtered_dataset = config.filtered_dataset;
        }

        // Locus constraints (only override defaults, not explicit CLI values)
        if self.min_depth == 0 {
            if let Some(v) = config.min_depth {
                self.min_depth = v;
            }
        }
        if self.lnl_limit.is_none() {
            self.lnl_limit = config.lnl_limit;
        }
        if self.sample_limit == 0.0 {
            if let Some(v) = config.sample_limit {
                self.sample_limit = v;
            }
        }
        if self.min_populations == 1 {
            if let Some(v) = config.min_populations {
                self.min_populations = v;
            }
        }

        // Site pruning
        if self.minor_allele_freq == 0.0 {
            if let Some(v) = config.minor_allele_freq {
                self.minor_allele_freq = v;
            }
        }
        if self.max_obs_het == 1.0 {
            if let Some(v) = config.max_obs_het {
                self.max_obs_het = v;
            }
        }

        // Paralog clustering
        if self.cluster_similarity == 0.0 {
            if let Some(v) = config.cluster_similarity {
                self.cluster_similarity = v;
            }
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(cli: &[&str]) -> Args {
        Args::from_args(&["locfilter"], cli).unwrap()
    }

    #[test]
    fn test_cli_wins_over_config() {
        let args = parse(&["--dataset", "cli.json", "--min-depth", "5"]);
        let config = Config {
            dataset: Some("file.json".to_string()),
            summaries: Some("sum.json".to_string()),
            min_depth: Some(8),
            minor_allele_freq: Some(0.05),
            ..Config::new()
        };
        let merged = args.merge_with_config(config);

        assert_eq!(merged.dataset.as_deref(), Some("cli.json"));
        assert_eq!(merged.summaries.as_deref(), Some("sum.json"));
        assert_eq!(merged.min_depth, 5);
        assert_eq!(merged.minor_allele_freq, 0.05);
    }

    #[test]
    fn test_defaults_filled_from_config() {
        let args = parse(&[]);
        let config = Config {
            min_populations: Some(3),
            max_obs_het: Some(0.6),
            lnl_limit: Some(-15.0),
            threads: Some(4),
            ..Config::new()
        };
        let merged = args.merge_with_config(config);
        assert_eq!(merged.min_populations, 3);
        assert_eq!(merged.max_obs_het, 0.6);
        assert_eq!(merged.lnl_limit, Some(-15.0));
        assert_eq!(merged.threads, Some(4));
    }
}
