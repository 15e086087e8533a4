// lib.rs - locfilter library root

//! # locfilter - Locus and site filtering for population-genetics catalogs
//!
//! Decides which catalog loci and which of their polymorphic sites survive
//! downstream population-genetics analysis, and removes loci that look like
//! collapsed paralogs.
//!
//! ## Stages
//!
//! - **Locus constraints**: minimum depth, log likelihood, per-population
//!   sample coverage and minimum population count
//! - **Site pruning**: sample coverage, minor allele frequency, observed
//!   heterozygosity and incompatible sites, driven by population summaries
//! - **Paralog clustering**: single-linkage clustering of consensus sequences;
//!   every locus in a multi-member cluster is blacklisted
//!
//! Stages only return blacklists and whitelists; [`core::CatalogReducer`]
//! applies them.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use locfilter::prelude::*;
//! use std::path::Path;
//!
//! let mut dataset = Dataset::from_json_file(Path::new("dataset.json"))?;
//! let params = FilterParams {
//!     sample_limit: 0.75,
//!     minor_allele_freq: 0.05,
//!     cluster_similarity: 0.95,
//!     ..Default::default()
//! };
//!
//! let pipeline = FilterPipeline::new(params, BatchPaths::new(Path::new("out"), 1), "locfilter");
//! let summary = pipeline.run(&mut dataset, MarkerLists::default(), |reduced| {
//!     SiteSummaries::from_json_file(Path::new("summaries.json"), &reduced.populations)
//! })?;
//! println!("{} loci retained", summary.final_loci());
//! # Ok::<(), locfilter::FilterError>(())
//! ```

pub mod cli;
pub mod core;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, Config, ValidationResult};
    pub use crate::core::{
        CatalogReducer, ClusterOutcome, FilterParams, LocusConstraintFilter, ParalogClusterer, SitePruner,
    };
    pub use crate::data::{Blacklist, Catalog, Dataset, GenotypeTable, PopulationIndex, SiteSummaries, Whitelist};
    pub use crate::error::{FilterError, Result};
    pub use crate::output::{BatchPaths, RunLog};
    pub use crate::pipeline::{FilterPipeline, MarkerLists, PipelineSummary};
}

// Re-export main types at the root level for convenience
pub use crate::core::FilterParams;
pub use crate::data::Dataset;
pub use crate::error::{FilterError, Result};
pub use crate::pipeline::{FilterPipeline, PipelineSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "locfilter v{} - Locus constraint filtering, SNP pruning and paralog clustering",
        VERSION
    )
}
