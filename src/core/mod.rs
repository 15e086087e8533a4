// mod.rs - Core logic module

pub mod cluster;
pub mod constraints;
pub mod distance;
pub mod params;
pub mod pruning;
pub mod reduce;

// Re-export main types for convenience
pub use cluster::{mismatch_budget, ClusterOutcome, ClusterStats, ParalogClusterer};
pub use constraints::{ConstraintReport, LocusConstraintFilter};
pub use distance::sequence_distance;
pub use params::FilterParams;
pub use pruning::{PruneOutcome, PruneReason, PrunedSite, RemovedLocus, SitePruner};
pub use reduce::CatalogReducer;
