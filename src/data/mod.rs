// mod.rs - Data structures module

pub mod dataset;
pub mod genotype;
pub mod lists;
pub mod loaders;
pub mod locus;
pub mod population;
pub mod summary;

// Re-export main types for convenience
pub use dataset::{Dataset, Sample};
pub use genotype::{GenotypeCall, GenotypeTable, ModelCall, SampleIndex};
pub use lists::{Blacklist, IntegrityReport, SiteSelection, Whitelist};
pub use locus::{Catalog, Locus, LocusId, SiteDescriptor, Strand};
pub use population::{Population, PopulationId, PopulationIndex, SampleRange};
pub use summary::{PopulationSiteSummary, SiteSummaries, SiteTally};
