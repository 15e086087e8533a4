// dataset.rs - Catalog, genotype table and population index travelling together

use crate::data::genotype::{GenotypeTable, SampleIndex};
use crate::data::locus::Catalog;
use crate::data::population::{PopulationId, PopulationIndex};

/// One sequenced individual
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub id: u32,
    pub name: String,
    pub population: PopulationId,
}

/// Everything the filters operate on.
///
/// `samples[i]` is the sample stored at genotype-table index `i`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub catalog: Catalog,
    pub genotypes: GenotypeTable,
    pub populations: PopulationIndex,
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn sample_index(&self, sample_id: u32) -> Option<SampleIndex> {
        self.samples.iter().position(|s| s.id == sample_id)
    }

    /// Recount `hcnt` of every locus from the genotype table
    pub fn refresh_haplotype_counts(&mut self) {
        for locus in self.catalog.iter_mut() {
            locus.hcnt = self.genotypes.called_samples(locus.id);
        }
    }
}
