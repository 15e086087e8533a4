// summary.rs - Per-population and cross-population site statistics

use crate::data::locus::LocusId;
use crate::data::population::PopulationId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

fn default_freq() -> f64 {
    1.0
}

/// Statistics of one site column within one population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSiteSummary {
    /// Individuals genotyped at this column
    pub num_indv: usize,
    /// Conflicting calls were observed at this column
    #[serde(default)]
    pub incompatible: bool,
    /// Major allele frequency within the population
    #[serde(default = "default_freq")]
    pub p_freq: f64,
}

/// Statistics of one site column aggregated over all populations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiteTally {
    pub fixed: bool,
    pub allele_cnt: usize,
    /// Combined major allele frequency
    pub p_freq: f64,
    /// Combined observed heterozygosity
    pub obs_het: f64,
}

impl SiteTally {
    pub fn minor_allele_freq(&self) -> f64 {
        1.0 - self.p_freq
    }
}

#[derive(Debug, Clone, Default)]
struct LocusSummary {
    tallies: BTreeMap<usize, SiteTally>,
    populations: BTreeMap<PopulationId, BTreeMap<usize, PopulationSiteSummary>>,
}

/// Summary tables for the current catalog, produced by the external summary engine
#[derive(Debug, Clone, Default)]
pub struct SiteSummaries {
    loci: HashMap<LocusId, LocusSummary>,
}

impl SiteSummaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_tally(&mut self, locus: LocusId, col: usize, tally: SiteTally) {
        self.loci.entry(locus).or_default().tallies.insert(col, tally);
    }

    pub fn insert_population_site(
        &mut self,
        locus: LocusId,
        population: PopulationId,
        col: usize,
        summary: PopulationSiteSummary,
    ) {
        self.loci
            .entry(locus)
            .or_default()
            .populations
            .entry(population)
            .or_default()
            .insert(col, summary);
    }

    pub fn tally(&self, locus: LocusId, col: usize) -> Option<&SiteTally> {
        self.loci.get(&locus)?.tallies.get(&col)
    }

    pub fn population_site(
        &self,
        locus: LocusId,
        population: PopulationId,
        col: usize,
    ) -> Option<&PopulationSiteSummary> {
        self.loci.get(&locus)?.populations.get(&population)?.get(&col)
    }

    pub fn contains_locus(&self, locus: LocusId) -> bool {
        self.loci.contains_key(&locus)
    }

    pub fn loci_count(&self) -> usize {
        self.loci.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let mut summaries = SiteSummaries::new();
        summaries.insert_tally(
            10,
            4,
            SiteTally {
                fixed: false,
                allele_cnt: 2,
                p_freq: 0.97,
                obs_het: 0.1,
            },
        );
        summaries.insert_population_site(
            10,
            1,
            4,
            PopulationSiteSummary {
                num_indv: 8,
                incompatible: false,
                p_freq: 0.9,
            },
        );

        let tally = summaries.tally(10, 4).unwrap();
        assert!((tally.minor_allele_freq() - 0.03).abs() < 1e-9);
        assert_eq!(summaries.population_site(10, 1, 4).unwrap().num_indv, 8);
        assert!(summaries.population_site(10, 2, 4).is_none());
        assert!(summaries.tally(10, 5).is_none());
        assert!(summaries.contains_locus(10));
        assert_eq!(summaries.loci_count(), 1);
    }

    #[test]
    fn test_population_defaults() {
        let summary: PopulationSiteSummary = serde_json::from_str(r#"{"num_indv": 3}"#).unwrap();
        assert!(!summary.incompatible);
        assert_eq!(summary.p_freq, 1.0);
    }
}
