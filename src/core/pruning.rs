// pruning.rs - Per-site pruning of polymorphic columns

use crate::core::params::FilterParams;
use crate::data::genotype::GenotypeTable;
use crate::data::lists::{Blacklist, Whitelist};
use crate::data::locus::{Catalog, Locus, LocusId};
use crate::data::population::{Population, PopulationIndex};
use crate::data::summary::SiteSummaries;
use crate::error::{FilterError, Result};
use std::fmt;

/// First failing rule of a pruned site, in reporting priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PruneReason {
    IncompatibleSite,
    SampleLimit,
    MafLimit,
    ObsHetLimit,
    Unknown,
}

impl PruneReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PruneReason::IncompatibleSite => "incompatible_site",
            PruneReason::SampleLimit => "sample_limit",
            PruneReason::MafLimit => "maf_limit",
            PruneReason::ObsHetLimit => "obshet_limit",
            PruneReason::Unknown => "unknown_reason",
        }
    }
}

impl fmt::Display for PruneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrunedSite {
    pub locus: LocusId,
    pub chr: String,
    /// Genomic coordinate of the column
    pub bp: u64,
    pub col: usize,
    pub reason: PruneReason,
}

/// A locus removed because none of its sites survived
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedLocus {
    pub locus: LocusId,
    pub chr: String,
    pub bp: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PruneOutcome {
    pub whitelist: Whitelist,
    pub blacklist: Blacklist,
    pub pruned_sites: Vec<PrunedSite>,
    pub removed_loci: Vec<RemovedLocus>,
    /// Loci keeping at least one site (or having none to begin with), in catalog order
    pub retained_loci: Vec<LocusId>,
    /// Polymorphic sites inspected
    pub sites_examined: usize,
    /// Model calls overwritten with unknown
    pub masked_calls: usize,
}

/// Rule flags of one site
#[derive(Debug, Default)]
struct SiteVerdict {
    incompatible: bool,
    sample: bool,
    maf: bool,
    het: bool,
}

impl SiteVerdict {
    fn reason(&self) -> Option<PruneReason> {
        if self.incompatible {
            Some(PruneReason::IncompatibleSite)
        } else if self.sample {
            Some(PruneReason::SampleLimit)
        } else if self.maf {
            Some(PruneReason::MafLimit)
        } else if self.het {
            Some(PruneReason::ObsHetLimit)
        } else {
            None
        }
    }
}

/// Decides which polymorphic sites survive based on population summaries.
///
/// Samples of poorly covered populations are masked at a site rather than
/// removed, as long as enough populations remain to keep the site.
pub struct SitePruner<'a> {
    params: &'a FilterParams,
}

impl<'a> SitePruner<'a> {
    pub fn new(params: &'a FilterParams) -> Self {
        Self { params }
    }

    pub fn prune(
        &self,
        catalog: &Catalog,
        genotypes: &mut GenotypeTable,
        summaries: &SiteSummaries,
        populations: &PopulationIndex,
    ) -> Result<PruneOutcome> {
        let mut outcome = PruneOutcome::default();

        for locus in catalog.iter() {
            if !locus.is_polymorphic() {
                outcome.whitelist.keep_all(locus.id);
                outcome.retained_loci.push(locus.id);
                continue;
            }

            for site in &locus.sites {
                outcome.sites_examined += 1;
                let col = site.col;
                let tally = summaries.tally(locus.id, col).ok_or_else(|| {
                    FilterError::consistency(format!(
                        "no site summary for locus {} column {}",
                        locus.id, col
                    ))
                })?;

                if tally.fixed {
                    outcome.whitelist.keep_site(locus.id, col);
                    continue;
                }

                let mut verdict = SiteVerdict::default();
                let mut prune_list: Vec<(&Population, usize)> = Vec::new();
                for pop in populations.iter() {
                    let summary = summaries.population_site(locus.id, pop.id, col).ok_or_else(|| {
                        FilterError::consistency(format!(
                            "no summary for population '{}' at locus {} column {}",
                            pop.name, locus.id, col
                        ))
                    })?;
                    if summary.incompatible {
                        verdict.incompatible = true;
                    } else if summary.num_indv == 0
                        || (summary.num_indv as f64 / pop.range.len() as f64) < self.params.sample_limit
                    {
                        prune_list.push((pop, summary.num_indv));
                    }
                }

                if populations.len() - prune_list.len() < self.params.population_limit {
                    verdict.sample = true;
                } else {
                    outcome.masked_calls += mask_populations(locus, col, &prune_list, genotypes);
                }

                if tally.allele_cnt > 1 {
                    verdict.maf = tally.minor_allele_freq() < self.params.minor_allele_freq;
                    verdict.het = tally.obs_het > self.params.max_obs_het;
                }

                match verdict.reason() {
                    None => outcome.whitelist.keep_site(locus.id, col),
                    Some(reason) => outcome.pruned_sites.push(PrunedSite {
                        locus: locus.id,
                        chr: locus.chr.clone(),
                        bp: locus.sort_bp_at(col),
                        col,
                        reason,
                    }),
                }
            }

            if outcome.whitelist.contains(locus.id) {
                outcome.retained_loci.push(locus.id);
            } else {
                outcome.blacklist.insert(locus.id);
                outcome.removed_loci.push(RemovedLocus {
                    locus: locus.id,
                    chr: locus.chr.clone(),
                    bp: locus.sort_bp(),
                });
            }
        }

        log::info!(
            "Pruned {} of {} polymorphic sites; {} loci lost every site",
            outcome.pruned_sites.len(),
            outcome.sites_examined,
            outcome.removed_loci.len()
        );
        if outcome.masked_calls > 0 {
            log::debug!("Masked {} model calls in under-sampled populations", outcome.masked_calls);
        }
        Ok(outcome)
    }
}

/// Mask column `col` for every genotyped sample of the listed populations
fn mask_populations(
    locus: &Locus,
    col: usize,
    prune_list: &[(&Population, usize)],
    genotypes: &mut GenotypeTable,
) -> usize {
    let Some(row) = genotypes.row_mut(locus.id) else {
        return 0;
    };
    let mut masked = 0;
    for (pop, num_indv) in prune_list {
        if *num_indv == 0 {
            continue;
        }
        for call in row[pop.range.indices()].iter_mut().flatten() {
            if call.mask(col) {
                masked += 1;
            }
        }
    }
    masked
}
