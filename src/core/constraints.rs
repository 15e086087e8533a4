// constraints.rs - Per-call and per-locus population constraints

use crate::core::params::FilterParams;
use crate::data::genotype::GenotypeTable;
use crate::data::lists::Blacklist;
use crate::data::locus::Catalog;
use crate::data::population::PopulationIndex;

/// Decisions and counters of one constraint pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintReport {
    /// Loci present in too few populations
    pub blacklist: Blacklist,
    /// Calls removed for insufficient depth
    pub below_depth: usize,
    /// Calls removed for low log likelihood
    pub below_likelihood: usize,
    /// (locus, population) pairs whose calls were dropped for low coverage
    pub masked_populations: usize,
    /// Calls removed by population coverage
    pub coverage_calls: usize,
}

impl ConstraintReport {
    pub fn removed_calls(&self) -> usize {
        self.below_depth + self.below_likelihood + self.coverage_calls
    }
}

/// Removes weak genotype calls and flags loci missing from too many populations.
///
/// Calls are removed from the genotype table directly; loci are only ever
/// reported through the blacklist.
pub struct LocusConstraintFilter<'a> {
    params: &'a FilterParams,
}

impl<'a> LocusConstraintFilter<'a> {
    pub fn new(params: &'a FilterParams) -> Self {
        Self { params }
    }

    pub fn apply(
        &self,
        catalog: &mut Catalog,
        genotypes: &mut GenotypeTable,
        populations: &PopulationIndex,
    ) -> ConstraintReport {
        let mut report = ConstraintReport::default();
        if self.params.constraints_disabled() {
            log::debug!("No locus constraints enabled, skipping");
            return report;
        }

        let params = self.params;
        let mut pop_counts = vec![0usize; populations.len()];

        for locus in catalog.iter_mut() {
            let Some(row) = genotypes.row_mut(locus.id) else {
                if params.population_limit > 0 {
                    report.blacklist.insert(locus.id);
                }
                continue;
            };

            for slot in row.iter_mut() {
                let Some((depth, lnl)) = slot.as_ref().map(|c| (c.depth, c.lnl)) else {
                    continue;
                };
                if params.min_stack_depth > 0 && depth < params.min_stack_depth {
                    *slot = None;
                    locus.hcnt = locus.hcnt.saturating_sub(1);
                    report.below_depth += 1;
                } else if params.lnl_limit.is_some_and(|limit| lnl < limit) {
                    *slot = None;
                    locus.hcnt = locus.hcnt.saturating_sub(1);
                    report.below_likelihood += 1;
                }
            }

            for (pos, pop) in populations.iter().enumerate() {
                pop_counts[pos] = row[pop.range.indices()]
                    .iter()
                    .filter(|c| c.is_some())
                    .count();
            }

            for (pos, pop) in populations.iter().enumerate() {
                let count = pop_counts[pos];
                let coverage = count as f64 / pop.range.len() as f64;
                if count > 0 && coverage < params.sample_limit {
                    log::debug!(
                        "Removing population {} at locus {}; below sample limit: {:.3}",
                        pop.name,
                        locus.id,
                        coverage
                    );
                    for slot in row[pop.range.indices()].iter_mut() {
                        if slot.take().is_some() {
                            locus.hcnt = locus.hcnt.saturating_sub(1);
                            report.coverage_calls += 1;
                        }
                    }
                    pop_counts[pos] = 0;
                    report.masked_populations += 1;
                }
            }

            let present = pop_counts.iter().filter(|&&c| c > 0).count();
            if present < params.population_limit {
                log::debug!(
                    "Locus {} present in {} populations, below limit of {}",
                    locus.id,
                    present,
                    params.population_limit
                );
                report.blacklist.insert(locus.id);
            }
        }

        if params.min_stack_depth > 0 {
            log::info!(
                "Removed {} samples from loci that are below the minimum stack depth of {}x",
                report.below_depth,
                params.min_stack_depth
            );
        }
        if let Some(limit) = params.lnl_limit {
            log::info!(
                "Removed {} samples from loci that are below the log likelihood threshold of {}",
                report.below_likelihood,
                limit
            );
        }
        report
    }
}
