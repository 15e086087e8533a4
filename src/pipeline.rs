// pipeline.rs - Stage orchestration: markers, constraints, pruning, clustering

use crate::core::{
    CatalogReducer, ClusterStats, FilterParams, LocusConstraintFilter, ParalogClusterer, SitePruner,
};
use crate::data::{Blacklist, Dataset, SiteSummaries, Whitelist};
use crate::error::{FilterError, Result};
use crate::output::{write_whitelist, BatchPaths, RunLog};
use std::time::Instant;

/// Loci remaining after each stage and the main counters of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub initial_loci: usize,
    pub after_markers: usize,
    pub after_constraints: usize,
    pub after_pruning: usize,
    /// `None` when clustering is disabled
    pub after_clustering: Option<usize>,
    pub calls_removed: usize,
    pub sites_pruned: usize,
    pub masked_calls: usize,
    pub cluster_stats: Option<ClusterStats>,
}

impl PipelineSummary {
    pub fn final_loci(&self) -> usize {
        self.after_clustering.unwrap_or(self.after_pruning)
    }
}

/// Optional marker lists applied before any filter
#[derive(Debug, Clone, Default)]
pub struct MarkerLists {
    pub whitelist: Option<Whitelist>,
    pub blacklist: Option<Blacklist>,
}

pub struct FilterPipeline {
    params: FilterParams,
    paths: BatchPaths,
    command_line: String,
    show_progress: bool,
}

fn ensure_remaining(remaining: usize, stage: &str) -> Result<usize> {
    if remaining == 0 {
        return Err(FilterError::exhausted(stage));
    }
    Ok(remaining)
}

impl FilterPipeline {
    pub fn new(params: FilterParams, paths: BatchPaths, command_line: impl Into<String>) -> Self {
        Self {
            params,
            paths,
            command_line: command_line.into(),
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run every stage on `dataset`.
    ///
    /// `summary_source` is called once, after the constraint stage, with the
    /// reduced dataset and must return the population summaries for it.
    pub fn run<F>(&self, dataset: &mut Dataset, markers: MarkerLists, summary_source: F) -> Result<PipelineSummary>
    where
        F: FnOnce(&Dataset) -> Result<SiteSummaries>,
    {
        let start = Instant::now();
        self.params.validate()?;
        let mut params = self.params.clone();
        params.clamp_populations(dataset.populations.len());

        let mut run_log = RunLog::create(&self.paths.log, &self.command_line)?;
        let mut summary = PipelineSummary {
            initial_loci: dataset.catalog.len(),
            ..Default::default()
        };

        // Marker lists
        summary.after_markers = self.apply_markers(dataset, markers, &mut run_log)?;

        if dataset.catalog.order_unordered_loci() {
            log::debug!("Catalog is reference aligned");
        }

        // Locus constraints
        let report = LocusConstraintFilter::new(&params).apply(
            &mut dataset.catalog,
            &mut dataset.genotypes,
            &dataset.populations,
        );
        let remaining =
            CatalogReducer::reduce(&mut dataset.catalog, &mut dataset.genotypes, &report.blacklist, None);
        log::info!(
            "Removing {} loci that did not pass sample/population constraints... retained {} loci",
            report.blacklist.len(),
            remaining
        );
        run_log.write_constraints(&report, &params, remaining)?;
        summary.calls_removed = report.removed_calls();
        summary.after_constraints = ensure_remaining(remaining, "locus constraints")?;

        // Site pruning
        let summaries = summary_source(&*dataset)?;
        let outcome = SitePruner::new(&params).prune(
            &dataset.catalog,
            &mut dataset.genotypes,
            &summaries,
            &dataset.populations,
        )?;
        run_log.write_pruned_sites(&outcome)?;
        write_whitelist(&self.paths.whitelist, &outcome.retained_loci)?;
        let remaining = CatalogReducer::reduce(
            &mut dataset.catalog,
            &mut dataset.genotypes,
            &outcome.blacklist,
            Some(&outcome.whitelist),
        );
        summary.sites_pruned = outcome.pruned_sites.len();
        summary.masked_calls = outcome.masked_calls;
        summary.after_pruning = ensure_remaining(remaining, "site pruning")?;

        // Paralog clustering
        if params.clustering_enabled() {
            let outcome = ParalogClusterer::new(params.cluster_similarity)
                .with_progress(self.show_progress)
                .cluster(&dataset.catalog)?;
            write_whitelist(&self.paths.whitelist, &outcome.retained)?;
            run_log.write_cluster_stats(&outcome.stats)?;
            let remaining =
                CatalogReducer::reduce(&mut dataset.catalog, &mut dataset.genotypes, &outcome.blacklist, None);
            summary.cluster_stats = Some(outcome.stats);
            summary.after_clustering = Some(remaining);
            run_log.flush()?;
            ensure_remaining(remaining, "paralog clustering")?;
        }

        run_log.flush()?;
        log::info!(
            "Filtering completed in {:.2}s: {} of {} loci retained",
            start.elapsed().as_secs_f64(),
            summary.final_loci(),
            summary.initial_loci
        );
        Ok(summary)
    }

    fn apply_markers<W: std::io::Write>(
        &self,
        dataset: &mut Dataset,
        markers: MarkerLists,
        run_log: &mut RunLog<W>,
    ) -> Result<usize> {
        let MarkerLists { mut whitelist, blacklist } = markers;
        if whitelist.is_none() && blacklist.is_none() {
            return Ok(dataset.catalog.len());
        }

        let integrity = whitelist.as_mut().map(|wl| wl.check_integrity(&dataset.catalog));
        let blacklist = blacklist.unwrap_or_default();
        let remaining = CatalogReducer::reduce(
            &mut dataset.catalog,
            &mut dataset.genotypes,
            &blacklist,
            whitelist.as_ref(),
        );
        log::info!("Marker lists applied, {} loci retained", remaining);
        run_log.write_marker_lists(
            whitelist.as_ref().map(Whitelist::len).zip(integrity),
            (!blacklist.is_empty()).then_some(blacklist.len()),
            remaining,
        )?;
        ensure_remaining(remaining, "applying marker lists")
    }
}
