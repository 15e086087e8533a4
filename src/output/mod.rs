// mod.rs - Run log and whitelist writers

use crate::core::{ClusterStats, ConstraintReport, FilterParams, PruneOutcome};
use crate::data::{IntegrityReport, LocusId};
use crate::error::{FilterError, Result};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Ensure parent directory exists before creating file
pub fn ensure_parent_dir(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent).map_err(|e| FilterError::resource(parent, e))?;
        }
    }
    Ok(())
}

fn create_file(path: &Path) -> Result<BufWriter<File>> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| FilterError::resource(path, e))?;
    Ok(BufWriter::new(file))
}

/// Report file locations of one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPaths {
    pub log: PathBuf,
    pub whitelist: PathBuf,
}

impl BatchPaths {
    pub fn new(out_dir: &Path, batch_id: u32) -> Self {
        Self {
            log: out_dir.join(format!("batch_{}.pmerge.log", batch_id)),
            whitelist: out_dir.join(format!("batch_{}.WL", batch_id)),
        }
    }
}

/// Write one surviving locus id per line, replacing any previous content
pub fn write_whitelist(path: &Path, loci: &[LocusId]) -> Result<()> {
    let mut writer = create_file(path)?;
    let io_err = |e| FilterError::resource(path, e);
    for id in loci {
        writeln!(writer, "{}", id).map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;
    log::info!("Whitelist of {} loci written to: {}", loci.len(), path.display());
    Ok(())
}

/// Tab-separated run report
pub struct RunLog<W: Write> {
    writer: W,
}

impl RunLog<BufWriter<File>> {
    /// Create the log file and write its header
    pub fn create(path: &Path, command_line: &str) -> Result<Self> {
        let writer = create_file(path)?;
        let mut log = Self { writer };
        log.write_header(command_line)?;
        Ok(log)
    }
}

impl<W: Write> RunLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self, command_line: &str) -> Result<()> {
        writeln!(self.writer, "{}", command_line)?;
        writeln!(
            self.writer,
            "locfilter version {} executed {}",
            env!("CARGO_PKG_VERSION"),
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        Ok(())
    }

    /// `whitelisted` carries the whitelist size after its integrity check
    pub fn write_marker_lists(
        &mut self,
        whitelisted: Option<(usize, IntegrityReport)>,
        blacklisted: Option<usize>,
        remaining: usize,
    ) -> Result<()> {
        writeln!(self.writer, "\n#\n# Marker lists\n#")?;
        if let Some((n, integrity)) = whitelisted {
            writeln!(self.writer, "Whitelisted loci\t{}", n)?;
            writeln!(
                self.writer,
                "Whitelisted loci absent from the catalog\t{}",
                integrity.missing_loci
            )?;
            writeln!(
                self.writer,
                "Whitelisted columns that are not variant sites\t{}",
                integrity.invalid_columns
            )?;
        }
        if let Some(n) = blacklisted {
            writeln!(self.writer, "Blacklisted loci\t{}", n)?;
        }
        writeln!(self.writer, "Loci retained\t{}", remaining)?;
        Ok(())
    }

    pub fn write_constraints(
        &mut self,
        report: &ConstraintReport,
        params: &FilterParams,
        remaining: usize,
    ) -> Result<()> {
        writeln!(self.writer, "\n#\n# Locus constraints\n#")?;
        if params.min_stack_depth > 0 {
            writeln!(
                self.writer,
                "Removed {} samples from loci that are below the minimum stack depth of {}x",
                report.below_depth, params.min_stack_depth
            )?;
        }
        if let Some(limit) = params.lnl_limit {
            writeln!(
                self.writer,
                "Removed {} samples from loci that are below the log likelihood threshold of {}",
                report.below_likelihood, limit
            )?;
        }
        writeln!(
            self.writer,
            "Removed {} loci that did not pass sample/population constraints from {} loci.",
            report.blacklist.len(),
            remaining + report.blacklist.len()
        )?;
        writeln!(self.writer, "Retained {} loci.", remaining)?;
        Ok(())
    }

    pub fn write_pruned_sites(&mut self, outcome: &PruneOutcome) -> Result<()> {
        write!(
            self.writer,
            "\n#\n# List of pruned nucleotide sites\n#\n# Action\tLocus ID\tChr\tBP\tColumn\tReason\n"
        )?;
        let mut removed = outcome.removed_loci.iter().peekable();
        for site in &outcome.pruned_sites {
            // keep each removed_locus row right after the last pruned site of its locus
            while let Some(locus) = removed.next_if(|r| r.locus < site.locus) {
                writeln!(self.writer, "removed_locus\t{}\t{}\t{}\t0\tno_snps_remaining", locus.locus, locus.chr, locus.bp)?;
            }
            writeln!(
                self.writer,
                "pruned_polymorphic_site\t{}\t{}\t{}\t{}\t{}",
                site.locus, site.chr, site.bp, site.col, site.reason
            )?;
        }
        for locus in removed {
            writeln!(self.writer, "removed_locus\t{}\t{}\t{}\t0\tno_snps_remaining", locus.locus, locus.chr, locus.bp)?;
        }
        Ok(())
    }

    pub fn write_cluster_stats(&mut self, stats: &ClusterStats) -> Result<()> {
        write!(self.writer, "\n#\n# Cluster filtering stats \n#\n")?;
        writeln!(self.writer, "Number of Non-clustered loci\t{}", stats.non_clustered)?;
        writeln!(self.writer, "Number of clustered loci\t{}", stats.clustered)?;
        writeln!(
            self.writer,
            "Number of polymorphic loci in the clustered loci\t{}",
            stats.polymorphic_clustered
        )?;
        writeln!(
            self.writer,
            "Number of fixed loci in the clustered loci\t{}",
            stats.fixed_clustered
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
