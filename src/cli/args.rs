// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs)]
/// locfilter - Locus constraint filtering, SNP pruning and paralog clustering
pub struct Args {
    /// dataset JSON file (catalog, samples and genotype calls)
    #[argh(option)]
    pub dataset: Option<String>,

    /// population summary JSON file for the constraint-filtered catalog
    #[argh(option)]
    pub summaries: Option<String>,

    /// output directory for the run log and whitelist (default: .)
    #[argh(option)]
    pub out_path: Option<String>,

    /// batch identifier used to name output files
    #[argh(option)]
    pub batch_id: Option<u32>,

    /// whitelist of loci to process (`locus` or `locus<TAB>column` per line)
    #[argh(option)]
    pub whitelist: Option<String>,

    /// blacklist of loci to exclude (one locus per line)
    #[argh(option)]
    pub blacklist: Option<String>,

    /// minimum read depth of a genotype call (default: 0 = no filter)
    #[argh(option, default = "0")]
    pub min_depth: u32,

    /// minimum log likelihood of a genotype call (default: no filter)
    #[argh(option)]
    pub lnl_limit: Option<f64>,

    /// minimum fraction (or percentage) of a population's samples genotyped at a locus (default: 0)
    #[argh(option, default = "0.0")]
    pub sample_limit: f64,

    /// minimum number of populations a locus must be present in (default: 1)
    #[argh(option, default = "1")]
    pub min_populations: usize,

    /// minimum minor allele frequency of a site, 0-0.5 (default: 0)
    #[argh(option, default = "0.0")]
    pub minor_allele_freq: f64,

    /// maximum observed heterozygosity of a site, 0-1 (default: 1)
    #[argh(option, default = "1.0")]
    pub max_obs_het: f64,

    /// sequence similarity for paralog clustering, 0-1 (default: 0 = disabled)
    #[argh(option, default = "0.0")]
    pub cluster_similarity: f64,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// write the filtered dataset to this JSON file
    #[argh(option)]
    pub filtered_dataset: Option<String>,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,

    /// enable debug logging
    #[argh(switch, short = 'v')]
    pub verbose: bool,

    /// hide the progress bar
    #[argh(switch)]
    pub quiet: bool,

    /// print version and exit
    #[argh(switch)]
    pub version: bool,
}
