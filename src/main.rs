// main.rs - CLI entry point

use locfilter::data::loaders::{load_marker_column_list, load_marker_list};
use locfilter::prelude::*;
use std::time::Instant;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<()> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    if args.version {
        println!("{}", locfilter::get_info());
        return Ok(());
    }

    // Handle generate config first
    if args.generate_config {
        println!("{}", Config::generate_sample());
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let settings = validate_args(&args)?;
    log::info!("locfilter v{}", locfilter::VERSION);

    // Configure thread pool
    if let Some(n) = settings.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| FilterError::configuration("threads", e.to_string()))?;
        log::info!("Threads: {}", n);
    } else {
        log::info!("Threads: {} (auto-detected)", rayon::current_num_threads());
    }

    let total_start = Instant::now();

    let mut dataset = Dataset::from_json_file(&settings.dataset)?;

    let markers = MarkerLists {
        whitelist: settings
            .whitelist
            .as_deref()
            .map(load_marker_column_list)
            .transpose()?,
        blacklist: settings.blacklist.as_deref().map(load_marker_list).transpose()?,
    };

    let pipeline = FilterPipeline::new(settings.params.clone(), settings.paths.clone(), command_line)
        .with_progress(!args.quiet);
    let summaries_path = settings.summaries.clone();
    let summary = pipeline.run(&mut dataset, markers, |reduced| {
        SiteSummaries::from_json_file(&summaries_path, &reduced.populations)
    })?;

    if let Some(path) = &settings.filtered_dataset {
        dataset.write_json_file(path)?;
    }

    log::info!(
        "Loci: {} input, {} after marker lists, {} after constraints, {} after pruning{}",
        summary.initial_loci,
        summary.after_markers,
        summary.after_constraints,
        summary.after_pruning,
        summary
            .after_clustering
            .map(|n| format!(", {} after clustering", n))
            .unwrap_or_default()
    );
    log::info!(
        "Removed {} genotype calls, pruned {} sites, masked {} model calls",
        summary.calls_removed,
        summary.sites_pruned,
        summary.masked_calls
    );
    log::info!("Run log: {}", settings.paths.log.display());
    log::info!("Whitelist: {}", settings.paths.whitelist.display());
    log::info!("Total time: {:.2}s", total_start.elapsed().as_secs_f64());
    Ok(())
}
