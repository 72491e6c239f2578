use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use readcov_core::models::Read;
use readcov_core::utils::read_reads;
use readcov_segtree::{BuildConfig, BuildOptions, LoadPolicy, StabIndex};

/// Build options resolved from `--config`, then overridden by explicit flags.
/// The second value tells whether narrowing was requested.
pub fn resolve_build_options(matches: &ArgMatches) -> Result<(BuildOptions, bool)> {
    let config = match matches.get_one::<String>("config") {
        Some(path) => BuildConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load build config: {}", path))?,
        None => BuildConfig::default(),
    };

    let mut options = BuildOptions::from(&config);
    if let Some(policy) = matches.get_one::<String>("policy") {
        options.policy = policy.parse::<LoadPolicy>()?;
    }
    if matches.get_flag("progress") {
        options.progress = true;
    }

    let narrow = config.narrow.unwrap_or(false)
        || matches.try_get_one::<bool>("narrow").ok().flatten().copied().unwrap_or(false);

    Ok((options, narrow))
}

pub fn load_reads(path: &str) -> Result<Vec<Read<u32>>> {
    let reads = read_reads(path).with_context(|| format!("Failed to read reads file: {}", path))?;
    log::info!("read {} reads from {}", reads.len(), path);
    Ok(reads)
}

pub fn build_index(reads: &[Read<u32>], options: &BuildOptions) -> Result<StabIndex<u32>> {
    let (index, summary) = StabIndex::build(reads, options).context("Failed to build index")?;
    if summary.skipped > 0 {
        eprintln!("Skipped {} malformed reads", summary.skipped);
    }
    Ok(index)
}

pub fn run_build(matches: &ArgMatches) -> Result<()> {
    let reads_path = matches
        .get_one::<String>("reads")
        .context("A path to a reads file is required.")?;
    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;

    let (options, narrow) = resolve_build_options(matches)?;
    if narrow {
        log::warn!("narrowing only applies to `query`; building from all reads");
    }

    let reads = load_reads(reads_path)?;
    let index = build_index(&reads, &options)?;

    index
        .save_bin(output)
        .with_context(|| format!("Failed to save snapshot: {}", output))?;
    eprintln!(
        "Saved snapshot with {} coordinates to {}",
        index.coordinates().len(),
        output
    );

    Ok(())
}
