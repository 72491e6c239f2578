use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;

use readcov_core::models::Locus;
use readcov_core::utils::{read_loci, write_loci_to};
use readcov_segtree::{StabIndex, narrow_to_loci};

use crate::build::handlers::{build_index, load_reads, resolve_build_options};

pub fn run_query(matches: &ArgMatches) -> Result<()> {
    let loci_path = matches
        .get_one::<String>("loci")
        .context("A path to a loci file is required.")?;
    let output = matches
        .get_one::<String>("output")
        .context("An output path is required.")?;
    let snapshot = matches.get_one::<String>("snapshot");
    let reads_path = matches.get_one::<String>("reads");

    let positions: Vec<u32> =
        read_loci(loci_path).with_context(|| format!("Failed to read loci file: {}", loci_path))?;

    let index = match snapshot {
        Some(path) if Path::new(path).exists() => {
            eprintln!("Loading snapshot: {}", path);
            StabIndex::<u32>::load_bin(path)
                .with_context(|| format!("Failed to load snapshot: {}", path))?
        }
        _ => {
            let reads_path = reads_path
                .context("No snapshot found, a path to a reads file is required.")?;
            let (options, narrow) = resolve_build_options(matches)?;

            let mut reads = load_reads(reads_path)?;
            if narrow {
                reads = narrow_to_loci(&reads, &positions);
            }
            let index = build_index(&reads, &options)?;

            match snapshot {
                Some(path) if !narrow => {
                    index
                        .save_bin(path)
                        .with_context(|| format!("Failed to save snapshot: {}", path))?;
                    eprintln!("Saved snapshot to {}", path);
                }
                Some(path) => {
                    log::warn!("not saving {}: the index was narrowed to these loci", path);
                }
                None => {}
            }
            index
        }
    };

    let mut loci: Vec<Locus<u32>> = positions.into_iter().map(Locus::from).collect();
    index.annotate(&mut loci);

    write_loci_to(output, &loci).with_context(|| format!("Failed to write output: {}", output))?;

    Ok(())
}
