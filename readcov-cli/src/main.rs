mod build;
mod query;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use readcov_segtree::consts::{BUILD_CMD, QUERY_CMD};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const BIN_NAME: &str = "readcov";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Count the reads covering each query locus with a heap-encoded segment tree.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase logging verbosity (-v info, -vv debug)"),
        )
        .subcommand(build::cli::create_build_cli())
        .subcommand(query::cli::create_query_cli())
}

fn init_logger(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();
    init_logger(&matches);

    match matches.subcommand() {
        //
        // BUILD
        //
        Some((BUILD_CMD, matches)) => {
            build::handlers::run_build(matches)?;
        }

        //
        // QUERY
        //
        Some((QUERY_CMD, matches)) => {
            query::handlers::run_query(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
