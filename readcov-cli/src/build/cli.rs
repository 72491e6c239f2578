use clap::{Arg, ArgAction, Command};

use readcov_segtree::consts::BUILD_CMD;

pub const DEFAULT_SNAPSHOT: &str = "segment_tree.bin";

/// Arguments shared by every subcommand that may run a build pass.
pub fn build_args() -> Vec<Arg> {
    vec![
        Arg::new("policy")
            .long("policy")
            .value_parser(["strict", "skip"])
            .help("What to do with zero-length or overflowing reads (default: strict)"),
        Arg::new("config")
            .long("config")
            .short('c')
            .help("TOML build configuration (policy, progress, narrow)"),
        Arg::new("progress")
            .long("progress")
            .action(ArgAction::SetTrue)
            .help("Show a progress bar while inserting reads"),
    ]
}

pub fn create_build_cli() -> Command {
    Command::new(BUILD_CMD)
        .about("Build the segment tree from a reads file and save it as a snapshot.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("reads")
                .long("reads")
                .short('r')
                .required(true)
                .help("Reads csv (or csv.gz) with `start` and `length` columns ('-' for stdin)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .default_value(DEFAULT_SNAPSHOT)
                .help("Where to write the snapshot"),
        )
        .args(build_args())
}
