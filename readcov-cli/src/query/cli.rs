use clap::{Arg, ArgAction, Command};

use crate::build::cli::build_args;
use readcov_segtree::consts::QUERY_CMD;

pub fn create_query_cli() -> Command {
    Command::new(QUERY_CMD)
        .about("Report the number of reads covering each locus.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("loci")
                .long("loci")
                .short('l')
                .required(true)
                .help("Loci csv (or csv.gz) with a `position` column ('-' for stdin)"),
        )
        .arg(
            Arg::new("reads")
                .long("reads")
                .short('r')
                .required_unless_present("snapshot")
                .help("Reads csv to build from when no snapshot is available"),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .short('s')
                .help("Snapshot to load; if it does not exist yet it is built from --reads and saved here"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .default_value("-")
                .help("Where to write `position,coverage` rows ('-' for stdout)"),
        )
        .arg(
            Arg::new("narrow")
                .long("narrow")
                .action(ArgAction::SetTrue)
                .help("Drop reads that cover none of the loci before building (not saved as a snapshot)"),
        )
        .args(build_args())
}
