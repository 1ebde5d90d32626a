use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use csvtools::{logging, select_rows, Sink, Source};
use tracing::info;

/// Output rows from a csv, where row[index_col] == key.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// csv file to select rows from, - will read from stdin. Each matching row is
    /// output immediately after being read in.
    #[arg(value_name = "CSV")]
    csv: Source,

    /// Unique identifier for the row
    #[arg(allow_hyphen_values = true)]
    key: String,

    /// Column to check for key in (defaults to the first column, column 0)
    #[arg(long, default_value_t = 0)]
    index_col: usize,

    /// File to write matching rows to, - will write to stdout
    #[arg(short, long, default_value = "-")]
    output_file: Sink,

    /// Raise log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    info!(source = %args.csv, sink = %args.output_file, index_col = args.index_col, "selecting rows");

    let input = args
        .csv
        .open()
        .with_context(|| format!("opening {}", args.csv))?;
    let output = args
        .output_file
        .create()
        .with_context(|| format!("creating {}", args.output_file))?;

    let summary = select_rows(input, output, args.index_col, &args.key)
        .with_context(|| format!("selecting rows from {}", args.csv))?;
    info!(
        records = summary.records,
        matched = summary.matched,
        "done"
    );
    Ok(())
}
