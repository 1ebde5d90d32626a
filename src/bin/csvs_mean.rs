use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use csvtools::{
    logging, mean_tables,
    table::{read_table, write_table},
    FreezeLayout, FrozenTable, Sink,
};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Output a csv where output[i][j] = mean(csv[i][j] for csv in input csvs).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// csv files to take the mean of
    #[arg(value_name = "CSV", required = true)]
    csvs: Vec<PathBuf>,

    /// Number of csv rows to treat as frozen headers, excluded from mean
    #[arg(long, default_value_t = 0)]
    freeze_rows: usize,

    /// Number of csv columns to treat as frozen prefix, excluded from mean
    #[arg(long, default_value_t = 0)]
    freeze_cols: usize,

    /// File to output result to, - will write to stdout
    #[arg(short, long, default_value = "-")]
    output_file: Sink,

    /// Raise log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn load(path: &Path, layout: FreezeLayout) -> Result<FrozenTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let rows =
        read_table(BufReader::new(file)).with_context(|| format!("reading {}", path.display()))?;
    debug!(path = %path.display(), rows = rows.len(), "loaded");
    Ok(FrozenTable::new(rows, layout))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let layout = FreezeLayout::new(args.freeze_rows, args.freeze_cols);
    info!(inputs = args.csvs.len(), ?layout, "averaging");

    let tables = args
        .csvs
        .iter()
        .map(|path| load(path, layout))
        .collect::<Result<Vec<_>>>()?;

    // Everything is validated before the sink is touched.
    let means = mean_tables(&tables).context("computing mean")?;

    let output = args
        .output_file
        .create()
        .with_context(|| format!("creating {}", args.output_file))?;
    write_table(output, means.rows())
        .with_context(|| format!("writing {}", args.output_file))?;

    info!(rows = means.rows().len(), sink = %args.output_file, "done");
    Ok(())
}
