use anyhow::{Context, Result};
use clap::Parser;
use evogrid_core::init_logging;
use evogrid_io::{load_config, load_snapshot, save_snapshot};
use evogrid_lib::App;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path; defaults apply when it does not exist
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the world seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of generations to run
    #[arg(short, long, default_value_t = 10)]
    generations: u64,

    /// Run exactly this many ticks instead of whole generations
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Write the best genome as JSON to this path when done
    #[arg(long)]
    export_best: Option<PathBuf>,

    /// Write a gzip population snapshot to this path when done
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Start from a population snapshot instead of random genomes
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the grid after the run
    #[arg(long)]
    print_grid: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut config = load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = Some(seed);
    }

    let mut app = match &args.resume {
        Some(path) => {
            let snapshot = load_snapshot(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            App::resume(config, snapshot)?
        }
        None => App::new(config)?,
    };

    let summary = match args.ticks {
        Some(ticks) => app.run_ticks(ticks)?,
        None => app.run_generations(args.generations)?,
    }
    .clone();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    if args.print_grid {
        print!("{}", app.world.grid());
    }

    if let Some(path) = &args.export_best {
        match app.export_best()? {
            Some(json) => {
                std::fs::write(path, json)
                    .with_context(|| format!("writing genome to {}", path.display()))?;
                info!(path = %path.display(), "Best genome exported");
            }
            None => info!("Population is empty, nothing to export"),
        }
    }

    if let Some(path) = &args.snapshot {
        save_snapshot(path, &app.snapshot())?;
    }

    Ok(())
}
