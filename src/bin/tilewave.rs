use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rand::{SeedableRng, rngs::StdRng};
use std::path::PathBuf;
use tilewave::wfc::{TileCatalog, TileVariant, WfcCollapseResult, WfcSolver};

/// Fills a grid with tiles whose touching edges match.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON array of tiles, each `{ "edges": [[up..], [left..], [down..], [right..]] }`.
    #[arg(long)]
    catalog: PathBuf,
    #[arg(long, default_value_t = 12)]
    rows: usize,
    #[arg(long, default_value_t = 18)]
    cols: usize,
    /// Seed for a reproducible run; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many collapses and print the partial grid.
    #[arg(long)]
    steps: Option<usize>,
    /// Print the decision grid as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let source = std::fs::read_to_string(&args.catalog)
        .with_context(|| format!("reading {}", args.catalog.display()))?;
    let variants: Vec<TileVariant<serde_json::Value>> = serde_json::from_str(&source)
        .with_context(|| format!("parsing {}", args.catalog.display()))?;
    let catalog = TileCatalog::new(variants).context("building tile catalog")?;
    let adjacency = catalog.adjacency();
    info!("Loaded {} tile variants", catalog.len());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut solver = WfcSolver::new((args.cols, args.rows), &adjacency);
    let limit = args.steps.unwrap_or(usize::MAX);
    while solver.iterations() < limit {
        if let WfcCollapseResult::Complete = solver.collapse_step(&mut rng) {
            break;
        }
    }

    let forced = solver.forced().count();
    if forced > 0 {
        warn!("{} cells had no matching tile and used tile 0", forced);
    }

    let decisions = solver.decisions();
    if args.json {
        println!("{}", serde_json::to_string(&decisions)?);
    } else {
        let labels = decisions.map(|_, variant| match variant {
            Some(variant) => variant.to_string(),
            None => ".".to_owned(),
        });
        print!("{}", labels);
    }
    Ok(())
}
