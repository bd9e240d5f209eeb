mod config;
mod export;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use perc_core::montecarlo::DEFAULT_SEED;
use perc_core::{Execution, Labeling, SweepOptions, SweepParams, run_sweep_with};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Monte Carlo site percolation sweep")]
struct Args {
    /// Parameter file with `value % key` lines (keys: L, T, p0, pk, dp)
    #[arg(long, default_value = "perc_ini.txt")]
    config: PathBuf,

    /// Lattice size L (overrides the file)
    #[arg(long)]
    l: Option<usize>,

    /// Trials per p (overrides the file)
    #[arg(long)]
    t: Option<usize>,

    /// First swept p (overrides the file)
    #[arg(long)]
    p0: Option<f64>,

    /// Last swept p (overrides the file)
    #[arg(long)]
    pk: Option<f64>,

    /// Sweep step (overrides the file)
    #[arg(long)]
    dp: Option<f64>,

    /// Base RNG seed (reproducibility)
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Cluster labelling algorithm
    #[arg(long, value_enum, default_value_t = LabelingArg::FloodFill)]
    labeling: LabelingArg,

    /// Run trials on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads for parallel trials (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Also dump the full sweep as JSON
    #[arg(long)]
    json: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LabelingArg {
    FloodFill,
    UnionFind,
}

impl From<LabelingArg> for Labeling {
    fn from(arg: LabelingArg) -> Self {
        match arg {
            LabelingArg::FloodFill => Labeling::FloodFill,
            LabelingArg::UnionFind => Labeling::UnionFind,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let params = resolve_params(&args)?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("configuring worker threads")?;
    }

    let options = SweepOptions {
        seed: args.seed,
        execution: if args.sequential { Execution::Sequential } else { Execution::Parallel },
        labeling: args.labeling.into(),
    };

    let result = run_sweep_with(&params, &options, None)?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output directory {}", args.out.display()))?;
    let written = export::write_tables(&result, &args.out)?;
    if args.json {
        let path = export::write_json(&result, &args.out)?;
        info!(path = %path.display(), "wrote sweep JSON");
    }

    println!("Wrote results to: {}", args.out.display());
    println!(
        "Files: {} (1 summary + {} distributions, L={} T={})",
        written.len(),
        written.len() - 1,
        params.l,
        params.trials
    );

    Ok(())
}

/// Parameter file merged with command-line overrides, then validated.
/// The file may be absent when every value is given on the command line.
fn resolve_params(args: &Args) -> Result<SweepParams> {
    let overrides = [
        ("L", args.l.map(|v| v as f64)),
        ("T", args.t.map(|v| v as f64)),
        ("p0", args.p0),
        ("pk", args.pk),
        ("dp", args.dp),
    ];

    let mut map = if overrides.iter().all(|(_, v)| v.is_some()) && !args.config.exists() {
        Default::default()
    } else {
        config::load_parameters(&args.config)?
    };
    for (key, value) in overrides {
        if let Some(v) = value {
            map.insert(key.to_string(), v);
        }
    }

    SweepParams::from_mapping(&map).context("invalid sweep parameters")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_without_file() {
        let args = Args::parse_from([
            "perc", "--config", "/nonexistent/perc_ini.txt", "--l", "8", "--t", "4", "--p0",
            "0.2", "--pk", "0.4", "--dp", "0.1",
        ]);
        let params = resolve_params(&args).unwrap();
        assert_eq!(params.l, 8);
        assert_eq!(params.trials, 4);
        assert_eq!(params.point_count(), 3);
    }

    #[test]
    fn test_partial_overrides_need_the_file() {
        let args = Args::parse_from(["perc", "--config", "/nonexistent/perc_ini.txt", "--l", "8"]);
        assert!(resolve_params(&args).is_err());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = Args::parse_from([
            "perc", "--config", "/nonexistent/perc_ini.txt", "--l", "8", "--t", "0", "--p0",
            "0.2", "--pk", "0.4", "--dp", "0.1",
        ]);
        let err = resolve_params(&args).unwrap_err();
        assert!(format!("{err:#}").contains("invalid parameter T"));
    }

    #[test]
    fn test_labeling_arg() {
        let args = Args::parse_from(["perc", "--labeling", "union-find"]);
        assert_eq!(Labeling::from(args.labeling), Labeling::UnionFind);
    }
}
