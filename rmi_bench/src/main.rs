//! Measures RMI build, eval, and lookup times across a configuration sweep
//! and emits one CSV row per `(index, configuration, repetition)` on stdout.
//!
//! Eval times the `search` call alone; lookup additionally resolves the
//! returned interval with a bounded lower-bound search, the way a caller
//! completes an exact query.

use anyhow::{ensure, Result};
use average::{Estimate, MeanWithError};
use clap::{Parser, ValueEnum};
use rmi_core::search::{BinarySearch, Search};
use rmi_core::{
    BoundPolicy, CubicSpline, GlobalAbsolute, GlobalIndividual, LinearRegression, LinearSpline,
    LocalAbsolute, LocalIndividual, Model, NoBounds, Radix, Rmi,
};
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Instant;

mod dataset;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Binary key file (little-endian u64 count, then keys). Synthetic
    /// uniform data is generated when omitted.
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Dataset label in the output; defaults to the file stem or the
    /// synthetic generator name.
    #[arg(long)]
    dataset_name: Option<String>,

    /// Number of synthetic keys when no dataset is given.
    #[arg(long, default_value_t = 10_000_000)]
    n_keys: usize,

    /// Number of lookup samples per repetition.
    #[arg(long, default_value_t = 100_000)]
    n_samples: usize,

    /// Repetitions per configuration.
    #[arg(long, default_value_t = 3)]
    reps: usize,

    /// Smallest layer-2 size exponent; each sweep step doubles the size.
    #[arg(long, default_value_t = 8)]
    min_exp: u32,

    /// Largest layer-2 size exponent.
    #[arg(long, default_value_t = 18)]
    max_exp: u32,

    /// Layer-1 model kind.
    #[arg(long, value_enum, default_value_t = ModelKind::LinearSpline)]
    layer1: ModelKind,

    /// Layer-2 model kind.
    #[arg(long, value_enum, default_value_t = ModelKind::LinearRegression)]
    layer2: ModelKind,

    /// Error-bound mode.
    #[arg(long, value_enum, default_value_t = BoundMode::Labs)]
    bounds: BoundMode,

    /// Also measure a plain binary search over the full array.
    #[arg(long)]
    baseline: bool,

    /// Seed for data generation and probe sampling.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "snake_case")]
enum ModelKind {
    LinearSpline,
    LinearRegression,
    CubicSpline,
    Radix,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "snake_case")]
enum BoundMode {
    Lind,
    Labs,
    Gind,
    Gabs,
    None,
}

fn model_label(kind: ModelKind) -> &'static str {
    match kind {
        ModelKind::LinearSpline => "linear_spline",
        ModelKind::LinearRegression => "linear_regression",
        ModelKind::CubicSpline => "cubic_spline",
        ModelKind::Radix => "radix",
    }
}

fn bound_label(mode: BoundMode) -> &'static str {
    match mode {
        BoundMode::Lind => "lind",
        BoundMode::Labs => "labs",
        BoundMode::Gind => "gind",
        BoundMode::Gabs => "gabs",
        BoundMode::None => "none",
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(model_label(*self))
    }
}

impl std::fmt::Display for BoundMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(bound_label(*self))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ensure!(cli.min_exp <= cli.max_exp, "empty layer-2 size sweep");

    let keys = match &cli.dataset {
        Some(path) => dataset::load_keys(path)?,
        None => dataset::gen_uniform(cli.n_keys, cli.seed),
    };
    ensure!(!keys.is_empty(), "dataset holds no keys");

    let samples = dataset::sample_keys(&keys, cli.n_samples, cli.seed ^ 0x9e3779b97f4a7c15);

    let dataset_name = match (&cli.dataset_name, &cli.dataset) {
        (Some(name), _) => name.clone(),
        (None, Some(path)) => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("dataset")
            .to_string(),
        (None, None) => format!("uniform_{}", keys.len()),
    };

    println!(
        "dataset_name,n_keys,index_name,configuration_string,size_in_bytes,rep,n_samples,\
         build_ns,eval_ns,lookup_ns,eval_checksum,lookup_checksum"
    );

    if cli.baseline {
        run_baseline(&cli, &dataset_name, &keys, &samples);
    }

    match cli.layer1 {
        ModelKind::LinearSpline => with_layer1::<LinearSpline>(&cli, &dataset_name, &keys, &samples),
        ModelKind::LinearRegression => {
            with_layer1::<LinearRegression>(&cli, &dataset_name, &keys, &samples)
        }
        ModelKind::CubicSpline => with_layer1::<CubicSpline>(&cli, &dataset_name, &keys, &samples),
        ModelKind::Radix => with_layer1::<Radix>(&cli, &dataset_name, &keys, &samples),
    }
}

fn with_layer1<L1: Model<u64>>(
    cli: &Cli,
    dataset_name: &str,
    keys: &[u64],
    samples: &[u64],
) -> Result<()> {
    match cli.layer2 {
        ModelKind::LinearSpline => with_layer2::<L1, LinearSpline>(cli, dataset_name, keys, samples),
        ModelKind::LinearRegression => {
            with_layer2::<L1, LinearRegression>(cli, dataset_name, keys, samples)
        }
        ModelKind::CubicSpline => with_layer2::<L1, CubicSpline>(cli, dataset_name, keys, samples),
        ModelKind::Radix => with_layer2::<L1, Radix>(cli, dataset_name, keys, samples),
    }
}

fn with_layer2<L1: Model<u64>, L2: Model<u64>>(
    cli: &Cli,
    dataset_name: &str,
    keys: &[u64],
    samples: &[u64],
) -> Result<()> {
    match cli.bounds {
        BoundMode::Lind => sweep::<L1, L2, LocalIndividual>(cli, dataset_name, keys, samples),
        BoundMode::Labs => sweep::<L1, L2, LocalAbsolute>(cli, dataset_name, keys, samples),
        BoundMode::Gind => sweep::<L1, L2, GlobalIndividual>(cli, dataset_name, keys, samples),
        BoundMode::Gabs => sweep::<L1, L2, GlobalAbsolute>(cli, dataset_name, keys, samples),
        BoundMode::None => sweep::<L1, L2, NoBounds>(cli, dataset_name, keys, samples),
    }
}

fn sweep<L1, L2, B>(cli: &Cli, dataset_name: &str, keys: &[u64], samples: &[u64]) -> Result<()>
where
    L1: Model<u64>,
    L2: Model<u64>,
    B: BoundPolicy,
{
    for exp in cli.min_exp..=cli.max_exp {
        let layer2_size = 1usize << exp;
        let config = format!(
            "layer1={},layer2={},bounds={},layer2_size={}",
            model_label(cli.layer1),
            model_label(cli.layer2),
            bound_label(cli.bounds),
            layer2_size,
        );

        let mut lookup_mean = MeanWithError::new();
        for rep in 0..cli.reps {
            let start = Instant::now();
            let rmi = Rmi::<u64, L1, L2, B>::new(keys, layer2_size)?;
            let build_ns = start.elapsed().as_nanos();

            let mut eval_checksum = 0u64;
            let start = Instant::now();
            for &key in samples {
                let approx = rmi.search(black_box(key));
                eval_checksum =
                    eval_checksum.wrapping_add((approx.pos + approx.lo + approx.hi) as u64);
            }
            let eval_ns = start.elapsed().as_nanos();
            black_box(eval_checksum);

            let mut lookup_checksum = 0u64;
            let start = Instant::now();
            for &key in samples {
                let approx = rmi.search(black_box(key));
                let pos = BinarySearch::lower_bound(keys, approx.lo, approx.hi, key);
                lookup_checksum = lookup_checksum.wrapping_add(pos as u64);
            }
            let lookup_ns = start.elapsed().as_nanos();
            black_box(lookup_checksum);

            println!(
                "{},{},RMI,\"{}\",{},{},{},{},{},{},{},{}",
                dataset_name,
                keys.len(),
                config,
                rmi.size_in_bytes(),
                rep,
                samples.len(),
                build_ns,
                eval_ns,
                lookup_ns,
                eval_checksum,
                lookup_checksum,
            );

            lookup_mean.add(lookup_ns as f64 / samples.len() as f64);
        }
        eprintln!(
            "{config}: {:.1} +/- {:.1} ns/lookup",
            lookup_mean.mean(),
            lookup_mean.error()
        );
    }
    Ok(())
}

fn run_baseline(cli: &Cli, dataset_name: &str, keys: &[u64], samples: &[u64]) {
    for rep in 0..cli.reps {
        let mut lookup_checksum = 0u64;
        let start = Instant::now();
        for &key in samples {
            let pos = BinarySearch::lower_bound(keys, 0, keys.len(), black_box(key));
            lookup_checksum = lookup_checksum.wrapping_add(pos as u64);
        }
        let lookup_ns = start.elapsed().as_nanos();
        black_box(lookup_checksum);

        println!(
            "{},{},BinarySearch,\"\",0,{},{},0,0,{},0,{}",
            dataset_name,
            keys.len(),
            rep,
            samples.len(),
            lookup_ns,
            lookup_checksum,
        );
    }
}
