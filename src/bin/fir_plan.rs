use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use symdec::FilterConfig;
use symdec::arch::KernelPlan;
use symdec::config::{Architecture, ElementType, FilterSpec, Transport};
use symdec::output::{OutputFormat, create_formatter};

#[derive(Parser, Debug)]
#[command(name = "fir_plan")]
#[command(about = "Show how a symmetric decimating FIR is split across kernels", long_about = None)]
struct Args {
    /// Filter description in TOML; other filter flags are ignored when given
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Sample type
    #[arg(long, value_enum, default_value = "int16")]
    data_type: ElementType,

    /// Coefficient type
    #[arg(long, value_enum, default_value = "int32")]
    coeff_type: ElementType,

    /// Total FIR length
    #[arg(short = 'l', long, default_value = "63")]
    fir_len: usize,

    /// Decimation factor
    #[arg(short = 'd', long, default_value = "3")]
    decimate: usize,

    /// Number of cascaded kernels
    #[arg(long, default_value = "1")]
    cascade_len: usize,

    /// Samples per invocation
    #[arg(short = 'w', long, default_value = "192")]
    window_size: usize,

    /// Use stream transport instead of window transport
    #[arg(long)]
    stream: bool,

    /// Force a buffering strategy
    #[arg(short = 'a', long, value_enum)]
    architecture: Option<Architecture>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write a single pretty-printed JSON report instead of one line per kernel
    #[arg(long)]
    report: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct PlanReport {
    data_type: ElementType,
    coeff_type: ElementType,
    fir_len: usize,
    half_len: usize,
    decimate: usize,
    window_size: usize,
    output_size: usize,
    lanes: usize,
    columns: usize,
    kernels: Vec<KernelPlan>,
}

fn build_config(args: &Args) -> Result<FilterConfig> {
    if let Some(path) = &args.config {
        let content = fs::read_to_string(path).context("Failed to read filter config")?;
        let spec = FilterSpec::from_toml(&content).context("Failed to parse filter config")?;
        return spec.to_config().context("Invalid filter configuration");
    }

    let mut builder = FilterConfig::builder(args.data_type, args.coeff_type)
        .fir_len(args.fir_len)
        .decimate(args.decimate)
        .cascade_len(args.cascade_len)
        .window_size(args.window_size);
    if args.stream {
        builder = builder.transport(Transport::Stream);
    }
    if let Some(arch) = args.architecture {
        builder = builder.architecture(arch);
    }
    builder.build().context("Invalid filter configuration")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;
    let plans = config.plans()?;

    if args.report {
        let report = PlanReport {
            data_type: config.data_type(),
            coeff_type: config.coeff_type(),
            fir_len: config.fir_len(),
            half_len: config.half_len(),
            decimate: config.decimate(),
            window_size: config.window_size(),
            output_size: config.output_size(),
            lanes: config.lanes(),
            columns: config.columns(),
            kernels: plans,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
        return Ok(());
    }

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    for plan in &plans {
        println!("{}", formatter.format(plan));
    }

    Ok(())
}
