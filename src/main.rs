use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use symdec::config::{Architecture, ElementType, FilterSpec, RoundMode, SaturationMode, Transport};
use symdec::design::LowpassDesign;
use symdec::wav::{load_mono_wav, save_mono_wav};
use symdec::{CascadeChain, FilterConfig, KernelOutput};

#[derive(Parser, Debug)]
#[command(name = "symdec")]
#[command(about = "Decimate a WAV file through a symmetric FIR cascade", long_about = None)]
struct Args {
    /// Input WAV file (first channel is used)
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Filter description in TOML; flags below are ignored when given
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Total FIR length
    #[arg(short = 'l', long, default_value = "64")]
    fir_len: usize,

    /// Decimation factor
    #[arg(short = 'd', long, default_value = "2")]
    decimate: usize,

    /// Number of cascaded kernels
    #[arg(long, default_value = "1")]
    cascade_len: usize,

    /// Samples per invocation
    #[arg(short = 'w', long, default_value = "256")]
    window_size: usize,

    /// Force a buffering strategy
    #[arg(short = 'a', long, value_enum)]
    architecture: Option<Architecture>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_spec(args: &Args) -> Result<FilterSpec> {
    if let Some(path) = &args.config {
        let content = fs::read_to_string(path).context("Failed to read filter config")?;
        return FilterSpec::from_toml(&content).context("Failed to parse filter config");
    }
    Ok(FilterSpec {
        data_type: ElementType::Float,
        coeff_type: ElementType::Float,
        fir_len: args.fir_len,
        decimate: args.decimate,
        shift: 0,
        round: RoundMode::default(),
        saturation: SaturationMode::default(),
        window_size: args.window_size,
        cascade_len: args.cascade_len,
        dual_input: false,
        reload: false,
        num_outputs: 1,
        transport: Transport::default(),
        architecture: args.architecture,
        taps: None,
        design: None,
    })
}

fn half_taps(spec: &FilterSpec, config: &FilterConfig) -> Result<Vec<f32>> {
    let taps = match (&spec.taps, &spec.design) {
        (Some(taps), _) => taps.clone(),
        (None, Some(design)) => design.half_taps(config.fir_len())?,
        (None, None) => LowpassDesign::for_decimation(config.decimate()).half_taps(config.fir_len())?,
    };
    Ok(taps.into_iter().map(|t| t as f32).collect())
}

/// Restore sample order of a two-output result
fn merge_outputs(out: KernelOutput<f32>, config: &FilterConfig) -> Vec<f32> {
    match out.secondary {
        Some(secondary) if config.transport() == Transport::Stream => {
            let len = config.stream_write_len();
            out.primary
                .chunks(len)
                .zip(secondary.chunks(len))
                .flat_map(|(a, b)| a.iter().chain(b).copied())
                .collect()
        }
        _ => out.primary,
    }
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

    let spec = load_spec(&args)?;
    if spec.data_type != ElementType::Float || spec.coeff_type != ElementType::Float {
        bail!(
            "WAV processing needs float data and coefficients, got {} x {}",
            spec.data_type,
            spec.coeff_type
        );
    }
    let config = spec.to_config().context("Invalid filter configuration")?;
    let taps = half_taps(&spec, &config)?;

    let input_path = args.input.to_string_lossy();
    let wav = load_mono_wav(&input_path).context("Failed to read input WAV")?;
    log::info!(
        "{}: {} samples at {} Hz",
        input_path,
        wav.samples.len(),
        wav.sample_rate
    );

    let chain = if config.reload() {
        CascadeChain::<f32, f32>::spawn_reloadable(&config)?
    } else {
        CascadeChain::<f32, f32>::spawn(&config, &taps)?
    };

    let window_size = config.window_size();
    let mut output = Vec::with_capacity(wav.samples.len() / config.decimate() + window_size);
    for (i, chunk) in wav.samples.chunks(window_size).enumerate() {
        let mut window = chunk.to_vec();
        window.resize(window_size, 0.0);
        let second = config.dual_input().then(|| window.clone());
        let reload = (config.reload() && i == 0).then(|| taps.clone());
        chain.push(window, second, reload)?;
        output.extend(merge_outputs(chain.recv()?, &config));
    }
    chain.finish()?;

    output.truncate(wav.samples.len().div_ceil(config.decimate()));
    let rate = wav.sample_rate / config.decimate() as u32;
    save_mono_wav(&args.output.to_string_lossy(), &output, rate)
        .context("Failed to write output WAV")?;
    println!(
        "Wrote {} samples at {} Hz to {}",
        output.len(),
        rate,
        args.output.display()
    );

    Ok(())
}
