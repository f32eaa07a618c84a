//! qcordic command-line front end
//!
//! ## Usage
//!
//! ```bash
//! # Float angle table and gain for 16 iterations
//! qcordic lut -N 16
//!
//! # Q0.30 embedding words, persist K, fill an HDL template
//! qcordic lut -N 16 --m 0 --n 30 --gain-file cordic_k \
//!     --template rtl/CORDIC_UNIT_TEMPLATE.v --output rtl/CORDIC_UNIT_GENERATED.v
//!
//! # Codec
//! qcordic encode -- -1.125 --m 2 --n 5
//! qcordic decode 110.11100 --m 2 --n 5
//!
//! # Directed + swept suites, 100 random vectors, 4 simulated units
//! qcordic verify --random 100 --seed 7 --units 4
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use qcordic_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use qcordic_core::{decode_bits, decode_word, encode, read_gain, CordicLut, CordicMode, QFormat};
use qcordic_fpga::harness::{Harness, HarnessConfig, TestPlan};

#[derive(Parser, Debug)]
#[command(name = "qcordic")]
#[command(version)]
#[command(about = "Fixed-point CORDIC LUT generator and verification harness", long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "compact", global = true)]
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the arctangent table and gain K
    Lut {
        /// Number of CORDIC iterations
        #[arg(short = 'N', long = "niter", default_value_t = 16)]
        iterations: usize,

        /// Integer bits in Qm.n (excluding sign)
        #[arg(long)]
        m: Option<u32>,

        /// Fractional bits in Qm.n
        #[arg(long)]
        n: Option<u32>,

        /// Write K to this file
        #[arg(long)]
        gain_file: Option<PathBuf>,

        /// HDL template with parameter and LUT markers
        #[arg(long, requires_all = ["m", "n", "output"])]
        template: Option<PathBuf>,

        /// Filled HDL output path
        #[arg(long, requires = "template")]
        output: Option<PathBuf>,
    },

    /// Encode a value as a Qm.n word
    Encode {
        #[arg(allow_negative_numbers = true)]
        value: f64,

        #[arg(long)]
        m: u32,

        #[arg(long)]
        n: u32,
    },

    /// Decode a bit string (e.g. 0011.1100) or a 0x-prefixed container word
    Decode {
        bits: String,

        #[arg(long)]
        m: u32,

        #[arg(long)]
        n: u32,
    },

    /// Run the verification suites against the simulated unit
    Verify {
        /// JSON harness configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the iteration count
        #[arg(long)]
        iterations: Option<usize>,

        /// Override the comparison tolerance
        #[arg(long)]
        tolerance: Option<f64>,

        /// Random vectors per mode in addition to the directed and swept suites
        #[arg(long, default_value_t = 0)]
        random: usize,

        /// Seed for the random vectors
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Number of simulated units to shard the plan across
        #[arg(long, default_value_t = 1)]
        units: usize,

        /// Print every vector, not only failures
        #[arg(long)]
        all: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => LogLevel::Warn,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&LogConfig {
        level,
        format: args.log_format.into(),
        ..Default::default()
    });

    match args.command {
        Command::Lut {
            iterations,
            m,
            n,
            gain_file,
            template,
            output,
        } => run_lut(iterations, m, n, gain_file, template, output),
        Command::Encode { value, m, n } => run_encode(value, m, n),
        Command::Decode { bits, m, n } => run_decode(&bits, m, n),
        Command::Verify {
            config,
            iterations,
            tolerance,
            random,
            seed,
            units,
            all,
        } => run_verify(config, iterations, tolerance, random, seed, units, all),
    }
}

fn parse_format(m: u32, n: u32) -> Result<QFormat> {
    QFormat::new(m, n).with_context(|| format!("invalid format Q{}.{}", m, n))
}

fn run_lut(
    iterations: usize,
    m: Option<u32>,
    n: Option<u32>,
    gain_file: Option<PathBuf>,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = match (m, n) {
        (Some(m), Some(n)) => Some(parse_format(m, n)?),
        (None, None) => None,
        _ => bail!("--m and --n must be given together"),
    };
    let lut = CordicLut::generate(iterations).context("LUT generation failed")?;

    print!("{}", lut.describe(format));

    if let Some(path) = gain_file {
        lut.write_gain(&path)
            .with_context(|| format!("writing gain to {}", path.display()))?;
        let stored = read_gain(&path)?;
        tracing::debug!(stored, "gain artifact verified");
    }

    if let (Some(template), Some(output), Some(format)) = (template, output, format) {
        let text = std::fs::read_to_string(&template)
            .with_context(|| format!("reading template {}", template.display()))?;
        let filled = lut.fill_hdl_template(&text, format)?;
        std::fs::write(&output, filled)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("\n# Wrote HDL lookup table to {}", output.display());
    }
    Ok(())
}

fn run_encode(value: f64, m: u32, n: u32) -> Result<()> {
    let format = parse_format(m, n)?;
    let word = encode(value, format)?;
    println!(
        "{}  {}  raw={}  value={}",
        word.bit_string(),
        word.hex(),
        word.raw(),
        word.to_f64()
    );
    Ok(())
}

fn run_decode(bits: &str, m: u32, n: u32) -> Result<()> {
    let format = parse_format(m, n)?;
    let value = match bits.strip_prefix("0x").or_else(|| bits.strip_prefix("0X")) {
        Some(hex) => {
            let word = u32::from_str_radix(hex, 16)
                .with_context(|| format!("invalid hex word \"{}\"", bits))?;
            decode_word(word, format)?
        }
        None => decode_bits(bits, format)?,
    };
    println!("{}", value);
    Ok(())
}

fn run_verify(
    config_path: Option<PathBuf>,
    iterations: Option<usize>,
    tolerance: Option<f64>,
    random: usize,
    seed: u64,
    units: usize,
    all: bool,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(iterations) = iterations {
        config = config.iterations(iterations);
    }
    if let Some(tolerance) = tolerance {
        config = config.tolerance(tolerance);
    }

    let harness = Harness::new(config.clone())?;

    let mut plan = TestPlan::standard();
    if random > 0 {
        plan.extend(TestPlan::random(random, seed, CordicMode::Rotation));
        plan.extend(TestPlan::random(random, seed.wrapping_add(1), CordicMode::Vectoring));
    }

    let report = if units > 1 {
        let mut pool = qcordic_fpga::create_units(&config, units)?;
        harness.run_parallel(&mut pool, &plan)?
    } else {
        let mut unit = qcordic_fpga::create_default(&config)?;
        harness.run_plan(&mut unit, &plan)?
    };

    if all {
        for result in &report.results {
            println!("{}", result);
        }
    }
    print!("{}", report);

    if !report.is_success() {
        bail!(
            "verification failed: {} of {} vectors out of tolerance",
            report.failed(),
            report.total()
        );
    }
    Ok(())
}
