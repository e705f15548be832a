//! Telemetry Link CLI Application
//!
//! This is the command-line interface for the telemetry link. It uses the
//! telemetry-decoder library and adds:
//! - Schema document loading from the command line or config.toml
//! - The read-decode-emit loop over a captured or live frame stream
//! - InfluxDB line-protocol output tagged by car and message class

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use telemetry_decoder::{Decoder, DecoderConfig};

mod config;
mod sink;

use sink::{LineProtocolSink, MeasurementSink};

/// Telemetry Link - decode vehicle bus frames into measurements
#[derive(Parser, Debug)]
#[command(name = "telemetry-cli")]
#[command(about = "Decode telemetry frame streams into tagged measurements", long_about = None)]
#[command(version)]
struct Args {
    /// Frame record source ("-" reads stdin)
    #[arg(short, long, value_name = "FILE")]
    frames: Option<PathBuf>,

    /// Path to schema document(s), JSON or TOML (can be repeated)
    #[arg(long = "schema", value_name = "FILE")]
    schemas: Vec<PathBuf>,

    /// Car tag attached to every emitted point
    #[arg(long, value_name = "NAME", default_value = "car")]
    car: String,

    /// Line-protocol output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Drop frames with no schema entry without reporting them
    #[arg(long)]
    skip_unknown: bool,

    /// Maximum number of frames to decode (for testing)
    #[arg(long, value_name = "COUNT")]
    max_frames: Option<usize>,

    /// Path to configuration file (config.toml) - alternative to flags
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Effective settings after merging flags or config file
struct RunSettings {
    frames: PathBuf,
    schemas: Vec<PathBuf>,
    car: String,
    output: Option<PathBuf>,
    identifiers: Option<Vec<u16>>,
    skip_unknown: bool,
    max_frames: Option<usize>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Telemetry Link CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", telemetry_decoder::VERSION);

    if args.frames.is_some() || !args.schemas.is_empty() {
        // Flag mode - everything from the command line
        let settings = RunSettings {
            frames: match args.frames {
                Some(path) => path,
                None => bail!("No frame source specified (use --frames)"),
            },
            schemas: args.schemas,
            car: args.car,
            output: args.output,
            identifiers: None,
            skip_unknown: args.skip_unknown,
            max_frames: args.max_frames,
        };
        run(settings)?;
    } else if let Some(config_path) = &args.config {
        // Config mode
        log::info!("Loading configuration from: {:?}", config_path);
        let config = config::load_config(config_path)?;

        let settings = RunSettings {
            frames: match config.input.frames {
                Some(path) => path,
                None => bail!("Config has no [input] frames entry"),
            },
            schemas: config.input.schema_files,
            car: config.link.car,
            output: config.sink.output,
            identifiers: config.filtering.identifiers,
            skip_unknown: config.filtering.skip_unknown,
            max_frames: args.max_frames.or(config.filtering.max_frames),
        };
        run(settings)?;
    } else {
        // No arguments - show help
        println!("Telemetry Link - No input specified");
        println!("\nQuick Start:");
        println!("  telemetry-cli --frames capture.log --schema bus.json");
        println!("  telemetry-cli --frames - --schema bus.json --car daybreak");
        println!("\nFor a persistent setup:");
        println!("  telemetry-cli --config config.toml");
        println!("\nUse --help for more options");
    }

    Ok(())
}

/// Load schemas, open the stream, decode, and emit measurements
fn run(settings: RunSettings) -> Result<()> {
    println!("═══════════════════════════════════════════════");
    println!("  Telemetry Link Decoder");
    println!("═══════════════════════════════════════════════\n");

    if settings.schemas.is_empty() {
        bail!("No schema documents specified (use --schema)");
    }

    // Create decoder and load schema documents
    let mut decoder = Decoder::new();
    for schema_path in &settings.schemas {
        print!("Loading schema: {:?} ... ", schema_path);
        io::stdout().flush()?;
        match decoder.add_schema_file(schema_path) {
            Ok(_) => println!("✓"),
            Err(e) => {
                println!("✗");
                eprintln!("Error loading schema: {}", e);
                return Err(e.into());
            }
        }
    }

    // Show schema table stats
    let stats = decoder.schema_stats();
    println!("\n📊 Schema Table:");
    println!("  Identifiers:  {}", stats.num_schemas);
    println!("  Measurements: {}", stats.num_measurements);

    // Surface authoring defects up front; they still fail per-frame later
    for finding in decoder.schemas().validate() {
        log::warn!("Schema defect: {}", finding);
    }

    let mut decoder_config = DecoderConfig::new().with_skip_unknown(settings.skip_unknown);
    if let Some(identifiers) = settings.identifiers.clone() {
        decoder_config = decoder_config.with_identifier_filter(identifiers);
    }
    if let Some(max) = settings.max_frames {
        decoder_config = decoder_config.with_max_frames(max);
    }

    println!("\n📄 Reading frames from: {:?}", settings.frames);
    println!("───────────────────────────────────────────────\n");

    let reader = open_frames(&settings.frames)?;

    // Points go to the output file when given, otherwise to stdout
    let summarize_to_stdout = settings.output.is_some();
    let out: Box<dyn Write> = match &settings.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create output {:?}", path))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut sink = LineProtocolSink::new(out, settings.car);

    let mut decoded_count: usize = 0;
    let mut dropped_count: usize = 0;

    for result in decoder.decode_stream(reader, decoder_config) {
        match result {
            Ok(frame) => {
                sink.write_frame(&frame, Utc::now())?;
                decoded_count += 1;

                let summary = frame
                    .measurements
                    .iter()
                    .map(|m| format!("{}={}", m.name, m.value))
                    .collect::<Vec<_>>()
                    .join(" ");
                if summarize_to_stdout {
                    println!("{} t={} {}", frame.hex_identifier, frame.timestamp, summary);
                } else {
                    log::debug!("{} t={} {}", frame.hex_identifier, frame.timestamp, summary);
                }
            }
            Err(e) => {
                // recoverable: drop the frame, keep reading
                log::warn!("Dropping frame: {}", e);
                dropped_count += 1;
            }
        }
    }

    sink.flush()?;

    println!("\n───────────────────────────────────────────────");
    println!("✓ {} frame(s) decoded, {} dropped", decoded_count, dropped_count);

    Ok(())
}

/// Open the frame source; "-" means stdin
fn open_frames(path: &PathBuf) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let file =
            File::open(path).with_context(|| format!("Failed to open frame source {:?}", path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
