use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use replay_dump::{
    decode_file, DecodeFailure, DumpConfig, Error, EventSink, JsonLinesTranscript,
    PlainTranscript, Summary,
};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "replay-dump")]
#[command(about = "Dump the contents of a recorded execution stream", long_about = None)]
#[command(version)]
struct Cli {
    /// record/replay dump to read from
    #[arg(short, long)]
    file: PathBuf,

    #[arg(long, value_enum, default_value = "plain")]
    format: OutputFormat,

    /// Fail on async data whose checkpoint does not match
    #[arg(long)]
    strict_checkpoints: bool,

    /// Decode with this format version's event table (decimal or 0x-hex)
    #[arg(long, value_parser = parse_version)]
    force_version: Option<u32>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Plain,
    Json,
}

fn parse_version(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid version '{s}': {e}"))
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Decode and report; `Ok(false)` means decoding failed and was reported.
fn run(cli: Cli) -> Result<bool> {
    let mut builder = DumpConfig::builder()
        .trace(cli.file)
        .strict_checkpoints(cli.strict_checkpoints);
    if let Some(version) = cli.force_version {
        builder = builder.version_override(version);
    }
    let config = builder.build()?;

    let stdout = BufWriter::new(std::io::stdout().lock());
    match cli.format {
        OutputFormat::Plain => dump(&config, PlainTranscript::new(stdout)),
        OutputFormat::Json => dump(&config, JsonLinesTranscript::new(stdout)),
    }
}

/// Closing lines shared by both output formats.
trait Transcript: EventSink {
    fn summary(&mut self, summary: &Summary) -> std::io::Result<()>;
    fn failure(&mut self, failure: &DecodeFailure) -> std::io::Result<()>;
    fn finish(self) -> std::io::Result<usize>;
}

impl<W: Write> Transcript for PlainTranscript<W> {
    fn summary(&mut self, summary: &Summary) -> std::io::Result<()> {
        PlainTranscript::summary(self, summary)
    }
    fn failure(&mut self, failure: &DecodeFailure) -> std::io::Result<()> {
        PlainTranscript::failure(self, failure)
    }
    fn finish(self) -> std::io::Result<usize> {
        PlainTranscript::finish(self)
    }
}

impl<W: Write> Transcript for JsonLinesTranscript<W> {
    fn summary(&mut self, summary: &Summary) -> std::io::Result<()> {
        JsonLinesTranscript::summary(self, summary)
    }
    fn failure(&mut self, failure: &DecodeFailure) -> std::io::Result<()> {
        JsonLinesTranscript::failure(self, failure)
    }
    fn finish(self) -> std::io::Result<usize> {
        JsonLinesTranscript::finish(self)
    }
}

fn dump<T: Transcript>(config: &DumpConfig, mut out: T) -> Result<bool> {
    let ok = match decode_file(config, &mut out) {
        Ok(summary) => {
            out.summary(&summary)?;
            true
        }
        Err(Error::Decode(failure)) => {
            out.failure(&failure)?;
            false
        }
        Err(e) => return Err(e).context("failed to decode trace"),
    };
    out.finish()?;
    Ok(ok)
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
