//! Encode raw 16-bit little-endian PCM into an ADTS AAC stream

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use aac_session::host::encode_stream;
use aac_session::{EncoderSession, FdkAacEngine, SessionConfig};
use anyhow::{Context, Result};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "aacenc", version, about = "Encode raw PCM into ADTS AAC")]
struct Args {
    /// Input file with interleaved 16-bit little-endian PCM ("-" for stdin)
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Output file for ADTS frames ("-" for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Sample rate in Hz (default: 8000)
    #[arg(short = 'r', long)]
    sample_rate: Option<u32>,

    /// Number of interleaved channels (default: 2)
    #[arg(short, long)]
    channels: Option<u32>,

    /// Log lifecycle and per-frame diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let directive = if args.verbose {
        "aac_session=trace"
    } else {
        "aac_session=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?),
        )
        .with_writer(io::stderr)
        .init();
    tracing::debug!(version = aac_session::VERSION, "aacenc starting");

    let config = SessionConfig {
        sample_rate: args.sample_rate,
        channels: args.channels,
    };
    let mut session = EncoderSession::open(FdkAacEngine::new(), config)
        .context("failed to open AAC encoder")?;

    let reader: Box<dyn Read> = if args.input.as_os_str() == "-" {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("failed to open {}", args.input.display()))?;
        Box::new(BufReader::new(file))
    };
    let writer: Box<dyn Write> = if args.output.as_os_str() == "-" {
        Box::new(io::stdout().lock())
    } else {
        let file = File::create(&args.output)
            .with_context(|| format!("failed to create {}", args.output.display()))?;
        Box::new(BufWriter::new(file))
    };

    let summary = encode_stream(&mut session, reader, writer).context("encoding failed")?;
    session.close();

    tracing::info!(
        chunks = summary.chunks,
        pcm_bytes = summary.pcm_bytes,
        encoded_bytes = summary.encoded_bytes,
        failed_chunks = summary.failed_chunks,
        "Done"
    );
    Ok(())
}
