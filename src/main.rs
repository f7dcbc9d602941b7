//! spangle - highlight a source file as HTML or ANSI text
//!
//! Reads FILE (or stdin), tokenizes it with the language named by
//! `--language` or detected from the file extension, and writes the
//! rendered result to stdout. Logs go to stderr.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spangle::{Config, Highlighter, OutputFormat};

/// spangle - pattern-table syntax highlighter
#[derive(Parser, Debug)]
#[command(name = "spangle")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to highlight (stdin when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Language to highlight as (default: detected from the file extension)
    #[arg(short, long, value_name = "NAME")]
    language: Option<String>,

    /// Output format (default: from the configuration file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Configuration file (default: ~/.spangle.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Wrap HTML output in <pre><code>
    #[arg(short, long)]
    wrap: bool,

    /// List known languages and exit
    #[arg(long)]
    list_languages: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => Config::load(),
    };

    let mut highlighter = Highlighter::from_config(&config);

    if args.list_languages {
        for name in highlighter.registry().languages() {
            println!("{}", name);
        }
        return Ok(());
    }

    let mut options = highlighter.options().clone();
    if let Some(format) = args.format {
        options.format = format;
    }
    options.wrap |= args.wrap;
    highlighter.set_options(options);

    let text = match &args.file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading stdin")?;
            text
        }
    };

    let language = args
        .language
        .clone()
        .or_else(|| {
            args.file
                .as_deref()
                .and_then(|path| highlighter.detect_language(path))
                .map(str::to_string)
        })
        .unwrap_or_default();

    if language.is_empty() {
        tracing::info!("no language given or detected, output is plain");
    } else {
        tracing::info!(%language, bytes = text.len(), "highlighting");
    }

    let output = highlighter.highlight(&language, &text);

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `-v`
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(filter)
        .init();
}
