//! Command-line interface for seams
//!
//! Splits each input line on separator literals while respecting brackets,
//! quotes, and escapes, and prints the segments in the selected format.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use seams_core::Options;

/// Split strings on separators, respecting brackets, quotes, and escapes
#[derive(Debug, Parser)]
#[command(name = "seams", version, about)]
struct Cli {
    /// Strings to split; reads lines from stdin when omitted
    #[arg(value_name = "STRING")]
    input: Vec<String>,

    /// Separator literal; repeat to try several in order
    #[arg(short = 'd', long = "separator", value_name = "SEP")]
    separators: Vec<String>,

    /// Suppress splits inside <>, (), [], and {} pairs
    #[arg(short, long)]
    brackets: bool,

    /// Treat quote characters as ordinary text
    #[arg(long)]
    no_quotes: bool,

    /// Keep quote delimiters in the output
    #[arg(long)]
    keep_quotes: bool,

    /// Keep escape backslashes in the output
    #[arg(long)]
    keep_escaping: bool,

    /// Fail on unterminated brackets and quotes instead of degrading
    #[arg(short, long)]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tsv")]
    format: OutputFormat,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Segments joined by tabs, one input per line
    Tsv,
    /// One JSON object per input with the input and its segments
    Json,
}

#[derive(Debug, Serialize)]
struct SplitRecord<'a> {
    input: &'a str,
    segments: &'a [String],
}

impl Cli {
    fn options(&self) -> Options {
        let mut options = Options::new();
        if !self.separators.is_empty() {
            options = options.separators(self.separators.clone());
        }
        options
            .brackets(self.brackets)
            .quotes(!self.no_quotes)
            .keep_quotes(self.keep_quotes)
            .keep_escaping(self.keep_escaping)
            .strict(self.strict)
    }

    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();
    log::debug!("options: {options:?}");

    let inputs: Vec<String> = if cli.input.is_empty() {
        log::info!("no arguments given, reading lines from stdin");
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<_>>()
            .context("failed to read stdin")?
    } else {
        cli.input.clone()
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for input in &inputs {
        let segments = seams_core::split_with(input, &options)
            .with_context(|| format!("failed to split {input:?}"))?;
        match cli.format {
            OutputFormat::Tsv => {
                writeln!(out, "{}", segments.join("\t"))?;
            }
            OutputFormat::Json => {
                let record = SplitRecord {
                    input,
                    segments: &segments,
                };
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    cli.init_logging();
    if let Err(err) = run(&cli) {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("seams").chain(args.iter().copied()))
    }

    #[test]
    fn test_default_options_split_on_dots() {
        let cli = parse(&["a.b.c"]);
        let options = cli.options();
        assert_eq!(seams_core::split_with("a.b.c", &options).unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn test_separator_flag_overrides_default() {
        let cli = parse(&["-d", ",", "a,b"]);
        let options = cli.options();
        assert_eq!(seams_core::split_with("a,b", &options).unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_brackets_flag_enables_bracket_handling() {
        let cli = parse(&["--brackets", "a.{b.c}.d"]);
        let options = cli.options();
        assert_eq!(
            seams_core::split_with("a.{b.c}.d", &options).unwrap(),
            ["a", "{b.c}", "d"]
        );
    }
}
