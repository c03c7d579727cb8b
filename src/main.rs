//! sshush CLI
//!
//! Entry point for the `sshush` command-line tool.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sshush::config::{CliOverrides, EffectiveSettings};
use sshush::logging::init_logging;
use sshush::source::{expand_path, expand_sources};
use sshush::{RunOptions, Runner};
use tracing::debug;

#[derive(Parser)]
#[command(name = "sshush")]
#[command(about = "Render ssh_config from grouped host definitions", version)]
struct Cli {
    /// Path to settings file (default: sshush.toml or sshush.yml in ./, then ~/.ssh/)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Source file(s) to read; globs, ~ and $VARS are expanded
    #[arg(long = "source", short = 's')]
    sources: Vec<String>,

    /// Destination to write (default: ~/.ssh/config)
    #[arg(long)]
    dest: Option<String>,

    /// Verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Debug output
    #[arg(long)]
    debug: bool,

    /// Print the rendered config instead of writing it
    #[arg(long)]
    dry_run: bool,

    /// Print the resolved hosts as JSON instead of writing
    #[arg(long, conflicts_with = "dry_run")]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let overrides = CliOverrides {
        sources: cli.sources,
        dest: cli.dest,
        verbose: cli.verbose,
    };

    let settings = match EffectiveSettings::build(cli.config.as_deref(), overrides) {
        Ok(s) => s,
        Err(e) => fail("loading settings", e),
    };
    debug!(origins = ?settings.origins, "effective settings");

    let sources = match expand_sources(&settings.sources) {
        Ok(s) => s,
        Err(e) => fail("expanding sources", e),
    };
    let dest = match expand_path(&settings.dest) {
        Ok(d) => PathBuf::from(d),
        Err(e) => fail("expanding destination", e),
    };

    let options = RunOptions {
        dry_run: cli.dry_run,
        json: cli.json,
        verbose: settings.verbose,
    };

    let runner = Runner::new(sources, dest);
    let stdout = io::stdout();
    if let Err(e) = runner.run(&options, &mut stdout.lock()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn fail(stage: &str, err: impl fmt::Display) -> ! {
    eprintln!("Error: {}: {}", stage, err);
    process::exit(1);
}
