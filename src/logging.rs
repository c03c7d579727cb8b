//! Logging setup for the sshush binary

use tracing_subscriber::EnvFilter;

/// Create an environment filter from the verbosity flags.
///
/// `RUST_LOG` takes precedence when set.
pub fn create_env_filter(verbose: bool, debug: bool) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    EnvFilter::new(format!("sshush={level},sshush_resolve={level}"))
}

/// Install the global subscriber. Logs go to stderr so stdout stays usable
/// for `--dry-run` and `--json` output.
pub fn init_logging(verbose: bool, debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(create_env_filter(verbose, debug))
        .with_writer(std::io::stderr)
        .with_target(debug)
        .init();
}
