//! End-to-end run: load sources, resolve, write the destination
//!
//! Nothing is written unless the whole document resolves and renders.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sshush_resolve::{resolve, Mapping, ResolveError, ResolvedGroup};
use tracing::{debug, info};

use crate::source::{build_document, load_sources, LoadError, SourceFile};

/// What to do with the rendered output
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Write the rendered config to `out` instead of the destination
    pub dry_run: bool,

    /// Write the resolved hosts as JSON to `out` instead of the destination
    pub json: bool,

    /// Report the write on `out`
    pub verbose: bool,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub groups: usize,
    pub hosts: usize,

    /// Size of the rendered config
    pub bytes: usize,

    pub sources: Vec<SourceFile>,

    /// Destination that was written, None for dry runs and JSON output
    pub written: Option<PathBuf>,
}

/// Errors from a run, by the stage that failed
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("loading sources: {0}")]
    LoadingSources(#[from] LoadError),

    #[error("producing config: {0}")]
    ProducingConfig(#[from] ResolveError),

    #[error("writing {}: {source}", path.display())]
    Writing {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("serializing output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("writing output: {0}")]
    Output(#[source] io::Error),
}

/// JSON view of a run
#[derive(Serialize)]
struct JsonOutput<'a> {
    sources: &'a [SourceFile],
    groups: &'a [ResolvedGroup],
    global: &'a Mapping,
}

/// Renders `sources` into `destination`
#[derive(Debug, Clone)]
pub struct Runner {
    pub sources: Vec<PathBuf>,
    pub destination: PathBuf,
}

impl Runner {
    pub fn new(sources: Vec<PathBuf>, destination: PathBuf) -> Self {
        Self {
            sources,
            destination,
        }
    }

    pub fn run<W: Write>(&self, options: &RunOptions, out: &mut W) -> Result<RunReport, RunError> {
        let sources = load_sources(&self.sources)?;
        let document = build_document(&sources)?;
        let resolution = resolve(&document)?;
        let text = render_text(&resolution.to_lines()?);

        let mut report = RunReport {
            groups: resolution.groups.len(),
            hosts: resolution.host_count(),
            bytes: text.len(),
            sources,
            written: None,
        };

        if options.json {
            let json = serde_json::to_string_pretty(&JsonOutput {
                sources: &report.sources,
                groups: &resolution.groups,
                global: &resolution.global,
            })?;
            writeln!(out, "{}", json).map_err(RunError::Output)?;
        } else if options.dry_run {
            out.write_all(text.as_bytes()).map_err(RunError::Output)?;
        } else {
            write_atomic(&self.destination, &text).map_err(|source| RunError::Writing {
                path: self.destination.clone(),
                source,
            })?;
            info!(dest = %self.destination.display(), hosts = report.hosts, "wrote ssh config");
            if options.verbose {
                writeln!(
                    out,
                    "Wrote {} hosts to {}",
                    report.hosts,
                    self.destination.display()
                )
                .map_err(RunError::Output)?;
            }
            report.written = Some(self.destination.clone());
        }

        Ok(report)
    }
}

/// Join rendered lines into file contents.
pub fn render_text(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Write-then-rename so a reader never sees a half-written config.
///
/// A symlinked destination is followed: the link stays in place and its
/// target is replaced. An existing file keeps its permissions.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let target = resolve_destination(path)?;
    if target != path {
        debug!(link = %path.display(), target = %target.display(), "following symlinked destination");
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let permissions = fs::metadata(&target).ok().map(|m| m.permissions());

    let mut temp_name = target.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = target.with_file_name(temp_name);

    fs::write(&temp_path, contents)?;
    if let Some(permissions) = permissions {
        fs::set_permissions(&temp_path, permissions)?;
    }
    fs::rename(&temp_path, &target)?;
    Ok(())
}

/// The file a write to `path` should replace; `path` itself when it does not exist yet
fn resolve_destination(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(target) => Ok(target),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}
