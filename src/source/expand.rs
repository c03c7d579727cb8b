//! Source path expansion
//!
//! Each configured source is a path pattern. `~` and `$VAR`/`${VAR}` are
//! expanded first; a pattern with glob metacharacters is then matched against
//! the files under its literal base directory.

use std::env;
use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::LoadError;

const GLOB_CHARS: &[char] = &['*', '?', '[', '{'];

/// Expand every pattern, keeping pattern order; matches of one glob are sorted.
pub fn expand_sources(patterns: &[String]) -> Result<Vec<PathBuf>, LoadError> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let expanded = expand_path(pattern)?;
        if expanded.contains(GLOB_CHARS) {
            let matches = expand_glob(&expanded)?;
            if matches.is_empty() {
                warn!(pattern = %pattern, "source pattern matched no files");
            }
            paths.extend(matches);
        } else {
            paths.push(PathBuf::from(expanded));
        }
    }
    Ok(paths)
}

/// Expand environment variables and a leading `~`.
///
/// Unset variables expand to the empty string.
pub fn expand_path(raw: &str) -> Result<String, LoadError> {
    let expanded = expand_env(raw, |name| env::var(name).ok());

    if expanded == "~" || expanded.starts_with("~/") {
        let home = dirs::home_dir().ok_or(LoadError::NoHome)?;
        return Ok(format!("{}{}", home.to_string_lossy(), &expanded[1..]));
    }

    Ok(expanded)
}

fn expand_env(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }

        out.push_str(&lookup(name).unwrap_or_default());
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

/// Files matching `pattern`, sorted. `*` does not cross directory separators.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>, LoadError> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher();

    let (base, depth) = glob_base(Path::new(pattern));
    let root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };
    debug!(pattern, root = %root.display(), "expanding source glob");

    let mut walker = WalkDir::new(&root).follow_links(true);
    if let Some(depth) = depth {
        walker = walker.max_depth(depth);
    }

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let candidate = if base.as_os_str().is_empty() {
            entry.path().strip_prefix(".").unwrap_or(entry.path())
        } else {
            entry.path()
        };
        if matcher.is_match(candidate) {
            matches.push(candidate.to_path_buf());
        }
    }

    matches.sort();
    Ok(matches)
}

/// Literal leading directory of a pattern and the walk depth below it.
///
/// Depth is `None` when the pattern contains `**`.
fn glob_base(pattern: &Path) -> (PathBuf, Option<usize>) {
    let mut base = PathBuf::new();
    let mut components = pattern.components().peekable();

    while let Some(component) = components.peek() {
        let is_glob = match component {
            Component::Normal(part) => part.to_string_lossy().contains(GLOB_CHARS),
            _ => false,
        };
        if is_glob {
            break;
        }
        base.push(component.as_os_str());
        components.next();
    }

    let remaining: Vec<Component<'_>> = components.collect();
    let recursive = remaining
        .iter()
        .any(|c| c.as_os_str().to_string_lossy().contains("**"));

    if recursive {
        (base, None)
    } else {
        (base, Some(remaining.len()))
    }
}
