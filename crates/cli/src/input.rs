// Input discovery: argument, then settings default, then newest glob match

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use prtrack_config::Settings;

use crate::exit_codes::EXIT_NO_INPUT;
use crate::CliError;

/// How the input file was chosen, for the verbose log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Argument,
    Configured,
    Discovered,
}

/// Pick the PR control file to work on.
pub fn resolve_input(
    arg: Option<PathBuf>,
    settings: &Settings,
    dir: &Path,
) -> Result<(PathBuf, InputSource), CliError> {
    if let Some(path) = arg {
        return Ok((path, InputSource::Argument));
    }
    if let Some(path) = &settings.input.default {
        return Ok((path.clone(), InputSource::Configured));
    }

    match discover(dir, &settings.input.search)? {
        Some(path) => Ok((path, InputSource::Discovered)),
        None => Err(no_input(&settings.input.search)),
    }
}

/// Newest regular file in `dir` whose name matches any pattern (case-insensitive).
pub fn discover(dir: &Path, patterns: &[String]) -> Result<Option<PathBuf>, CliError> {
    let compiled = patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| {
                CliError::config(format!("invalid input.search pattern '{p}': {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if compiled.is_empty() {
        return Ok(None);
    }

    let match_opts = glob::MatchOptions {
        case_sensitive: false,
        require_literal_separator: false,
        require_literal_leading_dot: true,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("cannot list {}: {e}", dir.display());
            return Ok(None);
        }
    };

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !compiled.iter().any(|p| p.matches_with(name, match_opts)) {
            continue;
        }

        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        log::debug!("candidate input {name}");
        let newer = match &best {
            Some((t, path)) => mtime > *t || (mtime == *t && entry.path() < *path),
            None => true,
        };
        if newer {
            best = Some((mtime, entry.path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

fn no_input(patterns: &[String]) -> CliError {
    let hint = if patterns.is_empty() {
        "pass a file: prtrack summary <FILE>".to_string()
    } else {
        format!(
            "pass a file, set input.default in settings, or add a file matching {}",
            patterns.join(", ")
        )
    };
    CliError::new(EXIT_NO_INPUT, "no PR control file found")
        .with_hint(hint)
        .info()
}
