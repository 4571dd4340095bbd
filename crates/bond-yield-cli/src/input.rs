use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load a JSON request from `--input <path>` (`-` for stdin), or from piped
/// stdin when no path is given.
///
/// Returns `None` when there is no path and stdin is an interactive TTY, so
/// the caller can fall back to individual flags.
pub fn read_json_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some("-") => {
            let value = read_stdin()?.ok_or("--input - was given but stdin is empty")?;
            Ok(Some(value))
        }
        Some(path) => read_file(path).map(Some),
        None if atty::is(atty::Stream::Stdin) => Ok(None),
        None => read_stdin(),
    }
}

fn read_file<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let resolved = resolve_path(path)?;
    debug!(path = %resolved.display(), "reading JSON request");
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?;
    Ok(value)
}

fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    debug!(bytes = trimmed.len(), "reading JSON request from stdin");
    let value: T = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin JSON: {}", e))?;
    Ok(Some(value))
}

fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.is_file() {
        return Err(format!("Not a readable file: {}", resolved.display()).into());
    }
    Ok(resolved)
}
