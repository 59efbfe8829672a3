use serde::de::DeserializeOwned;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Load a calculator input from `--input <file>` or, failing that, from JSON
/// piped on stdin. `None` means neither was supplied and flags apply.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> CliResult<Option<T>> {
    if let Some(path) = path {
        return read_file(path).map(Some);
    }
    read_stdin()
}

/// Deserialise a JSON or YAML file, picked by extension.
pub fn read_file<T: DeserializeOwned>(path: &str) -> CliResult<T> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;

    let is_yaml = matches!(
        resolved.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let parsed = if is_yaml {
        serde_yaml::from_str(&contents).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&contents).map_err(|e| e.to_string())
    };
    parsed.map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e).into())
}

fn read_stdin<T: DeserializeOwned>() -> CliResult<Option<T>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

fn resolve_path(path: &str) -> CliResult<PathBuf> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.is_file() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    Ok(resolved)
}
