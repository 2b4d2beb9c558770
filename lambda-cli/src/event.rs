//! Resolution of `--event` / `--context` arguments into JSON values

use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("'{0}' is neither valid JSON nor a path to an existing file")]
    Unresolvable(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file {} does not contain valid JSON", path.display())]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Decode a payload given inline as JSON or as a path to a JSON file
///
/// Inline JSON is tried first. An absent or empty argument yields `None`.
pub fn resolve_payload(raw: Option<&str>) -> Result<Option<Value>, PayloadError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Ok(None),
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => {
            tracing::debug!("Parsed JSON object: {}", value);
            Ok(Some(value))
        }
        Err(_) if Path::new(raw).is_file() => {
            let value = load_file(Path::new(raw))?;
            tracing::debug!("Loaded JSON object from file {}: {}", raw, value);
            Ok(Some(value))
        }
        Err(_) => Err(PayloadError::Unresolvable(raw.to_string())),
    }
}

fn load_file(path: &Path) -> Result<Value, PayloadError> {
    let text = fs::read_to_string(path).map_err(|source| PayloadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| PayloadError::InvalidFile {
        path: path.to_path_buf(),
        source,
    })
}
