// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Entry-file loading for the `iplpm` binary.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        source: serde_yaml_ng::Error,
    },
}

/// One prefix association from the entry file. The CIDR stays a string
/// here: it is validated at insertion time so that a malformed entry is
/// skipped with a report instead of rejecting the whole file.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub prefix: String,
    pub payload: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryFile {
    pub entries: Vec<Entry>,
}

/// Read and parse an entry file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not valid YAML of the expected
/// shape.
pub fn load_entry_file(path: &Path) -> Result<EntryFile, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_yaml_ng::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_file() {
        let text = r"
entries:
  - prefix: 10.0.0.0/8
    payload: rfc1918
  - prefix: 2001:db8::/32
    payload: doc
";
        let file: EntryFile = serde_yaml_ng::from_str(text).expect("valid entry file");
        assert_eq!(file.entries.len(), 2);
        assert_eq!(file.entries[0].prefix, "10.0.0.0/8");
        assert_eq!(file.entries[1].payload, "doc");
    }

    #[test]
    fn test_reject_wrong_shape() {
        assert!(serde_yaml_ng::from_str::<EntryFile>("entries: 3").is_err());
    }
}
