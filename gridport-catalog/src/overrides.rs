//! Local id overrides.
//!
//! Some platform ids are unknown to the catalog even though the catalog has
//! the game. `LocalFixes.json` in the working directory maps such ids onto
//! the catalog's own ids:
//!
//! ```json
//! {
//!     // Oculus ids are not indexed
//!     "oculus": { "1180401875303371": { "id": 5248193 } }
//! }
//! ```
//!
//! Comments are allowed. A missing file is an empty table. Older setups
//! ship the file as `LocalFixes.JSON`, which is read when the lowercase name
//! is absent.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use json_comments::StripComments;
use serde::Deserialize;

use crate::error::CatalogError;

/// File name looked up in the working directory.
pub const OVERRIDES_FILE: &str = "LocalFixes.json";

/// Upper-case spelling used by older releases.
pub const LEGACY_OVERRIDES_FILE: &str = "LocalFixes.JSON";

/// The override file inside `dir`, falling back to the legacy spelling
/// when only that one exists.
pub fn overrides_path_in(dir: &Path) -> PathBuf {
    let path = dir.join(OVERRIDES_FILE);
    if path.exists() {
        return path;
    }
    let legacy = dir.join(LEGACY_OVERRIDES_FILE);
    if legacy.exists() { legacy } else { path }
}

/// The override file in the current working directory.
pub fn default_overrides_path() -> PathBuf {
    overrides_path_in(Path::new(""))
}

/// A canonical catalog id for one platform id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OverrideEntry {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

/// Accept the canonical id both as a JSON number and as a string.
fn id_as_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// `(source type, source id) -> canonical id`, read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct LocalOverrideTable {
    entries: HashMap<String, HashMap<String, OverrideEntry>>,
}

impl LocalOverrideTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the override file from the current working directory.
    pub fn load() -> Result<Self, CatalogError> {
        Self::load_from(&default_overrides_path())
    }

    /// Load an override file; a missing file yields an empty table.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            log::debug!("No override file at {}", path.display());
            return Ok(Self::empty());
        }

        let file = File::open(path)?;
        let table = Self::from_reader(BufReader::new(file)).map_err(|e| {
            CatalogError::Overrides {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        log::debug!(
            "Loaded {} id override(s) from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Ok(Self::from_reader(json.as_bytes())?)
    }

    fn from_reader(reader: impl Read) -> Result<Self, serde_json::Error> {
        let entries = serde_json::from_reader(StripComments::new(reader))?;
        Ok(Self { entries })
    }

    /// Canonical id for `(id_type, id)`, if one is configured.
    pub fn lookup(&self, id_type: &str, id: &str) -> Option<&str> {
        self.entries
            .get(id_type)
            .and_then(|ids| ids.get(id))
            .map(|entry| entry.id.as_str())
    }

    /// All overrides as `(type, id, canonical id)`, sorted.
    pub fn entries(&self) -> Vec<(&str, &str, &str)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .flat_map(|(id_type, ids)| {
                ids.iter()
                    .map(move |(id, entry)| (id_type.as_str(), id.as_str(), entry.id.as_str()))
            })
            .collect();
        all.sort_unstable();
        all
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        {
            // numeric and string ids are both accepted
            "egs": { "1234": { "id": 9999 } },
            /* block comments too */
            "oculus": {
                "1180401875303371": { "id": "5248193" }
            }
        }
    "#;

    #[test]
    fn lookup_tolerates_comments() {
        let table = LocalOverrideTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.lookup("egs", "1234"), Some("9999"));
        assert_eq!(table.lookup("oculus", "1180401875303371"), Some("5248193"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn lookup_misses_are_none() {
        let table = LocalOverrideTable::from_json_str(SAMPLE).unwrap();
        assert_eq!(table.lookup("egs", "5555"), None);
        assert_eq!(table.lookup("steam", "1234"), None);
    }

    #[test]
    fn missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = LocalOverrideTable::load_from(&dir.path().join(OVERRIDES_FILE)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERRIDES_FILE);
        std::fs::write(&path, SAMPLE).unwrap();
        let table = LocalOverrideTable::load_from(&path).unwrap();
        assert_eq!(
            table.entries(),
            vec![
                ("egs", "1234", "9999"),
                ("oculus", "1180401875303371", "5248193"),
            ]
        );
    }

    #[test]
    fn legacy_file_name_is_used_when_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LEGACY_OVERRIDES_FILE), SAMPLE).unwrap();

        let table = LocalOverrideTable::load_from(&overrides_path_in(dir.path())).unwrap();
        assert_eq!(table.lookup("egs", "1234"), Some("9999"));
    }

    #[test]
    fn lowercase_file_name_is_preferred() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(overrides_path_in(dir.path()), dir.path().join(OVERRIDES_FILE));

        std::fs::write(dir.path().join(OVERRIDES_FILE), SAMPLE).unwrap();
        assert_eq!(overrides_path_in(dir.path()), dir.path().join(OVERRIDES_FILE));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OVERRIDES_FILE);
        std::fs::write(&path, "{ \"egs\": [ }").unwrap();
        let err = LocalOverrideTable::load_from(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Overrides { .. }));
        assert!(err.is_fatal());
    }
}
