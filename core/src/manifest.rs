use crate::error::ManifestError;
use crate::types::{DeclaredDependencies, DependencySections};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// File name of an npm manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Reads dependency declarations out of `package.json` files
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestReader;

impl ManifestReader {
    pub fn new() -> Self {
        Self
    }

    /// Read `dependencies` and `devDependencies` from a manifest.
    ///
    /// Absent or non-object sections are treated as empty, and entries whose
    /// value is not a string are skipped.
    pub fn read_sections(&self, path: &Path) -> Result<DependencySections, ManifestError> {
        let parsed = Self::load(path)?;

        Ok(DependencySections {
            dependencies: Self::section(&parsed, "dependencies", path),
            dev_dependencies: Self::section(&parsed, "devDependencies", path),
        })
    }

    /// Read all declared dependencies of a manifest as one mapping.
    ///
    /// Never fails: an unreadable or malformed manifest is logged and yields
    /// an empty set, so one broken project cannot abort a multi-project scan.
    pub fn read_declared(&self, path: &Path) -> DeclaredDependencies {
        match self.read_sections(path) {
            Ok(sections) => sections.merged(),
            Err(e) => {
                warn!("Error scanning dependencies: {e}");
                DeclaredDependencies::new()
            }
        }
    }

    /// Read the `version` field of a manifest, if it is a string
    pub fn read_version(&self, path: &Path) -> Result<Option<String>, ManifestError> {
        let parsed = Self::load(path)?;
        Ok(parsed
            .get("version")
            .and_then(serde_json::Value::as_str)
            .map(String::from))
    }

    fn load(path: &Path) -> Result<serde_json::Value, ManifestError> {
        let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn section(parsed: &serde_json::Value, key: &str, path: &Path) -> DeclaredDependencies {
        let mut declared = DeclaredDependencies::new();

        let Some(entries) = parsed.get(key).and_then(serde_json::Value::as_object) else {
            return declared;
        };

        for (name, range) in entries {
            match range.as_str() {
                Some(range) => declared.declare(name.as_str(), range),
                None => debug!(
                    "Skipping {key}.{name} in {}: version range is not a string",
                    path.display()
                ),
            }
        }

        declared
    }
}
