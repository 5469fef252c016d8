use crate::manifest::{MANIFEST_FILE, ManifestReader};
use crate::types::{DeclaredDependencies, InstalledVersion, ResolvedDependency};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of resolving one manifest's declarations against `node_modules`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Declared packages that have a directory under the root
    pub resolved: BTreeMap<String, ResolvedDependency>,
    /// Declared packages with no directory under the root (or one that could not be checked)
    pub missing: Vec<String>,
}

/// Matches declared dependencies against an installed-packages directory.
///
/// Resolution is driven by the declarations: directories under the root that
/// nothing declares are never looked at.
pub struct InstalledResolver {
    root: PathBuf,
    reader: ManifestReader,
}

impl InstalledResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reader: ManifestReader::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, declared: &DeclaredDependencies) -> Resolution {
        let mut resolution = Resolution::default();

        for decl in declared.iter() {
            // Scoped names (`@scope/pkg`) are joined as-is
            let location = self.root.join(decl.name);

            match location.try_exists() {
                Ok(true) => {}
                Ok(false) => {
                    resolution.missing.push(decl.name.to_string());
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Could not check {} for {}, treating it as not installed: {e}",
                        location.display(),
                        decl.name
                    );
                    resolution.missing.push(decl.name.to_string());
                    continue;
                }
            }

            let installed_version = self.installed_version(&location);
            resolution.resolved.insert(
                decl.name.to_string(),
                ResolvedDependency {
                    name: decl.name.to_string(),
                    declared_version: decl.declared_version.to_string(),
                    installed_version,
                    location,
                },
            );
        }

        resolution
    }

    fn installed_version(&self, location: &Path) -> InstalledVersion {
        let manifest = location.join(MANIFEST_FILE);
        match self.reader.read_version(&manifest) {
            Ok(Some(version)) => InstalledVersion::Known(version),
            Ok(None) => {
                debug!("{} has no version field", manifest.display());
                InstalledVersion::Unknown
            }
            Err(e) => {
                debug!("{e}");
                InstalledVersion::Unknown
            }
        }
    }
}
