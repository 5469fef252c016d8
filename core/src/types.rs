use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Sentinel written when an installed package's own manifest has no readable version
pub const UNKNOWN_VERSION: &str = "unknown";

/// A single name/range pair as declared in a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyDeclaration<'a> {
    pub name: &'a str,
    /// Declared range, kept verbatim (never parsed)
    pub declared_version: &'a str,
}

/// Declared dependencies of one manifest, keyed by package name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclaredDependencies(BTreeMap<String, String>);

impl DeclaredDependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `name`, replacing any earlier range for the same name
    pub fn declare(&mut self, name: impl Into<String>, declared_version: impl Into<String>) {
        self.0.insert(name.into(), declared_version.into());
    }

    /// Merge `other` into `self`; entries from `other` win
    pub fn merge(&mut self, other: &DeclaredDependencies) {
        for decl in other.iter() {
            self.declare(decl.name, decl.declared_version);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Declarations in name order
    pub fn iter(&self) -> impl Iterator<Item = DependencyDeclaration<'_>> {
        self.0.iter().map(|(name, range)| DependencyDeclaration {
            name,
            declared_version: range,
        })
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for DeclaredDependencies {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut declared = Self::new();
        for (name, range) in iter {
            declared.declare(name, range);
        }
        declared
    }
}

/// The two dependency sections of a manifest, kept apart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySections {
    pub dependencies: DeclaredDependencies,
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: DeclaredDependencies,
}

impl DependencySections {
    /// Runtime and development dependencies in one mapping.
    /// A name present in both sections keeps its development range.
    pub fn merged(&self) -> DeclaredDependencies {
        let mut all = self.dependencies.clone();
        all.merge(&self.dev_dependencies);
        all
    }
}

/// Version found in an installed package's own manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstalledVersion {
    Known(String),
    Unknown,
}

impl InstalledVersion {
    pub fn is_unknown(&self) -> bool {
        matches!(self, InstalledVersion::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            InstalledVersion::Known(version) => version,
            InstalledVersion::Unknown => UNKNOWN_VERSION,
        }
    }
}

impl From<String> for InstalledVersion {
    fn from(value: String) -> Self {
        if value == UNKNOWN_VERSION {
            InstalledVersion::Unknown
        } else {
            InstalledVersion::Known(value)
        }
    }
}

impl From<InstalledVersion> for String {
    fn from(value: InstalledVersion) -> Self {
        match value {
            InstalledVersion::Known(version) => version,
            InstalledVersion::Unknown => UNKNOWN_VERSION.to_string(),
        }
    }
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared dependency confirmed present under the installed-packages root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDependency {
    /// Package name; serialized as the key of the enclosing map
    #[serde(skip)]
    pub name: String,
    pub declared_version: String,
    pub installed_version: InstalledVersion,
    /// Directory the package was found in
    pub location: PathBuf,
}
