use crate::manifest::MANIFEST_FILE;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Directory npm installs packages into
pub const NODE_MODULES_DIR: &str = "node_modules";

/// One project to scan: its identifier in the report and where its files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    pub id: String,
    pub manifest: PathBuf,
    pub node_modules: PathBuf,
}

impl ProjectSpec {
    pub fn new(id: impl Into<String>, manifest: PathBuf, node_modules: PathBuf) -> Self {
        Self {
            id: id.into(),
            manifest,
            node_modules,
        }
    }

    /// Standard npm layout: `<root>/package.json` and `<root>/node_modules`
    pub fn from_root(id: impl Into<String>, root: &Path) -> Self {
        Self::new(id, root.join(MANIFEST_FILE), root.join(NODE_MODULES_DIR))
    }

    /// Absolute path of the installed-packages root, or `None` if it does not exist
    pub fn node_modules_location(&self) -> io::Result<Option<PathBuf>> {
        if !self.node_modules.try_exists()? {
            return Ok(None);
        }
        std::path::absolute(&self.node_modules).map(|p| Some(normalize_path(&p)))
    }
}

/// Lexically drop `.` components and fold `..` into its parent.
///
/// `..` directly under the root stays at the root; leading `..` of a relative
/// path are kept.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(Component::ParentDir),
            },
            other => normalized.push(other),
        }
    }

    normalized
}
