use depscan_core::{
    MANIFEST_FILE, NODE_MODULES_DIR, ProjectSpec, REPORT_FILE, TIMESTAMP_KEY, normalize_path,
};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the project root when `--config` is not given
pub const CONFIG_FILE: &str = "depscan.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("No projects configured")]
    NoProjects,
    #[error("Duplicate project id '{0}'")]
    DuplicateProject(String),
    #[error("Project id '{0}' is reserved for the report timestamp")]
    ReservedProjectId(String),
}

/// A `[[projects]]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectEntry {
    pub id: String,
    pub root: PathBuf,
    /// Manifest path, relative to `root` (defaults to `package.json`)
    pub manifest: Option<PathBuf>,
    /// Installed-packages directory, relative to `root` (defaults to `node_modules`)
    pub node_modules: Option<PathBuf>,
}

impl ProjectEntry {
    fn new(id: &str, root: &str) -> Self {
        Self {
            id: id.to_string(),
            root: PathBuf::from(root),
            manifest: None,
            node_modules: None,
        }
    }

    fn to_spec(&self, base_dir: &Path) -> ProjectSpec {
        let root = resolve_path(base_dir, &self.root);
        let manifest = self
            .manifest
            .as_deref()
            .unwrap_or(Path::new(MANIFEST_FILE));
        let node_modules = self
            .node_modules
            .as_deref()
            .unwrap_or(Path::new(NODE_MODULES_DIR));

        ProjectSpec::new(
            self.id.clone(),
            resolve_path(&root, manifest),
            resolve_path(&root, node_modules),
        )
    }
}

/// On-disk shape of `depscan.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub output: PathBuf,
    pub include_missing: bool,
    pub projects: Vec<ProjectEntry>,
}

impl Default for ConfigFile {
    /// The Electric UI project next to the component sandbox, and the sandbox itself
    fn default() -> Self {
        Self {
            output: PathBuf::from(REPORT_FILE),
            include_missing: false,
            projects: vec![
                ProjectEntry::new("electricUi", "../electric-ui-project"),
                ProjectEntry::new("sandbox", "."),
            ],
        }
    }
}

/// Configuration with every path resolved
#[derive(Debug, Clone)]
pub struct Config {
    pub output: PathBuf,
    pub include_missing: bool,
    pub projects: Vec<ProjectSpec>,
}

impl Config {
    /// Load `explicit` if given, else `<root>/depscan.toml` if present, else defaults
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_path = root.join(CONFIG_FILE);
        if default_path.is_file() {
            Self::from_file(&default_path)
        } else {
            Self::resolve(root, &ConfigFile::default())
        }
    }

    /// Relative paths in the file resolve against the file's directory
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::resolve(base_dir, &file)
    }

    pub fn resolve(base_dir: &Path, file: &ConfigFile) -> Result<Self, ConfigError> {
        if file.projects.is_empty() {
            return Err(ConfigError::NoProjects);
        }

        let mut seen = HashSet::new();
        for project in &file.projects {
            if project.id == TIMESTAMP_KEY {
                return Err(ConfigError::ReservedProjectId(project.id.clone()));
            }
            if !seen.insert(project.id.as_str()) {
                return Err(ConfigError::DuplicateProject(project.id.clone()));
            }
        }

        Ok(Self {
            output: resolve_path(base_dir, &file.output),
            include_missing: file.include_missing,
            projects: file
                .projects
                .iter()
                .map(|p| p.to_spec(base_dir))
                .collect(),
        })
    }
}

/// Join `path` onto `base` unless already absolute, then fold `.` and `..`
fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    normalize_path(&base.join(path))
}
