//! Request/response channel over a closed set of operations.
//!
//! A request names its operation by channel string. Names outside the allow
//! list are rejected before any handler runs, so a rejected request never
//! touches the filesystem.

use anyhow::{Context, Result};
use depscan_core::{
    AggregateReport, DependencySections, ManifestReader, ProjectScanner, ProjectSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
}

/// Operations a caller may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetDependencies,
    GetNodeModulesLocation,
    GetDependencyReport,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::GetDependencies,
        Operation::GetNodeModulesLocation,
        Operation::GetDependencyReport,
    ];

    pub fn channel(self) -> &'static str {
        match self {
            Operation::GetDependencies => "get-dependencies",
            Operation::GetNodeModulesLocation => "get-node-modules-location",
            Operation::GetDependencyReport => "get-dependency-report",
        }
    }
}

impl FromStr for Operation {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.channel() == s)
            .ok_or_else(|| ChannelError::InvalidChannel(s.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.channel())
    }
}

/// One request line: `{"id": 1, "channel": "get-dependencies"}`
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Value,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Handler payload; may itself be `{"error": ...}`
    Result(Value),
    /// Refused at the boundary
    Rejected(String),
}

/// One reply line: `{"id": 1, "result": ...}` or `{"id": 1, "rejected": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub id: Value,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Reply {
    fn rejected(id: Value, err: &ChannelError) -> Self {
        Self {
            id,
            outcome: Outcome::Rejected(err.to_string()),
        }
    }
}

/// Parse a request line and map its channel onto an [`Operation`]
pub fn parse_request(line: &str) -> Result<(Value, Operation), (Value, ChannelError)> {
    let request: Request = serde_json::from_str(line)
        .map_err(|e| (Value::Null, ChannelError::MalformedRequest(e.to_string())))?;
    match request.channel.parse() {
        Ok(op) => Ok((request.id, op)),
        Err(e) => Err((request.id, e)),
    }
}

/// Handles allow-listed operations against a fixed set of projects
#[derive(Debug, Clone)]
pub struct Dispatcher {
    projects: Arc<[ProjectSpec]>,
    scanner: ProjectScanner,
}

impl Dispatcher {
    pub fn new(projects: Vec<ProjectSpec>, scanner: ProjectScanner) -> Self {
        Self {
            projects: projects.into(),
            scanner,
        }
    }

    /// Run one operation. Handler failures become an `{"error": message}` payload.
    pub fn handle(&self, op: Operation) -> Value {
        let payload = match op {
            Operation::GetDependencies => self.dependencies().and_then(|v| to_payload(&v)),
            Operation::GetNodeModulesLocation => {
                self.node_modules_locations().and_then(|v| to_payload(&v))
            }
            Operation::GetDependencyReport => to_payload(&self.report()),
        };

        payload.unwrap_or_else(|e| {
            error!("Error handling {op}: {e:#}");
            json!({ "error": e.to_string() })
        })
    }

    /// Parse, validate and answer one raw request line
    pub fn dispatch_line(&self, line: &str) -> Reply {
        match parse_request(line) {
            Ok((id, op)) => {
                debug!("Handling {op} (id {id})");
                Reply {
                    id,
                    outcome: Outcome::Result(self.handle(op)),
                }
            }
            Err((id, e)) => Reply::rejected(id, &e),
        }
    }

    /// Declared `dependencies` / `devDependencies` of every project.
    ///
    /// Unlike a scan this is strict: any unreadable manifest fails the whole request.
    pub fn dependencies(&self) -> Result<BTreeMap<String, DependencySections>> {
        let reader = ManifestReader::new();
        self.projects
            .iter()
            .map(|spec| -> Result<(String, DependencySections)> {
                let sections = reader.read_sections(&spec.manifest)?;
                Ok((spec.id.clone(), sections))
            })
            .collect()
    }

    /// Absolute installed-packages root of every project, `None` where absent
    pub fn node_modules_locations(&self) -> Result<BTreeMap<String, Option<PathBuf>>> {
        self.projects
            .iter()
            .map(|spec| -> Result<(String, Option<PathBuf>)> {
                let location = spec.node_modules_location().with_context(|| {
                    format!("Failed to locate {}", spec.node_modules.display())
                })?;
                Ok((spec.id.clone(), location))
            })
            .collect()
    }

    /// Aggregate report, generated fresh and not persisted
    pub fn report(&self) -> AggregateReport {
        AggregateReport::generate(&self.scanner, &self.projects)
    }
}

fn to_payload<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize response")
}
