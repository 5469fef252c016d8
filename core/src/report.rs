use crate::error::ReportError;
use crate::manifest::ManifestReader;
use crate::project::ProjectSpec;
use crate::resolver::InstalledResolver;
use crate::types::ResolvedDependency;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default file name of a persisted report
pub const REPORT_FILE: &str = "dependency-report.json";

/// Top-level report key holding the generation time; no project may use it as its id
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Installed dependencies of one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDependencyReport {
    /// Always `packages.len()`
    pub package_count: usize,
    pub packages: BTreeMap<String, ResolvedDependency>,
    /// Declared but not installed; only filled when requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

impl ProjectDependencyReport {
    pub fn new(packages: BTreeMap<String, ResolvedDependency>, missing: Vec<String>) -> Self {
        Self {
            package_count: packages.len(),
            packages,
            missing,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedDependency> {
        self.packages.get(name)
    }

    /// Packages whose installed version could not be determined
    pub fn unknown_count(&self) -> usize {
        self.packages
            .values()
            .filter(|dep| dep.installed_version.is_unknown())
            .count()
    }

    fn restore_names(&mut self) {
        for (name, dep) in &mut self.packages {
            dep.name.clone_from(name);
        }
    }
}

/// Scans single projects: manifest, then installed packages
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectScanner {
    reader: ManifestReader,
    include_missing: bool,
}

impl ProjectScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also list declared-but-absent packages in each project report
    pub fn include_missing(mut self, include_missing: bool) -> Self {
        self.include_missing = include_missing;
        self
    }

    pub fn scan(&self, spec: &ProjectSpec) -> ProjectDependencyReport {
        info!("Scanning {} project dependencies...", spec.id);

        let declared = self.reader.read_declared(&spec.manifest);
        let resolution = InstalledResolver::new(&spec.node_modules).resolve(&declared);

        debug!(
            "{}: {} declared, {} installed, {} missing",
            spec.id,
            declared.len(),
            resolution.resolved.len(),
            resolution.missing.len()
        );

        let missing = if self.include_missing {
            resolution.missing
        } else {
            Vec::new()
        };
        ProjectDependencyReport::new(resolution.resolved, missing)
    }
}

/// Combined report over every scanned project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// ISO-8601 UTC, millisecond precision
    pub timestamp: String,
    /// Keyed by project identifier, serialized alongside `timestamp`
    #[serde(flatten)]
    pub projects: BTreeMap<String, ProjectDependencyReport>,
}

impl AggregateReport {
    pub fn new(projects: BTreeMap<String, ProjectDependencyReport>) -> Self {
        Self::with_timestamp(Utc::now(), projects)
    }

    pub fn with_timestamp(
        generated_at: DateTime<Utc>,
        projects: BTreeMap<String, ProjectDependencyReport>,
    ) -> Self {
        Self {
            timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            projects,
        }
    }

    /// Scan every project in order and aggregate the results
    pub fn generate(scanner: &ProjectScanner, specs: &[ProjectSpec]) -> Self {
        let projects = specs
            .iter()
            .map(|spec| (spec.id.clone(), scanner.scan(spec)))
            .collect();
        Self::new(projects)
    }

    pub fn project(&self, id: &str) -> Option<&ProjectDependencyReport> {
        self.projects.get(id)
    }

    pub fn total_packages(&self) -> usize {
        self.projects.values().map(|p| p.package_count).sum()
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(ReportError::Serialize)
    }

    /// Write the report as pretty JSON, replacing any existing file
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json_pretty()?;
        fs::write(path, json + "\n").map_err(|source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Report saved to {}", path.display());
        Ok(())
    }

    /// Load a previously written report
    pub fn read_from(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut report: Self =
            serde_json::from_str(&content).map_err(|source| ReportError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        for project in report.projects.values_mut() {
            project.restore_names();
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::MANIFEST_FILE;
    use crate::project::NODE_MODULES_DIR;
    use crate::types::InstalledVersion;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn write(&self, relative: &str, content: &str) {
            let path = self.dir.path().join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn spec(&self, id: &str, project: &str) -> ProjectSpec {
            ProjectSpec::from_root(id, &self.dir.path().join(project))
        }
    }

    fn two_projects() -> (Fixture, Vec<ProjectSpec>) {
        let fx = Fixture::new();
        fx.write(
            "electric-ui-project/package.json",
            r#"{"dependencies": {"foo": "^1.0.0", "bar": "^2.0.0"}, "devDependencies": {"@electricui/core": "^0.9.0"}}"#,
        );
        fx.write(
            "electric-ui-project/node_modules/foo/package.json",
            r#"{"name": "foo", "version": "1.2.3"}"#,
        );
        fx.write(
            "electric-ui-project/node_modules/@electricui/core/package.json",
            "not json",
        );
        fx.write(
            "electric-ui-project/node_modules/undeclared/package.json",
            r#"{"version": "9.9.9"}"#,
        );
        fx.write("component-sandbox/package.json", r#"{"name": "sandbox"}"#);

        let specs = vec![
            fx.spec("electricUi", "electric-ui-project"),
            fx.spec("sandbox", "component-sandbox"),
        ];
        (fx, specs)
    }

    #[test]
    fn test_generate_counts_only_resolved_packages() {
        let (_fx, specs) = two_projects();
        let report = AggregateReport::generate(&ProjectScanner::new(), &specs);

        let electric = report.project("electricUi").unwrap();
        assert_eq!(electric.package_count, 2);
        assert_eq!(electric.packages.len(), 2);
        assert!(electric.get("bar").is_none());
        assert!(electric.get("undeclared").is_none());
        assert_eq!(electric.unknown_count(), 1);
        assert_eq!(
            electric.get("foo").unwrap().installed_version,
            InstalledVersion::Known("1.2.3".into())
        );
        assert!(electric.missing.is_empty());

        let sandbox = report.project("sandbox").unwrap();
        assert_eq!(sandbox.package_count, 0);
        assert_eq!(report.total_packages(), 2);
    }

    #[test]
    fn test_include_missing_lists_absent_declarations() {
        let (_fx, specs) = two_projects();
        let scanner = ProjectScanner::new().include_missing(true);
        let report = AggregateReport::generate(&scanner, &specs);

        let electric = report.project("electricUi").unwrap();
        assert_eq!(electric.missing, vec!["bar".to_string()]);
        assert_eq!(electric.package_count, 2);
    }

    #[test]
    fn test_missing_manifest_does_not_abort_other_projects() {
        let fx = Fixture::new();
        fx.write("good/package.json", r#"{"dependencies": {"foo": "^1.0.0"}}"#);
        fx.write("good/node_modules/foo/package.json", r#"{"version": "1.0.1"}"#);

        let specs = vec![fx.spec("absent", "absent"), fx.spec("good", "good")];
        let report = AggregateReport::generate(&ProjectScanner::new(), &specs);

        assert_eq!(report.project("absent").unwrap().package_count, 0);
        assert_eq!(report.project("good").unwrap().package_count, 1);
    }

    #[test]
    fn test_packages_are_stable_across_runs() {
        let (_fx, specs) = two_projects();
        let scanner = ProjectScanner::new();

        let first = AggregateReport::generate(&scanner, &specs);
        let second = AggregateReport::generate(&scanner, &specs);

        assert_eq!(
            serde_json::to_string(&first.projects).unwrap(),
            serde_json::to_string(&second.projects).unwrap()
        );
    }

    #[test]
    fn test_json_shape() {
        let generated_at = DateTime::parse_from_rfc3339("2025-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let mut packages = BTreeMap::new();
        packages.insert(
            "foo".to_string(),
            ResolvedDependency {
                name: "foo".to_string(),
                declared_version: "^1.0.0".to_string(),
                installed_version: InstalledVersion::Known("1.2.3".into()),
                location: "/p/node_modules/foo".into(),
            },
        );
        let mut projects = BTreeMap::new();
        projects.insert(
            "electricUi".to_string(),
            ProjectDependencyReport::new(packages, Vec::new()),
        );
        projects.insert("sandbox".to_string(), ProjectDependencyReport::default());

        let report = AggregateReport::with_timestamp(generated_at, projects);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "timestamp": "2025-03-01T12:00:00.000Z",
                "electricUi": {
                    "packageCount": 1,
                    "packages": {
                        "foo": {
                            "declaredVersion": "^1.0.0",
                            "installedVersion": "1.2.3",
                            "location": "/p/node_modules/foo"
                        }
                    }
                },
                "sandbox": { "packageCount": 0, "packages": {} }
            })
        );
    }

    #[test]
    fn test_write_then_read_back_keeps_invariant() {
        let (fx, specs) = two_projects();
        let report = AggregateReport::generate(&ProjectScanner::new(), &specs);
        let path = fx.dir.path().join(REPORT_FILE);

        fs::write(&path, "stale").unwrap();
        report.write_to(&path).unwrap();
        let loaded = AggregateReport::read_from(&path).unwrap();

        assert_eq!(loaded, report);
        let reader = ManifestReader::new();
        for spec in &specs {
            let declared = reader.read_declared(&spec.manifest);
            let project = loaded.project(&spec.id).unwrap();
            assert_eq!(project.package_count, project.packages.len());
            for (name, dep) in &project.packages {
                assert_eq!(&dep.name, name);
                assert!(declared.contains(name));
                assert!(spec.node_modules.join(name).exists());
            }
        }
    }

    #[test]
    fn test_write_failure_propagates() {
        let fx = Fixture::new();
        let report = AggregateReport::new(BTreeMap::new());
        let path = fx.dir.path().join("no-such-dir").join(REPORT_FILE);

        assert!(matches!(
            report.write_to(&path),
            Err(ReportError::Write { .. })
        ));
    }

    #[test]
    fn test_scan_uses_project_manifest_and_node_modules() {
        let fx = Fixture::new();
        fx.write("custom/deps.json", r#"{"dependencies": {"foo": "1.0.0"}}"#);
        fx.write("custom/vendor/foo/package.json", r#"{"version": "1.0.0"}"#);

        let root = fx.dir.path().join("custom");
        let spec = ProjectSpec::new("custom", root.join("deps.json"), root.join("vendor"));
        let report = ProjectScanner::new().scan(&spec);
        assert_eq!(report.package_count, 1);

        let standard = ProjectSpec::from_root("custom", &root);
        assert!(standard.manifest.ends_with(MANIFEST_FILE));
        assert!(standard.node_modules.ends_with(NODE_MODULES_DIR));
        assert_eq!(ProjectScanner::new().scan(&standard).package_count, 0);
    }
}
