pub mod channel;
pub mod cli;
pub mod config;
pub mod lifecycle;
pub mod logger;
pub mod serve;

pub use depscan_core::{
    AggregateReport, DeclaredDependencies, DependencySections, InstalledVersion, ManifestReader,
    ProjectDependencyReport, ProjectScanner, ProjectSpec, ResolvedDependency,
};
