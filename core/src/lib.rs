pub mod error;
pub mod manifest;
pub mod output;
pub mod project;
pub mod report;
pub mod resolver;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ManifestError, ReportError};
pub use manifest::{MANIFEST_FILE, ManifestReader};
pub use output::{TableRenderer, summary_line};
pub use project::{NODE_MODULES_DIR, ProjectSpec, normalize_path};
pub use report::{
    AggregateReport, ProjectDependencyReport, ProjectScanner, REPORT_FILE, TIMESTAMP_KEY,
};
pub use resolver::{InstalledResolver, Resolution};
pub use types::{
    DeclaredDependencies, DependencyDeclaration, DependencySections, InstalledVersion,
    ResolvedDependency, UNKNOWN_VERSION,
};
