use crate::report::{AggregateReport, ProjectDependencyReport};
use crate::types::{InstalledVersion, ResolvedDependency};
use colored::Colorize;

/// Renders an aggregate report as a per-project table
pub struct TableRenderer {
    show_colors: bool,
}

impl TableRenderer {
    pub fn new(show_colors: bool) -> Self {
        Self { show_colors }
    }

    /// Render every project in the report
    pub fn render(&self, report: &AggregateReport) {
        for (id, project) in &report.projects {
            self.render_project(id, project);
            println!();
        }
    }

    fn render_project(&self, id: &str, project: &ProjectDependencyReport) {
        let header = format!("{id} ({} installed)", project.package_count);
        if self.show_colors {
            println!("{}", header.bold());
        } else {
            println!("{header}");
        }

        if project.packages.is_empty() {
            println!("  No installed dependencies found");
        }

        let max_name = project.packages.keys().map(String::len).max().unwrap_or(0);
        let max_declared = project
            .packages
            .values()
            .map(|d| d.declared_version.len())
            .max()
            .unwrap_or(0);

        for dep in project.packages.values() {
            self.print_row(dep, max_name, max_declared);
        }

        for name in &project.missing {
            println!(
                "  {:<max_name$}  {}",
                name,
                self.paint_missing("not installed")
            );
        }
    }

    fn print_row(&self, dep: &ResolvedDependency, name_width: usize, declared_width: usize) {
        println!(
            "  {:<name_width$}  {:>declared_width$} → {}",
            dep.name,
            dep.declared_version,
            self.format_installed(&dep.installed_version),
        );
    }

    /// Format an installed version with optional colors
    pub fn format_installed(&self, version: &InstalledVersion) -> String {
        match version {
            InstalledVersion::Known(v) if self.show_colors => v.green().to_string(),
            InstalledVersion::Unknown if self.show_colors => version.as_str().yellow().to_string(),
            _ => version.as_str().to_string(),
        }
    }

    fn paint_missing(&self, text: &str) -> String {
        if self.show_colors {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}

/// One-line completion message, e.g.
/// `Dependency scan complete. Found 3 packages in electricUi and 2 packages in sandbox.`
pub fn summary_line(report: &AggregateReport) -> String {
    let parts: Vec<String> = report
        .projects
        .iter()
        .map(|(id, project)| format!("{} packages in {id}", project.package_count))
        .collect();

    let found = match parts.as_slice() {
        [] => "no projects".to_string(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    };

    format!("Dependency scan complete. Found {found}.")
}
