#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary workspace holding the Electric UI project and the component sandbox side by side
pub struct TempWorkspace {
    pub dir: TempDir,
}

impl TempWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(dir.path().join("component-sandbox"))
            .expect("Failed to create sandbox directory");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root the binary is pointed at
    pub fn sandbox(&self) -> PathBuf {
        self.dir.path().join("component-sandbox")
    }

    pub fn electric_ui(&self) -> PathBuf {
        self.dir.path().join("electric-ui-project")
    }

    /// Create a file in the workspace with the given content
    pub fn create_file(&self, relative_path: &str, content: &str) {
        let file_path = self.dir.path().join(relative_path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }

        fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Install a package with a manifest carrying `version`
    pub fn install(&self, project: &str, name: &str, version: &str) {
        self.create_file(
            &format!("{project}/node_modules/{name}/package.json"),
            &format!(r#"{{"name": "{name}", "version": "{version}"}}"#),
        );
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

pub fn sample_electric_ui_package_json() -> &'static str {
    r#"{
  "name": "electric-ui-project",
  "version": "0.1.0",
  "dependencies": {
    "@electricui/components-desktop-blueprint": "^0.9.6",
    "@floating-ui/react": "^0.26.0",
    "react": "^18.2.0"
  },
  "devDependencies": {
    "typescript": "^5.0.0"
  }
}"#
}

pub fn sample_sandbox_package_json() -> &'static str {
    r#"{
  "name": "component-sandbox",
  "version": "1.0.0",
  "dependencies": {
    "@floating-ui/react": "^0.26.0",
    "styled-components": "^6.1.0"
  },
  "devDependencies": {
    "electron": "^28.0.0"
  }
}"#
}

/// Both projects with a mix of installed, missing and broken packages
pub fn create_sample_workspace() -> TempWorkspace {
    let ws = TempWorkspace::new();
    ws.create_file(
        "electric-ui-project/package.json",
        sample_electric_ui_package_json(),
    );
    ws.create_file(
        "component-sandbox/package.json",
        sample_sandbox_package_json(),
    );

    ws.install("electric-ui-project", "react", "18.2.0");
    ws.install("electric-ui-project", "@floating-ui/react", "0.26.4");
    ws.create_file(
        "electric-ui-project/node_modules/typescript/package.json",
        "{ broken",
    );
    ws.install("electric-ui-project", "lodash", "4.17.21");

    ws.install("component-sandbox", "styled-components", "6.1.8");
    ws
}
