//! The project cracker: evaluates a project file into sources and references.
//!
//! Cracking a real project means running the build engine, which is slow and
//! may touch the disk (restore, generated files). The core only ever talks to
//! it through [`Cracker`], and every failure comes back as
//! [`CrackedProject::error`] rather than a Rust error.

use std::process::Command;
use std::process::Stdio;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use fsls_conf::CrackerSettings;
use serde::Deserialize;

/// Raw output of cracking one project file.
///
/// Relative paths are relative to the project's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CrackedProject {
    pub sources: Vec<Utf8PathBuf>,
    pub target: Option<Utf8PathBuf>,
    pub project_references: Vec<Utf8PathBuf>,
    pub other_references: Vec<Utf8PathBuf>,
    pub package_references: Vec<Utf8PathBuf>,
    pub direct_references: Vec<Utf8PathBuf>,
    pub error: Option<String>,
}

impl CrackedProject {
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

pub trait Cracker: Send + Sync {
    fn crack(&self, project: &Utf8Path) -> CrackedProject;
}

/// Runs an external command that prints a [`CrackedProject`] as JSON.
///
/// Invoked as `command args... <project>` from the project's directory.
#[derive(Debug, Clone)]
pub struct ProcessCracker {
    command: String,
    args: Vec<String>,
}

impl ProcessCracker {
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &CrackerSettings) -> Self {
        Self::new(settings.command.clone(), settings.args.clone())
    }

    fn run(&self, project: &Utf8Path) -> Result<CrackedProject> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(project.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = project.parent() {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to spawn project cracker `{}`", self.command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Project cracker exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        serde_json::from_slice(&output.stdout).context("Project cracker produced malformed output")
    }
}

impl Cracker for ProcessCracker {
    fn crack(&self, project: &Utf8Path) -> CrackedProject {
        tracing::debug!("Cracking {} with `{}`", project, self.command);
        match self.run(project) {
            Ok(cracked) => cracked,
            Err(e) => {
                tracing::warn!("Failed to crack {}: {e:#}", project);
                CrackedProject::failed(format!("{e:#}"))
            }
        }
    }
}

/// Stand-in used when no cracker command is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredCracker;

impl Cracker for UnconfiguredCracker {
    fn crack(&self, project: &Utf8Path) -> CrackedProject {
        tracing::debug!("No project cracker configured, cannot crack {}", project);
        CrackedProject::failed("No project cracker is configured; set `[cracker] command` in fsls.toml")
    }
}
