//! Turns one script or project identity into [`ProjectOptions`].
//!
//! The resolver knows nothing about caching: project references are handed
//! to a callback that the workspace routes back through the cache, which is
//! what turns a single resolution into a walk of the reference graph.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::cracker::Cracker;
use crate::paths::canonicalize;
use crate::script::ScriptChecker;
use crate::Diagnostic;
use crate::DiagnosticKind;
use crate::FileSystem;
use crate::ProjectId;
use crate::ProjectKind;
use crate::ProjectOptions;
use crate::ProjectReference;

/// Restore output, relative to the project directory.
pub const ASSETS_FILE: &str = "obj/project.assets.json";

/// A project reference that leads back to a project still being resolved.
///
/// `members` starts at the project the cycle returns to and ends at the
/// project whose reference closed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCycle {
    pub members: Vec<ProjectId>,
}

impl fmt::Display for ReferenceCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for member in &self.members {
            write!(f, "{member} -> ")?;
        }
        match self.members.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

pub struct Resolver {
    fs: Arc<dyn FileSystem>,
    cracker: Arc<dyn Cracker>,
    checker: Arc<dyn ScriptChecker>,
}

impl Resolver {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cracker: Arc<dyn Cracker>,
        checker: Arc<dyn ScriptChecker>,
    ) -> Self {
        Self {
            fs,
            cracker,
            checker,
        }
    }

    /// Resolve `id`, calling `dependency` for each declared project reference.
    ///
    /// A project on a reference cycle gets a `CyclicReference` diagnostic
    /// whichever member of the cycle was resolved first.
    ///
    /// Callers must not pass a solution; the workspace rejects those before
    /// they reach the cache.
    pub fn resolve(
        &self,
        id: &ProjectId,
        dependency: impl FnMut(&ProjectId) -> Result<Arc<ProjectOptions>, ReferenceCycle>,
    ) -> ProjectOptions {
        match id.kind() {
            ProjectKind::Script => self.resolve_script(id),
            ProjectKind::Project => self.resolve_project(id, dependency),
            ProjectKind::Solution => ProjectOptions::failed(
                id.clone(),
                Diagnostic::new(
                    DiagnosticKind::CrackFailed,
                    id.path(),
                    "Solution files have no project options",
                ),
                SystemTime::UNIX_EPOCH,
            ),
        }
    }

    fn resolve_script(&self, id: &ProjectId) -> ProjectOptions {
        let load_time = self.fs.modified(id.path()).unwrap_or_else(|_| SystemTime::now());
        let source = match self.fs.read_to_string(id.path()) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Failed to read script {}: {}", id, e);
                return ProjectOptions::failed(
                    id.clone(),
                    Diagnostic::new(
                        DiagnosticKind::ScriptCheck,
                        id.path(),
                        format!("Cannot read script: {e}"),
                    ),
                    load_time,
                );
            }
        };

        let checked = self.checker.check(id.path(), &source, self.fs.as_ref());
        let mut options = ProjectOptions::empty(id.clone(), load_time);
        options.sources = checked.source_files;
        options.flags = checked.other_options;
        options.diagnostics = checked
            .errors
            .into_iter()
            .map(|message| Diagnostic::new(DiagnosticKind::ScriptCheck, id.path(), message))
            .collect();

        tracing::debug!(
            "Resolved script {} with {} sources",
            id,
            options.sources.len()
        );
        options
    }

    fn resolve_project(
        &self,
        id: &ProjectId,
        mut dependency: impl FnMut(&ProjectId) -> Result<Arc<ProjectOptions>, ReferenceCycle>,
    ) -> ProjectOptions {
        let cracked = self.cracker.crack(id.path());
        let load_time = self.load_time(id);

        if let Some(error) = cracked.error {
            tracing::warn!("Cracking {} failed: {}", id, error);
            return ProjectOptions::failed(
                id.clone(),
                Diagnostic::new(DiagnosticKind::CrackFailed, id.path(), error),
                load_time,
            );
        }

        let dir = id.dir();
        let mut options = ProjectOptions::empty(id.clone(), load_time);
        options.flags.push("--noframework".to_string());

        for reference in &cracked.project_references {
            let path = canonicalize(&dir.join(reference));
            let dep = match ProjectId::new(&path) {
                Ok(dep) if dep.kind() == ProjectKind::Project => dep,
                _ => {
                    tracing::warn!("Skipping non-F# project reference {} in {}", path, id);
                    continue;
                }
            };
            options.declared.push(dep.clone());

            match dependency(&dep) {
                Ok(resolved) => {
                    if !options.is_cyclic() && resolved.cycle.contains(id) {
                        options.cycle.clone_from(&resolved.cycle);
                    }
                    let output = resolved.target.clone();
                    if let Some(output) = &output {
                        options.flags.push(format!("-r:{output}"));
                    }
                    options.references.push(ProjectReference {
                        output,
                        options: resolved,
                    });
                }
                Err(cycle) => {
                    tracing::warn!("{} closes a reference cycle: {}", id, cycle);
                    if !options.is_cyclic() {
                        options.cycle = cycle.members;
                    }
                }
            }
        }

        if options.is_cyclic() {
            let cycle = ReferenceCycle {
                members: options.cycle.clone(),
            };
            options.diagnostics.push(Diagnostic::new(
                DiagnosticKind::CyclicReference,
                id.path(),
                format!("Cyclic project reference: {cycle}"),
            ));
        }

        for artifact in cracked
            .other_references
            .iter()
            .chain(&cracked.package_references)
            .chain(&cracked.direct_references)
        {
            options
                .flags
                .push(format!("-r:{}", canonicalize(&dir.join(artifact))));
        }

        options.sources = cracked
            .sources
            .iter()
            .map(|source| canonicalize(&dir.join(source)))
            .collect();
        options.target = cracked
            .target
            .as_deref()
            .map(|target| canonicalize(&dir.join(target)));

        tracing::debug!(
            "Resolved project {} with {} sources and {} project references",
            id,
            options.sources.len(),
            options.references.len()
        );
        options
    }

    /// The later of the project file's and its restore output's timestamps.
    fn load_time(&self, id: &ProjectId) -> SystemTime {
        let assets = assets_file(id.dir());
        [id.path(), assets.as_path()]
            .into_iter()
            .filter_map(|path| self.fs.modified(path).ok())
            .max()
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }
}

#[must_use]
pub fn assets_file(project_dir: &Utf8Path) -> Utf8PathBuf {
    project_dir.join(ASSETS_FILE)
}
