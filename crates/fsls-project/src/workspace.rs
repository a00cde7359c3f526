//! Workspace facade owning the resolution cache and the project index.
//!
//! A [`Workspace`] is built once per session and passed to every caller.
//! Queries (owner lookup, dependency order, visibility) and change events
//! (project, solution, and lock file edits) are methods on it; the
//! implementations live in the sibling modules.

use std::sync::Arc;
use std::time::SystemTime;

use camino::Utf8Path;
use fsls_conf::Settings;

use crate::cache::Cache;
use crate::cracker::Cracker;
use crate::cracker::ProcessCracker;
use crate::cracker::UnconfiguredCracker;
use crate::index::WorkspaceIndex;
use crate::resolve::ReferenceCycle;
use crate::resolve::Resolver;
use crate::script::LoadDirectiveChecker;
use crate::script::ScriptChecker;
use crate::walk::scan;
use crate::walk::WalkOptions;
use crate::Diagnostic;
use crate::DiagnosticKind;
use crate::FileSystem;
use crate::OsFileSystem;
use crate::ProjectError;
use crate::ProjectId;
use crate::ProjectKind;
use crate::ProjectOptions;

pub struct Workspace {
    pub(crate) fs: Arc<dyn FileSystem>,
    resolver: Resolver,
    pub(crate) cache: Cache<Arc<ProjectOptions>>,
    pub(crate) index: WorkspaceIndex,
    scan: WalkOptions,
}

impl Workspace {
    #[must_use]
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cracker: Arc<dyn Cracker>,
        checker: Arc<dyn ScriptChecker>,
    ) -> Self {
        Self {
            resolver: Resolver::new(fs.clone(), cracker, checker),
            fs,
            cache: Cache::new(),
            index: WorkspaceIndex::new(),
            scan: WalkOptions::default(),
        }
    }

    /// A workspace over the real file system, cracking projects with the
    /// configured command.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let cracker: Arc<dyn Cracker> = match settings.cracker() {
            Some(cracker) => Arc::new(ProcessCracker::from_settings(cracker)),
            None => {
                tracing::warn!("No project cracker configured; projects will not resolve");
                Arc::new(UnconfiguredCracker)
            }
        };
        Self::new(Arc::new(OsFileSystem), cracker, Arc::new(LoadDirectiveChecker))
            .with_scan_options(WalkOptions::from(settings.scan()))
    }

    #[must_use]
    pub fn with_scan_options(mut self, options: WalkOptions) -> Self {
        self.scan = options;
        self
    }

    /// Register every script, project, and solution under `dir`.
    ///
    /// Returns how many files were registered.
    pub fn add_workspace_root(&self, dir: &Utf8Path) -> Result<usize, ProjectError> {
        if !dir.is_dir() {
            return Err(ProjectError::NotADirectory(dir.to_path_buf()));
        }

        let found = scan(dir, &self.scan);
        let mut solutions = 0;
        for id in &found {
            if id.kind() == ProjectKind::Solution {
                self.update_sln_file(id)?;
                solutions += 1;
            } else {
                self.index.insert_project(id.clone());
            }
        }

        tracing::info!(
            "Added workspace root {}: {} projects and scripts, {} solutions",
            dir,
            found.len() - solutions,
            solutions
        );
        Ok(found.len())
    }

    /// Resolved options for a script or project, computed at most once until
    /// invalidated.
    pub fn options(&self, id: &ProjectId) -> Result<Arc<ProjectOptions>, ProjectError> {
        if !id.kind().is_resolvable() {
            return Err(ProjectError::Unresolvable(id.path().to_path_buf()));
        }
        Ok(self.resolve(id))
    }

    pub(crate) fn resolve(&self, id: &ProjectId) -> Arc<ProjectOptions> {
        match self.resolve_dependency(id, &[]) {
            Ok(options) => options,
            Err(cycle) => {
                // Not cached: the cycle belongs to whichever resolution is
                // still in flight, not to this identity.
                Arc::new(ProjectOptions::failed(
                    id.clone(),
                    Diagnostic::new(
                        DiagnosticKind::CyclicReference,
                        id.path(),
                        format!("Cyclic project reference: {cycle}"),
                    ),
                    SystemTime::now(),
                ))
            }
        }
    }

    /// Resolve `id` through the cache. `path` lists the projects this thread
    /// is resolving, outermost first.
    fn resolve_dependency(
        &self,
        id: &ProjectId,
        path: &[ProjectId],
    ) -> Result<Arc<ProjectOptions>, ReferenceCycle> {
        self.cache
            .get_or_compute_checked(
                id,
                |id| self.compute(id, path),
                |options, changed| options.derived_from(changed),
            )
            .map_err(|cycle| {
                let members = match path.iter().position(|member| *member == cycle.id) {
                    Some(start) => path[start..].to_vec(),
                    // The cycle runs through another thread's resolution.
                    None => path.last().into_iter().chain([&cycle.id]).cloned().collect(),
                };
                ReferenceCycle { members }
            })
    }

    fn compute(&self, id: &ProjectId, path: &[ProjectId]) -> Arc<ProjectOptions> {
        let mut path = path.to_vec();
        path.push(id.clone());
        Arc::new(
            self.resolver
                .resolve(id, |dependency| self.resolve_dependency(dependency, &path)),
        )
    }

    /// Known scripts and projects, ordered by path.
    #[must_use]
    pub fn known_projects(&self) -> Vec<ProjectId> {
        self.index.projects()
    }

    /// Known solutions with the projects each one lists.
    #[must_use]
    pub fn known_solutions(&self) -> Vec<(ProjectId, Vec<ProjectId>)> {
        self.index.solutions()
    }

    /// Whether `id` currently has cached options.
    #[must_use]
    pub fn is_resolved(&self, id: &ProjectId) -> bool {
        self.cache.peek(id).is_some()
    }
}
