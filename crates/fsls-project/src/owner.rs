//! Finding the script or project that compiles a given source file.
//!
//! Resolving a project is expensive, so candidates are tried cheapest first:
//! results already in the cache, then unresolved projects whose raw file
//! text mentions the source's file name. The text check is a heuristic. A
//! project that picks the file up through a wildcard include never mentions
//! it and so is never tried; that miss is accepted.

use std::sync::Arc;

use camino::Utf8Path;

use crate::paths::canonicalize;
use crate::Diagnostic;
use crate::DiagnosticKind;
use crate::ProjectId;
use crate::ProjectKind;
use crate::ProjectOptions;
use crate::Workspace;

/// Options that carry diagnostics are reported as those diagnostics.
fn surface(options: Arc<ProjectOptions>) -> Result<Arc<ProjectOptions>, Vec<Diagnostic>> {
    if options.has_diagnostics() {
        Err(options.diagnostics().to_vec())
    } else {
        Ok(options)
    }
}

impl Workspace {
    /// Options of the first known script or project whose sources include
    /// `source`.
    ///
    /// When nothing matches, the diagnostics of a candidate that mentioned the
    /// file but failed to resolve are returned, or failing that a single
    /// [`DiagnosticKind::NoOwner`] diagnostic.
    pub fn find_project_options(
        &self,
        source: &Utf8Path,
    ) -> Result<Arc<ProjectOptions>, Vec<Diagnostic>> {
        let file = canonicalize(source);

        if ProjectKind::from_path(&file) == Some(ProjectKind::Script) {
            if let Ok(id) = ProjectId::new(&file) {
                return surface(self.resolve(&id));
            }
        }

        let mut unresolved = Vec::new();
        for id in self.index.projects() {
            match self.cache.peek(&id) {
                Some(options) if options.contains_source(&file) => {
                    tracing::debug!("{} is owned by resolved {}", file, id);
                    return surface(options);
                }
                Some(_) => {}
                None => unresolved.push(id),
            }
        }

        let (in_solution, orphans): (Vec<_>, Vec<_>) = unresolved
            .into_iter()
            .partition(|id| self.index.in_any_solution(id));

        let name = file.file_name().unwrap_or(file.as_str());
        let mut broken: Option<Arc<ProjectOptions>> = None;
        for id in in_solution.iter().chain(&orphans) {
            if !self.mentions(id, name) {
                continue;
            }
            tracing::debug!("Resolving candidate {} for {}", id, file);
            let options = self.resolve(id);
            if options.contains_source(&file) {
                return surface(options);
            }
            if broken.is_none() && options.sources().is_empty() && options.has_diagnostics() {
                broken = Some(options);
            }
        }

        if let Some(options) = broken {
            return Err(options.diagnostics().to_vec());
        }
        Err(vec![Diagnostic::new(
            DiagnosticKind::NoOwner,
            &file,
            format!("No project or script in the workspace includes {file}"),
        )])
    }

    /// Whether the raw text of `id` contains `name`.
    fn mentions(&self, id: &ProjectId, name: &str) -> bool {
        self.fs
            .read_to_string(id.path())
            .is_ok_and(|text| text.contains(name))
    }
}
