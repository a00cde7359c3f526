use std::sync::Arc;
use std::time::SystemTime;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use rustc_hash::FxHashSet;
use serde::Serialize;
use serde::Serializer;

use crate::Diagnostic;
use crate::ProjectId;

/// Resolved compiler options for one script or project.
///
/// Immutable once built and shared through [`Arc`]; every dependency is held
/// by value in [`ProjectOptions::references`], so a resolved graph can be
/// walked without going back to the cache.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOptions {
    pub(crate) id: ProjectId,
    /// Ordered; earlier files are compiled first.
    pub(crate) sources: Vec<Utf8PathBuf>,
    pub(crate) flags: Vec<String>,
    pub(crate) references: Vec<ProjectReference>,
    /// Every project reference the cracker declared, including ones that
    /// could not be resolved. Invalidation cascades along these edges.
    #[serde(skip)]
    pub(crate) declared: Vec<ProjectId>,
    /// Projects on the reference cycle this one belongs to, starting at the
    /// project the cycle returns to. Empty outside a cycle.
    #[serde(skip)]
    pub(crate) cycle: Vec<ProjectId>,
    pub(crate) target: Option<Utf8PathBuf>,
    #[serde(skip)]
    pub(crate) load_time: SystemTime,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl ProjectOptions {
    pub(crate) fn empty(id: ProjectId, load_time: SystemTime) -> Self {
        Self {
            id,
            sources: Vec::new(),
            flags: Vec::new(),
            references: Vec::new(),
            declared: Vec::new(),
            cycle: Vec::new(),
            target: None,
            load_time,
            diagnostics: Vec::new(),
        }
    }

    /// A result with no sources and a single diagnostic explaining why.
    pub(crate) fn failed(id: ProjectId, diagnostic: Diagnostic, load_time: SystemTime) -> Self {
        let mut options = Self::empty(id, load_time);
        options.diagnostics.push(diagnostic);
        options
    }

    #[must_use]
    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    #[must_use]
    pub fn sources(&self) -> &[Utf8PathBuf] {
        &self.sources
    }

    #[must_use]
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    #[must_use]
    pub fn references(&self) -> &[ProjectReference] {
        &self.references
    }

    #[must_use]
    pub fn target(&self) -> Option<&Utf8Path> {
        self.target.as_deref()
    }

    #[must_use]
    pub fn load_time(&self) -> SystemTime {
        self.load_time
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn source_index(&self, file: &Utf8Path) -> Option<usize> {
        self.sources.iter().position(|source| source == file)
    }

    #[must_use]
    pub fn contains_source(&self, file: &Utf8Path) -> bool {
        self.source_index(file).is_some()
    }

    /// Whether a change to `id` makes this result stale.
    ///
    /// True for declared project references, and for scripts pulled in
    /// through `#load`.
    #[must_use]
    pub fn depends_on(&self, id: &ProjectId) -> bool {
        if self.id == *id {
            return false;
        }
        self.declared.contains(id) || self.contains_source(id.path())
    }

    /// Whether this result, or any result it holds through its references,
    /// depends on `id`.
    pub(crate) fn derived_from(&self, id: &ProjectId) -> bool {
        let mut pending = vec![self];
        let mut seen = FxHashSet::default();
        while let Some(options) = pending.pop() {
            if !seen.insert(&options.id) {
                continue;
            }
            if options.depends_on(id) {
                return true;
            }
            pending.extend(
                options
                    .references
                    .iter()
                    .map(|reference| reference.options.as_ref()),
            );
        }
        false
    }

    /// Whether this project sits on a reference cycle.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        !self.cycle.is_empty()
    }
}

/// A resolved project reference: the dependency's output artifact plus its
/// full options.
#[derive(Debug, Clone)]
pub struct ProjectReference {
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) options: Arc<ProjectOptions>,
}

impl ProjectReference {
    /// Output artifact of the dependency. `None` when the dependency failed
    /// to crack and so has no known target.
    #[must_use]
    pub fn output(&self) -> Option<&Utf8Path> {
        self.output.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &Arc<ProjectOptions> {
        &self.options
    }
}

impl Serialize for ProjectReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ProjectReference", 2)?;
        state.serialize_field("output", &self.output)?;
        state.serialize_field("project", self.options.id.path())?;
        state.end()
    }
}
