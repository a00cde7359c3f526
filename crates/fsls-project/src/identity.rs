use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Serialize;

use crate::paths::canonicalize;
use crate::ProjectError;

/// What a build-description file is, decided by its suffix alone.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// `.fsx`: a single-file script that is its own primary source.
    Script,
    /// `.fsproj`: a multi-file project evaluated by the cracker.
    Project,
    /// `.sln`: a static list of projects.
    Solution,
}

impl ProjectKind {
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match path.extension()? {
            "fsx" => Some(Self::Script),
            "fsproj" => Some(Self::Project),
            "sln" => Some(Self::Solution),
            _ => None,
        }
    }

    /// Scripts and projects resolve to options; solutions do not.
    #[must_use]
    pub fn is_resolvable(self) -> bool {
        matches!(self, Self::Script | Self::Project)
    }
}

/// Canonical identity of a script, project, or solution file.
///
/// Equality, hashing, and ordering use the canonical path only.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectId {
    path: Utf8PathBuf,
    kind: ProjectKind,
}

impl ProjectId {
    /// Canonicalize `path` and classify it by suffix.
    pub fn new(path: &Utf8Path) -> Result<Self, ProjectError> {
        let kind = ProjectKind::from_path(path)
            .ok_or_else(|| ProjectError::UnrecognizedFile(path.to_path_buf()))?;
        Ok(Self {
            path: canonicalize(path),
            kind,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[must_use]
    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    /// Directory containing the file.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(&self.path)
    }
}

impl PartialEq for ProjectId {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for ProjectId {}

impl Hash for ProjectId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialOrd for ProjectId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProjectId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.path, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_suffix() {
        assert_eq!(
            ProjectKind::from_path(Utf8Path::new("/ws/run.fsx")),
            Some(ProjectKind::Script)
        );
        assert_eq!(
            ProjectKind::from_path(Utf8Path::new("/ws/App/App.fsproj")),
            Some(ProjectKind::Project)
        );
        assert_eq!(
            ProjectKind::from_path(Utf8Path::new("/ws/All.sln")),
            Some(ProjectKind::Solution)
        );
        assert_eq!(ProjectKind::from_path(Utf8Path::new("/ws/Lib.csproj")), None);
        assert_eq!(ProjectKind::from_path(Utf8Path::new("/ws/a.fs")), None);
    }

    #[test]
    fn test_unrecognized_suffix_is_rejected() {
        let err = ProjectId::new(Utf8Path::new("/ws/Lib.csproj")).unwrap_err();
        assert_eq!(
            err,
            ProjectError::UnrecognizedFile(Utf8PathBuf::from("/ws/Lib.csproj"))
        );
    }

    #[test]
    fn test_equality_uses_canonical_path() {
        let a = ProjectId::new(Utf8Path::new("/ws/App/App.fsproj")).unwrap();
        let b = ProjectId::new(Utf8Path::new("/ws/Lib/../App/./App.fsproj")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dir(), Utf8Path::new("/ws/App"));
    }

    #[test]
    fn test_only_scripts_and_projects_resolve() {
        assert!(ProjectKind::Script.is_resolvable());
        assert!(ProjectKind::Project.is_resolvable());
        assert!(!ProjectKind::Solution.is_resolvable());
    }
}
