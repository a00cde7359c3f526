//! Routing of file system change notifications to workspace operations.
//!
//! Only the reaction lives here; whatever watches the disk hands events in.

use camino::Utf8Path;
use camino::Utf8PathBuf;

use crate::ProjectError;
use crate::ProjectId;
use crate::ProjectKind;
use crate::Workspace;

/// Restore output whose rewrite makes its project stale.
const ASSETS_FILE_NAME: &str = "project.assets.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileEvent {
    Created(Utf8PathBuf),
    Changed(Utf8PathBuf),
    Deleted(Utf8PathBuf),
}

impl FileEvent {
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        match self {
            Self::Created(path) | Self::Changed(path) | Self::Deleted(path) => path,
        }
    }
}

impl Workspace {
    /// Apply one change notification. Files the workspace does not track are
    /// ignored.
    pub fn apply_event(&self, event: &FileEvent) -> Result<(), ProjectError> {
        let path = event.path();

        if path.file_name() == Some(ASSETS_FILE_NAME) {
            if !matches!(event, FileEvent::Deleted(_)) {
                self.update_assets_json(path);
            }
            return Ok(());
        }

        let Some(kind) = ProjectKind::from_path(path) else {
            tracing::trace!("Ignoring change to untracked file {}", path);
            return Ok(());
        };
        let id = ProjectId::new(path)?;

        match (kind, event) {
            (ProjectKind::Solution, FileEvent::Deleted(_)) => self.delete_sln_file(&id),
            (ProjectKind::Solution, _) => self.update_sln_file(&id),
            (_, FileEvent::Created(_)) => self.new_project_file(&id),
            (_, FileEvent::Changed(_)) => self.update_project_file(&id),
            (_, FileEvent::Deleted(_)) => self.delete_project_file(&id),
        }
    }
}
