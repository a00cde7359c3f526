use camino::Utf8Path;

use crate::graph::dependency_order;
use crate::paths::canonicalize;
use crate::Workspace;

impl Workspace {
    /// Whether declarations in `target` can be seen from `from`.
    ///
    /// Within one project a file sees itself and the files compiled before
    /// it. Across projects it sees every source of every project its owner
    /// references, directly or not. Anything that fails to resolve is not
    /// visible.
    #[must_use]
    pub fn is_visible(&self, target: &Utf8Path, from: &Utf8Path) -> bool {
        let target = canonicalize(target);
        let from = canonicalize(from);

        let Ok(owner) = self.find_project_options(&from) else {
            tracing::debug!("{} has no usable owner; nothing is visible from it", from);
            return false;
        };

        if let Some(target_index) = owner.source_index(&target) {
            return owner
                .source_index(&from)
                .is_some_and(|from_index| target_index <= from_index);
        }

        dependency_order([&owner])
            .iter()
            .any(|options| options.contains_source(&target))
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::TestWorkspace;

    use super::*;

    fn visible(ws: &TestWorkspace, target: &str, from: &str) -> bool {
        ws.is_visible(Utf8Path::new(target), Utf8Path::new(from))
    }

    #[test]
    fn test_declaration_order_within_project() {
        let ws = TestWorkspace::new();
        ws.project("/ws/P/P.fsproj", &["a.fs", "b.fs", "c.fs"], &[]);

        assert!(visible(&ws, "/ws/P/a.fs", "/ws/P/b.fs"));
        assert!(visible(&ws, "/ws/P/b.fs", "/ws/P/b.fs"));
        assert!(!visible(&ws, "/ws/P/c.fs", "/ws/P/b.fs"));
    }

    #[test]
    fn test_referenced_projects_are_visible() {
        let ws = TestWorkspace::new();
        ws.project("/ws/Base/Base.fsproj", &["base.fs"], &[]);
        ws.project("/ws/P/P.fsproj", &["a.fs"], &["../Base/Base.fsproj"]);
        ws.project("/ws/Q/Q.fsproj", &["c.fs"], &["../P/P.fsproj"]);

        assert!(visible(&ws, "/ws/P/a.fs", "/ws/Q/c.fs"));
        assert!(visible(&ws, "/ws/Base/base.fs", "/ws/Q/c.fs"));
        assert!(!visible(&ws, "/ws/Q/c.fs", "/ws/P/a.fs"));
    }

    #[test]
    fn test_unowned_source_sees_nothing() {
        let ws = TestWorkspace::new();
        ws.project("/ws/P/P.fsproj", &["a.fs"], &[]);

        assert!(!visible(&ws, "/ws/P/a.fs", "/ws/P/stray.fs"));
    }

    #[test]
    fn test_script_sees_loaded_files_first() {
        let ws = TestWorkspace::new();
        ws.script("/ws/lib.fsx", "let x = 1");
        ws.script("/ws/run.fsx", "#load \"lib.fsx\"");

        assert!(visible(&ws, "/ws/lib.fsx", "/ws/run.fsx"));
        assert!(!visible(&ws, "/ws/run.fsx", "/ws/lib.fsx"));
    }
}
