use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::ProjectError;
use crate::ProjectId;
use crate::ProjectOptions;
use crate::Workspace;

/// Every result reachable from `roots`, each dependency before its
/// dependents and each identity once.
///
/// Resolved reference graphs are acyclic (a closing reference is dropped
/// during resolution), so the walk always terminates.
#[must_use]
pub fn dependency_order<'a>(
    roots: impl IntoIterator<Item = &'a Arc<ProjectOptions>>,
) -> Vec<Arc<ProjectOptions>> {
    fn visit(
        options: &Arc<ProjectOptions>,
        seen: &mut FxHashSet<ProjectId>,
        order: &mut Vec<Arc<ProjectOptions>>,
    ) {
        if !seen.insert(options.id().clone()) {
            return;
        }
        for reference in options.references() {
            visit(reference.options(), seen, order);
        }
        order.push(Arc::clone(options));
    }

    let mut seen = FxHashSet::default();
    let mut order = Vec::new();
    for root in roots {
        visit(root, &mut seen, &mut order);
    }
    order
}

impl Workspace {
    /// Every already-resolved known project in dependency order.
    #[must_use]
    pub fn open_projects(&self) -> Vec<Arc<ProjectOptions>> {
        let roots: Vec<Arc<ProjectOptions>> = self
            .index
            .projects()
            .iter()
            .filter_map(|id| self.cache.peek(id))
            .collect();
        dependency_order(&roots)
    }

    /// `id` and everything it references, dependencies first. Resolves `id`
    /// if needed.
    pub fn transitive_deps(&self, id: &ProjectId) -> Result<Vec<Arc<ProjectOptions>>, ProjectError> {
        let root = self.options(id)?;
        Ok(dependency_order([&root]))
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;

    use crate::testing::TestWorkspace;

    use super::*;

    fn ids(order: &[Arc<ProjectOptions>]) -> Vec<&str> {
        order.iter().map(|options| options.id().path().as_str()).collect()
    }

    #[test]
    fn test_diamond_has_no_duplicates() {
        let ws = TestWorkspace::new();
        ws.project("/ws/Base/Base.fsproj", &["base.fs"], &[]);
        ws.project("/ws/Left/Left.fsproj", &["l.fs"], &["../Base/Base.fsproj"]);
        ws.project("/ws/Right/Right.fsproj", &["r.fs"], &["../Base/Base.fsproj"]);
        let top = ws.project(
            "/ws/Top/Top.fsproj",
            &["t.fs"],
            &["../Left/Left.fsproj", "../Right/Right.fsproj"],
        );

        let order = ws.transitive_deps(&top).unwrap();

        assert_eq!(
            ids(&order),
            vec![
                "/ws/Base/Base.fsproj",
                "/ws/Left/Left.fsproj",
                "/ws/Right/Right.fsproj",
                "/ws/Top/Top.fsproj",
            ]
        );
    }

    #[test]
    fn test_open_projects_only_includes_resolved() {
        let ws = TestWorkspace::new();
        ws.project("/ws/P/P.fsproj", &["a.fs"], &[]);
        let q = ws.project("/ws/Q/Q.fsproj", &["c.fs"], &["../P/P.fsproj"]);
        let r = ws.project("/ws/R/R.fsproj", &["r.fs"], &[]);
        ws.options(&q).unwrap();

        let order = ws.open_projects();

        assert_eq!(ids(&order), vec!["/ws/P/P.fsproj", "/ws/Q/Q.fsproj"]);
        assert!(!ws.is_resolved(&r));
    }

    #[test]
    fn test_transitive_deps_rejects_solutions() {
        let ws = TestWorkspace::new();
        let sln = ws.solution("/ws/All.sln", &[]);

        assert!(ws.transitive_deps(&sln).is_err());
        assert!(ws
            .transitive_deps(&ProjectId::new(Utf8Path::new("/ws/P/P.fsproj")).unwrap())
            .is_ok());
    }
}
