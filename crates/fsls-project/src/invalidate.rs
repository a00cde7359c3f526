//! Change events and the invalidation cascade.
//!
//! The cache stores forward edges only, so finding everything that depends
//! on a changed identity means scanning the results that are already
//! computed. Uncomputed entries are never forced just to be checked.

use camino::Utf8Path;
use rustc_hash::FxHashSet;

use crate::paths::canonicalize;
use crate::solution::parse_solution;
use crate::ProjectError;
use crate::ProjectId;
use crate::ProjectKind;
use crate::Workspace;

fn require_resolvable(id: &ProjectId) -> Result<(), ProjectError> {
    if id.kind().is_resolvable() {
        Ok(())
    } else {
        Err(ProjectError::Unresolvable(id.path().to_path_buf()))
    }
}

fn require_solution(id: &ProjectId) -> Result<(), ProjectError> {
    if id.kind() == ProjectKind::Solution {
        Ok(())
    } else {
        Err(ProjectError::NotASolution(id.path().to_path_buf()))
    }
}

impl Workspace {
    pub fn new_project_file(&self, id: &ProjectId) -> Result<(), ProjectError> {
        require_resolvable(id)?;
        self.index.insert_project(id.clone());
        self.changed(id);
        Ok(())
    }

    pub fn update_project_file(&self, id: &ProjectId) -> Result<(), ProjectError> {
        require_resolvable(id)?;
        self.index.insert_project(id.clone());
        self.changed(id);
        Ok(())
    }

    pub fn delete_project_file(&self, id: &ProjectId) -> Result<(), ProjectError> {
        require_resolvable(id)?;
        self.index.remove_project(id);
        self.changed(id);
        Ok(())
    }

    /// Re-read a solution's project list. Solutions feed no cached result,
    /// so nothing is invalidated.
    pub fn update_sln_file(&self, id: &ProjectId) -> Result<(), ProjectError> {
        require_solution(id)?;
        match self.fs.read_to_string(id.path()) {
            Ok(text) => {
                let members = parse_solution(id.path(), &text);
                tracing::debug!("Solution {} lists {} F# projects", id, members.len());
                self.index.set_solution(id.clone(), members);
            }
            Err(e) => {
                tracing::warn!("Failed to read solution {}: {}", id, e);
                self.index.remove_solution(id);
            }
        }
        Ok(())
    }

    pub fn delete_sln_file(&self, id: &ProjectId) -> Result<(), ProjectError> {
        require_solution(id)?;
        self.index.remove_solution(id);
        Ok(())
    }

    /// A restore rewrote `obj/project.assets.json`; the projects in the
    /// directory above `obj` are stale.
    ///
    /// Returns how many projects were treated as changed.
    pub fn update_assets_json(&self, lock_file: &Utf8Path) -> usize {
        let lock_file = canonicalize(lock_file);
        let Some(obj) = lock_file.parent().filter(|dir| dir.file_name() == Some("obj")) else {
            tracing::debug!("{} is not restore output", lock_file);
            return 0;
        };
        let Some(project_dir) = obj.parent() else {
            return 0;
        };

        let mut candidates: Vec<ProjectId> = self.index.projects();
        candidates.extend(self.cache.computed().into_iter().map(|(id, _)| id));
        candidates.sort();
        candidates.dedup();

        let owners: Vec<ProjectId> = candidates
            .into_iter()
            .filter(|id| id.kind() == ProjectKind::Project && id.dir() == project_dir)
            .collect();
        if owners.is_empty() {
            tracing::debug!("No known project owns {}", lock_file);
        }
        for id in &owners {
            self.changed(id);
        }
        owners.len()
    }

    /// Invalidate `id` and, transitively, every computed result that depends
    /// on it. Results still being computed are rejected by the cache when they
    /// finish, if they were derived from anything invalidated here.
    pub(crate) fn changed(&self, id: &ProjectId) {
        let mut pending = vec![id.clone()];
        let mut seen = FxHashSet::default();

        while let Some(id) = pending.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if self.cache.invalidate(&id) {
                tracing::debug!("Invalidated {}", id);
            }
            pending.extend(
                self.cache
                    .computed()
                    .into_iter()
                    .filter(|(_, options)| options.depends_on(&id))
                    .map(|(dependent, _)| dependent),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use camino::Utf8PathBuf;

    use crate::cracker::CrackedProject;
    use crate::testing::TestWorkspace;

    use super::*;

    #[test]
    fn test_update_recomputes_project() {
        let ws = TestWorkspace::new();
        let p = ws.project("/ws/P/P.fsproj", &["a.fs"], &[]);
        let before = ws.options(&p).unwrap();

        ws.update_project_file(&p).unwrap();

        assert!(!ws.is_resolved(&p));
        let after = ws.options(&p).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(ws.cracker().invocations(p.path()), 2);
    }

    #[test]
    fn test_cascade_follows_reference_chain() {
        let ws = TestWorkspace::new();
        let a = ws.project("/ws/A/A.fsproj", &["a.fs"], &[]);
        let b = ws.project("/ws/B/B.fsproj", &["b.fs"], &["../A/A.fsproj"]);
        let c = ws.project("/ws/C/C.fsproj", &["c.fs"], &["../B/B.fsproj"]);
        let other = ws.project("/ws/D/D.fsproj", &["d.fs"], &[]);
        ws.options(&c).unwrap();
        ws.options(&other).unwrap();

        ws.update_project_file(&a).unwrap();

        assert!(!ws.is_resolved(&a));
        assert!(!ws.is_resolved(&b));
        assert!(!ws.is_resolved(&c));
        assert!(ws.is_resolved(&other));
    }

    #[test]
    fn test_cascade_never_forces_uncomputed_entries() {
        let ws = TestWorkspace::new();
        let a = ws.project("/ws/A/A.fsproj", &["a.fs"], &[]);
        let b = ws.project("/ws/B/B.fsproj", &["b.fs"], &["../A/A.fsproj"]);
        ws.options(&a).unwrap();

        ws.update_project_file(&a).unwrap();

        assert!(!ws.is_resolved(&b));
        assert_eq!(ws.cracker().invocations(b.path()), 0);
    }

    #[test]
    fn test_delete_deregisters_and_cascades() {
        let ws = TestWorkspace::new();
        let a = ws.project("/ws/A/A.fsproj", &["a.fs"], &[]);
        let b = ws.project("/ws/B/B.fsproj", &["b.fs"], &["../A/A.fsproj"]);
        ws.options(&b).unwrap();

        ws.delete_project_file(&a).unwrap();

        assert!(!ws.known_projects().contains(&a));
        assert!(!ws.is_resolved(&b));
    }

    #[test]
    fn test_script_change_cascades_to_loaders() {
        let ws = TestWorkspace::new();
        let lib = ws.script("/ws/lib.fsx", "let x = 1");
        let run = ws.script("/ws/run.fsx", "#load \"lib.fsx\"");
        ws.options(&run).unwrap();
        ws.options(&lib).unwrap();

        ws.update_project_file(&lib).unwrap();

        assert!(!ws.is_resolved(&run));
    }

    #[test]
    fn test_assets_json_invalidates_owning_project() {
        let ws = TestWorkspace::new();
        let p = ws.project("/ws/P/P.fsproj", &["a.fs"], &[]);
        let q = ws.project("/ws/Q/Q.fsproj", &["c.fs"], &["../P/P.fsproj"]);
        let r = ws.project("/ws/R/R.fsproj", &["r.fs"], &[]);
        ws.options(&q).unwrap();
        ws.options(&r).unwrap();

        let affected = ws.update_assets_json(Utf8Path::new("/ws/P/obj/project.assets.json"));

        assert_eq!(affected, 1);
        assert!(!ws.is_resolved(&p));
        assert!(!ws.is_resolved(&q));
        assert!(ws.is_resolved(&r));
    }

    #[test]
    fn test_assets_json_outside_obj_is_ignored() {
        let ws = TestWorkspace::new();
        let p = ws.project("/ws/P/P.fsproj", &["a.fs"], &[]);
        ws.options(&p).unwrap();

        let affected = ws.update_assets_json(Utf8Path::new("/ws/P/src/project.assets.json"));

        assert_eq!(affected, 0);
        assert!(ws.is_resolved(&p));
    }

    #[test]
    fn test_change_during_resolution_is_not_cached_stale() {
        let ws = TestWorkspace::new();
        let p = ws.project("/ws/P/P.fsproj", &["p0.fs"], &[]);
        ws.project("/ws/R/R.fsproj", &["r.fs"], &[]);
        let q = ws.project(
            "/ws/Q/Q.fsproj",
            &["q.fs"],
            &["../P/P.fsproj", "../R/R.fsproj"],
        );
        let held = ws.cracker().hold("/ws/R/R.fsproj");

        thread::scope(|scope| {
            let in_flight = scope.spawn(|| ws.options(&q).unwrap());
            held.wait_until_entered();
            ws.cracker().set(
                p.path(),
                CrackedProject {
                    sources: vec!["p1.fs".into()],
                    target: Some("bin/P.dll".into()),
                    ..CrackedProject::default()
                },
            );
            ws.update_project_file(&p).unwrap();
            held.release();

            let stale = in_flight.join().unwrap();
            assert_eq!(
                stale.references()[0].options().sources(),
                &[Utf8PathBuf::from("/ws/P/p0.fs")]
            );
        });

        assert!(!ws.is_resolved(&q));
        let q_options = ws.options(&q).unwrap();
        let p_options = ws.options(&p).unwrap();
        assert_eq!(p_options.sources(), &[Utf8PathBuf::from("/ws/P/p1.fs")]);
        assert!(Arc::ptr_eq(q_options.references()[0].options(), &p_options));
    }

    #[test]
    fn test_assets_json_outside_any_project_is_ignored() {
        let ws = TestWorkspace::new();
        ws.project("/ws/P/P.fsproj", &["a.fs"], &[]);

        assert_eq!(
            ws.update_assets_json(Utf8Path::new("/elsewhere/obj/project.assets.json")),
            0
        );
    }

    #[test]
    fn test_solution_update_replaces_members() {
        let ws = TestWorkspace::new();
        let sln = ws.solution("/ws/All.sln", &["P/P.fsproj"]);
        ws.fs().add_file(
            "/ws/All.sln",
            "Project(\"{F2A}\") = \"Q\", \"Q\\Q.fsproj\", \"{2}\"\n",
        );

        ws.update_sln_file(&sln).unwrap();

        let solutions = ws.known_solutions();
        assert_eq!(
            solutions[0].1,
            vec![ProjectId::new(Utf8Path::new("/ws/Q/Q.fsproj")).unwrap()]
        );
    }

    #[test]
    fn test_unreadable_solution_is_dropped() {
        let ws = TestWorkspace::new();
        let sln = ws.solution("/ws/All.sln", &["P/P.fsproj"]);
        ws.fs().remove_file(sln.path());

        ws.update_sln_file(&sln).unwrap();

        assert!(ws.known_solutions().is_empty());
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let ws = TestWorkspace::new();
        let sln = ProjectId::new(Utf8Path::new("/ws/All.sln")).unwrap();
        let p = ProjectId::new(Utf8Path::new("/ws/P/P.fsproj")).unwrap();

        assert!(matches!(
            ws.new_project_file(&sln),
            Err(ProjectError::Unresolvable(_))
        ));
        assert!(matches!(
            ws.update_sln_file(&p),
            Err(ProjectError::NotASolution(_))
        ));
        assert!(ws.known_projects().is_empty());
    }
}
