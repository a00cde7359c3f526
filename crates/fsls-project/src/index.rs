//! Which project and solution files the workspace knows about.
//!
//! The index holds identities only; resolved options live in the cache.
//! Ordered collections keep "first match" searches deterministic.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use crate::ProjectId;

#[derive(Debug, Default)]
pub struct WorkspaceIndex {
    projects: RwLock<BTreeSet<ProjectId>>,
    solutions: RwLock<BTreeMap<ProjectId, Vec<ProjectId>>>,
}

// A panic while holding one of these locks cannot leave the collections
// half-updated, so poisoning is ignored.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl WorkspaceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the project was not already known.
    pub fn insert_project(&self, id: ProjectId) -> bool {
        write(&self.projects).insert(id)
    }

    pub fn remove_project(&self, id: &ProjectId) -> bool {
        write(&self.projects).remove(id)
    }

    #[must_use]
    pub fn contains_project(&self, id: &ProjectId) -> bool {
        read(&self.projects).contains(id)
    }

    /// Known scripts and projects, ordered by path.
    #[must_use]
    pub fn projects(&self) -> Vec<ProjectId> {
        read(&self.projects).iter().cloned().collect()
    }

    /// Replace the member list of `solution`.
    pub fn set_solution(&self, solution: ProjectId, members: Vec<ProjectId>) {
        write(&self.solutions).insert(solution, members);
    }

    pub fn remove_solution(&self, solution: &ProjectId) -> bool {
        write(&self.solutions).remove(solution).is_some()
    }

    /// Known solutions with their members, ordered by solution path.
    #[must_use]
    pub fn solutions(&self) -> Vec<(ProjectId, Vec<ProjectId>)> {
        read(&self.solutions)
            .iter()
            .map(|(solution, members)| (solution.clone(), members.clone()))
            .collect()
    }

    /// Whether any known solution lists `id`.
    #[must_use]
    pub fn in_any_solution(&self, id: &ProjectId) -> bool {
        read(&self.solutions)
            .values()
            .any(|members| members.contains(id))
    }
}
