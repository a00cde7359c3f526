//! Test doubles for the project model.
//!
//! [`FakeCracker`] answers from a table and counts how often each project is
//! cracked; [`FakeCracker::hold`] parks the next crack of a project until the
//! test releases it. [`TestWorkspace`] wires it and an [`InMemoryFileSystem`] into a
//! [`Workspace`] and writes project files whose text names their sources, so
//! the owner finder's text pre-filter behaves as it would on disk.

use std::fmt::Write;
use std::ops::Deref;
use std::sync::mpsc;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use dashmap::DashMap;

use crate::cracker::CrackedProject;
use crate::cracker::Cracker;
use crate::paths::canonicalize;
use crate::script::LoadDirectiveChecker;
use crate::InMemoryFileSystem;
use crate::ProjectId;
use crate::Workspace;

#[derive(Default)]
pub struct FakeCracker {
    projects: DashMap<Utf8PathBuf, CrackedProject>,
    invocations: DashMap<Utf8PathBuf, usize>,
    gates: DashMap<Utf8PathBuf, Gate>,
}

struct Gate {
    entered: mpsc::Sender<()>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// A crack parked by [`FakeCracker::hold`].
pub struct HeldCrack {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl HeldCrack {
    /// Block until the held crack has started.
    ///
    /// # Panics
    ///
    /// If the cracker is dropped before the crack starts.
    pub fn wait_until_entered(&self) {
        self.entered.recv().expect("held crack started");
    }

    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl FakeCracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `result` whenever `project` is cracked.
    pub fn set(&self, project: impl AsRef<Utf8Path>, result: CrackedProject) {
        self.projects.insert(canonicalize(project.as_ref()), result);
    }

    #[must_use]
    pub fn invocations(&self, project: &Utf8Path) -> usize {
        self.invocations
            .get(&canonicalize(project))
            .map_or(0, |count| *count)
    }

    #[must_use]
    pub fn total_invocations(&self) -> usize {
        self.invocations.iter().map(|count| *count.value()).sum()
    }

    /// Park the next crack of `project` until the returned handle is
    /// released.
    pub fn hold(&self, project: impl AsRef<Utf8Path>) -> HeldCrack {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        self.gates.insert(
            canonicalize(project.as_ref()),
            Gate {
                entered: entered_tx,
                release: Mutex::new(release_rx),
            },
        );
        HeldCrack {
            entered: entered_rx,
            release: release_tx,
        }
    }
}

impl Cracker for FakeCracker {
    fn crack(&self, project: &Utf8Path) -> CrackedProject {
        let project = canonicalize(project);
        *self.invocations.entry(project.clone()).or_insert(0) += 1;
        if let Some((_, gate)) = self.gates.remove(&project) {
            let _ = gate.entered.send(());
            let _ = gate
                .release
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv();
        }
        self.projects
            .get(&project)
            .map(|result| result.clone())
            .unwrap_or_else(|| CrackedProject::failed(format!("Unknown project {project}")))
    }
}

/// A [`Workspace`] over an in-memory file system and a [`FakeCracker`].
pub struct TestWorkspace {
    fs: Arc<InMemoryFileSystem>,
    cracker: Arc<FakeCracker>,
    workspace: Workspace,
}

impl TestWorkspace {
    #[must_use]
    pub fn new() -> Self {
        let fs = Arc::new(InMemoryFileSystem::new());
        let cracker = Arc::new(FakeCracker::new());
        let workspace = Workspace::new(
            fs.clone(),
            cracker.clone(),
            Arc::new(LoadDirectiveChecker),
        );
        Self {
            fs,
            cracker,
            workspace,
        }
    }

    #[must_use]
    pub fn fs(&self) -> &InMemoryFileSystem {
        &self.fs
    }

    #[must_use]
    pub fn cracker(&self) -> &FakeCracker {
        &self.cracker
    }

    /// Write and register a project that compiles `sources` (relative to its
    /// directory) and references `references`. Its target is
    /// `bin/<name>.dll`.
    ///
    /// # Panics
    ///
    /// If `path` is not an `.fsproj` path.
    pub fn project(&self, path: &str, sources: &[&str], references: &[&str]) -> ProjectId {
        let id = ProjectId::new(Utf8Path::new(path)).expect("project path");
        let stem = id.path().file_stem().unwrap_or("Project");

        self.fs.add_file(id.path(), project_text(sources, references));
        self.cracker.set(
            id.path(),
            CrackedProject {
                sources: sources.iter().map(Utf8PathBuf::from).collect(),
                target: Some(Utf8PathBuf::from(format!("bin/{stem}.dll"))),
                project_references: references.iter().map(Utf8PathBuf::from).collect(),
                ..CrackedProject::default()
            },
        );
        self.workspace
            .new_project_file(&id)
            .expect("register project");
        id
    }

    /// Write and register a project that mentions `sources` but fails to
    /// crack with `error`.
    ///
    /// # Panics
    ///
    /// If `path` is not an `.fsproj` path.
    pub fn failing_project(&self, path: &str, sources: &[&str], error: &str) -> ProjectId {
        let id = ProjectId::new(Utf8Path::new(path)).expect("project path");
        self.fs.add_file(id.path(), project_text(sources, &[]));
        self.cracker.set(id.path(), CrackedProject::failed(error));
        self.workspace
            .new_project_file(&id)
            .expect("register project");
        id
    }

    /// # Panics
    ///
    /// If `path` is not an `.fsx` path.
    pub fn script(&self, path: &str, text: &str) -> ProjectId {
        let id = ProjectId::new(Utf8Path::new(path)).expect("script path");
        self.fs.add_file(id.path(), text);
        self.workspace.new_project_file(&id).expect("register script");
        id
    }

    /// Write and register a solution listing `projects` (relative to the
    /// solution's directory).
    ///
    /// # Panics
    ///
    /// If `path` is not an `.sln` path.
    pub fn solution(&self, path: &str, projects: &[&str]) -> ProjectId {
        let id = ProjectId::new(Utf8Path::new(path)).expect("solution path");
        let mut text = String::from("Microsoft Visual Studio Solution File, Format Version 12.00\n");
        for (i, project) in projects.iter().enumerate() {
            let name = Utf8Path::new(project).file_stem().unwrap_or("Project");
            let _ = writeln!(
                text,
                "Project(\"{{F2A71F9B-5D33-465A-A702-920D77279786}}\") = \"{name}\", \"{}\", \"{{{i}}}\"\nEndProject",
                project.replace('/', "\\")
            );
        }
        self.fs.add_file(id.path(), text);
        self.workspace.update_sln_file(&id).expect("register solution");
        id
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestWorkspace {
    type Target = Workspace;

    fn deref(&self) -> &Workspace {
        &self.workspace
    }
}

fn project_text(sources: &[&str], references: &[&str]) -> String {
    let mut text = String::from("<Project Sdk=\"Microsoft.NET.Sdk\">\n  <ItemGroup>\n");
    for source in sources {
        let _ = writeln!(text, "    <Compile Include=\"{source}\" />");
    }
    for reference in references {
        let _ = writeln!(text, "    <ProjectReference Include=\"{reference}\" />");
    }
    text.push_str("  </ItemGroup>\n</Project>\n");
    text
}
