//! File system abstraction for the project model.
//!
//! Raw file reads in the core (the owner pre-filter, script text, solution
//! files, load stamps) go through [`FileSystem`] so the whole model can run
//! against [`InMemoryFileSystem`] in tests.

use std::io;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::SystemTime;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use dashmap::DashMap;

pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String>;
    fn exists(&self, path: &Utf8Path) -> bool;
    /// Last modification time of the file.
    fn modified(&self, path: &Utf8Path) -> io::Result<SystemTime>;
}

/// Standard file system implementation that uses [`std::fs`].
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        path.exists()
    }

    fn modified(&self, path: &Utf8Path) -> io::Result<SystemTime> {
        std::fs::metadata(path)?.modified()
    }
}

struct InMemoryFile {
    content: String,
    modified: SystemTime,
}

/// Mutable in-memory file system.
///
/// Writes go through `&self` so a test can edit files underneath a live
/// workspace. Each write advances a logical clock, so modification times are
/// strictly increasing and deterministic.
pub struct InMemoryFileSystem {
    files: DashMap<Utf8PathBuf, InMemoryFile>,
    clock: AtomicU64,
}

impl InMemoryFileSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            clock: AtomicU64::new(0),
        }
    }

    pub fn add_file(&self, path: impl Into<Utf8PathBuf>, content: impl Into<String>) {
        let tick = self.clock.fetch_add(1, Ordering::Relaxed) + 1;
        self.files.insert(
            path.into(),
            InMemoryFile {
                content: content.into(),
                modified: SystemTime::UNIX_EPOCH + Duration::from_secs(tick),
            },
        );
    }

    pub fn remove_file(&self, path: &Utf8Path) -> bool {
        self.files.remove(path).is_some()
    }
}

impl Default for InMemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(path: &Utf8Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("File not found: {path}"))
}

impl FileSystem for InMemoryFileSystem {
    fn read_to_string(&self, path: &Utf8Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|file| file.content.clone())
            .ok_or_else(|| not_found(path))
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(path)
    }

    fn modified(&self, path: &Utf8Path) -> io::Result<SystemTime> {
        self.files
            .get(path)
            .map(|file| file.modified)
            .ok_or_else(|| not_found(path))
    }
}
