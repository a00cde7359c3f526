//! Path normalization for identities and source lists.
//!
//! Every path that is compared against another (project identities, cracked
//! source lists, query arguments) goes through [`canonicalize`] so that two
//! spellings of the same file compare equal.
//!
//! [`clean`] is vendored and adapted from the `path-clean` crate,
//! <https://github.com/danreeves/path-clean>
//!
//! path-clean LICENSE-MIT:
//! Copyright (c) 2018 Dan Reeves
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//! SOFTWARE.

use std::path::Component;

use camino::Utf8Path;
use camino::Utf8PathBuf;

/// Canonicalize `path` to an absolute path.
///
/// Existing files are resolved through the file system (symlinks included).
/// Paths that do not exist on disk (deleted files, in-memory test fixtures)
/// are made absolute against the current directory and cleaned lexically.
#[must_use]
pub fn canonicalize(path: &Utf8Path) -> Utf8PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path.as_std_path()) {
        if let Ok(canonical) = Utf8PathBuf::from_path_buf(canonical) {
            return canonical;
        }
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .ok()
            .and_then(|cwd| Utf8PathBuf::from_path_buf(cwd).ok())
            .map_or_else(|| path.to_path_buf(), |cwd| cwd.join(path))
    };
    clean(&absolute)
}

/// Lexically remove `.` and `..` components.
#[must_use]
pub fn clean(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Vec::new();

    for comp in path.as_std_path().components() {
        match comp {
            Component::CurDir => (),
            Component::ParentDir => match out.last() {
                Some(Component::RootDir) => (),
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                None | Some(Component::CurDir | Component::ParentDir | Component::Prefix(_)) => {
                    out.push(comp);
                }
            },
            comp => out.push(comp),
        }
    }

    if out.is_empty() {
        return Utf8PathBuf::from(".");
    }

    let cleaned: std::path::PathBuf = out.iter().collect();
    // Only components of a UTF-8 path were collected.
    Utf8PathBuf::from_path_buf(cleaned).unwrap_or_else(|_| path.to_path_buf())
}
