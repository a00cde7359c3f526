//! Option inference for `.fsx` scripts.
//!
//! Scripts carry their own dependencies inline through `#load` directives, so
//! resolving one never goes through the cracker or the project graph.

use std::sync::LazyLock;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use regex::Regex;
use rustc_hash::FxHashSet;

use crate::paths::canonicalize;
use crate::FileSystem;

/// What the script checker inferred for one script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Ordered; loaded files come before the files that load them.
    pub source_files: Vec<Utf8PathBuf>,
    pub other_options: Vec<String>,
    pub errors: Vec<String>,
}

pub trait ScriptChecker: Send + Sync {
    fn check(&self, script: &Utf8Path, source: &str, fs: &dyn FileSystem) -> ScriptOptions;
}

static QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("quoted string pattern is valid"));

/// File names named by `#load` directives in `source`, in order.
fn load_directives(source: &str) -> Vec<&str> {
    source
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix("#load"))
        .flat_map(|rest| {
            QUOTED
                .captures_iter(rest)
                .filter_map(|captures| captures.get(1).map(|m| m.as_str()))
        })
        .collect()
}

/// Infers script sources by following `#load` directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadDirectiveChecker;

impl LoadDirectiveChecker {
    fn collect(
        script: &Utf8Path,
        source: &str,
        fs: &dyn FileSystem,
        seen: &mut FxHashSet<Utf8PathBuf>,
        out: &mut ScriptOptions,
    ) {
        let dir = script.parent().unwrap_or(script);
        for name in load_directives(source) {
            let loaded = canonicalize(&dir.join(name));
            if !seen.insert(loaded.clone()) {
                continue;
            }
            match fs.read_to_string(&loaded) {
                Ok(text) => Self::collect(&loaded, &text, fs, seen, out),
                Err(e) => out
                    .errors
                    .push(format!("{script}: cannot load `{name}`: {e}")),
            }
        }
        out.source_files.push(script.to_path_buf());
    }
}

impl ScriptChecker for LoadDirectiveChecker {
    fn check(&self, script: &Utf8Path, source: &str, fs: &dyn FileSystem) -> ScriptOptions {
        let mut out = ScriptOptions {
            other_options: vec!["--noframework".to_string()],
            ..ScriptOptions::default()
        };
        let mut seen = FxHashSet::default();
        seen.insert(script.to_path_buf());
        Self::collect(script, source, fs, &mut seen, &mut out);
        out
    }
}
