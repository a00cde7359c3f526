use camino::Utf8Path;
use fsls_conf::ScanSettings;
use ignore::WalkBuilder;

use crate::ProjectId;
use crate::ProjectKind;

/// Options controlling how [`scan`] traverses a workspace root.
///
/// All options map directly to methods on the `ignore` crate's
/// `WalkBuilder`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Include hidden files and directories (those starting with `.`).
    pub hidden: bool,
    /// Disable all ignore files (`.gitignore`, `.ignore`, etc.).
    pub no_ignore: bool,
    pub follow_links: bool,
    /// Maximum directory recursion depth. `None` means unlimited.
    pub max_depth: Option<usize>,
}

impl From<&ScanSettings> for WalkOptions {
    fn from(settings: &ScanSettings) -> Self {
        Self {
            hidden: settings.hidden,
            no_ignore: settings.no_ignore,
            follow_links: settings.follow_links,
            max_depth: settings.max_depth,
        }
    }
}

/// Build output directories never hold files worth registering.
fn is_build_output(name: &str) -> bool {
    matches!(name, "bin" | "obj")
}

/// Every script, project, and solution file under `root`.
///
/// Hidden entries and `.gitignore`d paths are skipped unless `options` say
/// otherwise. Returns canonical identities sorted by path.
#[must_use]
pub fn scan(root: &Utf8Path, options: &WalkOptions) -> Vec<ProjectId> {
    let mut builder = WalkBuilder::new(root.as_std_path());
    // standard_filters first; it resets hidden and the ignore flags.
    builder
        .standard_filters(!options.no_ignore)
        .hidden(!options.hidden)
        .follow_links(options.follow_links)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && entry.file_name().to_str().is_some_and(is_build_output))
        });

    if let Some(depth) = options.max_depth {
        builder.max_depth(Some(depth));
    }

    let mut found: Vec<ProjectId> = builder
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter_map(|entry| {
            let path = Utf8Path::from_path(entry.path())?;
            ProjectKind::from_path(path)?;
            ProjectId::new(path).ok()
        })
        .collect();

    found.sort();
    found.dedup();
    tracing::debug!("Scanned {} and found {} project files", root, found.len());
    found
}

#[cfg(test)]
mod tests {
    use camino::Utf8PathBuf;

    use super::*;

    fn defaults() -> WalkOptions {
        WalkOptions::default()
    }

    fn names(found: &[ProjectId]) -> Vec<&str> {
        found.iter().filter_map(|id| id.path().file_name()).collect()
    }

    fn root(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn finds_recognized_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("App")).unwrap();
        std::fs::write(dir.path().join("App/App.fsproj"), "<Project />").unwrap();
        std::fs::write(dir.path().join("App/Program.fs"), "[<EntryPoint>]").unwrap();
        std::fs::write(dir.path().join("All.sln"), "").unwrap();
        std::fs::write(dir.path().join("build.fsx"), "").unwrap();
        std::fs::write(dir.path().join("Interop.csproj"), "").unwrap();

        let found = scan(&root(&dir), &defaults());

        assert_eq!(names(&found), vec!["All.sln", "App.fsproj", "build.fsx"]);
    }

    #[test]
    fn skips_build_output_directories() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dir.path().join("App/obj");
        std::fs::create_dir_all(&obj).unwrap();
        std::fs::write(obj.join("Generated.fsx"), "").unwrap();
        std::fs::write(dir.path().join("App/App.fsproj"), "").unwrap();

        let found = scan(&root(&dir), &defaults());

        assert_eq!(names(&found), vec!["App.fsproj"]);
    }

    #[test]
    fn hidden_directories_need_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = dir.path().join(".paket");
        std::fs::create_dir_all(&hidden).unwrap();
        std::fs::write(hidden.join("load.fsx"), "").unwrap();

        assert!(scan(&root(&dir), &defaults()).is_empty());

        let opts = WalkOptions {
            hidden: true,
            ..defaults()
        };
        assert_eq!(names(&scan(&root(&dir), &opts)), vec!["load.fsx"]);
    }

    #[test]
    fn max_depth_limits_recursion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("top.fsx"), "").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("Deep.fsproj"), "").unwrap();

        let opts = WalkOptions {
            max_depth: Some(1),
            ..defaults()
        };
        assert_eq!(names(&scan(&root(&dir), &opts)), vec!["top.fsx"]);
    }

    #[test]
    fn options_from_settings() {
        let settings = ScanSettings {
            hidden: true,
            no_ignore: true,
            follow_links: false,
            max_depth: Some(4),
        };
        assert_eq!(
            WalkOptions::from(&settings),
            WalkOptions {
                hidden: true,
                no_ignore: true,
                follow_links: false,
                max_depth: Some(4),
            }
        );
    }
}
