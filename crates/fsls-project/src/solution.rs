//! Static `.sln` parsing.
//!
//! Solutions are only read for the project paths they list. This is a line
//! scan, never a build evaluation, so it runs eagerly whenever a solution is
//! scanned or edited.

use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;

use crate::ProjectId;
use crate::ProjectKind;

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^Project\("([^"]*)"\) = "([^"]*)", "([^"]*)", "([^"]*)"$"#)
        .expect("solution project pattern is valid")
});

/// F# projects listed in a solution, resolved against the solution's directory.
///
/// Entries for other project types (and solution folders) are skipped.
#[must_use]
pub fn parse_solution(solution: &Utf8Path, text: &str) -> Vec<ProjectId> {
    let dir = solution.parent().unwrap_or(solution);

    text.lines()
        .filter_map(|line| PROJECT_LINE.captures(line.trim()))
        .filter_map(|captures| captures.get(3).map(|m| m.as_str()))
        .filter(|relative| relative.ends_with(".fsproj"))
        .filter_map(|relative| {
            let relative = relative.replace('\\', "/");
            ProjectId::new(&dir.join(relative)).ok()
        })
        .filter(|id| id.kind() == ProjectKind::Project)
        .collect()
}
