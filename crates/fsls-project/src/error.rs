use camino::Utf8PathBuf;
use thiserror::Error;

/// Caller misuse of the project model.
///
/// Workspace state problems (a project that fails to crack, a file nobody
/// owns) are never reported through this type; they surface as
/// [`Diagnostic`](crate::Diagnostic) values instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("`{0}` is not a script (.fsx), project (.fsproj), or solution (.sln) file")]
    UnrecognizedFile(Utf8PathBuf),
    #[error("`{0}` is a solution file and has no project options")]
    Unresolvable(Utf8PathBuf),
    #[error("`{0}` is not a solution (.sln) file")]
    NotASolution(Utf8PathBuf),
    #[error("`{0}` is not a directory")]
    NotADirectory(Utf8PathBuf),
}
