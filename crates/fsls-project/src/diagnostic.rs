use std::fmt;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The external cracker reported an error for a project.
    CrackFailed,
    /// Script option inference reported an error.
    ScriptCheck,
    /// No known project or script lists the queried file.
    NoOwner,
    /// A project reference closes a cycle back to a project being resolved.
    CyclicReference,
}

impl DiagnosticKind {
    /// Stable name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CrackFailed => "crack-failed",
            Self::ScriptCheck => "script-check",
            Self::NoOwner => "no-owner",
            Self::CyclicReference => "cyclic-reference",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem with workspace state, attached to the file it concerns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    file: Utf8PathBuf,
    message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(kind: DiagnosticKind, file: &Utf8Path, message: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.to_path_buf(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    #[must_use]
    pub fn file(&self) -> &Utf8Path {
        &self.file
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_file() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::NoOwner,
            Utf8Path::new("/ws/stray.fs"),
            "not in any project",
        );
        assert_eq!(diagnostic.to_string(), "/ws/stray.fs: not in any project");
    }

    #[test]
    fn test_kind_names_match_serialized_form() {
        for kind in [
            DiagnosticKind::CrackFailed,
            DiagnosticKind::ScriptCheck,
            DiagnosticKind::NoOwner,
            DiagnosticKind::CyclicReference,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
    }
}
