mod cache;
mod cracker;
mod diagnostic;
mod error;
mod events;
mod graph;
mod identity;
mod index;
mod invalidate;
mod options;
mod owner;
pub mod paths;
mod resolve;
mod script;
mod solution;
mod system;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod visibility;
mod walk;
mod workspace;

pub use cache::Cache;
pub use cache::CacheEntry;
pub use cache::Cycle;
pub use cracker::CrackedProject;
pub use cracker::Cracker;
pub use cracker::ProcessCracker;
pub use cracker::UnconfiguredCracker;
pub use diagnostic::Diagnostic;
pub use diagnostic::DiagnosticKind;
pub use error::ProjectError;
pub use events::FileEvent;
pub use graph::dependency_order;
pub use identity::ProjectId;
pub use identity::ProjectKind;
pub use options::ProjectOptions;
pub use options::ProjectReference;
pub use script::LoadDirectiveChecker;
pub use script::ScriptChecker;
pub use script::ScriptOptions;
pub use solution::parse_solution;
pub use system::FileSystem;
pub use system::InMemoryFileSystem;
pub use system::OsFileSystem;
pub use walk::scan;
pub use walk::WalkOptions;
pub use workspace::Workspace;
