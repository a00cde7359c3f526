mod deps;
mod options;
mod projects;
mod visible;

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use fsls_project::ProjectOptions;
use fsls_project::Workspace;
use serde::Serialize;

use crate::args::GlobalArgs;
use crate::exit::Exit;

pub trait Command {
    fn execute(&self, workspace: &Workspace, args: &GlobalArgs) -> Result<Exit>;
}

#[derive(Debug, Subcommand)]
pub enum FslsCommand {
    /// Print the options of the script or project that compiles a file
    Options(self::options::Options),
    /// Print a project and everything it references, dependencies first
    Deps(self::deps::Deps),
    /// Resolve every known project and print them in dependency order
    Projects(self::projects::Projects),
    /// Report whether one source file can see another
    Visible(self::visible::Visible),
}

impl Command for FslsCommand {
    fn execute(&self, workspace: &Workspace, args: &GlobalArgs) -> Result<Exit> {
        match self {
            Self::Options(cmd) => cmd.execute(workspace, args),
            Self::Deps(cmd) => cmd.execute(workspace, args),
            Self::Projects(cmd) => cmd.execute(workspace, args),
            Self::Visible(cmd) => cmd.execute(workspace, args),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per project, with its diagnostics indented below it.
fn print_order(order: &[Arc<ProjectOptions>]) {
    for options in order {
        println!("{}", options.id());
        for diagnostic in options.diagnostics() {
            println!("  {}: {}", diagnostic.kind(), diagnostic.message());
        }
    }
}

fn as_refs(order: &[Arc<ProjectOptions>]) -> Vec<&ProjectOptions> {
    order.iter().map(AsRef::as_ref).collect()
}
