use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use fsls_project::ProjectId;
use fsls_project::Workspace;

use crate::args::GlobalArgs;
use crate::commands::as_refs;
use crate::commands::print_json;
use crate::commands::print_order;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Deps {
    /// Script or project file.
    project: Utf8PathBuf,
}

impl Command for Deps {
    fn execute(&self, workspace: &Workspace, args: &GlobalArgs) -> Result<Exit> {
        let id = ProjectId::new(&self.project)?;
        let order = workspace
            .transitive_deps(&id)
            .with_context(|| format!("Failed to resolve {}", self.project))?;

        if args.json {
            print_json(&as_refs(&order))?;
        } else {
            print_order(&order);
        }
        Ok(Exit::success())
    }
}
