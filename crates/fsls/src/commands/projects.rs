use anyhow::Result;
use clap::Parser;
use fsls_project::Workspace;

use crate::args::GlobalArgs;
use crate::commands::as_refs;
use crate::commands::print_json;
use crate::commands::print_order;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Projects {}

impl Command for Projects {
    fn execute(&self, workspace: &Workspace, args: &GlobalArgs) -> Result<Exit> {
        for id in workspace.known_projects() {
            workspace.options(&id)?;
        }
        let order = workspace.open_projects();

        if args.json {
            print_json(&as_refs(&order))?;
        } else {
            print_order(&order);
        }

        let broken = order.iter().filter(|options| options.has_diagnostics()).count();
        if broken > 0 {
            let word = if broken == 1 { "project" } else { "projects" };
            return Ok(Exit::error().with_message(format!("{broken} {word} failed to resolve.")));
        }
        Ok(Exit::success())
    }
}
