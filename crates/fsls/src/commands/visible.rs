use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use fsls_project::Workspace;
use serde::Serialize;

use crate::args::GlobalArgs;
use crate::commands::print_json;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Visible {
    /// File whose declarations are looked for.
    target: Utf8PathBuf,

    /// File doing the looking.
    #[arg(long)]
    from: Utf8PathBuf,
}

#[derive(Serialize)]
struct VisibilityReport<'a> {
    target: &'a Utf8PathBuf,
    from: &'a Utf8PathBuf,
    visible: bool,
}

impl Command for Visible {
    fn execute(&self, workspace: &Workspace, args: &GlobalArgs) -> Result<Exit> {
        let visible = workspace.is_visible(&self.target, &self.from);

        if args.json {
            print_json(&VisibilityReport {
                target: &self.target,
                from: &self.from,
                visible,
            })?;
        } else {
            println!("{visible}");
        }
        Ok(Exit::success())
    }
}
