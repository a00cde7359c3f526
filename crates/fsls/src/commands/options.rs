use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use fsls_project::Diagnostic;
use fsls_project::ProjectOptions;
use fsls_project::Workspace;
use serde::Serialize;

use crate::args::GlobalArgs;
use crate::commands::print_json;
use crate::commands::Command;
use crate::exit::Exit;

#[derive(Debug, Parser)]
pub struct Options {
    /// Source file, script, or project file to look up.
    file: Utf8PathBuf,
}

#[derive(Serialize)]
struct DiagnosticsReport<'a> {
    diagnostics: &'a [Diagnostic],
}

impl Command for Options {
    fn execute(&self, workspace: &Workspace, args: &GlobalArgs) -> Result<Exit> {
        match workspace.find_project_options(&self.file) {
            Ok(options) => {
                if args.json {
                    print_json(&*options)?;
                } else {
                    print_options(&options);
                }
                Ok(Exit::success())
            }
            Err(diagnostics) => {
                if args.json {
                    print_json(&DiagnosticsReport {
                        diagnostics: &diagnostics,
                    })?;
                } else {
                    for diagnostic in &diagnostics {
                        println!("{}: {}", diagnostic.kind(), diagnostic);
                    }
                }
                let count = diagnostics.len();
                let word = if count == 1 { "diagnostic" } else { "diagnostics" };
                Ok(Exit::error().with_message(format!("Found {count} {word}.")))
            }
        }
    }
}

fn print_options(options: &ProjectOptions) {
    println!("project: {}", options.id());
    if let Some(target) = options.target() {
        println!("target: {target}");
    }
    println!("sources:");
    for source in options.sources() {
        println!("  {source}");
    }
    println!("flags:");
    for flag in options.flags() {
        println!("  {flag}");
    }
    if !options.references().is_empty() {
        println!("references:");
        for reference in options.references() {
            match reference.output() {
                Some(output) => println!("  {} -> {output}", reference.options().id()),
                None => println!("  {}", reference.options().id()),
            }
        }
    }
}
