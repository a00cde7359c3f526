use std::ffi::OsString;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use fsls_conf::Settings;
use fsls_project::paths::canonicalize;
use fsls_project::Workspace;

use crate::args::GlobalArgs;
use crate::commands::Command;
use crate::commands::FslsCommand;
use crate::exit::Exit;
use crate::logging;

/// Inspect F# workspaces: project options, dependency order, visibility.
#[derive(Parser)]
#[command(name = "fsls")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: FslsCommand,

    #[command(flatten)]
    pub args: GlobalArgs,
}

/// Parse CLI arguments and execute the chosen command
pub fn run<I, T>(args: I) -> Result<Exit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let root = resolve_root(&cli.args)?;
    let settings = Settings::new(&root).context("Failed to load settings")?;
    let _guard = logging::init_tracing(&settings, &cli.args);
    tracing::debug!("Workspace root: {}", root);

    let workspace = Workspace::from_settings(&settings);
    workspace
        .add_workspace_root(&root)
        .with_context(|| format!("Failed to scan {root}"))?;

    cli.command.execute(&workspace, &cli.args)
}

fn resolve_root(args: &GlobalArgs) -> Result<Utf8PathBuf> {
    if let Some(root) = &args.root {
        return Ok(canonicalize(root));
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map(|cwd| canonicalize(&cwd))
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}
