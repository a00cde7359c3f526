use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Workspace root to scan. Defaults to the current directory.
    #[arg(global = true, long, value_name = "DIR")]
    pub root: Option<Utf8PathBuf>,

    /// Print machine-readable JSON.
    #[arg(global = true, long)]
    pub json: bool,

    /// Only log errors.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use verbose output. Repeat for trace logging.
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,
}
