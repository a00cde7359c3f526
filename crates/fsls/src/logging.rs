//! Tracing setup for the command-line binary.
//!
//! Events go to stderr so stdout stays clean for command output. When the
//! settings name a log directory, a second, daily-rotated file layer records
//! the same events with thread and source location detail.

use fsls_conf::Settings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::args::GlobalArgs;

/// Default filter when `RUST_LOG` is unset.
fn default_level(settings: &Settings, args: &GlobalArgs) -> &'static str {
    if args.quiet {
        "error"
    } else if args.verbose > 1 {
        "trace"
    } else if args.verbose == 1 || settings.debug() {
        "debug"
    } else {
        "info"
    }
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the tracing subscriber.
///
/// Returns a `WorkerGuard` when file logging is enabled; it must be kept
/// alive until exit so buffered lines are flushed.
pub fn init_tracing(settings: &Settings, args: &GlobalArgs) -> Option<WorkerGuard> {
    let level = default_level(settings, args);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(level));

    let (file_layer, guard) = match settings.log_dir() {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "fsls.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(env_filter(level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    Registry::default().with(stderr_layer).with(file_layer).init();

    guard
}
