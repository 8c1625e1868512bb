//! Diet Mate daemon entry point.
//!
//! This binary starts the notification coordinator socket server that host
//! runtimes connect to.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dietmate_core::config::{Config, Directories};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Diet Mate daemon - notification coordinator for host runtimes
#[derive(Parser, Debug)]
#[command(name = "dietmate-daemon")]
#[command(version, about, long_about = None)]
struct Args {
    /// Custom socket path (defaults to `$XDG_RUNTIME_DIR/dietmate.sock` or the temp dir)
    #[arg(long, value_name = "PATH")]
    socket_path: Option<PathBuf>,

    /// Config file (defaults to `config.json` in the user config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Set up logging with file output for debugging.
/// In debug builds, defaults to debug level and logs to timestamped file.
/// In release builds, defaults to info level and logs to stderr.
fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dietmate={default_level}")));

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("dietmate-daemon-{timestamp}.log");
        let log_path = temp_dir.join(&log_filename);

        #[cfg(unix)]
        {
            let symlink_path = temp_dir.join("dietmate-daemon.log");
            let _ = std::fs::remove_file(&symlink_path);
            let _ = std::os::unix::fs::symlink(&log_path, &symlink_path);
        }

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter)
            .init();

        eprintln!("Logging to: {} (and stderr)", log_path.display());
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_logging();

    let config_path = args
        .config
        .unwrap_or_else(|| Directories::new().config_file);
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    info!("Config loaded from {:?}", config_path);

    info!("Starting Diet Mate daemon...");

    dietmate_daemon::run(args.socket_path, config).await?;

    info!("Diet Mate daemon stopped");
    Ok(())
}
