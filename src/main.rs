//! Interactive admin console for DanhengServer.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use danheng::config::DEFAULT_CONFIG_FILE;
use danheng::menu::run_menu;
use danheng::{AppConfig, Console, MessageKind, OfflineSubmitter, SnapshotWorker};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "danheng-console", version, about)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log file (the terminal itself is reserved for the console)
    #[arg(long, default_value = "danheng-console.log")]
    log_file: PathBuf,
}

/// Initialize logging into `path`; level comes from `DANHENG_LOG`.
fn init_logging(path: &Path) {
    let filter = EnvFilter::try_from_env("DANHENG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    // No log file means no logs; never fall back to the terminal.
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file);

    let loaded = AppConfig::load(&args.config);
    let console_config = loaded
        .as_ref()
        .map(AppConfig::console_config)
        .unwrap_or_default();

    let mut console = Console::new(console_config)?;
    console.publish("Welcome to DanhengServer-Console", MessageKind::Info);
    console.publish(
        "For learning and exchange only, not for commercial use",
        MessageKind::Info,
    );
    console.start()?;

    let config = match loaded {
        Ok(config) => {
            console.publish(
                format!("loaded config file: {}", args.config.display()),
                MessageKind::Success,
            );
            config
        }
        Err(e) => {
            tracing::error!(error = %e, "configuration unusable");
            console.publish(e.to_string(), MessageKind::Error);
            console.publish("press Enter to exit...", MessageKind::Newline);
            console.read_line();
            console.shutdown()?;
            return Ok(());
        }
    };

    let snapshots = config.snapshot_config().map(|snapshot| {
        let root = snapshot.root.display().to_string();
        let worker = SnapshotWorker::new(snapshot, console.publisher());
        match worker.start() {
            Ok(_) => console.publish(format!("snapshots will be saved under {root}"), MessageKind::Info),
            Err(e) => console.publish(format!("failed to start snapshots: {e}"), MessageKind::Error),
        }
        worker
    });

    let submitter = OfflineSubmitter::new(config.dispatch_url.clone());
    run_menu(&console, &submitter, &config.player_uid);

    if let Some(worker) = snapshots {
        worker.shutdown()?;
    }
    console.shutdown()?;
    Ok(())
}
