//! NiceObjects CLI
//!
//! Command-line interface for editing GameMaker objects as plain text.

mod help;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use niceobj_core::{EventRegistry, ProjectConfig, SyncMode, CONFIG_FILE_NAME};
use niceobj_sync::{run_sync, ProjectLayout, SyncOptions};

#[derive(Parser)]
#[command(name = "niceobj")]
#[command(about = "Edit GameMaker: Studio objects as plain text")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a project and keep both sides in sync until stopped
    Watch {
        /// GameMaker project directory (the one holding *.project.gmx)
        project: PathBuf,

        /// Directory for the human-editable files
        #[arg(long)]
        human_dir: Option<PathBuf>,

        /// Config file (default: niceobj.json next to the project directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep the human directory on shutdown
        #[arg(long)]
        keep: bool,

        /// Which direction changes flow in
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Reverb window in milliseconds
        #[arg(long)]
        reverb_ms: Option<u64>,

        /// Dedup window in milliseconds
        #[arg(long)]
        dedup_ms: Option<u64>,
    },

    /// Write a default niceobj.json
    Init {
        /// Directory to write it to (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// List all event names
    Events,

    /// Show help on the tool or on the .gmo format
    Help {
        #[arg(value_enum)]
        topic: Option<HelpTopic>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Push,
    Pull,
    Bidirectional,
}

impl From<ModeArg> for SyncMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Push => SyncMode::Push,
            ModeArg::Pull => SyncMode::Pull,
            ModeArg::Bidirectional => SyncMode::Bidirectional,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum HelpTopic {
    Objects,
    Events,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("niceobj=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            project,
            human_dir,
            config,
            keep,
            mode,
            reverb_ms,
            dedup_ms,
        } => {
            let overrides = Overrides {
                human_dir,
                keep,
                mode: mode.map(SyncMode::from),
                reverb_ms,
                dedup_ms,
            };
            cmd_watch(&project, config.as_deref(), overrides).await?;
        }
        Commands::Init { path } => {
            cmd_init(path)?;
        }
        Commands::Events => {
            print!("{}", help::events(EventRegistry::standard()));
        }
        Commands::Help { topic } => match topic {
            None => print!("{}", help::GENERAL),
            Some(HelpTopic::Objects) => print!("{}", help::OBJECTS),
            Some(HelpTopic::Events) => print!("{}", help::events(EventRegistry::standard())),
        },
    }

    Ok(())
}

/// Command-line values that take precedence over the config file
#[derive(Default)]
struct Overrides {
    human_dir: Option<PathBuf>,
    keep: bool,
    mode: Option<SyncMode>,
    reverb_ms: Option<u64>,
    dedup_ms: Option<u64>,
}

/// Load the config and apply command-line overrides
///
/// Returns the config and the directory relative paths in it resolve against.
fn resolve_config(
    project: &Path,
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<(ProjectConfig, PathBuf)> {
    let (mut config, base) = match config_path {
        Some(path) => {
            let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
            (ProjectConfig::load(path)?, base)
        }
        None => {
            let project = project
                .canonicalize()
                .with_context(|| format!("GameMaker project not found: {}", project.display()))?;
            let base = project.parent().map(Path::to_path_buf).unwrap_or_default();
            (ProjectConfig::load_or_default(&base)?, base)
        }
    };

    if let Some(dir) = overrides.human_dir {
        config.human_dir = dir;
    }
    config.keep_human_dir |= overrides.keep;
    if let Some(mode) = overrides.mode {
        config.sync.mode = mode;
    }
    if let Some(ms) = overrides.reverb_ms {
        config.sync.reverb_window_ms = ms;
    }
    if let Some(ms) = overrides.dedup_ms {
        config.sync.dedup_window_ms = ms;
    }

    Ok((config, base))
}

async fn cmd_watch(project: &Path, config_path: Option<&Path>, overrides: Overrides) -> Result<()> {
    let explicit_human_dir = overrides.human_dir.is_some();
    let (config, base) = resolve_config(project, config_path, overrides)?;

    // A --human-dir flag is taken relative to the working directory
    let human_dir = if explicit_human_dir || config.human_dir.is_absolute() {
        config.human_dir.clone()
    } else {
        base.join(&config.human_dir)
    };

    println!("Initializing {} directory...", human_dir.display());
    let layout = ProjectLayout::prepare(project, &human_dir)?;

    let options = SyncOptions {
        layout,
        sync: config.sync,
        keep_human_dir: config.keep_human_dir,
    };
    run_sync(options, shutdown_signal()).await?;

    println!("Stopped.");
    Ok(())
}

fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let dir = match path {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let json = serde_json::to_string_pretty(&ProjectConfig::default())?;
    std::fs::write(&config_path, json + "\n")
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Wrote {}", config_path.display());
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
