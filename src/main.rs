use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

use nami::app::{App, AppEvent};
use nami::config::Config;
use nami::nav::Route;
use nami::preferences::PreferenceManager;
use nami::remix::ReferenceHistory;
use nami::storage::{Database, DatabaseError};

/// Get the config directory path (~/.config/nami/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("nami"))
}

/// Get the data directory path (~/.local/share/nami/)
fn get_data_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".local").join("share").join("nami"))
}

/// Create `dir` if needed and restrict it to the current user.
fn ensure_private_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(dir, perms) {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %e,
                        "Failed to set directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %dir.display(),
                    error = %e,
                    "Failed to read directory metadata"
                );
            }
        }
    }
    Ok(())
}

/// Log to `nami.log` in the data directory so output never lands on the UI.
fn init_logging(data_dir: &Path) -> Result<()> {
    let log_path = data_dir.join("nami.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "nami", about = "Browse the Nami Video catalog in the terminal")]
struct Args {
    /// Config file (default: ~/.config/nami/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Deep link to open, e.g. "/explore?category=viral" or "/category/ugc"
    #[arg(long, value_name = "LINK")]
    link: Option<String>,

    /// Number of grid columns (overrides config and stored preference)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=8))]
    columns: Option<u16>,

    /// Forget recently used reference images
    #[arg(long)]
    reset_history: bool,

    /// Make every catalog request fail (exercise the error states)
    #[arg(long)]
    fail_catalog: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = get_data_dir()?;
    ensure_private_dir(&data_dir)?;
    init_logging(&data_dir)?;

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_config_dir()?.join("config.toml"),
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if args.fail_catalog {
        config.catalog.fail = true;
    }

    let db_path = data_dir.join("nami.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of nami appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let prefs = match PreferenceManager::load(&config, &db).await {
        Ok(prefs) => prefs,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read stored preferences, using config");
            PreferenceManager::from_config(&config)
        }
    };

    let history_limit = prefs.history_limit();
    let history = if args.reset_history {
        let mut history = ReferenceHistory::new(history_limit);
        history
            .clear(&db)
            .await
            .context("Failed to reset reference history")?;
        println!("Reference history cleared.");
        history
    } else {
        ReferenceHistory::load(&db, history_limit).await?
    };

    let mut app = App::new(config, db.clone(), prefs, history);
    if let Some(columns) = args.columns {
        app.set_columns(usize::from(columns));
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    let route = Route::parse(args.link.as_deref().unwrap_or("/"));
    tracing::info!(?route, "Starting");
    app.navigate(route, &event_tx);

    let result = nami::ui::run(&mut app, event_tx, event_rx).await;
    drop(app);
    db.close().await;
    result?;

    println!("Goodbye!");
    Ok(())
}
