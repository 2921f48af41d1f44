//! ImageRename — plugin-driven image rename host
//!
//! Loads the configured plugins, compiles them into a template, renders it
//! into a headless application and drives the host loop from a tick timer
//! and line commands read from stdin.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use imagerename_core::config::AppConfig;
use imagerename_core::error::AppError;
use imagerename_template::{Engine, HeadlessToolkit, NodeKind, Session, Template, WindowId};
use imagerename_template::host::app::App;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Host error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from the optional file named by `IMAGERENAME_CONFIG` or the first argument
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path = std::env::var("IMAGERENAME_CONFIG")
        .ok()
        .or_else(|| std::env::args().nth(1));
    AppConfig::load(config_path.as_deref())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Image files of the configured directory, sorted by path.
fn collect_images(config: &AppConfig) -> Result<Vec<PathBuf>, AppError> {
    let dir = &config.viewer.image_dir;
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AppError::with_source(
            imagerename_core::error::ErrorKind::NotFound,
            format!("Cannot read image directory '{}'", dir),
            e,
        )
    })?;

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| config.viewer.accepts_extension(ext))
        })
        .collect();
    images.sort();
    Ok(images)
}

/// Main host run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting ImageRename v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Images ───────────────────────────────────────────
    let images = collect_images(&config)?;
    tracing::info!(dir = %config.viewer.image_dir, count = images.len(), "Images collected");

    // ── Step 2: Plugins ──────────────────────────────────────────
    let mut engine = Engine::from_config(&config.plugins)?;
    let template = Template::compile_with_overrides(&mut engine, &config.hotkeys)?;

    // ── Step 3: Application ──────────────────────────────────────
    let mut app = App::from_config(Box::new(HeadlessToolkit::new()), &config.viewer, images);
    template.install(&mut app);
    let report = app.render(None);
    for failure in &report.failures {
        tracing::warn!(kind = %failure.kind, node = %failure.name, error = %failure.error, "Node failed to render");
    }
    let mut session = Session::new(app);

    // ── Step 4: Host loop ────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let mut ticker = tokio::time::interval(Duration::from_millis(config.viewer.tick_interval_ms.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    tracing::info!("Host loop running");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                session.tick();
                if session.is_finished() {
                    tracing::info!("Every image handled");
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_line(&mut session, line.trim()) {
                            break;
                        }
                    }
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        tracing::warn!(error = %e, "Stdin closed");
                        stdin_open = false;
                    }
                }
            }
            _ = shutdown_rx.changed() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    session.shutdown();
    tracing::info!("ImageRename stopped");
    Ok(())
}

/// Applies one stdin command. Returns `false` to stop the loop.
///
/// Commands: `quit`, `panels`, `hide <kind:name>`, `click <kind:name> <index>`.
/// Anything else is pressed as a key combo.
fn handle_line(session: &mut Session, line: &str) -> bool {
    let mut words = line.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (None, _, _) => {}
        (Some("quit"), None, None) => return false,
        (Some("panels"), None, None) => {
            session.app_mut().render(Some(NodeKind::Panel));
        }
        (Some("hide"), Some(id), None) => match WindowId::parse(id) {
            Some(id) => {
                if !session.app_mut().hide_window(&id) {
                    tracing::warn!(window = %id, "No such window");
                }
            }
            None => tracing::warn!(window = %id, "Expected panel:<name> or toolbar:<name>"),
        },
        (Some("click"), Some(id), Some(index)) => {
            let (Some(id), Ok(index)) = (WindowId::parse(id), index.parse::<usize>()) else {
                tracing::warn!(line = %line, "Expected click <kind:name> <index>");
                return true;
            };
            if let Err(e) = session.click(&id, index) {
                tracing::warn!(window = %id, index, error = %e, "Button failed");
            }
        }
        _ => match session.press(line) {
            Ok(true) => {}
            Ok(false) => tracing::info!(combo = %line, "Nothing bound to key"),
            Err(e) => tracing::warn!(combo = %line, error = %e, "Hotkey failed"),
        },
    }
    true
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
