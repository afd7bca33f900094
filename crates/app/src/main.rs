//! QR Attend - attendance tracking with per-session QR codes
//!
//! Desktop front end over the qrattend-core pages.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qrattend_core::AppConfig;
use slint::ComponentHandle;

mod format;
mod state;
mod viewmodel;

slint::include_modules!();

fn main() {
    let (config, config_error) = match AppConfig::load_default() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialize logging; RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    tracing::info!("Starting QR Attend");
    if let Some(e) = config_error {
        tracing::warn!("Ignoring unreadable configuration: {}", e);
    }

    // Store work runs on the blocking pool
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };
    let _guard = runtime.enter();

    let app_state = match state::AppState::new(config, runtime.handle().clone()) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    let main_window = match MainWindow::new() {
        Ok(window) => window,
        Err(e) => {
            tracing::error!("Failed to create main window: {}", e);
            std::process::exit(1);
        }
    };

    viewmodel::setup_bindings(&main_window, app_state);

    if let Err(e) = main_window.run() {
        tracing::error!("Event loop failed: {}", e);
        std::process::exit(1);
    }
}
