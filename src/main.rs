mod api;
mod app;
mod config;
mod event;
mod scene;
mod session;
mod theme;
mod ui;

use api::worker::ApiWorker;
use api::ApiClient;
use app::FoundByMeApp;
use config::AppConfig;
use eframe::egui;
use std::sync::mpsc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("foundbyme=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = AppConfig::load()?;
    info!(api = %config.api.base_url, "starting FoundByMe");
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("foundbyme-runtime")
        .build()?;

    let client = ApiClient::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    )?;
    let worker = ApiWorker::new(client, tx, runtime.handle().clone());

    let app = FoundByMeApp::new(rx, worker, &config);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("FoundByMe")
            .with_inner_size([config.window.width, config.window.height])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "FoundByMe",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(app))),
    )?;

    Ok(())
}
