use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

mod config;
mod controllers;
mod mail;
mod reminder;
mod store;

use config::Config;
use mail::Notifier;
use reminder::{ReminderScheduler, SystemClock};
use store::TaskStore;

pub struct AppState {
    pub store: Arc<dyn TaskStore>,
    pub notifier: Arc<Notifier>,
    pub config: Config,
    pub started_at: Instant,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();
    config::load_secrets_file();

    log::info!("Planner v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let port = config.port;

    let store = store::connect(&config.storage).await;
    log::info!("Storage backend: {}", store.backend_name());

    let notifier = Arc::new(Notifier::from_config(&config.mail));

    let scheduler = Arc::new(ReminderScheduler::new(
        Arc::clone(&store),
        Arc::clone(&notifier),
        Arc::new(SystemClock::new(config.reminder.utc_offset)),
        config.reminder.clone(),
    ));
    let cancel = CancellationToken::new();
    let scheduler_task = tokio::spawn(Arc::clone(&scheduler).run(cancel.clone()));

    let static_dir = config.static_dir.clone();
    if static_dir.is_dir() {
        log::info!("Serving dashboard from {:?}", static_dir);
    } else {
        log::warn!("Static directory {:?} not found - dashboard page will not be served", static_dir);
    }

    let state = web::Data::new(AppState {
        store,
        notifier,
        config,
        started_at: Instant::now(),
    });

    log::info!("Starting server on port {}", port);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let mut app = App::new()
            .app_data(state.clone())
            .app_data(controllers::json_config())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::dashboard::config)
            .configure(controllers::tasks::config)
            .configure(controllers::notes::config);

        if let Some(files) = controllers::dashboard::static_files(&static_dir) {
            app = app.service(files);
        }

        app
    })
    .bind(("0.0.0.0", port))?
    .run();

    let server_handle = server.handle();
    let shutdown = cancel.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        shutdown.cancel();

        log::info!("Stopping HTTP server...");
        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(Duration::from_secs(5), server_stop).await.is_err() {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }
    });

    let result = server.await;

    cancel.cancel();
    if tokio::time::timeout(Duration::from_secs(5), scheduler_task).await.is_err() {
        log::warn!("Timeout waiting for reminder scheduler to stop");
    }
    log::info!("Shutdown complete");

    result
}
