#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the risk map.
//!
//! Loads `data_final.json` once at startup and serves it through a small
//! REST API: the legend, the loaded records, the marker `GeoJSON`
//! (rendered per request, with optional alert and municipality filters),
//! and the dataset summary. The generated static page and its assets are
//! served from the output directory.

mod handlers;
pub mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};
use chrono::{DateTime, Utc};
use risk_map_generate::MapConfig;
use risk_map_loader::{Dataset, DatasetLoader, DatasetSource};

/// Shared application state.
pub struct AppState {
    /// Page and marker settings.
    pub config: MapConfig,
    /// Where the dataset was loaded from.
    pub source: DatasetSource,
    /// Loaded dataset. Empty if the startup load failed.
    pub dataset: Arc<Dataset>,
    /// When the dataset was loaded, if the load succeeded.
    pub loaded_at: Option<DateTime<Utc>>,
}

impl AppState {
    /// Loads the dataset at `source`.
    ///
    /// A load failure is logged and leaves the state with an empty
    /// dataset, so the server still starts and serves the legend.
    pub async fn load(config: MapConfig, source: DatasetSource) -> Self {
        let (dataset, loaded_at) = match DatasetLoader::new().load(&source).await {
            Ok(dataset) => (dataset, Some(Utc::now())),
            Err(e) => {
                log::error!("Failed to load dataset {source}: {e}; serving an empty dataset");
                (Dataset::default(), None)
            }
        };

        Self {
            config,
            source,
            dataset: Arc::new(dataset),
            loaded_at,
        }
    }
}

/// Registers the `/api` routes.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/legend", web::get().to(handlers::legend))
            .route("/dataset", web::get().to(handlers::dataset))
            .route("/markers", web::get().to(handlers::markers))
            .route("/summary", web::get().to(handlers::summary)),
    );
}

/// Starts the risk map API server.
///
/// Reads its configuration from the environment (`BIND_ADDR`, `PORT`,
/// `RISK_MAP_DATA`, `RISK_MAP_CONFIG`, `RISK_MAP_OUTPUT_DIR`), loads the
/// dataset, and starts the Actix-Web HTTP server. This is a regular async
/// function; the caller is responsible for providing the async runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the map config cannot be loaded,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let _ = pretty_env_logger::try_init_custom_env("RUST_LOG");

    let config_path = std::env::var("RISK_MAP_CONFIG").ok().map(PathBuf::from);
    let config = MapConfig::load(config_path.as_deref()).map_err(std::io::Error::other)?;

    let data = std::env::var("RISK_MAP_DATA").ok();
    let source = config.dataset_source(data.as_deref());

    let output_dir = std::env::var("RISK_MAP_OUTPUT_DIR")
        .map_or_else(|_| PathBuf::from("data/generated"), PathBuf::from);

    let state = web::Data::new(AppState::load(config, source).await);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!(
        "Starting server on {bind_addr}:{port} (static files from {})",
        output_dir.display()
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
            // Serve the generated page, markers, and summary
            .service(Files::new("/", output_dir.clone()).index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
