#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the risk map.
//!
//! Serves the marker `GeoJSON`, legend, and dataset summary, plus the
//! generated static Leaflet page.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    risk_map_server::run_server().await
}
