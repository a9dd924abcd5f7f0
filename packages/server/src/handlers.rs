//! HTTP handler functions for the risk map API.

use actix_web::{HttpResponse, web};
use risk_map_generate::render_markers;
use risk_map_loader::DatasetSummary;
use risk_map_render::alert_color;
use risk_map_risk_models::RiskRecord;
use risk_map_server_models::{ApiError, ApiHealth, ApiLegendEntry, MarkerQueryParams};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        dataset: state.source.to_string(),
        records: state.dataset.records.len(),
        loaded_at: state.loaded_at,
    })
}

/// `GET /api/legend`
///
/// Returns the static risk legend, lowest risk first.
pub async fn legend() -> HttpResponse {
    let entries: Vec<ApiLegendEntry> = risk_map_risk_models::legend()
        .iter()
        .map(|entry| ApiLegendEntry::new(entry, alert_color(entry.alert)))
        .collect();

    HttpResponse::Ok().json(entries)
}

/// `GET /api/dataset`
///
/// Returns the loaded records in the `data_final.json` shape. Elements
/// rejected at load time are not included.
pub async fn dataset(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.dataset.records)
}

/// `GET /api/markers`
///
/// Renders the loaded dataset as a `GeoJSON` `FeatureCollection`,
/// optionally restricted to some alert levels or one municipality.
pub async fn markers(
    state: web::Data<AppState>,
    params: web::Query<MarkerQueryParams>,
) -> HttpResponse {
    let levels = params.alert_levels();
    let municipality = params
        .municipality
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_lowercase);

    let records: Vec<RiskRecord> = state
        .dataset
        .records
        .iter()
        .filter(|record| levels.is_empty() || levels.contains(&record.alert_level()))
        .filter(|record| {
            municipality.as_ref().is_none_or(|wanted| {
                record
                    .municipality
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase() == *wanted)
            })
        })
        .cloned()
        .collect();

    match render_markers(&state.config, &records) {
        Ok((collection, report)) => {
            log::debug!(
                "Rendered {} of {} markers",
                report.rendered,
                state.dataset.records.len()
            );
            HttpResponse::Ok().json(collection)
        }
        Err(e) => {
            log::error!("Failed to render markers: {e}");
            HttpResponse::InternalServerError().json(ApiError {
                error: "Failed to render markers".to_string(),
            })
        }
    }
}

/// `GET /api/summary`
///
/// Returns summary statistics of the loaded dataset.
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(DatasetSummary::from_records(&state.dataset.records))
}
