#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the risk map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the dataset record types to allow independent evolution of the API
//! contract.

use chrono::{DateTime, Utc};
use risk_map_risk_models::{AlertLevel, LegendEntry, RiskTier};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
    /// Dataset location the server was started with.
    pub dataset: String,
    /// Number of records currently loaded.
    pub records: usize,
    /// When the dataset was loaded, if the load succeeded.
    pub loaded_at: Option<DateTime<Utc>>,
}

/// One row of the risk legend as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLegendEntry {
    /// Risk band.
    pub tier: RiskTier,
    /// Display label of the band.
    pub label: String,
    /// Formatted risk index range (e.g. `"0.41–0.60"`).
    pub range: String,
    /// Lower bound of the range.
    pub min: f64,
    /// Upper bound of the range.
    pub max: f64,
    /// Alert category of the band.
    pub alert: AlertLevel,
    /// Display label of the alert category.
    pub alert_label: String,
    /// Marker fill color for the alert category.
    pub color: String,
}

impl ApiLegendEntry {
    /// Builds the API row for `entry`, drawn with `color`.
    #[must_use]
    pub fn new(entry: &LegendEntry, color: &str) -> Self {
        Self {
            tier: entry.tier,
            label: entry.label.to_string(),
            range: entry.range_label(),
            min: entry.min,
            max: entry.max,
            alert: entry.alert,
            alert_label: entry.alert_label.to_string(),
            color: color.to_string(),
        }
    }
}

/// Query parameters for `GET /api/markers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerQueryParams {
    /// Comma-separated alert levels to include (e.g. `RED_ALERT,UNKNOWN`).
    pub alerts: Option<String>,
    /// Only include records from this municipality (case-insensitive).
    pub municipality: Option<String>,
}

impl MarkerQueryParams {
    /// Parses the `alerts` filter. Unrecognized names are ignored; an
    /// absent or empty filter yields an empty list, meaning "all levels".
    #[must_use]
    pub fn alert_levels(&self) -> Vec<AlertLevel> {
        self.alerts
            .as_deref()
            .map(|s| s.split(',').filter_map(|a| a.trim().parse().ok()).collect())
            .unwrap_or_default()
    }
}

/// Error body returned by failing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
}
