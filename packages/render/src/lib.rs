#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk marker rendering.
//!
//! [`RiskMarkerRenderer`] walks a loaded dataset in input order and emits
//! one circle marker with a popup per record that has a usable position.
//! Where the markers end up is decided by the [`MapSurface`] injected at
//! construction: an in-memory [`RecordingSurface`] or a `GeoJSON`
//! [`GeoJsonSurface`] for the static page and the API.

pub mod format;
pub mod geojson_surface;
pub mod popup;
pub mod surface;

use std::collections::BTreeMap;

use risk_map_risk_models::{AlertLevel, RecordPosition, RiskRecord};
use serde::{Deserialize, Serialize};

pub use format::NumberLocale;
pub use geojson_surface::GeoJsonSurface;
pub use popup::{HtmlPopupTemplate, PlainTextPopupTemplate, PopupTemplate, PopupView};
pub use surface::{MapSurface, Popup, RecordedMarker, RecordingSurface};

/// Fill color for [`AlertLevel::RedAlert`] markers.
pub const RED_ALERT_COLOR: &str = "#d73027";

/// Fill color for [`AlertLevel::OrangeAlert`] markers.
pub const ORANGE_ALERT_COLOR: &str = "#fc8d59";

/// Fill color for [`AlertLevel::Safe`] and [`AlertLevel::Unknown`] markers.
pub const SAFE_COLOR: &str = "#1a9850";

/// Outline dash pattern that marks records with a missing or
/// unrecognized alert label.
pub const UNKNOWN_DASH_ARRAY: &str = "4 4";

/// Errors raised by a [`MapSurface`].
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Marker properties could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The surface refused the marker.
    #[error("Marker rejected: {message}")]
    Rejected {
        /// Description of what went wrong.
        message: String,
    },
}

/// Errors that abort a render pass.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The surface failed while adding the marker of record `index`.
    #[error("Surface error at record {index}: {source}")]
    Surface {
        /// Position of the record in the input sequence.
        index: usize,
        /// The underlying surface failure.
        #[source]
        source: SurfaceError,
    },
}

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate without validating it.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both values are finite and within the WGS84
    /// latitude/longitude bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Fixed visual parameters shared by every marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyleConfig {
    /// Circle radius in pixels.
    pub radius: f64,
    /// Outline stroke weight in pixels.
    pub weight: f64,
    /// Fill opacity between 0 and 1.
    pub fill_opacity: f64,
}

impl Default for MarkerStyleConfig {
    fn default() -> Self {
        Self {
            radius: 10.0,
            weight: 2.0,
            fill_opacity: 0.8,
        }
    }
}

/// Resolved style of one marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Stroke and fill color.
    pub color: &'static str,
    /// Circle radius in pixels.
    pub radius: f64,
    /// Outline stroke weight in pixels.
    pub weight: f64,
    /// Fill opacity between 0 and 1.
    pub fill_opacity: f64,
    /// Outline dash pattern, if any.
    pub dash_array: Option<&'static str>,
}

impl MarkerStyle {
    /// Resolves the style for a marker of the given alert level.
    #[must_use]
    pub const fn for_alert(level: AlertLevel, config: &MarkerStyleConfig) -> Self {
        Self {
            color: alert_color(level),
            radius: config.radius,
            weight: config.weight,
            fill_opacity: config.fill_opacity,
            dash_array: match level {
                AlertLevel::Unknown => Some(UNKNOWN_DASH_ARRAY),
                AlertLevel::RedAlert | AlertLevel::OrangeAlert | AlertLevel::Safe => None,
            },
        }
    }
}

/// Maps an alert level to its marker color.
#[must_use]
pub const fn alert_color(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::RedAlert => RED_ALERT_COLOR,
        AlertLevel::OrangeAlert => ORANGE_ALERT_COLOR,
        AlertLevel::Safe | AlertLevel::Unknown => SAFE_COLOR,
    }
}

/// Counts collected during one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    /// Number of records examined.
    pub total: usize,
    /// Number of markers added to the surface.
    pub rendered: usize,
    /// Records skipped because neither coordinate is present.
    pub missing_position: usize,
    /// Records skipped because only one coordinate is present or a
    /// coordinate is out of range.
    pub invalid_position: usize,
    /// Rendered markers per alert level.
    pub by_alert: BTreeMap<AlertLevel, usize>,
}

/// Emits one marker per record with a usable position onto a
/// [`MapSurface`].
///
/// Markers are only ever added; the renderer never reads back or removes
/// what it has written.
pub struct RiskMarkerRenderer<S: MapSurface> {
    surface: S,
    style: MarkerStyleConfig,
    locale: NumberLocale,
}

impl<S: MapSurface> RiskMarkerRenderer<S> {
    /// Creates a renderer drawing onto `surface` with the default marker
    /// style and number locale.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            style: MarkerStyleConfig::default(),
            locale: NumberLocale::default(),
        }
    }

    /// Overrides the fixed marker parameters.
    #[must_use]
    pub fn with_style(mut self, style: MarkerStyleConfig) -> Self {
        self.style = style;
        self
    }

    /// Overrides the separators used for rent values.
    #[must_use]
    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Returns the surface markers are drawn onto.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Consumes the renderer, returning its surface.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Renders every record in input order.
    ///
    /// Records without coordinates are skipped silently; records with a
    /// partial or out-of-range position are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] if the surface fails to accept a
    /// marker. Markers added before the failure stay on the surface.
    pub fn render(&mut self, records: &[RiskRecord]) -> Result<RenderReport, RenderError> {
        let mut report = RenderReport {
            total: records.len(),
            ..RenderReport::default()
        };

        for (index, record) in records.iter().enumerate() {
            let position = match record.position() {
                RecordPosition::Missing => {
                    report.missing_position += 1;
                    continue;
                }
                RecordPosition::Partial => {
                    log::warn!("Skipping record {index}: only one coordinate present");
                    report.invalid_position += 1;
                    continue;
                }
                RecordPosition::Complete {
                    latitude,
                    longitude,
                } => LatLng::new(latitude, longitude),
            };

            if !position.is_valid() {
                log::warn!(
                    "Skipping record {index}: coordinate ({}, {}) out of range",
                    position.lat,
                    position.lng
                );
                report.invalid_position += 1;
                continue;
            }

            let level = record.alert_level();
            self.emit(index, record, position, level)?;

            report.rendered += 1;
            *report.by_alert.entry(level).or_default() += 1;
        }

        log::info!(
            "Rendered {} of {} records ({} without position, {} invalid)",
            report.rendered,
            report.total,
            report.missing_position,
            report.invalid_position
        );

        Ok(report)
    }

    fn emit(
        &mut self,
        index: usize,
        record: &RiskRecord,
        position: LatLng,
        level: AlertLevel,
    ) -> Result<(), RenderError> {
        let style = MarkerStyle::for_alert(level, &self.style);
        let mut marker = self.surface.create_point_marker(position, &style);

        let popup = Popup::new(level, PopupView::from_record(record, self.locale));
        self.surface.attach_popup(&mut marker, popup);

        self.surface
            .add_marker(marker)
            .map_err(|source| RenderError::Surface { index, source })?;

        log::debug!(
            "Added {level} marker for record {index} at ({}, {})",
            position.lat,
            position.lng
        );

        Ok(())
    }
}
