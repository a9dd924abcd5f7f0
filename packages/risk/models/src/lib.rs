#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk record, alert level, and legend tier definitions.
//!
//! This crate defines the shape of one element of the precomputed
//! `data_final.json` dataset and the closed classifications derived from
//! it. The JSON keys are the Spanish column names produced by the data
//! pipeline; the Rust field names are English and mapped with `serde`
//! renames.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Alert label written by the pipeline for the most severe zones.
pub const RED_ALERT_LABEL: &str = "🚨 Alerta Roja";

/// Alert label written by the pipeline for medium-risk zones.
pub const ORANGE_ALERT_LABEL: &str = "🟠 Alerta Media";

/// Alert label written by the pipeline for low-risk zones.
pub const SAFE_LABEL: &str = "🟢 Segura";

/// Alert classification of a record.
///
/// Classification is an exact string match on the `alerta` field. Records
/// whose label is missing or not one of the known labels are
/// [`AlertLevel::Unknown`], which is kept distinct from
/// [`AlertLevel::Safe`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    /// `🚨 Alerta Roja`
    RedAlert,
    /// `🟠 Alerta Media`
    OrangeAlert,
    /// `🟢 Segura`
    Safe,
    /// Missing or unrecognized alert label.
    Unknown,
}

impl AlertLevel {
    /// Classifies a raw `alerta` value.
    #[must_use]
    pub fn classify(label: Option<&str>) -> Self {
        match label {
            Some(RED_ALERT_LABEL) => Self::RedAlert,
            Some(ORANGE_ALERT_LABEL) => Self::OrangeAlert,
            Some(SAFE_LABEL) => Self::Safe,
            _ => Self::Unknown,
        }
    }

    /// Returns the dataset label for this level, or `None` for
    /// [`AlertLevel::Unknown`].
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::RedAlert => Some(RED_ALERT_LABEL),
            Self::OrangeAlert => Some(ORANGE_ALERT_LABEL),
            Self::Safe => Some(SAFE_LABEL),
            Self::Unknown => None,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::RedAlert, Self::OrangeAlert, Self::Safe, Self::Unknown]
    }
}

/// Named risk band shown in the map legend.
///
/// The bands are a static reference table. They are never validated
/// against the values of a loaded dataset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    /// Lowest risk band (0.00–0.20)
    Diamond,
    /// 0.21–0.40
    Gold,
    /// 0.41–0.60
    Silver,
    /// 0.61–0.80
    Bronze,
    /// Highest risk band (0.81–1.00)
    Copper,
}

impl RiskTier {
    /// Returns the display label used by the dataset and legend.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diamond => "💎 Diamante",
            Self::Gold => "🥇 Oro",
            Self::Silver => "🥈 Plata",
            Self::Bronze => "🥉 Bronce",
            Self::Copper => "🧱 Cobre",
        }
    }

    /// Returns the inclusive risk index range `(min, max)` of this band.
    #[must_use]
    pub const fn range(self) -> (f64, f64) {
        match self {
            Self::Diamond => (0.00, 0.20),
            Self::Gold => (0.21, 0.40),
            Self::Silver => (0.41, 0.60),
            Self::Bronze => (0.61, 0.80),
            Self::Copper => (0.81, 1.00),
        }
    }

    /// Returns the alert level the pipeline assigns to this band.
    #[must_use]
    pub const fn alert(self) -> AlertLevel {
        match self {
            Self::Diamond | Self::Gold => AlertLevel::Safe,
            Self::Silver => AlertLevel::OrangeAlert,
            Self::Bronze | Self::Copper => AlertLevel::RedAlert,
        }
    }

    /// Looks up a tier by its exact display label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tier| tier.label() == label)
    }

    /// Returns all variants of this enum, lowest risk first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Diamond,
            Self::Gold,
            Self::Silver,
            Self::Bronze,
            Self::Copper,
        ]
    }
}

/// One row of the static map legend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// The band this row describes.
    pub tier: RiskTier,
    /// Display label of the band (e.g. `"🥈 Plata"`).
    pub label: &'static str,
    /// Lower bound of the band's risk index range.
    pub min: f64,
    /// Upper bound of the band's risk index range.
    pub max: f64,
    /// Alert category of the band.
    pub alert: AlertLevel,
    /// Display label of the alert category.
    pub alert_label: &'static str,
}

impl LegendEntry {
    /// Formats the range as shown in the legend table (`"0.41–0.60"`).
    #[must_use]
    pub fn range_label(&self) -> String {
        format!("{:.2}–{:.2}", self.min, self.max)
    }
}

/// Returns the five legend rows, lowest risk first.
#[must_use]
pub fn legend() -> Vec<LegendEntry> {
    RiskTier::all()
        .iter()
        .map(|&tier| {
            let (min, max) = tier.range();
            let alert = tier.alert();
            LegendEntry {
                tier,
                label: tier.label(),
                min,
                max,
                alert,
                alert_label: alert.label().unwrap_or_default(),
            }
        })
        .collect()
}

/// Presence state of a record's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordPosition {
    /// Neither latitude nor longitude is present.
    Missing,
    /// Only one of the two coordinates is present.
    Partial,
    /// Both coordinates are present.
    Complete {
        /// Latitude in degrees.
        latitude: f64,
        /// Longitude in degrees.
        longitude: f64,
    },
}

/// One element of the precomputed risk dataset.
///
/// Every field is optional; missing or extra keys are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    /// Marker latitude.
    #[serde(rename = "latitud", default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    /// Marker longitude.
    #[serde(rename = "longitud", default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    /// Normalized sector name.
    #[serde(rename = "sector_norm", default, deserialize_with = "non_blank")]
    pub sector: Option<String>,
    /// Normalized municipality name.
    #[serde(rename = "municipio_norm", default, deserialize_with = "non_blank")]
    pub municipality: Option<String>,
    /// Raw alert label.
    #[serde(rename = "alerta", default, deserialize_with = "non_blank")]
    pub alert: Option<String>,
    /// Free-form risk level label (usually a [`RiskTier`] label).
    #[serde(rename = "nivel_riesgo", default, deserialize_with = "non_blank")]
    pub risk_level: Option<String>,
    /// Average number of cases per month.
    #[serde(rename = "promedio_mes", default, deserialize_with = "lenient_f64")]
    pub monthly_average: Option<f64>,
    /// Most common offense type.
    #[serde(rename = "tipo_delito", default, deserialize_with = "non_blank")]
    pub top_offense: Option<String>,
    /// Average apartment rent.
    #[serde(
        rename = "promedio_arriendo_apartamento",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub rent_apartment: Option<f64>,
    /// Average house rent.
    #[serde(
        rename = "promedio_arriendo_casa",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub rent_house: Option<f64>,
    /// Average commercial premises rent.
    #[serde(
        rename = "promedio_arriendo_local",
        default,
        deserialize_with = "lenient_f64"
    )]
    pub rent_commercial: Option<f64>,
}

impl RiskRecord {
    /// Converts one raw dataset element into a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not a JSON object or if a
    /// numeric field holds a value that is not a number, a numeric
    /// string, or `null`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        if !value.is_object() {
            return Err(serde_json::Error::custom("expected a JSON object"));
        }
        serde_json::from_value(value)
    }

    /// Returns the presence state of this record's coordinates.
    #[must_use]
    pub const fn position(&self) -> RecordPosition {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => RecordPosition::Complete {
                latitude,
                longitude,
            },
            (None, None) => RecordPosition::Missing,
            _ => RecordPosition::Partial,
        }
    }

    /// Classifies this record's alert label.
    #[must_use]
    pub fn alert_level(&self) -> AlertLevel {
        AlertLevel::classify(self.alert.as_deref())
    }

    /// Returns the legend tier named by `risk_level`, if it matches one.
    #[must_use]
    pub fn risk_tier(&self) -> Option<RiskTier> {
        self.risk_level.as_deref().and_then(RiskTier::from_label)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts a JSON number, a numeric string, or `null`. Blank strings are
/// treated as absent; text that is not a finite number (including `NaN`
/// and `inf`) is an error.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(v)) => Ok(Some(v).filter(|v| v.is_finite())),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(D::Error::custom(format!(
                    "expected a finite number, found \"{s}\""
                ))),
            }
        }
    }
}

fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_alert_labels() {
        assert_eq!(
            AlertLevel::classify(Some("🚨 Alerta Roja")),
            AlertLevel::RedAlert
        );
        assert_eq!(
            AlertLevel::classify(Some("🟠 Alerta Media")),
            AlertLevel::OrangeAlert
        );
        assert_eq!(AlertLevel::classify(Some("🟢 Segura")), AlertLevel::Safe);
    }

    #[test]
    fn unknown_and_missing_alerts_are_not_safe() {
        assert_eq!(AlertLevel::classify(None), AlertLevel::Unknown);
        assert_eq!(AlertLevel::classify(Some("Sin datos")), AlertLevel::Unknown);
        assert_eq!(
            AlertLevel::classify(Some("alerta roja")),
            AlertLevel::Unknown
        );
    }

    #[test]
    fn alert_label_roundtrip() {
        for level in AlertLevel::all() {
            assert_eq!(AlertLevel::classify(level.label()), *level);
        }
    }

    #[test]
    fn legend_has_five_ordered_non_overlapping_tiers() {
        let rows = legend();
        assert_eq!(rows.len(), 5);
        for pair in rows.windows(2) {
            assert!(
                pair[0].max < pair[1].min,
                "{:?} overlaps {:?}",
                pair[0].tier,
                pair[1].tier
            );
        }
        assert_eq!(rows[0].range_label(), "0.00–0.20");
        assert_eq!(rows[4].alert_label, RED_ALERT_LABEL);
        assert_eq!(rows[2].alert, AlertLevel::OrangeAlert);
    }

    #[test]
    fn tier_from_label() {
        assert_eq!(RiskTier::from_label("🥉 Bronce"), Some(RiskTier::Bronze));
        assert_eq!(RiskTier::from_label("Bronce"), None);
    }

    #[test]
    fn deserializes_full_record() {
        let record = RiskRecord::from_value(json!({
            "latitud": 6.2,
            "longitud": -75.5,
            "sector_norm": "EL POBLADO",
            "municipio_norm": "MEDELLIN",
            "alerta": "🚨 Alerta Roja",
            "nivel_riesgo": "🧱 Cobre",
            "promedio_mes": 12.345,
            "tipo_delito": "HURTO",
            "promedio_arriendo_apartamento": 2_500_000,
            "promedio_arriendo_casa": null,
            "promedio_arriendo_local": "4100000.5",
            "zona_clave": "ANTIOQUIA|MEDELLIN"
        }))
        .unwrap();

        assert_eq!(
            record.position(),
            RecordPosition::Complete {
                latitude: 6.2,
                longitude: -75.5
            }
        );
        assert_eq!(record.sector.as_deref(), Some("EL POBLADO"));
        assert_eq!(record.alert_level(), AlertLevel::RedAlert);
        assert_eq!(record.risk_tier(), Some(RiskTier::Copper));
        assert_eq!(record.rent_apartment, Some(2_500_000.0));
        assert_eq!(record.rent_house, None);
        assert_eq!(record.rent_commercial, Some(4_100_000.5));
    }

    #[test]
    fn empty_object_is_a_valid_record() {
        let record = RiskRecord::from_value(json!({})).unwrap();
        assert_eq!(record, RiskRecord::default());
        assert_eq!(record.position(), RecordPosition::Missing);
        assert_eq!(record.alert_level(), AlertLevel::Unknown);
    }

    #[test]
    fn blank_values_are_absent() {
        let record = RiskRecord::from_value(json!({
            "latitud": "",
            "sector_norm": "   ",
            "promedio_mes": " "
        }))
        .unwrap();
        assert_eq!(record.latitude, None);
        assert_eq!(record.sector, None);
        assert_eq!(record.monthly_average, None);
    }

    #[test]
    fn partial_position_is_reported() {
        let record = RiskRecord::from_value(json!({ "longitud": -75.5 })).unwrap();
        assert_eq!(record.position(), RecordPosition::Partial);
    }

    #[test]
    fn rejects_non_numeric_coordinates() {
        assert!(RiskRecord::from_value(json!({ "latitud": "norte" })).is_err());
        assert!(RiskRecord::from_value(json!({ "longitud": true })).is_err());
        assert!(RiskRecord::from_value(json!([6.2, -75.5])).is_err());
        assert!(RiskRecord::from_value(json!("fila")).is_err());
    }

    #[test]
    fn rejects_non_finite_numeric_text() {
        for text in ["NaN", "inf", "-infinity", " Infinity "] {
            assert!(
                RiskRecord::from_value(json!({ "latitud": text })).is_err(),
                "{text} should be rejected"
            );
            assert!(RiskRecord::from_value(json!({ "promedio_mes": text })).is_err());
        }
    }
}
