//! Dataset summary statistics.
//!
//! Gives a quick sanity check of a loaded dataset before it is published:
//! how many records can be placed on the map, how alerts and risk levels
//! are distributed, which fields are most often missing, and the average
//! rents across zones.

use std::collections::BTreeMap;

use risk_map_risk_models::{AlertLevel, RecordPosition, RiskRecord};
use serde::Serialize;

/// Label used for records without a risk level.
pub const NO_RISK_LEVEL: &str = "Sin datos";

/// Mean rent averages over the records that report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentMeans {
    /// Mean apartment rent.
    pub apartment: Option<f64>,
    /// Mean house rent.
    pub house: Option<f64>,
    /// Mean commercial premises rent.
    pub commercial: Option<f64>,
}

/// Summary statistics of a loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Number of records.
    pub total: usize,
    /// Records with both coordinates.
    pub with_position: usize,
    /// Records with neither coordinate.
    pub without_position: usize,
    /// Records with exactly one coordinate.
    pub partial_position: usize,
    /// Record count per alert level.
    pub alerts: BTreeMap<AlertLevel, usize>,
    /// Record count per risk level label.
    pub risk_levels: BTreeMap<String, usize>,
    /// Missing value count per dataset field, keyed by JSON field name.
    pub missing_fields: BTreeMap<&'static str, usize>,
    /// Mean rent averages.
    pub rent_means: RentMeans,
}

impl DatasetSummary {
    /// Computes the summary of `records`.
    #[must_use]
    pub fn from_records(records: &[RiskRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.position() {
                RecordPosition::Complete { .. } => summary.with_position += 1,
                RecordPosition::Partial => summary.partial_position += 1,
                RecordPosition::Missing => summary.without_position += 1,
            }

            *summary.alerts.entry(record.alert_level()).or_default() += 1;

            let level = record.risk_level.as_deref().unwrap_or(NO_RISK_LEVEL);
            *summary.risk_levels.entry(level.to_string()).or_default() += 1;

            for (field, present) in field_presence(record) {
                let missing = summary.missing_fields.entry(field).or_default();
                if !present {
                    *missing += 1;
                }
            }
        }

        summary.rent_means = RentMeans {
            apartment: mean(records.iter().filter_map(|r| r.rent_apartment)),
            house: mean(records.iter().filter_map(|r| r.rent_house)),
            commercial: mean(records.iter().filter_map(|r| r.rent_commercial)),
        };

        summary
    }

    /// Returns the fields sorted by descending missing count, then name.
    #[must_use]
    pub fn most_missing(&self) -> Vec<(&'static str, usize)> {
        let mut fields: Vec<(&'static str, usize)> = self
            .missing_fields
            .iter()
            .map(|(&field, &count)| (field, count))
            .collect();
        fields.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        fields
    }

    /// Writes the summary to the log at `info` level.
    pub fn log(&self) {
        log::info!(
            "{} records: {} with position, {} without, {} partial",
            self.total,
            self.with_position,
            self.without_position,
            self.partial_position
        );
        for (level, count) in &self.alerts {
            log::info!("  alert {level}: {count}");
        }
        for (level, count) in &self.risk_levels {
            log::info!("  risk level {level}: {count}");
        }
        for (field, count) in self.most_missing().into_iter().filter(|(_, c)| *c > 0) {
            log::info!("  missing {field}: {count}");
        }
        log::info!(
            "  mean rent: apartment {:?}, house {:?}, commercial {:?}",
            self.rent_means.apartment,
            self.rent_means.house,
            self.rent_means.commercial
        );
    }
}

fn field_presence(record: &RiskRecord) -> [(&'static str, bool); 11] {
    [
        ("latitud", record.latitude.is_some()),
        ("longitud", record.longitude.is_some()),
        ("sector_norm", record.sector.is_some()),
        ("municipio_norm", record.municipality.is_some()),
        ("alerta", record.alert.is_some()),
        ("nivel_riesgo", record.risk_level.is_some()),
        ("promedio_mes", record.monthly_average.is_some()),
        ("tipo_delito", record.top_offense.is_some()),
        (
            "promedio_arriendo_apartamento",
            record.rent_apartment.is_some(),
        ),
        ("promedio_arriendo_casa", record.rent_house.is_some()),
        ("promedio_arriendo_local", record.rent_commercial.is_some()),
    ]
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
