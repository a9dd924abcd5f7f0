#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for generating the risk map outputs from `data_final.json`.
//!
//! Produces the marker `GeoJSON` consumed by the static Leaflet page, the
//! page itself, a dataset summary, and a small metadata file describing
//! the run. Every output is written to a temporary file first and renamed
//! into place, so a reader never sees a half-written file.

pub mod config;
pub mod interactive;
pub mod page;

use std::error::Error;
use std::path::{Path, PathBuf};

use geojson::FeatureCollection;
use risk_map_loader::{Dataset, DatasetLoader, DatasetSource, DatasetSummary};
use risk_map_render::{GeoJsonSurface, RenderError, RenderReport, RiskMarkerRenderer};
use risk_map_risk_models::RiskRecord;
use serde::Serialize;

pub use config::{ConfigError, MapConfig};

/// Output name constant for the marker `GeoJSON` file.
pub const OUTPUT_MARKERS: &str = "markers";

/// Output name constant for the static map page.
pub const OUTPUT_PAGE: &str = "page";

/// Output name constant for the dataset summary JSON file.
pub const OUTPUT_SUMMARY: &str = "summary";

/// Output name constant for the generation metadata JSON file.
pub const OUTPUT_METADATA: &str = "metadata";

/// Every output, in generation order.
pub const ALL_OUTPUTS: &[&str] = &[OUTPUT_MARKERS, OUTPUT_PAGE, OUTPUT_SUMMARY, OUTPUT_METADATA];

/// File name of the marker `GeoJSON`, relative to the page.
pub const MARKERS_FILE_NAME: &str = "markers.geojson";

/// Returns the default output directory, `data/generated` under the
/// workspace root.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`, so output paths do
/// not depend on the caller's working directory.
///
/// # Panics
///
/// Panics if the project root cannot be resolved from `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn output_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Failed to find project root from CARGO_MANIFEST_DIR")
        .join("data/generated")
}

/// Returns the file path an output is written to.
#[must_use]
pub fn output_file_path(dir: &Path, output_name: &str) -> PathBuf {
    match output_name {
        OUTPUT_MARKERS => dir.join(MARKERS_FILE_NAME),
        OUTPUT_PAGE => dir.join("index.html"),
        other => dir.join(format!("{other}.json")),
    }
}

/// Shared arguments for all generate subcommands.
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Page and marker settings.
    pub config: MapConfig,
    /// Where to read the dataset from.
    pub source: DatasetSource,
}

/// Description of one generation run, written to `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    /// Dataset location the outputs were generated from.
    pub dataset: String,
    /// Elements rejected at load time.
    pub rejected_records: usize,
    /// Marker counts from the render pass.
    pub markers: RenderReport,
}

/// Renders `records` into a `GeoJSON` feature collection using the marker
/// style and number locale from `config`.
///
/// # Errors
///
/// Returns [`RenderError`] if a marker cannot be converted into a feature.
pub fn render_markers(
    config: &MapConfig,
    records: &[RiskRecord],
) -> Result<(FeatureCollection, RenderReport), RenderError> {
    let mut renderer = RiskMarkerRenderer::new(GeoJsonSurface::new())
        .with_style(config.marker)
        .with_locale(config.number_locale);
    let report = renderer.render(records)?;

    Ok((renderer.into_surface().into_feature_collection(), report))
}

/// Generates `requested_outputs` into `dir`.
///
/// The dataset is only loaded when an output other than the page is
/// requested. A load failure aborts the run before anything is written.
///
/// # Errors
///
/// Returns an error if the dataset cannot be loaded, rendering fails, or
/// an output cannot be written.
pub async fn run(
    args: &GenerateArgs,
    dir: &Path,
    requested_outputs: &[&str],
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;

    let needs_dataset = requested_outputs.iter().any(|&name| name != OUTPUT_PAGE);
    let dataset = if needs_dataset {
        match DatasetLoader::new().load(&args.source).await {
            Ok(dataset) => dataset,
            Err(e) => {
                log::error!("Failed to load dataset {}: {e}", args.source);
                return Err(e.into());
            }
        }
    } else {
        Dataset::default()
    };

    let mut report = None;

    for &name in requested_outputs {
        match name {
            OUTPUT_MARKERS => {
                report = Some(generate_markers(&args.config, &dataset, dir)?);
            }
            OUTPUT_PAGE => generate_page(&args.config, dir)?,
            OUTPUT_SUMMARY => generate_summary(&dataset, dir)?,
            OUTPUT_METADATA => {
                let report = match report.take() {
                    Some(report) => report,
                    None => render_markers(&args.config, &dataset.records)?.1,
                };
                generate_metadata(&args.source, &dataset, report, dir)?;
            }
            other => log::warn!("Unknown output '{other}', skipping"),
        }
    }

    Ok(())
}

/// Writes `contents` to `path` through a temporary sibling file.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)
}

fn generate_markers(
    config: &MapConfig,
    dataset: &Dataset,
    dir: &Path,
) -> Result<RenderReport, Box<dyn Error>> {
    log::info!("Rendering {} records to GeoJSON...", dataset.records.len());

    let (collection, report) = render_markers(config, &dataset.records)?;
    let path = output_file_path(dir, OUTPUT_MARKERS);
    write_atomic(&path, &serde_json::to_vec(&collection)?)?;

    log::info!(
        "Markers generated: {} ({} markers, {} without position, {} invalid)",
        path.display(),
        report.rendered,
        report.missing_position,
        report.invalid_position
    );
    Ok(report)
}

fn generate_page(config: &MapConfig, dir: &Path) -> Result<(), Box<dyn Error>> {
    let path = output_file_path(dir, OUTPUT_PAGE);
    write_atomic(&path, page::render_page(config, MARKERS_FILE_NAME).as_bytes())?;

    log::info!("Map page generated: {}", path.display());
    Ok(())
}

fn generate_summary(dataset: &Dataset, dir: &Path) -> Result<(), Box<dyn Error>> {
    let summary = DatasetSummary::from_records(&dataset.records);
    summary.log();

    let path = output_file_path(dir, OUTPUT_SUMMARY);
    write_atomic(&path, &serde_json::to_vec_pretty(&summary)?)?;

    log::info!("Summary generated: {}", path.display());
    Ok(())
}

fn generate_metadata(
    source: &DatasetSource,
    dataset: &Dataset,
    markers: RenderReport,
    dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let metadata = GenerationMetadata {
        generated_at: chrono::Utc::now().to_rfc3339(),
        dataset: source.to_string(),
        rejected_records: dataset.rejected.len(),
        markers,
    };

    let path = output_file_path(dir, OUTPUT_METADATA);
    write_atomic(&path, &serde_json::to_vec_pretty(&metadata)?)?;

    log::info!("Generation metadata written: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_map_risk_models::RED_ALERT_LABEL;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn write_dataset(dir: &Path, contents: &str) -> DatasetSource {
        std::fs::create_dir_all(dir).unwrap();
        let path = dir.join("data_final.json");
        std::fs::write(&path, contents).unwrap();
        DatasetSource::File(path)
    }

    #[test]
    fn output_paths() {
        let dir = Path::new("out");
        assert_eq!(
            output_file_path(dir, OUTPUT_MARKERS),
            dir.join("markers.geojson")
        );
        assert_eq!(output_file_path(dir, OUTPUT_PAGE), dir.join("index.html"));
        assert_eq!(
            output_file_path(dir, OUTPUT_METADATA),
            dir.join("metadata.json")
        );
        assert!(output_dir().ends_with("data/generated"));
    }

    #[test]
    fn render_markers_uses_config_style() {
        let mut config = MapConfig::default();
        config.marker.radius = 6.0;
        let record = RiskRecord {
            latitude: Some(6.2),
            longitude: Some(-75.5),
            alert: Some(RED_ALERT_LABEL.to_string()),
            ..RiskRecord::default()
        };

        let (collection, report) = render_markers(&config, &[record]).unwrap();

        assert_eq!(report.rendered, 1);
        let props = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(props["radius"], 6.0);
    }

    #[tokio::test]
    async fn generates_all_outputs() {
        let dir = temp_dir("risk_map_generate_all");
        let source = write_dataset(
            &dir,
            r#"[
                {"latitud": 6.2, "longitud": -75.5, "alerta": "🚨 Alerta Roja"},
                {"latitud": null, "longitud": null},
                {"latitud": "x", "longitud": -75.5}
            ]"#,
        );
        let args = GenerateArgs {
            config: MapConfig::default(),
            source,
        };

        run(&args, &dir, ALL_OUTPUTS).await.unwrap();

        let markers: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join("markers.geojson")).unwrap()).unwrap();
        assert_eq!(markers["type"], "FeatureCollection");
        assert_eq!(markers["features"].as_array().unwrap().len(), 1);

        let page = std::fs::read_to_string(dir.join("index.html")).unwrap();
        assert!(page.contains(MARKERS_FILE_NAME));

        let summary: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["total"], 2);
        assert_eq!(summary["withPosition"], 1);

        let metadata: serde_json::Value =
            serde_json::from_slice(&std::fs::read(dir.join("metadata.json")).unwrap()).unwrap();
        assert_eq!(metadata["rejectedRecords"], 1);
        assert_eq!(metadata["markers"]["rendered"], 1);
        assert_eq!(metadata["markers"]["missingPosition"], 1);

        assert!(!dir.join("markers.geojson.tmp").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn page_does_not_need_dataset() {
        let dir = temp_dir("risk_map_generate_page_only");
        let args = GenerateArgs {
            config: MapConfig::default(),
            source: DatasetSource::File(dir.join("does_not_exist.json")),
        };

        run(&args, &dir, &[OUTPUT_PAGE]).await.unwrap();

        assert!(dir.join("index.html").exists());
        assert!(!dir.join("markers.geojson").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn load_failure_writes_nothing() {
        let dir = temp_dir("risk_map_generate_load_failure");
        let args = GenerateArgs {
            config: MapConfig::default(),
            source: DatasetSource::File(dir.join("does_not_exist.json")),
        };

        assert!(run(&args, &dir, ALL_OUTPUTS).await.is_err());
        assert!(!dir.join("markers.geojson").exists());
        assert!(!dir.join("index.html").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
