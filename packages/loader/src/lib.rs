#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Risk dataset loading.
//!
//! Fetches `data_final.json` from disk or over HTTP, converts each array
//! element into a [`RiskRecord`], and hands the records to a
//! [`RiskMarkerRenderer`]. A failed fetch renders nothing; a malformed
//! element is skipped and reported, never failing the whole dataset.

pub mod summary;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use risk_map_render::{MapSurface, RenderReport, RiskMarkerRenderer};
use risk_map_risk_models::RiskRecord;
use serde::Serialize;

pub use summary::DatasetSummary;

/// Location of the dataset when nothing else is configured.
pub const DEFAULT_DATASET_PATH: &str = "data/data_final.json";

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Dataset request to {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level JSON value is not an array.
    #[error("Dataset must be a JSON array, found {found}")]
    NotAnArray {
        /// Kind of JSON value found instead.
        found: &'static str,
    },
}

/// Where to read the dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Local JSON file.
    File(PathBuf),
    /// HTTP(S) URL returning the JSON array.
    Url(String),
}

impl Default for DatasetSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_DATASET_PATH))
    }
}

impl DatasetSource {
    /// Interprets a location string: `http://` and `https://` prefixes
    /// select [`DatasetSource::Url`], anything else is a file path.
    #[must_use]
    pub fn from_location(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl FromStr for DatasetSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_location(s))
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// A dataset element that could not be converted into a [`RiskRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedRecord {
    /// Position of the element in the JSON array.
    pub index: usize,
    /// Why the element was rejected.
    pub reason: String,
}

/// Records parsed from one dataset load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Successfully parsed records, in input order.
    pub records: Vec<RiskRecord>,
    /// Elements skipped because they were malformed.
    pub rejected: Vec<RejectedRecord>,
}

impl Dataset {
    /// Parses a dataset body.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if the body is not valid JSON and
    /// [`LoadError::NotAnArray`] if its top level is not an array.
    pub fn parse(body: &str) -> Result<Self, LoadError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        let items = match value {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(LoadError::NotAnArray {
                    found: json_kind(&other),
                });
            }
        };

        let mut dataset = Self {
            records: Vec::with_capacity(items.len()),
            rejected: Vec::new(),
        };

        for (index, item) in items.into_iter().enumerate() {
            match RiskRecord::from_value(item) {
                Ok(record) => dataset.records.push(record),
                Err(e) => {
                    log::warn!("Skipping malformed record {index}: {e}");
                    dataset.rejected.push(RejectedRecord {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(dataset)
    }
}

const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Fetches and parses risk datasets.
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    client: reqwest::Client,
}

impl DatasetLoader {
    /// Creates a loader with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a loader that issues HTTP requests with `client`.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Loads a dataset from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be read, the request
    /// fails or returns a non-success status, or the body is not a JSON
    /// array.
    pub async fn load(&self, source: &DatasetSource) -> Result<Dataset, LoadError> {
        log::info!("Loading dataset from {source}...");

        let body = match source {
            DatasetSource::File(path) => tokio::fs::read_to_string(path).await?,
            DatasetSource::Url(url) => {
                let resp = self.client.get(url).send().await?;
                if !resp.status().is_success() {
                    return Err(LoadError::Status {
                        url: url.clone(),
                        status: resp.status().as_u16(),
                    });
                }
                resp.text().await?
            }
        };

        let dataset = Dataset::parse(&body)?;
        log::info!(
            "Loaded {} records from {source} ({} rejected)",
            dataset.records.len(),
            dataset.rejected.len()
        );

        Ok(dataset)
    }
}

/// Result of [`load_and_render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The dataset loaded and every record was processed.
    Rendered {
        /// Render counts.
        report: RenderReport,
        /// Number of malformed elements skipped at load time.
        rejected: usize,
    },
    /// The dataset could not be loaded; nothing was rendered.
    LoadFailed,
    /// The surface failed part-way through the render.
    RenderFailed,
}

/// Loads the dataset at `source` and renders it with `renderer`.
///
/// Rendering only starts after the load succeeds. Failures are logged
/// and never retried.
pub async fn load_and_render<S: MapSurface>(
    loader: &DatasetLoader,
    source: &DatasetSource,
    renderer: &mut RiskMarkerRenderer<S>,
) -> RenderOutcome {
    let dataset = match loader.load(source).await {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("Failed to load dataset {source}: {e}");
            return RenderOutcome::LoadFailed;
        }
    };

    match renderer.render(&dataset.records) {
        Ok(report) => RenderOutcome::Rendered {
            report,
            rejected: dataset.rejected.len(),
        },
        Err(e) => {
            log::error!("Failed to render dataset {source}: {e}");
            RenderOutcome::RenderFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_map_render::{RED_ALERT_COLOR, RecordingSurface};

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_source_strings() {
        assert_eq!(
            "https://example.org/data_final.json".parse::<DatasetSource>().unwrap(),
            DatasetSource::Url("https://example.org/data_final.json".to_string())
        );
        assert_eq!(
            "web/data_final.json".parse::<DatasetSource>().unwrap(),
            DatasetSource::File(PathBuf::from("web/data_final.json"))
        );
        assert_eq!(
            DatasetSource::default().to_string(),
            DEFAULT_DATASET_PATH
        );
    }

    #[test]
    fn malformed_elements_are_rejected_individually() {
        let dataset = Dataset::parse(
            r#"[
                {"latitud": 6.2, "longitud": -75.5},
                {"latitud": "norte", "longitud": -75.5},
                42,
                {}
            ]"#,
        )
        .unwrap();

        assert_eq!(dataset.records.len(), 2);
        let indices: Vec<usize> = dataset.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn non_finite_numeric_text_is_rejected() {
        let dataset = Dataset::parse(
            r#"[
                {"latitud": "NaN", "longitud": "NaN"},
                {"latitud": 6.2, "longitud": -75.5, "promedio_mes": "inf"},
                {"latitud": "abc", "longitud": 1},
                {"latitud": "6.2", "longitud": "-75.5"}
            ]"#,
        )
        .unwrap();

        let indices: Vec<usize> = dataset.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].latitude, Some(6.2));
    }

    #[test]
    fn non_array_top_level_is_an_error() {
        let err = Dataset::parse(r#"{"records": []}"#).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray { found: "an object" }));
        assert!(matches!(
            Dataset::parse("not json").unwrap_err(),
            LoadError::Json(_)
        ));
    }

    #[tokio::test]
    async fn loads_and_renders_file() {
        let path = write_temp(
            "risk_map_loader_test_ok.json",
            r#"[{"latitud": 6.2, "longitud": -75.5, "alerta": "🚨 Alerta Roja"}, {}]"#,
        );

        let mut renderer = RiskMarkerRenderer::new(RecordingSurface::new());
        let outcome = load_and_render(
            &DatasetLoader::new(),
            &DatasetSource::File(path.clone()),
            &mut renderer,
        )
        .await;

        let RenderOutcome::Rendered { report, rejected } = outcome else {
            panic!("expected a rendered outcome, got {outcome:?}");
        };
        assert_eq!(report.rendered, 1);
        assert_eq!(report.missing_position, 1);
        assert_eq!(rejected, 0);

        let surface = renderer.into_surface();
        assert_eq!(surface.markers()[0].style.color, RED_ALERT_COLOR);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn missing_file_renders_nothing() {
        let path = std::env::temp_dir().join("risk_map_loader_test_missing.json");
        let _ = std::fs::remove_file(&path);

        let mut renderer = RiskMarkerRenderer::new(RecordingSurface::new());
        let outcome =
            load_and_render(&DatasetLoader::new(), &DatasetSource::File(path), &mut renderer)
                .await;

        assert_eq!(outcome, RenderOutcome::LoadFailed);
        assert!(renderer.surface().is_empty());
    }

    /// Returns a localhost URL on a port that nothing listens on.
    async fn unbound_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/data_final.json")
    }

    #[tokio::test]
    async fn unreachable_url_renders_nothing() {
        let source = DatasetSource::Url(unbound_url().await);

        assert!(matches!(
            DatasetLoader::new().load(&source).await,
            Err(LoadError::Http(_))
        ));

        let mut renderer = RiskMarkerRenderer::new(RecordingSurface::new());
        let outcome = load_and_render(&DatasetLoader::new(), &source, &mut renderer).await;

        assert_eq!(outcome, RenderOutcome::LoadFailed);
        assert!(renderer.surface().is_empty());
    }

    #[tokio::test]
    async fn error_status_renders_nothing() {
        use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0_u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    )
                    .await;
                let _ = stream.shutdown().await;
            }
        });

        let source = DatasetSource::Url(format!("http://{addr}/data_final.json"));

        let err = DatasetLoader::new().load(&source).await.unwrap_err();
        assert!(
            matches!(err, LoadError::Status { status: 404, .. }),
            "unexpected error: {err}"
        );

        let mut renderer = RiskMarkerRenderer::new(RecordingSurface::new());
        let outcome = load_and_render(&DatasetLoader::new(), &source, &mut renderer).await;

        assert_eq!(outcome, RenderOutcome::LoadFailed);
        assert!(renderer.surface().is_empty());
    }

    #[tokio::test]
    async fn unparseable_file_renders_nothing() {
        let path = write_temp("risk_map_loader_test_bad.json", "{ not json");

        let mut renderer = RiskMarkerRenderer::new(RecordingSurface::new());
        let outcome = load_and_render(
            &DatasetLoader::new(),
            &DatasetSource::File(path.clone()),
            &mut renderer,
        )
        .await;

        assert_eq!(outcome, RenderOutcome::LoadFailed);
        assert!(renderer.surface().is_empty());

        let _ = std::fs::remove_file(&path);
    }
}
