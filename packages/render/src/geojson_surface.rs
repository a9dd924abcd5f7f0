//! `GeoJSON` surface.
//!
//! Collects markers as point features whose properties carry everything
//! the static page needs to draw them: the circle style, the alert level,
//! the structured popup fields, and the rendered popup markup.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

use crate::popup::{HtmlPopupTemplate, PopupTemplate};
use crate::surface::{MapSurface, Popup};
use crate::{LatLng, MarkerStyle, SurfaceError};

/// Marker handle used by [`GeoJsonSurface`].
#[derive(Debug, Clone)]
pub struct GeoJsonMarker {
    position: LatLng,
    style: MarkerStyle,
    popup: Option<Popup>,
}

/// Surface producing a `GeoJSON` `FeatureCollection`.
pub struct GeoJsonSurface {
    template: Box<dyn PopupTemplate + Send + Sync>,
    features: Vec<Feature>,
}

impl Default for GeoJsonSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl GeoJsonSurface {
    /// Creates an empty surface rendering popups as HTML.
    #[must_use]
    pub fn new() -> Self {
        Self::with_template(HtmlPopupTemplate)
    }

    /// Creates an empty surface rendering popups with `template`.
    #[must_use]
    pub fn with_template<T: PopupTemplate + Send + Sync + 'static>(template: T) -> Self {
        Self {
            template: Box::new(template),
            features: Vec::new(),
        }
    }

    /// Returns the number of features collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if no feature has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Consumes the surface, returning the collected features.
    #[must_use]
    pub fn into_feature_collection(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: None,
        }
    }

    fn properties(&self, marker: &GeoJsonMarker) -> Result<JsonObject, SurfaceError> {
        let mut properties = JsonObject::new();

        let serde_json::Value::Object(style) = serde_json::to_value(marker.style)? else {
            return Err(SurfaceError::Rejected {
                message: "marker style did not serialize to an object".to_string(),
            });
        };
        properties.extend(style);

        if let Some(popup) = &marker.popup {
            properties.insert("alert".to_string(), serde_json::to_value(popup.alert)?);
            properties.insert("view".to_string(), serde_json::to_value(&popup.view)?);
            properties.insert(
                "popup".to_string(),
                serde_json::Value::String(popup.markup(self.template.as_ref())),
            );
        }

        Ok(properties)
    }
}

impl MapSurface for GeoJsonSurface {
    type Marker = GeoJsonMarker;

    fn create_point_marker(&mut self, position: LatLng, style: &MarkerStyle) -> GeoJsonMarker {
        GeoJsonMarker {
            position,
            style: *style,
            popup: None,
        }
    }

    fn attach_popup(&mut self, marker: &mut GeoJsonMarker, popup: Popup) {
        marker.popup = Some(popup);
    }

    fn add_marker(&mut self, marker: GeoJsonMarker) -> Result<(), SurfaceError> {
        let properties = self.properties(&marker)?;

        self.features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![
                marker.position.lng,
                marker.position.lat,
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PlainTextPopupTemplate, RED_ALERT_COLOR, RiskMarkerRenderer, UNKNOWN_DASH_ARRAY};
    use risk_map_risk_models::{RED_ALERT_LABEL, RiskRecord};

    fn render(records: &[RiskRecord], surface: GeoJsonSurface) -> FeatureCollection {
        let mut renderer = RiskMarkerRenderer::new(surface);
        renderer.render(records).unwrap();
        renderer.into_surface().into_feature_collection()
    }

    #[test]
    fn writes_point_features_in_lon_lat_order() {
        let record = RiskRecord {
            latitude: Some(6.2),
            longitude: Some(-75.5),
            alert: Some(RED_ALERT_LABEL.to_string()),
            ..RiskRecord::default()
        };
        let collection = render(&[record], GeoJsonSurface::new());

        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        let geometry = feature.geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![-75.5, 6.2]));

        let props = feature.properties.as_ref().unwrap();
        assert_eq!(props["color"], RED_ALERT_COLOR);
        assert_eq!(props["radius"], 10.0);
        assert_eq!(props["fillOpacity"], 0.8);
        assert_eq!(props["dashArray"], serde_json::Value::Null);
        assert_eq!(props["alert"], "RED_ALERT");
        assert_eq!(props["view"]["sector"], "SIN SECTOR");
        assert!(
            props["popup"]
                .as_str()
                .unwrap()
                .contains("<b>SIN SECTOR (SIN MUNICIPIO)</b>")
        );
    }

    #[test]
    fn unknown_alert_carries_dash_array() {
        let record = RiskRecord {
            latitude: Some(6.2),
            longitude: Some(-75.5),
            ..RiskRecord::default()
        };
        let collection = render(&[record], GeoJsonSurface::new());
        let props = collection.features[0].properties.as_ref().unwrap();

        assert_eq!(props["dashArray"], UNKNOWN_DASH_ARRAY);
        assert_eq!(props["alert"], "UNKNOWN");
    }

    #[test]
    fn custom_template_is_used_for_popup() {
        let record = RiskRecord {
            latitude: Some(6.2),
            longitude: Some(-75.5),
            ..RiskRecord::default()
        };
        let collection = render(
            &[record],
            GeoJsonSurface::with_template(PlainTextPopupTemplate),
        );
        let props = collection.features[0].properties.as_ref().unwrap();

        assert!(!props["popup"].as_str().unwrap().contains("<b>"));
    }

    #[test]
    fn empty_dataset_yields_empty_collection() {
        let surface = GeoJsonSurface::new();
        assert!(surface.is_empty());
        let collection = render(&[RiskRecord::default()], surface);
        assert!(collection.features.is_empty());
    }
}
