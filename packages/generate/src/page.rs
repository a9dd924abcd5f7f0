//! Static Leaflet page.
//!
//! The page initializes the map from [`MapConfig`], fetches the marker
//! `GeoJSON` asynchronously, draws one circle marker per feature using the
//! style stored in its properties, and shows the static risk legend.

use risk_map_render::UNKNOWN_DASH_ARRAY;
use risk_map_render::popup::escape_html;
use risk_map_risk_models::legend;

use crate::config::MapConfig;

/// Leaflet release loaded by the page.
const LEAFLET_VERSION: &str = "1.9.4";

const STYLE: &str = r".info.legend {
  background: white;
  padding: 10px;
  border-radius: 10px;
  box-shadow: 0 0 10px rgba(0,0,0,0.2);
  line-height: 1.4em;
}
.leaflet-popup-content {
  font-family: 'Inter', sans-serif;
  font-size: 14px;
  line-height: 1.5;
}
.leaflet-popup-content hr {
  border: 0;
  border-top: 1px solid #ccc;
  margin: 5px 0;
}
html, body, #map { height: 100%; margin: 0; }";

/// Builds the legend control markup.
#[must_use]
pub fn legend_html() -> String {
    let mut html = String::from(
        "<h4>🧭 Niveles de Riesgo</h4>\n<table style=\"font-size:13px; border-collapse:collapse;\">\n",
    );
    for entry in legend() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            entry.label,
            entry.range_label(),
            entry.alert_label
        ));
    }
    html.push_str("</table>\n");
    html.push_str(&format!(
        "<p style=\"font-size:12px; margin:6px 0 0;\">\
         <svg width=\"14\" height=\"14\"><circle cx=\"7\" cy=\"7\" r=\"5\" fill=\"none\" \
         stroke=\"#1a9850\" stroke-width=\"2\" stroke-dasharray=\"{UNKNOWN_DASH_ARRAY}\"/></svg> \
         Sin alerta registrada</p>"
    ));
    html
}

/// Encodes a string as a JavaScript string literal that is safe to embed
/// inside a `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}

/// Renders the complete page. `markers_url` is fetched relative to the
/// page.
#[must_use]
pub fn render_page(config: &MapConfig, markers_url: &str) -> String {
    let [lat, lng] = config.center;

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css">
<style>
{STYLE}
</style>
</head>
<body>
<div id="map"></div>
<script src="https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js"></script>
<script>
const map = L.map("map").setView([{lat}, {lng}], {zoom});

L.tileLayer({tile_url}, {{
  maxZoom: {max_zoom},
  attribution: {attribution}
}}).addTo(map);

fetch({markers_url})
  .then(response => {{
    if (!response.ok) {{
      throw new Error("HTTP " + response.status);
    }}
    return response.json();
  }})
  .then(data => {{
    console.log("Markers loaded:", data.features.length);
    L.geoJSON(data, {{
      pointToLayer: (feature, latlng) => {{
        const p = feature.properties;
        return L.circleMarker(latlng, {{
          radius: p.radius,
          color: p.color,
          weight: p.weight,
          fillOpacity: p.fillOpacity,
          dashArray: p.dashArray || null
        }});
      }},
      onEachFeature: (feature, layer) => {{
        if (feature.properties.popup) {{
          layer.bindPopup(feature.properties.popup);
        }}
      }}
    }}).addTo(map);
  }})
  .catch(error => console.error("Error loading " + {markers_url} + ":", error));

const legend = L.control({{ position: "bottomright" }});
legend.onAdd = function () {{
  const div = L.DomUtil.create("div", "info legend");
  div.innerHTML = {legend};
  return div;
}};
legend.addTo(map);
</script>
</body>
</html>
"#,
        title = escape_html(&config.title),
        zoom = config.zoom,
        tile_url = js_string(&config.tile_url),
        max_zoom = config.max_zoom,
        attribution = js_string(&config.attribution),
        markers_url = js_string(markers_url),
        legend = js_string(&legend_html()),
    )
}
