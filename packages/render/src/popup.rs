//! Popup view-model and the templates that turn it into markup.
//!
//! [`PopupView`] holds display-ready strings derived from a
//! [`RiskRecord`]; a [`PopupTemplate`] decides how those strings are
//! presented. Surfaces only invoke a template when popup content is
//! actually needed.

use risk_map_risk_models::RiskRecord;
use serde::Serialize;

use crate::format::{NOT_AVAILABLE, NumberLocale, format_one_decimal, format_rent};

/// Header fallback for records without a sector.
pub const NO_SECTOR: &str = "SIN SECTOR";

/// Header fallback for records without a municipality.
pub const NO_MUNICIPALITY: &str = "SIN MUNICIPIO";

/// Fallback for records without a most common offense.
pub const NO_OFFENSE_DATA: &str = "Sin datos";

/// Display-ready popup content for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    /// Sector name or [`NO_SECTOR`].
    pub sector: String,
    /// Municipality name or [`NO_MUNICIPALITY`].
    pub municipality: String,
    /// Raw alert label, empty when absent.
    pub alert_label: String,
    /// Risk level label, empty when absent.
    pub risk_level: String,
    /// Average monthly cases with one decimal, or `N/A`.
    pub monthly_average: String,
    /// Most common offense or [`NO_OFFENSE_DATA`].
    pub top_offense: String,
    /// Grouped apartment rent or `N/A`.
    pub rent_apartment: String,
    /// Grouped house rent or `N/A`.
    pub rent_house: String,
    /// Grouped commercial premises rent or `N/A`.
    pub rent_commercial: String,
}

impl PopupView {
    /// Derives the popup content of a record, applying every fallback.
    #[must_use]
    pub fn from_record(record: &RiskRecord, locale: NumberLocale) -> Self {
        Self {
            sector: record
                .sector
                .clone()
                .unwrap_or_else(|| NO_SECTOR.to_string()),
            municipality: record
                .municipality
                .clone()
                .unwrap_or_else(|| NO_MUNICIPALITY.to_string()),
            alert_label: record.alert.clone().unwrap_or_default(),
            risk_level: record.risk_level.clone().unwrap_or_default(),
            monthly_average: format_one_decimal(record.monthly_average),
            top_offense: record
                .top_offense
                .clone()
                .unwrap_or_else(|| NO_OFFENSE_DATA.to_string()),
            rent_apartment: format_rent(record.rent_apartment, locale),
            rent_house: format_rent(record.rent_house, locale),
            rent_commercial: format_rent(record.rent_commercial, locale),
        }
    }

    /// Returns the `(label, value)` rows of the rent block.
    #[must_use]
    pub fn rent_rows(&self) -> [(&'static str, &str); 3] {
        [
            ("🏢 Apartamento", self.rent_apartment.as_str()),
            ("🏠 Casa", self.rent_house.as_str()),
            ("🏪 Local", self.rent_commercial.as_str()),
        ]
    }
}

/// Turns a [`PopupView`] into presentable content.
pub trait PopupTemplate {
    /// Renders the popup content.
    fn render(&self, view: &PopupView) -> String;
}

/// Leaflet popup markup with every data value HTML-escaped.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPopupTemplate;

impl PopupTemplate for HtmlPopupTemplate {
    fn render(&self, view: &PopupView) -> String {
        let mut html = format!(
            "<b>{} ({})</b><br>\n{} — Nivel: {}<br><br>\n",
            escape_html(&view.sector),
            escape_html(&view.municipality),
            escape_html(&view.alert_label),
            escape_html(&view.risk_level)
        );
        html.push_str(&format!(
            "📊 <b>Promedio de casos mensuales:</b> {}<br>\n",
            escape_html(&view.monthly_average)
        ));
        html.push_str(&format!(
            "🚨 <b>Delito más común:</b> {}<br>\n",
            escape_html(&view.top_offense)
        ));
        html.push_str("<hr>\n💰 <b>Arriendos promedio:</b><br>\n");
        for (label, value) in view.rent_rows() {
            html.push_str(&format!("{label}: {}<br>\n", escape_html(&money(value))));
        }

        html
    }
}

/// Plain text rendering used for logs and terminal output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextPopupTemplate;

impl PopupTemplate for PlainTextPopupTemplate {
    fn render(&self, view: &PopupView) -> String {
        let mut text = format!(
            "{} ({})\n{} — Nivel: {}\n",
            view.sector, view.municipality, view.alert_label, view.risk_level
        );
        text.push_str(&format!(
            "Promedio de casos mensuales: {}\nDelito más común: {}\n",
            view.monthly_average, view.top_offense
        ));
        text.push_str("Arriendos promedio:\n");
        for (label, value) in view.rent_rows() {
            text.push_str(&format!("  {label}: {}\n", money(value)));
        }

        text
    }
}

/// Prefixes a currency sign unless the value is the `N/A` placeholder.
fn money(value: &str) -> String {
    if value == NOT_AVAILABLE {
        value.to_string()
    } else {
        format!("${value}")
    }
}

/// Escapes the characters that are significant in HTML text and
/// attribute values.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> RiskRecord {
        RiskRecord {
            latitude: Some(6.2),
            longitude: Some(-75.5),
            sector: Some("LAURELES".to_string()),
            municipality: Some("MEDELLIN".to_string()),
            alert: Some("🟠 Alerta Media".to_string()),
            risk_level: Some("🥈 Plata".to_string()),
            monthly_average: Some(12.345),
            top_offense: Some("HURTO A PERSONAS".to_string()),
            rent_apartment: Some(2_500_000.0),
            rent_house: Some(3_100_000.0),
            rent_commercial: None,
        }
    }

    #[test]
    fn applies_fallbacks_for_empty_record() {
        let view = PopupView::from_record(&RiskRecord::default(), NumberLocale::En);
        assert_eq!(view.sector, NO_SECTOR);
        assert_eq!(view.municipality, NO_MUNICIPALITY);
        assert_eq!(view.alert_label, "");
        assert_eq!(view.risk_level, "");
        assert_eq!(view.monthly_average, "N/A");
        assert_eq!(view.top_offense, NO_OFFENSE_DATA);
        assert_eq!(view.rent_apartment, "N/A");
        assert_eq!(view.rent_house, "N/A");
        assert_eq!(view.rent_commercial, "N/A");
    }

    #[test]
    fn formats_present_values() {
        let view = PopupView::from_record(&full_record(), NumberLocale::En);
        assert_eq!(view.monthly_average, "12.3");
        assert_eq!(view.rent_apartment, "2,500,000");
        assert_eq!(view.rent_house, "3,100,000");
        assert_eq!(view.rent_commercial, "N/A");
    }

    #[test]
    fn html_popup_contains_every_section() {
        let view = PopupView::from_record(&full_record(), NumberLocale::En);
        let html = HtmlPopupTemplate.render(&view);

        assert!(html.starts_with("<b>LAURELES (MEDELLIN)</b><br>"));
        assert!(html.contains("🟠 Alerta Media — Nivel: 🥈 Plata"));
        assert!(html.contains("<b>Promedio de casos mensuales:</b> 12.3<br>"));
        assert!(html.contains("<b>Delito más común:</b> HURTO A PERSONAS<br>"));
        assert!(html.contains("🏢 Apartamento: $2,500,000<br>"));
        assert!(html.contains("🏠 Casa: $3,100,000<br>"));
        assert!(html.contains("🏪 Local: N/A<br>"));
        assert!(html.contains("<hr>"));
    }

    #[test]
    fn html_popup_escapes_data() {
        let record = RiskRecord {
            sector: Some("<script>alert(1)</script>".to_string()),
            municipality: Some("A & B".to_string()),
            ..RiskRecord::default()
        };
        let html = HtmlPopupTemplate.render(&PopupView::from_record(&record, NumberLocale::En));

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; (A &amp; B)"));
    }

    #[test]
    fn plain_text_popup() {
        let view = PopupView::from_record(&RiskRecord::default(), NumberLocale::En);
        let text = PlainTextPopupTemplate.render(&view);

        assert!(text.starts_with("SIN SECTOR (SIN MUNICIPIO)\n"));
        assert!(text.contains("Delito más común: Sin datos"));
        assert!(text.contains("  🏢 Apartamento: N/A"));
        assert!(!text.contains('<'));
    }
}
