//! Map surface abstraction and the in-memory recording surface.
//!
//! A [`MapSurface`] is anything markers can be drawn onto. The renderer
//! only needs three capabilities: create a point marker, attach a popup
//! to it, and add it to the surface.

use risk_map_risk_models::AlertLevel;

use crate::popup::{PopupTemplate, PopupView};
use crate::{LatLng, MarkerStyle, SurfaceError};

/// Popup attached to a marker.
///
/// Holds the structured view only; markup is produced on demand through
/// [`Popup::markup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    /// Alert classification of the record the popup describes.
    pub alert: AlertLevel,
    /// Display-ready popup content.
    pub view: PopupView,
}

impl Popup {
    /// Creates a popup for a record of the given alert level.
    #[must_use]
    pub const fn new(alert: AlertLevel, view: PopupView) -> Self {
        Self { alert, view }
    }

    /// Renders the popup content with `template`.
    #[must_use]
    pub fn markup<T: PopupTemplate + ?Sized>(&self, template: &T) -> String {
        template.render(&self.view)
    }
}

/// A target that circle markers can be drawn onto.
pub trait MapSurface {
    /// Surface-specific marker handle.
    type Marker;

    /// Creates a point marker at `position`. The marker is not visible
    /// until passed to [`MapSurface::add_marker`].
    fn create_point_marker(&mut self, position: LatLng, style: &MarkerStyle) -> Self::Marker;

    /// Binds a popup to a marker that has not been added yet.
    fn attach_popup(&mut self, marker: &mut Self::Marker, popup: Popup);

    /// Adds a marker to the surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError`] if the surface cannot accept the marker.
    fn add_marker(&mut self, marker: Self::Marker) -> Result<(), SurfaceError>;
}

/// A marker kept by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMarker {
    /// Marker position.
    pub position: LatLng,
    /// Resolved marker style.
    pub style: MarkerStyle,
    /// Bound popup, if any.
    pub popup: Option<Popup>,
}

/// Surface that keeps every added marker in memory, in insertion order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    markers: Vec<RecordedMarker>,
}

impl RecordingSurface {
    /// Creates an empty surface.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    /// Returns the added markers in insertion order.
    #[must_use]
    pub fn markers(&self) -> &[RecordedMarker] {
        &self.markers
    }

    /// Returns the number of added markers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if no marker has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Renders the popup of the marker at `index`, or `None` if there is
    /// no such marker or it has no popup.
    #[must_use]
    pub fn popup_markup<T: PopupTemplate + ?Sized>(
        &self,
        index: usize,
        template: &T,
    ) -> Option<String> {
        self.markers
            .get(index)?
            .popup
            .as_ref()
            .map(|popup| popup.markup(template))
    }
}

impl MapSurface for RecordingSurface {
    type Marker = RecordedMarker;

    fn create_point_marker(&mut self, position: LatLng, style: &MarkerStyle) -> RecordedMarker {
        RecordedMarker {
            position,
            style: *style,
            popup: None,
        }
    }

    fn attach_popup(&mut self, marker: &mut RecordedMarker, popup: Popup) {
        marker.popup = Some(popup);
    }

    fn add_marker(&mut self, marker: RecordedMarker) -> Result<(), SurfaceError> {
        self.markers.push(marker);
        Ok(())
    }
}
