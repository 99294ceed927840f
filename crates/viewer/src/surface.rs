use foundation::{LonLat, LonLatBounds};
use layers::{OverlayId, ZoneOverlay};

/// Camera placement: where the map looks and how close.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapView {
    pub center: LonLat,
    pub zoom: f64,
}

/// Options for fitting the viewport to an overlay's bounds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitOptions {
    /// Padding kept clear on every side of the fitted bounds, in pixels.
    pub padding_px: f64,
    /// The fit never zooms in past this level.
    pub max_zoom: f64,
    pub animate: bool,
    pub duration_s: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding_px: 50.0,
            max_zoom: 16.0,
            animate: true,
            duration_s: 0.8,
        }
    }
}

/// The mapping-library seam.
///
/// Everything the widget needs from the third-party map: initial view,
/// one tile layer with its attribution, overlay attach/detach, and a
/// padded viewport fit. The wasm app implements this over Leaflet; the
/// contract tests implement it in memory.
pub trait MapSurface {
    fn set_view(&mut self, view: MapView);

    fn add_tile_layer(&mut self, url_template: &str, attribution: &str);

    fn attach_overlay(&mut self, overlay: &ZoneOverlay);

    fn detach_overlay(&mut self, id: OverlayId);

    fn fit_bounds(&mut self, bounds: LonLatBounds, options: FitOptions);
}
