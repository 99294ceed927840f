//! Zone map controller: the widget's single owner of map + overlay state.
//!
//! The controller holds the service catalog, the current selection, the
//! one live overlay, and the request-generation guard. `set_zone` is the
//! sole selection mutator; async transports stay outside and feed
//! completions back through `complete_zone_request`.

use catalog::{CatalogError, ServiceCatalog, zone_path};
use formats::ZoneDocument;
use foundation::LonLat;
use layers::{OverlaySlot, ZoneOverlay, ZoneStyle};
use streaming::{GenerationGuard, RequestGeneration};

use crate::fetch::ZoneFetchError;
use crate::surface::{FitOptions, MapSurface, MapView};

/// Initial view: the service area this data set covers (California).
pub const INITIAL_CENTER: LonLat = LonLat {
    lon_deg: -119.4179,
    lat_deg: 36.7783,
};
pub const INITIAL_ZOOM: f64 = 6.0;

/// Base map tiles and the attribution they require.
pub const TILE_URL_TEMPLATE: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap contributors";

/// What the status line shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerStatus {
    Idle,
    Loading { service: String },
    Ready { service: String },
    Error { message: String },
}

impl ViewerStatus {
    pub fn line(&self) -> String {
        match self {
            ViewerStatus::Idle => String::new(),
            ViewerStatus::Loading { service } => format!("Loading {service}…"),
            ViewerStatus::Ready { service } => format!("Showing {service}"),
            ViewerStatus::Error { message } => format!("Error: {message}"),
        }
    }
}

/// A zone fetch the controller has started and expects a completion for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneRequest {
    pub generation: RequestGeneration,
    pub service: String,
    /// Relative URL of the zone document, underscore-substituted.
    pub path: String,
}

/// How a completion was handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The overlay was replaced and the viewport refitted.
    Applied,
    /// A newer selection superseded this request; nothing changed.
    Stale,
    /// The fetch failed; the previous overlay is still attached.
    Failed,
}

#[derive(Debug)]
pub struct ZoneMapController<S: MapSurface> {
    surface: S,
    catalog: ServiceCatalog,
    selected: Option<String>,
    overlay: OverlaySlot,
    guard: GenerationGuard,
    style: ZoneStyle,
    fit: FitOptions,
    status: ViewerStatus,
}

impl<S: MapSurface> ZoneMapController<S> {
    /// Create the controller and put the surface in its initial state.
    pub fn new(mut surface: S) -> Self {
        surface.set_view(MapView {
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
        });
        surface.add_tile_layer(TILE_URL_TEMPLATE, TILE_ATTRIBUTION);

        Self {
            surface,
            catalog: ServiceCatalog::default(),
            selected: None,
            overlay: OverlaySlot::new(),
            guard: GenerationGuard::new(),
            style: ZoneStyle::default(),
            fit: FitOptions::default(),
            status: ViewerStatus::Idle,
        }
    }

    /// Install the catalog fetched at mount.
    ///
    /// On failure the option list stays empty and the error lands on the
    /// status line; there is no retry.
    pub fn load_catalog_json(&mut self, payload: &str) -> Result<(), CatalogError> {
        match ServiceCatalog::from_json_str(payload) {
            Ok(catalog) => {
                self.catalog = catalog;
                Ok(())
            }
            Err(err) => {
                self.status = ViewerStatus::Error {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    /// Record a catalog transport failure on the status line.
    pub fn catalog_failed(&mut self, err: &ZoneFetchError) {
        self.status = ViewerStatus::Error {
            message: format!("services list unavailable ({err})"),
        };
    }

    /// Selectable service names, in catalog enumeration order.
    pub fn service_names(&self) -> Vec<&str> {
        self.catalog.service_names()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn status(&self) -> &ViewerStatus {
        &self.status
    }

    pub fn overlay(&self) -> Option<&ZoneOverlay> {
        self.overlay.attached()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Select a service; the sole selection mutator.
    ///
    /// An empty name is a no-op and returns `None`. Otherwise the request
    /// generation advances (superseding any fetch still in flight) and
    /// the returned request must be completed with the fetch result.
    pub fn set_zone(&mut self, name: &str) -> Option<ZoneRequest> {
        if name.is_empty() {
            return None;
        }

        self.selected = Some(name.to_string());
        self.status = ViewerStatus::Loading {
            service: name.to_string(),
        };

        Some(ZoneRequest {
            generation: self.guard.begin(),
            service: name.to_string(),
            path: zone_path(name),
        })
    }

    /// Apply the result of a zone fetch.
    ///
    /// Stale completions (superseded by a newer `set_zone`) are discarded
    /// without touching any state. A failure keeps the previous overlay
    /// attached and visible; detachment happens only after a successful
    /// fetch.
    pub fn complete_zone_request(
        &mut self,
        request: &ZoneRequest,
        result: Result<ZoneDocument, ZoneFetchError>,
    ) -> Completion {
        if !self.guard.is_current(request.generation) {
            return Completion::Stale;
        }

        let document = match result {
            Ok(doc) => doc,
            Err(err) => {
                self.status = ViewerStatus::Error {
                    message: format!("{}: {err}", request.service),
                };
                return Completion::Failed;
            }
        };

        let bounds = document.bounds();
        if bounds.is_empty() {
            self.status = ViewerStatus::Error {
                message: format!("{}: zone has no coordinates", request.service),
            };
            return Completion::Failed;
        }

        let (overlay, previous) = self
            .overlay
            .replace(request.service.clone(), document, self.style);
        if let Some(previous) = previous {
            self.surface.detach_overlay(previous.id);
        }
        self.surface.attach_overlay(overlay);
        self.surface.fit_bounds(bounds, self.fit);

        self.status = ViewerStatus::Ready {
            service: request.service.clone(),
        };
        Completion::Applied
    }
}
