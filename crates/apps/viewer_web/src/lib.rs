//! The service-zone widget: a dropdown plus a Leaflet map.
//!
//! JS side bootstraps with `init_widget(map_id, select_id, status_id)`
//! after the Leaflet script has loaded; everything else is driven by the
//! selector's change events (or `set_zone` for programmatic selection).

use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::RefCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use catalog::SERVICES_PATH;
use formats::ZoneDocument;
use foundation::LonLatBounds;
use layers::{OverlayId, ZoneOverlay};
use viewer::{
    Completion, FitOptions, MapSurface, MapView, ZoneFetchError, ZoneMapController,
};

mod leaflet;

/// `MapSurface` over a live Leaflet map.
struct LeafletSurface {
    map: leaflet::Map,
    // At most one entry; kept as a list so detach stays order-agnostic.
    attached: Vec<(OverlayId, leaflet::Layer)>,
}

impl LeafletSurface {
    fn new(container_id: &str) -> Self {
        Self {
            map: leaflet::map(container_id),
            attached: Vec::new(),
        }
    }
}

impl MapSurface for LeafletSurface {
    fn set_view(&mut self, view: MapView) {
        let center = leaflet::lat_lng(view.center.lat_deg, view.center.lon_deg);
        self.map.set_view(&center, view.zoom);
    }

    fn add_tile_layer(&mut self, url_template: &str, attribution: &str) {
        let options = serde_json::json!({ "attribution": attribution }).to_string();
        match leaflet::json_object(&options) {
            Ok(options) => {
                leaflet::tile_layer(url_template, &options).add_to(&self.map);
            }
            Err(err) => console_error(&format!("tile layer options rejected: {err:?}")),
        }
    }

    fn attach_overlay(&mut self, overlay: &ZoneOverlay) {
        let data = overlay.document.to_geojson_value().to_string();
        let options = serde_json::json!({
            "style": {
                "color": overlay.style.color,
                "weight": overlay.style.weight,
                "fillOpacity": overlay.style.fill_opacity,
            }
        })
        .to_string();

        match (leaflet::json_object(&data), leaflet::json_object(&options)) {
            (Ok(data), Ok(options)) => {
                let layer = leaflet::geo_json(&data, &options);
                layer.add_to(&self.map);
                self.attached.push((overlay.id, layer));
            }
            (Err(err), _) | (_, Err(err)) => {
                console_error(&format!("zone layer rejected: {err:?}"));
            }
        }
    }

    fn detach_overlay(&mut self, id: OverlayId) {
        if let Some(pos) = self.attached.iter().position(|(a, _)| *a == id) {
            let (_, layer) = self.attached.remove(pos);
            self.map.remove_layer(&layer);
        }
    }

    fn fit_bounds(&mut self, bounds: LonLatBounds, options: FitOptions) {
        let js_bounds = leaflet::lat_lng_bounds(
            bounds.min.lat_deg,
            bounds.min.lon_deg,
            bounds.max.lat_deg,
            bounds.max.lon_deg,
        );
        let options = serde_json::json!({
            "padding": [options.padding_px, options.padding_px],
            "maxZoom": options.max_zoom,
            "animate": options.animate,
            "duration": options.duration_s,
        })
        .to_string();
        match leaflet::json_object(&options) {
            Ok(options) => self.map.fit_bounds(&js_bounds, &options),
            Err(err) => console_error(&format!("fit options rejected: {err:?}")),
        }
    }
}

struct WidgetState {
    controller: ZoneMapController<LeafletSurface>,
    select_id: String,
    status_id: String,
}

thread_local! {
    static STATE: RefCell<Option<WidgetState>> = const { RefCell::new(None) };
}

/// Safe TLS access helper that returns a default on teardown instead of
/// panicking, and is a no-op before `init_widget`.
fn with_widget<F, R>(f: F) -> R
where
    F: FnOnce(&mut WidgetState) -> R,
    R: Default,
{
    STATE
        .try_with(|state| {
            let mut state = state.borrow_mut();
            match state.as_mut() {
                Some(widget) => f(widget),
                None => R::default(),
            }
        })
        .unwrap_or_default()
}

fn console_error(msg: &str) {
    web_sys::console::error_1(&JsValue::from_str(msg));
}

fn console_log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Mount the widget: create the map, wire the selector, fetch the catalog.
#[wasm_bindgen]
pub fn init_widget(map_id: &str, select_id: &str, status_id: &str) -> Result<(), JsValue> {
    let controller = ZoneMapController::new(LeafletSurface::new(map_id));

    STATE.with(|state| {
        *state.borrow_mut() = Some(WidgetState {
            controller,
            select_id: select_id.to_string(),
            status_id: status_id.to_string(),
        });
    });

    wire_select_listener(select_id)?;
    spawn_local(load_services());
    Ok(())
}

/// Select a service by name. Public so hosts can drive the widget from JS;
/// the change listener routes through here as well.
#[wasm_bindgen]
pub fn set_zone(name: &str) {
    let request = with_widget(|widget| widget.controller.set_zone(name));
    update_status_element();

    let Some(request) = request else {
        return;
    };

    spawn_local(async move {
        let result = fetch_zone_document(&request.path).await;
        if let Err(err) = &result {
            console_error(&format!("zone fetch failed for {}: {err}", request.service));
        }

        let outcome = with_widget(|widget| {
            Some(widget.controller.complete_zone_request(&request, result))
        });
        if outcome == Some(Completion::Stale) {
            console_log(&format!(
                "discarding stale zone response for {}",
                request.service
            ));
        }
        update_status_element();
    });
}

/// Service names currently offered by the selector.
#[wasm_bindgen]
pub fn service_names() -> js_sys::Array {
    let names: Vec<String> =
        with_widget(|widget| widget.controller.service_names().iter().map(|s| s.to_string()).collect());
    names.into_iter().map(JsValue::from).collect()
}

async fn load_services() {
    let loaded = match fetch_text(SERVICES_PATH).await {
        Ok(payload) => with_widget(|widget| {
            widget.controller.load_catalog_json(&payload).is_ok()
        }),
        Err(err) => {
            console_error(&format!("services catalog fetch failed: {err}"));
            with_widget(|widget| widget.controller.catalog_failed(&err));
            false
        }
    };

    if loaded {
        populate_select_options();
    }
    update_status_element();
}

fn wire_select_listener(select_id: &str) -> Result<(), JsValue> {
    let select = select_element(select_id)
        .ok_or_else(|| JsValue::from_str(&format!("no <select> with id {select_id}")))?;

    let handler = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let Some(target) = event.target() else {
            return;
        };
        let Ok(select) = target.dyn_into::<web_sys::HtmlSelectElement>() else {
            return;
        };
        set_zone(&select.value());
    });

    select.add_event_listener_with_callback("change", handler.as_ref().unchecked_ref())?;
    // The listener lives as long as the page; intentionally leaked.
    handler.forget();
    Ok(())
}

fn populate_select_options() {
    let (select_id, names) = with_widget(|widget| {
        (
            widget.select_id.clone(),
            widget
                .controller
                .service_names()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>(),
        )
    });
    let Some(select) = select_element(&select_id) else {
        return;
    };

    select.set_inner_html("");
    append_option(&select, "", "Select a service");
    for name in &names {
        append_option(&select, name, name);
    }
}

fn append_option(select: &web_sys::HtmlSelectElement, value: &str, label: &str) {
    match web_sys::HtmlOptionElement::new_with_text_and_value(label, value) {
        Ok(option) => {
            if let Err(err) = select.append_child(&option) {
                console_error(&format!("failed to append option: {err:?}"));
            }
        }
        Err(err) => console_error(&format!("failed to create option: {err:?}")),
    }
}

fn update_status_element() {
    let (status_id, line) = with_widget(|widget| {
        (widget.status_id.clone(), widget.controller.status().line())
    });
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(element) = document.get_element_by_id(&status_id) {
        element.set_text_content(Some(&line));
    }
}

fn select_element(id: &str) -> Option<web_sys::HtmlSelectElement> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id))
        .and_then(|e| e.dyn_into::<web_sys::HtmlSelectElement>().ok())
}

async fn fetch_text(url: &str) -> Result<String, ZoneFetchError> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| ZoneFetchError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(ZoneFetchError::Http {
            status: resp.status(),
        });
    }
    resp.text()
        .await
        .map_err(|e| ZoneFetchError::Network(e.to_string()))
}

async fn fetch_zone_document(path: &str) -> Result<ZoneDocument, ZoneFetchError> {
    let payload = fetch_text(path).await?;
    Ok(ZoneDocument::from_geojson_str(&payload)?)
}
