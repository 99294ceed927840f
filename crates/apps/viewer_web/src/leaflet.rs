//! Minimal Leaflet bindings: only the surface the widget consumes.
//!
//! Option bags are built as JSON text and parsed into JS objects; the
//! amounts involved are tiny and it keeps the bindings free of per-option
//! `Reflect` plumbing.

use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

#[wasm_bindgen]
unsafe extern "C" {
    /// `L.Map`.
    pub type Map;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    pub fn map(container_id: &str) -> Map;

    #[wasm_bindgen(method, js_name = setView)]
    pub fn set_view(this: &Map, center: &JsValue, zoom: f64);

    #[wasm_bindgen(method, js_name = removeLayer)]
    pub fn remove_layer(this: &Map, layer: &Layer);

    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &Map, bounds: &JsValue, options: &JsValue);

    /// `L.TileLayer` / `L.GeoJSON`; the widget only ever adds and removes
    /// layers, so one binding type covers both.
    pub type Layer;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    pub fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = geoJSON)]
    pub fn geo_json(data: &JsValue, options: &JsValue) -> Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Layer, map: &Map);
}

/// Parse a JSON string into a JS object for an options bag.
pub fn json_object(payload: &str) -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(payload)
}

/// `[lat, lon]` pair in Leaflet's coordinate order.
pub fn lat_lng(lat_deg: f64, lon_deg: f64) -> JsValue {
    let pair = js_sys::Array::new();
    pair.push(&JsValue::from_f64(lat_deg));
    pair.push(&JsValue::from_f64(lon_deg));
    pair.into()
}

/// `[[south, west], [north, east]]` bounds literal.
pub fn lat_lng_bounds(south: f64, west: f64, north: f64, east: f64) -> JsValue {
    let bounds = js_sys::Array::new();
    bounds.push(&lat_lng(south, west));
    bounds.push(&lat_lng(north, east));
    bounds.into()
}
