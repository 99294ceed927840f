use serde_json::{Map, Value};

/// Relative URL of the catalog document.
pub const SERVICES_PATH: &str = "service_zones/services.json";

/// Directory holding one GeoJSON boundary file per service.
pub const ZONES_DIR: &str = "service_zones/zones2";

/// The service catalog: service name -> opaque metadata.
///
/// Loaded once per session from `services.json`; only the key set is
/// consumed by the viewer, the values ride along untouched (the generator
/// stores each service's city list there).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ServiceCatalog {
    entries: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    Json(String),
    NotAnObject,
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Json(msg) => write!(f, "catalog JSON parse error: {msg}"),
            CatalogError::NotAnObject => write!(f, "catalog document must be a JSON object"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl ServiceCatalog {
    pub fn from_json_str(payload: &str) -> Result<Self, CatalogError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, CatalogError> {
        match value {
            Value::Object(entries) => Ok(Self { entries }),
            _ => Err(CatalogError::NotAnObject),
        }
    }

    /// Service names in map-enumeration order (no explicit sort applied).
    pub fn service_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn metadata(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// File name of a service's boundary document: spaces become underscores.
pub fn zone_file_name(service: &str) -> String {
    format!("{}.geojson", service.replace(' ', "_"))
}

/// Relative URL of a service's boundary document.
pub fn zone_path(service: &str) -> String {
    format!("{}/{}", ZONES_DIR, zone_file_name(service))
}
