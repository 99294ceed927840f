use foundation::{LonLat, LonLatBounds};
use serde_json::{Map, Value};

/// Geometry of a single zone feature, in GeoJSON's coordinate order.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneGeometry {
    Point(LonLat),
    MultiPoint(Vec<LonLat>),
    LineString(Vec<LonLat>),
    MultiLineString(Vec<Vec<LonLat>>),
    Polygon(Vec<Vec<LonLat>>),
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
}

impl ZoneGeometry {
    /// Parse a bare GeoJSON geometry object (no Feature wrapper).
    pub fn from_geojson_value(value: &Value) -> Result<Self, ZoneDocumentError> {
        parse_geometry(value).map_err(ZoneDocumentError::InvalidGeometry)
    }

    /// Emit the bare GeoJSON geometry object.
    pub fn to_geojson_value(&self) -> Value {
        geometry_to_geojson_value(self)
    }

    /// Visit every coordinate in the geometry.
    pub fn for_each_point<F: FnMut(LonLat)>(&self, mut f: F) {
        match self {
            ZoneGeometry::Point(p) => f(*p),
            ZoneGeometry::MultiPoint(ps) | ZoneGeometry::LineString(ps) => {
                ps.iter().copied().for_each(&mut f)
            }
            ZoneGeometry::MultiLineString(lines) | ZoneGeometry::Polygon(lines) => {
                for line in lines {
                    line.iter().copied().for_each(&mut f);
                }
            }
            ZoneGeometry::MultiPolygon(polys) => {
                for poly in polys {
                    for ring in poly {
                        ring.iter().copied().for_each(&mut f);
                    }
                }
            }
        }
    }

    pub fn bounds(&self) -> LonLatBounds {
        let mut b = LonLatBounds::empty();
        self.for_each_point(|p| b.extend(p));
        b
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFeature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: ZoneGeometry,
}

/// A zone boundary document: the payload of one `zones2/*.geojson` fetch.
///
/// The endpoint may serve either a bare Feature or a FeatureCollection
/// (one feature per member city); both normalize to a feature list.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDocument {
    pub features: Vec<ZoneFeature>,
}

#[derive(Debug)]
pub enum ZoneDocumentError {
    Json(String),
    UnsupportedRoot(String),
    InvalidFeature { index: usize, reason: String },
    InvalidGeometry(String),
}

impl std::fmt::Display for ZoneDocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneDocumentError::Json(msg) => write!(f, "JSON parse error: {msg}"),
            ZoneDocumentError::UnsupportedRoot(ty) => {
                write!(f, "expected GeoJSON Feature or FeatureCollection, got {ty}")
            }
            ZoneDocumentError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
            ZoneDocumentError::InvalidGeometry(reason) => {
                write!(f, "invalid geometry: {reason}")
            }
        }
    }
}

impl std::error::Error for ZoneDocumentError {}

impl ZoneDocument {
    pub fn from_geojson_str(payload: &str) -> Result<Self, ZoneDocumentError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| ZoneDocumentError::Json(e.to_string()))?;
        Self::from_geojson_value(value)
    }

    pub fn from_geojson_value(value: Value) -> Result<Self, ZoneDocumentError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ZoneDocumentError::UnsupportedRoot("non-object".to_string()))?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ZoneDocumentError::UnsupportedRoot("missing type".to_string()))?;

        match ty {
            "FeatureCollection" => {
                let features_val = obj.get("features").and_then(|v| v.as_array()).ok_or_else(
                    || ZoneDocumentError::UnsupportedRoot("FeatureCollection without features".to_string()),
                )?;
                let mut features = Vec::with_capacity(features_val.len());
                for (index, feat_val) in features_val.iter().enumerate() {
                    features.push(parse_feature(feat_val, index)?);
                }
                Ok(Self { features })
            }
            "Feature" => Ok(Self {
                features: vec![parse_feature(&value, 0)?],
            }),
            other => Err(ZoneDocumentError::UnsupportedRoot(other.to_string())),
        }
    }

    /// Combined bounds of every feature; empty for a document with no
    /// coordinates.
    pub fn bounds(&self) -> LonLatBounds {
        let mut b = LonLatBounds::empty();
        for feat in &self.features {
            b.extend_bounds(feat.geometry.bounds());
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.bounds().is_empty()
    }

    /// Semantic round-trip exporter: emits a GeoJSON FeatureCollection.
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );

        let mut features: Vec<Value> = Vec::with_capacity(self.features.len());
        for feat in &self.features {
            let mut fobj = Map::new();
            fobj.insert("type".to_string(), Value::String("Feature".to_string()));
            if let Some(id) = &feat.id {
                fobj.insert("id".to_string(), Value::String(id.clone()));
            }
            fobj.insert(
                "properties".to_string(),
                Value::Object(feat.properties.clone()),
            );
            fobj.insert(
                "geometry".to_string(),
                geometry_to_geojson_value(&feat.geometry),
            );
            features.push(Value::Object(fobj));
        }

        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

    pub fn to_geojson_string_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_geojson_value())
    }
}

fn parse_feature(value: &Value, index: usize) -> Result<ZoneFeature, ZoneDocumentError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ZoneDocumentError::InvalidFeature {
            index,
            reason: "feature must be an object".to_string(),
        })?;

    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ZoneDocumentError::InvalidFeature {
            index,
            reason: "feature missing type".to_string(),
        })?;
    if ty != "Feature" {
        return Err(ZoneDocumentError::InvalidFeature {
            index,
            reason: format!("unexpected feature type: {ty}"),
        });
    }

    let id = match obj.get("id") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let properties = obj
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let geometry_val = obj
        .get("geometry")
        .ok_or_else(|| ZoneDocumentError::InvalidFeature {
            index,
            reason: "feature missing geometry".to_string(),
        })?;
    let geometry = parse_geometry(geometry_val)
        .map_err(|reason| ZoneDocumentError::InvalidFeature { index, reason })?;

    Ok(ZoneFeature {
        id,
        properties,
        geometry,
    })
}

fn geometry_to_geojson_value(geom: &ZoneGeometry) -> Value {
    let mut obj = Map::new();
    match geom {
        ZoneGeometry::Point(p) => {
            obj.insert("type".to_string(), Value::String("Point".to_string()));
            obj.insert("coordinates".to_string(), point_coords(p));
        }
        ZoneGeometry::MultiPoint(ps) => {
            obj.insert("type".to_string(), Value::String("MultiPoint".to_string()));
            obj.insert(
                "coordinates".to_string(),
                Value::Array(ps.iter().map(point_coords).collect()),
            );
        }
        ZoneGeometry::LineString(ps) => {
            obj.insert("type".to_string(), Value::String("LineString".to_string()));
            obj.insert(
                "coordinates".to_string(),
                Value::Array(ps.iter().map(point_coords).collect()),
            );
        }
        ZoneGeometry::MultiLineString(lines) => {
            obj.insert(
                "type".to_string(),
                Value::String("MultiLineString".to_string()),
            );
            let coords = lines
                .iter()
                .map(|line| Value::Array(line.iter().map(point_coords).collect()))
                .collect();
            obj.insert("coordinates".to_string(), Value::Array(coords));
        }
        ZoneGeometry::Polygon(rings) => {
            obj.insert("type".to_string(), Value::String("Polygon".to_string()));
            let coords = rings
                .iter()
                .map(|ring| Value::Array(ring.iter().map(point_coords).collect()))
                .collect();
            obj.insert("coordinates".to_string(), Value::Array(coords));
        }
        ZoneGeometry::MultiPolygon(polys) => {
            obj.insert(
                "type".to_string(),
                Value::String("MultiPolygon".to_string()),
            );
            let coords = polys
                .iter()
                .map(|poly| {
                    let rings = poly
                        .iter()
                        .map(|ring| Value::Array(ring.iter().map(point_coords).collect()))
                        .collect();
                    Value::Array(rings)
                })
                .collect();
            obj.insert("coordinates".to_string(), Value::Array(coords));
        }
    }
    Value::Object(obj)
}

fn point_coords(p: &LonLat) -> Value {
    Value::Array(vec![Value::from(p.lon_deg), Value::from(p.lat_deg)])
}

fn parse_geometry(value: &Value) -> Result<ZoneGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Point" => Ok(ZoneGeometry::Point(parse_point(coords)?)),
        "MultiPoint" => Ok(ZoneGeometry::MultiPoint(parse_points(coords)?)),
        "LineString" => Ok(ZoneGeometry::LineString(parse_points(coords)?)),
        "MultiLineString" => Ok(ZoneGeometry::MultiLineString(parse_lines(coords)?)),
        "Polygon" => Ok(ZoneGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(ZoneGeometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type: {other}")),
    }
}

fn parse_point(coords: &Value) -> Result<LonLat, String> {
    let arr = coords
        .as_array()
        .ok_or("Point coordinates must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("Point coordinates must have [lon, lat]".to_string());
    }
    let lon = arr[0]
        .as_f64()
        .ok_or("Point lon must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("Point lat must be a number".to_string())?;
    Ok(LonLat::new(lon, lat))
}

fn parse_points(coords: &Value) -> Result<Vec<LonLat>, String> {
    let arr = coords
        .as_array()
        .ok_or("coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_point(item)?);
    }
    Ok(out)
}

fn parse_lines(coords: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let arr = coords
        .as_array()
        .ok_or("MultiLineString coordinates must be an array".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for line in arr {
        out.push(parse_points(line)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Vec<Vec<LonLat>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_points(ring)?);
    }
    Ok(out)
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Vec<Vec<LonLat>>>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{ZoneDocument, ZoneDocumentError, ZoneGeometry};

    const NORTH_BAY: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Santa Rosa"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [-122.8, 38.3], [-122.6, 38.3],
                        [-122.6, 38.5], [-122.8, 38.5],
                        [-122.8, 38.3]
                    ]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Napa"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[
                        [-122.35, 38.25], [-122.25, 38.25],
                        [-122.25, 38.35], [-122.35, 38.35],
                        [-122.35, 38.25]
                    ]]]
                }
            }
        ]
    }"#;

    #[test]
    fn parses_feature_collection() {
        let doc = ZoneDocument::from_geojson_str(NORTH_BAY).expect("parse");
        assert_eq!(doc.features.len(), 2);
        assert!(matches!(doc.features[0].geometry, ZoneGeometry::Polygon(_)));
        assert!(matches!(
            doc.features[1].geometry,
            ZoneGeometry::MultiPolygon(_)
        ));
    }

    #[test]
    fn parses_bare_feature() {
        let payload = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
            }
        }"#;
        let doc = ZoneDocument::from_geojson_str(payload).expect("parse");
        assert_eq!(doc.features.len(), 1);
    }

    #[test]
    fn bounds_span_all_features() {
        let doc = ZoneDocument::from_geojson_str(NORTH_BAY).expect("parse");
        let b = doc.bounds();
        assert_eq!(b.min.lon_deg, -122.8);
        assert_eq!(b.max.lon_deg, -122.25);
        assert_eq!(b.min.lat_deg, 38.25);
        assert_eq!(b.max.lat_deg, 38.5);
    }

    #[test]
    fn empty_collection_has_empty_bounds() {
        let doc =
            ZoneDocument::from_geojson_str(r#"{"type": "FeatureCollection", "features": []}"#)
                .expect("parse");
        assert!(doc.is_empty());
    }

    #[test]
    fn rejects_non_geojson_root() {
        let err = ZoneDocument::from_geojson_str(r#"{"type": "Topology"}"#).unwrap_err();
        assert!(matches!(err, ZoneDocumentError::UnsupportedRoot(_)));
    }

    #[test]
    fn rejects_feature_without_geometry() {
        let err = ZoneDocument::from_geojson_str(
            r#"{"type": "FeatureCollection", "features": [{"type": "Feature", "properties": {}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ZoneDocumentError::InvalidFeature { index: 0, .. }
        ));
    }

    #[test]
    fn round_trip_preserves_feature_shape() {
        let doc = ZoneDocument::from_geojson_str(NORTH_BAY).expect("parse");
        let json = doc.to_geojson_string_pretty().expect("serialize");
        let rt = ZoneDocument::from_geojson_str(&json).expect("reparse");
        assert_eq!(rt, doc);
    }
}
