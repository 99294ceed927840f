//! Static file server for the service-zone data set.
//!
//! Two GET endpoints back the widget: the service catalog and one GeoJSON
//! boundary document per service. Files are produced offline by the
//! `zones` tool; this process only reads them.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct AppState {
    zones_root: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let zones_root = env::var("ZONES_ROOT").unwrap_or_else(|_| "service_zones".to_string());
    let addr: SocketAddr = env::var("ZONES_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:9300".to_string())
        .parse()
        .expect("invalid ZONES_ADDR");

    let state = AppState {
        zones_root: PathBuf::from(zones_root),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/service_zones/services.json", get(get_services))
        .route("/service_zones/zones2/:file", get(get_zone))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("zones server listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await.unwrap(), app)
        .await
        .unwrap();
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_services(State(state): State<AppState>) -> Response {
    let path = state.zones_root.join("services.json");
    serve_file(&path, "application/json").await
}

async fn get_zone(State(state): State<AppState>, AxumPath(file): AxumPath<String>) -> Response {
    if !is_zone_file_name(&file) {
        return (StatusCode::BAD_REQUEST, "expected <name>.geojson").into_response();
    }
    let path = state.zones_root.join("zones2").join(&file);
    serve_file(&path, "application/geo+json").await
}

/// A single `.geojson` path component; rejects anything that could walk
/// out of the zones directory.
fn is_zone_file_name(file: &str) -> bool {
    let Some(stem) = file.strip_suffix(".geojson") else {
        return false;
    };
    !stem.is_empty()
        && !stem.contains(['/', '\\'])
        && stem != "."
        && stem != ".."
        && !stem.starts_with('.')
}

async fn serve_file(path: &Path, content_type: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_str(content_type)
                    .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
            );
            (StatusCode::OK, headers, data).into_response()
        }
        Err(err) => {
            error!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_zone_file_name;

    #[test]
    fn accepts_underscored_service_files() {
        assert!(is_zone_file_name("North_Bay.geojson"));
        assert!(is_zone_file_name("Sacramento.geojson"));
    }

    #[test]
    fn rejects_traversal_and_foreign_extensions() {
        assert!(!is_zone_file_name("..geojson"));
        assert!(!is_zone_file_name(".geojson"));
        assert!(!is_zone_file_name("../secrets.geojson"));
        assert!(!is_zone_file_name("North_Bay.json"));
        assert!(!is_zone_file_name("a/b.geojson"));
        assert!(!is_zone_file_name(".hidden.geojson"));
    }
}
