use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use catalog::zone_file_name;
use formats::{ZoneDocument, ZoneFeature, ZoneGeometry};
use tools::clean_boundary_geometry;

const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const GEOCODER_USER_AGENT: &str = "service-zones-generator";

#[derive(Parser, Debug)]
#[command(author, version, about = "Service zone data set generator")]
struct Args {
    /// Geocoder base URL (default: public Nominatim)
    #[arg(long)]
    nominatim_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Geocode city boundaries and write one GeoJSON file per service
    Generate {
        /// Services config: JSON object mapping service name -> city list
        #[arg(long, default_value = "service_zones/services.json")]
        services: String,

        /// Output directory for zone documents
        #[arg(long, default_value = "service_zones/zones2")]
        out: String,

        /// Region qualifier appended to every geocoding query
        #[arg(long, default_value = "California, USA")]
        region: String,

        /// Seconds to pause between geocoder requests
        #[arg(long, default_value_t = 1.0)]
        pause_s: f64,

        /// Regenerate only these services (default: all)
        #[arg(long)]
        service: Vec<String>,
    },

    /// Parse every generated zone file and report what it contains
    Verify {
        /// Services config: JSON object mapping service name -> city list
        #[arg(long, default_value = "service_zones/services.json")]
        services: String,

        /// Directory holding the zone documents
        #[arg(long, default_value = "service_zones/zones2")]
        out: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let nominatim_url = args.nominatim_url.unwrap_or_else(|| {
        env::var("NOMINATIM_URL").unwrap_or_else(|_| DEFAULT_NOMINATIM_URL.to_string())
    });

    match args.command {
        Command::Generate {
            services,
            out,
            region,
            pause_s,
            service,
        } => {
            let client = Client::builder().user_agent(GEOCODER_USER_AGENT).build()?;
            generate(
                &client,
                &nominatim_url,
                &services,
                &out,
                &region,
                pause_s,
                &service,
            )
            .await
        }
        Command::Verify { services, out } => verify(&services, &out).await,
    }
}

async fn generate(
    client: &Client,
    nominatim_url: &str,
    services_path: &str,
    out_dir: &str,
    region: &str,
    pause_s: f64,
    only: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let services = load_services(services_path).await?;
    let out_dir = PathBuf::from(out_dir);
    tokio::fs::create_dir_all(&out_dir).await?;

    for (service, cities_val) in &services {
        if !only.is_empty() && !only.iter().any(|s| s == service) {
            continue;
        }

        let cities = city_list(cities_val);
        if cities.is_empty() {
            warn!("service {service} has no cities; skipping");
            continue;
        }

        let mut features = Vec::with_capacity(cities.len());
        for city in &cities {
            info!("fetching boundary for {city} (service {service})");
            match fetch_city_boundary(client, nominatim_url, city, region).await {
                Ok(Some(geometry)) => {
                    let mut properties = Map::new();
                    properties.insert("name".to_string(), Value::String(city.clone()));
                    features.push(ZoneFeature {
                        id: None,
                        properties,
                        geometry,
                    });
                }
                Ok(None) => warn!("boundary not found for {city}"),
                Err(err) => warn!("geocoding failed for {city}: {err}"),
            }
            // Public Nominatim allows at most one request per second.
            tokio::time::sleep(Duration::from_secs_f64(pause_s.max(0.0))).await;
        }

        let document = ZoneDocument { features };
        let path = out_dir.join(zone_file_name(service));
        tokio::fs::write(&path, document.to_geojson_string_pretty()?).await?;
        info!(
            "wrote {} ({} of {} cities)",
            path.display(),
            document.features.len(),
            cities.len()
        );
    }

    Ok(())
}

async fn verify(services_path: &str, out_dir: &str) -> Result<(), Box<dyn std::error::Error>> {
    let services = load_services(services_path).await?;
    let out_dir = PathBuf::from(out_dir);
    let mut missing = 0usize;

    for service in services.keys() {
        let path = out_dir.join(zone_file_name(service));
        let payload = match tokio::fs::read_to_string(&path).await {
            Ok(p) => p,
            Err(err) => {
                warn!("{}: unreadable ({err})", path.display());
                missing += 1;
                continue;
            }
        };
        match ZoneDocument::from_geojson_str(&payload) {
            Ok(doc) => {
                let b = doc.bounds();
                if b.is_empty() {
                    warn!("{service}: document has no coordinates");
                    missing += 1;
                } else {
                    println!(
                        "{service}\t{} features\tlon [{:.4}, {:.4}]\tlat [{:.4}, {:.4}]",
                        doc.features.len(),
                        b.min.lon_deg,
                        b.max.lon_deg,
                        b.min.lat_deg,
                        b.max.lat_deg
                    );
                }
            }
            Err(err) => {
                warn!("{}: parse failed ({err})", path.display());
                missing += 1;
            }
        }
    }

    if missing > 0 {
        return Err(format!("{missing} service(s) without a usable zone document").into());
    }
    Ok(())
}

async fn load_services(path: &str) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
    let payload = tokio::fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&payload)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(format!("{path} must be a JSON object of service -> cities").into()),
    }
}

fn city_list(value: &Value) -> Vec<String> {
    match value {
        // Either a bare city array or an object carrying a "cities" array.
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Value::Object(obj) => obj.get("cities").map(city_list).unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Deserialize)]
struct GeocoderPlace {
    #[serde(default)]
    geojson: Option<Value>,
}

/// Look up one city's boundary polygon.
///
/// Returns `Ok(None)` when the geocoder has no areal result for the
/// query; transport and decode problems are errors.
async fn fetch_city_boundary(
    client: &Client,
    nominatim_url: &str,
    city: &str,
    region: &str,
) -> Result<Option<ZoneGeometry>, Box<dyn std::error::Error>> {
    let url = format!("{}/search", nominatim_url.trim_end_matches('/'));
    let query = format!("{city}, {region}");

    let resp = client
        .get(&url)
        .query(&[
            ("q", query.as_str()),
            ("format", "jsonv2"),
            ("limit", "1"),
            ("polygon_geojson", "1"),
        ])
        .send()
        .await?;
    if !resp.status().is_success() {
        return Err(format!("geocoder answered HTTP {}", resp.status()).into());
    }

    let places: Vec<GeocoderPlace> = resp.json().await?;
    let Some(raw) = places.into_iter().next().and_then(|p| p.geojson) else {
        return Ok(None);
    };

    let geometry = ZoneGeometry::from_geojson_value(&raw)?;
    Ok(clean_boundary_geometry(&geometry))
}

#[cfg(test)]
mod tests {
    use super::city_list;
    use serde_json::json;

    #[test]
    fn city_list_reads_bare_arrays() {
        let v = json!(["Santa Rosa", "Napa"]);
        assert_eq!(city_list(&v), vec!["Santa Rosa", "Napa"]);
    }

    #[test]
    fn city_list_reads_cities_objects() {
        let v = json!({"cities": ["Oakland"], "tier": 2});
        assert_eq!(city_list(&v), vec!["Oakland"]);
    }

    #[test]
    fn city_list_tolerates_junk() {
        assert!(city_list(&json!(42)).is_empty());
        assert!(city_list(&json!({"tier": 2})).is_empty());
    }
}
