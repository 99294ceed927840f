//! Boundary-geometry cleaning for geocoder output.
//!
//! Geocoders hand back polygons with open rings, junk coordinates, and
//! one-element MultiPolygons. Rendering wants none of that:
//! - coordinates outside lon [-180, 180] / lat [-90, 90] are dropped;
//! - rings with fewer than 3 surviving points are dropped;
//! - open rings are closed (first point appended);
//! - a MultiPolygon with a single polygon collapses to a Polygon;
//! - non-areal geometry yields nothing, as do polygons with no usable
//!   outer ring.

use foundation::LonLat;
use formats::ZoneGeometry;

/// Clean a raw boundary geometry, or `None` if nothing usable remains.
pub fn clean_boundary_geometry(geometry: &ZoneGeometry) -> Option<ZoneGeometry> {
    let polygons: Vec<Vec<Vec<LonLat>>> = match geometry {
        ZoneGeometry::Polygon(rings) => clean_polygon(rings).into_iter().collect(),
        ZoneGeometry::MultiPolygon(polys) => {
            polys.iter().filter_map(|rings| clean_polygon(rings)).collect()
        }
        _ => Vec::new(),
    };

    match polygons.len() {
        0 => None,
        1 => Some(ZoneGeometry::Polygon(
            polygons.into_iter().next().expect("one polygon"),
        )),
        _ => Some(ZoneGeometry::MultiPolygon(polygons)),
    }
}

fn clean_polygon(rings: &[Vec<LonLat>]) -> Option<Vec<Vec<LonLat>>> {
    let mut iter = rings.iter();
    let outer = close_ring(iter.next()?)?;

    let mut out = vec![outer];
    // Holes are kept only if they survive cleaning on their own.
    out.extend(iter.filter_map(|ring| close_ring(ring)));
    Some(out)
}

fn close_ring(ring: &[LonLat]) -> Option<Vec<LonLat>> {
    let mut out: Vec<LonLat> = ring.iter().copied().filter(LonLat::is_valid).collect();
    if out.len() < 3 {
        return None;
    }
    if out.first() != out.last() {
        out.push(out[0]);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::clean_boundary_geometry;
    use foundation::LonLat;
    use formats::ZoneGeometry;

    fn p(lon: f64, lat: f64) -> LonLat {
        LonLat::new(lon, lat)
    }

    fn open_triangle() -> Vec<LonLat> {
        vec![p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0)]
    }

    #[test]
    fn closes_open_rings() {
        let geom = ZoneGeometry::Polygon(vec![open_triangle()]);
        let cleaned = clean_boundary_geometry(&geom).expect("cleaned");
        let ZoneGeometry::Polygon(rings) = cleaned else {
            panic!("expected Polygon");
        };
        assert_eq!(rings[0].len(), 4);
        assert_eq!(rings[0].first(), rings[0].last());
    }

    #[test]
    fn already_closed_rings_stay_put() {
        let mut ring = open_triangle();
        ring.push(ring[0]);
        let geom = ZoneGeometry::Polygon(vec![ring.clone()]);
        let cleaned = clean_boundary_geometry(&geom).expect("cleaned");
        let ZoneGeometry::Polygon(rings) = cleaned else {
            panic!("expected Polygon");
        };
        assert_eq!(rings[0], ring);
    }

    #[test]
    fn drops_out_of_range_coordinates() {
        let geom = ZoneGeometry::Polygon(vec![vec![
            p(0.0, 0.0),
            p(200.0, 0.0),
            p(1.0, 0.0),
            p(0.0, 95.0),
            p(1.0, 1.0),
        ]]);
        let cleaned = clean_boundary_geometry(&geom).expect("cleaned");
        let ZoneGeometry::Polygon(rings) = cleaned else {
            panic!("expected Polygon");
        };
        assert!(rings[0]
            .iter()
            .all(|c| c.lon_deg.abs() <= 180.0 && c.lat_deg.abs() <= 90.0));
    }

    #[test]
    fn degenerate_rings_yield_nothing() {
        let geom = ZoneGeometry::Polygon(vec![vec![p(0.0, 0.0), p(1.0, 1.0)]]);
        assert!(clean_boundary_geometry(&geom).is_none());
    }

    #[test]
    fn single_polygon_multipolygon_collapses() {
        let geom = ZoneGeometry::MultiPolygon(vec![vec![open_triangle()]]);
        assert!(matches!(
            clean_boundary_geometry(&geom),
            Some(ZoneGeometry::Polygon(_))
        ));
    }

    #[test]
    fn multi_polygon_with_two_survivors_stays_multi() {
        let shifted: Vec<LonLat> = open_triangle()
            .iter()
            .map(|c| LonLat::new(c.lon_deg + 5.0, c.lat_deg))
            .collect();
        let geom = ZoneGeometry::MultiPolygon(vec![vec![open_triangle()], vec![shifted]]);
        assert!(matches!(
            clean_boundary_geometry(&geom),
            Some(ZoneGeometry::MultiPolygon(_))
        ));
    }

    #[test]
    fn point_geometry_is_not_a_boundary() {
        assert!(clean_boundary_geometry(&ZoneGeometry::Point(p(0.0, 0.0))).is_none());
    }

    #[test]
    fn degenerate_hole_is_dropped_but_outer_survives() {
        let geom = ZoneGeometry::Polygon(vec![open_triangle(), vec![p(0.2, 0.2)]]);
        let cleaned = clean_boundary_geometry(&geom).expect("cleaned");
        let ZoneGeometry::Polygon(rings) = cleaned else {
            panic!("expected Polygon");
        };
        assert_eq!(rings.len(), 1);
    }
}
