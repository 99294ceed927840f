use crate::bounds::LonLatBounds;
use crate::geo::LonLat;

/// Side length of the world in CSS pixels at zoom 0.
pub const TILE_SIZE_PX: f64 = 256.0;

/// Latitude limit of the spherical Web Mercator projection (degrees).
pub const MAX_MERCATOR_LAT_DEG: f64 = 85.051_128_78;

/// A point in world pixels at zoom 0, origin at the north-west corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WorldPx {
    pub x: f64,
    pub y: f64,
}

/// Camera placement produced by a bounds fit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FitView {
    pub center: LonLat,
    pub zoom: f64,
}

/// Project to world pixels at zoom 0 (EPSG:3857, tile-pyramid convention).
pub fn project(p: LonLat) -> WorldPx {
    let lat = p.lat_deg.clamp(-MAX_MERCATOR_LAT_DEG, MAX_MERCATOR_LAT_DEG);
    let lat_rad = lat.to_radians();
    let x = TILE_SIZE_PX * (0.5 + p.lon_deg / 360.0);
    let y = TILE_SIZE_PX
        * (0.5 - (std::f64::consts::FRAC_PI_4 + lat_rad * 0.5).tan().ln()
            / (2.0 * std::f64::consts::PI));
    WorldPx { x, y }
}

pub fn unproject(p: WorldPx) -> LonLat {
    let lon = (p.x / TILE_SIZE_PX - 0.5) * 360.0;
    let n = (0.5 - p.y / TILE_SIZE_PX) * 2.0 * std::f64::consts::PI;
    let lat = (2.0 * n.exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    LonLat::new(lon, lat)
}

/// Map scale factor relative to zoom 0.
pub fn scale(zoom: f64) -> f64 {
    zoom.exp2()
}

/// Compute the camera placement that fits `bounds` into a viewport.
///
/// Mirrors the tile-map convention: the zoom is the largest whole level at
/// which the projected bounds, inflated by `padding_px` on every side, still
/// fit inside `viewport_px`, capped at `max_zoom`. The center is the
/// projected midpoint of the bounds (not the lon/lat midpoint, which drifts
/// toward the equator for tall boxes).
///
/// Degenerate bounds (a single point) fit at any zoom and resolve to the
/// cap.
pub fn fit_view(
    bounds: LonLatBounds,
    viewport_px: [f64; 2],
    padding_px: f64,
    max_zoom: f64,
) -> Option<FitView> {
    if bounds.is_empty() {
        return None;
    }

    let nw = project(LonLat::new(bounds.min.lon_deg, bounds.max.lat_deg));
    let se = project(LonLat::new(bounds.max.lon_deg, bounds.min.lat_deg));
    let extent_x = (se.x - nw.x).max(0.0);
    let extent_y = (se.y - nw.y).max(0.0);

    let avail_x = viewport_px[0] - 2.0 * padding_px;
    let avail_y = viewport_px[1] - 2.0 * padding_px;

    let zoom = if avail_x <= 0.0 || avail_y <= 0.0 {
        0.0
    } else {
        let zx = zoom_for_extent(extent_x, avail_x);
        let zy = zoom_for_extent(extent_y, avail_y);
        zx.min(zy).floor().clamp(0.0, max_zoom)
    };

    let center = unproject(WorldPx {
        x: 0.5 * (nw.x + se.x),
        y: 0.5 * (nw.y + se.y),
    });

    Some(FitView { center, zoom })
}

fn zoom_for_extent(extent_px_z0: f64, avail_px: f64) -> f64 {
    if extent_px_z0 <= 0.0 {
        return f64::INFINITY;
    }
    (avail_px / extent_px_z0).log2()
}

#[cfg(test)]
mod tests {
    use super::{FitView, fit_view, project, scale, unproject};
    use crate::bounds::LonLatBounds;
    use crate::geo::LonLat;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn projects_origin_to_world_center() {
        let p = project(LonLat::new(0.0, 0.0));
        assert_close(p.x, 128.0, 1e-9);
        assert_close(p.y, 128.0, 1e-9);
    }

    #[test]
    fn projects_date_line_edges() {
        let w = project(LonLat::new(-180.0, 0.0));
        let e = project(LonLat::new(180.0, 0.0));
        assert_close(w.x, 0.0, 1e-9);
        assert_close(e.x, 256.0, 1e-9);
    }

    #[test]
    fn round_trips_within_mercator_range() {
        let p = LonLat::new(-119.42, 36.78);
        let rt = unproject(project(p));
        assert_close(rt.lon_deg, p.lon_deg, 1e-9);
        assert_close(rt.lat_deg, p.lat_deg, 1e-9);
    }

    #[test]
    fn scale_doubles_per_level() {
        assert_close(scale(0.0), 1.0, 1e-12);
        assert_close(scale(3.0), 8.0, 1e-12);
    }

    #[test]
    fn fit_rejects_empty_bounds() {
        assert!(fit_view(LonLatBounds::empty(), [800.0, 600.0], 50.0, 16.0).is_none());
    }

    #[test]
    fn fit_caps_point_bounds_at_max_zoom() {
        let b = LonLatBounds::from_points([LonLat::new(-122.4, 37.8)]);
        let FitView { center, zoom } = fit_view(b, [800.0, 600.0], 50.0, 16.0).expect("fit");
        assert_close(zoom, 16.0, 1e-12);
        assert_close(center.lon_deg, -122.4, 1e-9);
        assert_close(center.lat_deg, 37.8, 1e-9);
    }

    #[test]
    fn fitted_bounds_stay_inside_padded_viewport() {
        let b = LonLatBounds::new(LonLat::new(-123.1, 37.2), LonLat::new(-121.6, 38.6));
        let viewport = [800.0, 600.0];
        let padding = 50.0;
        let FitView { zoom, .. } = fit_view(b, viewport, padding, 16.0).expect("fit");

        let s = scale(zoom);
        let nw = project(LonLat::new(b.min.lon_deg, b.max.lat_deg));
        let se = project(LonLat::new(b.max.lon_deg, b.min.lat_deg));
        assert!((se.x - nw.x) * s <= viewport[0] - 2.0 * padding);
        assert!((se.y - nw.y) * s <= viewport[1] - 2.0 * padding);

        // One level closer in no longer fits.
        let s2 = scale(zoom + 1.0);
        let fits_x = (se.x - nw.x) * s2 <= viewport[0] - 2.0 * padding;
        let fits_y = (se.y - nw.y) * s2 <= viewport[1] - 2.0 * padding;
        assert!(!(fits_x && fits_y));
    }

    #[test]
    fn fit_center_is_projected_midpoint() {
        let b = LonLatBounds::new(LonLat::new(-10.0, 0.0), LonLat::new(10.0, 70.0));
        let FitView { center, .. } = fit_view(b, [800.0, 600.0], 0.0, 18.0).expect("fit");
        assert_close(center.lon_deg, 0.0, 1e-9);
        // Projected midpoint of [0, 70] sits north of the arithmetic one.
        assert!(center.lat_deg > 35.0);
    }

    #[test]
    fn zero_area_viewport_falls_back_to_zoom_zero() {
        let b = LonLatBounds::new(LonLat::new(-1.0, -1.0), LonLat::new(1.0, 1.0));
        let FitView { zoom, .. } = fit_view(b, [80.0, 60.0], 50.0, 16.0).expect("fit");
        assert_close(zoom, 0.0, 1e-12);
    }
}
