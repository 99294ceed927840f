use crate::geo::LonLat;

/// Axis-aligned lon/lat bounding box, grown point by point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLatBounds {
    pub min: LonLat,
    pub max: LonLat,
}

impl LonLatBounds {
    /// An inverted box that any `extend` call will overwrite.
    pub fn empty() -> Self {
        Self {
            min: LonLat::new(f64::INFINITY, f64::INFINITY),
            max: LonLat::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn new(min: LonLat, max: LonLat) -> Self {
        Self { min, max }
    }

    /// True until the first point has been folded in.
    pub fn is_empty(&self) -> bool {
        self.min.lon_deg > self.max.lon_deg || self.min.lat_deg > self.max.lat_deg
    }

    pub fn extend(&mut self, p: LonLat) {
        self.min.lon_deg = self.min.lon_deg.min(p.lon_deg);
        self.min.lat_deg = self.min.lat_deg.min(p.lat_deg);
        self.max.lon_deg = self.max.lon_deg.max(p.lon_deg);
        self.max.lat_deg = self.max.lat_deg.max(p.lat_deg);
    }

    pub fn extend_bounds(&mut self, other: LonLatBounds) {
        if other.is_empty() {
            return;
        }
        self.extend(other.min);
        self.extend(other.max);
    }

    pub fn from_points<I: IntoIterator<Item = LonLat>>(points: I) -> Self {
        let mut b = Self::empty();
        for p in points {
            b.extend(p);
        }
        b
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            0.5 * (self.min.lon_deg + self.max.lon_deg),
            0.5 * (self.min.lat_deg + self.max.lat_deg),
        )
    }

    pub fn width_deg(&self) -> f64 {
        (self.max.lon_deg - self.min.lon_deg).max(0.0)
    }

    pub fn height_deg(&self) -> f64 {
        (self.max.lat_deg - self.min.lat_deg).max(0.0)
    }

    pub fn contains(&self, p: LonLat) -> bool {
        !self.is_empty()
            && p.lon_deg >= self.min.lon_deg
            && p.lon_deg <= self.max.lon_deg
            && p.lat_deg >= self.min.lat_deg
            && p.lat_deg <= self.max.lat_deg
    }
}

#[cfg(test)]
mod tests {
    use super::LonLatBounds;
    use crate::geo::LonLat;

    #[test]
    fn empty_until_first_extend() {
        let mut b = LonLatBounds::empty();
        assert!(b.is_empty());
        b.extend(LonLat::new(-122.4, 37.8));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn extend_grows_in_all_directions() {
        let b = LonLatBounds::from_points([
            LonLat::new(-122.5, 37.7),
            LonLat::new(-122.3, 38.1),
            LonLat::new(-123.0, 37.9),
        ]);
        assert_eq!(b.min.lon_deg, -123.0);
        assert_eq!(b.max.lon_deg, -122.3);
        assert_eq!(b.min.lat_deg, 37.7);
        assert_eq!(b.max.lat_deg, 38.1);
    }

    #[test]
    fn center_is_midpoint() {
        let b = LonLatBounds::new(LonLat::new(-10.0, 20.0), LonLat::new(10.0, 40.0));
        let c = b.center();
        assert_eq!(c.lon_deg, 0.0);
        assert_eq!(c.lat_deg, 30.0);
    }

    #[test]
    fn contains_respects_edges() {
        let b = LonLatBounds::new(LonLat::new(-1.0, -1.0), LonLat::new(1.0, 1.0));
        assert!(b.contains(LonLat::new(1.0, 1.0)));
        assert!(b.contains(LonLat::new(0.0, 0.0)));
        assert!(!b.contains(LonLat::new(1.1, 0.0)));
        assert!(!LonLatBounds::empty().contains(LonLat::new(0.0, 0.0)));
    }
}
