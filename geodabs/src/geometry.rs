use std::hash::{Hash, Hasher};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// A position on the WGS-84 sphere, in degrees.
///
/// Equality and hashing are bitwise on both coordinates, so a [Point] can be
/// used as a set or map key.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.lon.to_bits() == other.lon.to_bits() && self.lat.to_bits() == other.lat.to_bits()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lon.to_bits().hash(state);
        self.lat.to_bits().hash(state);
    }
}

/// Great-circle distance between two points, in metres.
pub fn haversine(p1: Point, p2: Point) -> f64 {
    let phi1 = p1.lat.to_radians();
    let phi2 = p2.lat.to_radians();
    let d_phi = (p2.lat - p1.lat).to_radians();
    let d_lambda = (p2.lon - p1.lon).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);

    // The clamp guards against rounding pushing `a` slightly above 1.
    2.0 * EARTH_RADIUS * a.sqrt().min(1.0).asin()
}

/// An axis-aligned box with `p1` at the south-west corner and `p2` at the
/// north-east corner. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub p1: Point,
    pub p2: Point,
    width: f64,
    height: f64,
}

impl BBox {
    /// Builds a box from two opposite corners, in any order.
    pub fn new(a: Point, b: Point) -> Self {
        let p1 = Point::new(a.lon.min(b.lon), a.lat.min(b.lat));
        let p2 = Point::new(a.lon.max(b.lon), a.lat.max(b.lat));
        Self {
            p1,
            p2,
            width: p2.lon - p1.lon,
            height: p2.lat - p1.lat,
        }
    }

    /// A box spanning at least `radius` metres in every direction around
    /// `center`. The longitude extent widens with latitude so the box stays a
    /// superset of the metric circle.
    pub fn around(center: Point, radius: f64) -> Self {
        let d_lat = (radius / EARTH_RADIUS).to_degrees();
        let cos_lat = center.lat.to_radians().cos().max(1e-12);
        let d_lon = d_lat / cos_lat;
        Self::new(
            Point::new(center.lon - d_lon, center.lat - d_lat),
            Point::new(center.lon + d_lon, center.lat + d_lat),
        )
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        self.p1.lon <= p.lon && p.lon <= self.p2.lon && self.p1.lat <= p.lat && p.lat <= self.p2.lat
    }

    pub fn overlap(&self, other: &BBox) -> bool {
        self.p1.lon <= other.p2.lon
            && other.p1.lon <= self.p2.lon
            && self.p1.lat <= other.p2.lat
            && other.p1.lat <= self.p2.lat
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_eq_float;

    use super::{haversine, BBox, Point};

    #[test]
    fn haversine_zero() {
        let p = Point::new(0.0, 0.0);
        assert_eq_float!(haversine(p, p), 0.0);
    }

    #[test]
    fn haversine_quarter_meridian() {
        let equator = Point::new(0.0, 0.0);
        let pole = Point::new(0.0, 90.0);
        assert_eq_float!(haversine(equator, pole), 10_007_543.0, 1.0);
    }

    #[test]
    fn haversine_symmetric() {
        let a = Point::new(6.63, 46.52);
        let b = Point::new(8.55, 47.37);
        assert_eq_float!(haversine(a, b), haversine(b, a));
    }

    #[test]
    fn point_equality_is_bitwise() {
        assert_eq!(Point::new(1.0, 2.0), Point::new(1.0, 2.0));
        assert_ne!(Point::new(1.0, 2.0), Point::new(1.0 + f64::EPSILON, 2.0));
        assert_ne!(Point::new(0.0, 0.0), Point::new(-0.0, 0.0));
    }

    #[test]
    fn bbox_contains_is_inclusive() {
        let b = BBox::new(Point::new(0.0, 0.0), Point::new(2.0, 1.0));
        assert!(b.contains(Point::new(0.0, 0.0)));
        assert!(b.contains(Point::new(2.0, 1.0)));
        assert!(b.contains(Point::new(1.0, 0.5)));
        assert!(!b.contains(Point::new(2.1, 0.5)));
        assert!(!b.contains(Point::new(1.0, -0.1)));
    }

    #[test]
    fn bbox_normalizes_corners() {
        let b = BBox::new(Point::new(2.0, 1.0), Point::new(0.0, 0.0));
        assert_eq_float!(b.p1.lon, 0.0);
        assert_eq_float!(b.p2.lat, 1.0);
        assert_eq_float!(b.width(), 2.0);
        assert_eq_float!(b.height(), 1.0);
    }

    #[test]
    fn bbox_overlap() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let b = BBox::new(Point::new(1.0, 1.0), Point::new(3.0, 3.0));
        let c = BBox::new(Point::new(2.5, 2.5), Point::new(4.0, 4.0));
        assert!(a.overlap(&b));
        assert!(b.overlap(&a));
        assert!(b.overlap(&c));
        assert!(!a.overlap(&c));
        // Touching edges count as overlapping.
        let d = BBox::new(Point::new(2.0, 0.0), Point::new(3.0, 2.0));
        assert!(a.overlap(&d));
    }

    #[test]
    fn bbox_around_contains_circle() {
        let center = Point::new(6.63, 46.52);
        let b = BBox::around(center, 1000.0);
        for (dx, dy) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
            let p = Point::new(
                center.lon + dx * b.width() / 2.0,
                center.lat + dy * b.height() / 2.0,
            );
            assert!(b.contains(p));
        }
        assert!(haversine(center, Point::new(center.lon, b.p2.lat)) >= 999.9);
    }
}
