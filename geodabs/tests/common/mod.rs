use std::f64::consts::TAU;

use geodabs::{BBox, Point, EARTH_RADIUS};
use rand::rngs::StdRng;
use rand::Rng;

/// A bounded random walk: the heading drifts by up to `angle` radians per
/// step and every step advances `step` metres.
pub fn random_trajectory(
    bounds: &BBox,
    angle: f64,
    step: f64,
    size: usize,
    rng: &mut StdRng,
) -> Vec<Point> {
    let mut points = Vec::with_capacity(size);
    let mut lon = rng.gen_range(bounds.p1.lon..bounds.p2.lon);
    let mut lat = rng.gen_range(bounds.p1.lat..bounds.p2.lat);
    let mut heading = rng.gen_range(0.0..TAU);
    let step_deg = (step / EARTH_RADIUS).to_degrees();

    for _ in 0..size {
        points.push(Point::new(lon, lat));
        heading += rng.gen_range(-angle..=angle);
        let next_lat = lat + heading.cos() * step_deg;
        let next_lon = lon + heading.sin() * step_deg / lat.to_radians().cos();
        if bounds.contains(Point::new(next_lon, next_lat)) {
            lat = next_lat;
            lon = next_lon;
        } else {
            // Bounce off the edge instead of leaving the bounds.
            heading += TAU / 2.0;
        }
    }
    points
}

pub fn test_bounds() -> BBox {
    BBox::new(Point::new(6.0, 46.0), Point::new(7.0, 47.0))
}
