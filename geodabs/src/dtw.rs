//! Dynamic Time Warping over the haversine metric.
//!
//! Kept as a reference baseline for the similarity measures; retrieval and
//! motif search are specified in terms of the discrete Fréchet distance and
//! never consume this.

use crate::geometry::{haversine, Point};

/// DTW distance between two non-empty trajectories: the minimum total
/// coupled pairwise distance over all monotone couplings, in metres.
pub fn distance(a: &[Point], b: &[Point]) -> f64 {
    assert!(!a.is_empty() && !b.is_empty());
    let cols = b.len();
    let mut d = vec![0.0f64; a.len() * cols];
    for i in 0..a.len() {
        for j in 0..cols {
            let cost = haversine(a[i], b[j]);
            d[i * cols + j] = cost
                + if i == 0 && j == 0 {
                    0.0
                } else if i == 0 {
                    d[j - 1]
                } else if j == 0 {
                    d[(i - 1) * cols]
                } else {
                    let diagonal = d[(i - 1) * cols + j - 1];
                    let up = d[(i - 1) * cols + j];
                    let left = d[i * cols + j - 1];
                    diagonal.min(up).min(left)
                };
        }
    }
    d[a.len() * cols - 1]
}

#[cfg(test)]
mod tests {
    use super::distance;
    use crate::assert_eq_float;
    use crate::geometry::{haversine, Point};

    fn meridian(lats: &[f64]) -> Vec<Point> {
        lats.iter().map(|&lat| Point::new(0.0, lat)).collect()
    }

    #[test]
    fn identical_trajectories_cost_nothing() {
        let a = meridian(&[0.0, 1.0, 2.0]);
        assert_eq_float!(distance(&a, &a), 0.0);
    }

    #[test]
    fn accumulates_over_the_coupling() {
        let a = meridian(&[0.0, 1.0]);
        let b = meridian(&[0.0, 2.0]);
        let expected = haversine(Point::new(0.0, 1.0), Point::new(0.0, 2.0));
        assert_eq_float!(distance(&a, &b), expected);
    }

    #[test]
    fn symmetric() {
        let a = meridian(&[0.0, 0.5, 1.0]);
        let b = meridian(&[0.2, 0.6]);
        assert_eq_float!(distance(&a, &b), distance(&b, &a));
    }
}
