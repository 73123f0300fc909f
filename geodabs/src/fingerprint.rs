use std::io::Cursor;

use roaring::RoaringBitmap;

use crate::geohash;
use crate::geometry::Point;

/// Parameters of the fingerprint pipeline.
///
/// A trajectory is first snapped to geohash-cell centres and run-length
/// compressed, then every window of `gram_length` consecutive points is
/// hashed into a 32-bit fingerprint, and winnowing keeps one fingerprint out
/// of every `winnow_span - gram_length + 1` consecutive ones.
#[derive(Debug, Clone)]
pub struct Configuration {
    bits: u32,
    k: usize,
    t: usize,
}

impl Configuration {
    pub fn new() -> Self {
        Self { bits: 40, k: 4, t: 8 }
    }

    /// Geohash precision, in bits, used to snap points before hashing.
    pub fn with_precision(mut self, bits: u32) -> Self {
        assert!(bits <= geohash::MAX_BITS);
        self.bits = bits;
        self
    }

    /// Number of consecutive points hashed into one fingerprint.
    pub fn with_gram_length(mut self, k: usize) -> Self {
        assert!(k >= 1);
        self.k = k;
        self
    }

    /// Number of consecutive points a winnowing window spans. Must be at
    /// least the gram length.
    pub fn with_winnow_span(mut self, t: usize) -> Self {
        assert!(t >= 1);
        self.t = t;
        self
    }

    pub fn precision(&self) -> u32 {
        self.bits
    }

    pub fn gram_length(&self) -> usize {
        self.k
    }

    pub fn winnow_span(&self) -> usize {
        self.t
    }

    fn window(&self) -> usize {
        self.t - self.k + 1
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

/// Snaps every point to the centre of its geohash cell and removes
/// consecutive duplicates, keeping the first of each run. Idempotent.
pub fn normalize(points: &[Point], bits: u32) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        let cell = geohash::decode(geohash::encode(point.lat, point.lon, bits));
        let snapped = Point::new(cell.lng, cell.lat);
        if out.last() != Some(&snapped) {
            out.push(snapped);
        }
    }
    out
}

/// 32-bit fingerprint of one k-gram: the high half locates the gram (a 16-bit
/// geohash of the mean point), the low half identifies its shape (Murmur3 of
/// the raw coordinates).
fn gram_fingerprint(window: &[Point]) -> u32 {
    let n = window.len() as f64;
    let mean_lat = window.iter().map(|p| p.lat).sum::<f64>() / n;
    let mean_lng = window.iter().map(|p| p.lon).sum::<f64>() / n;
    let h16 = (geohash::encode(mean_lat, mean_lng, 16) & 0xffff) as u32;

    let mut bytes = Vec::with_capacity(window.len() * 16);
    for point in window {
        bytes.extend_from_slice(&point.lon.to_le_bytes());
        bytes.extend_from_slice(&point.lat.to_le_bytes());
    }
    let m16 = murmur3::murmur3_32(&mut Cursor::new(bytes), 0)
        .expect("hashing an in-memory buffer cannot fail");

    (h16 << 16) | (m16 & 0xffff)
}

/// Leftmost minimum of a window.
fn window_min(window: &[u32]) -> u32 {
    let mut min = window[0];
    for &value in &window[1..] {
        if value < min {
            min = value;
        }
    }
    min
}

fn winnow(grams: &[u32], window: usize) -> RoaringBitmap {
    let mut selected = RoaringBitmap::new();
    if grams.is_empty() {
        return selected;
    }
    if grams.len() <= window {
        selected.insert(window_min(grams));
        return selected;
    }
    for candidates in grams.windows(window) {
        selected.insert(window_min(candidates));
    }
    selected
}

/// The winnowed fingerprint set of a trajectory.
///
/// Trajectories shorter than one gram are hashed as a single undersized gram,
/// so every non-empty trajectory has a non-empty fingerprint set.
pub fn fingerprints(points: &[Point], config: &Configuration) -> RoaringBitmap {
    assert!(
        config.t >= config.k,
        "winnow span {} is shorter than the gram length {}",
        config.t,
        config.k
    );
    let normalized = normalize(points, config.bits);
    if normalized.is_empty() {
        return RoaringBitmap::new();
    }
    let grams: Vec<u32> = if normalized.len() < config.k {
        vec![gram_fingerprint(&normalized)]
    } else {
        normalized.windows(config.k).map(gram_fingerprint).collect()
    };
    winnow(&grams, config.window())
}

#[cfg(test)]
mod tests {
    use roaring::RoaringBitmap;

    use super::{fingerprints, gram_fingerprint, normalize, winnow, Configuration};
    use crate::geometry::Point;

    #[test]
    fn winnow_keeps_leftmost_window_minimum() {
        // k = 2 and t = 4 give a window of 3 fingerprints.
        let selected = winnow(&[5, 2, 7, 1, 6, 3], 3);
        assert_eq!(selected, RoaringBitmap::from_iter([1u32, 2]));
    }

    #[test]
    fn winnow_short_input_is_a_single_window() {
        assert_eq!(winnow(&[9, 4], 5), RoaringBitmap::from_iter([4u32]));
        assert_eq!(winnow(&[], 5), RoaringBitmap::new());
    }

    #[test]
    fn winnow_density_is_bounded() {
        let grams: Vec<u32> = (0..1000u32).map(|i| i.wrapping_mul(2_654_435_761)).collect();
        let window = 5;
        let selected = winnow(&grams, window);
        // Expected density is 2 / (w + 1); allow generous slack.
        assert!(selected.len() <= (grams.len() / 2) as u64);
        assert!(!selected.is_empty());
    }

    #[test]
    fn normalize_is_idempotent() {
        let points = [
            Point::new(6.63, 46.52),
            Point::new(6.6300001, 46.5200001),
            Point::new(6.64, 46.53),
        ];
        let once = normalize(&points, 40);
        let twice = normalize(&once, 40);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_collapses_consecutive_duplicates() {
        // Two nearly identical positions snap to the same cell at a coarse
        // precision and collapse to one.
        let points = [
            Point::new(6.63, 46.52),
            Point::new(6.6300001, 46.5200001),
            Point::new(8.55, 47.37),
        ];
        assert_eq!(normalize(&points, 30).len(), 2);
    }

    #[test]
    fn gram_fingerprint_is_deterministic() {
        let window = [Point::new(6.63, 46.52), Point::new(6.64, 46.53)];
        assert_eq!(gram_fingerprint(&window), gram_fingerprint(&window));
        let other = [Point::new(6.63, 46.52), Point::new(6.64, 46.54)];
        assert_ne!(gram_fingerprint(&window), gram_fingerprint(&other));
    }

    #[test]
    fn fingerprints_of_a_short_trajectory_are_not_empty() {
        let config = Configuration::new();
        let points = [Point::new(6.63, 46.52)];
        assert!(!fingerprints(&points, &config).is_empty());
    }

    #[test]
    fn fingerprints_depend_on_trajectory_alone() {
        let config = Configuration::new().with_gram_length(2).with_winnow_span(4);
        let points: Vec<Point> = (0..20)
            .map(|i| Point::new(6.63 + i as f64 * 0.01, 46.52 + i as f64 * 0.005))
            .collect();
        let a = fingerprints(&points, &config);
        let b = fingerprints(&points, &config);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
