//! Discrete Fréchet distance over the haversine metric.

use crate::geometry::{haversine, Point};

/// Discrete Fréchet distance between two non-empty trajectories, in metres:
/// the minimum over all monotone couplings of the maximum coupled pairwise
/// distance.
pub fn distance(a: &[Point], b: &[Point]) -> f64 {
    assert!(!a.is_empty() && !b.is_empty());
    let cols = b.len();
    let mut f = vec![0.0f64; a.len() * cols];
    for i in 0..a.len() {
        for j in 0..cols {
            let g = haversine(a[i], b[j]);
            f[i * cols + j] = if i == 0 && j == 0 {
                g
            } else if i == 0 {
                g.max(f[j - 1])
            } else if j == 0 {
                g.max(f[(i - 1) * cols])
            } else {
                let diagonal = f[(i - 1) * cols + j - 1];
                let up = f[(i - 1) * cols + j];
                let left = f[i * cols + j - 1];
                g.max(diagonal.min(up).min(left))
            };
        }
    }
    f[a.len() * cols - 1]
}

const UNKNOWN: i8 = 0;
const YES: i8 = 1;
const NO: i8 = -1;

struct Reachability<'t> {
    a: &'t [Point],
    b: &'t [Point],
    eps: f64,
    states: Vec<i8>,
}

impl Reachability<'_> {
    /// Whether a coupling of prefixes `a[..=i]` and `b[..=j]` exists with all
    /// pairs within `eps`. Cells above `eps` are settled without recursing;
    /// otherwise the predecessors are tried diagonal first, then up, then
    /// left, stopping at the first reachable one.
    fn reachable(&mut self, i: usize, j: usize) -> bool {
        let cell = i * self.b.len() + j;
        match self.states[cell] {
            YES => return true,
            NO => return false,
            _ => {}
        }
        let reached = haversine(self.a[i], self.b[j]) <= self.eps
            && ((i == 0 && j == 0)
                || (i > 0 && j > 0 && self.reachable(i - 1, j - 1))
                || (i > 0 && self.reachable(i - 1, j))
                || (j > 0 && self.reachable(i, j - 1)));
        self.states[cell] = if reached { YES } else { NO };
        reached
    }
}

/// Whether the discrete Fréchet distance of two non-empty trajectories is at
/// most `eps` metres, without computing it.
pub fn within(eps: f64, a: &[Point], b: &[Point]) -> bool {
    assert!(!a.is_empty() && !b.is_empty());
    let mut memo = Reachability {
        a,
        b,
        eps,
        states: vec![UNKNOWN; a.len() * b.len()],
    };
    memo.reachable(a.len() - 1, b.len() - 1)
}
