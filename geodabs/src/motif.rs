//! Search for the pair of subtrajectories of two trajectories that minimises
//! the discrete Fréchet distance, subject to a minimum length.
//!
//! Three implementations share one contract. [brute_force] recomputes the
//! distance from scratch for every subrange pair and exists as the reference;
//! [dp_brute_force] reuses the pairwise distance matrix and grows the Fréchet
//! recurrence incrementally per start; [bounding] additionally orders starts
//! by a lower bound and prunes with the best distance found so far, and is
//! the variant meant for real inputs.

use crate::frechet;
use crate::geometry::{haversine, Point};

/// A pair of closed-open subranges `a[i..ie]`, `b[j..je]` and the discrete
/// Fréchet distance between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotifPair {
    pub i: usize,
    pub j: usize,
    pub ie: usize,
    pub je: usize,
    pub distance: f64,
}

struct DistanceMatrix {
    data: Vec<f64>,
    cols: usize,
}

impl DistanceMatrix {
    fn new(a: &[Point], b: &[Point]) -> Self {
        let mut data = Vec::with_capacity(a.len() * b.len());
        for &p in a {
            for &q in b {
                data.push(haversine(p, q));
            }
        }
        Self { data, cols: b.len() }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }
}

/// Exhaustive search over all subrange pairs of length at least `e`.
pub fn brute_force(a: &[Point], b: &[Point], e: usize) -> Option<MotifPair> {
    assert!(e > 0);
    let (s, t) = (a.len(), b.len());
    if s < e || t < e {
        return None;
    }
    let mut best: Option<MotifPair> = None;
    for i in 0..=s - e {
        for ie in i + e..=s {
            for j in 0..=t - e {
                for je in j + e..=t {
                    let d = frechet::distance(&a[i..ie], &b[j..je]);
                    if best.map_or(true, |p| d < p.distance) {
                        best = Some(MotifPair { i, j, ie, je, distance: d });
                    }
                }
            }
        }
    }
    best
}

/// Like [brute_force], but shares the pairwise distance matrix across all
/// starts and grows the Fréchet recurrence once per start instead of once per
/// subrange pair.
pub fn dp_brute_force(a: &[Point], b: &[Point], e: usize) -> Option<MotifPair> {
    assert!(e > 0);
    let (s, t) = (a.len(), b.len());
    if s < e || t < e {
        return None;
    }
    let g = DistanceMatrix::new(a, b);
    let mut best: Option<MotifPair> = None;
    let mut prev = vec![0.0f64; t];
    let mut cur = vec![0.0f64; t];

    for i in 0..=s - e {
        for j in 0..=t - e {
            for p in 0..s - i {
                for q in 0..t - j {
                    let gv = g.get(i + p, j + q);
                    let v = if p == 0 && q == 0 {
                        gv
                    } else if p == 0 {
                        gv.max(cur[q - 1])
                    } else if q == 0 {
                        gv.max(prev[0])
                    } else {
                        gv.max(prev[q - 1].min(prev[q]).min(cur[q - 1]))
                    };
                    cur[q] = v;
                    if p + 1 >= e && q + 1 >= e && best.map_or(true, |bp| v < bp.distance) {
                        best = Some(MotifPair {
                            i,
                            j,
                            ie: i + p + 1,
                            je: j + q + 1,
                            distance: v,
                        });
                    }
                }
                std::mem::swap(&mut prev, &mut cur);
            }
        }
    }
    best
}

/// Branch-and-bound over the starts.
///
/// For every start `(i, j)` a lower bound on the distance of any subrange
/// pair beginning there is derived from per-row and per-column minima of the
/// distance matrix: the pair couples `(i, j)` itself, and with `e >= 2` it
/// must cross each of the next `e - 1` rows and columns. Starts are visited
/// in ascending bound order, so the search stops as soon as the best found
/// distance no longer exceeds the next bound.
pub fn bounding(a: &[Point], b: &[Point], e: usize) -> Option<MotifPair> {
    assert!(e > 0);
    let (s, t) = (a.len(), b.len());
    if s < e || t < e {
        return None;
    }
    let g = DistanceMatrix::new(a, b);

    // cmin[i] is the minimum of row i + 1, rmin[j] the minimum of column
    // j + 1: the best possible coupling for a trajectory point one past the
    // corresponding index.
    let mut cmin = vec![f64::INFINITY; s - 1];
    for (i, min) in cmin.iter_mut().enumerate() {
        for j in 0..t {
            *min = min.min(g.get(i + 1, j));
        }
    }
    let mut rmin = vec![f64::INFINITY; t - 1];
    for (j, min) in rmin.iter_mut().enumerate() {
        for i in 0..s {
            *min = min.min(g.get(i, j + 1));
        }
    }

    let mut candidates = Vec::with_capacity((s - e + 1) * (t - e + 1));
    for i in 0..=s - e {
        for j in 0..=t - e {
            let mut lb = g.get(i, j);
            for ii in i..i + e - 1 {
                lb = lb.max(cmin[ii]);
            }
            for jj in j..j + e - 1 {
                lb = lb.max(rmin[jj]);
            }
            candidates.push((lb, i, j));
        }
    }
    // A stable sort keeps equal bounds in (i, j) order, which fixes which of
    // several equally good motifs is reported.
    candidates.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut bsf = f64::INFINITY;
    let mut best: Option<MotifPair> = None;
    let mut prev = vec![0.0f64; t];
    let mut cur = vec![0.0f64; t];

    for &(lb, i, j) in &candidates {
        if bsf <= lb {
            break;
        }
        let mut j_end = t;
        for p in 0..s - i {
            let r = i + p;
            for q in 0..j_end - j {
                let c = j + q;
                let gv = g.get(r, c);
                let v = if p == 0 && q == 0 {
                    gv
                } else if p == 0 {
                    gv.max(cur[q - 1])
                } else if q == 0 {
                    gv.max(prev[0])
                } else {
                    gv.max(prev[q - 1].min(prev[q]).min(cur[q - 1]))
                };
                cur[q] = v;
                if p + 1 >= e && q + 1 >= e && v < bsf {
                    bsf = v;
                    best = Some(MotifPair {
                        i,
                        j,
                        ie: r + 1,
                        je: c + 1,
                        distance: v,
                    });
                }
            }
            std::mem::swap(&mut prev, &mut cur);

            // Every subrange reaching past row r crosses row r + 1, so once
            // bsf is at or below that row's best coupling, longer subranges
            // from this start cannot improve.
            if r + 1 < s && bsf <= cmin[r] {
                break;
            }
            // The same argument caps the columns at the best pair's end.
            if let Some(bp) = best {
                if bp.i == i && bp.j == j && bp.je < t && bsf <= rmin[bp.je - 1] {
                    j_end = j_end.min(bp.je);
                }
            }
        }
    }
    best
}
