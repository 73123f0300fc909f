use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use roaring::RoaringBitmap;

use crate::fingerprint::{self, Configuration};
use crate::geohash;
use crate::geometry::Point;

/// An identified trajectory. Equality and hashing follow the identifier
/// alone; the trajectory is owned by its record.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub trajectory: Vec<Point>,
}

impl Record {
    pub fn new(id: impl Into<String>, trajectory: Vec<Point>) -> Self {
        Self { id: id.into(), trajectory }
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A query trajectory together with the largest Jaccard distance at which a
/// corpus record still qualifies as a match.
#[derive(Debug, Clone)]
pub struct Query {
    pub record: Record,
    pub max_distance: f64,
}

impl Query {
    pub fn new(record: Record, max_distance: f64) -> Self {
        Self { record, max_distance }
    }
}

/// One matching record and its Jaccard distance to the query.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub record: Arc<Record>,
    pub distance: f64,
}

/// All matches of a query, sorted by ascending distance.
#[derive(Debug, Clone)]
pub struct Response {
    pub query: Query,
    pub results: Vec<SearchResult>,
}

/// Jaccard distance between two fingerprint sets.
pub fn jaccard(a: &RoaringBitmap, b: &RoaringBitmap) -> f64 {
    let union = a.union_len(b);
    if union == 0 {
        return 0.0;
    }
    1.0 - a.intersection_len(b) as f64 / union as f64
}

/// Fingerprint postings shared by the index implementations: each record
/// keeps its own bitmap for scoring, and an inverted index maps every
/// fingerprint to the records containing it.
#[derive(Default)]
struct Postings {
    slots: HashMap<String, u32>,
    records: Vec<(Arc<Record>, RoaringBitmap)>,
    inverted: HashMap<u32, Vec<u32>>,
}

impl Postings {
    fn add(&mut self, record: Record, fingerprints: RoaringBitmap) {
        if let Some(&slot) = self.slots.get(&record.id) {
            // Re-adding an identifier replaces the stored trajectory. Equal
            // identifiers fingerprint identically, so the postings stand.
            self.records[slot as usize] = (Arc::new(record), fingerprints);
            return;
        }
        let slot = self.records.len() as u32;
        self.slots.insert(record.id.clone(), slot);
        for fingerprint in fingerprints.iter() {
            self.inverted.entry(fingerprint).or_default().push(slot);
        }
        self.records.push((Arc::new(record), fingerprints));
    }

    fn query(&self, query: Query, fingerprints: &RoaringBitmap) -> Response {
        let mut candidates = Vec::new();
        for fingerprint in fingerprints.iter() {
            if let Some(slots) = self.inverted.get(&fingerprint) {
                candidates.extend_from_slice(slots);
            }
        }
        candidates.sort_unstable();
        candidates.dedup();

        let mut results = Vec::new();
        for slot in candidates {
            let (record, bitmap) = &self.records[slot as usize];
            let distance = jaccard(fingerprints, bitmap);
            if distance <= query.max_distance {
                results.push(SearchResult { record: Arc::clone(record), distance });
            }
        }
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        Response { query, results }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// A corpus of trajectories searchable by fingerprint similarity.
///
/// Ingest everything with [add](Self::add) before the first
/// [query](Self::query); a sealed index may be queried concurrently.
pub trait TrajectoryIndex {
    fn add(&mut self, record: Record);

    fn add_all<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
        Self: Sized,
    {
        for record in records {
            self.add(record);
        }
    }

    fn query(&self, query: Query) -> Response;

    /// Number of indexed records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The plain geohash index: a record's fingerprint set is the set of
/// geohashes of its points, truncated to the dense part of the bitmap space.
pub struct GeohashIndex {
    bits: u32,
    postings: Postings,
}

impl GeohashIndex {
    pub fn new(bits: u32) -> Self {
        assert!(bits <= geohash::MAX_BITS);
        Self { bits, postings: Postings::default() }
    }

    fn extract(&self, trajectory: &[Point]) -> RoaringBitmap {
        let mut fingerprints = RoaringBitmap::new();
        for point in trajectory {
            let hash = geohash::encode(point.lat, point.lon, self.bits);
            fingerprints.insert((hash & 0x0FFF_FFFF) as u32);
        }
        fingerprints
    }
}

impl TrajectoryIndex for GeohashIndex {
    fn add(&mut self, record: Record) {
        let fingerprints = self.extract(&record.trajectory);
        self.postings.add(record, fingerprints);
    }

    fn query(&self, query: Query) -> Response {
        let fingerprints = self.extract(&query.record.trajectory);
        self.postings.query(query, &fingerprints)
    }

    fn len(&self) -> usize {
        self.postings.len()
    }
}

/// The winnowed k-gram index. Compared to [GeohashIndex] it normalises
/// trajectories before hashing and fingerprints the shape of point windows
/// rather than single positions, which makes retrieval robust to sampling
/// rate and keeps the fingerprint sets small.
pub struct GeodabIndex {
    config: Configuration,
    postings: Postings,
}

impl GeodabIndex {
    pub fn new(config: Configuration) -> Self {
        Self { config, postings: Postings::default() }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }
}

impl Default for GeodabIndex {
    fn default() -> Self {
        Self::new(Configuration::default())
    }
}

impl TrajectoryIndex for GeodabIndex {
    fn add(&mut self, record: Record) {
        let fingerprints = fingerprint::fingerprints(&record.trajectory, &self.config);
        self.postings.add(record, fingerprints);
    }

    fn query(&self, query: Query) -> Response {
        let fingerprints = fingerprint::fingerprints(&query.record.trajectory, &self.config);
        self.postings.query(query, &fingerprints)
    }

    fn len(&self) -> usize {
        self.postings.len()
    }
}
