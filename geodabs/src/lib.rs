//! Trajectory fingerprinting and similarity search.
//!
//! A corpus of trajectories is indexed by compact sets of 32-bit
//! fingerprints built with k-gram hashing and winnowing over
//! geohash-normalised points; retrieval ranks candidates by Jaccard distance
//! over their fingerprint bitmaps. Pairwise comparison is served by the
//! discrete Fréchet distance and a bounded search for the most similar
//! subtrajectory pair of two trajectories.

pub use fingerprint::{fingerprints, normalize, Configuration};
pub use geometry::{haversine, BBox, Point, EARTH_RADIUS};
pub use index::{
    jaccard, GeodabIndex, GeohashIndex, Query, Record, Response, SearchResult, TrajectoryIndex,
};
pub use motif::MotifPair;
pub use quadtree::QuadTree;

pub mod dtw;
mod fingerprint;
pub mod frechet;
pub mod geohash;
mod geometry;
mod index;
pub mod motif;
mod quadtree;
mod utils;
