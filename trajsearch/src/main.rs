use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use geodabs::{
    Configuration, GeodabIndex, GeohashIndex, Point, Query, Record, Response, TrajectoryIndex,
};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Algorithm {
    Geodab,
    Geohash,
}

impl TryFrom<&str> for Algorithm {
    type Error = &'static str;

    fn try_from(value: &str) -> Result<Algorithm, Self::Error> {
        match value {
            "geodab" => Ok(Algorithm::Geodab),
            "geohash" => Ok(Algorithm::Geohash),
            _ => Err("algorithm must be either 'geodab' or 'geohash'"),
        }
    }
}

/// Index a corpus of trajectories and execute a query manifest against it.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding one CSV trajectory file per record
    corpus: PathBuf,

    /// Query manifest with one `<identifier> <max distance>` pair per line
    manifest: PathBuf,

    /// Directory the response files are written to
    output: PathBuf,

    /// Fingerprinting scheme
    #[arg(short, long, value_parser = |s: &str| Algorithm::try_from(s), default_value = "geodab")]
    algorithm: Algorithm,

    /// Geohash precision, in bits, used to quantise points
    #[arg(short, long, default_value_t = 40)]
    bits: u32,

    /// Number of consecutive points hashed into one fingerprint
    #[arg(short = 'k', long, default_value_t = 4)]
    gram_length: usize,

    /// Number of consecutive points a winnowing window spans
    #[arg(short = 't', long, default_value_t = 8)]
    winnow_span: usize,
}

/// Reads a trajectory file: a header line followed by `lon,lat` rows.
fn read_trajectory(path: &Path) -> anyhow::Result<Vec<Point>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut points = Vec::new();
    for row in reader.records() {
        let row = row.context("reading a trajectory row")?;
        let lon: f64 = row
            .get(0)
            .context("missing longitude column")?
            .trim()
            .parse()
            .context("parsing longitude")?;
        let lat: f64 = row
            .get(1)
            .context("missing latitude column")?
            .trim()
            .parse()
            .context("parsing latitude")?;
        points.push(Point::new(lon, lat));
    }
    if points.is_empty() {
        bail!("{} contains no points", path.display());
    }
    Ok(points)
}

fn read_manifest(path: &Path) -> anyhow::Result<Vec<(String, f64)>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut queries = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.context("reading the manifest")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let id = parts
            .next()
            .with_context(|| format!("manifest line {}: missing identifier", number + 1))?;
        let distance: f64 = parts
            .next()
            .with_context(|| format!("manifest line {}: missing distance threshold", number + 1))?
            .parse()
            .with_context(|| format!("manifest line {}: invalid distance threshold", number + 1))?;
        queries.push((id.to_string(), distance));
    }
    Ok(queries)
}

fn record_id(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn write_response(dir: &Path, response: &Response) -> anyhow::Result<()> {
    let path = dir.join(format!("{}.txt", response.query.record.id));
    let mut out = BufWriter::new(
        File::create(&path).with_context(|| format!("creating {}", path.display()))?,
    );
    for result in &response.results {
        writeln!(out, "{}", result.record.id)?;
    }
    Ok(())
}

pub fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.winnow_span < args.gram_length {
        bail!(
            "winnow span {} is shorter than the gram length {}",
            args.winnow_span,
            args.gram_length
        );
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(&args.corpus)
        .with_context(|| format!("listing {}", args.corpus.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();
    if paths.is_empty() {
        bail!("no trajectory files in {}", args.corpus.display());
    }

    let config = Configuration::new()
        .with_precision(args.bits)
        .with_gram_length(args.gram_length)
        .with_winnow_span(args.winnow_span);
    let mut index: Box<dyn TrajectoryIndex> = match args.algorithm {
        Algorithm::Geodab => Box::new(GeodabIndex::new(config)),
        Algorithm::Geohash => Box::new(GeohashIndex::new(args.bits)),
    };

    let started = Instant::now();
    for path in &paths {
        let trajectory =
            read_trajectory(path).with_context(|| format!("reading {}", path.display()))?;
        debug!("indexing {} ({} points)", path.display(), trajectory.len());
        index.add(Record::new(record_id(path), trajectory));
    }
    info!("indexed {} records in {:.1?}", index.len(), started.elapsed());

    let queries = read_manifest(&args.manifest)?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let started = Instant::now();
    let count = queries.len();
    for (id, distance) in queries {
        let path = args.corpus.join(&id);
        let trajectory =
            read_trajectory(&path).with_context(|| format!("reading query {}", path.display()))?;
        let query = Query::new(Record::new(record_id(&path), trajectory), distance);
        let response = index.query(query);
        debug!(
            "query {} matched {} records",
            response.query.record.id,
            response.results.len()
        );
        write_response(&args.output, &response)?;
    }
    info!("executed {} queries in {:.1?}", count, started.elapsed());

    Ok(())
}
