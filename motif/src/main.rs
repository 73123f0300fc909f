use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use geodabs::{frechet, motif, Point};

/// Compare two trajectories: their discrete Fréchet distance and the most
/// similar subtrajectory pair of a minimum length.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First trajectory file (a header line, then `lon,lat` rows)
    first: PathBuf,

    /// Second trajectory file
    second: PathBuf,

    /// Minimum number of points a motif spans in each trajectory
    #[arg(short = 'e', long, default_value_t = 5)]
    min_length: usize,
}

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

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let first = read_trajectory(&args.first)?;
    let second = read_trajectory(&args.second)?;

    println!(
        "fréchet distance: {:.1} m ({} and {} points)",
        frechet::distance(&first, &second),
        first.len(),
        second.len(),
    );

    match motif::bounding(&first, &second, args.min_length) {
        Some(pair) => println!(
            "motif: {} -- {} | {} -- {} -> {:.1} m",
            pair.i, pair.ie, pair.j, pair.je, pair.distance,
        ),
        None => println!("no motif of length {} exists", args.min_length),
    }

    Ok(())
}
