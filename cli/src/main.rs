//! Plans racelines around racetracks and compares them against reference lines.

#[macro_use]
extern crate log;

mod compare;
mod plan;

use anyhow::Result;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(name = "raceline", about = "Plans a raceline around a racetrack with RRT*")]
enum Command {
    /// Splits a track into chunks, plans a path through each, then joins and smooths the result.
    Plan {
        /// The path to a track CSV file with the columns `# x_m, y_m, w_tr_right_m, w_tr_left_m`
        #[structopt(long)]
        track: String,
        /// The path to a JSON file with planner settings. Anything missing uses the defaults.
        #[structopt(long)]
        config: Option<String>,
        /// Where to write the per-chunk, full, and smoothed paths
        #[structopt(long, default_value = "paths_found")]
        out_dir: String,
        /// How many points the smoothed path should have
        #[structopt(long, default_value = "5000")]
        num_points: usize,
        /// A reference raceline CSV. If present, the smoothed path gets as many points as it has,
        /// overriding --num-points.
        #[structopt(long)]
        reference: Option<String>,
        /// A seed for generating random numbers
        #[structopt(long)]
        rng_seed: Option<u64>,
        /// How many iterations to run the planner for, per chunk
        #[structopt(long)]
        max_iterations: Option<usize>,
        /// How many chunks to split the track into
        #[structopt(long)]
        num_chunks: Option<usize>,
        /// Also reparent existing nodes through each new node when that's cheaper
        #[structopt(long)]
        full_rewire: bool,
        /// The track's last point doesn't connect back to its first
        #[structopt(long)]
        open_track: bool,
    },
    /// Compares a planned path against a reference raceline, truncating both to the same number
    /// of points.
    Compare {
        /// The path to a reference raceline CSV, with `# x_m` and `y_m` columns
        #[structopt(long)]
        reference: String,
        /// The path to a planned path, one `(x, y)` per line
        #[structopt(long)]
        path: String,
    },
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    match Command::from_args() {
        Command::Plan {
            track,
            config,
            out_dir,
            num_points,
            reference,
            rng_seed,
            max_iterations,
            num_chunks,
            full_rewire,
            open_track,
        } => {
            let mut cfg = plan::load_config(config)?;
            if let Some(seed) = rng_seed {
                cfg.rng_seed = seed;
            }
            if let Some(n) = max_iterations {
                cfg.planner.max_iterations = n;
            }
            if let Some(n) = num_chunks {
                cfg.num_chunks = n;
            }
            if full_rewire {
                cfg.planner.rewire = raceline::RewireMode::Full;
            }
            if open_track {
                cfg.closed_track = false;
            }
            let num_points = match reference {
                Some(path) => compare::read_raceline(&path)?.len(),
                None => num_points,
            };
            plan::run(track, cfg, out_dir, num_points)
        }
        Command::Compare { reference, path } => compare::run(reference, path),
    }
}
