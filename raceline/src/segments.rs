use rand::Rng;

use abstutil::{prettyprint_usize, Timer};
use geom::Pt2D;

use crate::{
    Corridor, OrchestratorConfig, PlanError, PlannerRun, Result, RrtStar, RunStats, Track,
};

/// One chunk of the track, planned.
#[derive(Clone, Debug)]
pub struct ChunkResult {
    /// Counting from 1
    pub serial: usize,
    pub start_idx: usize,
    pub goal_idx: usize,
    /// From the chunk's start to its discovered goal
    pub path: Vec<Pt2D>,
    /// Including the one that succeeded
    pub attempts: usize,
    pub stats: RunStats,
}

pub struct TrackPlan {
    pub chunks: Vec<ChunkResult>,
    /// Every chunk's path joined together, without the repeated point where consecutive chunks
    /// meet.
    pub full_path: Vec<Pt2D>,
}

/// Splits a track of `len` points into consecutive `(start_idx, goal_idx)` ranges. Every chunk
/// covers `len / num_chunks` points; the last one runs to the final point. When the remainder is
/// a single point, there's nothing left to plan and no chunk for it.
pub fn chunk_ranges(len: usize, num_chunks: usize) -> Result<Vec<(usize, usize)>> {
    if num_chunks == 0 {
        return Err(PlanError::InvalidConfig(
            "num_chunks must be positive".to_string(),
        ));
    }
    let chunk_len = len / num_chunks;
    if chunk_len == 0 {
        return Err(PlanError::TrackTooShort {
            points: len,
            chunks: num_chunks,
        });
    }

    let mut ranges = Vec::new();
    let mut start = 0;
    let mut serial = 1;
    loop {
        if serial * chunk_len < len {
            ranges.push((start, serial * chunk_len));
            start = serial * chunk_len;
            serial += 1;
        } else {
            if start < len - 1 {
                ranges.push((start, len - 1));
            }
            return Ok(ranges);
        }
    }
}

/// Removes consecutive repeats, keeping the first of each run. Points that repeat later, like
/// the start of a closed lap, stay.
pub fn dedupe_adjacent(mut pts: Vec<Pt2D>) -> Vec<Pt2D> {
    pts.dedup();
    pts
}

/// Plans every chunk of the track in order. Each chunk starts from wherever the previous one's
/// tree actually reached the goal, not from the nominal centerline point. A chunk that never
/// reaches its goal is retried with a larger goal radius and iteration budget; if every attempt
/// fails, so does the whole track.
pub fn plan_track<R: Rng>(
    track: &Track,
    cfg: &OrchestratorConfig,
    rng: &mut R,
    timer: &mut Timer,
) -> Result<TrackPlan> {
    plan_track_with(track, cfg, rng, timer, |_| {})
}

/// Like `plan_track`, but hands every chunk to `on_chunk` as soon as it's planned. Chunks that
/// finished before a later one fails have still been seen.
pub fn plan_track_with<R: Rng, F: FnMut(&ChunkResult)>(
    track: &Track,
    cfg: &OrchestratorConfig,
    rng: &mut R,
    timer: &mut Timer,
    mut on_chunk: F,
) -> Result<TrackPlan> {
    cfg.validate()?;
    let ranges = chunk_ranges(track.len(), cfg.num_chunks)?;
    if track.closed {
        for (idx, (start_idx, goal_idx)) in ranges.iter().enumerate() {
            // A lap needs at least two points outside the chunk, or the goal is adjacent to the
            // start
            if track.len() - (goal_idx - start_idx) <= 2 {
                return Err(PlanError::WholeLapChunk {
                    chunk: idx + 1,
                    points: goal_idx - start_idx + 1,
                    track_len: track.len(),
                });
            }
        }
    }
    info!(
        "Planning {} ({} points) in {} chunks",
        track.name,
        prettyprint_usize(track.len()),
        ranges.len()
    );

    let mut chunks = Vec::new();
    let mut full_path = Vec::new();
    let mut start = track.centerline[0];
    for (idx, (start_idx, goal_idx)) in ranges.into_iter().enumerate() {
        let serial = idx + 1;
        timer.start(format!("plan chunk {}", serial));
        let result = plan_chunk(track, cfg, serial, start_idx, goal_idx, start, rng);
        timer.stop(format!("plan chunk {}", serial));
        let result = result?;
        if result.attempts > 1 {
            timer.warn(format!(
                "Chunk {} only reached its goal on attempt {}",
                serial, result.attempts
            ));
        }

        if let Some(pt) = result.path.last() {
            start = *pt;
        }
        full_path.extend(result.path.iter().cloned());
        on_chunk(&result);
        chunks.push(result);
    }

    let full_path = dedupe_adjacent(full_path);
    timer.note(format!(
        "{} chunks planned, {} points in the full path",
        chunks.len(),
        prettyprint_usize(full_path.len())
    ));
    Ok(TrackPlan { chunks, full_path })
}

fn plan_chunk<R: Rng>(
    track: &Track,
    cfg: &OrchestratorConfig,
    serial: usize,
    start_idx: usize,
    goal_idx: usize,
    start: Pt2D,
    rng: &mut R,
) -> Result<ChunkResult> {
    if start_idx >= goal_idx || goal_idx >= track.len() {
        return Err(PlanError::MalformedChunk {
            chunk: serial,
            start_idx,
            goal_idx,
            track_len: track.len(),
        });
    }

    let corridor = Corridor::new(track.fence_ring(start_idx, goal_idx, cfg.fence_padding))?;
    let bounds = track.slice_bounds(start_idx, goal_idx, cfg.bounds_margin);
    let goal = track.centerline[goal_idx];
    info!(
        "Chunk {}: points {} to {}, from {} towards {}, sampling x in [{:.1}, {:.1}], y in [{:.1}, {:.1}]",
        serial,
        start_idx,
        goal_idx,
        start,
        goal,
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y
    );

    let mut last_stats = RunStats::default();
    let mut last_goal_radius = cfg.planner.goal_radius;
    for attempt in 0..cfg.max_attempts {
        let config = cfg.planner_for_attempt(attempt);
        if attempt > 0 {
            warn!(
                "Retrying chunk {} (attempt {} of {}) with a goal radius of {} and {} iterations",
                serial,
                attempt + 1,
                cfg.max_attempts,
                config.goal_radius,
                prettyprint_usize(config.max_iterations)
            );
        }
        last_goal_radius = config.goal_radius;

        let mut rrt = RrtStar::new(PlannerRun {
            start,
            goal,
            bounds: bounds.clone(),
            corridor: corridor.clone(),
            config,
        })?;
        let stats = rrt.run(rng);
        match rrt.extract_path() {
            Ok(path) => {
                info!("Chunk {} path has {} points", serial, path.len());
                return Ok(ChunkResult {
                    serial,
                    start_idx,
                    goal_idx,
                    path,
                    attempts: attempt + 1,
                    stats,
                });
            }
            Err(PlanError::GoalUnreached { .. }) => {
                warn!(
                    "Chunk {} didn't reach its goal after {} iterations",
                    serial,
                    prettyprint_usize(stats.iterations)
                );
                last_stats = stats;
            }
            Err(err) => {
                return Err(err);
            }
        }
    }

    Err(PlanError::ChunkFailed {
        chunk: serial,
        attempts: cfg.max_attempts,
        iterations: last_stats.iterations,
        goal_radius: last_goal_radius,
    })
}
