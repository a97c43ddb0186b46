use geom::Distance;
use thiserror::Error;

/// Everything that can go wrong while planning. Geometric checks never fail; only running out of
/// budget and malformed input are errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("no node entered the goal radius after {iterations} iterations ({nodes} nodes in the tree)")]
    GoalUnreached { iterations: usize, nodes: usize },

    #[error("the corridor fence has no points")]
    EmptyCorridor,

    #[error("chunk {chunk} is malformed: start index {start_idx} isn't before goal index {goal_idx} on a track of {track_len} points")]
    MalformedChunk {
        chunk: usize,
        start_idx: usize,
        goal_idx: usize,
        track_len: usize,
    },

    #[error("a track of {points} points is too short to split into {chunks} chunks")]
    TrackTooShort { points: usize, chunks: usize },

    #[error("chunk {chunk} covers {points} of the {track_len} points of a closed track, so its goal sits right behind its start; split the track into more chunks")]
    WholeLapChunk {
        chunk: usize,
        points: usize,
        track_len: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("chunk {chunk} never reached its goal in {attempts} attempts; the last one ran {iterations} iterations with a goal radius of {goal_radius}")]
    ChunkFailed {
        chunk: usize,
        attempts: usize,
        iterations: usize,
        goal_radius: Distance,
    },
}

pub type Result<T> = std::result::Result<T, PlanError>;
