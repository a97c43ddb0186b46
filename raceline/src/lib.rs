//! Plans a drivable line around a racetrack. The track is split into chunks; each chunk grows an
//! RRT* tree inside a fence that follows the track limits, and the paths found per chunk are
//! stitched together into one path for the whole lap.
//!
//! The pieces, from the bottom up:
//!
//! - `Track` derives the track limits and the fence from a centerline with widths.
//! - `Corridor` answers whether a candidate edge stays inside the fence.
//! - `PlanningTree` is the arena of nodes with parent links.
//! - `RrtStar` grows one tree for one chunk.
//! - `plan_track` runs one `RrtStar` per chunk, in order.

#[macro_use]
extern crate log;

mod config;
mod corridor;
mod error;
pub mod output;
mod rrt_star;
mod segments;
mod track;
mod tree;

pub use crate::config::{OrchestratorConfig, PlannerConfig, RewireMode};
pub use crate::corridor::Corridor;
pub use crate::error::{PlanError, Result};
pub use crate::rrt_star::{Extension, PlannerRun, RrtStar, RunStats};
pub use crate::segments::{
    chunk_ranges, dedupe_adjacent, plan_track, plan_track_with, ChunkResult, TrackPlan,
};
pub use crate::track::Track;
pub use crate::tree::{Node, NodeID, PlanningTree};
