use serde::{Deserialize, Serialize};

use geom::Distance;

use crate::{PlanError, Result};

/// How much of the tree may change when a node is inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewireMode {
    /// Only the new node picks the cheapest feasible parent within the search radius. Existing
    /// nodes keep their parents, so each insertion costs O(nodes within radius).
    NewNodeOnly,
    /// After the new node picks its parent, every neighbor that would be cheaper to reach through
    /// the new node is reparented to it. This is the textbook RRT* rewiring.
    Full,
}

/// Parameters for one RRT* run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Exactly this many sample/extend cycles happen; the run doesn't stop once the goal is found.
    pub max_iterations: usize,
    /// A node this close to the nominal goal counts as reaching it.
    pub goal_radius: Distance,
    /// Every new node is exactly this far from its nearest existing node.
    pub step_size: Distance,
    /// Neighbors this close to a new node are considered when rewiring.
    pub search_radius: Distance,
    pub rewire: RewireMode,
    /// Answer nearest-node and radius queries with an R-tree instead of scanning every node. Both
    /// give identical answers.
    pub spatial_index: bool,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig {
            max_iterations: 7000,
            goal_radius: Distance::meters(12.0),
            step_size: Distance::meters(10.0),
            search_radius: Distance::meters(50.0),
            rewire: RewireMode::NewNodeOnly,
            spatial_index: true,
        }
    }
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(PlanError::InvalidConfig(
                "max_iterations must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("goal_radius", self.goal_radius),
            ("step_size", self.step_size),
            ("search_radius", self.search_radius),
        ] {
            if value <= Distance::ZERO {
                return Err(PlanError::InvalidConfig(format!(
                    "{} must be positive, not {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Parameters for planning a whole track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub planner: PlannerConfig,
    /// The track is split into about this many chunks; the last one absorbs the remainder.
    pub num_chunks: usize,
    /// The sampling area of a chunk is the bounding box of its track limits, grown by this much.
    pub bounds_margin: Distance,
    /// How far inside the track limits the fence sits.
    pub fence_inset: Distance,
    /// How much centerline beyond both ends of a chunk is fenced in, so that the fence's end caps
    /// stay clear of the chunk's start and goal.
    pub fence_padding: Distance,
    /// How many times to try a chunk before giving up on the whole track.
    pub max_attempts: usize,
    /// After a failed attempt, the goal radius and iteration budget are multiplied by this.
    pub retry_growth: f64,
    /// Treat the last point of the track as connected to the first.
    pub closed_track: bool,
    pub rng_seed: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> OrchestratorConfig {
        OrchestratorConfig {
            planner: PlannerConfig::default(),
            num_chunks: 10,
            bounds_margin: Distance::meters(5.0),
            fence_inset: Distance::meters(1.0),
            fence_padding: Distance::meters(30.0),
            max_attempts: 3,
            retry_growth: 1.5,
            closed_track: true,
            rng_seed: 42,
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<()> {
        self.planner.validate()?;
        if self.num_chunks == 0 {
            return Err(PlanError::InvalidConfig(
                "num_chunks must be positive".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(PlanError::InvalidConfig(
                "max_attempts must be positive".to_string(),
            ));
        }
        if !(self.retry_growth >= 1.0) {
            return Err(PlanError::InvalidConfig(format!(
                "retry_growth must be at least 1, not {}",
                self.retry_growth
            )));
        }
        if self.bounds_margin < Distance::ZERO
            || self.fence_inset < Distance::ZERO
            || self.fence_padding < Distance::ZERO
        {
            return Err(PlanError::InvalidConfig(
                "margins, inset, and padding can't be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// The planner settings for a retry. Attempt 0 is the configured planner.
    pub fn planner_for_attempt(&self, attempt: usize) -> PlannerConfig {
        let scale = self.retry_growth.powi(attempt as i32);
        let mut cfg = self.planner.clone();
        cfg.goal_radius = cfg.goal_radius * scale;
        cfg.max_iterations = ((cfg.max_iterations as f64) * scale).round() as usize;
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_grow() {
        let cfg = OrchestratorConfig::default();
        assert_eq!(cfg.planner_for_attempt(0), cfg.planner);
        let second = cfg.planner_for_attempt(1);
        assert_eq!(second.goal_radius, Distance::meters(18.0));
        assert_eq!(second.max_iterations, 10500);
        assert_eq!(second.step_size, cfg.planner.step_size);
    }

    #[test]
    fn validation() {
        assert!(OrchestratorConfig::default().validate().is_ok());

        let mut cfg = OrchestratorConfig::default();
        cfg.planner.step_size = Distance::ZERO;
        assert!(matches!(cfg.validate(), Err(PlanError::InvalidConfig(_))));

        let mut cfg = OrchestratorConfig::default();
        cfg.retry_growth = 0.5;
        assert!(cfg.validate().is_err());

        let mut cfg = OrchestratorConfig::default();
        cfg.max_attempts = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: OrchestratorConfig =
            serde_json::from_str(r#"{"num_chunks": 4, "planner": {"max_iterations": 100}}"#)
                .unwrap();
        assert_eq!(cfg.num_chunks, 4);
        assert_eq!(cfg.planner.max_iterations, 100);
        assert_eq!(cfg.planner.step_size, Distance::meters(10.0));
        assert_eq!(cfg.max_attempts, 3);
    }
}
