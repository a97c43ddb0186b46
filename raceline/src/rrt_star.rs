use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use abstutil::prettyprint_usize;
use geom::{Bounds, Distance, Pt2D};

use crate::{Corridor, NodeID, PlanError, PlannerConfig, PlanningTree, Result, RewireMode};

/// Everything needed to plan one chunk.
#[derive(Clone, Debug)]
pub struct PlannerRun {
    pub start: Pt2D,
    /// The nominal goal. Whatever node first lands within the goal radius of it is what the
    /// path actually ends at.
    pub goal: Pt2D,
    /// Samples are drawn uniformly from here.
    pub bounds: Bounds,
    pub corridor: Corridor,
    pub config: PlannerConfig,
}

/// What happened to one sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extension {
    Inserted(NodeID),
    /// The step towards the sample would touch the fence.
    Blocked,
    /// The sample is exactly on top of its nearest node, so there's no direction to step in.
    Degenerate,
}

impl Extension {
    pub fn inserted(self) -> bool {
        matches!(self, Extension::Inserted(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunStats {
    pub iterations: usize,
    pub inserted: usize,
    pub blocked: usize,
    pub degenerate: usize,
    /// How many times an existing node, or a new node after its first choice of parent, changed
    /// parents.
    pub reparented: usize,
    /// The iteration that first put a node within the goal radius
    pub goal_found_at: Option<usize>,
    pub cancelled: bool,
}

/// One RRT* run: grows a tree from the start, inside the corridor, towards the goal. Owns its
/// tree; nothing survives the run except the extracted path.
pub struct RrtStar {
    run: PlannerRun,
    tree: PlanningTree,
    // Every node ever inserted within the goal radius, oldest first
    goal_candidates: Vec<NodeID>,
    stats: RunStats,
}

impl RrtStar {
    pub fn new(run: PlannerRun) -> Result<RrtStar> {
        run.config.validate()?;
        if run.bounds.is_empty() {
            return Err(PlanError::InvalidConfig(
                "the sampling bounds are empty".to_string(),
            ));
        }
        let tree = PlanningTree::new(run.start, run.config.spatial_index);
        Ok(RrtStar {
            run,
            tree,
            goal_candidates: Vec::new(),
            stats: RunStats::default(),
        })
    }

    pub fn tree(&self) -> &PlanningTree {
        &self.tree
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.run.config
    }

    pub fn is_feasible(&self, pt1: Pt2D, pt2: Pt2D) -> bool {
        self.run.corridor.is_feasible(pt1, pt2)
    }

    /// Draws uniformly from the sampling bounds.
    pub fn sample_uniform<R: Rng>(&self, rng: &mut R) -> Pt2D {
        let b = &self.run.bounds;
        Pt2D::new(
            rng.gen_range(b.min_x..=b.max_x),
            rng.gen_range(b.min_y..=b.max_y),
        )
    }

    /// A candidate exactly one step from `from` towards `towards`, even if `towards` is closer
    /// than that. None if the two points coincide.
    pub fn steer(&self, from: Pt2D, towards: Pt2D) -> Option<Pt2D> {
        from.project_towards(towards, self.run.config.step_size)
    }

    /// Steps from the nearest node towards the sample. If the step stays inside the corridor, the
    /// new node is inserted and rewired.
    pub fn try_extend(&mut self, sample: Pt2D) -> Extension {
        let nearest = self.tree.nearest(sample);
        let from = self.tree.pos(nearest);
        let candidate = match self.steer(from, sample) {
            Some(pt) => pt,
            None => {
                debug!("Sample {} coincides with {}; no progress", sample, nearest);
                self.stats.degenerate += 1;
                return Extension::Degenerate;
            }
        };
        if !self.is_feasible(from, candidate) {
            self.stats.blocked += 1;
            return Extension::Blocked;
        }

        let id = self.tree.insert(candidate, nearest);
        self.stats.inserted += 1;
        self.rewire(id);

        if candidate.dist_to(self.run.goal) <= self.run.config.goal_radius {
            if self.goal_candidates.is_empty() {
                info!(
                    "Goal radius reached after {} iterations, {} from the goal",
                    prettyprint_usize(self.stats.iterations),
                    candidate.dist_to(self.run.goal)
                );
                self.stats.goal_found_at = Some(self.stats.iterations);
            }
            self.goal_candidates.push(id);
        }

        Extension::Inserted(id)
    }

    /// Considers every other node within the search radius as a parent for the new node, keeping
    /// the cheapest feasible one. With full rewiring, neighbors that become cheaper to reach
    /// through the new node are then reparented to it.
    fn rewire(&mut self, new: NodeID) {
        let pos = self.tree.pos(new);
        let neighbors: Vec<NodeID> = self
            .tree
            .within_radius(pos, self.run.config.search_radius)
            .into_iter()
            .filter(|n| *n != new)
            .collect();

        let mut best_cost = self.tree.cost(new);
        for n in &neighbors {
            if self.tree.parent(new) == Some(*n) {
                continue;
            }
            let n_pos = self.tree.pos(*n);
            if !self.is_feasible(n_pos, pos) {
                continue;
            }
            let cost = self.tree.cost(*n) + n_pos.dist_to(pos);
            if cost < best_cost {
                self.tree.set_parent(new, *n);
                self.stats.reparented += 1;
                best_cost = cost;
            }
        }

        if self.run.config.rewire == RewireMode::Full {
            let new_cost = self.tree.cost(new);
            for n in neighbors {
                // Reparenting an ancestor of the new node would create a cycle
                if n == self.tree.root() || self.tree.is_ancestor_or_self(n, new) {
                    continue;
                }
                let n_pos = self.tree.pos(n);
                if new_cost + pos.dist_to(n_pos) < self.tree.cost(n) && self.is_feasible(pos, n_pos)
                {
                    self.tree.set_parent(n, new);
                    self.stats.reparented += 1;
                }
            }
        }
    }

    /// Runs exactly `max_iterations` sample/extend cycles. Reaching the goal doesn't stop the
    /// run; the remaining iterations keep improving the tree.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> RunStats {
        self.run_until(rng, &AtomicBool::new(false))
    }

    /// Like `run`, but checks `cancel` before every iteration and stops early if it's set.
    pub fn run_until<R: Rng>(&mut self, rng: &mut R, cancel: &AtomicBool) -> RunStats {
        for _ in 0..self.run.config.max_iterations {
            if cancel.load(Ordering::Relaxed) {
                warn!(
                    "Planning cancelled after {} iterations",
                    prettyprint_usize(self.stats.iterations)
                );
                self.stats.cancelled = true;
                break;
            }
            let sample = self.sample_uniform(rng);
            self.try_extend(sample);
            self.stats.iterations += 1;
        }

        info!(
            "{} iterations: {} nodes, {} blocked, {} degenerate, {} reparented",
            prettyprint_usize(self.stats.iterations),
            prettyprint_usize(self.tree.len()),
            prettyprint_usize(self.stats.blocked),
            prettyprint_usize(self.stats.degenerate),
            prettyprint_usize(self.stats.reparented)
        );
        if let Some(goal) = self.discovered_goal() {
            info!("Best path to the goal costs {}", self.tree.cost(goal));
        }
        self.stats.clone()
    }

    /// Of all the nodes that have landed within the goal radius, the one that's currently
    /// cheapest to reach. Ties go to the one found first.
    pub fn discovered_goal(&self) -> Option<NodeID> {
        let mut best: Option<(NodeID, Distance)> = None;
        for id in &self.goal_candidates {
            let cost = self.tree.cost(*id);
            if best.map(|(_, best_cost)| cost < best_cost).unwrap_or(true) {
                best = Some((*id, cost));
            }
        }
        best.map(|(id, _)| id)
    }

    /// The path from the start to the discovered goal.
    pub fn extract_path(&self) -> Result<Vec<Pt2D>> {
        let goal = self
            .discovered_goal()
            .ok_or(PlanError::GoalUnreached {
                iterations: self.stats.iterations,
                nodes: self.tree.len(),
            })?;
        Ok(self
            .tree
            .path_from_root(goal)
            .into_iter()
            .map(|id| self.tree.pos(id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    use super::*;

    fn open_run(config: PlannerConfig) -> PlannerRun {
        PlannerRun {
            start: Pt2D::new(0.0, 0.0),
            goal: Pt2D::new(100.0, 0.0),
            bounds: Bounds {
                min_x: -10.0,
                min_y: -30.0,
                max_x: 110.0,
                max_y: 30.0,
            },
            corridor: Corridor::unbounded(),
            config,
        }
    }

    fn config(max_iterations: usize) -> PlannerConfig {
        PlannerConfig {
            max_iterations,
            goal_radius: Distance::meters(5.0),
            step_size: Distance::meters(10.0),
            search_radius: Distance::meters(25.0),
            rewire: RewireMode::NewNodeOnly,
            spatial_index: true,
        }
    }

    #[test]
    fn steps_are_fixed_length() {
        let rrt = RrtStar::new(open_run(config(1))).unwrap();
        let from = Pt2D::new(0.0, 0.0);
        let near = rrt.steer(from, Pt2D::new(1.0, 0.0)).unwrap();
        assert_eq!(near, Pt2D::new(10.0, 0.0));
        assert_eq!(rrt.steer(from, from), None);
    }

    #[test]
    fn degenerate_sample_makes_no_progress() {
        let mut rrt = RrtStar::new(open_run(config(1))).unwrap();
        assert_eq!(rrt.try_extend(Pt2D::new(0.0, 0.0)), Extension::Degenerate);
        assert_eq!(rrt.tree().len(), 1);
        assert!(rrt.try_extend(Pt2D::new(0.0, 3.0)).inserted());
        assert_eq!(rrt.tree().pos(NodeID(1)), Pt2D::new(0.0, 10.0));
    }

    #[test]
    fn blocked_steps_dont_grow_the_tree() {
        let mut run = open_run(config(1));
        // A wall at x = 5 between the start and everything to the east
        run.corridor = Corridor::new(vec![Pt2D::new(5.0, -100.0), Pt2D::new(5.0, 100.0)]).unwrap();
        let mut rrt = RrtStar::new(run).unwrap();
        assert_eq!(rrt.try_extend(Pt2D::new(50.0, 0.0)), Extension::Blocked);
        assert_eq!(rrt.tree().len(), 1);
        assert!(rrt.try_extend(Pt2D::new(-50.0, 0.0)).inserted());
    }

    #[test]
    fn rewiring_picks_the_cheaper_parent() {
        let mut rrt = RrtStar::new(open_run(config(1))).unwrap();
        // Root at (0, 0); a goes to (0, 10), then b to (0, 20), then c hangs off b at (10, 20)
        let a = match rrt.try_extend(Pt2D::new(0.0, 50.0)) {
            Extension::Inserted(id) => id,
            x => panic!("{:?}", x),
        };
        let b = match rrt.try_extend(Pt2D::new(0.0, 50.0)) {
            Extension::Inserted(id) => id,
            x => panic!("{:?}", x),
        };
        assert_eq!(rrt.tree().parent(b), Some(a));

        // The nearest node to (50, 10) is a, so the new node lands at (10, 10). Going through the
        // root directly is cheaper (14.1) than via a (20), so the new node gets rewired.
        let c = match rrt.try_extend(Pt2D::new(50.0, 10.0)) {
            Extension::Inserted(id) => id,
            x => panic!("{:?}", x),
        };
        assert_eq!(rrt.tree().pos(c), Pt2D::new(10.0, 10.0));
        assert_eq!(rrt.tree().parent(c), Some(rrt.tree().root()));
        assert_eq!(rrt.stats().reparented, 1);
    }

    #[test]
    fn rewiring_never_increases_cost() {
        let slack = Distance::meters(1e-9);
        for rewire in [RewireMode::NewNodeOnly, RewireMode::Full] {
            let mut cfg = config(1);
            cfg.rewire = rewire;
            let mut rrt = RrtStar::new(open_run(cfg)).unwrap();
            let mut rng = XorShiftRng::seed_from_u64(7);
            for _ in 0..300 {
                let before: Vec<Distance> = rrt
                    .tree()
                    .all_nodes()
                    .iter()
                    .map(|n| rrt.tree().cost(n.id))
                    .collect();
                let sample = rrt.sample_uniform(&mut rng);
                let nearest = rrt.tree().nearest(sample);
                if let Extension::Inserted(id) = rrt.try_extend(sample) {
                    // No worse than hanging off the nearest node, where it started
                    let via_nearest = rrt.tree().cost(nearest)
                        + rrt.tree().pos(nearest).dist_to(rrt.tree().pos(id));
                    assert!(rrt.tree().cost(id) <= via_nearest + slack);
                    for (idx, cost) in before.into_iter().enumerate() {
                        assert!(rrt.tree().cost(NodeID(idx)) <= cost + slack);
                    }
                }
            }
            rrt.tree().check_invariants().unwrap();
        }
    }

    #[test]
    fn every_edge_is_feasible() {
        let mut run = open_run(config(2000));
        run.corridor = Corridor::new(vec![
            Pt2D::new(-5.0, 20.0),
            Pt2D::new(50.0, 2.0),
            Pt2D::new(105.0, 20.0),
            Pt2D::new(105.0, -20.0),
            Pt2D::new(50.0, -2.0),
            Pt2D::new(-5.0, -20.0),
        ])
        .unwrap();
        let mut rrt = RrtStar::new(run).unwrap();
        rrt.run(&mut XorShiftRng::seed_from_u64(42));
        for node in rrt.tree().all_nodes() {
            if let Some(parent) = node.parent {
                assert!(rrt.is_feasible(rrt.tree().pos(parent), node.pos));
            }
        }
        rrt.tree().check_invariants().unwrap();
    }

    #[test]
    fn extract_before_goal() {
        let rrt = RrtStar::new(open_run(config(1))).unwrap();
        assert_eq!(
            rrt.extract_path(),
            Err(PlanError::GoalUnreached {
                iterations: 0,
                nodes: 1
            })
        );
    }

    #[test]
    fn cancellation() {
        let mut rrt = RrtStar::new(open_run(config(1000))).unwrap();
        let stats = rrt.run_until(&mut XorShiftRng::seed_from_u64(42), &AtomicBool::new(true));
        assert!(stats.cancelled);
        assert_eq!(stats.iterations, 0);
    }

    #[test]
    fn deterministic_with_a_seed() {
        let path = |spatial_index| {
            let mut cfg = config(1500);
            cfg.spatial_index = spatial_index;
            let mut rrt = RrtStar::new(open_run(cfg)).unwrap();
            rrt.run(&mut XorShiftRng::seed_from_u64(3));
            rrt.extract_path().unwrap()
        };
        assert_eq!(path(true), path(true));
        // The index changes how neighbors are found, not which ones
        assert_eq!(path(true), path(false));
    }
}
