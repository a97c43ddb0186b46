use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use abstutil::Timer;
use geom::{Bounds, Distance, PolyLine, Pt2D};
use raceline::{
    output, plan_track, Corridor, OrchestratorConfig, PlanError, PlannerConfig, PlannerRun,
    RewireMode, RrtStar, Track,
};

fn planner(max_iterations: usize) -> PlannerConfig {
    PlannerConfig {
        max_iterations,
        goal_radius: Distance::meters(5.0),
        step_size: Distance::meters(10.0),
        search_radius: Distance::meters(50.0),
        rewire: RewireMode::NewNodeOnly,
        spatial_index: true,
    }
}

fn straight_run(corridor: Corridor, config: PlannerConfig) -> PlannerRun {
    PlannerRun {
        start: Pt2D::new(0.0, 0.0),
        goal: Pt2D::new(100.0, 0.0),
        bounds: Bounds {
            min_x: -10.0,
            min_y: -30.0,
            max_x: 110.0,
            max_y: 30.0,
        },
        corridor,
        config,
    }
}

// A circle of radius 200m, driven counter-clockwise, 10m wide on each side
fn oval(points: usize) -> Track {
    let centerline = (0..points)
        .map(|i| {
            let theta = 2.0 * std::f64::consts::PI * (i as f64) / (points as f64);
            Pt2D::new(200.0 * theta.cos(), 200.0 * theta.sin())
        })
        .collect();
    Track::new(
        "oval".to_string(),
        centerline,
        vec![Distance::meters(10.0); points],
        vec![Distance::meters(10.0); points],
        Distance::meters(1.0),
        true,
    )
    .unwrap()
}

#[test]
fn open_corridor() {
    abstutil::logger::setup_for_tests();
    let mut rrt = RrtStar::new(straight_run(Corridor::unbounded(), planner(2000))).unwrap();
    let stats = rrt.run(&mut XorShiftRng::seed_from_u64(42));
    assert_eq!(stats.iterations, 2000);
    assert!(stats.goal_found_at.is_some());

    let path = rrt.extract_path().unwrap();
    assert_eq!(path[0], Pt2D::new(0.0, 0.0));
    let end = *path.last().unwrap();
    assert!(end.dist_to(Pt2D::new(100.0, 0.0)) <= Distance::meters(5.0));
    let length = PolyLine::new(path.clone()).unwrap().length();
    assert!(length <= Distance::meters(110.0), "path is {} long", length);

    // Every consecutive pair is an edge in the tree
    let goal = rrt.discovered_goal().unwrap();
    assert_eq!(rrt.tree().pos(goal), end);
    let ids = rrt.tree().path_from_root(goal);
    assert_eq!(ids.len(), path.len());
    for pair in ids.windows(2) {
        assert_eq!(rrt.tree().parent(pair[1]), Some(pair[0]));
    }
}

#[test]
fn separated_goal_is_unreachable() {
    let wall = Corridor::new(vec![Pt2D::new(50.0, -1000.0), Pt2D::new(50.0, 1000.0)]).unwrap();
    let mut rrt = RrtStar::new(straight_run(wall, planner(500))).unwrap();
    let stats = rrt.run(&mut XorShiftRng::seed_from_u64(42));
    assert_eq!(stats.iterations, 500);
    assert_eq!(stats.goal_found_at, None);
    assert!(rrt.tree().all_nodes().iter().all(|n| n.pos.x() < 50.0));
    assert_eq!(
        rrt.extract_path(),
        Err(PlanError::GoalUnreached {
            iterations: 500,
            nodes: rrt.tree().len(),
        })
    );
}

#[test]
fn full_rewiring_keeps_a_valid_tree() {
    let mut cfg = planner(1000);
    cfg.rewire = RewireMode::Full;
    let mut rrt = RrtStar::new(straight_run(Corridor::unbounded(), cfg)).unwrap();
    rrt.run(&mut XorShiftRng::seed_from_u64(7));
    rrt.tree().check_invariants().unwrap();
    let path = rrt.extract_path().unwrap();
    assert!(path.last().unwrap().dist_to(Pt2D::new(100.0, 0.0)) <= Distance::meters(5.0));
}

#[test]
fn plan_an_oval() {
    abstutil::logger::setup_for_tests();
    let track = oval(200);
    let mut cfg = OrchestratorConfig::default();
    cfg.planner.max_iterations = 2000;
    let plan = plan_track(
        &track,
        &cfg,
        &mut XorShiftRng::seed_from_u64(42),
        &mut Timer::throwaway(),
    )
    .unwrap();

    assert_eq!(plan.chunks.len(), 10);
    assert_eq!(plan.full_path[0], track.centerline[0]);
    for chunk in &plan.chunks {
        let end = *chunk.path.last().unwrap();
        let goal = track.centerline[chunk.goal_idx];
        assert!(end.dist_to(goal) <= cfg.planner_for_attempt(chunk.attempts - 1).goal_radius);
    }
    // Where two chunks meet, the shared point appears once in the full path, right where the
    // first chunk ends
    let mut offset = 0;
    for pair in plan.chunks.windows(2) {
        let boundary = *pair[0].path.last().unwrap();
        assert_eq!(pair[1].path[0], boundary);
        offset += pair[0].path.len() - 1;
        assert_eq!(plan.full_path[offset], boundary);
        assert_eq!(plan.full_path.iter().filter(|pt| **pt == boundary).count(), 1);
    }
    // Everything stays on the track
    for pt in &plan.full_path {
        let from_center = pt.dist_to(Pt2D::new(0.0, 0.0));
        assert!(from_center > Distance::meters(190.0) && from_center < Distance::meters(210.0));
    }
}

#[test]
fn a_single_chunk_cant_plan_a_whole_lap() {
    let track = oval(200);
    let mut cfg = OrchestratorConfig::default();
    cfg.num_chunks = 1;
    assert_eq!(
        plan_track(
            &track,
            &cfg,
            &mut XorShiftRng::seed_from_u64(42),
            &mut Timer::throwaway(),
        )
        .err(),
        Some(PlanError::WholeLapChunk {
            chunk: 1,
            points: 200,
            track_len: 200,
        })
    );
}

#[test]
fn paths_survive_a_trip_to_disk() {
    let path = vec![
        Pt2D::new(0.0, 0.0),
        Pt2D::new(10.0, 0.25),
        Pt2D::new(-3.5, 1e3),
    ];
    let file = std::env::temp_dir()
        .join("raceline_test_path.txt")
        .to_string_lossy()
        .to_string();
    output::write_path(&file, &path).unwrap();
    assert_eq!(output::read_path(&file).unwrap(), path);
    assert!(output::read_path("/does/not/exist.txt").is_err());
}
