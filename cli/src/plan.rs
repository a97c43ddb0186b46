use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;

use abstutil::{prettyprint_usize, Timer};
use geom::PolyLine;
use raceline::{output, OrchestratorConfig, Track};

pub fn load_config(path: Option<String>) -> Result<OrchestratorConfig> {
    let cfg = match path {
        Some(path) => abstutil::read_json::<OrchestratorConfig>(&path)?,
        None => OrchestratorConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

pub fn run(
    track_path: String,
    cfg: OrchestratorConfig,
    out_dir: String,
    num_points: usize,
) -> Result<()> {
    let mut timer = Timer::new(format!("plan {}", track_path));

    timer.start("load track");
    let track = Track::load_csv(&track_path, cfg.fence_inset, cfg.closed_track)?;
    timer.stop("load track");
    info!(
        "{} has {} points{}",
        track.name,
        prettyprint_usize(track.len()),
        if track.closed { ", forming a closed lap" } else { "" }
    );

    abstutil::write_json(&format!("{}/{}_config.json", out_dir, track.name), &cfg)?;

    // Each chunk's path goes to disk as soon as it's found, so a track that fails partway still
    // leaves the chunks before it behind
    let mut rng = XorShiftRng::seed_from_u64(cfg.rng_seed);
    let mut write_err = None;
    let plan = raceline::plan_track_with(&track, &cfg, &mut rng, &mut timer, |chunk| {
        if write_err.is_some() {
            return;
        }
        let path = format!("{}/{}_{}_path.txt", out_dir, track.name, chunk.serial);
        if let Err(err) = output::write_path(&path, &chunk.path) {
            write_err = Some(err);
        }
    });
    if let Some(err) = write_err {
        return Err(err);
    }
    let plan = plan.with_context(|| format!("planning {}", track.name))?;

    output::write_path(
        &format!("{}/{}_ALL_path.txt", out_dir, track.name),
        &plan.full_path,
    )?;

    timer.start("smooth");
    let raw = PolyLine::new(plan.full_path)?;
    let smoothed = raw.smoothed(num_points);
    timer.stop("smooth");
    output::write_path(
        &format!("{}/{}_smoothed_path.txt", out_dir, track.name),
        &smoothed,
    )?;

    let retried = plan.chunks.iter().filter(|c| c.attempts > 1).count();
    timer.note(format!(
        "Raw path is {} long over {} points; {} chunks needed a retry",
        raw.length(),
        prettyprint_usize(raw.points().len()),
        retried
    ));
    if let Ok(pl) = PolyLine::deduping_new(smoothed) {
        timer.note(format!(
            "Smoothed path is {} long over {} points",
            pl.length(),
            prettyprint_usize(num_points)
        ));
    }
    Ok(())
}
