use std::io::Read;

use anyhow::{bail, Context, Result};
use fs_err::File;
use serde::Deserialize;

use abstutil::prettyprint_usize;
use geom::{PolyLine, Pt2D};
use raceline::output;

#[derive(Deserialize)]
struct Record {
    #[serde(rename = "# x_m")]
    x: f64,
    #[serde(rename = "y_m")]
    y: f64,
}

/// Reads the x and y columns of a reference raceline CSV, ignoring anything else.
pub fn read_raceline(path: &str) -> Result<Vec<Pt2D>> {
    parse_raceline(File::open(path)?).with_context(|| format!("reading {}", path))
}

fn parse_raceline<R: Read>(reader: R) -> Result<Vec<Pt2D>> {
    let mut pts = Vec::new();
    for (idx, rec) in csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .enumerate()
    {
        let rec: Record = rec?;
        if !rec.x.is_finite() || !rec.y.is_finite() {
            bail!("Row {} has a value that isn't a finite number", idx + 1);
        }
        pts.push(Pt2D::new(rec.x, rec.y));
    }
    Ok(pts)
}

pub fn run(reference: String, path: String) -> Result<()> {
    let mut reference_pts = read_raceline(&reference)?;
    let mut planned_pts = output::read_path(&path)?;
    if reference_pts.len() != planned_pts.len() {
        let len = reference_pts.len().min(planned_pts.len());
        warn!(
            "{} has {} points and {} has {}; only comparing the first {}",
            reference,
            prettyprint_usize(reference_pts.len()),
            path,
            prettyprint_usize(planned_pts.len()),
            prettyprint_usize(len)
        );
        reference_pts.truncate(len);
        planned_pts.truncate(len);
    }

    let reference_pl =
        PolyLine::deduping_new(reference_pts).with_context(|| format!("comparing {}", reference))?;
    let planned_pl =
        PolyLine::deduping_new(planned_pts).with_context(|| format!("comparing {}", path))?;

    for (idx, (dist1, dist2)) in reference_pl
        .cumulative_lengths()
        .into_iter()
        .zip(planned_pl.cumulative_lengths())
        .enumerate()
    {
        debug!("Point {}: {} vs {}", idx, dist1, dist2);
    }

    println!("Total distance for {}: {}", reference, reference_pl.length());
    println!("Total distance for {}: {}", path, planned_pl.length());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_columns_are_ignored() {
        let input = "# x_m, y_m, vx_mps\n1.0, 2.0, 30.0\n3.5, -4.0, 31.0\n";
        assert_eq!(
            parse_raceline(input.as_bytes()).unwrap(),
            vec![Pt2D::new(1.0, 2.0), Pt2D::new(3.5, -4.0)]
        );
    }

    #[test]
    fn non_finite_rows_are_rejected() {
        for bad in ["NaN", "inf", "-inf"] {
            let input = format!("# x_m, y_m\n1.0, 2.0\n{}, 3.0\n", bad);
            let err = parse_raceline(input.as_bytes()).unwrap_err();
            assert!(err.to_string().contains("Row 2"), "{}", err);
        }
    }
}
