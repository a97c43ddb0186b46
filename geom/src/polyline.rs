use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{CubicSpline, Distance, Line, Pt2D};

/// An ordered sequence of at least two points, with no exact repeats between neighbors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolyLine {
    pts: Vec<Pt2D>,
    length: Distance,
}

impl PolyLine {
    pub fn new(pts: Vec<Pt2D>) -> Result<PolyLine> {
        if pts.len() < 2 {
            bail!("Need at least two points for a PolyLine");
        }
        if let Some(pair) = pts.windows(2).find(|pair| pair[0] == pair[1]) {
            bail!("PolyLine has repeat adjacent point {}", pair[0]);
        }
        let length = pts.windows(2).map(|pair| pair[0].dist_to(pair[1])).sum();
        Ok(PolyLine { pts, length })
    }

    /// First removes exact adjacent repeats, keeping the first occurrence and the relative order
    /// of everything else.
    pub fn deduping_new(mut pts: Vec<Pt2D>) -> Result<PolyLine> {
        pts.dedup();
        PolyLine::new(pts)
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        self.pts.windows(2).map(|pair| Line::new(pair[0], pair[1]))
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn first_pt(&self) -> Pt2D {
        self.pts[0]
    }

    pub fn last_pt(&self) -> Pt2D {
        *self.pts.last().unwrap()
    }

    /// Running distance from the first point to each point.
    pub fn cumulative_lengths(&self) -> Vec<Distance> {
        let mut result = Vec::with_capacity(self.pts.len());
        let mut so_far = Distance::ZERO;
        result.push(so_far);
        for pair in self.pts.windows(2) {
            so_far += pair[0].dist_to(pair[1]);
            result.push(so_far);
        }
        result
    }

    /// Fits a cubic spline through every point (parameterized uniformly over [0, 1] by index, not
    /// by arc length) and resamples it at `num_points` evenly spaced parameters. The first and
    /// last points are preserved.
    pub fn smoothed(&self, num_points: usize) -> Vec<Pt2D> {
        let n = self.pts.len();
        let ts: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
        let xs: Vec<f64> = self.pts.iter().map(|pt| pt.x()).collect();
        let ys: Vec<f64> = self.pts.iter().map(|pt| pt.y()).collect();
        let spline_x = CubicSpline::new(ts.clone(), xs);
        let spline_y = CubicSpline::new(ts, ys);

        (0..num_points)
            .map(|i| {
                let t = if num_points == 1 {
                    0.0
                } else {
                    i as f64 / (num_points - 1) as f64
                };
                Pt2D::new(spline_x.eval(t), spline_y.eval(t))
            })
            .collect()
    }
}

impl fmt::Display for PolyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "PolyLine::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}
