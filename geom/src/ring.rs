use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::{segments_intersect, Line, Pt2D};

/// Maybe a misnomer, but like a PolyLine, but closed. The last point implicitly connects back to
/// the first; don't repeat the first point at the end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pts: Vec<Pt2D>,
}

impl Ring {
    pub fn new(pts: Vec<Pt2D>) -> Result<Ring> {
        if pts.is_empty() {
            bail!("Ring has no points");
        }
        Ok(Ring { pts })
    }

    pub fn points(&self) -> &Vec<Pt2D> {
        &self.pts
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Every edge, including the one wrapping from the last point to the first.
    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        let n = self.pts.len();
        (0..n).map(move |i| Line::new(self.pts[i], self.pts[(i + 1) % n]))
    }

    /// Does the segment from pt1 to pt2 touch any edge of the ring?
    pub fn crossed_by(&self, pt1: Pt2D, pt2: Pt2D) -> bool {
        self.lines()
            .any(|l| segments_intersect(l.pt1(), l.pt2(), pt1, pt2))
    }
}

impl fmt::Display for Ring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Ring::new(vec![")?;
        for pt in &self.pts {
            writeln!(f, "  Pt2D::new({}, {}),", pt.x(), pt.y())?;
        }
        write!(f, "])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Ring {
        Ring::new(vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(10.0, 10.0),
            Pt2D::new(0.0, 10.0),
        ])
        .unwrap()
    }

    #[test]
    fn wraps_around() {
        let ring = square();
        let lines: Vec<Line> = ring.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[3],
            Line::new(Pt2D::new(0.0, 10.0), Pt2D::new(0.0, 0.0))
        );
        // Only the closing edge is in the way
        assert!(ring.crossed_by(Pt2D::new(-5.0, 5.0), Pt2D::new(5.0, 5.0)));
    }

    #[test]
    fn crossings() {
        let ring = square();
        assert!(!ring.crossed_by(Pt2D::new(2.0, 2.0), Pt2D::new(8.0, 8.0)));
        assert!(ring.crossed_by(Pt2D::new(5.0, 5.0), Pt2D::new(15.0, 5.0)));
        assert!(!ring.crossed_by(Pt2D::new(20.0, 20.0), Pt2D::new(30.0, 30.0)));
        assert!(Ring::new(Vec::new()).is_err());
    }
}
