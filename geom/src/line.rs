use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// Segment, technically. The endpoints may coincide; a degenerate line behaves like a point for
/// intersection tests.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.0.dist_to(self.1)
    }

    pub fn reversed(&self) -> Line {
        Line(self.1, self.0)
    }

    /// True if the two segments share at least one point, including touching at an endpoint and
    /// overlapping while collinear.
    pub fn intersects(&self, other: &Line) -> bool {
        segments_intersect(self.0, self.1, other.0, other.1)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line({}, {})", self.0, self.1)
    }
}

/// The z component of (p2 - p1) x (p3 - p1). Positive when p3 is to the left of p1->p2, negative
/// when to the right, zero when collinear.
pub fn orientation(p1: Pt2D, p2: Pt2D, p3: Pt2D) -> f64 {
    (p2.x() - p1.x()) * (p3.y() - p1.y()) - (p2.y() - p1.y()) * (p3.x() - p1.x())
}

/// Only meaningful once `p` is known to be collinear with p1->p2; this just checks the bounding
/// box.
pub fn point_on_segment(p1: Pt2D, p2: Pt2D, p: Pt2D) -> bool {
    p1.x().min(p2.x()) <= p.x()
        && p.x() <= p1.x().max(p2.x())
        && p1.y().min(p2.y()) <= p.y()
        && p.y() <= p1.y().max(p2.y())
}

/// Does segment a1->a2 share a point with b1->b2? Symmetric in the order of segments and in the
/// order of each segment's endpoints.
pub fn segments_intersect(a1: Pt2D, a2: Pt2D, b1: Pt2D, b2: Pt2D) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && point_on_segment(b1, b2, a1))
        || (d2 == 0.0 && point_on_segment(b1, b2, a2))
        || (d3 == 0.0 && point_on_segment(a1, a2, b1))
        || (d4 == 0.0 && point_on_segment(a1, a2, b2))
}
