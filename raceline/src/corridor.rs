use geom::{Pt2D, Ring};

use crate::{PlanError, Result};

/// The fence for one chunk: a closed ring following the inside of the track limits. It's not an
/// obstacle with an inside and outside; an edge is simply rejected if it touches any part of the
/// ring, which keeps a tree grown from a point inside the ring inside it.
#[derive(Clone, Debug)]
pub struct Corridor {
    fence: Option<Ring>,
}

impl Corridor {
    pub fn new(fence: Vec<Pt2D>) -> Result<Corridor> {
        if fence.is_empty() {
            return Err(PlanError::EmptyCorridor);
        }
        let ring = Ring::new(fence).map_err(|_| PlanError::EmptyCorridor)?;
        Ok(Corridor { fence: Some(ring) })
    }

    /// No fence at all; every edge is feasible.
    pub fn unbounded() -> Corridor {
        Corridor { fence: None }
    }

    pub fn fence(&self) -> Option<&Ring> {
        self.fence.as_ref()
    }

    /// True iff the segment from pt1 to pt2 doesn't touch any edge of the fence, including the
    /// edge closing the ring.
    pub fn is_feasible(&self, pt1: Pt2D, pt2: Pt2D) -> bool {
        match self.fence {
            Some(ref ring) => !ring.crossed_by(pt1, pt2),
            None => true,
        }
    }
}
