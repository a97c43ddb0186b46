use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Distance;

/// This represents world-space in meters.
///
/// Points are plain values. Anything that needs a stable identity (like a node in a planning
/// tree) must carry its own ID; never compare coordinates to decide graph structure.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }

        Pt2D { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters(self.raw_dist_squared(to).sqrt())
    }

    /// Squared euclidean distance, without the sqrt. Use this for comparisons in hot loops; the
    /// planner's nearest-node and radius queries are all defined in terms of it.
    pub fn raw_dist_squared(self, to: Pt2D) -> f64 {
        let dx = self.x - to.x;
        let dy = self.y - to.y;
        dx * dx + dy * dy
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pt2D {
        Pt2D::new(self.x + dx, self.y + dy)
    }

    /// Moves exactly `dist` from this point in the direction of `towards`. Returns None if the two
    /// points coincide, since there's no direction then.
    pub fn project_towards(self, towards: Pt2D, dist: Distance) -> Option<Pt2D> {
        let dx = towards.x - self.x;
        let dy = towards.y - self.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            return None;
        }
        let step = dist.inner_meters();
        Some(Pt2D::new(
            self.x + step * dx / len,
            self.y + step * dy / len,
        ))
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_towards_is_always_a_full_step() {
        let start = Pt2D::new(1.0, 1.0);
        // Closer than the step; we still go the whole way.
        let pt = start.project_towards(Pt2D::new(2.0, 1.0), Distance::meters(10.0)).unwrap();
        assert_eq!(pt, Pt2D::new(11.0, 1.0));

        let pt = start
            .project_towards(Pt2D::new(4.0, 5.0), Distance::meters(10.0))
            .unwrap();
        assert!((start.dist_to(pt).inner_meters() - 10.0).abs() < 1e-9);

        assert_eq!(start.project_towards(start, Distance::meters(10.0)), None);
    }
}
