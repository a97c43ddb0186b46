use serde::{Deserialize, Serialize};

use crate::{Distance, Pt2D};

/// An axis-aligned bounding box.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// A boundary including no points.
    pub fn new() -> Bounds {
        Bounds {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        }
    }

    pub fn from(pts: &[Pt2D]) -> Bounds {
        let mut b = Bounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    pub fn update(&mut self, pt: Pt2D) {
        self.min_x = self.min_x.min(pt.x());
        self.max_x = self.max_x.max(pt.x());
        self.min_y = self.min_y.min(pt.y());
        self.max_y = self.max_y.max(pt.y());
    }

    /// True if no point has been added yet.
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn contains(&self, pt: Pt2D) -> bool {
        pt.x() >= self.min_x && pt.x() <= self.max_x && pt.y() >= self.min_y && pt.y() <= self.max_y
    }

    /// Grows the box by `margin` in every direction.
    pub fn padded(&self, margin: Distance) -> Bounds {
        let m = margin.inner_meters();
        Bounds {
            min_x: self.min_x - m,
            min_y: self.min_y - m,
            max_x: self.max_x + m,
            max_y: self.max_y + m,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding() {
        let b = Bounds::from(&[Pt2D::new(1.0, 2.0), Pt2D::new(-3.0, 7.0)]);
        assert_eq!(b.width(), 4.0);
        assert_eq!(b.height(), 5.0);
        let padded = b.padded(Distance::meters(5.0));
        assert_eq!(padded.min_x, -8.0);
        assert_eq!(padded.max_y, 12.0);
        assert!(padded.contains(Pt2D::new(5.0, -2.0)));
        assert!(Bounds::new().is_empty());
        assert!(!b.is_empty());
    }
}
