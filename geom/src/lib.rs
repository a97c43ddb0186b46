//! Planar geometry used by the raceline planner. Everything is in world-space meters on a
//! Cartesian grid; nothing here knows about tracks or trees.

mod bounds;
mod distance;
mod line;
mod polyline;
mod pt;
mod ring;
mod spline;

pub use crate::bounds::Bounds;
pub use crate::distance::Distance;
pub use crate::line::{orientation, point_on_segment, segments_intersect, Line};
pub use crate::polyline::PolyLine;
pub use crate::pt::Pt2D;
pub use crate::ring::Ring;
pub use crate::spline::CubicSpline;
