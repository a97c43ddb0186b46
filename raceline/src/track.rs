use std::io::Read;

use anyhow::{bail, Context, Result};
use fs_err::File;
use serde::Deserialize;

use abstutil::{basename, wraparound_index};
use geom::{Bounds, Distance, Pt2D};

/// A racetrack: a centerline with the track width on either side of every point, plus everything
/// derived from that. All per-point vectors line up by index with the centerline.
#[derive(Clone, Debug)]
pub struct Track {
    pub name: String,
    pub centerline: Vec<Pt2D>,
    pub width_right: Vec<Distance>,
    pub width_left: Vec<Distance>,
    /// Unit vectors along the direction of travel
    tangents: Vec<[f64; 2]>,
    /// The track limits
    pub left: Vec<Pt2D>,
    pub right: Vec<Pt2D>,
    /// The track limits moved inwards by the fence inset
    pub left_fence: Vec<Pt2D>,
    pub right_fence: Vec<Pt2D>,
    /// Does the last point connect back to the first?
    pub closed: bool,
}

// One row of a racetrack-database CSV file
#[derive(Deserialize)]
struct Record {
    #[serde(rename = "# x_m")]
    x: f64,
    #[serde(rename = "y_m")]
    y: f64,
    #[serde(rename = "w_tr_right_m")]
    width_right: f64,
    #[serde(rename = "w_tr_left_m")]
    width_left: f64,
}

impl Track {
    /// Reads a CSV file with the columns `# x_m, y_m, w_tr_right_m, w_tr_left_m`. The track is
    /// named after the file.
    pub fn load_csv(path: &str, fence_inset: Distance, closed: bool) -> Result<Track> {
        let file = File::open(path)?;
        Track::from_csv(basename(path), file, fence_inset, closed)
            .with_context(|| format!("loading track from {}", path))
    }

    pub fn from_csv<R: Read>(
        name: String,
        reader: R,
        fence_inset: Distance,
        closed: bool,
    ) -> Result<Track> {
        let mut centerline = Vec::new();
        let mut width_right = Vec::new();
        let mut width_left = Vec::new();
        for (idx, rec) in csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader)
            .deserialize()
            .enumerate()
        {
            let rec: Record = rec?;
            if ![rec.x, rec.y, rec.width_right, rec.width_left]
                .iter()
                .all(|x| x.is_finite())
            {
                bail!("Row {} of {} has a value that isn't a finite number", idx + 1, name);
            }
            centerline.push(Pt2D::new(rec.x, rec.y));
            width_right.push(Distance::meters(rec.width_right));
            width_left.push(Distance::meters(rec.width_left));
        }
        Track::new(name, centerline, width_right, width_left, fence_inset, closed)
    }

    /// Derives the track limits and fence. The normal at each point comes from the centerline's
    /// gradient: central differences in the middle, one-sided at the two ends.
    pub fn new(
        name: String,
        centerline: Vec<Pt2D>,
        width_right: Vec<Distance>,
        width_left: Vec<Distance>,
        fence_inset: Distance,
        closed: bool,
    ) -> Result<Track> {
        let n = centerline.len();
        if n < 2 {
            bail!("A track needs at least two points, but {} has {}", name, n);
        }
        if width_right.len() != n || width_left.len() != n {
            bail!("Every point of {} needs a left and right width", name);
        }
        // The fence has to stay on its own side of the centerline
        for (idx, (wr, wl)) in width_right.iter().zip(width_left.iter()).enumerate() {
            if *wr <= fence_inset || *wl <= fence_inset {
                bail!(
                    "Point {} of {} is {} wide on the right and {} on the left, but the fence is \
                     inset by {}",
                    idx,
                    name,
                    wr,
                    wl,
                    fence_inset
                );
            }
        }

        let mut tangents = Vec::with_capacity(n);
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        let mut left_fence = Vec::with_capacity(n);
        let mut right_fence = Vec::with_capacity(n);
        for i in 0..n {
            let (before, after, span) = if i == 0 {
                (centerline[0], centerline[1], 1.0)
            } else if i == n - 1 {
                (centerline[n - 2], centerline[n - 1], 1.0)
            } else {
                (centerline[i - 1], centerline[i + 1], 2.0)
            };
            let dx = (after.x() - before.x()) / span;
            let dy = (after.y() - before.y()) / span;
            let norm = (dx * dx + dy * dy).sqrt();
            if norm == 0.0 {
                bail!("{} has no direction at point {}", name, i);
            }
            // Pointing to the right of the direction of travel
            let (nx, ny) = (dy / norm, -dx / norm);
            tangents.push([dx / norm, dy / norm]);

            let c = centerline[i];
            let wr = width_right[i].inner_meters();
            let wl = width_left[i].inner_meters();
            let inset = fence_inset.inner_meters();
            right.push(c.offset(wr * nx, wr * ny));
            left.push(c.offset(-wl * nx, -wl * ny));
            right_fence.push(c.offset((wr - inset) * nx, (wr - inset) * ny));
            left_fence.push(c.offset(-(wl - inset) * nx, -(wl - inset) * ny));
        }

        Ok(Track {
            name,
            centerline,
            width_right,
            width_left,
            tangents,
            left,
            right,
            left_fence,
            right_fence,
            closed,
        })
    }

    pub fn len(&self) -> usize {
        self.centerline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centerline.is_empty()
    }

    /// The bounding box of both track limits from `start_idx` to `goal_idx` inclusive, grown by
    /// `margin`.
    pub fn slice_bounds(&self, start_idx: usize, goal_idx: usize, margin: Distance) -> Bounds {
        let pts: Vec<Pt2D> = (start_idx..=goal_idx.min(self.len() - 1))
            .flat_map(|idx| [self.left[idx], self.right[idx]])
            .collect();
        Bounds::from(&pts).padded(margin)
    }

    /// A closed fence around the chunk from `start_idx` to `goal_idx`: the left fence points in
    /// order, then the right fence points in reverse. The slice is extended by `padding` of
    /// centerline at both ends, so the two caps closing the ring sit clear of the chunk's start and
    /// goal. On a closed track the extension wraps around; on an open one, whatever padding is
    /// missing at an end is made up by pushing that cap outwards along the track.
    ///
    /// When a chunk of a closed track leaves at most one point of the lap outside it, there's no
    /// room for two caps. Instead the ring is cut once, halfway between the goal and the start,
    /// and runs around both sides of the whole lap.
    pub fn fence_ring(&self, start_idx: usize, goal_idx: usize, padding: Distance) -> Vec<Pt2D> {
        let n = self.len() as isize;
        let (start_idx, goal_idx) = (start_idx as isize, goal_idx as isize);
        // Don't let the padding on both ends swallow the whole track
        let max_steps = ((n - (goal_idx - start_idx + 1)) / 2).max(0);
        if self.closed && max_steps == 0 {
            return self.lap_fence_ring(start_idx, goal_idx);
        }

        let mut first = start_idx;
        let mut missing_before = padding;
        while missing_before > Distance::ZERO && start_idx - first < max_steps {
            if !self.closed && first == 0 {
                break;
            }
            missing_before = missing_before - self.segment_length(first - 1);
            first -= 1;
        }

        let mut last = goal_idx;
        let mut missing_after = padding;
        while missing_after > Distance::ZERO && last - goal_idx < max_steps {
            if !self.closed && last == n - 1 {
                break;
            }
            missing_after = missing_after - self.segment_length(last);
            last += 1;
        }

        let indices: Vec<usize> = (first..=last)
            .map(|idx| wraparound_index(self.len(), idx))
            .collect();
        let first_idx = indices[0];
        let last_idx = indices[indices.len() - 1];

        let mut pts = Vec::new();
        if !self.closed && missing_before > Distance::ZERO {
            pts.push(self.push_along(self.left_fence[first_idx], first_idx, -missing_before));
        }
        pts.extend(indices.iter().map(|idx| self.left_fence[*idx]));
        if !self.closed && missing_after > Distance::ZERO {
            pts.push(self.push_along(self.left_fence[last_idx], last_idx, missing_after));
            pts.push(self.push_along(self.right_fence[last_idx], last_idx, missing_after));
        }
        pts.extend(indices.iter().rev().map(|idx| self.right_fence[*idx]));
        if !self.closed && missing_before > Distance::ZERO {
            pts.push(self.push_along(self.right_fence[first_idx], first_idx, -missing_before));
        }
        pts
    }

    // Both fences all the way around, from the start to the goal and on through the gap, joined
    // by a single cut in the middle of that gap
    fn lap_fence_ring(&self, start_idx: isize, goal_idx: isize) -> Vec<Pt2D> {
        let n = self.len() as isize;
        let gap = n - (goal_idx - start_idx);
        let before = wraparound_index(self.len(), goal_idx + gap / 2);
        let after = wraparound_index(self.len(), goal_idx + (gap + 1) / 2);
        let cut_left = midpoint(self.left_fence[before], self.left_fence[after]);
        let cut_right = midpoint(self.right_fence[before], self.right_fence[after]);

        let indices: Vec<usize> = (start_idx..=goal_idx)
            .map(|idx| wraparound_index(self.len(), idx))
            .collect();
        let mut pts = vec![cut_left];
        pts.extend(indices.iter().map(|idx| self.left_fence[*idx]));
        pts.push(cut_left);
        pts.push(cut_right);
        pts.extend(indices.iter().rev().map(|idx| self.right_fence[*idx]));
        pts.push(cut_right);
        pts
    }

    // The centerline distance from idx to idx + 1, wrapping around
    fn segment_length(&self, idx: isize) -> Distance {
        let from = wraparound_index(self.len(), idx);
        let to = wraparound_index(self.len(), idx + 1);
        self.centerline[from].dist_to(self.centerline[to])
    }

    fn push_along(&self, pt: Pt2D, idx: usize, dist: Distance) -> Pt2D {
        let [tx, ty] = self.tangents[idx];
        let d = dist.inner_meters();
        pt.offset(tx * d, ty * d)
    }
}

fn midpoint(a: Pt2D, b: Pt2D) -> Pt2D {
    Pt2D::new((a.x() + b.x()) / 2.0, (a.y() + b.y()) / 2.0)
}
