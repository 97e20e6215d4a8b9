//! Axis-aligned 2D bounding box.

use super::Point2;
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box over `Point2` coordinates.
///
/// A freshly created box is empty (inverted extents); merging points or other
/// boxes grows it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox {
    /// Create an empty bounding box.
    pub fn new() -> Self {
        Self {
            min: Point2::new(CoordF::INFINITY, CoordF::INFINITY),
            max: Point2::new(CoordF::NEG_INFINITY, CoordF::NEG_INFINITY),
        }
    }

    /// Create a bounding box covering a set of points.
    pub fn from_points(points: &[Point2]) -> Self {
        let mut bbox = Self::new();
        for p in points {
            bbox.merge_point(*p);
        }
        bbox
    }

    /// Check whether the box contains no points yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow the box to include a point.
    pub fn merge_point(&mut self, p: Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grow the box to include another box.
    pub fn merge(&mut self, other: &BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.merge_point(other.min);
        self.merge_point(other.max);
    }

    /// Box width (0 when empty).
    #[inline]
    pub fn width(&self) -> CoordF {
        if self.is_empty() {
            0.0
        } else {
            self.max.x - self.min.x
        }
    }

    /// Box height (0 when empty).
    #[inline]
    pub fn height(&self) -> CoordF {
        if self.is_empty() {
            0.0
        } else {
            self.max.y - self.min.y
        }
    }

    /// Box center.
    #[inline]
    pub fn center(&self) -> Point2 {
        Point2::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    /// Check whether a point lies inside the box (boundary inclusive).
    #[inline]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}
