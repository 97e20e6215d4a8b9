//! Geometry primitives.
//!
//! This module provides the fundamental types the fill engine is built on:
//! - [`Point2`] and [`Point3`] - 2D and 3D points with `f64` coordinates
//! - [`BoundingBox`] - axis-aligned 2D bounding box
//! - [`PlaneFrame`] - orthonormal plane basis for 3D↔2D projection
//!
//! Coordinates are plain `f64` in work-area units (micrometers); geometric
//! comparisons take explicit tolerances rather than relying on an integer
//! grid.

mod bounding_box;
mod frame;
mod point;

pub use bounding_box::BoundingBox;
pub use frame::PlaneFrame;
pub use point::{Point2, Point3};

use crate::CoordF;

/// Cross product of two 2D vectors (returns a scalar).
/// Useful for determining the orientation of three points.
#[inline]
pub fn cross2(v1: Point2, v2: Point2) -> CoordF {
    v1.x * v2.y - v1.y * v2.x
}

/// Dot product of two 2D vectors.
#[inline]
pub fn dot2(v1: Point2, v2: Point2) -> CoordF {
    v1.x * v2.x + v1.y * v2.y
}

/// Linear interpolation between two points.
#[inline]
pub fn lerp(a: Point2, b: Point2, t: CoordF) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// Check if a value is approximately equal to another within epsilon.
#[inline]
pub fn approx_eq(a: CoordF, b: CoordF, epsilon: CoordF) -> bool {
    (a - b).abs() < epsilon
}

/// Check if two points are approximately equal.
#[inline]
pub fn points_approx_eq(a: Point2, b: Point2, epsilon: CoordF) -> bool {
    approx_eq(a.x, b.x, epsilon) && approx_eq(a.y, b.y, epsilon)
}

/// Orientation of three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise (left turn)
    CounterClockwise,
    /// Clockwise (right turn)
    Clockwise,
    /// Collinear (no turn)
    Collinear,
}

/// Determine the orientation of three points within a tolerance.
pub fn orientation(p1: Point2, p2: Point2, p3: Point2, tolerance: CoordF) -> Orientation {
    let cross = cross2(p2 - p1, p3 - p2);
    if cross > tolerance {
        Orientation::CounterClockwise
    } else if cross < -tolerance {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}
