//! Plane coordinate frames.
//!
//! A [`PlaneFrame`] is an orthonormal basis `(u, v, normal)` anchored at an
//! origin on the plane. It projects 3D points on the plane into 2D frame
//! coordinates and lifts 2D fill points back into 3D for motion emission.

use super::{Point2, Point3};
use crate::CoordF;
use serde::{Deserialize, Serialize};

/// Alignment threshold for picking the seed axis of the basis.
const ALIGNMENT_LIMIT: CoordF = 0.9;

/// An orthonormal plane frame derived from an extrusion normal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaneFrame {
    origin: Point3,
    u: Point3,
    v: Point3,
    normal: Point3,
}

impl PlaneFrame {
    /// Build a frame from an origin and a plane normal.
    ///
    /// The in-plane axes come from projecting a world axis onto the plane
    /// (Gram-Schmidt), so planes with a +Z normal keep their world X/Y
    /// coordinates. A zero normal falls back to +Z.
    pub fn from_normal(origin: Point3, normal: Point3) -> Self {
        let n = if normal.length() > 0.0 {
            normal.normalize()
        } else {
            Point3::unit_z()
        };

        let mut seed = Point3::new(1.0, 0.0, 0.0);
        if seed.dot(&n).abs() > ALIGNMENT_LIMIT {
            seed = Point3::new(0.0, 1.0, 0.0);
        }

        let u = (seed - n * seed.dot(&n)).normalize();
        let v = n.cross(&u);

        Self {
            origin,
            u,
            v,
            normal: n,
        }
    }

    /// Build a frame for an XY plane at constant z.
    pub fn horizontal(z: CoordF) -> Self {
        Self::from_normal(Point3::new(0.0, 0.0, z), Point3::unit_z())
    }

    /// The frame's normal.
    #[inline]
    pub fn normal(&self) -> Point3 {
        self.normal
    }

    /// The frame's origin.
    #[inline]
    pub fn origin(&self) -> Point3 {
        self.origin
    }

    /// Project a 3D point into frame coordinates.
    #[inline]
    pub fn project(&self, p: Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(&self.u), d.dot(&self.v))
    }

    /// Lift a 2D frame point back into 3D world coordinates.
    #[inline]
    pub fn lift(&self, p: Point2) -> Point3 {
        self.origin + self.u * p.x + self.v * p.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_frame_is_identity_in_xy() {
        let frame = PlaneFrame::horizontal(5.0);
        let p = frame.project(Point3::new(3.0, -2.0, 5.0));
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!((p.y + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_lift_round_trip() {
        let frame = PlaneFrame::from_normal(
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(1.0, 1.0, 1.0),
        );
        let p = Point2::new(4.2, -1.7);
        let lifted = frame.lift(p);
        let back = frame.project(lifted);
        assert!(back.coincides_with(&p, 1e-10));
    }

    #[test]
    fn test_lifted_points_stay_on_plane() {
        let normal = Point3::new(0.0, 1.0, 1.0);
        let frame = PlaneFrame::from_normal(Point3::zero(), normal);
        let lifted = frame.lift(Point2::new(10.0, 7.0));
        assert!(lifted.dot(&normal.normalize()).abs() < 1e-10);
    }

    #[test]
    fn test_zero_normal_falls_back_to_z() {
        let frame = PlaneFrame::from_normal(Point3::zero(), Point3::zero());
        assert_eq!(frame.normal(), Point3::unit_z());
    }
}
