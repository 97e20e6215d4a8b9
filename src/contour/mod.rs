//! Contour assembly from line/arc segment records.
//!
//! A CAD outline arrives as a soup of [`Segment`]s that trace one closed ring,
//! not necessarily ordered head-to-tail. The [`ContourBuilder`] samples each
//! segment (interpolating arcs at a configurable resolution), stitches the
//! samples into one ordered ring, and forces closure. The result is a
//! [`Contour`]: a closed 2D polyline with at least 3 distinct points.
//!
//! Segments that do not chain onto the ring produce a connectivity warning and
//! are concatenated as-is; the builder degrades gracefully rather than
//! failing, and records the gap count so callers can decide whether the
//! best-effort ring is usable.

use crate::geometry::{BoundingBox, PlaneFrame, Point2, Point3};
use crate::{CoordF, GeometryError};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Default tolerance for endpoint matching and closure (work-area units).
pub const JOIN_TOLERANCE: CoordF = 1e-5;

/// Default number of interpolation steps per arc.
pub const DEFAULT_ARC_RESOLUTION: usize = 30;

/// One edge of a contour: a straight line or a circular arc.
///
/// Arc angles are in degrees. The arc's sweep direction follows the sign of
/// the extrusion vector's z component: negative means clockwise, anything
/// else counter-clockwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    Line {
        start: Point3,
        end: Point3,
    },
    Arc {
        start: Point3,
        end: Point3,
        center: Point3,
        radius: CoordF,
        start_angle: CoordF,
        end_angle: CoordF,
        extrusion: Point3,
    },
}

impl Segment {
    /// The segment's start point.
    pub fn start(&self) -> Point3 {
        match self {
            Segment::Line { start, .. } | Segment::Arc { start, .. } => *start,
        }
    }

    /// The segment's end point.
    pub fn end(&self) -> Point3 {
        match self {
            Segment::Line { end, .. } | Segment::Arc { end, .. } => *end,
        }
    }

    /// Sample the segment into a point run.
    ///
    /// Lines yield their two endpoints; arcs are interpolated at
    /// `resolution + 1` points.
    pub fn sample(&self, resolution: usize) -> Vec<Point3> {
        match self {
            Segment::Line { start, end } => vec![*start, *end],
            Segment::Arc { .. } => interpolate_arc(self, resolution),
        }
    }
}

/// Interpolate an arc segment into `resolution + 1` points.
///
/// The sweep direction comes from the extrusion sign (negative z means
/// clockwise). The end angle is normalized by a full turn so the sweep is
/// monotonic and never zero-length. The sampled run is reversed if its first
/// point does not land on the segment's start point, so the output always
/// runs start to end. Line segments pass through as their two endpoints.
pub fn interpolate_arc(segment: &Segment, resolution: usize) -> Vec<Point3> {
    let (start, center, radius, start_angle, end_angle, extrusion) = match segment {
        Segment::Line { start, end } => return vec![*start, *end],
        Segment::Arc {
            start,
            center,
            radius,
            start_angle,
            end_angle,
            extrusion,
            ..
        } => (start, center, *radius, *start_angle, *end_angle, extrusion),
    };

    let resolution = resolution.max(2);
    let clockwise = extrusion.z < 0.0;

    // Normalize the end angle by full turns so the sweep is monotonic in the
    // requested direction and never zero-length.
    let a0 = start_angle;
    let mut a1 = end_angle;
    if clockwise {
        while a1 >= a0 {
            a1 -= 360.0;
        }
    } else {
        while a1 <= a0 {
            a1 += 360.0;
        }
    }

    let mut points = Vec::with_capacity(resolution + 1);
    for i in 0..=resolution {
        let angle = a0 + (a1 - a0) * i as CoordF / resolution as CoordF;
        let rad = angle.to_radians();
        points.push(Point3::new(
            center.x + radius * rad.cos(),
            center.y + radius * rad.sin(),
            center.z,
        ));
    }

    // Reconcile with the segment's declared start point.
    if !points[0].coincides_with(start, JOIN_TOLERANCE) {
        points.reverse();
    }

    points
}

/// A closed planar contour: an ordered point ring whose first and last points
/// coincide.
///
/// Contours are immutable once built. The ring keeps its explicit closing
/// point; `gap_count` records connectivity warnings raised while stitching.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point2>,
    gap_count: usize,
}

impl Contour {
    /// Build a contour directly from a closed point ring.
    ///
    /// The ring is closed (the first point is appended) if it is not already.
    /// Fails when fewer than 3 distinct points remain.
    pub fn from_ring(mut points: Vec<Point2>) -> std::result::Result<Self, GeometryError> {
        if points.is_empty() {
            return Err(GeometryError::EmptyInput);
        }
        if !points[0].coincides_with(&points[points.len() - 1], JOIN_TOLERANCE) {
            points.push(points[0]);
        }

        let contour = Self {
            points,
            gap_count: 0,
        };
        let distinct = contour.distinct_count(JOIN_TOLERANCE);
        if distinct < 3 {
            return Err(GeometryError::DegenerateContour { count: distinct });
        }
        Ok(contour)
    }

    /// The ring's points, closing point included.
    #[inline]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of stored points (closing point included).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the contour has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of connectivity gaps recorded while stitching.
    #[inline]
    pub fn gap_count(&self) -> usize {
        self.gap_count
    }

    /// Check that the first and last point coincide within a tolerance.
    pub fn is_closed(&self, tolerance: CoordF) -> bool {
        self.points.len() >= 2
            && self.points[0].coincides_with(&self.points[self.points.len() - 1], tolerance)
    }

    /// Count points that are distinct from their predecessor.
    fn distinct_count(&self, tolerance: CoordF) -> usize {
        let ring = self.ring();
        if ring.is_empty() {
            return 0;
        }
        let mut count = 1;
        for w in ring.windows(2) {
            if !w[0].coincides_with(&w[1], tolerance) {
                count += 1;
            }
        }
        count
    }

    /// The ring without its closing point.
    pub fn ring(&self) -> &[Point2] {
        if self.points.len() >= 2
            && self.points[0].coincides_with(&self.points[self.points.len() - 1], JOIN_TOLERANCE)
        {
            &self.points[..self.points.len() - 1]
        } else {
            &self.points
        }
    }

    /// Unsigned enclosed area (shoelace formula).
    pub fn area(&self) -> CoordF {
        let ring = self.ring();
        if ring.len() < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..ring.len() {
            let a = ring[i];
            let b = ring[(i + 1) % ring.len()];
            sum += a.x * b.y - b.x * a.y;
        }
        (sum / 2.0).abs()
    }

    /// Axis-aligned bounding box of the ring.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.points)
    }

    /// Largest distance from `origin` to any ring vertex.
    pub fn max_radius_from(&self, origin: Point2) -> CoordF {
        self.points
            .iter()
            .map(|p| p.distance(&origin))
            .fold(0.0, CoordF::max)
    }

    /// Check whether any two non-adjacent edges of the ring properly cross.
    pub fn self_intersects(&self) -> bool {
        let ring = self.ring();
        let n = ring.len();
        if n < 4 {
            return false;
        }
        for i in 0..n {
            let (a1, a2) = (ring[i], ring[(i + 1) % n]);
            for j in (i + 1)..n {
                // Skip adjacent edges (shared vertex).
                if j == i || (j + 1) % n == i || (i + 1) % n == j {
                    continue;
                }
                let (b1, b2) = (ring[j], ring[(j + 1) % n]);
                if segments_cross(a1, a2, b1, b2) {
                    return true;
                }
            }
        }
        false
    }
}

/// Proper crossing test for two segments (shared endpoints do not count).
fn segments_cross(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> bool {
    let d = |p: Point2, q: Point2, r: Point2| (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    let d1 = d(b1, b2, a1);
    let d2 = d(b1, b2, a2);
    let d3 = d(a1, a2, b1);
    let d4 = d(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}

impl Deref for Contour {
    type Target = [Point2];

    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl fmt::Display for Contour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contour({} points, {} gaps)", self.points.len(), self.gap_count)
    }
}

/// Assembles contours from segment soups.
#[derive(Clone, Debug)]
pub struct ContourBuilder {
    resolution: usize,
    tolerance: CoordF,
}

impl ContourBuilder {
    /// Create a builder with the given arc resolution and join tolerance.
    pub fn new(resolution: usize, tolerance: CoordF) -> Self {
        Self {
            resolution: resolution.max(2),
            tolerance,
        }
    }

    /// Chain the segments into one closed 3D point ring.
    ///
    /// Each segment's samples are appended to the running ring: if the ring's
    /// last point matches the samples' head, the tail is appended; if it
    /// matches the samples' tail, the reversed run is appended; otherwise a
    /// connectivity gap is recorded and the samples are concatenated as-is.
    /// The first point is appended at the end if the ring does not close.
    pub fn chain(&self, segments: &[Segment]) -> std::result::Result<(Vec<Point3>, usize), GeometryError> {
        if segments.is_empty() {
            return Err(GeometryError::EmptyInput);
        }

        let mut ring: Vec<Point3> = Vec::new();
        let mut gaps = 0;

        for segment in segments {
            let mut samples = segment.sample(self.resolution);
            if samples.is_empty() {
                continue;
            }
            if ring.is_empty() {
                ring.extend(samples);
                continue;
            }

            let last = ring[ring.len() - 1];
            if last.coincides_with(&samples[0], self.tolerance) {
                ring.extend(samples.into_iter().skip(1));
            } else if last.coincides_with(&samples[samples.len() - 1], self.tolerance) {
                samples.reverse();
                ring.extend(samples.into_iter().skip(1));
            } else {
                warn!(
                    "segment does not chain onto the contour: last point {}, segment start {}",
                    last, samples[0]
                );
                gaps += 1;
                ring.extend(samples);
            }
        }

        if ring.is_empty() {
            return Err(GeometryError::EmptyInput);
        }
        if !ring[0].coincides_with(&ring[ring.len() - 1], self.tolerance) {
            ring.push(ring[0]);
        }

        Ok((ring, gaps))
    }

    /// Build a contour from segments lying in a constant-z plane, dropping z.
    pub fn build(&self, segments: &[Segment]) -> std::result::Result<Contour, GeometryError> {
        let (ring, gaps) = self.chain(segments)?;
        self.finish(ring.into_iter().map(|p| p.truncate()).collect(), gaps)
    }

    /// Build a contour from segments in an arbitrarily oriented plane,
    /// projecting through the given frame.
    pub fn build_in_frame(
        &self,
        segments: &[Segment],
        frame: &PlaneFrame,
    ) -> std::result::Result<Contour, GeometryError> {
        let (ring, gaps) = self.chain(segments)?;
        self.finish(ring.into_iter().map(|p| frame.project(p)).collect(), gaps)
    }

    fn finish(
        &self,
        points: Vec<Point2>,
        gaps: usize,
    ) -> std::result::Result<Contour, GeometryError> {
        let contour = Contour {
            points,
            gap_count: gaps,
        };
        let distinct = contour.distinct_count(self.tolerance);
        if distinct < 3 {
            return Err(GeometryError::DegenerateContour { count: distinct });
        }
        if gaps > 0 {
            warn!("contour built with {gaps} connectivity gap(s); ring may not be simple");
        }
        Ok(contour)
    }
}

impl Default for ContourBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ARC_RESOLUTION, JOIN_TOLERANCE)
    }
}
