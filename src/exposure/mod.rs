//! Zone classification and shutter-state assignment.
//!
//! Every consecutive pair of fill points becomes a directed
//! [`TrajectorySegment`] with a shutter state: `Open` only when both
//! endpoints sit in the allowed area (inside the outer ring, outside the
//! void). A point within tolerance of the outer ring forces its segments
//! `Open` regardless - boundary samples routinely land a floating-point hair
//! outside the ring, and closing the shutter there would notch the
//! silhouette edge.

pub mod simplify;

pub use simplify::{simplify_segments, COLLINEAR_TOLERANCE};

use crate::geometry::Point2;
use crate::region::RegionOps;
use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default distance below which a point counts as on the outer boundary.
pub const BOUNDARY_TOLERANCE: CoordF = 1e-3;

/// Shutter state of a trajectory segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureState {
    /// Shutter open: fabrication energy active.
    Open,
    /// Shutter closed: travel only.
    Closed,
}

impl fmt::Display for ExposureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExposureState::Open => write!(f, "open"),
            ExposureState::Closed => write!(f, "closed"),
        }
    }
}

/// Geometric zone of a point relative to a region with a void.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Zone {
    /// Inside the outer ring and not inside the void.
    Allowed,
    /// Inside the void.
    Void,
    /// Outside the outer ring.
    Outside,
}

/// A directed path segment with its shutter state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySegment {
    pub start: Point2,
    pub end: Point2,
    pub state: ExposureState,
}

impl TrajectorySegment {
    /// Create a new segment.
    pub fn new(start: Point2, end: Point2, state: ExposureState) -> Self {
        Self { start, end, state }
    }

    /// Segment length.
    pub fn length(&self) -> CoordF {
        self.start.distance(&self.end)
    }
}

/// Classify a point's zone.
///
/// The void check runs first and both ring tests are boundary-inclusive, so a
/// point on the void's ring is `Void`, never `Allowed` - the shutter stays
/// closed right up to the edge of a hole.
pub fn classify_zone<R: RegionOps>(region: &R, p: Point2) -> Zone {
    if region.in_hole(p) {
        Zone::Void
    } else if region.in_outer(p) {
        Zone::Allowed
    } else {
        Zone::Outside
    }
}

/// Assign shutter states to every consecutive pair of fill points.
///
/// `boundary_tolerance` is the on-boundary override distance against the
/// outer ring.
pub fn assign_exposure<R: RegionOps>(
    region: &R,
    points: &[Point2],
    boundary_tolerance: CoordF,
) -> Vec<TrajectorySegment> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut segments = Vec::with_capacity(points.len() - 1);
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        let zone1 = classify_zone(region, p1);
        let zone2 = classify_zone(region, p2);

        let mut state = if zone1 == Zone::Allowed && zone2 == Zone::Allowed {
            ExposureState::Open
        } else {
            ExposureState::Closed
        };

        if region.boundary_distance(p1) < boundary_tolerance
            || region.boundary_distance(p2) < boundary_tolerance
        {
            state = ExposureState::Open;
        }

        segments.push(TrajectorySegment::new(p1, p2, state));
    }

    segments
}
