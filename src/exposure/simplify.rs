//! Trajectory simplification.
//!
//! Consecutive segments that share a shutter state and stay collinear are
//! merged into one, so straight raster runs collapse from hundreds of
//! samples to a single motion command. A state change always forces a split;
//! corners split on the collinearity test.

use super::{ExposureState, TrajectorySegment};
use crate::geometry::{cross2, Point2};
use crate::CoordF;

/// Default collinearity tolerance: cross products below this merge.
pub const COLLINEAR_TOLERANCE: CoordF = 1e-5;

/// Check whether three points are collinear within a tolerance, via the
/// cross product of the two hop vectors.
fn are_collinear(p: Point2, q: Point2, r: Point2, tolerance: CoordF) -> bool {
    cross2(q - p, r - q).abs() < tolerance
}

/// Merge runs of consecutive same-state, collinear segments.
///
/// The first point of the first segment and the last point of the last
/// segment are always preserved, and so is every state transition.
pub fn simplify_segments(
    segments: &[TrajectorySegment],
    tolerance: CoordF,
) -> Vec<TrajectorySegment> {
    let mut iter = segments.iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut simplified = Vec::new();
    let mut current = *first;

    for segment in iter {
        if segment.state == current.state
            && are_collinear(current.start, current.end, segment.end, tolerance)
        {
            current.end = segment.end;
        } else {
            simplified.push(current);
            current = *segment;
        }
    }
    simplified.push(current);

    simplified
}

/// Total length of the segments in a given state.
pub fn state_length(segments: &[TrajectorySegment], state: ExposureState) -> CoordF {
    segments
        .iter()
        .filter(|s| s.state == state)
        .map(|s| s.length())
        .sum()
}
