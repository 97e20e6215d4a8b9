//! Per-plane fill pipeline.
//!
//! Orchestrates the full flow: contours → hierarchy → region → fill points →
//! classified segments → simplified trajectory. Two entry points cover the
//! two job shapes:
//!
//! - [`fill_planes`] - the nested-region job: detect which plane contains
//!   which, fill the parent's area with the first detected child as a void,
//!   and return one trajectory. When no containment exists the first plane
//!   is filled with no void.
//! - [`fill_each_plane`] - the independent job: every plane is filled on its
//!   own (no voids), each projected through its own frame. Planes are
//!   processed in parallel; a malformed plane is logged and skipped, never
//!   fatal to the batch.
//!
//! Trajectories carry the metadata the downstream emitter needs: the source
//! plane id, its index color and constant z, and the projection frame for
//! lifting the 2D path back into 3D.

use crate::config::JobConfig;
use crate::contour::ContourBuilder;
use crate::exposure::{assign_exposure, simplify::state_length, simplify_segments, ExposureState, TrajectorySegment};
use crate::fill::FillGenerator;
use crate::geometry::PlaneFrame;
use crate::hierarchy::{detect_hierarchy, PlaneId};
use crate::planes::Plane;
use crate::region::Region;
use crate::{CoordF, Error, GeometryError, Result};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A finished fill job for one plane: the simplified shutter-annotated path
/// plus the metadata identifying where it belongs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Id of the plane the path fills.
    pub plane: PlaneId,
    /// Simplified path segments, in travel order.
    pub segments: Vec<TrajectorySegment>,
    /// Index color of the source plane (drives the feedrate downstream).
    pub color: Option<u32>,
    /// The plane's constant z coordinate.
    pub z: CoordF,
    /// Frame for lifting the 2D path back into 3D.
    pub frame: PlaneFrame,
}

impl Trajectory {
    /// Check whether the fill produced no segments (a no-op job).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total length written with the shutter open.
    pub fn open_length(&self) -> CoordF {
        state_length(&self.segments, ExposureState::Open)
    }

    /// Total length traveled with the shutter closed.
    pub fn closed_length(&self) -> CoordF {
        state_length(&self.segments, ExposureState::Closed)
    }
}

/// Fill the nested-region job described by a set of planes.
///
/// The hierarchy detector runs over all plane outlines; the first detected
/// relation picks the parent (outer boundary) and child (void). Without any
/// relation the first plane is the parent and there is no void. Only the
/// first relation is consumed - deeper nesting is reported by
/// [`detect_hierarchy`] but not modeled here.
pub fn fill_planes(planes: &[Plane], config: &JobConfig) -> Result<Trajectory> {
    config.validate()?;
    if planes.is_empty() {
        return Err(Error::Geometry(GeometryError::EmptyInput));
    }

    let builder = ContourBuilder::new(config.arc_resolution, config.join_tolerance);

    // Outlines for hierarchy detection; malformed planes are reported and
    // excluded, the rest of the batch continues.
    let mut outlines = Vec::with_capacity(planes.len());
    for plane in planes {
        match builder.build(&plane.segments) {
            Ok(contour) => outlines.push((plane.id, contour)),
            Err(e) => warn!("{}: skipped from hierarchy detection: {e}", plane.id),
        }
    }
    if outlines.is_empty() {
        return Err(Error::Geometry(GeometryError::EmptyInput));
    }

    let relations = detect_hierarchy(&outlines);
    let (parent_id, child_id) = match relations.first() {
        Some(rel) => {
            info!("detected hierarchy: {} contains {}", rel.parent, rel.child);
            (rel.parent, Some(rel.child))
        }
        None => {
            info!(
                "no containment detected; filling {} with no void",
                outlines[0].0
            );
            (outlines[0].0, None)
        }
    };

    let take = |id: PlaneId| outlines.iter().find(|(i, _)| *i == id).map(|(_, c)| c.clone());
    let Some(outer) = take(parent_id) else {
        return Err(Error::Geometry(GeometryError::EmptyInput));
    };
    let hole = child_id.and_then(take);

    let Some(parent) = planes.iter().find(|p| p.id == parent_id) else {
        return Err(Error::Geometry(GeometryError::EmptyInput));
    };
    let z = parent.constant_z();

    let region = Region::new(outer, hole)?;
    let segments = fill_region(&region, config);

    Ok(Trajectory {
        plane: parent_id,
        segments,
        color: parent.color,
        z,
        frame: PlaneFrame::horizontal(z),
    })
}

/// Fill one plane independently: own frame, no void.
pub fn fill_plane(plane: &Plane, config: &JobConfig) -> Result<Trajectory> {
    config.validate()?;

    let builder = ContourBuilder::new(config.arc_resolution, config.join_tolerance);
    let frame = plane.frame();
    let contour = builder.build_in_frame(&plane.segments, &frame)?;
    let region = Region::without_hole(contour)?;
    let segments = fill_region(&region, config);

    Ok(Trajectory {
        plane: plane.id,
        segments,
        color: plane.color,
        z: plane.constant_z(),
        frame,
    })
}

/// Fill every plane independently, in parallel.
///
/// Malformed planes are logged and skipped. Results come back ordered by
/// plane id regardless of scheduling.
pub fn fill_each_plane(planes: &[Plane], config: &JobConfig) -> Vec<Trajectory> {
    let mut trajectories: Vec<Trajectory> = planes
        .par_iter()
        .filter_map(|plane| match fill_plane(plane, config) {
            Ok(trajectory) => Some(trajectory),
            Err(e) => {
                warn!("{}: skipped: {e}", plane.id);
                None
            }
        })
        .collect();
    trajectories.sort_by_key(|t| t.plane);
    trajectories
}

/// The shared tail of both flows: fill, classify, simplify.
fn fill_region(region: &Region, config: &JobConfig) -> Vec<TrajectorySegment> {
    let generator = FillGenerator::new(config.strategy, config.fill_config());
    let fill = generator.generate(region);
    let classified = assign_exposure(region, &fill.points, config.boundary_tolerance);
    simplify_segments(&classified, config.collinear_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::Segment;
    use crate::exposure::ExposureState;
    use crate::geometry::{Point2, Point3};

    fn square_plane(id: u32, cx: f64, cy: f64, side: f64, z: f64, color: u32) -> Plane {
        let h = side / 2.0;
        let corners = [
            (cx - h, cy - h),
            (cx + h, cy - h),
            (cx + h, cy + h),
            (cx - h, cy + h),
        ];
        let segments = (0..4)
            .map(|i| {
                let (x0, y0) = corners[i];
                let (x1, y1) = corners[(i + 1) % 4];
                Segment::Line {
                    start: Point3::new(x0, y0, z),
                    end: Point3::new(x1, y1, z),
                }
            })
            .collect();
        Plane {
            id: PlaneId(id),
            segments,
            color: Some(color),
            extrusion: Some(Point3::unit_z()),
        }
    }

    fn in_hole(p: Point2) -> bool {
        p.x.abs() <= 1.0 && p.y.abs() <= 1.0
    }

    #[test]
    fn test_end_to_end_square_with_void() {
        // 10x10 outer boundary, 2x2 void, spacing 1.
        let planes = vec![
            square_plane(0, 0.0, 0.0, 10.0, 2.5, 6),
            square_plane(1, 0.0, 0.0, 2.0, 2.5, 3),
        ];
        let config = JobConfig {
            feature_diameter: 2.0,
            overlap: 0.5,
            ..Default::default()
        };

        let trajectory = fill_planes(&planes, &config).unwrap();
        assert_eq!(trajectory.plane, PlaneId(0));
        assert_eq!(trajectory.color, Some(6));
        assert_eq!(trajectory.z, 2.5);
        assert!(!trajectory.is_empty());

        let mut saw_open = false;
        let mut saw_closed_over_void = false;
        for segment in &trajectory.segments {
            // Nothing leaves the outer square.
            assert!(segment.start.x.abs() <= 5.0 + 1e-9);
            assert!(segment.start.y.abs() <= 5.0 + 1e-9);
            assert!(segment.end.x.abs() <= 5.0 + 1e-9);
            assert!(segment.end.y.abs() <= 5.0 + 1e-9);

            // Both endpoints in the void region -> shutter closed.
            if in_hole(segment.start) && in_hole(segment.end) && segment.length() > 0.0 {
                assert_eq!(segment.state, ExposureState::Closed);
            }

            // No exposure through the void's interior.
            let mid = (segment.start + segment.end) * 0.5;
            if mid.x.abs() < 1.0 && mid.y.abs() < 1.0 {
                assert_eq!(segment.state, ExposureState::Closed);
                saw_closed_over_void = true;
            }
            if segment.state == ExposureState::Open {
                saw_open = true;
            }
        }
        assert!(saw_open);
        assert!(saw_closed_over_void);
    }

    #[test]
    fn test_no_hierarchy_falls_back_to_first_plane() {
        let planes = vec![
            square_plane(0, 0.0, 0.0, 10.0, 0.0, 1),
            square_plane(1, 30.0, 0.0, 10.0, 0.0, 2),
        ];
        let config = JobConfig {
            feature_diameter: 2.0,
            overlap: 0.5,
            ..Default::default()
        };

        let trajectory = fill_planes(&planes, &config).unwrap();
        assert_eq!(trajectory.plane, PlaneId(0));
        // With no void, everything inside is written open.
        assert!(trajectory.open_length() > 0.0);
    }

    #[test]
    fn test_fill_each_plane_keeps_order_and_skips_bad_planes() {
        let broken = Plane {
            id: PlaneId(1),
            segments: vec![Segment::Line {
                start: Point3::zero(),
                end: Point3::new(1.0, 0.0, 0.0),
            }],
            color: None,
            extrusion: None,
        };
        let planes = vec![
            square_plane(0, 0.0, 0.0, 10.0, 0.0, 1),
            broken,
            square_plane(2, 30.0, 0.0, 4.0, 0.0, 2),
        ];
        let config = JobConfig {
            feature_diameter: 2.0,
            overlap: 0.5,
            ..Default::default()
        };

        let trajectories = fill_each_plane(&planes, &config);
        assert_eq!(trajectories.len(), 2);
        assert_eq!(trajectories[0].plane, PlaneId(0));
        assert_eq!(trajectories[1].plane, PlaneId(2));
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let config = JobConfig::default();
        assert!(fill_planes(&[], &config).is_err());
    }

    #[test]
    fn test_region_too_small_for_spacing_is_a_noop() {
        // A 1x1 square with 2.0 spacing: only the bottom sweep line hits,
        // and the resulting path may be empty after classification. Either
        // way the job must succeed.
        let planes = vec![square_plane(0, 0.0, 0.0, 1.0, 0.0, 1)];
        let config = JobConfig {
            feature_diameter: 4.0,
            overlap: 0.5,
            ..Default::default()
        };
        let trajectory = fill_planes(&planes, &config).unwrap();
        assert_eq!(trajectory.plane, PlaneId(0));
    }

    #[test]
    fn test_spiral_strategy_end_to_end() {
        let planes = vec![
            square_plane(0, 0.0, 0.0, 10.0, 0.0, 6),
            square_plane(1, 0.0, 0.0, 2.0, 0.0, 3),
        ];
        let config = JobConfig {
            feature_diameter: 1.0,
            overlap: 0.5,
            strategy: crate::fill::FillStrategy::Spiral,
            ..Default::default()
        };

        let trajectory = fill_planes(&planes, &config).unwrap();
        assert!(!trajectory.is_empty());
        // The spiral samples the void too; those segments are closed.
        assert!(trajectory
            .segments
            .iter()
            .any(|s| s.state == ExposureState::Closed
                && in_hole(s.start)
                && in_hole(s.end)));
        assert!(trajectory.open_length() > 0.0);
    }
}
