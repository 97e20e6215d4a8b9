//! Containment hierarchy detection between plane outlines.
//!
//! Every ordered pair of outlines is tested for full containment: a child's
//! ring must lie entirely inside (or on) the parent's ring, vertex by vertex,
//! not merely by centroid. Relations are keyed by stable plane identifiers so
//! reordering or filtering the input list cannot silently re-associate them.
//!
//! Nesting is not assumed exclusive: with three concentric outlines the
//! innermost is reported as a child of both enclosing ones. Consumers that
//! only model a two-level boundary-plus-void region take the first relation.

use crate::contour::Contour;
use crate::region::RingQuery;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a plane within a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaneId(pub u32);

impl fmt::Display for PlaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plane {}", self.0)
    }
}

/// A detected parent/child containment pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainmentRelation {
    pub parent: PlaneId,
    pub child: PlaneId,
}

/// Detect all containment relations among the given outlines.
///
/// O(n²) ring-containment tests; n is the number of planes in a job, which
/// is small. Relations are returned in discovery order (outer loop parent,
/// inner loop child).
pub fn detect_hierarchy(outlines: &[(PlaneId, Contour)]) -> Vec<ContainmentRelation> {
    let mut relations = Vec::new();

    for (parent_id, parent) in outlines {
        let query = RingQuery::new(parent);
        for (child_id, child) in outlines {
            if parent_id == child_id {
                continue;
            }
            if contour_within(child, &query) {
                relations.push(ContainmentRelation {
                    parent: *parent_id,
                    child: *child_id,
                });
            }
        }
    }

    relations
}

/// Check that every boundary point of `child` lies inside or on the parent
/// ring.
fn contour_within(child: &Contour, parent: &RingQuery) -> bool {
    child.ring().iter().all(|p| parent.contains(*p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;

    fn square(side: f64) -> Contour {
        let h = side / 2.0;
        Contour::from_ring(vec![
            Point2::new(-h, -h),
            Point2::new(h, -h),
            Point2::new(h, h),
            Point2::new(-h, h),
        ])
        .unwrap()
    }

    #[test]
    fn test_nested_squares() {
        let outlines = vec![(PlaneId(0), square(10.0)), (PlaneId(1), square(2.0))];
        let relations = detect_hierarchy(&outlines);
        assert_eq!(
            relations,
            vec![ContainmentRelation {
                parent: PlaneId(0),
                child: PlaneId(1),
            }]
        );
    }

    #[test]
    fn test_order_independent_of_input_position() {
        let outlines = vec![(PlaneId(7), square(2.0)), (PlaneId(3), square(10.0))];
        let relations = detect_hierarchy(&outlines);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].parent, PlaneId(3));
        assert_eq!(relations[0].child, PlaneId(7));
    }

    #[test]
    fn test_disjoint_squares_have_no_relation() {
        let offset: Vec<Point2> = square(2.0)
            .ring()
            .iter()
            .map(|p| Point2::new(p.x + 20.0, p.y))
            .collect();
        let far = Contour::from_ring(offset).unwrap();
        let outlines = vec![(PlaneId(0), square(10.0)), (PlaneId(1), far)];
        assert!(detect_hierarchy(&outlines).is_empty());
    }

    #[test]
    fn test_three_level_nesting_reports_all_pairs() {
        let outlines = vec![
            (PlaneId(0), square(10.0)),
            (PlaneId(1), square(6.0)),
            (PlaneId(2), square(2.0)),
        ];
        let relations = detect_hierarchy(&outlines);
        assert_eq!(relations.len(), 3);
        assert!(relations.contains(&ContainmentRelation {
            parent: PlaneId(0),
            child: PlaneId(2),
        }));
        assert!(relations.contains(&ContainmentRelation {
            parent: PlaneId(1),
            child: PlaneId(2),
        }));
        // First discovered relation is the outermost parent's first child.
        assert_eq!(relations[0].parent, PlaneId(0));
        assert_eq!(relations[0].child, PlaneId(1));
    }
}
