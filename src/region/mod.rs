//! Fillable region model.
//!
//! A [`Region`] is an outer [`Contour`] plus zero or one interior hole. The
//! fill generators and the exposure classifier only see the [`RegionOps`]
//! capability trait (point containment, horizontal cross-sections, centroid
//! and radius queries), so they stay agnostic of the geometry backend.
//!
//! The default backend delegates point predicates to the `geo` crate and ring
//! repair/union to Clipper (`geo-clipper`): near-degenerate rings are unified
//! through a self-union and, failing that, a buffer out-and-back pass, the
//! same relaxed-repair approach CAD outlines usually need.

use crate::contour::Contour;
use crate::geometry::{BoundingBox, Point2};
use crate::{CoordF, GeometryError};
use geo::{Centroid, EuclideanDistance, Intersects, LineString, MultiPolygon, Polygon as GeoPolygon};
use geo_clipper::{Clipper, EndType, JoinType};
use log::warn;
use serde::{Deserialize, Serialize};

/// Regions with a smaller area than this are rejected as degenerate.
const AREA_EPSILON: CoordF = 1e-9;

/// Coordinate scaling factor handed to Clipper. One integer step is 1e-6 of
/// a work-area unit, comfortably below every geometric tolerance in use.
const CLIPPER_SCALE: CoordF = 1_000_000.0;

/// Buffer distance for the out-and-back repair pass.
const REPAIR_BUFFER: CoordF = 1e-5;

/// A horizontal cross-section interval `[start, end]` at some height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: CoordF,
    pub end: CoordF,
}

impl Span {
    /// Create a new span.
    pub fn new(start: CoordF, end: CoordF) -> Self {
        Self { start, end }
    }

    /// Span length.
    #[inline]
    pub fn length(&self) -> CoordF {
        self.end - self.start
    }
}

/// Geometric queries a fill generator or classifier needs from a region.
pub trait RegionOps {
    /// Check whether a point lies in the fillable area: inside or on the
    /// outer ring, and not inside the hole.
    fn contains(&self, p: Point2) -> bool;

    /// Check whether a point lies inside or on the outer ring, ignoring the
    /// hole.
    fn in_outer(&self, p: Point2) -> bool;

    /// Check whether a point lies inside or on the hole ring.
    fn in_hole(&self, p: Point2) -> bool;

    /// Distance from a point to the outer ring.
    fn boundary_distance(&self, p: Point2) -> CoordF;

    /// The region's cross-section at height `y`, as ordered disjoint spans
    /// with the hole subtracted.
    fn intersect_horizontal(&self, y: CoordF) -> Vec<Span>;

    /// Bounding box of the outer ring.
    fn bounding_box(&self) -> BoundingBox;

    /// Centroid of the outer ring.
    fn centroid(&self) -> Point2;

    /// Largest distance from `p` to the outer ring's vertices.
    fn max_radius_from(&self, p: Point2) -> CoordF;
}

/// Point-containment queries over a single ring.
///
/// Used where no full region exists yet (hierarchy detection runs on raw
/// outlines before any parent/child pairing is known).
pub struct RingQuery {
    polygon: GeoPolygon<CoordF>,
}

impl RingQuery {
    /// Build a query for one contour ring.
    pub fn new(contour: &Contour) -> Self {
        Self {
            polygon: to_geo_polygon(contour),
        }
    }

    /// Check whether a point lies inside or on the ring.
    pub fn contains(&self, p: Point2) -> bool {
        self.polygon.intersects(&geo::Point::new(p.x, p.y))
    }
}

/// A fillable area: outer boundary plus an optional interior void.
#[derive(Clone, Debug)]
pub struct Region {
    outer: Contour,
    hole: Option<Contour>,
    outer_geo: GeoPolygon<CoordF>,
    hole_geo: Option<GeoPolygon<CoordF>>,
}

impl Region {
    /// Build a region from an outer contour and an optional hole.
    ///
    /// Self-intersecting rings go through the repair capability first; the
    /// hole, if present, must lie entirely within the outer ring.
    pub fn new(outer: Contour, hole: Option<Contour>) -> std::result::Result<Self, GeometryError> {
        let outer = Self::validated(outer)?;
        if outer.area() < AREA_EPSILON {
            return Err(GeometryError::ZeroArea);
        }

        let hole = hole.map(Self::validated).transpose()?;
        if let Some(hole) = &hole {
            let query = RingQuery::new(&outer);
            if !hole.ring().iter().all(|p| query.contains(*p)) {
                return Err(GeometryError::HoleOutsideBoundary);
            }
        }

        let outer_geo = to_geo_polygon(&outer);
        let hole_geo = hole.as_ref().map(to_geo_polygon);

        Ok(Self {
            outer,
            hole,
            outer_geo,
            hole_geo,
        })
    }

    /// Build a region with no void.
    pub fn without_hole(outer: Contour) -> std::result::Result<Self, GeometryError> {
        Self::new(outer, None)
    }

    /// The outer contour.
    pub fn outer(&self) -> &Contour {
        &self.outer
    }

    /// The hole contour, if any.
    pub fn hole(&self) -> Option<&Contour> {
        self.hole.as_ref()
    }

    fn validated(contour: Contour) -> std::result::Result<Contour, GeometryError> {
        if !contour.self_intersects() {
            return Ok(contour);
        }
        warn!("ring self-intersects; running repair");
        repair_ring(&contour)
    }
}

impl RegionOps for Region {
    fn contains(&self, p: Point2) -> bool {
        self.in_outer(p) && !self.in_hole(p)
    }

    fn in_outer(&self, p: Point2) -> bool {
        self.outer_geo.intersects(&geo::Point::new(p.x, p.y))
    }

    fn in_hole(&self, p: Point2) -> bool {
        match &self.hole_geo {
            Some(hole) => hole.intersects(&geo::Point::new(p.x, p.y)),
            None => false,
        }
    }

    fn boundary_distance(&self, p: Point2) -> CoordF {
        self.outer_geo
            .exterior()
            .euclidean_distance(&geo::Point::new(p.x, p.y))
    }

    fn intersect_horizontal(&self, y: CoordF) -> Vec<Span> {
        let outer = crossing_spans(self.outer.ring(), y);
        match &self.hole {
            Some(hole) => subtract_spans(&outer, &crossing_spans(hole.ring(), y)),
            None => outer,
        }
    }

    fn bounding_box(&self) -> BoundingBox {
        self.outer.bounding_box()
    }

    fn centroid(&self) -> Point2 {
        match self.outer_geo.centroid() {
            Some(c) => Point2::new(c.x(), c.y()),
            None => self.outer.bounding_box().center(),
        }
    }

    fn max_radius_from(&self, p: Point2) -> CoordF {
        self.outer.max_radius_from(p)
    }
}

/// Collect the ordered inside-intervals of a ring at height `y`.
///
/// Edge crossings are gathered with a half-open rule (an edge crosses when
/// its endpoints straddle `y`, vertices counted on one side only), sorted,
/// and paired even-odd into spans.
fn crossing_spans(ring: &[Point2], y: CoordF) -> Vec<Span> {
    let n = ring.len();
    if n < 3 {
        return Vec::new();
    }

    let mut xs = Vec::new();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        if (a.y <= y) != (b.y <= y) {
            let t = (y - a.y) / (b.y - a.y);
            xs.push(a.x + t * (b.x - a.x));
        }
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    xs.chunks_exact(2)
        .map(|pair| Span::new(pair[0], pair[1]))
        .filter(|s| s.length() > 0.0)
        .collect()
}

/// Subtract `holes` from `spans`, both sorted and disjoint.
fn subtract_spans(spans: &[Span], holes: &[Span]) -> Vec<Span> {
    let mut result = Vec::with_capacity(spans.len() + holes.len());
    for span in spans {
        let mut cursor = span.start;
        for hole in holes {
            if hole.end <= cursor || hole.start >= span.end {
                continue;
            }
            if hole.start > cursor {
                result.push(Span::new(cursor, hole.start));
            }
            cursor = cursor.max(hole.end);
        }
        if cursor < span.end {
            result.push(Span::new(cursor, span.end));
        }
    }
    result
}

/// Convert a contour to a closed `geo` polygon ring.
fn to_geo_polygon(contour: &Contour) -> GeoPolygon<CoordF> {
    let mut ring: Vec<geo::Coord<CoordF>> = contour
        .points()
        .iter()
        .map(|p| geo::Coord { x: p.x, y: p.y })
        .collect();
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(*first);
        }
    }
    GeoPolygon::new(LineString::new(ring), vec![])
}

/// Convert a `geo` polygon's exterior back to a contour.
fn from_geo_polygon(polygon: &GeoPolygon<CoordF>) -> std::result::Result<Contour, GeometryError> {
    let points: Vec<Point2> = polygon
        .exterior()
        .coords()
        .map(|c| Point2::new(c.x, c.y))
        .collect();
    Contour::from_ring(points)
}

/// Repair a near-degenerate or self-intersecting ring.
///
/// First pass: Clipper self-union, which re-polygonizes crossing edges; the
/// largest resulting lobe wins. Second pass: buffer out and back by a small
/// distance. Fails when neither pass yields a usable ring.
pub fn repair_ring(contour: &Contour) -> std::result::Result<Contour, GeometryError> {
    let polygon = to_geo_polygon(contour);

    let unioned = polygon.union(&polygon, CLIPPER_SCALE);
    if let Some(best) = largest_polygon(&unioned) {
        if let Ok(repaired) = from_geo_polygon(best) {
            if !repaired.self_intersects() {
                return Ok(repaired);
            }
        }
    }

    let buffered = polygon
        .offset(
            REPAIR_BUFFER,
            JoinType::Miter(2.0),
            EndType::ClosedPolygon,
            CLIPPER_SCALE,
        )
        .offset(
            -REPAIR_BUFFER,
            JoinType::Miter(2.0),
            EndType::ClosedPolygon,
            CLIPPER_SCALE,
        );
    if let Some(best) = largest_polygon(&buffered) {
        if let Ok(repaired) = from_geo_polygon(best) {
            if !repaired.self_intersects() {
                return Ok(repaired);
            }
        }
    }

    Err(GeometryError::InvalidRing(
        "self-intersections survived union and buffer repair".into(),
    ))
}

/// Unify a set of rings into their merged outer boundaries.
pub fn union_rings(contours: &[Contour]) -> Vec<Contour> {
    if contours.is_empty() {
        return Vec::new();
    }

    let mut merged = MultiPolygon::new(vec![to_geo_polygon(&contours[0])]);
    for contour in &contours[1..] {
        let next = MultiPolygon::new(vec![to_geo_polygon(contour)]);
        merged = merged.union(&next, CLIPPER_SCALE);
    }

    merged
        .0
        .iter()
        .filter_map(|p| from_geo_polygon(p).ok())
        .collect()
}

fn largest_polygon(multi: &MultiPolygon<CoordF>) -> Option<&GeoPolygon<CoordF>> {
    use geo::Area;
    multi
        .0
        .iter()
        .max_by(|a, b| {
            a.unsigned_area()
                .partial_cmp(&b.unsigned_area())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: CoordF, cy: CoordF, side: CoordF) -> Contour {
        let h = side / 2.0;
        Contour::from_ring(vec![
            Point2::new(cx - h, cy - h),
            Point2::new(cx + h, cy - h),
            Point2::new(cx + h, cy + h),
            Point2::new(cx - h, cy + h),
        ])
        .unwrap()
    }

    #[test]
    fn test_contains_with_hole() {
        let region = Region::new(square(0.0, 0.0, 10.0), Some(square(0.0, 0.0, 2.0))).unwrap();
        assert!(region.contains(Point2::new(3.0, 3.0)));
        assert!(!region.contains(Point2::new(0.0, 0.0))); // in the hole
        assert!(!region.contains(Point2::new(6.0, 0.0))); // outside
        assert!(region.contains(Point2::new(5.0, 0.0))); // on the outer ring
        assert!(region.in_outer(Point2::new(0.0, 0.0)));
        assert!(region.in_hole(Point2::new(1.0, 1.0))); // on the hole ring
    }

    #[test]
    fn test_hole_outside_boundary_rejected() {
        let err = Region::new(square(0.0, 0.0, 10.0), Some(square(20.0, 0.0, 2.0))).unwrap_err();
        assert!(matches!(err, GeometryError::HoleOutsideBoundary));
    }

    #[test]
    fn test_intersect_horizontal_solid() {
        let region = Region::without_hole(square(0.0, 0.0, 10.0)).unwrap();
        let spans = region.intersect_horizontal(0.0);
        assert_eq!(spans.len(), 1);
        assert!((spans[0].start + 5.0).abs() < 1e-9);
        assert!((spans[0].end - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersect_horizontal_splits_at_hole() {
        let region = Region::new(square(0.0, 0.0, 10.0), Some(square(0.0, 0.0, 2.0))).unwrap();
        let spans = region.intersect_horizontal(0.0);
        assert_eq!(spans.len(), 2);
        assert!((spans[0].start + 5.0).abs() < 1e-9);
        assert!((spans[0].end + 1.0).abs() < 1e-9);
        assert!((spans[1].start - 1.0).abs() < 1e-9);
        assert!((spans[1].end - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_intersect_horizontal_misses_region() {
        let region = Region::without_hole(square(0.0, 0.0, 10.0)).unwrap();
        assert!(region.intersect_horizontal(8.0).is_empty());
    }

    #[test]
    fn test_centroid_and_radius() {
        let region = Region::without_hole(square(2.0, 3.0, 10.0)).unwrap();
        let c = region.centroid();
        assert!(c.coincides_with(&Point2::new(2.0, 3.0), 1e-9));
        let r = region.max_radius_from(c);
        assert!((r - (50.0 as CoordF).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_distance() {
        let region = Region::without_hole(square(0.0, 0.0, 10.0)).unwrap();
        assert!(region.boundary_distance(Point2::new(5.0, 0.0)).abs() < 1e-9);
        assert!((region.boundary_distance(Point2::new(0.0, 0.0)) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_rejected() {
        let sliver = Contour::from_ring(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(5.0, 0.0),
            Point2::new(2.0, 0.0),
        ]);
        // Degenerate rings may already fail at construction; if one gets
        // through, the region must reject it.
        if let Ok(contour) = sliver {
            assert!(Region::without_hole(contour).is_err());
        }
    }

    #[test]
    fn test_repair_bowtie() {
        let bowtie = Contour::from_ring(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        ])
        .unwrap();
        let repaired = repair_ring(&bowtie).unwrap();
        assert!(!repaired.self_intersects());
    }

    #[test]
    fn test_union_rings_merges_overlap() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(4.0, 0.0, 10.0);
        let merged = union_rings(&[a, b]);
        assert_eq!(merged.len(), 1);
        // 10x10 + 10x10 - 6x10 overlap; Clipper quantizes at 1/1000 units.
        assert!((merged[0].area() - 140.0).abs() < 0.1);
    }

    #[test]
    fn test_subtract_spans() {
        let spans = vec![Span::new(0.0, 10.0)];
        let holes = vec![Span::new(2.0, 3.0), Span::new(5.0, 6.0)];
        let result = subtract_spans(&spans, &holes);
        assert_eq!(
            result,
            vec![Span::new(0.0, 2.0), Span::new(3.0, 5.0), Span::new(6.0, 10.0)]
        );
    }
}
