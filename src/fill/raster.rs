//! Serpentine scanline fill.
//!
//! Sweeps horizontal lines across the region's bounding box at fixed spacing,
//! takes the hole-aware cross-section of each, and samples points along the
//! resulting spans. Alternate sweep lines run in opposite directions
//! (boustrophedon ordering) so the head never travels back across the region
//! between lines; a duplicated point marks the jump between distinct lines.

use crate::geometry::Point2;
use crate::region::RegionOps;
use crate::CoordF;

/// Generate the raster fill point sequence for a region.
pub fn generate<R: RegionOps>(region: &R, spacing: CoordF) -> Vec<Point2> {
    let bbox = region.bounding_box();
    if bbox.is_empty() || spacing <= 0.0 {
        return Vec::new();
    }

    let mut points: Vec<Point2> = Vec::new();
    let mut index = 0usize;

    loop {
        let y = bbox.min.y + index as CoordF * spacing;
        if y > bbox.max.y {
            break;
        }

        let spans = region.intersect_horizontal(y);
        let mut line_points: Vec<Point2> = Vec::new();
        for span in &spans {
            for x in sample_span(span.start, span.end, spacing) {
                line_points.push(Point2::new(x, y));
            }
        }

        // Even sweep lines run left to right, odd ones right to left. Empty
        // lines still advance the index so the direction stays tied to the
        // sweep position, not to how many lines hit the region.
        if index % 2 == 1 {
            line_points.reverse();
        }

        if !line_points.is_empty() {
            if let Some(&last) = points.last() {
                // Travel marker between distinct sweep lines.
                points.push(last);
            }
            points.extend(line_points);
        }

        index += 1;
    }

    points
}

/// Sample a span at roughly `spacing` pitch, endpoints included, at least two
/// points.
fn sample_span(start: CoordF, end: CoordF, spacing: CoordF) -> Vec<CoordF> {
    let length = end - start;
    if length <= 0.0 {
        return vec![start, end];
    }
    let steps = ((length / spacing).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| start + length * i as CoordF / steps as CoordF)
        .collect()
}
