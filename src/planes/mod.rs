//! Processed-planes input model and text parser.
//!
//! Upstream CAD extraction writes plane blocks in a line-oriented text
//! format: a `Plano N` header, an extrusion vector, and `Arista N:` edge
//! records carrying kind, color, endpoints and (for arcs) center, radius and
//! angle fields. This module parses that format into [`Plane`] records.
//!
//! The parser is tolerant: an edge with missing endpoints is skipped with a
//! warning, unknown lines are ignored. A file with no usable planes is an
//! error.

use crate::contour::Segment;
use crate::geometry::{PlaneFrame, Point3};
use crate::hierarchy::PlaneId;
use crate::{CoordF, Error, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One planar outline: an ordered edge soup plus plane-level metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Stable identifier (input order).
    pub id: PlaneId,
    /// Edge segments tracing the outline.
    pub segments: Vec<Segment>,
    /// Index color of the outline (drives the feedrate downstream).
    pub color: Option<u32>,
    /// Extrusion (plane normal) vector, if the input carried one.
    pub extrusion: Option<Point3>,
}

impl Plane {
    /// The plane's z coordinate, taken from the first segment's start point.
    pub fn constant_z(&self) -> CoordF {
        self.segments.first().map(|s| s.start().z).unwrap_or(0.0)
    }

    /// The projection frame for this plane.
    ///
    /// Anchored at the mean of the segment endpoints, oriented by the
    /// extrusion vector (+Z when absent).
    pub fn frame(&self) -> PlaneFrame {
        let mut origin = Point3::zero();
        let mut count = 0usize;
        for segment in &self.segments {
            origin = origin + segment.start() + segment.end();
            count += 2;
        }
        if count > 0 {
            origin = origin * (1.0 / count as CoordF);
        }
        PlaneFrame::from_normal(origin, self.extrusion.unwrap_or(Point3::unit_z()))
    }
}

/// Parse a processed-planes file.
pub fn parse_planes_file<P: AsRef<Path>>(path: P) -> Result<Vec<Plane>> {
    let text = std::fs::read_to_string(path)?;
    parse_planes(&text)
}

/// Parse processed-planes text into plane records.
pub fn parse_planes(text: &str) -> Result<Vec<Plane>> {
    let mut planes: Vec<Plane> = Vec::new();
    let mut current: Option<PlaneDraft> = None;
    let mut skip_next = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if skip_next {
            skip_next = false;
            continue;
        }

        if trimmed.starts_with("Plano") {
            if let Some(draft) = current.take() {
                push_plane(&mut planes, draft);
            }
            current = Some(PlaneDraft::default());
            continue;
        }

        let Some(draft) = current.as_mut() else {
            continue;
        };

        if trimmed.starts_with("Vector de extrusión") {
            draft.extrusion = field_value(trimmed).and_then(parse_point);
        } else if trimmed.starts_with("Arista") {
            draft.finish_edge();
        } else if trimmed.starts_with("Tipo:") {
            draft.edge.kind = field_value(trimmed).map(str::to_owned);
        } else if trimmed.starts_with("Color:") {
            draft.edge.color = field_value(trimmed).and_then(|v| v.parse().ok());
        } else if trimmed.starts_with("Desde:") {
            draft.edge.start = field_value(trimmed).and_then(parse_point);
        } else if trimmed.starts_with("Hasta:") {
            draft.edge.end = field_value(trimmed).and_then(parse_point);
        } else if trimmed.starts_with("Radio:") {
            draft.edge.radius = field_value(trimmed).and_then(|v| v.parse().ok());
        } else if trimmed.starts_with("Ángulos:") {
            draft.edge.angles = field_value(trimmed).and_then(parse_angles);
        } else if trimmed.starts_with("Centro:") {
            draft.edge.center = field_value(trimmed).and_then(parse_point);
        } else if trimmed.starts_with("Entidad original:") {
            // The raw CAD entity dump follows on its own line.
            skip_next = true;
        }
    }
    if let Some(draft) = current.take() {
        push_plane(&mut planes, draft);
    }

    if planes.is_empty() {
        return Err(Error::Parse("no plane blocks found in input".into()));
    }
    Ok(planes)
}

/// The text after the first `:` of a field line.
fn field_value(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, v)| v.trim())
}

/// Parse a `(x, y[, z])` tuple.
fn parse_point(value: &str) -> Option<Point3> {
    let open = value.find('(')?;
    let close = value[open..].find(')')? + open;
    let coords: Vec<CoordF> = value[open + 1..close]
        .split(',')
        .filter_map(|c| c.trim().parse().ok())
        .collect();
    match coords.len() {
        2 => Some(Point3::new(coords[0], coords[1], 0.0)),
        3 => Some(Point3::new(coords[0], coords[1], coords[2])),
        _ => None,
    }
}

/// Parse a `start° - end°` angle pair (degrees).
fn parse_angles(value: &str) -> Option<(CoordF, CoordF)> {
    let cleaned = value.replace('°', "");
    let (a, b) = cleaned.split_once(" - ")?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

#[derive(Default)]
struct PlaneDraft {
    segments: Vec<Segment>,
    color: Option<u32>,
    extrusion: Option<Point3>,
    edge: EdgeDraft,
    edge_open: bool,
}

#[derive(Default)]
struct EdgeDraft {
    kind: Option<String>,
    color: Option<u32>,
    start: Option<Point3>,
    end: Option<Point3>,
    radius: Option<CoordF>,
    angles: Option<(CoordF, CoordF)>,
    center: Option<Point3>,
}

impl PlaneDraft {
    /// Close the in-flight edge record and start a new one.
    fn finish_edge(&mut self) {
        if self.edge_open {
            self.commit_edge();
        }
        self.edge = EdgeDraft::default();
        self.edge_open = true;
    }

    fn commit_edge(&mut self) {
        let edge = std::mem::take(&mut self.edge);
        let (Some(start), Some(end)) = (edge.start, edge.end) else {
            warn!("edge record missing start/end; skipped");
            return;
        };

        if self.color.is_none() {
            self.color = edge.color;
        }

        let is_arc = edge
            .kind
            .as_deref()
            .map(|k| k.to_uppercase().contains("ARC"))
            .unwrap_or(false);

        let segment = match (is_arc, edge.center, edge.radius, edge.angles) {
            (true, Some(center), Some(radius), Some((start_angle, end_angle))) => Segment::Arc {
                start,
                end,
                center,
                radius,
                start_angle,
                end_angle,
                extrusion: self.extrusion.unwrap_or(Point3::unit_z()),
            },
            _ => Segment::Line { start, end },
        };
        self.segments.push(segment);
    }
}

fn push_plane(planes: &mut Vec<Plane>, mut draft: PlaneDraft) {
    if draft.edge_open {
        draft.commit_edge();
    }
    if draft.segments.is_empty() {
        warn!("plane block with no usable edges; skipped");
        return;
    }
    planes.push(Plane {
        id: PlaneId(planes.len() as u32),
        segments: draft.segments,
        color: draft.color,
        extrusion: draft.extrusion,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
PLANOS PROCESADOS:

Plano 1 (Agrupado):
Total de aristas: 2
Vector de extrusión calculado: (0.0, 0.0, 1.0)

  Arista 1:
    Tipo: LINE
    Color: 6
    Desde: (0.0, 0.0, 2.5)
    Hasta: (10.0, 0.0, 2.5)
    Entidad original:
    {'type': 'LINE'}

  Arista 2:
    Tipo: ARC
    Color: 6
    Desde: (10.0, 0.0, 2.5)
    Hasta: (0.0, 0.0, 2.5)
    Radio: 5.00000
    Ángulos: 0.00000° - 180.00000°
    Centro: (5.0, 0.0, 2.5)

Plano 2 (Agrupado):
Total de aristas: 1
Vector de extrusión calculado: (0.0, 0.0, 1.0)

  Arista 1:
    Tipo: LINE
    Color: 3
    Desde: (2.0, 0.5, 2.5)
    Hasta: (3.0, 0.5, 2.5)
";

    #[test]
    fn test_parse_sample() {
        let planes = parse_planes(SAMPLE).unwrap();
        assert_eq!(planes.len(), 2);

        let first = &planes[0];
        assert_eq!(first.id, PlaneId(0));
        assert_eq!(first.color, Some(6));
        assert_eq!(first.segments.len(), 2);
        assert_eq!(first.extrusion, Some(Point3::unit_z()));
        assert_eq!(first.constant_z(), 2.5);

        match &first.segments[1] {
            Segment::Arc {
                radius,
                start_angle,
                end_angle,
                center,
                ..
            } => {
                assert_eq!(*radius, 5.0);
                assert_eq!(*start_angle, 0.0);
                assert_eq!(*end_angle, 180.0);
                assert_eq!(*center, Point3::new(5.0, 0.0, 2.5));
            }
            other => panic!("expected arc, got {other:?}"),
        }

        assert_eq!(planes[1].color, Some(3));
    }

    #[test]
    fn test_edge_without_endpoints_is_skipped() {
        let text = "\
Plano 1:
  Arista 1:
    Tipo: LINE
    Color: 1
  Arista 2:
    Tipo: LINE
    Desde: (0.0, 0.0, 0.0)
    Hasta: (1.0, 0.0, 0.0)
";
        let planes = parse_planes(text).unwrap();
        assert_eq!(planes.len(), 1);
        assert_eq!(planes[0].segments.len(), 1);
        // The broken first edge never contributed its color.
        assert_eq!(planes[0].color, None);
    }

    #[test]
    fn test_no_planes_is_an_error() {
        assert!(parse_planes("nothing to see here\n").is_err());
    }

    #[test]
    fn test_parse_point_two_coords() {
        assert_eq!(parse_point("(1.0, 2.0)"), Some(Point3::new(1.0, 2.0, 0.0)));
        assert_eq!(parse_point("nope"), None);
    }

    #[test]
    fn test_parse_angles_negative() {
        assert_eq!(parse_angles("-10.00000° - 20.00000°"), Some((-10.0, 20.0)));
    }
}
