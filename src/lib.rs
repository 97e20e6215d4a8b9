//! # Lithofill
//!
//! An area-fill and exposure-assignment engine for direct laser writing.
//!
//! The library turns planar contour descriptions (closed outlines built from
//! line and arc segments, possibly nested as an outer boundary with an
//! interior void) into a dense, shutter-annotated path that can drive a
//! point-by-point fabrication process:
//! - Contour assembly from line/arc segment soups, with arc interpolation
//! - Parent/child containment detection between contours
//! - Region model (outer boundary + optional void) with geometric queries
//! - Raster (serpentine scanline) and Archimedean spiral fill strategies
//! - Zone classification and shutter-state assignment per path segment
//! - Collinear same-state path simplification
//! - Motion-program emission (AeroBasic-style) with color-based feedrates
//!
//! ## Example
//!
//! ```rust,ignore
//! use lithofill::{fill_planes, parse_planes_file, JobConfig};
//!
//! let planes = parse_planes_file("planes.txt")?;
//! let config = JobConfig::default();
//! let trajectory = fill_planes(&planes, &config)?;
//! ```

// Core modules
pub mod config;
pub mod contour;
pub mod emit;
pub mod exposure;
pub mod fill;
pub mod geometry;
pub mod hierarchy;
pub mod pipeline;
pub mod planes;
pub mod region;

// Re-export commonly used types
pub use config::{FillStrategy, JobConfig};
pub use contour::{interpolate_arc, Contour, ContourBuilder, Segment};
pub use exposure::{
    assign_exposure, classify_zone, simplify_segments, ExposureState, TrajectorySegment, Zone,
};
pub use fill::{FillConfig, FillGenerator, FillResult, SpiralFill};
pub use geometry::{BoundingBox, PlaneFrame, Point2, Point3};
pub use hierarchy::{detect_hierarchy, ContainmentRelation, PlaneId};
pub use pipeline::{fill_each_plane, fill_plane, fill_planes, Trajectory};
pub use planes::{parse_planes, parse_planes_file, Plane};
pub use region::{repair_ring, union_rings, Region, RegionOps, RingQuery, Span};

/// Floating-point coordinate type used throughout the engine.
/// Coordinates are in work-area units (micrometers).
pub type CoordF = f64;

/// Result type used throughout the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while constructing or validating geometry.
///
/// All geometry failures are recoverable at per-plane granularity: callers
/// skip the offending plane and continue with the rest of the batch.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("contour has {count} distinct points, at least 3 required")]
    DegenerateContour { count: usize },

    #[error("ring is invalid and could not be repaired: {0}")]
    InvalidRing(String),

    #[error("region has zero area")]
    ZeroArea,

    #[error("hole is not contained in the outer boundary")]
    HoleOutsideBoundary,

    #[error("no segments to build a contour from")]
    EmptyInput,
}

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
