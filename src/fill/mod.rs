//! Fill strategy dispatch.
//!
//! Two interchangeable strategies cover a region with sample points:
//! - [`FillStrategy::Raster`] - serpentine horizontal scanlines
//! - [`FillStrategy::Spiral`] - Archimedean spiral from the centroid
//!
//! Both work against the [`RegionOps`](crate::region::RegionOps) capability
//! trait and share the same spacing model: `spacing = feature_diameter ×
//! (1 − overlap)`, the center-to-center distance at which adjacent written
//! features still fuse.

pub mod raster;
pub mod spiral;

pub use spiral::SpiralFill;

use crate::geometry::Point2;
use crate::region::RegionOps;
use crate::CoordF;
use log::warn;
use serde::{Deserialize, Serialize};

/// Fill strategy selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    /// Serpentine horizontal scanlines.
    #[default]
    Raster,
    /// Archimedean spiral from the region centroid.
    Spiral,
}

impl std::fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FillStrategy::Raster => write!(f, "raster"),
            FillStrategy::Spiral => write!(f, "spiral"),
        }
    }
}

/// Spacing parameters shared by both strategies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FillConfig {
    /// Written feature (voxel) diameter, in work-area units.
    pub feature_diameter: CoordF,
    /// Fractional overlap between adjacent features, in `[0, 1)`.
    pub overlap: CoordF,
}

impl FillConfig {
    /// Create a config from a feature diameter and fractional overlap.
    pub fn new(feature_diameter: CoordF, overlap: CoordF) -> Self {
        Self {
            feature_diameter,
            overlap,
        }
    }

    /// The sample spacing: `feature_diameter × (1 − overlap)`.
    pub fn spacing(&self) -> CoordF {
        self.feature_diameter * (1.0 - self.overlap)
    }
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            feature_diameter: 0.2,
            overlap: 0.5,
        }
    }
}

/// The point sequence a fill strategy produced for a region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FillResult {
    /// Ordered sample points. Adjacent duplicates mark travel jumps.
    pub points: Vec<Point2>,
    /// Strategy that produced the points.
    pub strategy: FillStrategy,
}

impl FillResult {
    /// Check whether the fill produced no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Fill generator: dispatches a region to the configured strategy.
#[derive(Clone, Copy, Debug, Default)]
pub struct FillGenerator {
    strategy: FillStrategy,
    config: FillConfig,
}

impl FillGenerator {
    /// Create a generator for the given strategy and spacing parameters.
    pub fn new(strategy: FillStrategy, config: FillConfig) -> Self {
        Self { strategy, config }
    }

    /// The configured strategy.
    pub fn strategy(&self) -> FillStrategy {
        self.strategy
    }

    /// The configured spacing parameters.
    pub fn config(&self) -> &FillConfig {
        &self.config
    }

    /// Generate the fill point sequence for a region.
    ///
    /// An empty result is not an error: regions smaller than the spacing, or
    /// degenerate spirals, simply yield no points and downstream consumers
    /// treat the job as a no-op.
    pub fn generate<R: RegionOps>(&self, region: &R) -> FillResult {
        let spacing = self.config.spacing();
        let points = match self.strategy {
            FillStrategy::Raster => raster::generate(region, spacing),
            FillStrategy::Spiral => spiral::generate(region, spacing).points,
        };

        if points.is_empty() {
            warn!(
                "{} fill produced no points (spacing {spacing}); treating as a no-op job",
                self.strategy
            );
        }

        FillResult {
            points,
            strategy: self.strategy,
        }
    }

    /// Generate a spiral fill with its parallel inside flags, regardless of
    /// the configured strategy.
    pub fn generate_spiral<R: RegionOps>(&self, region: &R) -> SpiralFill {
        spiral::generate(region, self.config.spacing())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::Contour;
    use crate::region::Region;

    fn square_region(side: CoordF) -> Region {
        let h = side / 2.0;
        let outer = Contour::from_ring(vec![
            Point2::new(-h, -h),
            Point2::new(h, -h),
            Point2::new(h, h),
            Point2::new(-h, h),
        ])
        .unwrap();
        Region::without_hole(outer).unwrap()
    }

    #[test]
    fn test_spacing_from_diameter_and_overlap() {
        let config = FillConfig::new(2.0, 0.5);
        assert!((config.spacing() - 1.0).abs() < 1e-12);

        let no_overlap = FillConfig::new(2.0, 0.0);
        assert!((no_overlap.spacing() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_dispatch_raster() {
        let region = square_region(10.0);
        let generator = FillGenerator::new(FillStrategy::Raster, FillConfig::new(2.0, 0.5));
        let result = generator.generate(&region);
        assert_eq!(result.strategy, FillStrategy::Raster);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_dispatch_spiral() {
        let region = square_region(10.0);
        let generator = FillGenerator::new(FillStrategy::Spiral, FillConfig::new(2.0, 0.5));
        let result = generator.generate(&region);
        assert_eq!(result.strategy, FillStrategy::Spiral);
        assert!(!result.is_empty());

        // The flagged variant yields the same samples with parallel flags.
        let flagged = generator.generate_spiral(&region);
        assert_eq!(flagged.points, result.points);
        assert_eq!(flagged.inside.len(), flagged.points.len());
    }
}
