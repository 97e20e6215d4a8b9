//! Job configuration.
//!
//! A [`JobConfig`] carries everything a fill job needs: spacing parameters,
//! arc resolution, the fill strategy and the geometric tolerances. There is
//! no process-wide state - every entry point takes the config explicitly.

pub use crate::fill::FillStrategy;

use crate::contour::JOIN_TOLERANCE;
use crate::exposure::{BOUNDARY_TOLERANCE, COLLINEAR_TOLERANCE};
use crate::fill::FillConfig;
use crate::{CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one fill job.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Written feature (voxel) diameter, in work-area units.
    pub feature_diameter: CoordF,

    /// Fractional overlap between adjacent features, in `[0, 1)`.
    pub overlap: CoordF,

    /// Interpolation steps per arc (at least 2).
    pub arc_resolution: usize,

    /// Fill strategy.
    pub strategy: FillStrategy,

    /// Endpoint-matching and closure tolerance for contour stitching.
    pub join_tolerance: CoordF,

    /// On-boundary override distance for exposure assignment.
    pub boundary_tolerance: CoordF,

    /// Collinearity tolerance for trajectory simplification.
    pub collinear_tolerance: CoordF,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            feature_diameter: 0.2,
            overlap: 0.5,
            arc_resolution: 30,
            strategy: FillStrategy::Raster,
            join_tolerance: JOIN_TOLERANCE,
            boundary_tolerance: BOUNDARY_TOLERANCE,
            collinear_tolerance: COLLINEAR_TOLERANCE,
        }
    }
}

impl JobConfig {
    /// Sample spacing derived from the feature diameter and overlap.
    pub fn spacing(&self) -> CoordF {
        self.fill_config().spacing()
    }

    /// The spacing parameters for the fill generators.
    pub fn fill_config(&self) -> FillConfig {
        FillConfig::new(self.feature_diameter, self.overlap)
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.feature_diameter <= 0.0 {
            return Err(Error::Config(format!(
                "feature_diameter must be positive, got {}",
                self.feature_diameter
            )));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(Error::Config(format!(
                "overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        if self.arc_resolution < 2 {
            return Err(Error::Config(format!(
                "arc_resolution must be at least 2, got {}",
                self.arc_resolution
            )));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spacing() {
        let config = JobConfig::default();
        assert!((config.spacing() - 0.1).abs() < 1e-12);
        config.validate().unwrap();
    }

    #[test]
    fn test_validation_rejects_bad_overlap() {
        let config = JobConfig {
            overlap: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_resolution() {
        let config = JobConfig {
            arc_resolution: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = JobConfig {
            feature_diameter: 2.0,
            strategy: FillStrategy::Spiral,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: JobConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let parsed: JobConfig = serde_json::from_str(r#"{"feature_diameter": 1.5}"#).unwrap();
        assert_eq!(parsed.feature_diameter, 1.5);
        assert_eq!(parsed.overlap, JobConfig::default().overlap);
        assert_eq!(parsed.strategy, FillStrategy::Raster);
    }
}
