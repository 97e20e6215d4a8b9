//! Motion-program emission.
//!
//! Consumes [`Trajectory`] records and produces the boundary artifacts the
//! fabrication toolchain expects:
//!
//! - a trajectory text file (header with the source color and constant z,
//!   one `De (..) a (..): shutter ..` line per segment) - the interchange
//!   format between the fill stage and the code generator;
//! - an AeroBasic-style motion program for an Aerotech A3200 controller:
//!   shutter macros toggled on state transitions (with settling dwells),
//!   `LINEAR` moves at a feedrate looked up from the plane's index color;
//! - a duration estimate for the emitted motion.
//!
//! Coordinates arrive in micrometers and are emitted in millimeters,
//! shifted so the program origin sits at the minimum x/y and maximum z of
//! the whole job.

use crate::exposure::ExposureState;
use crate::geometry::Point3;
use crate::pipeline::Trajectory;
use crate::{CoordF, Result};
use std::io::Write;

/// Settling time around a shutter-open transition (s).
const OPEN_DWELL: CoordF = 0.02;

/// Settling time after a shutter-close transition (s).
const CLOSE_DWELL: CoordF = 0.1;

/// Feedrate for an index color, in mm/s.
///
/// AutoCAD index colors map onto the writing-speed ladder; 256 ("by layer")
/// and unknown colors fall back to 1.0 mm/s.
pub fn speed_for_color(color: Option<u32>) -> CoordF {
    match color {
        Some(1) => 0.2,
        Some(2) => 0.4,
        Some(3) => 0.6,
        Some(4) => 0.8,
        Some(5) => 1.2,
        Some(6) => 1.4,
        Some(7) => 1.6,
        Some(8) => 1.8,
        Some(9) => 2.0,
        _ => 1.0,
    }
}

/// Write a trajectory in the interchange text format.
pub fn write_trajectory_text<W: Write>(writer: &mut W, trajectory: &Trajectory) -> Result<()> {
    writeln!(
        writer,
        "Color extraido del Plano padre: {}",
        trajectory.color.unwrap_or(256)
    )?;
    writeln!(writer, "Constante Z: {}", trajectory.z)?;
    writeln!(writer)?;

    for segment in &trajectory.segments {
        writeln!(
            writer,
            "De ({:.6}, {:.6}) a ({:.6}, {:.6}): shutter {}",
            segment.start.x, segment.start.y, segment.end.x, segment.end.y, segment.state
        )?;
    }
    Ok(())
}

/// Parameters of the emitted motion program.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgramConfig {
    /// Clearance from the work area for the initial positioning move (mm).
    pub margin_xy: CoordF,
    /// Z clearance for the initial positioning move (mm).
    pub margin_z: CoordF,
    /// Input units per millimeter (1000 for micrometer coordinates).
    pub unit_scale: CoordF,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            margin_xy: 10.0 / 1000.0,
            margin_z: 100.0 / 1000.0,
            unit_scale: 1000.0,
        }
    }
}

/// AeroBasic-style motion program writer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProgramWriter {
    config: ProgramConfig,
}

impl ProgramWriter {
    /// Create a writer with the given parameters.
    pub fn new(config: ProgramConfig) -> Self {
        Self { config }
    }

    /// Write the motion program for a set of trajectories.
    ///
    /// Empty trajectories are skipped; a job where every trajectory is empty
    /// still produces a valid (motionless) program.
    pub fn write<W: Write>(&self, writer: &mut W, trajectories: &[Trajectory]) -> Result<()> {
        let origin = job_origin(trajectories);
        self.write_header(writer, origin)?;

        for trajectory in trajectories {
            if trajectory.is_empty() {
                continue;
            }
            self.write_block(writer, trajectory, origin)?;
        }

        self.write_footer(writer)?;
        Ok(())
    }

    fn write_header<W: Write>(&self, writer: &mut W, origin: Point3) -> Result<()> {
        writeln!(writer, "'==================================================")?;
        writeln!(writer, "' AUTOGENERATED FOR AEROTECH A3200 LASER SYSTEM")?;
        writeln!(
            writer,
            "' ORIGIN: X{:.10} Y{:.10} Z{:.10}",
            origin.x, origin.y, origin.z
        )?;
        writeln!(writer, "'==================================================")?;
        writeln!(writer)?;
        writeln!(writer, "' --- Laser shutter macros ---")?;
        writeln!(writer, "#define ShutterClose $DO0.Z = 0")?;
        writeln!(writer, "#define ShutterOpen $DO0.Z = 1")?;
        writeln!(writer)?;
        writeln!(writer, "DVAR $SPEED")?;
        writeln!(writer)?;
        writeln!(writer, "$SPEED = 1")?;
        writeln!(writer, "MSGCLEAR -1")?;
        writeln!(writer, "ShutterClose")?;
        writeln!(writer, "HOME X Y Z")?;
        writeln!(writer)?;
        writeln!(writer, "ENABLE X Y Z")?;
        writeln!(writer, "VELOCITY ON")?;
        writeln!(writer, "ABSOLUTE")?;
        writeln!(writer)?;
        writeln!(writer, "' --- Park outside the work area ---")?;
        writeln!(
            writer,
            "LINEAR X{:.10} Y{:.10} Z{:.10} F $SPEED",
            -self.config.margin_xy, -self.config.margin_xy, -self.config.margin_z
        )?;
        writeln!(writer, "POSOFFSET SET X 0 Y 0 Z 0")?;
        Ok(())
    }

    fn write_block<W: Write>(
        &self,
        writer: &mut W,
        trajectory: &Trajectory,
        origin: Point3,
    ) -> Result<()> {
        let speed = speed_for_color(trajectory.color);

        writeln!(writer)?;
        writeln!(writer, "' --- Fill {} ---", trajectory.plane)?;
        writeln!(writer, "$SPEED = {speed:.1}")?;

        let first = trajectory.frame.lift(trajectory.segments[0].start);
        self.write_move(writer, first, origin)?;
        writeln!(writer, "WAIT MOVEDONE X Y Z")?;

        let mut current = ExposureState::Closed;
        for segment in &trajectory.segments {
            if segment.state != current {
                match segment.state {
                    ExposureState::Open => {
                        writeln!(writer, "dwell 0.01")?;
                        writeln!(writer, "ShutterOpen")?;
                        writeln!(writer, "dwell 0.01")?;
                    }
                    ExposureState::Closed => {
                        writeln!(writer, "ShutterClose")?;
                        writeln!(writer, "dwell 0.1")?;
                    }
                }
                current = segment.state;
            }
            self.write_move(writer, trajectory.frame.lift(segment.end), origin)?;
        }

        writeln!(writer, "ShutterClose")?;
        Ok(())
    }

    fn write_move<W: Write>(&self, writer: &mut W, point: Point3, origin: Point3) -> Result<()> {
        let s = self.config.unit_scale;
        writeln!(
            writer,
            "LINEAR X{:.10} Y{:.10} Z{:.10} F $SPEED",
            (point.x - origin.x) / s,
            (point.y - origin.y) / s,
            (point.z - origin.z) / s
        )?;
        Ok(())
    }

    fn write_footer<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer)?;
        writeln!(writer, "' --- Shutdown ---")?;
        writeln!(writer, "VELOCITY OFF")?;
        writeln!(writer, "MSGDISPLAY 0, \"Laser job finished.\"")?;
        writeln!(writer, "END PROGRAM")?;
        Ok(())
    }
}

/// The program origin: minimum x/y and maximum z over all lifted endpoints.
fn job_origin(trajectories: &[Trajectory]) -> Point3 {
    let mut origin = Point3::new(CoordF::INFINITY, CoordF::INFINITY, CoordF::NEG_INFINITY);
    let mut seen = false;
    for trajectory in trajectories {
        for segment in &trajectory.segments {
            for p in [segment.start, segment.end] {
                let lifted = trajectory.frame.lift(p);
                origin.x = origin.x.min(lifted.x);
                origin.y = origin.y.min(lifted.y);
                origin.z = origin.z.max(lifted.z);
                seen = true;
            }
        }
    }
    if seen {
        origin
    } else {
        Point3::zero()
    }
}

/// Estimated duration of the motion a set of trajectories emits.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeEstimate {
    /// Time spent moving (s).
    pub motion: CoordF,
    /// Time spent in shutter settling dwells (s).
    pub dwell: CoordF,
}

impl TimeEstimate {
    /// Total estimated duration (s).
    pub fn total(&self) -> CoordF {
        self.motion + self.dwell
    }
}

/// Estimate the duration of the program the writer would emit.
///
/// Mirrors the emission state machine: segment lengths at the color
/// feedrate, plus the shutter settling dwells at every state transition.
pub fn estimate_duration(trajectories: &[Trajectory], config: &ProgramConfig) -> TimeEstimate {
    let mut estimate = TimeEstimate::default();

    for trajectory in trajectories {
        if trajectory.is_empty() {
            continue;
        }
        // Feedrate in input units per second.
        let speed = speed_for_color(trajectory.color) * config.unit_scale;

        let mut current = ExposureState::Closed;
        for segment in &trajectory.segments {
            if segment.state != current {
                estimate.dwell += match segment.state {
                    ExposureState::Open => OPEN_DWELL,
                    ExposureState::Closed => CLOSE_DWELL,
                };
                current = segment.state;
            }
            estimate.motion += segment.length() / speed;
        }
    }

    estimate
}
