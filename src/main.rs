//! Lithofill CLI - command-line interface for the fill engine
//!
//! Usage:
//!   lithofill-cli fill <planes.txt> -o <trajectory.txt> [options]
//!   lithofill-cli program <planes.txt> -o <job.abm> [options]
//!   lithofill-cli info <planes.txt>

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use lithofill::emit::{estimate_duration, write_trajectory_text, ProgramConfig, ProgramWriter};
use lithofill::{
    detect_hierarchy, fill_each_plane, fill_planes, parse_planes_file, ContourBuilder,
    FillStrategy, JobConfig,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Area-fill and exposure-assignment engine for direct laser writing
#[derive(Parser, Debug)]
#[command(name = "lithofill-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill the nested region described by a planes file and write the
    /// shutter-annotated trajectory
    Fill {
        /// Input processed-planes file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output trajectory file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Job configuration file (JSON) - overrides the flags below
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Feature (voxel) diameter in work-area units
        #[arg(long, default_value = "0.2")]
        diameter: f64,

        /// Fractional overlap between adjacent features (0 to <1)
        #[arg(long, default_value = "0.5")]
        overlap: f64,

        /// Interpolation steps per arc
        #[arg(long, default_value = "30")]
        resolution: usize,

        /// Fill strategy (raster, spiral)
        #[arg(long, default_value = "raster")]
        strategy: String,
    },

    /// Fill every plane independently and write an AeroBasic motion program
    Program {
        /// Input processed-planes file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output program file
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Job configuration file (JSON) - overrides the flags below
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Feature (voxel) diameter in work-area units
        #[arg(long, default_value = "0.2")]
        diameter: f64,

        /// Fractional overlap between adjacent features (0 to <1)
        #[arg(long, default_value = "0.5")]
        overlap: f64,

        /// Interpolation steps per arc
        #[arg(long, default_value = "30")]
        resolution: usize,

        /// Fill strategy (raster, spiral)
        #[arg(long, default_value = "raster")]
        strategy: String,

        /// Number of threads to use (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        threads: usize,
    },

    /// Show plane and hierarchy information for a planes file
    Info {
        /// Input processed-planes file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Fill {
            input,
            output,
            config,
            diameter,
            overlap,
            resolution,
            strategy,
        } => cmd_fill(input, output, config, diameter, overlap, resolution, strategy),
        Commands::Program {
            input,
            output,
            config,
            diameter,
            overlap,
            resolution,
            strategy,
            threads,
        } => cmd_program(
            input, output, config, diameter, overlap, resolution, strategy, threads,
        ),
        Commands::Info { input } => cmd_info(input),
    }
}

/// Build the job config from a JSON file or the CLI flags.
fn resolve_config(
    config_file: Option<PathBuf>,
    diameter: f64,
    overlap: f64,
    resolution: usize,
    strategy: &str,
) -> Result<JobConfig> {
    if let Some(path) = config_file {
        return JobConfig::from_json_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let config = JobConfig {
        feature_diameter: diameter,
        overlap,
        arc_resolution: resolution,
        strategy: parse_strategy(strategy)?,
        ..Default::default()
    };
    config.validate().context("Invalid job parameters")?;
    Ok(config)
}

fn parse_strategy(name: &str) -> Result<FillStrategy> {
    match name.to_lowercase().as_str() {
        "raster" => Ok(FillStrategy::Raster),
        "spiral" => Ok(FillStrategy::Spiral),
        other => bail!("Unknown fill strategy '{other}' (expected raster or spiral)"),
    }
}

fn cmd_fill(
    input: PathBuf,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    diameter: f64,
    overlap: f64,
    resolution: usize,
    strategy: String,
) -> Result<()> {
    let config = resolve_config(config_file, diameter, overlap, resolution, &strategy)?;
    let output_path = output.unwrap_or_else(|| input.with_extension("trajectory.txt"));

    info!("Loading planes from {}", input.display());
    let planes = parse_planes_file(&input).context("Failed to parse planes file")?;
    info!("Loaded {} plane(s)", planes.len());

    let trajectory = fill_planes(&planes, &config).context("Fill job failed")?;

    let mut writer = BufWriter::new(
        File::create(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?,
    );
    write_trajectory_text(&mut writer, &trajectory).context("Failed to write trajectory")?;

    println!("Trajectory written to {}", output_path.display());
    println!("  Segments:      {}", trajectory.segments.len());
    println!("  Open length:   {:.3}", trajectory.open_length());
    println!("  Closed length: {:.3}", trajectory.closed_length());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_program(
    input: PathBuf,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    diameter: f64,
    overlap: f64,
    resolution: usize,
    strategy: String,
    threads: usize,
) -> Result<()> {
    let config = resolve_config(config_file, diameter, overlap, resolution, &strategy)?;
    let output_path = output.unwrap_or_else(|| input.with_extension("abm"));

    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize thread pool")?;
    }

    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    progress.set_message("Loading planes...");
    progress.set_position(5);
    let planes = parse_planes_file(&input).context("Failed to parse planes file")?;
    info!("Loaded {} plane(s)", planes.len());

    progress.set_message("Filling planes...");
    progress.set_position(25);
    let trajectories = fill_each_plane(&planes, &config);
    if trajectories.is_empty() {
        progress.finish_and_clear();
        bail!("No plane produced a usable trajectory");
    }

    progress.set_message("Writing program...");
    progress.set_position(80);
    let program_config = ProgramConfig::default();
    let mut writer = BufWriter::new(
        File::create(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?,
    );
    ProgramWriter::new(program_config)
        .write(&mut writer, &trajectories)
        .context("Failed to write program")?;

    progress.set_position(100);
    progress.finish_and_clear();

    let estimate = estimate_duration(&trajectories, &program_config);
    println!("Program written to {}", output_path.display());
    println!("  Planes filled:  {}/{}", trajectories.len(), planes.len());
    println!(
        "  Estimated time: {:.1} s ({:.1} s motion, {:.1} s dwell)",
        estimate.total(),
        estimate.motion,
        estimate.dwell
    );
    Ok(())
}

fn cmd_info(input: PathBuf) -> Result<()> {
    let planes = parse_planes_file(&input).context("Failed to parse planes file")?;

    println!("Planes: {}", planes.len());
    let builder = ContourBuilder::default();
    let mut outlines = Vec::new();
    for plane in &planes {
        let color = plane
            .color
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".into());
        match builder.build(&plane.segments) {
            Ok(contour) => {
                println!(
                    "  {}: {} edge(s), color {}, area {:.3}, z {:.3}{}",
                    plane.id,
                    plane.segments.len(),
                    color,
                    contour.area(),
                    plane.constant_z(),
                    if contour.gap_count() > 0 {
                        format!(", {} gap(s)", contour.gap_count())
                    } else {
                        String::new()
                    }
                );
                outlines.push((plane.id, contour));
            }
            Err(e) => println!(
                "  {}: {} edge(s), color {} - invalid outline: {e}",
                plane.id,
                plane.segments.len(),
                color
            ),
        }
    }

    let relations = detect_hierarchy(&outlines);
    if relations.is_empty() {
        println!("No containment relations detected");
    } else {
        println!("Containment relations:");
        for relation in &relations {
            println!("  {} contains {}", relation.parent, relation.child);
        }
    }
    Ok(())
}
