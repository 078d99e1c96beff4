//! cets-model: typed cryo-ET metadata.
//!
//! Cryo-electron tomography moves data through many stages (movie frames,
//! tilt-series, tomograms, subtomogram averages, annotations) and every
//! stage lives in its own coordinate frame. This crate provides:
//!
//! - a strict, typed schema for the records of each stage,
//! - a tagged union of coordinate transformations (with recursive
//!   `sequence`) relating named coordinate systems,
//! - builders for the standard alignment transformations,
//! - header readers for MRC, TIFF and EM volumes.
//!
//! # Modules
//!
//! - [`model`]: Records, coordinate systems and transformations
//! - [`standard`]: Standard frame names and alignment builders
//! - [`header`]: Volume header readers
//! - [`validation`]: Cross-record consistency checks
//! - [`error`]: Error types for cets-model operations
//! - [`logging`]: Subscriber setup for the CLI

pub mod error;
pub mod header;
pub mod logging;
pub mod model;
pub mod standard;
pub mod validation;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub use error::{CetsError, DiscriminatorError};

/// The cets CLI application.
#[derive(Parser)]
#[command(name = "cets")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log filter directives; overrides -v and RUST_LOG.
    #[arg(long, env = "CETS_LOG", global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a metadata document for errors and warnings.
    Validate(ValidateArgs),
    /// Print dimensions and voxel size from a volume header.
    Header(HeaderArgs),
    /// Build a standard alignment pipeline and print it as JSON.
    Pipeline(PipelineArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Input document to validate.
    input: PathBuf,

    /// Input format ('json', 'yaml', or 'auto' to use the extension).
    #[arg(long, default_value = "auto")]
    format: String,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the header subcommand.
#[derive(clap::Args)]
struct HeaderArgs {
    /// MRC, TIFF or EM file.
    input: PathBuf,

    /// Print the detailed image summary (mode and per-axis pixel size).
    #[arg(long)]
    info: bool,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the pipeline subcommand.
#[derive(clap::Args)]
struct PipelineArgs {
    /// Stage: calibration-image, movie-frame, projection-image,
    /// subtomogram, map or annotation.
    stage: String,

    /// Isotropic scale factor (map and annotation stages).
    #[arg(long)]
    scale: Option<f64>,

    /// Rotation matrix in row-major order: 4 values (2x2) or 9 values (3x3).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    rotation: Option<Vec<f64>>,

    /// Translation vector, comma separated.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    translation: Option<Vec<f64>>,

    /// Flip axis for the calibration-image stage ('x' or 'y').
    #[arg(long)]
    flip_axis: Option<String>,
}

/// Run the cets CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), CetsError> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.log_filter.as_deref())?;

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Header(args)) => run_header(args),
        Some(Commands::Pipeline(args)) => run_pipeline(args),
        None => {
            println!("cets {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Typed cryo-ET metadata, transformations and header readers.");
            println!();
            println!("Run 'cets --help' for usage information.");
            Ok(())
        }
    }
}

fn read_document(path: &Path, format: &str) -> Result<model::Dataset, CetsError> {
    let format = match format {
        "auto" => match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => "yaml",
            _ => "json",
        },
        other => other,
    };
    match format {
        "json" => model::io_json::read_dataset_json(path),
        "yaml" | "yml" => model::io_yaml::read_dataset_yaml(path),
        other => Err(CetsError::UnsupportedFormat(format!(
            "'{}' (supported: json, yaml, auto)",
            other
        ))),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CetsError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| CetsError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", text);
    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), CetsError> {
    let dataset = read_document(&args.input, &args.format)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_dataset(&dataset, &opts);

    match args.output.as_str() {
        "json" => {
            #[derive(serde::Serialize)]
            struct JsonReport<'a> {
                error_count: usize,
                warning_count: usize,
                issues: &'a [validation::ValidationIssue],
            }
            print_json(&JsonReport {
                error_count: report.error_count(),
                warning_count: report.warning_count(),
                issues: &report.issues,
            })?;
        }
        "text" => print!("{}", report),
        other => {
            return Err(CetsError::UnsupportedFormat(format!(
                "'{}' (supported: text, json)",
                other
            )));
        }
    }

    validation::enforce(report, &opts).map(|_| ())
}

/// Execute the header subcommand.
fn run_header(args: HeaderArgs) -> Result<(), CetsError> {
    if args.info {
        let info = header::read_image_info(&args.input)?;
        return match args.output.as_str() {
            "json" => print_json(&info),
            _ => {
                println!("size:      {} x {} x {}", info.size_x, info.size_y, info.size_z);
                println!("mode:      {} ({})", info.mode, info.mode_desc);
                println!(
                    "pixel size: {} / {} / {}",
                    format_apix(info.apix_x),
                    format_apix(info.apix_y),
                    format_apix(info.apix_z)
                );
                Ok(())
            }
        };
    }

    let volume = header::read_volume_header(&args.input)?;
    match args.output.as_str() {
        "json" => print_json(&volume),
        _ => {
            println!("format:     {}", volume.format);
            println!("width:      {}", volume.width);
            println!("height:     {}", volume.height);
            println!("depth:      {}", volume.depth);
            println!("voxel size: {}", format_apix(volume.voxel_size));
            Ok(())
        }
    }
}

fn format_apix(apix: Option<f64>) -> String {
    match apix {
        Some(value) => format!("{value} Å"),
        None => "unknown".to_string(),
    }
}

/// Splits a row-major matrix into square rows.
fn matrix_rows(values: &[f64]) -> Result<Vec<Vec<f64>>, CetsError> {
    let rank = match values.len() {
        4 => 2,
        9 => 3,
        n => {
            return Err(CetsError::InvalidField {
                field: "rotation".to_string(),
                message: format!("expected 4 or 9 values, got {n}"),
            })
        }
    };
    Ok(values.chunks(rank).map(<[f64]>::to_vec).collect())
}

/// Execute the pipeline subcommand.
fn run_pipeline(args: PipelineArgs) -> Result<(), CetsError> {
    let rotation = args.rotation.as_deref().map(matrix_rows).transpose()?;
    let rotation = rotation.as_deref();
    let translation = args.translation.as_deref();

    let pipeline = match args.stage.as_str() {
        "calibration-image" => standard::aligned_calibration_image_to_micrograph(
            args.flip_axis.as_deref(),
            translation,
        )?,
        "movie-frame" => standard::aligned_movie_frame_to_projection(translation)?,
        "projection-image" => {
            standard::aligned_projection_image_to_tilt_series(translation, rotation)?
        }
        "subtomogram" => standard::aligned_subtomo_to_tomogram(rotation, translation)?,
        "map" => standard::aligned_map_to_tomogram(args.scale, rotation, translation)?,
        "annotation" => {
            standard::aligned_annotation_to_tomogram(args.scale, rotation, translation)?
        }
        other => {
            return Err(CetsError::UnsupportedFormat(format!(
                "stage '{}' (supported: calibration-image, movie-frame, projection-image, \
                 subtomogram, map, annotation)",
                other
            )));
        }
    };

    print_json(&pipeline)
}
