//!
//! Command-line tool for inspecting and exporting XRD netCDF mapping files.
#![allow(
    clippy::uninlined_format_args,
    clippy::cast_precision_loss,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};

use std::path::{Path, PathBuf};
use thiserror::Error;
use xrdframe_core::FrameStats;
use xrdframe_io::{FrameFileReader, FrameFileWriter, ARRAY_DATA_VAR, FRAME_TIME_VAR};
use xrdframe_netcdf::{Values, Version};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("read error: {0}")]
    XrdframeIo(#[from] xrdframe_io::Error),

    #[error("format error: {0}")]
    Format(#[from] xrdframe_netcdf::Error),

    #[error("core error: {0}")]
    Core(#[from] xrdframe_core::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// XRD mapping-file inspector and exporter.
#[derive(Parser)]
#[command(name = "xrdframe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose diagnostic logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show container structure and frame-stack shape
    Info {
        /// Input netCDF mapping file
        input: PathBuf,

        /// Emit a JSON document instead of text
        #[arg(long)]
        json: bool,
    },

    /// Read the frame stack and report intensity statistics
    Stats {
        /// Input netCDF mapping file
        input: PathBuf,

        /// Restrict to a single frame
        #[arg(short, long)]
        frame: Option<usize>,

        /// Emit a JSON document instead of text
        #[arg(long)]
        json: bool,
    },

    /// Export frames; format chosen by output extension (csv, raw)
    Export {
        /// Input netCDF mapping file
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export a single frame instead of the whole stack
        #[arg(short, long)]
        frame: Option<usize>,
    },

    /// List every variable with its decoded contents
    Vars {
        /// Input netCDF mapping file
        input: PathBuf,

        /// Samples shown per variable
        #[arg(long, default_value = "8")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Info { input, json } => info(&input, json),
        Commands::Stats { input, frame, json } => stats(&input, frame, json),
        Commands::Export {
            input,
            output,
            frame,
        } => export(&input, &output, frame),
        Commands::Vars { input, limit } => vars(&input, limit),
    }
}

fn info(input: &Path, json: bool) -> Result<()> {
    let reader = FrameFileReader::open(input)?;
    let container = reader.container()?;
    let header = container.header();

    let format_name = match header.version {
        Version::Classic => "netCDF classic (CDF-1)",
        Version::Offset64 => "netCDF classic (CDF-2, 64-bit offsets)",
    };

    let frame_shape = container
        .variable(ARRAY_DATA_VAR)
        .map(|v| container.variable_shape(v));
    let frame_times = container
        .variable(FRAME_TIME_VAR)
        .map(|v| container.read_variable(v).map(|values| values.to_f64()))
        .transpose()?;

    if json {
        let variables: Vec<serde_json::Value> = header
            .variables
            .iter()
            .map(|v| {
                serde_json::json!({
                    "name": v.name,
                    "type": v.nc_type.name(),
                    "shape": container.variable_shape(v),
                    "record": v.is_record,
                })
            })
            .collect();

        let doc = serde_json::json!({
            "file": input.display().to_string(),
            "size_bytes": reader.file_size(),
            "version": header.version,
            "records": container.num_records(),
            "dimensions": header.dimensions,
            "variables": variables,
            "frame_shape": frame_shape,
            "frame_times": frame_times,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("File: {}", input.display());
    println!(
        "Size: {} bytes ({:.2} MB)",
        reader.file_size(),
        reader.file_size() as f64 / 1_000_000.0
    );
    println!("Format: {}", format_name);
    println!("Records: {}", container.num_records());

    println!("Dimensions:");
    for dim in &header.dimensions {
        if dim.is_record {
            println!(
                "  {} = UNLIMITED ({} currently)",
                dim.name,
                container.num_records()
            );
        } else {
            println!("  {} = {}", dim.name, dim.len);
        }
    }

    println!("Variables:");
    for var in &header.variables {
        let shape = container.variable_shape(var);
        let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
        println!(
            "  {}  {}  ({})",
            var.name,
            var.nc_type.name(),
            dims.join(", ")
        );
    }

    if !header.attributes.is_empty() {
        println!("Attributes:");
        for attr in &header.attributes {
            match attr.values.as_text() {
                Some(text) => println!("  {} = \"{}\"", attr.name, text),
                None => println!("  {} = {}", attr.name, preview(&attr.values, 4)),
            }
        }
    }

    match frame_shape {
        Some(shape) if shape.len() == 3 => {
            println!(
                "Frame stack: {} frames of {}x{}",
                shape[0], shape[1], shape[2]
            );
        }
        Some(shape) if shape.len() == 2 => {
            println!("Frame stack: single {}x{} image", shape[0], shape[1]);
        }
        Some(shape) => {
            println!("Frame stack: unusable rank {}", shape.len());
        }
        None => println!("Frame stack: no '{}' variable", ARRAY_DATA_VAR),
    }

    if let Some(times) = frame_times {
        let mean = if times.is_empty() {
            0.0
        } else {
            times.iter().sum::<f64>() / times.len() as f64
        };
        println!(
            "Frame times: {} values, mean {:.4} s",
            times.len(),
            mean
        );
    }

    Ok(())
}

fn stats(input: &Path, frame: Option<usize>, json: bool) -> Result<()> {
    let reader = FrameFileReader::open(input)?;
    let stack = reader.read_frame_stack()?;
    let shape = stack.shape();

    if json {
        let doc = match frame {
            Some(index) => serde_json::json!({
                "shape": shape,
                "frame": index,
                "stats": stack.frame_stats(index)?,
            }),
            None => {
                let frames: Vec<FrameStats> = stack
                    .frames()
                    .map(FrameStats::from_view)
                    .collect();
                serde_json::json!({
                    "shape": shape,
                    "frames": frames,
                    "stack": stack.stack_stats(),
                })
            }
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!(
        "Frames: {} ({}x{})",
        shape.frames, shape.rows, shape.cols
    );

    match frame {
        Some(index) => {
            print_stats(&format!("Frame {}", index), stack.frame_stats(index)?);
        }
        None => {
            for (index, view) in stack.frames().enumerate() {
                print_stats(&format!("Frame {}", index), FrameStats::from_view(view));
            }
            print_stats("Stack", stack.stack_stats());
        }
    }

    Ok(())
}

fn print_stats(label: &str, stats: FrameStats) {
    println!(
        "{}: min {} max {} mean {:.2} nonzero {}",
        label, stats.min, stats.max, stats.mean, stats.nonzero
    );
}

fn export(input: &Path, output: &Path, frame: Option<usize>) -> Result<()> {
    let reader = FrameFileReader::open(input)?;
    let stack = reader.read_frame_stack()?;

    let output_format = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(|| "raw".to_string(), |ext| ext.to_lowercase());

    let mut writer = FrameFileWriter::create(output)?;
    let csv = match output_format.as_str() {
        "csv" => true,
        "raw" | "bin" | "dat" => false,
        other => {
            log::warn!("unknown extension '{}', exporting raw binary", other);
            false
        }
    };

    let exported = match (frame, csv) {
        (Some(index), true) => {
            writer.write_frame_csv(stack.frame(index)?)?;
            1
        }
        (Some(index), false) => {
            writer.write_frame_binary(stack.frame(index)?)?;
            1
        }
        (None, true) => {
            writer.write_stack_csv(&stack)?;
            stack.frame_count()
        }
        (None, false) => {
            writer.write_stack_binary(&stack)?;
            stack.frame_count()
        }
    };

    println!(
        "Exported {} frame(s) to {}",
        exported,
        output.display()
    );
    Ok(())
}

fn vars(input: &Path, limit: usize) -> Result<()> {
    let reader = FrameFileReader::open(input)?;
    let variables = reader.read_variables()?;

    for (name, values) in &variables {
        println!(
            "{}  {}  {} samples  [{}]",
            name,
            values.nc_type().name(),
            values.len(),
            preview(values, limit)
        );
    }
    Ok(())
}

/// First `limit` samples, comma separated, with an ellipsis when more
/// remain.
fn preview(values: &Values, limit: usize) -> String {
    fn join<T: std::fmt::Display>(v: &[T], limit: usize) -> String {
        let mut out: Vec<String> = v.iter().take(limit).map(ToString::to_string).collect();
        if v.len() > limit {
            out.push("...".to_string());
        }
        out.join(", ")
    }

    match values {
        Values::Byte(v) => join(v, limit),
        Values::Char(v) => join(v, limit),
        Values::Short(v) => join(v, limit),
        Values::Int(v) => join(v, limit),
        Values::Float(v) => join(v, limit),
        Values::Double(v) => join(v, limit),
    }
}
