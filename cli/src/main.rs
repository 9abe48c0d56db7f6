// Copyright 2023 Viktor Reusch
//
// This file is part of gpx_kml_routes.
//
// gpx_kml_routes is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// gpx_kml_routes is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with gpx_kml_routes. If not, see <https://www.gnu.org/licenses/>.

//! Command-line interface for converting GPX routes to KML files.

use std::{
    fs::File,
    io::{stdin, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use gpx_kml_routes::{Config, DEFAULT_BUCKET, DEFAULT_ROUTE_COLOUR, DEFAULT_ROUTE_WIDTH};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod output;

/// Convert the routes and tracks of a GPX file to KML.
///
/// Writes `kml.kml` holding all routes and one `kmlPart-<n>.kml` per route.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// GPX file to read, `-` for STDIN
    input: PathBuf,

    /// Directory receiving the KML files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Line colour in KML `aabbggrr` notation
    #[arg(long, env = "ROUTE_COLOUR", default_value = DEFAULT_ROUTE_COLOUR)]
    route_colour: String,

    /// Line width in pixels
    #[arg(long, env = "ROUTE_WIDTH", default_value_t = DEFAULT_ROUTE_WIDTH)]
    route_width: f64,

    /// Storage bucket the files are meant for
    #[arg(long, env = "S3_BUCKET", default_value = DEFAULT_BUCKET)]
    bucket: String,

    /// Log every converted route
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG takes precedence over the verbose flag.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "info" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Conversion failed with: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Convert and write all files.
///
/// Returns whether every file has been written.
fn run(args: &Args) -> Result<bool> {
    let config = Config::new(&args.bucket, &args.route_colour, args.route_width)
        .context("invalid configuration")?;
    info!("converting for bucket {}", config.bucket());

    let source = read_input(&args.input)?;
    let outputs = output::Outputs::convert(&source, &config)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    Ok(outputs.write_all(&args.output_dir))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut source = vec![];
    if path.as_os_str() == "-" {
        stdin()
            .read_to_end(&mut source)
            .context("failed to read STDIN")?;
    } else {
        File::open(path)
            .and_then(|mut file| file.read_to_end(&mut source))
            .with_context(|| format!("failed to read {}", path.display()))?;
    }
    Ok(source)
}
