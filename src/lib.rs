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

//! Library for converting the routes and tracks of a
//! [GPX](https://www.topografix.com/gpx.asp) file to
//! [KML](https://developers.google.com/kml) line strings.
//!
//! Every `rte` and `trk` becomes one styled _Placemark_. The placemarks are
//! either gathered in one combined document ([`convert`]) or each wrapped in
//! a document of its own ([`convert_parts`]).
//!
//! The GPX input is not read against a schema. Instead, it is parsed into a
//! generic [`Node`] tree and every node below a route carrying both a `lon` and
//! a `lat` field becomes a point of its line.

use std::io::{self, Read};

use kml::types::Element;
use thiserror::Error;
use tracing::info;

mod build;
mod parse;
mod route;
mod tree;
mod write;

pub use build::{document, placemark};
pub use parse::parse_document;
pub use route::{collect_routes, coordinates, route_name};
pub use tree::{Node, Walk, TEXT_KEY};
pub use write::{to_bytes, write_kml};

/// Default line colour in KML `aabbggrr` notation.
pub const DEFAULT_ROUTE_COLOUR: &str = "ff419076";
/// Default line width in pixels.
pub const DEFAULT_ROUTE_WIDTH: f64 = 4.0;
/// Default storage bucket.
pub const DEFAULT_BUCKET: &str = "hc-apps";

/// Error returned from the conversion functions.
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not well-formed XML.
    #[error("reading GPX failed: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The XML structure is incomplete.
    #[error("reading GPX failed: {0}")]
    Malformed(String),
    /// The root element is not `gpx`.
    #[error("reading GPX failed: no <gpx> root element")]
    MissingGpx,
    /// A route or track has no name.
    #[error("route {index} has no name")]
    MissingName { index: usize },
    /// A point of a route has an unusable coordinate.
    #[error("route {route:?} has invalid {field} value {value:?}")]
    InvalidCoordinate {
        route: String,
        field: &'static str,
        value: String,
    },
    /// The configured colour is not in `aabbggrr` notation.
    #[error("invalid route colour {0:?}, expected 8 hex digits")]
    InvalidColour(String),
    /// The configured width is not a positive number.
    #[error("invalid route width {0}, expected a positive number")]
    InvalidWidth(f64),
    /// Reading the GPX or writing the KML failed.
    #[error("I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Style and storage settings applied to every produced document.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    bucket: String,
    route_colour: String,
    route_width: f64,
}

impl Config {
    /// Create a validated configuration.
    ///
    /// `route_colour` needs to consist of exactly 8 hex digits and
    /// `route_width` needs to be positive.
    pub fn new(
        bucket: impl Into<String>,
        route_colour: impl Into<String>,
        route_width: f64,
    ) -> Result<Self, Error> {
        let route_colour = route_colour.into();
        if route_colour.len() != 8 || !route_colour.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColour(route_colour));
        }
        if !route_width.is_finite() || route_width <= 0.0 {
            return Err(Error::InvalidWidth(route_width));
        }

        Ok(Self {
            bucket: bucket.into(),
            route_colour,
            route_width,
        })
    }

    /// Storage bucket the outputs are meant for.
    ///
    /// This is informational only and not used for the conversion.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn route_colour(&self) -> &str {
        &self.route_colour
    }

    pub fn route_width(&self) -> f64 {
        self.route_width
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            route_colour: DEFAULT_ROUTE_COLOUR.to_string(),
            route_width: DEFAULT_ROUTE_WIDTH,
        }
    }
}

/// Read a complete GPX document from `source`.
pub fn read_gpx(mut source: impl Read) -> Result<Node, Error> {
    let mut text = String::new();
    source.read_to_string(&mut text)?;
    parse_document(&text)
}

/// Convert every route of `document` into a _Placemark_.
fn placemarks(document: &Node) -> Result<Vec<Element>, Error> {
    collect_routes(document)?
        .into_iter()
        .enumerate()
        .map(|(index, route)| -> Result<Element, Error> {
            let name = route_name(route, index)?;
            info!("adding coordinates for {name:?}");
            let coordinates = coordinates(route, name)?;
            Ok(placemark(name, &coordinates))
        })
        .collect()
}

/// Build one KML document holding all routes of the parsed GPX `document`.
pub fn combined_document(document: &Node, config: &Config) -> Result<Element, Error> {
    Ok(build::document(placemarks(document)?, config))
}

/// Build one KML document per route of the parsed GPX `document`.
///
/// The documents are ordered like the routes, see [`collect_routes`].
pub fn part_documents(document: &Node, config: &Config) -> Result<Vec<Element>, Error> {
    Ok(placemarks(document)?
        .into_iter()
        .map(|placemark| build::document(vec![placemark], config))
        .collect())
}

/// Read a GPX file and write a combined KML file.
///
/// A complete GPX file is read from `source`. All routes and tracks are
/// written to `sink` as a single KML document.
///
/// The `sink` is only written to after the whole input has been converted
/// successfully.
///
/// # Example
/// ```
/// # use gpx_kml_routes::{convert, Config};
/// #
/// let source = r#"
/// <?xml version="1.0" encoding="UTF-8"?>
/// <gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1">
///     <trk>
///         <name>Stage 1</name>
///         <trkseg>
///             <trkpt lat="51.9" lon="-8.5"/>
///             <trkpt lat="51.8" lon="-8.4"/>
///         </trkseg>
///     </trk>
/// </gpx>
/// "#;
/// let mut sink = vec![];
///
/// convert(source.as_bytes(), &mut sink, &Config::default()).expect("conversion failed");
///
/// let kml = String::from_utf8(sink).expect("KML data is not valid UTF-8");
/// assert!(kml.contains("<kml"));
/// assert!(kml.contains("<![CDATA[Stage 1]]>"));
/// assert!(kml.contains("-8.500000000,51.900000000 -8.400000000,51.800000000 "));
/// ```
pub fn convert(source: impl Read, sink: impl io::Write, config: &Config) -> Result<(), Error> {
    let document = read_gpx(source)?;
    let kml = combined_document(&document, config)?;
    write_kml(&kml, sink)
}

/// Read a GPX file and produce one serialized KML file per route.
///
/// Nothing is returned if any route fails to convert.
///
/// # Example
/// ```
/// # use gpx_kml_routes::{convert_parts, Config};
/// #
/// let source = r#"
/// <gpx version="1.1">
///     <rte><name>A</name><rtept lat="1" lon="2"/></rte>
///     <trk><name>B</name></trk>
/// </gpx>
/// "#;
///
/// let parts = convert_parts(source.as_bytes(), &Config::default()).expect("conversion failed");
///
/// assert_eq!(parts.len(), 2);
/// assert!(String::from_utf8_lossy(&parts[1]).contains("<![CDATA[B]]>"));
/// ```
pub fn convert_parts(source: impl Read, config: &Config) -> Result<Vec<Vec<u8>>, Error> {
    let document = read_gpx(source)?;
    part_documents(&document, config)?
        .iter()
        .map(to_bytes)
        .collect()
}
