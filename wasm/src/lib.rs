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

//! This is a WASM wrapper for `gpx_kml_routes`.

use gpx_kml_routes::{read_gpx, Config, DEFAULT_BUCKET, DEFAULT_ROUTE_COLOUR, DEFAULT_ROUTE_WIDTH};
use wasm_bindgen::{prelude::wasm_bindgen, JsError};

/// Build a configuration, falling back to the defaults for missing values.
fn config(colour: Option<String>, width: Option<f64>) -> Result<Config, JsError> {
    Ok(Config::new(
        DEFAULT_BUCKET,
        colour.as_deref().unwrap_or(DEFAULT_ROUTE_COLOUR),
        width.unwrap_or(DEFAULT_ROUTE_WIDTH),
    )?)
}

/// This wraps `gpx_kml_routes::convert` for interfacing with JS.
#[wasm_bindgen]
pub fn convert(
    source: &[u8],
    colour: Option<String>,
    width: Option<f64>,
) -> Result<Box<[u8]>, JsError> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let mut sink = vec![];
    gpx_kml_routes::convert(source, &mut sink, &config(colour, width)?)?;
    Ok(sink.into_boxed_slice())
}

/// Number of routes and tracks in the GPX `source`.
#[wasm_bindgen]
pub fn count_parts(source: &[u8]) -> Result<usize, JsError> {
    let document = read_gpx(source)?;
    Ok(gpx_kml_routes::collect_routes(&document)?.len())
}

/// Convert the GPX `source` and return the KML part for route `index`.
#[wasm_bindgen]
pub fn convert_part(
    source: &[u8],
    index: usize,
    colour: Option<String>,
    width: Option<f64>,
) -> Result<Box<[u8]>, JsError> {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    let mut parts = gpx_kml_routes::convert_parts(source, &config(colour, width)?)?;
    if index >= parts.len() {
        return Err(JsError::new(&format!(
            "part {index} requested, but only {} routes exist",
            parts.len()
        )));
    }
    Ok(parts.swap_remove(index).into_boxed_slice())
}
