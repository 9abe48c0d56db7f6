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

//! Finding routes in a parsed GPX document and extracting their coordinates.

use std::fmt::Write;

use tracing::debug;

use crate::tree::Node;
use crate::Error;

/// Field names holding route-like entities, in output order.
const ROUTE_KEYS: [&str; 2] = ["rte", "trk"];

/// Collect all routes and tracks of a parsed GPX `document`.
///
/// Routes (`rte`) come first, followed by tracks (`trk`). Source order is kept
/// within each group. A document without either yields an empty list.
pub fn collect_routes(document: &Node) -> Result<Vec<&Node>, Error> {
    let gpx = document.get("gpx").ok_or(Error::MissingGpx)?;

    let routes: Vec<_> = ROUTE_KEYS
        .iter()
        .filter_map(|key| gpx.get(key))
        .flat_map(Node::items)
        .collect();
    debug!("found {} routes", routes.len());
    Ok(routes)
}

/// Name of the `index`th route.
///
/// Missing, blank or non-textual names are rejected.
pub fn route_name(route: &Node, index: usize) -> Result<&str, Error> {
    route
        .get("name")
        .and_then(Node::text)
        .filter(|name| !name.trim().is_empty())
        .ok_or(Error::MissingName { index })
}

/// Build the KML coordinate string of `route`.
///
/// Every node below `route` exposing both `lon` and `lat` contributes one
/// `lon,lat ` token in traversal order, each number with 9 fractional digits.
/// Non-numeric values are reported as [`Error::InvalidCoordinate`] instead of
/// being skipped.
pub fn coordinates(route: &Node, name: &str) -> Result<String, Error> {
    let mut coords = String::new();
    for node in route.walk() {
        let (Some(lon), Some(lat)) = (node.get("lon"), node.get("lat")) else {
            continue;
        };
        let lon = parse_degrees(lon, name, "lon")?;
        let lat = parse_degrees(lat, name, "lat")?;
        write!(coords, "{lon:.9},{lat:.9} ").unwrap();
    }
    Ok(coords)
}

fn parse_degrees(node: &Node, route: &str, field: &'static str) -> Result<f64, Error> {
    let invalid = |value: &str| Error::InvalidCoordinate {
        route: route.to_string(),
        field,
        value: value.to_string(),
    };

    let text = node.text().ok_or_else(|| invalid("<non-text>"))?;
    match text.trim().parse::<f64>() {
        // Adding zero turns -0 into 0, so it is printed without a sign.
        Ok(value) if value.is_finite() => Ok(value + 0.0),
        _ => Err(invalid(text)),
    }
}
