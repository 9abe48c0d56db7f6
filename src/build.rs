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

//! Assembling the KML element tree.
//!
//! Both the combined document and the per-route parts share the same
//! `kml`/`Document`/`Style`/`Folder` skeleton built by [`document`].

use std::collections::HashMap;

use kml::types::Element;
use tracing::warn;

use crate::Config;

/// Namespace of the `<kml>` tag.
const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
/// Id of the shared line style, referenced by every _Placemark_.
const STYLE_ID: &str = "track";
/// Id and name of the _Folder_ holding the _Placemarks_.
const FOLDER_ID: &str = "Tracks";
/// Lines follow the terrain.
const ALTITUDE_MODE: &str = "clampToGround";

const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

/// Create a KML _Placemark_ drawing the route `name` along `coordinates`.
///
/// The name is wrapped in a CDATA section. An empty `coordinates` string
/// still yields a (empty) _LineString_.
pub fn placemark(name: &str, coordinates: &str) -> Element {
    let line = Element {
        name: "LineString".to_string(),
        children: vec![
            simple_element("tessellate", "1"),
            simple_element("altitudeMode", ALTITUDE_MODE),
            simple_element("coordinates", coordinates),
        ],
        ..Default::default()
    };

    Element {
        name: "Placemark".to_string(),
        children: vec![
            simple_element("name", cdata(name)),
            simple_element("styleUrl", format!("#{STYLE_ID}")),
            parent_element("MultiGeometry", vec![line]),
        ],
        ..Default::default()
    }
}

/// Wrap `placemarks` in a complete KML document styled according to `config`.
///
/// The document itself is visible and open while the folder is visible but
/// closed.
pub fn document(placemarks: Vec<Element>, config: &Config) -> Element {
    let style = Element {
        name: "Style".to_string(),
        attrs: id_attr(STYLE_ID),
        children: vec![parent_element(
            "LineStyle",
            vec![
                simple_element("color", config.route_colour()),
                simple_element("width", config.route_width().to_string()),
            ],
        )],
        ..Default::default()
    };

    let mut folder_children = vec![
        simple_element("name", FOLDER_ID),
        simple_element("visibility", "1"),
        simple_element("open", "0"),
    ];
    folder_children.extend(placemarks);
    let folder = Element {
        name: "Folder".to_string(),
        attrs: id_attr(FOLDER_ID),
        children: folder_children,
        ..Default::default()
    };

    let document = parent_element(
        "Document",
        vec![
            simple_element("visibility", "1"),
            simple_element("open", "1"),
            style,
            folder,
        ],
    );

    Element {
        name: "kml".to_string(),
        attrs: HashMap::from([("xmlns".to_string(), KML_NAMESPACE.to_string())]),
        children: vec![document],
        ..Default::default()
    }
}

/// Check whether `content` is a single literal CDATA section.
pub(crate) fn is_cdata(content: &str) -> bool {
    content.starts_with(CDATA_START) && content.ends_with(CDATA_END)
}

/// Wrap `text` in a CDATA section.
///
/// A `]]>` inside `text` would end the section early, so the section is split
/// around it.
fn cdata(text: &str) -> String {
    if text.contains(CDATA_END) {
        warn!("name {text:?} contains {CDATA_END:?}, splitting CDATA section");
    }
    let text = text.replace(CDATA_END, "]]]]><![CDATA[>");
    format!("{CDATA_START}{text}{CDATA_END}")
}

/// Create a simple KML element with `name` and `content`.
fn simple_element(name: impl Into<String>, content: impl Into<String>) -> Element {
    Element {
        name: name.into(),
        content: Some(content.into()),
        ..Default::default()
    }
}

/// Create a KML element with `name` holding `children`.
fn parent_element(name: impl Into<String>, children: Vec<Element>) -> Element {
    Element {
        name: name.into(),
        children,
        ..Default::default()
    }
}

fn id_attr(id: &str) -> HashMap<String, String> {
    HashMap::from([("id".to_string(), id.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child<'a>(element: &'a Element, name: &str) -> &'a Element {
        element
            .children
            .iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("<{}> has no <{name}>", element.name))
    }

    fn content<'a>(element: &'a Element, name: &str) -> &'a str {
        child(element, name).content.as_deref().unwrap()
    }

    #[test]
    fn placemark_structure() {
        let placemark = placemark("Stage 1", "1.000000000,2.000000000 ");

        assert_eq!(placemark.name, "Placemark");
        assert_eq!(content(&placemark, "name"), "<![CDATA[Stage 1]]>");
        assert_eq!(content(&placemark, "styleUrl"), "#track");

        let line = child(child(&placemark, "MultiGeometry"), "LineString");
        assert_eq!(content(line, "tessellate"), "1");
        assert_eq!(content(line, "altitudeMode"), "clampToGround");
        assert_eq!(content(line, "coordinates"), "1.000000000,2.000000000 ");
    }

    #[test]
    fn empty_coordinates_keep_line_string() {
        let placemark = placemark("Empty", "");
        let line = child(child(&placemark, "MultiGeometry"), "LineString");
        assert_eq!(content(line, "coordinates"), "");
    }

    #[test]
    fn document_skeleton() {
        let kml = document(vec![placemark("A", ""), placemark("B", "")], &Config::default());

        assert_eq!(kml.name, "kml");
        assert_eq!(kml.attrs["xmlns"], KML_NAMESPACE);

        let document = child(&kml, "Document");
        assert_eq!(content(document, "visibility"), "1");
        assert_eq!(content(document, "open"), "1");

        let style = child(document, "Style");
        assert_eq!(style.attrs["id"], "track");
        let line_style = child(style, "LineStyle");
        assert_eq!(content(line_style, "color"), "ff419076");
        assert_eq!(content(line_style, "width"), "4");

        let folder = child(document, "Folder");
        assert_eq!(folder.attrs["id"], "Tracks");
        assert_eq!(content(folder, "name"), "Tracks");
        assert_eq!(content(folder, "visibility"), "1");
        assert_eq!(content(folder, "open"), "0");

        let names: Vec<_> = folder
            .children
            .iter()
            .filter(|c| c.name == "Placemark")
            .map(|p| content(p, "name"))
            .collect();
        assert_eq!(names, ["<![CDATA[A]]>", "<![CDATA[B]]>"]);
    }

    #[test]
    fn document_uses_configured_style() {
        let config = Config::new("bucket", "00ffffff", 2.0).unwrap();
        let kml = document(vec![], &config);

        let line_style = child(child(child(&kml, "Document"), "Style"), "LineStyle");
        assert_eq!(content(line_style, "color"), "00ffffff");
        assert_eq!(content(line_style, "width"), "2");
    }

    #[test]
    fn cdata_end_inside_name_is_split() {
        let name = cdata("a]]>b");
        assert_eq!(name, "<![CDATA[a]]]]><![CDATA[>b]]>");
        assert!(is_cdata(&name));
    }
}
