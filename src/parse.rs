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

//! Reading GPX XML into a generic [`Node`] tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::tree::{Node, TEXT_KEY};
use crate::Error;

/// Element under construction while its end tag has not been seen yet.
#[derive(Default)]
struct Pending {
    name: String,
    fields: Vec<(String, Node)>,
    text: String,
}

impl Pending {
    fn open(start: &BytesStart) -> Result<Self, Error> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut fields = vec![];
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            fields.push((key, Node::Scalar(value)));
        }
        Ok(Self {
            name,
            fields,
            ..Default::default()
        })
    }

    /// Add a finished child element, grouping repeated names into a list.
    fn push_child(&mut self, name: String, child: Node) {
        let Some(index) = self.fields.iter().position(|(k, _)| *k == name) else {
            self.fields.push((name, child));
            return;
        };
        match &mut self.fields[index].1 {
            Node::List(items) => items.push(child),
            existing => {
                let first = std::mem::replace(existing, Node::List(vec![]));
                *existing = Node::List(vec![first, child]);
            }
        }
    }

    fn close(mut self) -> (String, Node) {
        let node = if self.fields.is_empty() {
            Node::Scalar(self.text)
        } else {
            // Whitespace between child elements is layout, not content.
            if !self.text.trim().is_empty() {
                self.fields.push((TEXT_KEY.to_string(), Node::Scalar(self.text)));
            }
            Node::Map(self.fields)
        };
        (self.name, node)
    }
}

/// Parse a complete XML document from `source`.
///
/// The result is a mapping holding exactly one field: the root element.
/// Attributes and child elements of an element both become fields of its
/// mapping. An element occurring more than once below the same parent
/// becomes a [`Node::List`]; a single occurrence stays a single node.
///
/// Text is kept verbatim, including surrounding whitespace. Whitespace-only
/// text of an element with attributes or children is dropped.
pub fn parse_document(source: &str) -> Result<Node, Error> {
    let mut reader = Reader::from_str(source);

    let mut stack: Vec<Pending> = vec![];
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(Error::Malformed("multiple root elements".to_string()));
                }
                stack.push(Pending::open(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(Error::Malformed("multiple root elements".to_string()));
                }
                let (name, node) = Pending::open(&start)?.close();
                attach(&mut stack, &mut root, name, node);
            }
            Event::End(_) => {
                // quick-xml already checks that end tags match their start tags.
                let pending = stack
                    .pop()
                    .ok_or_else(|| Error::Malformed("unexpected end tag".to_string()))?;
                let (name, node) = pending.close();
                attach(&mut stack, &mut root, name, node);
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let data = data.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry no data.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::Malformed(format!("element <{}> is not closed", open.name)));
    }
    let (name, node) = root.ok_or_else(|| Error::Malformed("no root element".to_string()))?;
    Ok(Node::Map(vec![(name, node)]))
}

fn attach(
    stack: &mut [Pending],
    root: &mut Option<(String, Node)>,
    name: String,
    node: Node,
) {
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, node),
        None => *root = Some((name, node)),
    }
}

fn push_text(stack: &mut [Pending], text: &str) -> Result<(), Error> {
    match stack.last_mut() {
        Some(open) => {
            open.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::Malformed("text outside of the root element".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_and_children_become_fields() {
        let doc = parse_document(
            r#"<gpx version="1.1"><trk><name>Stage 1</name><trkseg>
                <trkpt lat="51.9" lon="-8.5"><ele>12</ele></trkpt>
            </trkseg></trk></gpx>"#,
        )
        .unwrap();

        let trk = doc.get("gpx").and_then(|g| g.get("trk")).unwrap();
        assert_eq!(trk.get("name").and_then(Node::text), Some("Stage 1"));
        let point = trk.get("trkseg").and_then(|s| s.get("trkpt")).unwrap();
        assert_eq!(point.get("lon").and_then(Node::text), Some("-8.5"));
        assert_eq!(point.get("lat").and_then(Node::text), Some("51.9"));
        assert_eq!(point.get("ele").and_then(Node::text), Some("12"));
    }

    #[test]
    fn repeated_elements_become_lists() {
        let doc = parse_document("<gpx><rte><name>A</name></rte><rte><name>B</name></rte></gpx>")
            .unwrap();
        let rte = doc.get("gpx").and_then(|g| g.get("rte")).unwrap();

        let names: Vec<_> = rte
            .items()
            .iter()
            .filter_map(|r| r.get("name").and_then(Node::text))
            .collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn namespace_prefixes_are_dropped() {
        let doc = parse_document(r#"<g:gpx xmlns:g="urn:x"><g:rte g:id="1"/></g:gpx>"#).unwrap();
        let rte = doc.get("gpx").and_then(|g| g.get("rte")).unwrap();
        assert_eq!(rte.get("id").and_then(Node::text), Some("1"));
    }

    #[test]
    fn text_and_cdata_are_unescaped() {
        let doc = parse_document("<gpx><name>A &amp; <![CDATA[<B>]]></name></gpx>").unwrap();
        let name = doc.get("gpx").and_then(|g| g.get("name")).unwrap();
        assert_eq!(name.text(), Some("A & <B>"));
    }

    #[test]
    fn text_whitespace_is_kept() {
        let doc = parse_document(
            "<gpx>\n  <trk><name>  Stage 1 </name></trk>\n  \
             <trk><name>Fish <![CDATA[&]]> Chips</name></trk>\n</gpx>",
        )
        .unwrap();
        let gpx = doc.get("gpx").unwrap();
        assert!(!gpx.has(TEXT_KEY));

        let names: Vec<_> = gpx
            .get("trk")
            .unwrap()
            .items()
            .iter()
            .filter_map(|t| t.get("name").and_then(Node::text))
            .collect();
        assert_eq!(names, ["  Stage 1 ", "Fish & Chips"]);
    }

    #[test]
    fn layout_whitespace_is_dropped() {
        let doc = parse_document("<gpx>\n  <trkpt lat=\"1\" lon=\"2\">\n  </trkpt>\n</gpx>").unwrap();
        let point = doc.get("gpx").and_then(|g| g.get("trkpt")).unwrap();
        assert_eq!(
            *point,
            Node::Map(vec![
                ("lat".to_string(), Node::Scalar("1".to_string())),
                ("lon".to_string(), Node::Scalar("2".to_string())),
            ])
        );
    }

    #[test]
    fn unclosed_element_is_rejected() {
        assert!(parse_document("<gpx><trk>").is_err());
    }

    #[test]
    fn mismatched_end_tag_is_rejected() {
        assert!(parse_document("<gpx><trk></rte></gpx>").is_err());
    }

    #[test]
    fn empty_and_text_only_input_is_rejected() {
        assert!(matches!(parse_document(""), Err(Error::Malformed(_))));
        assert!(matches!(
            parse_document("not xml at all"),
            Err(Error::Malformed(_))
        ));
    }
}
