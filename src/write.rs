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

//! Serializing KML element trees to XML.

use std::io;

use kml::types::Element;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::build::is_cdata;
use crate::Error;

/// Write `root` as a standalone XML document to `sink`.
///
/// Attributes are written in sorted order so that equal trees produce equal
/// bytes. Text content is escaped unless it is a literal CDATA section, which
/// is written verbatim.
pub fn write_kml(root: &Element, sink: impl io::Write) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(sink, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    write_element(&mut writer, root)?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

/// Serialize `root` into a byte vector.
pub fn to_bytes(root: &Element) -> Result<Vec<u8>, Error> {
    let mut sink = vec![];
    write_kml(root, &mut sink)?;
    Ok(sink)
}

fn write_element<W: io::Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), Error> {
    let mut attrs: Vec<_> = element.attrs.iter().collect();
    attrs.sort();
    let start = BytesStart::new(element.name.as_str())
        .with_attributes(attrs.into_iter().map(|(k, v)| (k.as_str(), v.as_str())));

    if element.content.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(content) = &element.content {
        let text = if is_cdata(content) {
            BytesText::from_escaped(content.as_str())
        } else {
            BytesText::new(content)
        };
        writer.write_event(Event::Text(text))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
