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

//! Generic tree of parsed GPX data.
//!
//! A [`Node`] is either a scalar, an ordered list, or an ordered mapping from
//! names to further nodes. No GPX schema is assumed.

use std::slice;

/// Key under which text is stored for elements that also carry attributes or
/// children.
pub const TEXT_KEY: &str = "#text";

/// One position in a parsed document.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Plain text, e.g. an attribute value or a text-only element.
    Scalar(String),
    /// Repeated sibling elements sharing the same name.
    List(Vec<Node>),
    /// Named fields in document order.
    Map(Vec<(String, Node)>),
}

impl Node {
    /// Look up the field `key` if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Check whether this node is a mapping exposing the field `key`.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Textual content of this node.
    ///
    /// Mappings yield their [`TEXT_KEY`] field, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Scalar(s) => Some(s),
            Node::Map(_) => self.get(TEXT_KEY).and_then(Node::text),
            Node::List(_) => None,
        }
    }

    /// Treat this node as one-or-many.
    ///
    /// A list yields its elements, every other node yields itself.
    pub fn items(&self) -> &[Node] {
        match self {
            Node::List(items) => items,
            other => slice::from_ref(other),
        }
    }

    /// Depth-first, pre-order traversal starting at (and including) this node.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by [`Node::walk`].
///
/// Mapping fields and list elements are visited in their stored order.
#[derive(Clone, Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        match node {
            Node::Scalar(_) => {}
            Node::List(items) => self.stack.extend(items.iter().rev()),
            Node::Map(fields) => self.stack.extend(fields.iter().rev().map(|(_, v)| v)),
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> Node {
        Node::Scalar(s.to_string())
    }

    fn map(fields: &[(&str, Node)]) -> Node {
        Node::Map(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = map(&[
            ("a", scalar("1")),
            ("b", Node::List(vec![scalar("2"), map(&[("c", scalar("3"))])])),
            ("d", scalar("4")),
        ]);

        let scalars: Vec<_> = tree.walk().filter_map(Node::text).collect();
        assert_eq!(scalars, ["1", "2", "3", "4"]);
        // root, a, b, 2, {c}, 3, d
        assert_eq!(tree.walk().count(), 7);
    }

    #[test]
    fn walk_is_restartable() {
        let tree = Node::List(vec![scalar("x"), scalar("y")]);
        assert_eq!(tree.walk().count(), tree.walk().count());
    }

    #[test]
    fn items_normalizes_single_values() {
        let single = scalar("only");
        assert_eq!(single.items(), [scalar("only")]);

        let many = Node::List(vec![scalar("1"), scalar("2")]);
        assert_eq!(many.items().len(), 2);
    }

    #[test]
    fn text_of_mapping() {
        let node = map(&[("id", scalar("7")), (TEXT_KEY, scalar("hello"))]);
        assert_eq!(node.text(), Some("hello"));
        assert!(node.has("id"));
        assert!(!scalar("x").has("id"));
        assert_eq!(map(&[]).text(), None);
    }
}
