//! Pure queries over `url(#id)`-style resource references.
//!
//! The history engine's reference resolver needs two questions answered
//! without mutating anything: "which ids does this subtree reference?" and
//! "does anything in the tree still reference id X?". Both live here.

use crate::document::Document;
use crate::node::{Node, NodeId, NodeKind, ShapeTag};

/// Attribute names that can carry a resource reference.
pub const REF_ATTRS: [&str; 9] = [
    "fill",
    "stroke",
    "filter",
    "clip-path",
    "mask",
    "marker-start",
    "marker-mid",
    "marker-end",
    "href",
];

/// Extracts the referenced id from an attribute value.
///
/// `fill`-style attributes use `url(#id)`; `href` uses a bare `#id`.
pub fn url_reference(attr_name: &str, value: &str) -> Option<String> {
    if attr_name == "href" {
        return value.strip_prefix('#').map(str::to_string);
    }
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?;
    inner.trim().strip_prefix('#').map(str::to_string)
}

/// True if references on this node should be ignored entirely.
///
/// Style nodes and layer containers never carry live references worth
/// resolving.
fn skip_node(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Layer)
        || matches!(node.kind(), NodeKind::Other(tag) if tag == "style")
}

/// True if this attribute/node pairing is exempt from reference tracking.
///
/// `filter` on image and use nodes is a rendering hint, not a resource
/// dependency.
fn skip_attr(node: &Node, attr_name: &str) -> bool {
    attr_name == "filter"
        && matches!(
            node.kind(),
            NodeKind::Shape(ShapeTag::Image) | NodeKind::Shape(ShapeTag::Use) | NodeKind::ResourceRef
        )
}

/// References carried directly on one node: `(attribute name, target id)`.
pub fn node_references(node: &Node) -> Vec<(String, String)> {
    if skip_node(node) {
        return Vec::new();
    }
    let mut out = Vec::new();
    for attr_name in REF_ATTRS {
        if skip_attr(node, attr_name) {
            continue;
        }
        if let Some(value) = node.attribute(attr_name) {
            if let Some(target) = url_reference(attr_name, value) {
                out.push((attr_name.to_string(), target));
            }
        }
    }
    out
}

/// All references inside the live subtree rooted at `root`:
/// `(referencing node, attribute name, target id)`.
pub fn references_in_subtree(doc: &Document, root: &NodeId) -> Vec<(NodeId, String, String)> {
    let mut out = Vec::new();
    for id in doc.subtree_ids(root) {
        let Some(node) = doc.node(&id) else { continue };
        for (attr, target) in node_references(node) {
            out.push((id.clone(), attr, target));
        }
    }
    out
}

/// Does any attribute in the subtree rooted at `root` reference `target`?
pub fn subtree_references_id(doc: &Document, root: &NodeId, target: &NodeId) -> bool {
    references_in_subtree(doc, root)
        .iter()
        .any(|(_, _, t)| t == target.as_str())
}

/// Does anything in the whole tree reference `target`?
pub fn is_referenced(doc: &Document, target: &NodeId) -> bool {
    subtree_references_id(doc, doc.root_id(), target)
}
