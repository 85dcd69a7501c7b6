//! Scene-graph node types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attr::AttributeMap;
use crate::transform::TransformList;

/// Unique, document-stable node identifier.
///
/// Ids survive undo/redo unchanged; commands and the reference resolver key
/// everything off them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Concrete shape variants a [`NodeKind::Shape`] node can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeTag {
    Rect,
    Circle,
    Ellipse,
    Line,
    Path,
    Polygon,
    Image,
    Use,
}

impl ShapeTag {
    /// The original document tag name for this shape.
    pub fn tag_name(&self) -> &'static str {
        match self {
            ShapeTag::Rect => "rect",
            ShapeTag::Circle => "circle",
            ShapeTag::Ellipse => "ellipse",
            ShapeTag::Line => "line",
            ShapeTag::Path => "path",
            ShapeTag::Polygon => "polygon",
            ShapeTag::Image => "image",
            ShapeTag::Use => "use",
        }
    }
}

/// Tagged node variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The document root container.
    Root,
    /// A top-level layer.
    Layer,
    /// A user-created group.
    Group,
    /// Ephemeral selection container; dissolved after multi-element
    /// operations and never recorded in history.
    TempGroup,
    /// A drawable shape.
    Shape(ShapeTag),
    /// Positional multi-line text.
    Text,
    /// An element that points at a resource definition (`use`-style).
    ResourceRef,
    /// A reusable resource definition (gradient, filter, symbol).
    ResourceDef,
    /// The resource-definition container (`defs`).
    Defs,
    /// Pass-through element kept for fidelity but not edited structurally.
    Other(String),
}

impl NodeKind {
    /// The tag name used in the original document format.
    pub fn tag_name(&self) -> &str {
        match self {
            NodeKind::Root => "svg",
            NodeKind::Layer | NodeKind::Group | NodeKind::TempGroup => "g",
            NodeKind::Shape(tag) => tag.tag_name(),
            NodeKind::Text => "text",
            NodeKind::ResourceRef => "use",
            NodeKind::ResourceDef => "symbol",
            NodeKind::Defs => "defs",
            NodeKind::Other(tag) => tag,
        }
    }

    /// True for resource-definition nodes eligible for parking in the
    /// reference resolver.
    pub fn is_resource_def(&self) -> bool {
        matches!(self, NodeKind::ResourceDef)
    }

    /// True for container kinds that may own children.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Root
                | NodeKind::Layer
                | NodeKind::Group
                | NodeKind::TempGroup
                | NodeKind::Defs
                | NodeKind::ResourceDef
        )
    }
}

/// A single element of the scene tree.
///
/// Structure (parent/children links) is owned by the [`Document`] and the
/// detached [`Subtree`] representation; everything else is plain data on
/// the node itself.
///
/// [`Document`]: crate::document::Document
/// [`Subtree`]: crate::document::Subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    kind: NodeKind,
    attributes: AttributeMap,
    transform: TransformList,
    /// Multi-line text content; only meaningful for `NodeKind::Text`.
    text: Vec<String>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    /// Creates a childless, unparented node.
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            attributes: AttributeMap::new(),
            transform: TransformList::new(),
            text: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Builder-style text content setter.
    pub fn with_text(mut self, lines: Vec<String>) -> Self {
        self.text = lines;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn transform(&self) -> &TransformList {
        &self.transform
    }

    pub(crate) fn transform_mut(&mut self) -> &mut TransformList {
        &mut self.transform
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub(crate) fn set_text(&mut self, lines: Vec<String>) -> Vec<String> {
        std::mem::replace(&mut self.text, lines)
    }

    /// The parent id, if attached.
    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    /// Ordered child ids.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}
