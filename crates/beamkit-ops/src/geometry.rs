//! Geometry recalculation: axis-aligned bounds and the post-transform
//! attribute bake that keeps shape coordinates readable after moves.

use beamkit_history::{ChangeAttributes, Command};
use beamkit_scene::{Document, Matrix2D, NodeId, NodeKind, ShapeTag, TransformOp};
use tracing::debug;

/// Axis-aligned bounding box in parent coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    fn from_corners(corners: &[(f64, f64)]) -> BBox {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for &(x, y) in corners {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        BBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    fn transformed(&self, m: &Matrix2D) -> BBox {
        let corners = [
            m.apply(self.x, self.y),
            m.apply(self.right(), self.y),
            m.apply(self.right(), self.bottom()),
            m.apply(self.x, self.bottom()),
        ];
        BBox::from_corners(&corners)
    }
}

fn attr_f64(doc: &Document, id: &NodeId, name: &str) -> f64 {
    doc.get_attribute(id, name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

/// Bounding box of a node in its parent's coordinate space, including the
/// node's own transform. Returns `None` for nodes without geometry (empty
/// containers, resource definitions, unknown tags).
pub fn node_bbox(doc: &Document, id: &NodeId) -> Option<BBox> {
    let node = doc.node(id)?;
    let local = match node.kind() {
        NodeKind::Shape(ShapeTag::Rect) | NodeKind::Shape(ShapeTag::Image) => Some(BBox {
            x: attr_f64(doc, id, "x"),
            y: attr_f64(doc, id, "y"),
            width: attr_f64(doc, id, "width"),
            height: attr_f64(doc, id, "height"),
        }),
        NodeKind::Shape(ShapeTag::Circle) => {
            let r = attr_f64(doc, id, "r");
            Some(BBox {
                x: attr_f64(doc, id, "cx") - r,
                y: attr_f64(doc, id, "cy") - r,
                width: 2.0 * r,
                height: 2.0 * r,
            })
        }
        NodeKind::Shape(ShapeTag::Ellipse) => {
            let rx = attr_f64(doc, id, "rx");
            let ry = attr_f64(doc, id, "ry");
            Some(BBox {
                x: attr_f64(doc, id, "cx") - rx,
                y: attr_f64(doc, id, "cy") - ry,
                width: 2.0 * rx,
                height: 2.0 * ry,
            })
        }
        NodeKind::Shape(ShapeTag::Line) => {
            let (x1, y1) = (attr_f64(doc, id, "x1"), attr_f64(doc, id, "y1"));
            let (x2, y2) = (attr_f64(doc, id, "x2"), attr_f64(doc, id, "y2"));
            Some(BBox::from_corners(&[(x1, y1), (x2, y2)]))
        }
        NodeKind::Shape(ShapeTag::Polygon) => doc
            .get_attribute(id, "points")
            .as_deref()
            .and_then(parse_points)
            .filter(|p| !p.is_empty())
            .map(|p| BBox::from_corners(&p)),
        NodeKind::Text => Some(BBox {
            x: attr_f64(doc, id, "x"),
            y: attr_f64(doc, id, "y"),
            width: attr_f64(doc, id, "width"),
            height: attr_f64(doc, id, "height"),
        }),
        kind if kind.is_container() => {
            let mut acc: Option<BBox> = None;
            for child in doc.children_of(id) {
                if let Some(b) = node_bbox(doc, child) {
                    acc = Some(match acc {
                        Some(prev) => prev.union(&b),
                        None => b,
                    });
                }
            }
            acc
        }
        _ => None,
    }?;
    let transform = node.transform();
    if transform.is_empty() {
        Some(local)
    } else {
        Some(local.transformed(&transform.consolidate()))
    }
}

/// Union bounding box of several nodes.
pub fn combined_bbox(doc: &Document, ids: &[NodeId]) -> Option<BBox> {
    let mut acc: Option<BBox> = None;
    for id in ids {
        if let Some(b) = node_bbox(doc, id) {
            acc = Some(match acc {
                Some(prev) => prev.union(&b),
                None => b,
            });
        }
    }
    acc
}

/// Positional attribute names that a pure translation can be folded into,
/// keyed by shape kind. The second slice holds the y-axis names.
fn translatable_attrs(kind: &NodeKind) -> Option<(&'static [&'static str], &'static [&'static str])> {
    match kind {
        NodeKind::Shape(ShapeTag::Rect) | NodeKind::Shape(ShapeTag::Image) | NodeKind::Text => {
            Some((&["x"], &["y"]))
        }
        NodeKind::Shape(ShapeTag::Circle) | NodeKind::Shape(ShapeTag::Ellipse) => {
            Some((&["cx"], &["cy"]))
        }
        NodeKind::Shape(ShapeTag::Line) => Some((&["x1", "x2"], &["y1", "y2"])),
        _ => None,
    }
}

/// Parses a `points` attribute: coordinate pairs separated by commas
/// and/or whitespace.
fn parse_points(value: &str) -> Option<Vec<(f64, f64)>> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    if numbers.len() % 2 != 0 {
        return None;
    }
    Some(numbers.chunks_exact(2).map(|p| (p[0], p[1])).collect())
}

fn format_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes the transform list on `id` after an edit.
///
/// A pure translation on a simple shape is baked into its positional
/// attributes and the transform dropped; any other multi-operation list
/// is collapsed to a single matrix. Returns the command that undoes the
/// normalization, or `None` when the node was already in normal form.
pub fn recalculate_dimensions(doc: &mut Document, id: &NodeId) -> Option<Command> {
    let node = doc.node(id)?;
    let list = node.transform().clone();
    if list.is_empty() {
        return None;
    }
    let kind = node.kind().clone();

    if list.is_pure_translation() {
        if matches!(kind, NodeKind::Shape(ShapeTag::Polygon)) {
            let m = list.consolidate();
            let raw = doc.get_attribute(id, "points").unwrap_or_default();
            if let Some(mut points) = parse_points(&raw) {
                let old_values = vec![
                    ("points".to_string(), doc.get_attribute(id, "points")),
                    ("transform".to_string(), doc.get_attribute(id, "transform")),
                ];
                for (x, y) in &mut points {
                    *x += m.e;
                    *y += m.f;
                }
                doc.set_attribute(id, "points", &format_points(&points))
                    .ok()?;
                doc.remove_attribute(id, "transform").ok()?;
                debug!(node = %id, dx = m.e, dy = m.f, "baked translation into points");
                return Some(Command::ChangeAttributes(ChangeAttributes::capture(
                    doc, id, old_values,
                )));
            }
        }
        if let Some((x_attrs, y_attrs)) = translatable_attrs(&kind) {
            let m = list.consolidate();
            let mut old_values: Vec<(String, Option<String>)> = Vec::new();
            for name in x_attrs.iter().chain(y_attrs.iter()) {
                old_values.push((name.to_string(), doc.get_attribute(id, name)));
            }
            old_values.push(("transform".to_string(), doc.get_attribute(id, "transform")));

            for name in x_attrs {
                let v = attr_f64(doc, id, name) + m.e;
                doc.set_attribute(id, name, &v.to_string()).ok()?;
            }
            for name in y_attrs {
                let v = attr_f64(doc, id, name) + m.f;
                doc.set_attribute(id, name, &v.to_string()).ok()?;
            }
            doc.remove_attribute(id, "transform").ok()?;
            debug!(node = %id, dx = m.e, dy = m.f, "baked translation into coordinates");
            return Some(Command::ChangeAttributes(ChangeAttributes::capture(
                doc, id, old_values,
            )));
        }
    }

    if list.len() > 1 {
        let old_values = vec![("transform".to_string(), doc.get_attribute(id, "transform"))];
        let collapsed = [TransformOp::Matrix(list.consolidate())]
            .into_iter()
            .collect();
        doc.set_transform(id, collapsed).ok()?;
        debug!(node = %id, "collapsed transform list to a single matrix");
        return Some(Command::ChangeAttributes(ChangeAttributes::capture(
            doc, id, old_values,
        )));
    }

    None
}
