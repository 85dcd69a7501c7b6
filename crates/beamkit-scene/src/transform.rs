//! Affine transform list for scene nodes.
//!
//! A node carries an ordered list of transform operations. The list is
//! outermost-first: `[A, B]` transforms a point by `A * B * p`, i.e. `B`
//! is applied innermost. This matches the SVG `transform` attribute the
//! original documents use.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D affine matrix in SVG order:
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix2D {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix2D {
    /// The identity matrix.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// A pure translation.
    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    /// A scale about the origin.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::identity()
        }
    }

    /// A rotation about the origin, in degrees.
    pub fn rotate(angle_deg: f64) -> Self {
        let rad = angle_deg.to_radians();
        let (sin, cos) = rad.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Matrix product `self * other` (`other` applied first).
    pub fn multiply(&self, other: &Matrix2D) -> Matrix2D {
        Matrix2D {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Transforms a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// True if this is (numerically) the identity.
    pub fn is_identity(&self) -> bool {
        const EPS: f64 = 1e-10;
        (self.a - 1.0).abs() < EPS
            && self.b.abs() < EPS
            && self.c.abs() < EPS
            && (self.d - 1.0).abs() < EPS
            && self.e.abs() < EPS
            && self.f.abs() < EPS
    }

    /// True if the linear part is identity, leaving only a translation.
    pub fn is_translation(&self) -> bool {
        const EPS: f64 = 1e-10;
        (self.a - 1.0).abs() < EPS
            && self.b.abs() < EPS
            && self.c.abs() < EPS
            && (self.d - 1.0).abs() < EPS
    }
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::identity()
    }
}

/// A single transform operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformOp {
    Translate { tx: f64, ty: f64 },
    Scale { sx: f64, sy: f64 },
    /// Rotation in degrees about a center point.
    Rotate { angle_deg: f64, cx: f64, cy: f64 },
    Matrix(Matrix2D),
}

impl TransformOp {
    /// The matrix this operation represents.
    pub fn matrix(&self) -> Matrix2D {
        match *self {
            TransformOp::Translate { tx, ty } => Matrix2D::translate(tx, ty),
            TransformOp::Scale { sx, sy } => Matrix2D::scale(sx, sy),
            TransformOp::Rotate { angle_deg, cx, cy } => Matrix2D::translate(cx, cy)
                .multiply(&Matrix2D::rotate(angle_deg))
                .multiply(&Matrix2D::translate(-cx, -cy)),
            TransformOp::Matrix(m) => m,
        }
    }

    /// True if this operation is a pure translation.
    pub fn is_translation(&self) -> bool {
        match self {
            TransformOp::Translate { .. } => true,
            TransformOp::Matrix(m) => m.is_translation(),
            TransformOp::Scale { .. } | TransformOp::Rotate { .. } => false,
        }
    }
}

/// Ordered list of transform operations, outermost-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformList {
    ops: Vec<TransformOp>,
}

impl TransformList {
    /// Creates an empty list (identity transform).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation at the innermost position.
    pub fn push(&mut self, op: TransformOp) {
        self.ops.push(op);
    }

    /// Prepends an operation at the outermost position.
    pub fn prepend(&mut self, op: TransformOp) {
        self.ops.insert(0, op);
    }

    /// Iterates operations outermost-first.
    pub fn iter(&self) -> impl Iterator<Item = &TransformOp> {
        self.ops.iter()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if no operations are present.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drops all operations.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Collapses the list into a single matrix.
    pub fn consolidate(&self) -> Matrix2D {
        self.ops
            .iter()
            .fold(Matrix2D::identity(), |acc, op| acc.multiply(&op.matrix()))
    }

    /// True if every operation is a pure translation.
    pub fn is_pure_translation(&self) -> bool {
        self.ops.iter().all(|op| op.is_translation())
    }
}

impl TransformList {
    /// Parses the original document's `transform` attribute syntax:
    /// `translate(tx [ty]) scale(sx [sy]) rotate(a [cx cy]) matrix(a b c d e f)`,
    /// whitespace- or comma-separated arguments.
    pub fn parse(value: &str) -> Option<TransformList> {
        let mut ops = Vec::new();
        let mut rest = value.trim();
        while !rest.is_empty() {
            let open = rest.find('(')?;
            let close = rest.find(')')?;
            if close < open {
                return None;
            }
            let name = rest[..open].trim();
            let args: Vec<f64> = rest[open + 1..close]
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<_, _>>()
                .ok()?;
            let op = match (name, args.as_slice()) {
                ("translate", [tx]) => TransformOp::Translate { tx: *tx, ty: 0.0 },
                ("translate", [tx, ty]) => TransformOp::Translate { tx: *tx, ty: *ty },
                ("scale", [s]) => TransformOp::Scale { sx: *s, sy: *s },
                ("scale", [sx, sy]) => TransformOp::Scale { sx: *sx, sy: *sy },
                ("rotate", [a]) => TransformOp::Rotate {
                    angle_deg: *a,
                    cx: 0.0,
                    cy: 0.0,
                },
                ("rotate", [a, cx, cy]) => TransformOp::Rotate {
                    angle_deg: *a,
                    cx: *cx,
                    cy: *cy,
                },
                ("matrix", [a, b, c, d, e, f]) => TransformOp::Matrix(Matrix2D {
                    a: *a,
                    b: *b,
                    c: *c,
                    d: *d,
                    e: *e,
                    f: *f,
                }),
                _ => return None,
            };
            ops.push(op);
            rest = rest[close + 1..].trim_start();
        }
        Some(TransformList { ops })
    }
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TransformOp::Translate { tx, ty } => write!(f, "translate({tx} {ty})"),
            TransformOp::Scale { sx, sy } => write!(f, "scale({sx} {sy})"),
            TransformOp::Rotate { angle_deg, cx, cy } => {
                write!(f, "rotate({angle_deg} {cx} {cy})")
            }
            TransformOp::Matrix(m) => {
                write!(f, "matrix({} {} {} {} {} {})", m.a, m.b, m.c, m.d, m.e, m.f)
            }
        }
    }
}

impl fmt::Display for TransformList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

impl FromIterator<TransformOp> for TransformList {
    fn from_iter<T: IntoIterator<Item = TransformOp>>(iter: T) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}
