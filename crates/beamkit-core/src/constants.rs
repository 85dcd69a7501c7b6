//! Engine-wide constants.

/// Prefix used for generated node ids (`svg_1`, `svg_2`, ...).
pub const ID_PREFIX: &str = "svg_";

/// Id of the document root container node.
pub const ROOT_ID: &str = "svgcontent";

/// Id of the resource-definition container node.
pub const DEFS_ID: &str = "svg_defs";

/// Class marker carried by layer nodes in the original document format.
pub const LAYER_CLASS: &str = "layer";
