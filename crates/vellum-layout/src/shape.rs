//! Shape variants of scene nodes.

use serde::{Deserialize, Serialize};
use vellum_core::{Extent, Geometry};

/// What a scene node draws.
///
/// Layout never branches on the concrete variant: it only asks for
/// [`ShapeKind::intrinsic_extent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ShapeKind {
    /// Rectangle
    Rect,
    /// Ellipse inscribed in the node box
    Ellipse,
    /// Text block
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        font_size: f64,
        /// Line height as a multiple of the font size
        line_height: f64,
    },
    /// Straight line stroked along the node box
    #[serde(rename_all = "camelCase")]
    Line { stroke_width: f64 },
    /// Container of other nodes
    Group,
}

impl ShapeKind {
    /// Create a text shape with the default line height.
    pub fn text(content: impl Into<String>, font_size: f64) -> Self {
        ShapeKind::Text {
            content: content.into(),
            font_size,
            line_height: 1.2,
        }
    }

    /// Whether nodes of this kind may own children.
    pub fn is_container(&self) -> bool {
        matches!(self, ShapeKind::Group)
    }

    /// Size the node occupies for layout purposes.
    pub fn intrinsic_extent(&self, geometry: &Geometry) -> Extent {
        let extent = geometry.extent();
        match self {
            ShapeKind::Rect | ShapeKind::Ellipse | ShapeKind::Group => extent,
            ShapeKind::Text {
                font_size,
                line_height,
                ..
            } => Extent::new(extent.width, extent.height.max(font_size * line_height)),
            // A hairline still takes up its stroke.
            ShapeKind::Line { stroke_width } => Extent::new(
                extent.width.max(*stroke_width),
                extent.height.max(*stroke_width),
            ),
        }
    }
}
