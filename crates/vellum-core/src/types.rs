//! Core value types for scene geometry.

use std::fmt;

use glam::DVec2;

/// Identifier of a node in the scene graph.
///
/// Ids are allocated by the graph and never reused, so a stale id simply
/// stops resolving instead of pointing at a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Position, size and transform of a node in its parent's coordinate space.
///
/// `width`/`height` are the unscaled extents; the canvas may stretch a node
/// by `scale_x`/`scale_y` while it is being dragged. Layout always works on
/// the effective (scaled) size and bakes the scale back into the extents
/// whenever it normalizes a node.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees. Layout never changes it.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Geometry {
    /// Create an unscaled, unrotated geometry.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Create a geometry of the given size at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Set the scale factors.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Width after scaling.
    pub fn effective_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// Height after scaling.
    pub fn effective_height(&self) -> f64 {
        self.height * self.scale_y
    }

    /// Effective size of the node.
    pub fn extent(&self) -> Extent {
        Extent::new(self.effective_width(), self.effective_height())
    }

    /// Fold both scale factors into the extents.
    pub fn bake_scale(&mut self) {
        self.width = self.effective_width();
        self.height = self.effective_height();
        self.scale_x = 1.0;
        self.scale_y = 1.0;
    }

    /// Axis-aligned box covered by the node (rotation ignored).
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.effective_width(), self.effective_height())
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds with position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Get position as a vector.
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Get the size.
    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    /// Get the right edge (x + width).
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Get the bottom edge (y + height).
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Move the bounds by an offset.
    pub fn translate(&self, offset: DVec2) -> Bounds {
        Bounds::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Compute union (bounding box) with another bounds.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Bounds::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Bounding box of a sequence of bounds, `None` if it is empty.
    pub fn enclosing(mut iter: impl Iterator<Item = Bounds>) -> Option<Bounds> {
        let first = iter.next()?;
        Some(iter.fold(first, |acc, b| acc.union(&b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_extent() {
        let geometry = Geometry::sized(100.0, 40.0).with_scale(2.0, 0.5);
        let extent = geometry.extent();
        assert!((extent.width - 200.0).abs() < 0.001);
        assert!((extent.height - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_bake_scale() {
        let mut geometry = Geometry::sized(100.0, 40.0).with_scale(1.5, 3.0);
        geometry.bake_scale();
        assert_eq!(geometry.scale_x, 1.0);
        assert_eq!(geometry.scale_y, 1.0);
        assert!((geometry.width - 150.0).abs() < 0.001);
        assert!((geometry.height - 120.0).abs() < 0.001);
    }

    #[test]
    fn test_bake_keeps_rotation() {
        let mut geometry = Geometry::sized(10.0, 10.0).with_rotation(45.0).with_scale(2.0, 2.0);
        geometry.bake_scale();
        assert_eq!(geometry.rotation, 45.0);
        assert_eq!(geometry.width, 20.0);
    }

    #[test]
    fn test_bounds_union() {
        let a = Bounds::new(0.0, 0.0, 50.0, 50.0);
        let b = Bounds::new(100.0, 20.0, 50.0, 100.0);
        let u = a.union(&b);
        assert!((u.width - 150.0).abs() < 0.001);
        assert!((u.height - 120.0).abs() < 0.001);
    }

    #[test]
    fn test_enclosing_empty() {
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
    }
}
