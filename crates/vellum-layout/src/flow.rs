//! Default flex-like layout of an auto layout container's children.
//!
//! Children are placed one after another along the main axis, separated by
//! the gap, with the whole run shifted or spread according to the
//! distribution. Each child is then placed on the cross axis according to
//! the alignment. Only one level of children is handled per call.

use tracing::{debug, trace};
use vellum_core::{Extent, Geometry, NodeId, SceneError};

use crate::config::{Alignment, Direction, Distribution, LayoutConfig, Resizing};
use crate::tree::SceneGraph;

/// New position (and optionally size) computed for one child.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// New unscaled width. `None` leaves width and horizontal scale alone.
    pub width: Option<f64>,
    /// New unscaled height. `None` leaves height and vertical scale alone.
    pub height: Option<f64>,
}

impl Placement {
    /// Write the placement into a child's geometry.
    pub fn apply(&self, geometry: &mut Geometry) {
        geometry.x = self.x;
        geometry.y = self.y;
        if let Some(width) = self.width {
            geometry.width = width;
            geometry.scale_x = 1.0;
        }
        if let Some(height) = self.height {
            geometry.height = height;
            geometry.scale_y = 1.0;
        }
    }
}

impl LayoutConfig {
    /// Compute child placements within a container of the given size.
    ///
    /// `children` are the children's intrinsic extents in layout order. The
    /// result has one placement per child, in the same order.
    pub fn flow(&self, container: Extent, children: &[Extent]) -> Vec<Placement> {
        let n = children.len();
        if n == 0 {
            return Vec::new();
        }

        let direction = self.direction;
        let main_lead = self.padding.main_lead(direction);
        let cross_lead = self.padding.cross_lead(direction);
        let usable_main = direction.main(container) - main_lead - self.padding.main_trail(direction);
        let usable_cross =
            direction.cross(container) - cross_lead - self.padding.cross_trail(direction);

        let total_main: f64 = children.iter().map(|c| direction.main(*c)).sum();
        let total_gap = if n > 1 { self.gap * (n - 1) as f64 } else { 0.0 };
        // Negative when the children overflow; that is allowed.
        let remaining = usable_main - total_main - total_gap;

        let (start, spacing) = match self.distribution {
            Distribution::SpaceBetween if n > 1 => (0.0, self.gap + remaining / (n - 1) as f64),
            Distribution::Center => (remaining / 2.0, self.gap),
            Distribution::End => (remaining, self.gap),
            Distribution::Start | Distribution::SpaceBetween => (0.0, self.gap),
        };

        let fill_extent = usable_cross.max(0.0);
        let mut offset = main_lead + start;

        children
            .iter()
            .map(|child| {
                let cross_extent = match self.resizing {
                    Resizing::Fill => fill_extent,
                    Resizing::Hug => direction.cross(*child),
                };
                let cross = cross_lead
                    + match self.alignment {
                        Alignment::Start => 0.0,
                        Alignment::Center => (usable_cross - cross_extent) / 2.0,
                        Alignment::End => usable_cross - cross_extent,
                    };

                let (x, y) = direction.compose(offset, cross);
                let filled = (self.resizing == Resizing::Fill).then_some(fill_extent);
                let (width, height) = match direction {
                    Direction::Horizontal => (None, filled),
                    Direction::Vertical => (filled, None),
                };

                offset += direction.main(*child) + spacing;
                Placement { x, y, width, height }
            })
            .collect()
    }
}

/// Intrinsic extents of a container's children, in layout order.
pub(crate) fn child_extents(graph: &SceneGraph, container: NodeId) -> Vec<(NodeId, Extent)> {
    graph
        .children(container)
        .iter()
        .filter_map(|&id| graph.get(id).map(|child| (id, child.intrinsic_extent())))
        .collect()
}

/// Resize a hugging container to wrap its children.
///
/// The container's own scale is folded away; its position is kept.
pub fn hug_container(
    graph: &mut SceneGraph,
    container: NodeId,
    config: &LayoutConfig,
) -> Result<Extent, SceneError> {
    let extents: Vec<Extent> = child_extents(graph, container)
        .into_iter()
        .map(|(_, extent)| extent)
        .collect();
    let size = config.hug_extent(&extents);

    let node = graph
        .get_mut(container)
        .ok_or(SceneError::UnknownNode(container))?;
    node.geometry.width = size.width;
    node.geometry.height = size.height;
    node.geometry.scale_x = 1.0;
    node.geometry.scale_y = 1.0;
    trace!(container = %container, width = size.width, height = size.height, "hug");
    Ok(size)
}

/// Run the default layout over one container's children.
///
/// Uses the container's current effective size; hug sizing, if wanted, has
/// to happen before this call.
pub fn apply_flow(
    graph: &mut SceneGraph,
    container: NodeId,
    config: &LayoutConfig,
) -> Result<(), SceneError> {
    let size = graph
        .get(container)
        .ok_or(SceneError::UnknownNode(container))?
        .geometry
        .extent();
    let children = child_extents(graph, container);
    let extents: Vec<Extent> = children.iter().map(|(_, extent)| *extent).collect();
    let placements = config.flow(size, &extents);

    debug!(
        container = %container,
        children = children.len(),
        width = size.width,
        height = size.height,
        "flow layout"
    );

    for ((id, _), placement) in children.iter().zip(placements.iter()) {
        if let Some(child) = graph.get_mut(*id) {
            placement.apply(&mut child.geometry);
            trace!(child = %id, x = placement.x, y = placement.y, "placed");
        }
    }

    graph.update_coords(container);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Padding;
    use crate::shape::ShapeKind;
    use crate::tree::SceneNode;

    fn sizes(list: &[(f64, f64)]) -> Vec<Extent> {
        list.iter().map(|&(w, h)| Extent::new(w, h)).collect()
    }

    fn unpadded() -> LayoutConfig {
        LayoutConfig::horizontal().with_uniform_padding(0.0)
    }

    #[test]
    fn test_horizontal_layout() {
        let config = unpadded().with_gap(10.0);
        let result = config.flow(
            Extent::new(300.0, 100.0),
            &sizes(&[(50.0, 50.0), (50.0, 50.0), (50.0, 50.0)]),
        );

        assert_eq!(result.len(), 3);
        assert!((result[0].x - 0.0).abs() < 0.001);
        assert!((result[1].x - 60.0).abs() < 0.001); // 50 + 10 gap
        assert!((result[2].x - 120.0).abs() < 0.001); // 50 + 10 + 50 + 10
        assert!(result.iter().all(|p| p.width.is_none() && p.height.is_none()));
    }

    #[test]
    fn test_vertical_layout_centered() {
        let config = LayoutConfig::vertical()
            .with_uniform_padding(0.0)
            .with_gap(10.0)
            .with_alignment(Alignment::Center);
        let result = config.flow(Extent::new(200.0, 400.0), &sizes(&[(100.0, 50.0), (100.0, 50.0)]));

        // Centered horizontally: (200 - 100) / 2 = 50
        assert!((result[0].x - 50.0).abs() < 0.001);
        assert!((result[1].x - 50.0).abs() < 0.001);
        assert!((result[1].y - 60.0).abs() < 0.001);
    }

    #[test]
    fn test_distribution_space_between() {
        let config = unpadded().with_distribution(Distribution::SpaceBetween);
        let result = config.flow(
            Extent::new(300.0, 100.0),
            &sizes(&[(50.0, 50.0), (50.0, 50.0), (50.0, 50.0)]),
        );

        // Remaining 150 over 2 gaps = 75 each
        assert!((result[0].x - 0.0).abs() < 0.001);
        assert!((result[1].x - 125.0).abs() < 0.001);
        assert!((result[2].x - 250.0).abs() < 0.001);
    }

    #[test]
    fn test_space_between_adds_to_gap() {
        let config = unpadded().with_gap(20.0).with_distribution(Distribution::SpaceBetween);
        let result = config.flow(
            Extent::new(500.0, 100.0),
            &sizes(&[(100.0, 50.0), (100.0, 50.0), (100.0, 50.0)]),
        );

        // remaining = 500 - 300 - 40 = 160, spacing = 20 + 80
        assert!((result[1].x - 200.0).abs() < 0.001);
        assert!((result[2].x - 400.0).abs() < 0.001);
    }

    #[test]
    fn test_space_between_single_child_starts_at_padding() {
        let config = LayoutConfig::horizontal()
            .with_uniform_padding(12.0)
            .with_distribution(Distribution::SpaceBetween);
        let result = config.flow(Extent::new(300.0, 100.0), &sizes(&[(50.0, 50.0)]));
        assert!((result[0].x - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_padding() {
        let config = LayoutConfig::horizontal().with_uniform_padding(20.0);
        let result = config.flow(Extent::new(200.0, 100.0), &sizes(&[(50.0, 50.0)]));

        assert!((result[0].x - 20.0).abs() < 0.001);
        assert!((result[0].y - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_alignment_end() {
        let config = unpadded().with_alignment(Alignment::End);
        let result = config.flow(Extent::new(200.0, 100.0), &sizes(&[(50.0, 30.0)]));

        // Aligned to bottom (100 - 30 = 70)
        assert!((result[0].y - 70.0).abs() < 0.001);
    }

    #[test]
    fn test_alignment_end_respects_padding() {
        let config = LayoutConfig::horizontal()
            .with_padding(Padding { top: 10.0, right: 0.0, bottom: 20.0, left: 0.0 })
            .with_alignment(Alignment::End);
        let result = config.flow(Extent::new(200.0, 100.0), &sizes(&[(50.0, 30.0)]));

        // 10 + (100 - 30 usable = 70) - 30
        assert!((result[0].y - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_distribution_center_and_end() {
        let centered = unpadded().with_distribution(Distribution::Center);
        let result = centered.flow(Extent::new(200.0, 100.0), &sizes(&[(50.0, 50.0)]));
        assert!((result[0].x - 75.0).abs() < 0.001);

        let end = unpadded().with_distribution(Distribution::End);
        let result = end.flow(Extent::new(200.0, 100.0), &sizes(&[(50.0, 50.0)]));
        assert!((result[0].x - 150.0).abs() < 0.001);
    }

    #[test]
    fn test_overflow_is_not_clamped() {
        let config = unpadded().with_gap(10.0).with_distribution(Distribution::End);
        let result = config.flow(Extent::new(100.0, 50.0), &sizes(&[(80.0, 10.0), (80.0, 10.0)]));

        // remaining = 100 - 160 - 10 = -70
        assert!((result[0].x + 70.0).abs() < 0.001);
        assert!((result[1].x - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_fill_stretches_cross_axis() {
        let config = LayoutConfig::vertical()
            .with_uniform_padding(10.0)
            .with_resizing(Resizing::Fill)
            .with_alignment(Alignment::Center);
        let result = config.flow(Extent::new(200.0, 300.0), &sizes(&[(40.0, 20.0), (90.0, 20.0)]));

        for placement in &result {
            assert_eq!(placement.width, Some(180.0));
            assert_eq!(placement.height, None);
            assert!((placement.x - 10.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_fill_never_negative() {
        let config = LayoutConfig::horizontal()
            .with_uniform_padding(30.0)
            .with_resizing(Resizing::Fill);
        let result = config.flow(Extent::new(100.0, 40.0), &sizes(&[(10.0, 10.0)]));
        assert_eq!(result[0].height, Some(0.0));
    }

    #[test]
    fn test_empty_children() {
        assert!(LayoutConfig::default().flow(Extent::new(100.0, 100.0), &[]).is_empty());
    }

    #[test]
    fn test_apply_flow_writes_geometry() {
        let mut graph = SceneGraph::new();
        let config = unpadded().with_gap(5.0).with_resizing(Resizing::Fill);
        let frame = SceneNode::group(graph.next_id())
            .with_geometry(Geometry::new(100.0, 100.0, 300.0, 60.0))
            .with_layout(config.clone());
        let frame_id = graph.add_root(frame).unwrap();

        let mut ids = Vec::new();
        for _ in 0..2 {
            let child = SceneNode::new(graph.next_id(), ShapeKind::Rect)
                .with_geometry(Geometry::sized(20.0, 10.0).with_scale(2.0, 3.0));
            ids.push(graph.add_child(frame_id, child).unwrap());
        }

        apply_flow(&mut graph, frame_id, &config).unwrap();

        let second = graph.get(ids[1]).unwrap().geometry;
        // Main axis uses the scaled width (40) and keeps the scale.
        assert!((second.x - 45.0).abs() < 0.001);
        assert_eq!(second.scale_x, 2.0);
        // Cross axis filled and normalized.
        assert!((second.height - 60.0).abs() < 0.001);
        assert_eq!(second.scale_y, 1.0);

        let abs = graph.absolute_bounds(ids[1]).unwrap();
        assert!((abs.x - 145.0).abs() < 0.001);
    }

    #[test]
    fn test_hug_container() {
        let mut graph = SceneGraph::new();
        let config = unpadded().with_gap(20.0);
        let frame = SceneNode::group(graph.next_id()).with_geometry(Geometry::sized(10.0, 10.0).with_scale(3.0, 3.0));
        let frame_id = graph.add_root(frame).unwrap();
        for _ in 0..3 {
            let child = SceneNode::new(graph.next_id(), ShapeKind::Rect)
                .with_geometry(Geometry::sized(100.0, 40.0));
            graph.add_child(frame_id, child).unwrap();
        }

        let size = hug_container(&mut graph, frame_id, &config).unwrap();
        assert!((size.width - 340.0).abs() < 0.001);
        assert!((size.height - 40.0).abs() < 0.001);
        assert_eq!(graph.get(frame_id).unwrap().geometry.scale_x, 1.0);
    }
}
