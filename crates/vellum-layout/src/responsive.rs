//! Breakpoint-driven column layout for responsive containers.
//!
//! When a responsive container is resized to a width that matches one of
//! its breakpoints, its children are re-flowed into a simple column grid
//! instead of the default flow. Alignment, distribution and resizing are not
//! consulted in this mode.

use tracing::debug;
use vellum_core::{Extent, NodeId, SceneError};

use crate::config::{Breakpoint, ChildSnapshot, LayoutConfig, Padding};
use crate::flow::{child_extents, Placement};
use crate::tree::SceneGraph;

/// Pick the active breakpoint for a container width.
///
/// Breakpoints are checked in stored order and the first one whose threshold
/// is at least `width` wins, even if a later one would be a closer fit.
pub fn select_breakpoint(breakpoints: &[Breakpoint], width: f64) -> Option<(usize, &Breakpoint)> {
    breakpoints
        .iter()
        .enumerate()
        .find(|(_, bp)| bp.width_threshold >= width)
}

impl Breakpoint {
    /// Compute grid placements for children in a container of `width`.
    ///
    /// Every placement carries both extents, so each child's scale is folded
    /// away.
    pub fn grid(&self, padding: &Padding, width: f64, children: &[Extent]) -> Vec<Placement> {
        let gap = self.gap;

        if self.columns <= 1 {
            let mut top = padding.top;
            return children
                .iter()
                .map(|child| {
                    let placement = Placement {
                        x: padding.left,
                        y: top,
                        width: Some(child.width),
                        height: Some(child.height),
                    };
                    top += child.height + gap;
                    placement
                })
                .collect();
        }

        let columns = self.columns as usize;
        // Columns collapse to zero width when padding and gaps leave no room.
        let column_width =
            ((width - padding.horizontal() - gap * (columns - 1) as f64) / columns as f64).max(0.0);

        children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let column = (index % columns) as f64;
                // Rows advance by the child's own height, not the row's tallest.
                let row = (index / columns) as f64;
                Placement {
                    x: padding.left + column * (column_width + gap),
                    y: padding.top + row * (child.height + gap),
                    width: Some(column_width),
                    height: Some(child.height),
                }
            })
            .collect()
    }
}

/// Re-flow a container into the grid of `breakpoint` at `size`.
///
/// The container's scale is reset and its extents set to `size`.
pub fn apply_breakpoint(
    graph: &mut SceneGraph,
    container: NodeId,
    config: &LayoutConfig,
    breakpoint: &Breakpoint,
    size: Extent,
) -> Result<(), SceneError> {
    let node = graph
        .get_mut(container)
        .ok_or(SceneError::UnknownNode(container))?;
    node.geometry.scale_x = 1.0;
    node.geometry.scale_y = 1.0;
    node.geometry.width = size.width;
    node.geometry.height = size.height;

    let children = child_extents(graph, container);
    let extents: Vec<Extent> = children.iter().map(|(_, extent)| *extent).collect();
    let placements = breakpoint.grid(&config.padding, size.width, &extents);

    debug!(
        container = %container,
        columns = breakpoint.columns,
        threshold = breakpoint.width_threshold,
        children = children.len(),
        "breakpoint layout"
    );

    for ((id, _), placement) in children.iter().zip(placements.iter()) {
        if let Some(child) = graph.get_mut(*id) {
            placement.apply(&mut child.geometry);
        }
    }

    graph.update_coords(container);
    Ok(())
}

/// Record the container's current size and children as its responsive
/// baseline.
pub fn capture_baseline(graph: &mut SceneGraph, container: NodeId) -> Result<(), SceneError> {
    let node = graph.get(container).ok_or(SceneError::UnknownNode(container))?;
    let original_size = node.geometry.extent();
    let snapshots: Vec<ChildSnapshot> = node
        .children()
        .iter()
        .filter_map(|&id| {
            graph.get(id).map(|child| ChildSnapshot {
                id,
                geometry: child.geometry,
            })
        })
        .collect();

    if let Some(layout) = graph
        .get_mut(container)
        .and_then(|node| node.layout.as_mut())
    {
        layout.capture_baseline(original_size, snapshots);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;
    use crate::tree::SceneNode;
    use vellum_core::Geometry;

    #[test]
    fn test_first_match_in_stored_order() {
        let breakpoints = [Breakpoint::new(400.0, 2, 8.0), Breakpoint::new(800.0, 1, 16.0)];
        let (index, active) = select_breakpoint(&breakpoints, 500.0).unwrap();
        assert_eq!(index, 1);
        assert_eq!(active.columns, 1);

        // 300 fits both; the first stored entry wins.
        let (index, _) = select_breakpoint(&breakpoints, 300.0).unwrap();
        assert_eq!(index, 0);

        // Unsorted lists are not re-ordered.
        let unsorted = [Breakpoint::new(768.0, 2, 16.0), Breakpoint::new(480.0, 1, 8.0)];
        let (index, _) = select_breakpoint(&unsorted, 300.0).unwrap();
        assert_eq!(index, 0);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let breakpoints = [Breakpoint::new(480.0, 1, 8.0)];
        assert!(select_breakpoint(&breakpoints, 480.0).is_some());
        assert!(select_breakpoint(&breakpoints, 480.5).is_none());
        assert!(select_breakpoint(&[], 10.0).is_none());
    }

    #[test]
    fn test_single_column_stacks() {
        let breakpoint = Breakpoint::new(800.0, 1, 8.0);
        let children = [
            Extent::new(100.0, 40.0),
            Extent::new(100.0, 60.0),
            Extent::new(100.0, 50.0),
        ];
        let result = breakpoint.grid(&Padding::uniform(10.0), 300.0, &children);

        let tops: Vec<f64> = result.iter().map(|p| p.y).collect();
        // 10, 10 + 40 + 8, 58 + 60 + 8
        assert_eq!(tops, vec![10.0, 58.0, 126.0]);
        assert!(result.iter().all(|p| (p.x - 10.0).abs() < 0.001));
        assert_eq!(result[1].width, Some(100.0));
    }

    #[test]
    fn test_multi_column_grid() {
        let breakpoint = Breakpoint::new(768.0, 2, 16.0);
        let children = [Extent::new(50.0, 30.0); 3];
        let result = breakpoint.grid(&Padding::uniform(16.0), 400.0, &children);

        // (400 - 32 - 16) / 2 = 176
        let column_width = 176.0;
        assert_eq!(result[0].width, Some(column_width));
        assert!((result[0].x - 16.0).abs() < 0.001);
        assert!((result[1].x - (16.0 + column_width + 16.0)).abs() < 0.001);
        assert!((result[1].y - 16.0).abs() < 0.001);
        assert!((result[2].x - 16.0).abs() < 0.001);
        assert!((result[2].y - (16.0 + 30.0 + 16.0)).abs() < 0.001);
    }

    #[test]
    fn test_narrow_grid_collapses_columns() {
        let breakpoint = Breakpoint::new(768.0, 2, 8.0);
        let children = [Extent::new(50.0, 30.0); 3];
        // (10 - 32 - 8) / 2 is negative
        let result = breakpoint.grid(&Padding::uniform(16.0), 10.0, &children);

        assert!(result.iter().all(|p| p.width == Some(0.0)));
        let lefts: Vec<f64> = result.iter().map(|p| p.x).collect();
        assert_eq!(lefts, vec![16.0, 24.0, 16.0]);
        assert!(result[1].x >= result[0].x);
    }

    #[test]
    fn test_apply_breakpoint_resets_scale() {
        let mut graph = SceneGraph::new();
        let config = LayoutConfig::default().with_uniform_padding(0.0);
        let frame = SceneNode::group(graph.next_id())
            .with_geometry(Geometry::sized(200.0, 100.0).with_scale(2.0, 1.5))
            .with_layout(config.clone());
        let frame_id = graph.add_root(frame).unwrap();
        let child = SceneNode::new(graph.next_id(), ShapeKind::Rect)
            .with_geometry(Geometry::sized(30.0, 20.0).with_scale(2.0, 2.0));
        let child_id = graph.add_child(frame_id, child).unwrap();

        let breakpoint = Breakpoint::new(500.0, 2, 10.0);
        apply_breakpoint(&mut graph, frame_id, &config, &breakpoint, Extent::new(400.0, 150.0)).unwrap();

        let frame = graph.get(frame_id).unwrap().geometry;
        assert_eq!((frame.width, frame.height, frame.scale_x, frame.scale_y), (400.0, 150.0, 1.0, 1.0));

        let child = graph.get(child_id).unwrap().geometry;
        assert!((child.width - 195.0).abs() < 0.001);
        assert!((child.height - 40.0).abs() < 0.001);
        assert_eq!((child.scale_x, child.scale_y), (1.0, 1.0));
    }

    #[test]
    fn test_capture_baseline() {
        let mut graph = SceneGraph::new();
        let frame = SceneNode::group(graph.next_id())
            .with_geometry(Geometry::sized(320.0, 90.0))
            .with_layout(LayoutConfig::default().with_responsive(true));
        let frame_id = graph.add_root(frame).unwrap();
        let child = SceneNode::new(graph.next_id(), ShapeKind::Ellipse)
            .with_geometry(Geometry::new(16.0, 16.0, 40.0, 40.0));
        let child_id = graph.add_child(frame_id, child).unwrap();

        capture_baseline(&mut graph, frame_id).unwrap();

        let baseline = graph.get(frame_id).unwrap().layout.as_ref().unwrap().baseline().unwrap().clone();
        assert_eq!(baseline.original_size, Extent::new(320.0, 90.0));
        assert_eq!(baseline.children.len(), 1);
        assert_eq!(baseline.children[0].id, child_id);
        assert_eq!(baseline.children[0].geometry.x, 16.0);
    }
}
