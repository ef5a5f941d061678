//! Scene graph arena.
//!
//! Nodes live in a single map addressed by [`NodeId`]. Parent/child links
//! are stored as id lists, so removing a node can never leave a dangling
//! reference behind: a stale id simply stops resolving.

use glam::DVec2;
use indexmap::IndexMap;
use vellum_core::{Bounds, Extent, Geometry, NodeId, SceneError};

use crate::config::LayoutConfig;
use crate::shape::ShapeKind;

/// A positioned element of the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    /// Unique ID for this node
    pub id: NodeId,
    /// Optional layer name
    pub name: Option<String>,
    /// What the node draws
    pub shape: ShapeKind,
    /// Geometry relative to the parent
    pub geometry: Geometry,
    /// Auto layout settings, containers only
    pub layout: Option<LayoutConfig>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    absolute_bounds: Bounds,
}

impl SceneNode {
    /// Create a new node with an empty geometry.
    pub fn new(id: NodeId, shape: ShapeKind) -> Self {
        Self {
            id,
            name: None,
            shape,
            geometry: Geometry::default(),
            layout: None,
            parent: None,
            children: Vec::new(),
            absolute_bounds: Bounds::default(),
        }
    }

    /// Create an empty container node.
    pub fn group(id: NodeId) -> Self {
        Self::new(id, ShapeKind::Group)
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the geometry.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Attach an auto layout configuration.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Parent container, `None` for roots and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in layout (and z) order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node may own children.
    pub fn is_container(&self) -> bool {
        self.shape.is_container()
    }

    /// Whether this node is governed by auto layout.
    pub fn has_auto_layout(&self) -> bool {
        self.is_container() && self.layout.is_some()
    }

    /// Size the node occupies for layout purposes.
    pub fn intrinsic_extent(&self) -> Extent {
        self.shape.intrinsic_extent(&self.geometry)
    }

    /// Bounds in document coordinates, as of the last coordinate update.
    pub fn absolute_bounds(&self) -> Bounds {
        self.absolute_bounds
    }
}

/// The scene graph: every node of a document, addressed by id.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: IndexMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    next_id: u64,
}

impl SceneGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh node ID.
    pub fn next_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }

    /// Number of nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }

    /// Top-level node ids in z order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Child ids of a node (empty for leaves and unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// The sibling list a node lives in: a container's children, or the
    /// roots for `None`.
    pub fn siblings(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            Some(pid) => self.children(pid),
            None => &self.roots,
        }
    }

    /// Position of a node within its sibling list.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let node = self.nodes.get(&id)?;
        self.siblings(node.parent).iter().position(|&s| s == id)
    }

    /// Whether the node is reachable from a root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        match self.nodes.get(&id) {
            Some(node) => node.parent.is_some() || self.roots.contains(&id),
            None => false,
        }
    }

    /// Ancestors of a node, innermost first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.parent(id);
        while let Some(pid) = current {
            result.push(pid);
            current = self.parent(pid);
        }
        result
    }

    /// A node and all its descendants, children before parents.
    pub fn post_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        if self.contains(root) {
            self.post_order_recursive(root, &mut result);
        }
        result
    }

    fn post_order_recursive(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            self.post_order_recursive(child, out);
        }
        out.push(id);
    }

    /// Add a new top-level node.
    pub fn add_root(&mut self, node: SceneNode) -> Result<NodeId, SceneError> {
        let id = self.insert_detached(node)?;
        self.roots.push(id);
        self.update_coords(id);
        Ok(id)
    }

    /// Add a new node as the last child of a container.
    pub fn add_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, SceneError> {
        self.require_container(parent)?;
        let id = self.insert_detached(node)?;
        self.attach(Some(parent), usize::MAX, id)?;
        Ok(id)
    }

    /// Remove a node and its whole subtree, returning the node itself.
    pub fn remove(&mut self, id: NodeId) -> Result<SceneNode, SceneError> {
        self.detach(id)?;
        let doomed = self.post_order(id);
        let mut removed = None;
        for nid in doomed {
            let node = self.nodes.shift_remove(&nid);
            if nid == id {
                removed = node;
            }
        }
        removed.ok_or(SceneError::UnknownNode(id))
    }

    /// Insert a node into the arena without attaching it anywhere.
    ///
    /// Child links of the incoming node are dropped; children are attached
    /// through the graph.
    pub(crate) fn insert_detached(&mut self, mut node: SceneNode) -> Result<NodeId, SceneError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(SceneError::DuplicateId(id));
        }
        let Geometry { width, height, .. } = node.geometry;
        if width < 0.0 || height < 0.0 {
            return Err(SceneError::NegativeExtent { node: id, width, height });
        }
        node.parent = None;
        node.children.clear();
        self.next_id = self.next_id.max(id.0);
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Unlink a node from its sibling list. The node stays in the arena.
    ///
    /// Returns the former parent and index.
    pub(crate) fn detach(&mut self, id: NodeId) -> Result<(Option<NodeId>, usize), SceneError> {
        let parent = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?.parent;
        let siblings = match parent {
            Some(pid) => {
                &mut self
                    .nodes
                    .get_mut(&pid)
                    .ok_or(SceneError::UnknownNode(pid))?
                    .children
            }
            None => &mut self.roots,
        };
        let index = siblings.iter().position(|&s| s == id).unwrap_or(siblings.len());
        if index < siblings.len() {
            siblings.remove(index);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        Ok((parent, index))
    }

    /// Link a detached node into a sibling list at `index` (clamped).
    pub(crate) fn attach(
        &mut self,
        parent: Option<NodeId>,
        index: usize,
        id: NodeId,
    ) -> Result<(), SceneError> {
        if self.is_attached(id) {
            return Err(SceneError::AlreadyAttached(id));
        }
        if !self.contains(id) {
            return Err(SceneError::UnknownNode(id));
        }
        let siblings = match parent {
            Some(pid) => {
                self.require_container(pid)?;
                &mut self
                    .nodes
                    .get_mut(&pid)
                    .ok_or(SceneError::UnknownNode(pid))?
                    .children
            }
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
        self.update_coords(id);
        Ok(())
    }

    /// Deep-copy a subtree under fresh ids. The copy is left detached.
    pub(crate) fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId, SceneError> {
        let source = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?.clone();
        let copy_id = self.next_id();
        let mut copy = source.clone();
        copy.id = copy_id;
        if let Some(layout) = copy.layout.as_mut() {
            layout.invalidate_baseline();
        }
        self.insert_detached(copy)?;
        for child in source.children {
            let child_copy = self.clone_subtree(child)?;
            self.attach(Some(copy_id), usize::MAX, child_copy)?;
        }
        Ok(copy_id)
    }

    fn require_container(&self, id: NodeId) -> Result<(), SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?;
        if node.is_container() {
            Ok(())
        } else {
            Err(SceneError::NotAContainer(id))
        }
    }

    /// Bounding box of a container's children in its own coordinates.
    pub fn content_bounds(&self, id: NodeId) -> Option<Bounds> {
        Bounds::enclosing(
            self.children(id)
                .iter()
                .filter_map(|cid| self.nodes.get(cid))
                .map(|child| child.geometry.bounds()),
        )
    }

    /// Absolute bounds of a node, as of the last coordinate update.
    pub fn absolute_bounds(&self, id: NodeId) -> Option<Bounds> {
        self.nodes.get(&id).map(|n| n.absolute_bounds)
    }

    /// Recompute absolute bounds for a node and its descendants.
    pub fn update_coords(&mut self, id: NodeId) {
        let origin = self
            .parent(id)
            .and_then(|pid| self.nodes.get(&pid))
            .map(|p| p.absolute_bounds.position())
            .unwrap_or(DVec2::ZERO);
        self.update_coords_recursive(id, origin);
    }

    fn update_coords_recursive(&mut self, id: NodeId, origin: DVec2) {
        let (position, children) = {
            let Some(node) = self.nodes.get_mut(&id) else {
                return;
            };
            node.absolute_bounds = node.geometry.bounds().translate(origin);
            (node.absolute_bounds.position(), node.children.clone())
        };

        for child_id in children {
            self.update_coords_recursive(child_id, position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(graph: &mut SceneGraph, x: f64, y: f64, w: f64, h: f64) -> SceneNode {
        SceneNode::new(graph.next_id(), ShapeKind::Rect).with_geometry(Geometry::new(x, y, w, h))
    }

    #[test]
    fn test_add_and_nest() {
        let mut graph = SceneGraph::new();
        let frame = SceneNode::group(graph.next_id()).with_geometry(Geometry::new(10.0, 10.0, 200.0, 100.0));
        let frame_id = graph.add_root(frame).unwrap();
        let child = rect(&mut graph, 5.0, 5.0, 20.0, 20.0);
        let child_id = graph.add_child(frame_id, child).unwrap();

        assert_eq!(graph.children(frame_id), &[child_id]);
        assert_eq!(graph.parent(child_id), Some(frame_id));
        let abs = graph.absolute_bounds(child_id).unwrap();
        assert!((abs.x - 15.0).abs() < 0.001);
        assert!((abs.y - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_leaf_cannot_have_children() {
        let mut graph = SceneGraph::new();
        let leaf = rect(&mut graph, 0.0, 0.0, 10.0, 10.0);
        let leaf_id = graph.add_root(leaf).unwrap();
        let other = rect(&mut graph, 0.0, 0.0, 10.0, 10.0);
        assert_eq!(
            graph.add_child(leaf_id, other),
            Err(SceneError::NotAContainer(leaf_id))
        );
    }

    #[test]
    fn test_duplicate_and_negative_rejected() {
        let mut graph = SceneGraph::new();
        let node = rect(&mut graph, 0.0, 0.0, 10.0, 10.0);
        let id = graph.add_root(node.clone()).unwrap();
        assert_eq!(graph.add_root(node), Err(SceneError::DuplicateId(id)));

        let bad = rect(&mut graph, 0.0, 0.0, -1.0, 10.0);
        assert!(matches!(graph.add_root(bad), Err(SceneError::NegativeExtent { .. })));
    }

    #[test]
    fn test_next_id_skips_manual_ids() {
        let mut graph = SceneGraph::new();
        graph
            .add_root(SceneNode::new(NodeId(40), ShapeKind::Rect))
            .unwrap();
        assert_eq!(graph.next_id(), NodeId(41));
    }

    #[test]
    fn test_remove_subtree() {
        let mut graph = SceneGraph::new();
        let frame_id_node = SceneNode::group(graph.next_id());
        let frame_id = graph.add_root(frame_id_node).unwrap();
        let child = rect(&mut graph, 0.0, 0.0, 10.0, 10.0);
        let child_id = graph.add_child(frame_id, child).unwrap();

        let removed = graph.remove(frame_id).unwrap();
        assert_eq!(removed.id, frame_id);
        assert!(!graph.contains(child_id));
        assert!(graph.roots().is_empty());
    }

    #[test]
    fn test_detach_and_attach_moves_node() {
        let mut graph = SceneGraph::new();
        let a_node = SceneNode::group(graph.next_id());
        let a = graph.add_root(a_node).unwrap();
        let b_node = SceneNode::group(graph.next_id());
        let b = graph.add_root(b_node).unwrap();
        let child = rect(&mut graph, 0.0, 0.0, 10.0, 10.0);
        let child_id = graph.add_child(a, child).unwrap();

        assert_eq!(graph.attach(Some(b), 0, child_id), Err(SceneError::AlreadyAttached(child_id)));

        let (old_parent, index) = graph.detach(child_id).unwrap();
        assert_eq!(old_parent, Some(a));
        assert_eq!(index, 0);
        assert!(!graph.is_attached(child_id));

        graph.attach(Some(b), 0, child_id).unwrap();
        assert!(graph.children(a).is_empty());
        assert_eq!(graph.children(b), &[child_id]);
    }

    #[test]
    fn test_clone_subtree_gets_fresh_ids() {
        let mut graph = SceneGraph::new();
        let frame_id_node = SceneNode::group(graph.next_id());
        let frame_id = graph.add_root(frame_id_node).unwrap();
        let child = rect(&mut graph, 0.0, 0.0, 10.0, 10.0);
        let child_id = graph.add_child(frame_id, child).unwrap();

        let copy = graph.clone_subtree(frame_id).unwrap();
        assert_ne!(copy, frame_id);
        assert!(!graph.is_attached(copy));
        let copied_children = graph.children(copy).to_vec();
        assert_eq!(copied_children.len(), 1);
        assert_ne!(copied_children[0], child_id);
        assert_eq!(graph.children(frame_id), &[child_id]);
    }

    #[test]
    fn test_post_order_and_ancestors() {
        let mut graph = SceneGraph::new();
        let outer_node = SceneNode::group(graph.next_id());
        let outer = graph.add_root(outer_node).unwrap();
        let inner_node = SceneNode::group(graph.next_id());
        let inner = graph.add_child(outer, inner_node).unwrap();
        let leaf = rect(&mut graph, 0.0, 0.0, 1.0, 1.0);
        let leaf = graph.add_child(inner, leaf).unwrap();

        assert_eq!(graph.post_order(outer), vec![leaf, inner, outer]);
        assert_eq!(graph.ancestors(leaf), vec![inner, outer]);
    }

    #[test]
    fn test_content_bounds() {
        let mut graph = SceneGraph::new();
        let frame_id_node = SceneNode::group(graph.next_id());
        let frame_id = graph.add_root(frame_id_node).unwrap();
        assert!(graph.content_bounds(frame_id).is_none());
        for x in [0.0, 50.0] {
            let child = rect(&mut graph, x, 10.0, 20.0, 30.0);
            graph.add_child(frame_id, child).unwrap();
        }
        let bounds = graph.content_bounds(frame_id).unwrap();
        assert!((bounds.width - 70.0).abs() < 0.001);
        assert!((bounds.bottom() - 40.0).abs() < 0.001);
    }
}
