//! The layout engine: structural mutations and resize handling.
//!
//! [`LayoutEngine`] owns the scene graph. Every handler checks its
//! preconditions before touching anything; when one is unmet the handler
//! returns [`Unavailable`] and the scene is left as it was. Handlers that
//! change a container's children re-run the default flow on it, then on
//! each auto layout ancestor from the inside out.

use indexmap::IndexSet;
use tracing::debug;
use vellum_core::{Bounds, ConfigError, Extent, Geometry, NodeId, SceneError, Unavailable};

use crate::config::{Breakpoint, LayoutConfig, Resizing};
use crate::flow::{apply_flow, hug_container};
use crate::options::EngineOptions;
use crate::responsive::{apply_breakpoint, capture_baseline, select_breakpoint};
use crate::tree::{SceneGraph, SceneNode};

/// A container was resized on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub container: NodeId,
    /// New unscaled width
    pub width: f64,
    /// New unscaled height
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl ResizeEvent {
    /// A resize to an unscaled size.
    pub fn new(container: NodeId, width: f64, height: f64) -> Self {
        Self {
            container,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Set the scale the canvas left on the container.
    pub fn with_scale(mut self, scale_x: f64, scale_y: f64) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Size after scaling.
    pub fn effective_extent(&self) -> Extent {
        Extent::new(self.width * self.scale_x, self.height * self.scale_y)
    }
}

/// Which algorithm a resize ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPass {
    /// Default flow layout
    Flow,
    /// Column grid of the breakpoint at this index
    Grid { breakpoint: usize },
}

/// Auto layout engine over a scene graph.
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    graph: SceneGraph,
    options: EngineOptions,
}

impl LayoutEngine {
    /// Create an engine over an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            graph: SceneGraph::new(),
            options,
        }
    }

    /// Take over an existing scene. No layout is run.
    pub fn from_graph(graph: SceneGraph, options: EngineOptions) -> Self {
        Self { graph, options }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable access for building the scene. Callers that move nodes around
    /// through here must call [`Self::relayout`] themselves.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn into_graph(self) -> SceneGraph {
        self.graph
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// The auto layout configuration of a container, if it has one.
    pub fn config(&self, container: NodeId) -> Option<&LayoutConfig> {
        self.graph.get(container).and_then(|node| node.layout.as_ref())
    }

    /// Geometry of a node.
    pub fn geometry(&self, id: NodeId) -> Option<Geometry> {
        self.graph.get(id).map(|node| node.geometry)
    }

    // ------------------------------------------------------------------
    // Availability
    // ------------------------------------------------------------------

    pub fn can_create_group(&self, selection: &[NodeId]) -> bool {
        self.check_group_selection(selection).is_ok()
    }

    pub fn can_add_child(&self, container: NodeId, source: NodeId) -> bool {
        self.require_layout(container).is_ok() && self.graph.contains(source)
    }

    pub fn can_remove_children(&self, container: NodeId, nodes: &[NodeId]) -> bool {
        self.check_removal(container, nodes).is_ok()
    }

    pub fn can_ungroup(&self, container: NodeId) -> bool {
        self.require_container(container).is_ok()
    }

    // ------------------------------------------------------------------
    // Structural mutations
    // ------------------------------------------------------------------

    /// Group the selected siblings into a new auto layout container.
    ///
    /// The container takes the place of the first selected node in sibling
    /// order and starts at the selection's bounding box. Without an explicit
    /// configuration the engine default is used.
    pub fn create_group(
        &mut self,
        selection: &[NodeId],
        config: Option<LayoutConfig>,
    ) -> Result<NodeId, Unavailable> {
        let (parent, members) = self
            .check_group_selection(selection)
            .map_err(|reason| skipped("create group", reason))?;
        let mut config = config.unwrap_or_else(|| self.options.default_layout.clone());
        self.prepare_config(&mut config, false)
            .map_err(|reason| skipped("create group", reason.into()))?;

        let bounds = Bounds::enclosing(
            members
                .iter()
                .filter_map(|&id| self.graph.get(id))
                .map(|node| node.geometry.bounds()),
        )
        .unwrap_or_default();
        let index = self.graph.index_in_parent(members[0]).unwrap_or(usize::MAX);

        for &id in &members {
            self.graph.detach(id)?;
            if let Some(node) = self.graph.get_mut(id) {
                node.geometry.x -= bounds.x;
                node.geometry.y -= bounds.y;
            }
        }

        let group_id = self.graph.next_id();
        let group = SceneNode::group(group_id)
            .with_geometry(Geometry::new(bounds.x, bounds.y, bounds.width, bounds.height))
            .with_layout(config.clone());
        self.graph.insert_detached(group)?;
        self.graph.attach(parent, index, group_id)?;
        for &id in &members {
            self.graph.attach(Some(group_id), usize::MAX, id)?;
        }

        debug!(group = %group_id, children = members.len(), "created group");
        self.layout_flow(group_id, &config)?;
        if config.responsive {
            capture_baseline(&mut self.graph, group_id)?;
        }
        self.relayout_ancestors(group_id)?;
        self.refresh_baseline(parent)?;
        Ok(group_id)
    }

    /// Append a copy of `source` to an auto layout container.
    ///
    /// The source stays where it is; the copy gets fresh ids throughout.
    pub fn add_child(&mut self, container: NodeId, source: NodeId) -> Result<NodeId, Unavailable> {
        self.require_layout(container)
            .and_then(|_| {
                if self.graph.contains(source) {
                    Ok(())
                } else {
                    Err(Unavailable::UnknownNode(source))
                }
            })
            .map_err(|reason| skipped("add child", reason))?;

        let copy = self.graph.clone_subtree(source)?;
        self.graph.attach(Some(container), usize::MAX, copy)?;
        debug!(container = %container, source = %source, copy = %copy, "added child");

        self.after_children_changed(container)?;
        Ok(copy)
    }

    /// Take one child out of an auto layout container.
    pub fn remove_child(&mut self, container: NodeId, node: NodeId) -> Result<(), Unavailable> {
        self.remove_children(container, &[node])
    }

    /// Take children out of an auto layout container.
    ///
    /// The removed nodes are placed right after the container in its parent,
    /// at the same spot on the canvas.
    pub fn remove_children(&mut self, container: NodeId, nodes: &[NodeId]) -> Result<(), Unavailable> {
        let nodes = self
            .check_removal(container, nodes)
            .map_err(|reason| skipped("remove children", reason))?;

        let frame = self.graph.get(container).map(|n| n.geometry).unwrap_or_default();
        let parent = self.graph.parent(container);
        let mut index = self
            .graph
            .index_in_parent(container)
            .map_or(usize::MAX, |i| i + 1);

        for id in &nodes {
            self.graph.detach(*id)?;
            if let Some(node) = self.graph.get_mut(*id) {
                node.geometry = lift(&frame, &node.geometry);
            }
            self.graph.attach(parent, index, *id)?;
            index = index.saturating_add(1);
        }
        debug!(container = %container, removed = nodes.len(), "removed children");

        self.after_children_changed(container)?;
        self.refresh_baseline(parent)?;
        Ok(())
    }

    /// Dissolve a container, keeping its children where they are on the
    /// canvas. Returns the freed children in their old order.
    pub fn ungroup(&mut self, container: NodeId) -> Result<Vec<NodeId>, Unavailable> {
        self.require_container(container)
            .map_err(|reason| skipped("ungroup", reason))?;

        let frame = self.graph.get(container).map(|n| n.geometry).unwrap_or_default();
        let children = self.graph.children(container).to_vec();
        let (parent, index) = self.graph.detach(container)?;

        for (offset, &id) in children.iter().enumerate() {
            self.graph.detach(id)?;
            if let Some(node) = self.graph.get_mut(id) {
                node.geometry = lift(&frame, &node.geometry);
            }
            self.graph.attach(parent, index + offset, id)?;
        }
        self.graph.remove(container)?;
        debug!(container = %container, children = children.len(), "ungrouped");

        self.relayout_from(parent)?;
        self.refresh_baseline(parent)?;
        Ok(children)
    }

    /// Turn on auto layout for an existing group.
    ///
    /// An existing configuration is replaced.
    pub fn enable_auto_layout(
        &mut self,
        container: NodeId,
        mut config: LayoutConfig,
    ) -> Result<(), Unavailable> {
        self.require_container(container)
            .map_err(|reason| skipped("enable auto layout", reason))?;
        self.prepare_config(&mut config, false)
            .map_err(|reason| skipped("enable auto layout", reason.into()))?;

        if let Some(node) = self.graph.get_mut(container) {
            node.layout = Some(config.clone());
        }
        self.layout_flow(container, &config)?;
        if config.responsive {
            capture_baseline(&mut self.graph, container)?;
        }
        self.relayout_ancestors(container)?;
        Ok(())
    }

    /// Turn off auto layout. Children keep their last geometry.
    pub fn disable_auto_layout(&mut self, container: NodeId) -> Result<LayoutConfig, Unavailable> {
        self.require_layout(container)
            .map_err(|reason| skipped("disable auto layout", reason))?;
        let config = self
            .graph
            .get_mut(container)
            .and_then(|node| node.layout.take())
            .ok_or(Unavailable::NoAutoLayout(container))?;
        debug!(container = %container, "auto layout disabled");
        Ok(config)
    }

    /// Edit a container's configuration and re-run its layout.
    ///
    /// The edit is applied to a copy and validated first, so a rejected edit
    /// leaves the old configuration in place. Switching responsive mode on
    /// captures a fresh baseline; switching it off drops the baseline.
    pub fn update_config(
        &mut self,
        container: NodeId,
        edit: impl FnOnce(&mut LayoutConfig),
    ) -> Result<(), Unavailable> {
        let mut config = self
            .require_layout(container)
            .map_err(|reason| skipped("update config", reason))?
            .clone();
        let was_responsive = config.responsive;
        edit(&mut config);
        self.prepare_config(&mut config, was_responsive)
            .map_err(|reason| skipped("update config", reason.into()))?;

        if was_responsive && !config.responsive {
            config.invalidate_baseline();
        }
        if let Some(node) = self.graph.get_mut(container) {
            node.layout = Some(config.clone());
        }
        self.layout_flow(container, &config)?;
        if config.responsive && !was_responsive {
            capture_baseline(&mut self.graph, container)?;
        }
        self.relayout_ancestors(container)?;
        Ok(())
    }

    /// Append the engine's default new breakpoint to a container.
    ///
    /// Returns the index of the new breakpoint.
    pub fn add_breakpoint(&mut self, container: NodeId) -> Result<usize, Unavailable> {
        let breakpoint = self.options.new_breakpoint;
        self.push_breakpoint(container, breakpoint)
    }

    /// Append a breakpoint to a container.
    ///
    /// Breakpoint edits re-run the layout the container would get from a
    /// resize to its current size: the matching grid, or the flow without
    /// hugging.
    pub fn push_breakpoint(
        &mut self,
        container: NodeId,
        breakpoint: Breakpoint,
    ) -> Result<usize, Unavailable> {
        let count = self
            .require_layout(container)
            .map_err(|reason| skipped("add breakpoint", reason))?
            .breakpoints
            .len();
        let max = self.options.max_breakpoints;
        if count >= max {
            return Err(skipped(
                "add breakpoint",
                ConfigError::TooManyBreakpoints { max }.into(),
            ));
        }
        breakpoint
            .validate()
            .map_err(|reason| skipped("add breakpoint", reason.into()))?;

        if let Some(layout) = self.graph.get_mut(container).and_then(|n| n.layout.as_mut()) {
            layout.breakpoints.push(breakpoint);
        }
        self.after_breakpoints_changed(container)?;
        Ok(count)
    }

    /// Delete a container's breakpoint at `index`.
    pub fn remove_breakpoint(
        &mut self,
        container: NodeId,
        index: usize,
    ) -> Result<Breakpoint, Unavailable> {
        self.require_layout(container)
            .map_err(|reason| skipped("remove breakpoint", reason))?;
        let layout = self
            .graph
            .get_mut(container)
            .and_then(|n| n.layout.as_mut())
            .ok_or(Unavailable::NoAutoLayout(container))?;
        let removed = layout
            .remove_breakpoint(index)
            .map_err(|reason| skipped("remove breakpoint", reason.into()))?;
        self.after_breakpoints_changed(container)?;
        Ok(removed)
    }

    /// Record the container's current layout as its responsive baseline.
    pub fn capture_baseline(&mut self, container: NodeId) -> Result<(), Unavailable> {
        self.require_layout(container)
            .map_err(|reason| skipped("capture baseline", reason))?;
        capture_baseline(&mut self.graph, container)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout passes
    // ------------------------------------------------------------------

    /// Re-run the default flow on one container and its auto layout
    /// ancestors.
    pub fn relayout(&mut self, container: NodeId) -> Result<(), Unavailable> {
        let config = self
            .require_layout(container)
            .map_err(|reason| skipped("relayout", reason))?
            .clone();
        self.layout_flow(container, &config)?;
        self.relayout_ancestors(container)?;
        Ok(())
    }

    /// Lay out every auto layout container under `root`, deepest first,
    /// then the auto layout ancestors of `root`.
    ///
    /// Returns the number of containers laid out.
    pub fn relayout_subtree(&mut self, root: NodeId) -> Result<usize, Unavailable> {
        if !self.graph.contains(root) {
            return Err(skipped("relayout subtree", Unavailable::UnknownNode(root)));
        }

        let mut passes = 0;
        for id in self.graph.post_order(root) {
            let Some(config) = self.graph.get(id).and_then(|n| n.layout.clone()) else {
                continue;
            };
            self.layout_flow(id, &config)?;
            passes += 1;
        }
        passes += self.relayout_ancestors(root)?;
        Ok(passes)
    }

    /// React to a container being resized on the canvas.
    ///
    /// The event's scale is baked into the new size. A responsive container
    /// whose new width matches a breakpoint gets that breakpoint's grid;
    /// anything else keeps the new size and re-runs the default flow.
    pub fn resize(&mut self, event: ResizeEvent) -> Result<LayoutPass, Unavailable> {
        let container = event.container;
        let config = self
            .require_layout(container)
            .map_err(|reason| skipped("resize", reason))?
            .clone();
        let size = event.effective_extent();
        check_size(container, size).map_err(|reason| skipped("resize", reason))?;

        if let Some(node) = self.graph.get_mut(container) {
            node.geometry.width = event.width;
            node.geometry.height = event.height;
            node.geometry.scale_x = event.scale_x;
            node.geometry.scale_y = event.scale_y;
            node.geometry.bake_scale();
        }
        let pass = self.layout_at_current_size(container, &config)?;

        debug!(
            container = %container,
            width = size.width,
            height = size.height,
            pass = ?pass,
            "resized"
        );
        self.relayout_ancestors(container)?;
        Ok(pass)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Run the grid of the matching breakpoint, or the flow without
    /// hugging, at the container's current size.
    fn layout_at_current_size(
        &mut self,
        container: NodeId,
        config: &LayoutConfig,
    ) -> Result<LayoutPass, SceneError> {
        let size = self
            .graph
            .get(container)
            .ok_or(SceneError::UnknownNode(container))?
            .geometry
            .extent();
        let active = if config.responsive {
            select_breakpoint(&config.breakpoints, size.width)
        } else {
            None
        };

        match active {
            Some((index, breakpoint)) => {
                apply_breakpoint(&mut self.graph, container, config, breakpoint, size)?;
                Ok(LayoutPass::Grid { breakpoint: index })
            }
            None => {
                if let Some(node) = self.graph.get_mut(container) {
                    node.geometry.bake_scale();
                }
                apply_flow(&mut self.graph, container, config)?;
                Ok(LayoutPass::Flow)
            }
        }
    }

    /// Re-run the layout after a breakpoint edit.
    fn after_breakpoints_changed(&mut self, container: NodeId) -> Result<LayoutPass, Unavailable> {
        let config = self.require_layout(container)?.clone();
        let pass = self.layout_at_current_size(container, &config)?;
        debug!(
            container = %container,
            breakpoints = config.breakpoints.len(),
            pass = ?pass,
            "breakpoints changed"
        );
        self.relayout_ancestors(container)?;
        Ok(pass)
    }

    /// Hug if asked to, then flow.
    fn layout_flow(&mut self, container: NodeId, config: &LayoutConfig) -> Result<(), SceneError> {
        if config.resizing == Resizing::Hug {
            hug_container(&mut self.graph, container, config)?;
        }
        apply_flow(&mut self.graph, container, config)
    }

    fn relayout_ancestors(&mut self, id: NodeId) -> Result<usize, SceneError> {
        let parent = self.graph.parent(id);
        self.relayout_from(parent)
    }

    /// Re-flow `start` and its ancestors until one without auto layout.
    fn relayout_from(&mut self, start: Option<NodeId>) -> Result<usize, SceneError> {
        let mut passes = 0;
        let mut current = start;
        while let Some(id) = current {
            let Some(config) = self.graph.get(id).and_then(|n| n.layout.clone()) else {
                break;
            };
            self.layout_flow(id, &config)?;
            passes += 1;
            current = self.graph.parent(id);
        }
        Ok(passes)
    }

    /// Re-layout after a container's child set changed, keeping a
    /// responsive baseline in step with the new children.
    fn after_children_changed(&mut self, container: NodeId) -> Result<(), Unavailable> {
        let config = self.require_layout(container)?.clone();
        self.layout_flow(container, &config)?;
        self.refresh_baseline(Some(container))?;
        self.relayout_ancestors(container)?;
        Ok(())
    }

    /// Replace a responsive container's baseline with its current children.
    ///
    /// Does nothing for `None`, plain groups and non-responsive containers.
    fn refresh_baseline(&mut self, container: Option<NodeId>) -> Result<(), SceneError> {
        let Some(id) = container else {
            return Ok(());
        };
        let Some(layout) = self.graph.get_mut(id).and_then(|n| n.layout.as_mut()) else {
            return Ok(());
        };
        if !layout.responsive {
            return Ok(());
        }
        layout.invalidate_baseline();
        capture_baseline(&mut self.graph, id)
    }

    /// Fill in default breakpoints when a config turns responsive without
    /// any, then validate against the engine's limits.
    ///
    /// A config that was already responsive keeps an empty list empty.
    fn prepare_config(&self, config: &mut LayoutConfig, was_responsive: bool) -> Result<(), ConfigError> {
        if config.responsive && !was_responsive && config.breakpoints.is_empty() {
            config
                .breakpoints
                .extend(self.options.default_breakpoints.iter().copied());
        }
        config.validate_with_limit(self.options.max_breakpoints)
    }

    fn require_container(&self, id: NodeId) -> Result<&SceneNode, Unavailable> {
        let node = self.graph.get(id).ok_or(Unavailable::UnknownNode(id))?;
        if !node.is_container() {
            return Err(Unavailable::NotAContainer(id));
        }
        Ok(node)
    }

    fn require_layout(&self, id: NodeId) -> Result<&LayoutConfig, Unavailable> {
        self.require_container(id)?
            .layout
            .as_ref()
            .ok_or(Unavailable::NoAutoLayout(id))
    }

    /// Distinct selected siblings in sibling order, with their parent.
    fn check_group_selection(
        &self,
        selection: &[NodeId],
    ) -> Result<(Option<NodeId>, Vec<NodeId>), Unavailable> {
        let distinct: IndexSet<NodeId> = selection.iter().copied().collect();
        if distinct.len() < 2 {
            return Err(Unavailable::NotEnoughNodes {
                found: distinct.len(),
            });
        }
        if let Some(&missing) = distinct.iter().find(|&&id| !self.graph.is_attached(id)) {
            return Err(Unavailable::UnknownNode(missing));
        }

        let parent = self.graph.parent(distinct[0]);
        if distinct.iter().any(|&id| self.graph.parent(id) != parent) {
            return Err(Unavailable::MixedParents);
        }

        let mut members: Vec<NodeId> = distinct.into_iter().collect();
        members.sort_by_key(|&id| self.graph.index_in_parent(id).unwrap_or(usize::MAX));
        Ok((parent, members))
    }

    /// Distinct children to remove, in the order given.
    fn check_removal(&self, container: NodeId, nodes: &[NodeId]) -> Result<Vec<NodeId>, Unavailable> {
        self.require_layout(container)?;
        if nodes.is_empty() {
            return Err(Unavailable::EmptySelection);
        }
        let distinct: IndexSet<NodeId> = nodes.iter().copied().collect();
        for &node in &distinct {
            if !self.graph.contains(node) {
                return Err(Unavailable::UnknownNode(node));
            }
            if self.graph.parent(node) != Some(container) {
                return Err(Unavailable::NotAChild { container, node });
            }
        }
        Ok(distinct.into_iter().collect())
    }
}

/// Log why an action did nothing and pass the reason on.
fn skipped(action: &'static str, reason: Unavailable) -> Unavailable {
    debug!(action, %reason, "action unavailable");
    reason
}

fn check_size(container: NodeId, size: Extent) -> Result<(), Unavailable> {
    if !size.width.is_finite() {
        return Err(ConfigError::NotFinite("width").into());
    }
    if !size.height.is_finite() {
        return Err(ConfigError::NotFinite("height").into());
    }
    if size.width < 0.0 || size.height < 0.0 {
        return Err(SceneError::NegativeExtent {
            node: container,
            width: size.width,
            height: size.height,
        }
        .into());
    }
    Ok(())
}

/// Express a child's geometry in its container's parent frame, with the
/// container's offset and scale folded in.
fn lift(frame: &Geometry, local: &Geometry) -> Geometry {
    Geometry {
        x: frame.x + local.x * frame.scale_x,
        y: frame.y + local.y * frame.scale_y,
        width: local.effective_width() * frame.scale_x,
        height: local.effective_height() * frame.scale_y,
        rotation: local.rotation,
        scale_x: 1.0,
        scale_y: 1.0,
    }
}
