//! Error types for the Vellum engine.

use thiserror::Error;

use crate::types::NodeId;

/// Errors raised by the scene graph arena.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} is not a container")]
    NotAContainer(NodeId),

    #[error("Node id {0} is already in use")]
    DuplicateId(NodeId),

    #[error("Node {0} is already attached to the scene")]
    AlreadyAttached(NodeId),

    #[error("Node {node} would have a negative extent ({width} x {height})")]
    NegativeExtent { node: NodeId, width: f64, height: f64 },
}

/// Errors in a layout configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Padding must be non-negative, got {side} = {value}")]
    NegativePadding { side: &'static str, value: f64 },

    #[error("Gap must be non-negative, got {0}")]
    NegativeGap(f64),

    #[error("Breakpoint width threshold must be positive, got {0}")]
    InvalidThreshold(f64),

    #[error("Breakpoint must have at least one column")]
    ZeroColumns,

    #[error("At most {max} breakpoints are allowed")]
    TooManyBreakpoints { max: usize },

    #[error("No breakpoint at index {0}")]
    NoSuchBreakpoint(usize),

    #[error("Invalid size constraint {name}: {reason}")]
    InvalidConstraint { name: &'static str, reason: String },

    #[error("Value of {0} is not a finite number")]
    NotFinite(&'static str),

    #[error("Invalid configuration JSON: {0}")]
    Json(String),
}

/// Reasons a structural action cannot run.
///
/// A handler returning one of these has left the scene untouched. The UI
/// uses the matching `can_*` predicate to show the action as disabled.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Unavailable {
    #[error("Grouping needs at least 2 nodes, {found} selected")]
    NotEnoughNodes { found: usize },

    #[error("Nothing is selected")]
    EmptySelection,

    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Node {0} is not a container")]
    NotAContainer(NodeId),

    #[error("Container {0} has no auto layout")]
    NoAutoLayout(NodeId),

    #[error("Node {node} is not a child of {container}")]
    NotAChild { container: NodeId, node: NodeId },

    #[error("Selected nodes do not share a parent")]
    MixedParents,

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}
