//! Auto layout for Vellum scenes.
//!
//! This crate owns the scene graph of a document and positions the children
//! of auto layout containers inside it.
//!
//! # Architecture
//!
//! 1. **Scene graph**: an arena of nodes addressed by id, with parent/child
//!    links stored as id lists
//! 2. **Flow layout**: flex-like placement along a main axis, with padding,
//!    gap, alignment, distribution and hug/fill sizing
//! 3. **Responsive layout**: a column grid chosen by container width from a
//!    list of breakpoints
//! 4. **Engine**: grouping, ungrouping, adding and removing children, and
//!    canvas resizes, each followed by a layout pass
//!
//! # Example
//!
//! ```ignore
//! use vellum_layout::{LayoutConfig, LayoutEngine, ResizeEvent};
//!
//! let mut engine = LayoutEngine::new();
//! let group = engine.create_group(&selection, Some(LayoutConfig::horizontal().with_gap(20.0)))?;
//! engine.resize(ResizeEvent::new(group, 500.0, 120.0))?;
//!
//! for &child in engine.graph().children(group) {
//!     println!("{}: {:?}", child, engine.geometry(child));
//! }
//! ```

mod config;
mod engine;
mod flow;
mod options;
mod responsive;
mod shape;
mod tree;

pub use config::{
    Alignment, Baseline, Breakpoint, ChildSnapshot, Direction, Distribution, LayoutConfig,
    Padding, Resizing, SizeConstraints, MAX_BREAKPOINTS,
};
pub use engine::{LayoutEngine, LayoutPass, ResizeEvent};
pub use flow::{apply_flow, hug_container, Placement};
pub use options::EngineOptions;
pub use responsive::{apply_breakpoint, capture_baseline, select_breakpoint};
pub use shape::ShapeKind;
pub use tree::{SceneGraph, SceneNode};

pub use vellum_core::{
    Bounds, ConfigError, Extent, Geometry, NodeId, SceneError, Unavailable,
};
