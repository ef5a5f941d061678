//! Core types for the Vellum layout engine.
//!
//! This crate provides the foundational value types shared by the scene
//! graph and the layout algorithms:
//!
//! - **Geometry**: node position, size, rotation and scale
//! - **Bounds / Extent**: axis-aligned boxes and sizes
//! - **Errors**: scene, configuration and precondition failures

pub mod errors;
pub mod types;

pub use errors::{ConfigError, SceneError, Unavailable};
pub use types::{Bounds, Extent, Geometry, NodeId};
