//! WebGPU rendering module
//!
//! Draws a [`Snapshot`](crate::sim::Snapshot) as flat-colored quads.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, field_to_ndc};
pub use vertex::Vertex;
