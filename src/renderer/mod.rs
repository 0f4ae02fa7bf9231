//! Curve rendering module
//!
//! Produces backend-neutral draw commands; `Frame::tessellate` turns them into
//! a triangle list for GPU hosts.

pub mod curve;
pub mod draw;
pub mod shapes;
pub mod vertex;

pub use curve::{Palette, RenderInput, Viewport, grid_step, render, visible_max};
pub use draw::{DrawCommand, Frame, Glow, Gradient, Path, QuadSegment, TextAlign};
pub use vertex::{Color, Vertex, vertex_bytes};
