//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// RGBA in 0..1
pub type Color = [f32; 4];

/// 2D vertex with pixel position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Color,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Raw bytes for a vertex buffer upload
pub fn vertex_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Same color with a different alpha
pub const fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], alpha]
}

/// Linear blend between two colors
pub fn lerp_color(a: Color, b: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

/// Colors for graph elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.06, 0.07, 0.11, 1.0];
    /// rgb(0, 215, 187)
    pub const GROWING: Color = [0.0, 215.0 / 255.0, 187.0 / 255.0, 1.0];
    /// rgb(255, 71, 87)
    pub const CRASHED: Color = [1.0, 71.0 / 255.0, 87.0 / 255.0, 1.0];
    pub const GRID: Color = [1.0, 1.0, 1.0, 0.05];
    pub const AXIS: Color = [1.0, 1.0, 1.0, 0.2];
    pub const AXIS_LABEL: Color = [1.0, 1.0, 1.0, 0.5];
    pub const VALUE_LABEL: Color = [1.0, 1.0, 1.0, 1.0];
    pub const PILL_TEXT: Color = [1.0, 1.0, 1.0, 0.9];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        let vertices = [Vertex::new(1.0, 2.0, colors::GROWING); 3];
        assert_eq!(vertex_bytes(&vertices).len(), 72);
    }

    #[test]
    fn test_lerp_color() {
        let a = [0.0, 0.0, 0.0, 0.4];
        let b = [1.0, 1.0, 1.0, 0.8];
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
        assert_eq!(lerp_color(a, b, 2.0), b);
        assert_eq!(with_alpha(b, 0.1)[3], 0.1);
    }
}
