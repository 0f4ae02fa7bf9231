//! Triangle-list generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Color, Vertex};

/// Points along a quadratic Bézier from `from` to `to` (excluding `from`)
pub fn flatten_quad(from: Vec2, control: Vec2, to: Vec2, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(1);
    (1..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let u = 1.0 - t;
            from * (u * u) + control * (2.0 * u * t) + to * (t * t)
        })
        .collect()
}

/// Push one quad as two triangles
fn push_quad(vertices: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, ca: Color, cc: Color) {
    // a-b at one end, c-d at the other
    vertices.push(Vertex::new(a.x, a.y, ca));
    vertices.push(Vertex::new(b.x, b.y, ca));
    vertices.push(Vertex::new(c.x, c.y, cc));

    vertices.push(Vertex::new(c.x, c.y, cc));
    vertices.push(Vertex::new(b.x, b.y, ca));
    vertices.push(Vertex::new(d.x, d.y, cc));
}

/// Straight line of the given width
pub fn thick_line(from: Vec2, to: Vec2, width: f32, color: Color) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        from + perp,
        from - perp,
        to + perp,
        to - perp,
        color,
        color,
    );
    vertices
}

/// Polyline of the given width, colored per point
pub fn polyline(points: &[Vec2], colors: &[Color], width: f32) -> Vec<Vertex> {
    if points.len() < 2 || colors.len() != points.len() {
        return Vec::new();
    }
    let half = width * 0.5;
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);
    for i in 0..points.len() - 1 {
        let (p1, p2) = (points[i], points[i + 1]);
        let dir = (p2 - p1).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let perp = Vec2::new(-dir.y, dir.x) * half;
        push_quad(
            &mut vertices,
            p1 + perp,
            p1 - perp,
            p2 + perp,
            p2 - perp,
            colors[i],
            colors[i + 1],
        );
    }
    vertices
}

/// Area between a polyline and a horizontal baseline
pub fn fill_under(points: &[Vec2], baseline: f32, color: Color) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity((points.len() - 1) * 6);
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        push_quad(
            &mut vertices,
            p1,
            Vec2::new(p1.x, baseline),
            p2,
            Vec2::new(p2.x, baseline),
            color,
            color,
        );
    }
    vertices
}

/// Axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: Color) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    push_quad(
        &mut vertices,
        min,
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, min.y),
        max,
        color,
        color,
    );
    vertices
}

/// Filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Ring fading from `inner_color` to `outer_color`, used for soft glows
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    inner_color: Color,
    outer_color: Color,
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let at = |r: f32, theta: f32| center + Vec2::new(r * theta.cos(), r * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = at(inner_radius, theta1);
        let outer1 = at(outer_radius, theta1);
        let inner2 = at(inner_radius, theta2);
        let outer2 = at(outer_radius, theta2);

        vertices.push(Vertex::new(inner1.x, inner1.y, inner_color));
        vertices.push(Vertex::new(outer1.x, outer1.y, outer_color));
        vertices.push(Vertex::new(inner2.x, inner2.y, inner_color));

        vertices.push(Vertex::new(inner2.x, inner2.y, inner_color));
        vertices.push(Vertex::new(outer1.x, outer1.y, outer_color));
        vertices.push(Vertex::new(outer2.x, outer2.y, outer_color));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_flatten_quad_endpoints() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 10.0);
        let points = flatten_quad(from, Vec2::new(5.0, 0.0), to, 8);
        assert_eq!(points.len(), 8);
        assert_eq!(points[7], to);
        // Pulled toward the control point, below the chord
        assert!(points[3].y < points[3].x);
    }

    #[test]
    fn test_thick_line_width() {
        let v = thick_line(Vec2::ZERO, Vec2::new(10.0, 0.0), 4.0, WHITE);
        assert_eq!(v.len(), 6);
        let ys: Vec<f32> = v.iter().map(|v| v.position[1]).collect();
        assert!(ys.iter().all(|y| (y.abs() - 2.0).abs() < 1e-6));
        assert!(thick_line(Vec2::ONE, Vec2::ONE, 4.0, WHITE).is_empty());
    }

    #[test]
    fn test_polyline_skips_degenerate() {
        let points = [Vec2::ZERO, Vec2::ZERO, Vec2::new(5.0, 5.0)];
        let v = polyline(&points, &[WHITE; 3], 2.0);
        assert_eq!(v.len(), 6);
        assert!(polyline(&points, &[WHITE; 2], 2.0).is_empty());
    }

    #[test]
    fn test_fill_under_reaches_baseline() {
        let points = [Vec2::new(0.0, 50.0), Vec2::new(10.0, 20.0)];
        let v = fill_under(&points, 100.0, WHITE);
        assert_eq!(v.len(), 6);
        assert!(v.iter().any(|v| v.position == [0.0, 100.0]));
        assert!(v.iter().any(|v| v.position == [10.0, 100.0]));
    }

    #[test]
    fn test_circle_and_ring_counts() {
        assert_eq!(circle(Vec2::ZERO, 8.0, WHITE, 16).len(), 48);
        assert_eq!(ring(Vec2::ZERO, 8.0, 20.0, WHITE, WHITE, 16).len(), 96);
    }
}
