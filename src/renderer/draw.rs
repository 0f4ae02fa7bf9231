//! Backend-neutral draw commands
//!
//! The curve renderer emits a [`Frame`] of commands in pixel space (origin
//! top-left, y down). A canvas-style host can replay them directly; a GPU
//! host calls [`Frame::tessellate`] and uploads the triangle list.

use glam::Vec2;
use serde::Serialize;

use super::shapes;
use super::vertex::{Color, Vertex, lerp_color, with_alpha};

/// Segments used to flatten each Bézier segment
const CURVE_SEGMENTS: u32 = 8;
const CIRCLE_SEGMENTS: u32 = 24;

/// One quadratic Bézier segment, starting where the previous one ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadSegment {
    pub control: Vec2,
    pub to: Vec2,
}

/// A smoothed open path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Path {
    pub start: Vec2,
    pub segments: Vec<QuadSegment>,
}

impl Path {
    pub fn new(start: Vec2) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    pub fn quad_to(&mut self, control: Vec2, to: Vec2) {
        self.segments.push(QuadSegment { control, to });
    }

    pub fn end(&self) -> Vec2 {
        self.segments.last().map_or(self.start, |s| s.to)
    }

    /// Flatten into a polyline including the start point
    pub fn flatten(&self) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(1 + self.segments.len() * CURVE_SEGMENTS as usize);
        points.push(self.start);
        let mut from = self.start;
        for segment in &self.segments {
            points.extend(shapes::flatten_quad(
                from,
                segment.control,
                segment.to,
                CURVE_SEGMENTS,
            ));
            from = segment.to;
        }
        points
    }
}

/// Linear gradient between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gradient {
    pub from: Vec2,
    pub to: Vec2,
    pub start: Color,
    pub end: Color,
}

impl Gradient {
    /// Color at `point`, projected onto the gradient axis
    pub fn color_at(&self, point: Vec2) -> Color {
        let axis = self.to - self.from;
        let len_sq = axis.length_squared();
        if len_sq <= f32::EPSILON {
            return self.end;
        }
        let t = (point - self.from).dot(axis) / len_sq;
        lerp_color(self.start, self.end, t)
    }
}

/// Soft halo drawn behind a circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Glow {
    pub blur: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Stroke {
        path: Path,
        width: f32,
        color: Color,
    },
    /// Area between the path and a horizontal baseline
    FillUnder {
        path: Path,
        baseline: f32,
        gradient: Gradient,
        alpha: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
        glow: Option<Glow>,
    },
    Rect {
        min: Vec2,
        max: Vec2,
        color: Color,
    },
    Text {
        text: String,
        position: Vec2,
        size: f32,
        bold: bool,
        align: TextAlign,
        color: Color,
    },
}

/// Output of one render call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Text commands, for hosts that draw text separately from geometry
    pub fn texts(&self) -> impl Iterator<Item = (&str, Vec2)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, position, .. } => Some((text.as_str(), *position)),
            _ => None,
        })
    }

    /// Triangle list for every non-text command, in draw order
    pub fn tessellate(&self) -> Vec<Vertex> {
        let mut vertices = Vec::new();
        for command in &self.commands {
            match command {
                DrawCommand::Clear { color } => vertices.extend(shapes::rect(
                    Vec2::ZERO,
                    Vec2::new(self.width, self.height),
                    *color,
                )),
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                } => vertices.extend(shapes::thick_line(*from, *to, *width, *color)),
                DrawCommand::Stroke { path, width, color } => {
                    let points = path.flatten();
                    let colors = vec![*color; points.len()];
                    vertices.extend(shapes::polyline(&points, &colors, *width));
                }
                DrawCommand::FillUnder {
                    path,
                    baseline,
                    gradient,
                    alpha,
                } => {
                    // Per-vertex gradient: tessellate with a flat color, then recolor
                    let points = path.flatten();
                    let mut fill = shapes::fill_under(&points, *baseline, [0.0; 4]);
                    for v in &mut fill {
                        let c = gradient.color_at(Vec2::from(v.position));
                        v.color = with_alpha(c, c[3] * alpha);
                    }
                    vertices.extend(fill);
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                    glow,
                } => {
                    if let Some(glow) = glow {
                        vertices.extend(shapes::ring(
                            *center,
                            *radius,
                            radius + glow.blur,
                            glow.color,
                            with_alpha(glow.color, 0.0),
                            CIRCLE_SEGMENTS,
                        ));
                    }
                    vertices.extend(shapes::circle(*center, *radius, *color, CIRCLE_SEGMENTS));
                }
                DrawCommand::Rect { min, max, color } => {
                    vertices.extend(shapes::rect(*min, *max, *color))
                }
                DrawCommand::Text { .. } => {}
            }
        }
        vertices
    }
}
