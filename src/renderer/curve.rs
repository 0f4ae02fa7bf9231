//! Growth curve renderer
//!
//! `render` is a pure function of the current multiplier, the crash flag, the
//! history and the reference dataset. Nothing is cached between frames, so a
//! resize or a replayed snapshot always produces the same picture.
//!
//! The x axis is time since launch (scaled to the dataset's span), the y axis
//! is the multiplier from 0 to the visible maximum. The curve is drawn through
//! the dataset samples up to the first one at or above the live multiplier;
//! past the end of the dataset it stays pinned at the last sample while the
//! label keeps showing the live value.

use glam::Vec2;

use super::draw::{DrawCommand, Frame, Glow, Gradient, Path, TextAlign};
use super::vertex::{Color, colors, with_alpha};
use crate::consts::DISPLAY_FLOOR;
use crate::history::HIGH_ROUND_THRESHOLD;
use crate::round2;
use crate::settings::{Padding, RenderSettings};
use crate::sim::{CurveDataset, Snapshot};

const GRID_LINE_WIDTH: f32 = 1.0;
const AXIS_WIDTH: f32 = 2.0;
const CURVE_WIDTH: f32 = 4.0;
const FILL_ALPHA: f32 = 0.1;
const MARKER_RADIUS: f32 = 8.0;
const MARKER_CORE_RADIUS: f32 = 5.0;
const MARKER_GLOW: f32 = 15.0;
const AXIS_FONT: f32 = 12.0;
const VALUE_FONT: f32 = 14.0;
/// Flip the value label left when the marker is this close to the plot's right edge
const LABEL_FLIP_MARGIN: f32 = 80.0;
const LABEL_OFFSET_RIGHT: f32 = 15.0;
const PILL_WIDTH: f32 = 56.0;
const PILL_HEIGHT: f32 = 22.0;
const PILL_GAP: f32 = 6.0;

/// Output surface size in pixels plus the plot margins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub padding: Padding,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            padding: Padding::default(),
        }
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    fn plot_area(&self) -> PlotArea {
        let left = self.padding.left;
        let top = self.padding.top;
        let right = (self.width - self.padding.right).max(left + 1.0);
        let bottom = (self.height - self.padding.bottom).max(top + 1.0);
        PlotArea {
            left,
            top,
            right,
            bottom,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl PlotArea {
    fn width(&self) -> f32 {
        self.right - self.left
    }

    fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Everything a frame depends on
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub multiplier: f64,
    /// Lower bound for the visible multiplier range
    pub max_multiplier: f64,
    pub crashed: bool,
    /// Past crash points, most recent last
    pub history: &'a [f64],
    pub dataset: &'a CurveDataset,
    /// How many history pills to draw
    pub history_markers: usize,
}

impl<'a> RenderInput<'a> {
    pub fn new(multiplier: f64, crashed: bool, dataset: &'a CurveDataset) -> Self {
        Self {
            multiplier,
            max_multiplier: DISPLAY_FLOOR,
            crashed,
            history: &[],
            dataset,
            history_markers: RenderSettings::default().history_markers,
        }
    }

    pub fn from_snapshot(
        snapshot: &'a Snapshot,
        dataset: &'a CurveDataset,
        settings: &RenderSettings,
    ) -> Self {
        Self {
            multiplier: snapshot.multiplier,
            max_multiplier: settings.display_floor,
            crashed: snapshot.crashed,
            history: &snapshot.history,
            dataset,
            history_markers: settings.history_markers,
        }
    }
}

/// Color set for the curve in one state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub line: Color,
    pub fill_start: Color,
    pub fill_end: Color,
    pub glow: Color,
}

impl Palette {
    pub const GROWING: Palette = Palette {
        line: colors::GROWING,
        fill_start: with_alpha(colors::GROWING, 0.4),
        fill_end: with_alpha(colors::GROWING, 0.8),
        glow: with_alpha(colors::GROWING, 0.8),
    };

    pub const CRASHED: Palette = Palette {
        line: colors::CRASHED,
        fill_start: with_alpha(colors::CRASHED, 0.8),
        fill_end: with_alpha(colors::CRASHED, 0.8),
        glow: with_alpha(colors::CRASHED, 0.8),
    };

    pub fn for_state(crashed: bool) -> Self {
        if crashed {
            Self::CRASHED
        } else {
            Self::GROWING
        }
    }
}

/// Top of the y axis: at least the floor and the dataset maximum, with 20%
/// headroom above the live multiplier.
pub fn visible_max(multiplier: f64, floor: f64, dataset_max: f64) -> f64 {
    let headroom = if multiplier.is_finite() {
        (multiplier * 1.2).ceil()
    } else {
        0.0
    };
    floor.max(dataset_max).max(headroom).max(1.0)
}

/// Smallest step from the 1, 2, 5 x 10^n series giving at most 10 intervals
pub fn grid_step(range: f64) -> f64 {
    if !(range.is_finite() && range > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf((range / 10.0).log10().floor());
    for factor in [1.0, 2.0, 5.0] {
        let step = factor * magnitude;
        if range / step <= 10.0 + 1e-9 {
            return step;
        }
    }
    10.0 * magnitude
}

/// Axis label: "2x", "0.5s"
fn axis_label(value: f64, unit: &str) -> String {
    format!("{}{}", round2(value), unit)
}

/// Tick positions `0, step, 2*step, ...` up to and including `max`
fn ticks(max: f64, step: f64) -> impl Iterator<Item = f64> {
    let count = (max / step + 1e-9).floor() as u64;
    (0..=count).map(move |i| i as f64 * step)
}

/// Draw one frame
pub fn render(input: &RenderInput<'_>, viewport: &Viewport) -> Frame {
    let mut frame = Frame::new(viewport.width, viewport.height);
    let plot = viewport.plot_area();
    let palette = Palette::for_state(input.crashed);
    let multiplier = if input.multiplier.is_finite() {
        input.multiplier.max(0.0)
    } else {
        1.0
    };

    let y_max = visible_max(multiplier, input.max_multiplier, input.dataset.max_value());
    let time_span = match input.dataset.max_time() {
        t if t > 0.0 => t,
        _ => 1.0,
    };
    let to_screen = |time: f64, value: f64| {
        Vec2::new(
            plot.left + (time / time_span) as f32 * plot.width(),
            plot.bottom - (value / y_max) as f32 * plot.height(),
        )
    };

    frame.push(DrawCommand::Clear {
        color: colors::BACKGROUND,
    });
    draw_grid(&mut frame, &plot, y_max, time_span, &to_screen);
    draw_axes(&mut frame, &plot);

    let origin = Vec2::new(plot.left, plot.bottom);
    let path = curve_path(input, origin, &to_screen);
    let tip = path.end();
    if !path.segments.is_empty() {
        frame.push(DrawCommand::FillUnder {
            path: path.clone(),
            baseline: plot.bottom,
            gradient: Gradient {
                from: origin,
                to: tip,
                start: palette.fill_start,
                end: palette.fill_end,
            },
            alpha: FILL_ALPHA,
        });
        frame.push(DrawCommand::Stroke {
            path,
            width: CURVE_WIDTH,
            color: palette.line,
        });
    }

    draw_marker(&mut frame, &plot, tip, multiplier, &palette);
    draw_history(&mut frame, &plot, viewport, input);
    frame
}

fn draw_grid(
    frame: &mut Frame,
    plot: &PlotArea,
    y_max: f64,
    time_span: f64,
    to_screen: &impl Fn(f64, f64) -> Vec2,
) {
    let label_color = colors::AXIS_LABEL;

    let time_step = grid_step(time_span);
    for t in ticks(time_span, time_step) {
        let x = to_screen(t, 0.0).x;
        frame.push(DrawCommand::Line {
            from: Vec2::new(x, plot.top),
            to: Vec2::new(x, plot.bottom),
            width: GRID_LINE_WIDTH,
            color: colors::GRID,
        });
        frame.push(DrawCommand::Text {
            text: axis_label(t, "s"),
            position: Vec2::new(x, plot.bottom + 20.0),
            size: AXIS_FONT,
            bold: false,
            align: TextAlign::Center,
            color: label_color,
        });
    }

    let value_step = grid_step(y_max);
    for v in ticks(y_max, value_step) {
        let y = to_screen(0.0, v).y;
        frame.push(DrawCommand::Line {
            from: Vec2::new(plot.left, y),
            to: Vec2::new(plot.right, y),
            width: GRID_LINE_WIDTH,
            color: colors::GRID,
        });
        frame.push(DrawCommand::Text {
            text: axis_label(v, "x"),
            position: Vec2::new(plot.left - 10.0, y + 5.0),
            size: AXIS_FONT,
            bold: false,
            align: TextAlign::Right,
            color: label_color,
        });
    }
}

fn draw_axes(frame: &mut Frame, plot: &PlotArea) {
    let origin = Vec2::new(plot.left, plot.bottom);
    frame.push(DrawCommand::Line {
        from: origin,
        to: Vec2::new(plot.right, plot.bottom),
        width: AXIS_WIDTH,
        color: colors::AXIS,
    });
    frame.push(DrawCommand::Line {
        from: origin,
        to: Vec2::new(plot.left, plot.top),
        width: AXIS_WIDTH,
        color: colors::AXIS,
    });
}

/// Smoothed path from the origin through the samples up to the multiplier
fn curve_path(
    input: &RenderInput<'_>,
    origin: Vec2,
    to_screen: &impl Fn(f64, f64) -> Vec2,
) -> Path {
    let mut path = Path::new(origin);
    let index = input.dataset.closest_index_for(input.multiplier);
    let mut prev = origin;
    for (i, sample) in input.dataset.slice_through(index).iter().enumerate() {
        let point = to_screen(sample.time, sample.value);
        if i == 0 {
            // Straight run up to the first sample
            path.quad_to(prev.lerp(point, 0.5), point);
        } else {
            let tension = (0.2 + sample.value / 30.0).min(0.7) as f32;
            let control = Vec2::new(
                prev.x + (point.x - prev.x) * 0.5,
                prev.y - (prev.y - point.y) * tension,
            );
            path.quad_to(control, point);
        }
        prev = point;
    }
    path
}

fn draw_marker(
    frame: &mut Frame,
    plot: &PlotArea,
    tip: Vec2,
    multiplier: f64,
    palette: &Palette,
) {
    frame.push(DrawCommand::Circle {
        center: tip,
        radius: MARKER_RADIUS,
        color: palette.line,
        glow: None,
    });
    frame.push(DrawCommand::Circle {
        center: tip,
        radius: MARKER_CORE_RADIUS,
        color: palette.line,
        glow: Some(Glow {
            blur: MARKER_GLOW,
            color: palette.glow,
        }),
    });

    let offset = if plot.right - tip.x < LABEL_FLIP_MARGIN {
        -LABEL_FLIP_MARGIN
    } else {
        LABEL_OFFSET_RIGHT
    };
    let y = (tip.y - 10.0).max(plot.top + VALUE_FONT).min(plot.bottom);
    frame.push(DrawCommand::Text {
        text: format!("{:.2}x", multiplier),
        position: Vec2::new(tip.x + offset, y),
        size: VALUE_FONT,
        bold: true,
        align: TextAlign::Left,
        color: colors::VALUE_LABEL,
    });
}

/// Recent crash points as pills along the top margin, newest rightmost
fn draw_history(frame: &mut Frame, plot: &PlotArea, viewport: &Viewport, input: &RenderInput<'_>) {
    let shown = input.history.len().min(input.history_markers);
    let recent = &input.history[input.history.len() - shown..];
    let min_y = ((viewport.padding.top - PILL_HEIGHT) * 0.5).max(0.0);

    for (i, &crash_point) in recent.iter().enumerate() {
        let slots_from_right = (shown - 1 - i) as f32;
        let max_x = plot.right - slots_from_right * (PILL_WIDTH + PILL_GAP);
        let min_x = max_x - PILL_WIDTH;
        if min_x < 0.0 {
            continue;
        }
        let color = if crash_point >= HIGH_ROUND_THRESHOLD {
            colors::GROWING
        } else {
            colors::CRASHED
        };
        frame.push(DrawCommand::Rect {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, min_y + PILL_HEIGHT),
            color: with_alpha(color, 0.2),
        });
        frame.push(DrawCommand::Text {
            text: format!("{:.2}x", crash_point),
            position: Vec2::new(min_x + PILL_WIDTH * 0.5, min_y + PILL_HEIGHT * 0.5 + 4.0),
            size: AXIS_FONT,
            bold: true,
            align: TextAlign::Center,
            color,
        });
    }
}
