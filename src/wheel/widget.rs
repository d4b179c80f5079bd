use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Paragraph, Widget,
    },
};

use super::geometry::{segment_angle, wedge_centre, wedge_start};

pub const PALETTE: [Color; 6] = [
    Color::Rgb(0xff, 0x99, 0x99),
    Color::Rgb(0x99, 0xff, 0x99),
    Color::Rgb(0x99, 0x99, 0xff),
    Color::Rgb(0xff, 0xff, 0x99),
    Color::Rgb(0x99, 0xff, 0xff),
    Color::Rgb(0xff, 0x99, 0xff),
];
pub const EMPTY_MESSAGE: &str = "No tasks available";

const RADIUS: f64 = 1.0;
const MARGIN: f64 = 0.15;
const RING_RADIUS: f64 = RADIUS + 0.08;
const LABEL_RADIUS: f64 = 0.62;
const LABEL_MAX_CHARS: usize = 12;
const SEPARATOR_COLOR: Color = Color::White;
const POINTER_COLOR: Color = Color::Gray;

const fn wedge_color(i: usize) -> Color {
    PALETTE[i % PALETTE.len()]
}

/// Screen angles turn clockwise with y pointing down; the canvas has y up.
fn polar(radius: f64, angle: f64) -> (f64, f64) {
    (radius * angle.cos(), -radius * angle.sin())
}

/// Circular progress drawn around the wheel, sweeping clockwise from the top.
#[derive(Debug, Clone, Copy)]
pub struct Ring {
    pub fraction: f64,
    pub color: Color,
}

pub struct Wheel<'a> {
    tasks: &'a [String],
    rotation: f64,
    ring: Option<Ring>,
    block: Option<Block<'a>>,
}

impl<'a> Wheel<'a> {
    pub fn new(tasks: &'a [String], rotation: f64) -> Self {
        Self {
            tasks,
            rotation,
            ring: None,
            block: None,
        }
    }

    pub fn ring(mut self, ring: Option<Ring>) -> Self {
        self.ring = ring;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn wedge_points(&self, index: usize) -> Vec<(f64, f64)> {
        let count = self.tasks.len();
        let start = wedge_start(self.rotation, index, count);
        let sweep = segment_angle(count);
        let mut coords = Vec::new();
        let rings = 40;
        for step in 1..=rings {
            let r = RADIUS * step as f64 / rings as f64;
            let arc_steps = ((sweep * r * 120.0).ceil() as usize).max(1);
            for k in 0..=arc_steps {
                let a = start + sweep * k as f64 / arc_steps as f64;
                coords.push(polar(r, a));
            }
        }
        coords
    }

    fn ring_points(fraction: f64) -> Vec<(f64, f64)> {
        let sweep = fraction.clamp(0.0, 1.0) * TAU;
        let steps = (sweep * 90.0).ceil() as usize;
        (0..=steps)
            .map(|k| {
                let a = -FRAC_PI_2 + sweep * k as f64 / steps.max(1) as f64;
                polar(RING_RADIUS, a)
            })
            .collect()
    }

    fn pointer_points() -> Vec<(f64, f64)> {
        let tip = RADIUS - 0.15;
        let base = RADIUS + 0.05;
        let half_width = 0.1;
        let rows = 16;
        let mut coords = Vec::new();
        for row in 0..=rows {
            let y = tip + (base - tip) * row as f64 / rows as f64;
            let w = half_width * (y - tip) / (base - tip);
            let cols = 8;
            for col in 0..=cols {
                coords.push((-w + 2.0 * w * col as f64 / cols as f64, y));
            }
        }
        coords
    }

    fn paint(&self, ctx: &mut Context, fills: &[Vec<(f64, f64)>], char_width: f64) {
        let count = self.tasks.len();
        for (i, coords) in fills.iter().enumerate() {
            ctx.draw(&Points {
                coords,
                color: wedge_color(i),
            });
        }
        ctx.layer();

        for i in 0..count {
            let (x2, y2) = polar(RADIUS, wedge_start(self.rotation, i, count));
            ctx.draw(&CanvasLine {
                x1: 0.0,
                y1: 0.0,
                x2,
                y2,
                color: SEPARATOR_COLOR,
            });
        }

        if let Some(ring) = self.ring {
            ctx.draw(&Points {
                coords: &Self::ring_points(ring.fraction),
                color: ring.color,
            });
        }
        ctx.draw(&Points {
            coords: &Self::pointer_points(),
            color: POINTER_COLOR,
        });
        ctx.layer();

        for (i, label) in self.tasks.iter().enumerate() {
            let text: String = label.chars().take(LABEL_MAX_CHARS).collect();
            let (x, y) = polar(LABEL_RADIUS, wedge_centre(self.rotation, i, count));
            let x = x - char_width * text.chars().count() as f64 / 2.0;
            let style = Style::new()
                .fg(Color::Black)
                .bg(wedge_color(i))
                .add_modifier(Modifier::BOLD);
            ctx.print(x, y, Span::styled(text, style));
        }
    }
}

impl Widget for Wheel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.tasks.is_empty() {
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(inner);
            Paragraph::new(EMPTY_MESSAGE)
                .dark_gray()
                .centered()
                .render(middle, buf);
            return;
        }

        // terminal cells are about twice as tall as wide
        let half_height = RADIUS + MARGIN;
        let half_width = half_height * inner.width as f64 / (2.0 * inner.height as f64);
        let char_width = 2.0 * half_width / inner.width as f64;
        let fills: Vec<Vec<(f64, f64)>> = (0..self.tasks.len())
            .map(|i| self.wedge_points(i))
            .collect();

        Canvas::default()
            .marker(Marker::HalfBlock)
            .x_bounds([-half_width, half_width])
            .y_bounds([-half_height, half_height])
            .paint(|ctx| self.paint(ctx, &fills, char_width))
            .render(inner, buf);
    }
}
