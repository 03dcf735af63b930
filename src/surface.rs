use crate::geometry::{Point, Rgba};

/// 2D raster primitives the renderer needs. Implemented over a browser canvas
/// context and by [`RecordingSurface`] for tests.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);

    /// Soft glow applied to subsequent fills and strokes until [`Surface::clear_glow`].
    fn set_glow(&mut self, blur: f64, color: Rgba);

    fn clear_glow(&mut self);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    /// Radial gradient from `color` at the center fading to transparent at `radius`.
    fn fill_radial_glow(&mut self, center: Point, radius: f64, color: Rgba);

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba);

    fn fill_polygon(&mut self, points: &[Point], color: Rgba);

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Rgba);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { width: f64, height: f64 },
    Glow { blur: f64, color: Rgba },
    ClearGlow,
    Circle { center: Point, radius: f64, color: Rgba },
    RadialGlow { center: Point, radius: f64, color: Rgba },
    Line { from: Point, to: Point, width: f64, color: Rgba },
    Polygon { points: Vec<Point>, color: Rgba },
    Rect { origin: Point, width: f64, height: f64, color: Rgba },
}

/// Keeps every call in order so tests can inspect a rendered frame.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn reset(&mut self) {
        self.commands.clear();
    }

    pub fn count(&self, matches: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| matches(c)).count()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn set_glow(&mut self, blur: f64, color: Rgba) {
        self.commands.push(DrawCommand::Glow { blur, color });
    }

    fn clear_glow(&mut self) {
        self.commands.push(DrawCommand::ClearGlow);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn fill_radial_glow(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::RadialGlow {
            center,
            radius,
            color,
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgba) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Rgba) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn fill_rect(&mut self, origin: Point, width: f64, height: f64, color: Rgba) {
        self.commands.push(DrawCommand::Rect {
            origin,
            width,
            height,
            color,
        });
    }
}
