use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use std::f64::consts::TAU;

use crate::engine::config::LayerConfig;
use crate::geometry::{advance_phase, Point, Rgb, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ObjectKind {
    Star,
    Dust,
}

#[derive(Clone, Debug)]
pub struct CelestialObject {
    pub position: Point,
    pub size: f64,
    pub opacity: f64,
    pub pulse_phase: f64,
    pub pulse_speed: f64,
    pub color: Rgb,
    pub kind: ObjectKind,
}

impl CelestialObject {
    pub fn advance_pulse(&mut self) {
        self.pulse_phase = advance_phase(self.pulse_phase, self.pulse_speed);
    }

    /// Radius after applying the sinusoidal pulse.
    pub fn pulsed_size(&self, amplitude: f64) -> f64 {
        self.size * (1.0 + amplitude * self.pulse_phase.sin())
    }
}

/// Scatters `layer.count_for_area(..)` objects uniformly over the viewport.
pub fn generate_layer<R: Rng + ?Sized>(
    rng: &mut R,
    layer: &LayerConfig,
    kind: ObjectKind,
    viewport: Viewport,
) -> Vec<CelestialObject> {
    let count = layer.count_for_area(viewport.area());
    let mut objects = Vec::with_capacity(count);
    for _ in 0..count {
        let color = layer.palette.choose(rng).copied().unwrap_or(Rgb::WHITE);
        objects.push(CelestialObject {
            position: Point::new(
                rng.gen_range(0.0..=viewport.width()),
                rng.gen_range(0.0..=viewport.height()),
            ),
            size: rng.gen_range(layer.size.clone()),
            opacity: rng.gen_range(layer.opacity.clone()),
            pulse_phase: rng.gen_range(0.0..TAU),
            pulse_speed: rng.gen_range(layer.pulse_speed.clone()),
            color,
            kind,
        });
    }
    objects
}
