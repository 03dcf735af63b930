pub mod config;
pub mod connection;
pub mod object;
pub mod render;
pub mod rocket;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::EngineError;
use crate::geometry::{Point, Viewport};
use crate::surface::Surface;
use config::EngineConfig;
use connection::{derive_connections, Connection};
use object::{generate_layer, CelestialObject, ObjectKind};
use rocket::{Rocket, RocketEvent, RocketPhase};

/// One animated starfield. Owns every piece of simulation state for a single
/// canvas; nothing is shared between instances.
pub struct Engine {
    config: EngineConfig,
    rng: ChaCha8Rng,
    viewport: Option<Viewport>,
    stars: Vec<CelestialObject>,
    dust: Vec<CelestialObject>,
    connections: Vec<Connection>,
    rocket: Option<Rocket>,
    pointer: Option<Point>,
    ticks: u64,
}

impl Engine {
    pub fn new(config: EngineConfig, seed: u64, width: f64, height: f64, now_ms: f64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed), width, height, now_ms)
    }

    pub fn from_entropy(config: EngineConfig, width: f64, height: f64, now_ms: f64) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy(), width, height, now_ms)
    }

    fn with_rng(
        config: EngineConfig,
        mut rng: ChaCha8Rng,
        width: f64,
        height: f64,
        now_ms: f64,
    ) -> Self {
        let rocket = config
            .rocket
            .as_ref()
            .map(|rocket| Rocket::new(&mut rng, rocket, now_ms));

        let mut engine = Self {
            config,
            rng,
            viewport: None,
            stars: Vec::new(),
            dust: Vec::new(),
            connections: Vec::new(),
            rocket,
            pointer: None,
            ticks: 0,
        };
        if let Err(err) = engine.resize(width, height) {
            log::debug!("starfield waiting for a usable size: {}", err);
        }
        engine
    }

    /// Throws away every object and connection and seeds a fresh field for the
    /// new size. A degenerate size leaves the field empty until the next resize.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), EngineError> {
        let viewport = match Viewport::new(width, height) {
            Ok(viewport) => viewport,
            Err(err) => {
                self.viewport = None;
                self.stars = Vec::new();
                self.dust = Vec::new();
                self.connections = Vec::new();
                return Err(err);
            }
        };

        let stars = generate_layer(&mut self.rng, &self.config.stars, ObjectKind::Star, viewport);
        let dust = match &self.config.dust {
            Some(layer) => generate_layer(&mut self.rng, layer, ObjectKind::Dust, viewport),
            None => Vec::new(),
        };
        let connections = derive_connections(&stars, &self.config.links, viewport);

        log::debug!(
            "starfield seeded {}x{}: {} stars, {} dust, {} links",
            width,
            height,
            stars.len(),
            dust.len(),
            connections.len()
        );

        if let (Some(rocket), Some(config)) = (self.rocket.as_mut(), self.config.rocket.as_ref()) {
            rocket.fit_to(config, viewport);
        }

        self.viewport = Some(viewport);
        self.stars = stars;
        self.dust = dust;
        self.connections = connections;
        Ok(())
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.pointer = Some(Point::new(x, y));
        }
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
    }

    /// Advances the simulation one frame and draws it.
    pub fn tick<S: Surface + ?Sized>(&mut self, now_ms: f64, surface: &mut S) {
        self.ticks += 1;
        let Some(viewport) = self.viewport else {
            return;
        };

        surface.clear(viewport.width(), viewport.height());

        for object in self.stars.iter_mut().chain(self.dust.iter_mut()) {
            object.advance_pulse();
        }

        let link_radius = self.config.interaction.link_radius;
        for connection in self.connections.iter_mut() {
            connection.update_highlight(&self.stars, self.pointer, link_radius);
        }

        render::draw_dust(surface, &self.dust);
        render::draw_connections(surface, &self.stars, &self.connections, &self.config.links);
        render::draw_stars(surface, &self.stars, self.pointer, &self.config.interaction);

        let rocket_config = self.config.rocket.as_ref();
        if let (Some(rocket), Some(rocket_config)) = (self.rocket.as_mut(), rocket_config) {
            match rocket.update(&mut self.rng, rocket_config, viewport, now_ms) {
                Some(RocketEvent::Launched) => {
                    log::debug!("rocket launched at y={:.0} speed={:.2}", rocket.y, rocket.speed)
                }
                Some(RocketEvent::Landed { next_launch_ms }) => log::debug!(
                    "rocket left the sky, next launch in {:.1}s",
                    (next_launch_ms - now_ms) / 1000.0
                ),
                None => {}
            }
            render::draw_rocket(surface, rocket);
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn stars(&self) -> &[CelestialObject] {
        &self.stars
    }

    pub fn dust(&self) -> &[CelestialObject] {
        &self.dust
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn rocket(&self) -> Option<&Rocket> {
        self.rocket.as_ref()
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn view(&self) -> EngineView {
        EngineView::from(self)
    }
}

#[derive(Serialize)]
struct RocketView {
    #[serde(flatten)]
    phase: RocketPhase,
    x: f64,
    y: f64,
    exhaust: usize,
}

#[derive(Serialize)]
pub struct EngineView {
    preset: &'static str,
    viewport: Option<Viewport>,
    stars: usize,
    dust: usize,
    connections: usize,
    highlighted: usize,
    pointer: Option<Point>,
    rocket: Option<RocketView>,
    ticks: u64,
}

impl From<&Rocket> for RocketView {
    fn from(rocket: &Rocket) -> Self {
        Self {
            phase: rocket.phase,
            x: rocket.x,
            y: rocket.y,
            exhaust: rocket.exhaust.len(),
        }
    }
}

impl From<&Engine> for EngineView {
    fn from(engine: &Engine) -> Self {
        Self {
            preset: engine.config.name,
            viewport: engine.viewport,
            stars: engine.stars.len(),
            dust: engine.dust.len(),
            connections: engine.connections.len(),
            highlighted: engine.connections.iter().filter(|c| c.highlighted).count(),
            pointer: engine.pointer,
            rocket: engine.rocket.as_ref().map(RocketView::from),
            ticks: engine.ticks,
        }
    }
}

impl EngineView {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
