use rand::Rng;
use serde::Serialize;

use crate::engine::config::RocketConfig;
use crate::geometry::{Point, Viewport};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RocketPhase {
    Dormant { next_launch_ms: f64 },
    Flying,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RocketEvent {
    Launched,
    Landed { next_launch_ms: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExhaustParticle {
    pub position: Point,
    pub size: f64,
    pub opacity: f64,
    pub speed: f64,
}

/// The occasional rocket crossing the sky. Dormant until its launch time,
/// then flies left to right and schedules its next appearance.
#[derive(Clone, Debug)]
pub struct Rocket {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed: f64,
    pub phase: RocketPhase,
    pub exhaust: Vec<ExhaustParticle>,
}

impl Rocket {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, config: &RocketConfig, now_ms: f64) -> Self {
        Self {
            x: -config.margin,
            y: 0.0,
            size: *config.size.start(),
            speed: *config.speed.start(),
            phase: RocketPhase::Dormant {
                next_launch_ms: now_ms + rng.gen_range(config.first_launch_delay_ms.clone()),
            },
            exhaust: Vec::new(),
        }
    }

    pub fn visible(&self) -> bool {
        matches!(self.phase, RocketPhase::Flying)
    }

    pub fn next_launch_ms(&self) -> Option<f64> {
        match self.phase {
            RocketPhase::Dormant { next_launch_ms } => Some(next_launch_ms),
            RocketPhase::Flying => None,
        }
    }

    /// Where exhaust leaves the engine nozzles.
    pub fn tail(&self) -> Point {
        Point::new(self.x - self.size * 1.7, self.y)
    }

    /// Pulls a flight back into the vertical band after the canvas is resized.
    pub fn fit_to(&mut self, config: &RocketConfig, viewport: Viewport) {
        if self.visible() {
            let height = viewport.height();
            self.y = self
                .y
                .clamp(config.band.start() * height, config.band.end() * height);
        }
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        config: &RocketConfig,
        viewport: Viewport,
        now_ms: f64,
    ) -> Option<RocketEvent> {
        match self.phase {
            RocketPhase::Dormant { next_launch_ms } => {
                if now_ms < next_launch_ms {
                    return None;
                }
                self.launch(rng, config, viewport);
                Some(RocketEvent::Launched)
            }
            RocketPhase::Flying => {
                self.x += self.speed;
                self.update_exhaust(rng, config);
                if rng.gen::<f64>() < config.emit_chance {
                    self.emit(rng, config);
                }

                if self.x > viewport.width() + config.margin {
                    let next_launch_ms = now_ms + rng.gen_range(config.relaunch_delay_ms.clone());
                    self.phase = RocketPhase::Dormant { next_launch_ms };
                    self.exhaust.clear();
                    Some(RocketEvent::Landed { next_launch_ms })
                } else {
                    None
                }
            }
        }
    }

    fn launch<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &RocketConfig, viewport: Viewport) {
        let band = config.band.clone();
        self.x = -config.margin;
        self.y = rng.gen_range(band) * viewport.height();
        self.speed = rng.gen_range(config.speed.clone());
        self.size = rng.gen_range(config.size.clone());
        self.exhaust.clear();
        self.phase = RocketPhase::Flying;
    }

    fn emit<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &RocketConfig) {
        let tail = self.tail();
        let spread = self.size * 0.2;
        for _ in 0..rng.gen_range(config.emit_batch.clone()) {
            self.exhaust.push(ExhaustParticle {
                position: tail.offset(0.0, rng.gen_range(-spread..=spread)),
                size: rng.gen_range(config.exhaust_size.clone()),
                opacity: rng.gen_range(config.exhaust_opacity.clone()),
                speed: rng.gen_range(config.exhaust_speed.clone()),
            });
        }
    }

    fn update_exhaust<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &RocketConfig) {
        let jitter = config.exhaust_jitter;
        for particle in self.exhaust.iter_mut() {
            particle.position.x -= particle.speed;
            if jitter > 0.0 {
                particle.position.y += rng.gen_range(-jitter..=jitter);
            }
            particle.opacity -= config.exhaust_decay;
        }
        self.exhaust.retain(|p| p.opacity > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0).expect("valid viewport")
    }

    #[test]
    fn first_launch_is_scheduled_within_window() {
        let config = RocketConfig::default();
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let rocket = Rocket::new(&mut rng, &config, 1_000.0);
            let next = rocket.next_launch_ms().expect("starts dormant");
            assert!((11_000.0..=26_000.0).contains(&next));
            assert!(!rocket.visible());
        }
    }

    #[test]
    fn full_flight_cycle() {
        let config = RocketConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut rocket = Rocket::new(&mut rng, &config, 0.0);
        let launch_at = rocket.next_launch_ms().expect("starts dormant");

        assert_eq!(rocket.update(&mut rng, &config, viewport(), launch_at - 1.0), None);
        assert!(!rocket.visible());

        let event = rocket.update(&mut rng, &config, viewport(), launch_at);
        assert_eq!(event, Some(RocketEvent::Launched));
        assert!(rocket.visible());
        assert_eq!(rocket.x, -config.margin);
        assert!(rocket.y >= 0.1 * 600.0 && rocket.y <= 0.5 * 600.0);
        assert!(config.speed.contains(&rocket.speed));
        assert!(rocket.exhaust.is_empty());

        let mut now = launch_at;
        let mut landed = None;
        for _ in 0..10_000 {
            now += 16.0;
            if let Some(RocketEvent::Landed { next_launch_ms }) =
                rocket.update(&mut rng, &config, viewport(), now)
            {
                landed = Some(next_launch_ms);
                break;
            }
        }

        let next_launch = landed.expect("rocket should leave the screen");
        assert!(next_launch > now);
        assert!(next_launch >= now + 20_000.0 && next_launch <= now + 50_000.0);
        assert!(rocket.x > 800.0 + config.margin);
        assert!(!rocket.visible());
        assert!(rocket.exhaust.is_empty());
    }

    #[test]
    fn resize_keeps_flight_inside_band() {
        let config = RocketConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut rocket = Rocket::new(&mut rng, &config, 0.0);

        rocket.y = 500.0;
        rocket.fit_to(&config, Viewport::new(800.0, 100.0).expect("valid viewport"));
        assert_eq!(rocket.y, 500.0, "dormant rocket has no position to fix");

        rocket.update(&mut rng, &config, viewport(), f64::MAX);
        rocket.y = 280.0;
        rocket.fit_to(&config, Viewport::new(800.0, 100.0).expect("valid viewport"));
        approx::assert_relative_eq!(rocket.y, 50.0);

        rocket.y = 2.0;
        rocket.fit_to(&config, Viewport::new(800.0, 100.0).expect("valid viewport"));
        approx::assert_relative_eq!(rocket.y, 10.0);

        rocket.y = 30.0;
        rocket.fit_to(&config, Viewport::new(800.0, 100.0).expect("valid viewport"));
        approx::assert_relative_eq!(rocket.y, 30.0);
    }

    #[test]
    fn exhaust_fades_and_is_pruned() {
        let config = RocketConfig {
            emit_chance: 1.0,
            ..RocketConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut rocket = Rocket::new(&mut rng, &config, 0.0);
        rocket.update(&mut rng, &config, viewport(), f64::MAX);
        assert!(rocket.visible());

        let max_len = (1.0 / config.exhaust_decay).ceil() as usize * config.emit_batch.end();
        let mut peak = 0;
        for _ in 0..200 {
            rocket.update(&mut rng, &config, viewport(), f64::MAX);
            if !rocket.visible() {
                break;
            }
            assert!(rocket.exhaust.len() <= max_len);
            assert!(rocket.exhaust.iter().all(|p| p.opacity > 0.0));
            peak = peak.max(rocket.exhaust.len());
        }
        assert!(peak > 0);
    }

    #[test]
    fn particle_opacity_never_increases() {
        let config = RocketConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut rocket = Rocket::new(&mut rng, &config, 0.0);
        rocket.phase = RocketPhase::Flying;
        rocket.y = 100.0;
        rocket.exhaust.push(ExhaustParticle {
            position: Point::new(0.0, 100.0),
            size: 2.0,
            opacity: 0.05,
            speed: 1.0,
        });

        rocket.update_exhaust(&mut rng, &config);
        approx::assert_relative_eq!(rocket.exhaust[0].opacity, 0.03, epsilon = 1e-12);
        approx::assert_relative_eq!(rocket.exhaust[0].position.x, -1.0);
        assert!((rocket.exhaust[0].position.y - 100.0).abs() <= config.exhaust_jitter);

        rocket.update_exhaust(&mut rng, &config);
        rocket.update_exhaust(&mut rng, &config);
        assert!(rocket.exhaust.is_empty());
    }
}
