//! Compiled-in tuning for the starfield, grouped into named presets.
//!
//! The page uses the same engine for a few backgrounds that differ only in
//! palette, density and whether the rocket flies, so each of those is a preset
//! rather than a separate implementation.

use serde::Serialize;
use std::ops::RangeInclusive;

use crate::error::EngineError;
use crate::geometry::Rgb;

pub const STAR_PALETTE: &[Rgb] = &[
    Rgb(255, 255, 255),
    Rgb(200, 220, 255),
    Rgb(255, 240, 220),
    Rgb(170, 200, 255),
    Rgb(255, 250, 205),
];

pub const DUST_PALETTE: &[Rgb] = &[Rgb(140, 150, 190), Rgb(120, 130, 170), Rgb(160, 160, 200)];

pub const MONO_PALETTE: &[Rgb] = &[Rgb::WHITE];

pub const DEFAULT_PRESET: &str = "hero";
pub const PRESET_NAMES: &[&str] = &["hero", "starfield", "minimal"];

/// Square pixels of canvas per generated object.
pub const HERO_STAR_DENSITY: f64 = 9_600.0;
pub const HERO_DUST_DENSITY: f64 = 6_000.0;
pub const DENSE_STAR_DENSITY: f64 = 6_000.0;
pub const DENSE_DUST_DENSITY: f64 = 3_000.0;
pub const SPARSE_STAR_DENSITY: f64 = 12_000.0;

/// Pointer radius around a connection midpoint that highlights it.
pub const LINK_INTERACTION_RADIUS: f64 = 150.0;
/// Pointer radius around a star that makes it glow.
pub const STAR_INTERACTION_RADIUS: f64 = 100.0;

#[derive(Clone, Debug, Serialize)]
pub struct LayerConfig {
    pub density: f64,
    pub max: usize,
    pub size: RangeInclusive<f64>,
    pub opacity: RangeInclusive<f64>,
    pub pulse_speed: RangeInclusive<f64>,
    pub palette: &'static [Rgb],
}

impl LayerConfig {
    /// `floor(area / density)` clamped to `max`.
    pub fn count_for_area(&self, area: f64) -> usize {
        if !(area.is_finite() && area > 0.0) || self.density <= 0.0 {
            return 0;
        }
        let raw = (area / self.density).floor();
        if raw >= self.max as f64 {
            self.max
        } else {
            raw as usize
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LinkConfig {
    /// Maximum link length as a fraction of viewport width.
    pub threshold_ratio: f64,
    pub per_star_cap: usize,
    pub budget: usize,
    /// Opacity of a zero-length link; falls off linearly to 0 at the threshold.
    pub max_opacity: f64,
    /// Multiplier applied to resting links.
    pub dampening: f64,
    pub width: f64,
    pub highlight_width: f64,
    pub highlight_opacity: f64,
    pub highlight_glow: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct InteractionConfig {
    pub link_radius: f64,
    pub star_radius: f64,
    pub pulse_amplitude: f64,
    /// Extra size factor at zero pointer distance.
    pub size_boost: f64,
    /// Extra opacity at zero pointer distance.
    pub opacity_boost: f64,
    /// Halo radius as a multiple of the star's displayed size.
    pub glow_scale: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RocketConfig {
    pub first_launch_delay_ms: RangeInclusive<f64>,
    pub relaunch_delay_ms: RangeInclusive<f64>,
    /// Distance beyond either canvas edge where the rocket is fully hidden.
    pub margin: f64,
    /// Vertical band as fractions of the canvas height.
    pub band: RangeInclusive<f64>,
    pub speed: RangeInclusive<f64>,
    pub size: RangeInclusive<f64>,
    pub emit_chance: f64,
    pub emit_batch: RangeInclusive<usize>,
    pub exhaust_size: RangeInclusive<f64>,
    pub exhaust_opacity: RangeInclusive<f64>,
    pub exhaust_speed: RangeInclusive<f64>,
    pub exhaust_jitter: f64,
    pub exhaust_decay: f64,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            first_launch_delay_ms: 10_000.0..=25_000.0,
            relaunch_delay_ms: 20_000.0..=50_000.0,
            margin: 120.0,
            band: 0.1..=0.5,
            speed: 1.5..=3.0,
            size: 18.0..=28.0,
            emit_chance: 0.6,
            emit_batch: 1..=3,
            exhaust_size: 1.0..=3.0,
            exhaust_opacity: 0.5..=0.9,
            exhaust_speed: 0.5..=1.5,
            exhaust_jitter: 0.4,
            exhaust_decay: 0.02,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct EngineConfig {
    pub name: &'static str,
    pub stars: LayerConfig,
    pub dust: Option<LayerConfig>,
    pub links: LinkConfig,
    pub interaction: InteractionConfig,
    pub rocket: Option<RocketConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::hero()
    }
}

impl EngineConfig {
    pub fn preset(name: &str) -> Result<Self, EngineError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "hero" => Ok(Self::hero()),
            "starfield" => Ok(Self::starfield()),
            "minimal" => Ok(Self::minimal()),
            _ => Err(EngineError::UnknownPreset(name.to_string())),
        }
    }

    pub fn all_presets() -> Vec<Self> {
        vec![Self::hero(), Self::starfield(), Self::minimal()]
    }

    /// Stars, dust, constellations and the rocket.
    pub fn hero() -> Self {
        Self {
            name: "hero",
            stars: star_layer(HERO_STAR_DENSITY, 120, STAR_PALETTE),
            dust: Some(dust_layer(HERO_DUST_DENSITY, 160)),
            links: LinkConfig::default(),
            interaction: InteractionConfig::default(),
            rocket: Some(RocketConfig::default()),
        }
    }

    /// Denser field without the rocket.
    pub fn starfield() -> Self {
        Self {
            name: "starfield",
            stars: star_layer(DENSE_STAR_DENSITY, 180, STAR_PALETTE),
            dust: Some(dust_layer(DENSE_DUST_DENSITY, 250)),
            links: LinkConfig {
                per_star_cap: 2,
                budget: 140,
                ..LinkConfig::default()
            },
            interaction: InteractionConfig::default(),
            rocket: None,
        }
    }

    /// Sparse white stars and their links only.
    pub fn minimal() -> Self {
        Self {
            name: "minimal",
            stars: star_layer(SPARSE_STAR_DENSITY, 80, MONO_PALETTE),
            dust: None,
            links: LinkConfig {
                max_opacity: 0.3,
                budget: 60,
                ..LinkConfig::default()
            },
            interaction: InteractionConfig {
                pulse_amplitude: 0.2,
                ..InteractionConfig::default()
            },
            rocket: None,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.15,
            per_star_cap: 3,
            budget: 100,
            max_opacity: 0.4,
            dampening: 0.5,
            width: 0.6,
            highlight_width: 1.4,
            highlight_opacity: 0.7,
            highlight_glow: 8.0,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            link_radius: LINK_INTERACTION_RADIUS,
            star_radius: STAR_INTERACTION_RADIUS,
            pulse_amplitude: 0.3,
            size_boost: 0.8,
            opacity_boost: 0.4,
            glow_scale: 4.0,
        }
    }
}

fn star_layer(density: f64, max: usize, palette: &'static [Rgb]) -> LayerConfig {
    LayerConfig {
        density,
        max,
        size: 0.6..=2.0,
        opacity: 0.4..=1.0,
        pulse_speed: 0.01..=0.04,
        palette,
    }
}

fn dust_layer(density: f64, max: usize) -> LayerConfig {
    LayerConfig {
        density,
        max,
        size: 0.3..=1.0,
        opacity: 0.08..=0.25,
        pulse_speed: 0.005..=0.01,
        palette: DUST_PALETTE,
    }
}

pub fn presets_json() -> String {
    serde_json::to_string(&EngineConfig::all_presets()).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_scale_with_area_and_clamp() {
        let layer = EngineConfig::hero().stars;
        assert_eq!(layer.count_for_area(800.0 * 600.0), 50);
        assert_eq!(layer.count_for_area(400.0 * 300.0), 12);
        assert_eq!(layer.count_for_area(10_000.0 * 10_000.0), layer.max);
        assert_eq!(layer.count_for_area(0.0), 0);
        assert_eq!(layer.count_for_area(f64::NAN), 0);
    }

    #[test]
    fn presets_resolve_by_name() {
        for name in PRESET_NAMES {
            let config = EngineConfig::preset(name).expect("known preset");
            assert_eq!(&config.name, name);
        }
        assert_eq!(EngineConfig::preset(" Hero ").map(|c| c.name), Ok("hero"));
        assert_eq!(
            EngineConfig::preset("nebula").map(|c| c.name),
            Err(EngineError::UnknownPreset("nebula".to_string()))
        );
    }

    #[test]
    fn only_hero_launches_rockets() {
        assert!(EngineConfig::hero().rocket.is_some());
        assert!(EngineConfig::starfield().rocket.is_none());
        assert!(EngineConfig::minimal().rocket.is_none());
        assert!(EngineConfig::minimal().dust.is_none());
    }

    #[test]
    fn presets_serialize() {
        let json = presets_json();
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        let names: Vec<&str> = parsed
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(names, PRESET_NAMES);
    }
}
