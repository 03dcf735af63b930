//! Frame rasterization. Layering is back to front: dust, constellation
//! lines, stars, then the rocket and its exhaust.

use crate::engine::config::{InteractionConfig, LinkConfig};
use crate::engine::connection::Connection;
use crate::engine::object::CelestialObject;
use crate::engine::rocket::Rocket;
use crate::geometry::{Point, Rgb};
use crate::surface::Surface;

const HULL: Rgb = Rgb(226, 232, 240);
const HULL_SHADE: Rgb = Rgb(148, 163, 184);
const NOSE: Rgb = Rgb(239, 68, 68);
const WINDOW: Rgb = Rgb(125, 211, 252);
const WINDOW_RIM: Rgb = Rgb(71, 85, 105);
const NOZZLE: Rgb = Rgb(100, 116, 139);
const FLAME: Rgb = Rgb(251, 146, 60);
const FLAME_CORE: Rgb = Rgb(254, 240, 138);
const EXHAUST: Rgb = Rgb(253, 186, 116);

pub fn draw_dust<S: Surface + ?Sized>(surface: &mut S, dust: &[CelestialObject]) {
    for speck in dust {
        surface.fill_circle(speck.position, speck.size, speck.color.with_alpha(speck.opacity));
    }
}

pub fn draw_connections<S: Surface + ?Sized>(
    surface: &mut S,
    stars: &[CelestialObject],
    connections: &[Connection],
    links: &LinkConfig,
) {
    for connection in connections {
        let Some((from, to)) = connection.endpoints(stars) else {
            continue;
        };
        if connection.highlighted {
            let color = Rgb::WHITE.with_alpha(links.highlight_opacity);
            surface.set_glow(links.highlight_glow, color);
            surface.stroke_line(from, to, links.highlight_width, color);
            surface.clear_glow();
        } else {
            let alpha = connection.base_opacity * links.dampening;
            surface.stroke_line(from, to, links.width, Rgb::WHITE.with_alpha(alpha));
        }
    }
}

pub fn draw_stars<S: Surface + ?Sized>(
    surface: &mut S,
    stars: &[CelestialObject],
    pointer: Option<Point>,
    interaction: &InteractionConfig,
) {
    for star in stars {
        let size = star.pulsed_size(interaction.pulse_amplitude);
        let proximity = pointer
            .map(|p| star.position.distance(p))
            .filter(|d| *d < interaction.star_radius)
            .map(|d| 1.0 - d / interaction.star_radius);

        match proximity {
            Some(strength) => {
                let boosted = size * (1.0 + interaction.size_boost * strength);
                let alpha = star.opacity + interaction.opacity_boost * strength;
                surface.fill_radial_glow(
                    star.position,
                    boosted * interaction.glow_scale,
                    star.color.with_alpha(alpha * strength),
                );
                surface.fill_circle(star.position, boosted, star.color.with_alpha(alpha));
            }
            None => surface.fill_circle(star.position, size, star.color.with_alpha(star.opacity)),
        }
    }
}

/// Body, windows, fins and nozzles around the rocket's center, facing right.
pub fn draw_rocket<S: Surface + ?Sized>(surface: &mut S, rocket: &Rocket) {
    if !rocket.visible() {
        return;
    }

    for particle in &rocket.exhaust {
        surface.fill_circle(particle.position, particle.size, EXHAUST.with_alpha(particle.opacity));
    }

    let s = rocket.size;
    let center = Point::new(rocket.x, rocket.y);
    let half_len = s;
    let half_h = s * 0.3;
    let body_left = center.x - half_len;
    let body_right = center.x + half_len * 0.6;

    // Flame behind the nozzles.
    let flame_tip = Point::new(body_left - s * 0.9, center.y);
    surface.set_glow(s * 0.5, FLAME.with_alpha(0.8));
    surface.fill_polygon(
        &[
            Point::new(body_left - s * 0.2, center.y - half_h * 0.7),
            flame_tip,
            Point::new(body_left - s * 0.2, center.y + half_h * 0.7),
        ],
        FLAME.with_alpha(0.85),
    );
    surface.clear_glow();
    surface.fill_radial_glow(
        Point::new(body_left - s * 0.3, center.y),
        s * 0.35,
        FLAME_CORE.with_alpha(0.9),
    );

    // Engine nozzles.
    for dy in [-half_h * 0.5, half_h * 0.5] {
        surface.fill_rect(
            Point::new(body_left - s * 0.2, center.y + dy - s * 0.08),
            s * 0.2,
            s * 0.16,
            NOZZLE.with_alpha(1.0),
        );
    }

    // Fins.
    for sign in [-1.0, 1.0] {
        surface.fill_polygon(
            &[
                Point::new(body_left + s * 0.5, center.y + sign * half_h),
                Point::new(body_left, center.y + sign * (half_h + s * 0.35)),
                Point::new(body_left, center.y + sign * half_h),
            ],
            NOSE.with_alpha(1.0),
        );
    }

    // Body and its shaded underside.
    surface.fill_rect(
        Point::new(body_left, center.y - half_h),
        body_right - body_left,
        half_h * 2.0,
        HULL.with_alpha(1.0),
    );
    surface.fill_rect(
        Point::new(body_left, center.y + half_h * 0.4),
        body_right - body_left,
        half_h * 0.6,
        HULL_SHADE.with_alpha(1.0),
    );

    // Nose cone.
    surface.fill_polygon(
        &[
            Point::new(body_right, center.y - half_h),
            Point::new(body_right + s * 0.7, center.y),
            Point::new(body_right, center.y + half_h),
        ],
        NOSE.with_alpha(1.0),
    );

    // Windows.
    for offset in [0.0, -s * 0.5] {
        let window = Point::new(center.x + offset, center.y - half_h * 0.1);
        surface.fill_circle(window, s * 0.14, WINDOW_RIM.with_alpha(1.0));
        surface.fill_circle(window, s * 0.1, WINDOW.with_alpha(1.0));
    }
}
