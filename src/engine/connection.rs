use crate::engine::config::LinkConfig;
use crate::engine::object::CelestialObject;
use crate::geometry::{Point, Viewport};

/// A constellation line between two stars, `a < b` indexing the star list.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub base_opacity: f64,
    pub highlighted: bool,
}

impl Connection {
    pub fn endpoints(&self, stars: &[CelestialObject]) -> Option<(Point, Point)> {
        let from = stars.get(self.a)?.position;
        let to = stars.get(self.b)?.position;
        Some((from, to))
    }

    /// Highlighted when the pointer lies within `radius` of the midpoint.
    pub fn update_highlight(&mut self, stars: &[CelestialObject], pointer: Option<Point>, radius: f64) {
        self.highlighted = match (pointer, self.endpoints(stars)) {
            (Some(pointer), Some((from, to))) => from.midpoint(to).distance(pointer) < radius,
            _ => false,
        };
    }
}

/// Upper bound on grid columns and rows; cells grow past `threshold` beyond it.
const MAX_GRID_SIDE: usize = 256;

/// Star indices bucketed into cells at least `threshold` wide, so a star can
/// only link to stars in its own or the eight surrounding cells.
struct StarGrid {
    cols: usize,
    rows: usize,
    cell_w: f64,
    cell_h: f64,
    cells: Vec<Vec<usize>>,
}

impl StarGrid {
    fn new(stars: &[CelestialObject], viewport: Viewport, threshold: f64) -> Self {
        let cell_w = threshold.max(viewport.width() / MAX_GRID_SIDE as f64);
        let cell_h = threshold.max(viewport.height() / MAX_GRID_SIDE as f64);
        let cols = ((viewport.width() / cell_w).ceil() as usize).max(1);
        let rows = ((viewport.height() / cell_h).ceil() as usize).max(1);

        let mut grid = Self {
            cols,
            rows,
            cell_w,
            cell_h,
            cells: vec![Vec::new(); cols * rows],
        };
        for (index, star) in stars.iter().enumerate() {
            let (col, row) = grid.cell_of(star.position);
            grid.cells[row * cols + col].push(index);
        }
        grid
    }

    fn cell_of(&self, position: Point) -> (usize, usize) {
        fn bucket(value: f64, size: f64, count: usize) -> usize {
            let index = (value / size).floor();
            if index.is_nan() || index < 0.0 {
                0
            } else {
                (index as usize).min(count - 1)
            }
        }
        (
            bucket(position.x, self.cell_w, self.cols),
            bucket(position.y, self.cell_h, self.rows),
        )
    }

    /// Fills `out` with the indices above `a` in the 3x3 block around `a`, ascending.
    fn later_neighbours(&self, a: usize, position: Point, out: &mut Vec<usize>) {
        out.clear();
        let (col, row) = self.cell_of(position);
        for r in row.saturating_sub(1)..=(row + 1).min(self.rows - 1) {
            for c in col.saturating_sub(1)..=(col + 1).min(self.cols - 1) {
                out.extend(self.cells[r * self.cols + c].iter().copied().filter(|&b| b > a));
            }
        }
        out.sort_unstable();
    }
}

struct LinkScan {
    connections: Vec<Connection>,
    pairs_checked: usize,
}

/// Links nearby stars in index order. A star stops gaining links at
/// `per_star_cap` and generation stops once `budget` links exist.
pub fn derive_connections(
    stars: &[CelestialObject],
    links: &LinkConfig,
    viewport: Viewport,
) -> Vec<Connection> {
    scan_links(stars, links, viewport).connections
}

fn scan_links(stars: &[CelestialObject], links: &LinkConfig, viewport: Viewport) -> LinkScan {
    let threshold = links.threshold_ratio * viewport.width();
    let mut scan = LinkScan {
        connections: Vec::new(),
        pairs_checked: 0,
    };
    if stars.len() < 2 || !(threshold > 0.0) || links.per_star_cap == 0 || links.budget == 0 {
        return scan;
    }

    let grid = StarGrid::new(stars, viewport, threshold);
    let mut degree = vec![0usize; stars.len()];
    let mut candidates = Vec::new();
    for a in 0..stars.len() {
        if degree[a] >= links.per_star_cap {
            continue;
        }
        grid.later_neighbours(a, stars[a].position, &mut candidates);

        for &b in &candidates {
            if degree[a] >= links.per_star_cap {
                break;
            }
            if degree[b] >= links.per_star_cap {
                continue;
            }

            scan.pairs_checked += 1;
            let distance = stars[a].position.distance(stars[b].position);
            if distance >= threshold {
                continue;
            }

            scan.connections.push(Connection {
                a,
                b,
                base_opacity: links.max_opacity * (1.0 - distance / threshold),
                highlighted: false,
            });
            degree[a] += 1;
            degree[b] += 1;

            if scan.connections.len() >= links.budget {
                return scan;
            }
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::EngineConfig;
    use crate::engine::object::{generate_layer, ObjectKind};
    use crate::geometry::Rgb;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn star_at(x: f64, y: f64) -> CelestialObject {
        CelestialObject {
            position: Point::new(x, y),
            size: 1.0,
            opacity: 1.0,
            pulse_phase: 0.0,
            pulse_speed: 0.01,
            color: Rgb::WHITE,
            kind: ObjectKind::Star,
        }
    }

    fn degrees(connections: &[Connection], len: usize) -> Vec<usize> {
        let mut degree = vec![0; len];
        for c in connections {
            degree[c.a] += 1;
            degree[c.b] += 1;
        }
        degree
    }

    #[test]
    fn random_fields_respect_invariants() {
        let config = EngineConfig::starfield();
        let viewport = Viewport::new(1600.0, 900.0).expect("valid viewport");
        let threshold = config.links.threshold_ratio * viewport.width();

        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let stars = generate_layer(&mut rng, &config.stars, ObjectKind::Star, viewport);
            let connections = derive_connections(&stars, &config.links, viewport);

            assert!(connections.len() <= config.links.budget);
            let mut pairs = HashSet::new();
            for c in &connections {
                assert!(c.a < c.b, "self loop or unordered pair {:?}", c);
                assert!(pairs.insert((c.a, c.b)), "duplicate pair {:?}", c);
                assert!(stars[c.a].position.distance(stars[c.b].position) < threshold);
                assert!(c.base_opacity > 0.0 && c.base_opacity <= config.links.max_opacity);
                assert!(!c.highlighted);
            }
            for degree in degrees(&connections, stars.len()) {
                assert!(degree <= config.links.per_star_cap);
            }
        }
    }

    #[test]
    fn closer_pairs_are_more_opaque() {
        let viewport = Viewport::new(1000.0, 1000.0).expect("valid viewport");
        let stars = vec![star_at(0.0, 0.0), star_at(10.0, 0.0), star_at(500.0, 500.0), star_at(600.0, 500.0)];
        let connections = derive_connections(&stars, &LinkConfig::default(), viewport);

        assert_eq!(connections.len(), 2);
        assert_eq!((connections[0].a, connections[0].b), (0, 1));
        assert_eq!((connections[1].a, connections[1].b), (2, 3));
        assert!(connections[0].base_opacity > connections[1].base_opacity);
    }

    #[test]
    fn cap_and_budget_bound_dense_clusters() {
        let viewport = Viewport::new(1000.0, 1000.0).expect("valid viewport");
        let stars: Vec<_> = (0..20).map(|i| star_at(i as f64, 0.0)).collect();

        let links = LinkConfig {
            per_star_cap: 2,
            budget: 1_000,
            ..LinkConfig::default()
        };
        let connections = derive_connections(&stars, &links, viewport);
        assert!(degrees(&connections, stars.len()).iter().all(|d| *d <= 2));

        let links = LinkConfig {
            budget: 5,
            ..LinkConfig::default()
        };
        assert_eq!(derive_connections(&stars, &links, viewport).len(), 5);
    }

    /// Plain all-pairs scan in index order.
    fn all_pairs(stars: &[CelestialObject], links: &LinkConfig, viewport: Viewport) -> Vec<Connection> {
        let threshold = links.threshold_ratio * viewport.width();
        let mut degree = vec![0; stars.len()];
        let mut connections = Vec::new();
        for a in 0..stars.len() {
            for b in (a + 1)..stars.len() {
                if degree[a] >= links.per_star_cap || connections.len() >= links.budget {
                    break;
                }
                let distance = stars[a].position.distance(stars[b].position);
                if degree[b] < links.per_star_cap && distance < threshold {
                    connections.push(Connection {
                        a,
                        b,
                        base_opacity: links.max_opacity * (1.0 - distance / threshold),
                        highlighted: false,
                    });
                    degree[a] += 1;
                    degree[b] += 1;
                }
            }
        }
        connections
    }

    #[test]
    fn grid_scan_matches_all_pairs() {
        let viewport = Viewport::new(1280.0, 720.0).expect("valid viewport");
        for config in EngineConfig::all_presets() {
            for seed in 0..6 {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let stars = generate_layer(&mut rng, &config.stars, ObjectKind::Star, viewport);
                assert_eq!(
                    derive_connections(&stars, &config.links, viewport),
                    all_pairs(&stars, &config.links, viewport),
                    "preset {} seed {}",
                    config.name,
                    seed
                );
            }
        }
    }

    #[test]
    fn sparse_field_skips_distant_pairs() {
        let viewport = Viewport::new(1000.0, 1000.0).expect("valid viewport");
        let stars: Vec<_> = (0..180)
            .map(|i| star_at(30.0 + (i % 15) as f64 * 60.0, 30.0 + (i / 15) as f64 * 60.0))
            .collect();
        let links = LinkConfig {
            threshold_ratio: 0.01,
            ..LinkConfig::default()
        };

        let scan = scan_links(&stars, &links, viewport);
        assert!(scan.connections.is_empty());
        assert_eq!(scan.pairs_checked, 0);

        // Linked rows still only compare stars in the surrounding 3x3 cells.
        let links = LinkConfig {
            threshold_ratio: 0.07,
            ..LinkConfig::default()
        };
        let scan = scan_links(&stars, &links, viewport);
        assert!(!scan.connections.is_empty());
        assert!(scan.pairs_checked <= stars.len() * 15);
    }

    #[test]
    fn stars_outside_viewport_are_bucketed_at_the_edge() {
        let viewport = Viewport::new(1000.0, 1000.0).expect("valid viewport");
        let stars = vec![star_at(-40.0, -40.0), star_at(-10.0, -30.0), star_at(1020.0, 1000.0)];
        let connections = derive_connections(&stars, &LinkConfig::default(), viewport);
        assert_eq!(connections.len(), 1);
        assert_eq!((connections[0].a, connections[0].b), (0, 1));
    }

    #[test]
    fn far_apart_stars_stay_unlinked() {
        let viewport = Viewport::new(800.0, 600.0).expect("valid viewport");
        let stars = vec![star_at(0.0, 0.0), star_at(790.0, 590.0)];
        assert!(derive_connections(&stars, &LinkConfig::default(), viewport).is_empty());
    }

    #[test]
    fn highlight_follows_midpoint_distance() {
        let stars = vec![star_at(0.0, 0.0), star_at(100.0, 0.0)];
        let mut connection = Connection {
            a: 0,
            b: 1,
            base_opacity: 0.2,
            highlighted: false,
        };

        connection.update_highlight(&stars, Some(Point::new(50.0, 100.0)), 150.0);
        assert!(connection.highlighted);
        connection.update_highlight(&stars, Some(Point::new(50.0, 400.0)), 150.0);
        assert!(!connection.highlighted);
        connection.update_highlight(&stars, None, 150.0);
        assert!(!connection.highlighted);
    }
}
