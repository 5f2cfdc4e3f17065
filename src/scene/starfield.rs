use crate::scene::camera::OrbitCamera;
use eframe::egui::{Color32, Painter, Rect};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub position: Vec3,
    pub size: f32,
    pub brightness: f32,
}

/// Background stars scattered through a spherical shell around the origin.
#[derive(Debug, Clone, Default)]
pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    pub fn generate(count: usize, radius: f32, depth: f32, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| {
                // Uniform direction via normalized z and azimuth.
                let z: f32 = rng.gen_range(-1.0..=1.0);
                let theta: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
                let ring = (1.0 - z * z).sqrt();
                let distance = radius + rng.gen_range(0.0..=depth.max(0.0));
                Star {
                    position: Vec3::new(ring * theta.cos(), z, ring * theta.sin()) * distance,
                    size: rng.gen_range(0.5..=1.6),
                    brightness: rng.gen_range(0.35..=1.0),
                }
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn paint(&self, painter: &Painter, camera: &OrbitCamera, viewport: Rect) {
        for star in &self.stars {
            let Some(projected) = camera.project(star.position, viewport) else {
                continue;
            };
            if !viewport.contains(projected.pos) {
                continue;
            }
            // Far stars fade out.
            let fade = (120.0 / projected.depth).clamp(0.3, 1.0);
            let level = (255.0 * star.brightness * fade) as u8;
            painter.circle_filled(
                projected.pos,
                star.size,
                Color32::from_rgba_unmultiplied(level, level, level, level),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Starfield;

    #[test]
    fn stars_stay_inside_the_shell() {
        let field = Starfield::generate(500, 100.0, 50.0, 7);
        assert_eq!(field.len(), 500);
        for star in field.stars() {
            let distance = star.position.length();
            assert!((99.9..=150.1).contains(&distance), "distance {distance}");
        }
    }

    #[test]
    fn same_seed_gives_same_sky() {
        let a = Starfield::generate(32, 100.0, 50.0, 42);
        let b = Starfield::generate(32, 100.0, 50.0, 42);
        let c = Starfield::generate(32, 100.0, 50.0, 43);
        assert_eq!(a.stars(), b.stars());
        assert_ne!(a.stars(), c.stars());
    }
}
