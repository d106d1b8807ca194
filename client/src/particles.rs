//! Decorative particle background with its own animation clock

use crate::config::{PARTICLE_COUNT, PARTICLE_MARGIN};
use crate::rendering::{GlowStop, Surface};
use log::debug;
use macroquad::color::{hsl_to_rgb, Color};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Minimum spawn area, used before the canvas has real dimensions
const MIN_SPAWN_WIDTH: f32 = 300.0;
const MIN_SPAWN_HEIGHT: f32 = 200.0;
const MAX_SPEED: f32 = 0.35;
const GLOW_SCALE: f32 = 9.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    /// Degrees
    pub hue: f32,
    pub alpha: f32,
}

impl Particle {
    /// Moves one tick, wrapping around the margin box toroidally.
    fn advance(&mut self, width: f32, height: f32) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < -PARTICLE_MARGIN {
            self.x = width + PARTICLE_MARGIN;
        }
        if self.x > width + PARTICLE_MARGIN {
            self.x = -PARTICLE_MARGIN;
        }
        if self.y < -PARTICLE_MARGIN {
            self.y = height + PARTICLE_MARGIN;
        }
        if self.y > height + PARTICLE_MARGIN {
            self.y = -PARTICLE_MARGIN;
        }
    }

    fn color(&self) -> Color {
        let mut color = hsl_to_rgb(self.hue / 360.0, 0.9, 0.6);
        color.a = self.alpha;
        color
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    count: usize,
    width: u32,
    height: u32,
    rng: StdRng,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::with_rng(PARTICLE_COUNT, StdRng::from_entropy())
    }

    pub fn with_seed(count: usize, seed: u64) -> Self {
        Self::with_rng(count, StdRng::seed_from_u64(seed))
    }

    fn with_rng(count: usize, rng: StdRng) -> Self {
        let mut field = Self {
            particles: Vec::with_capacity(count),
            count,
            width: 0,
            height: 0,
            rng,
        };
        field.regenerate();
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Tracks the canvas dimensions, regenerating every particle when they change.
    pub fn sync_size(&mut self, width: u32, height: u32) -> bool {
        if (width, height) == (self.width, self.height) {
            return false;
        }

        debug!("Particle field resized to {}x{}", width, height);
        self.width = width;
        self.height = height;
        self.regenerate();
        true
    }

    pub fn step(&mut self) {
        let (width, height) = (self.width as f32, self.height as f32);
        for particle in &mut self.particles {
            particle.advance(width, height);
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(Color::new(0.0, 0.0, 0.0, 0.0));
        for particle in &self.particles {
            let color = particle.color();
            surface.radial_glow(
                particle.x,
                particle.y,
                particle.radius * GLOW_SCALE,
                &[
                    GlowStop::new(0.0, color),
                    GlowStop::new(1.0, Color::new(0.0, 0.0, 0.0, 0.0)),
                ],
            );
        }
    }

    fn regenerate(&mut self) {
        let spawn_w = (self.width as f32).max(MIN_SPAWN_WIDTH);
        let spawn_h = (self.height as f32).max(MIN_SPAWN_HEIGHT);
        let rng = &mut self.rng;

        self.particles = (0..self.count)
            .map(|_| Particle {
                x: rng.gen::<f32>() * spawn_w,
                y: rng.gen::<f32>() * spawn_h,
                vx: rng.gen_range(-MAX_SPEED..MAX_SPEED),
                vy: rng.gen_range(-MAX_SPEED..MAX_SPEED),
                radius: rng.gen_range(1.0..4.0),
                hue: rng.gen_range(170.0..290.0),
                alpha: rng.gen_range(0.06..0.18),
            })
            .collect();
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::HeadlessSurface;
    use assert_approx_eq::assert_approx_eq;

    fn particle(x: f32, y: f32, vx: f32, vy: f32) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            radius: 2.0,
            hue: 200.0,
            alpha: 0.1,
        }
    }

    #[test]
    fn test_field_has_fixed_count() {
        let field = ParticleField::with_seed(40, 7);
        assert_eq!(field.particles().len(), 40);
    }

    #[test]
    fn test_generated_ranges() {
        let mut field = ParticleField::with_seed(200, 11);
        field.sync_size(600, 400);

        for p in field.particles() {
            assert!((0.0..600.0).contains(&p.x));
            assert!((0.0..400.0).contains(&p.y));
            assert!(p.vx.abs() <= MAX_SPEED && p.vy.abs() <= MAX_SPEED);
            assert!((1.0..4.0).contains(&p.radius));
            assert!((170.0..290.0).contains(&p.hue));
            assert!((0.06..0.18).contains(&p.alpha));
        }
    }

    #[test]
    fn test_wrap_right_edge_to_left() {
        let mut p = particle(620.5, 50.0, 0.3, 0.0);
        p.advance(600.0, 400.0);
        assert_approx_eq!(p.x, -PARTICLE_MARGIN, 1e-6);
    }

    #[test]
    fn test_wrap_top_edge_to_bottom() {
        let mut p = particle(50.0, -19.9, 0.0, -0.2);
        p.advance(600.0, 400.0);
        assert_approx_eq!(p.y, 400.0 + PARTICLE_MARGIN, 1e-6);
    }

    #[test]
    fn test_inside_margin_does_not_wrap() {
        let mut p = particle(-10.0, 410.0, -0.1, 0.1);
        p.advance(600.0, 400.0);
        assert_approx_eq!(p.x, -10.1, 1e-5);
        assert_approx_eq!(p.y, 410.1, 1e-4);
    }

    #[test]
    fn test_regenerates_only_on_size_change() {
        let mut field = ParticleField::with_seed(10, 3);
        assert!(field.sync_size(300, 300));
        let before = field.particles().to_vec();

        assert!(!field.sync_size(300, 300));
        assert_eq!(field.particles(), before.as_slice());

        assert!(field.sync_size(320, 300));
        assert_ne!(field.particles(), before.as_slice());
        assert_eq!(field.size(), (320, 300));
    }

    #[test]
    fn test_step_moves_every_particle() {
        let mut field = ParticleField::with_seed(5, 9);
        field.sync_size(500, 500);
        let before = field.particles().to_vec();
        field.step();

        for (old, new) in before.iter().zip(field.particles()) {
            assert_approx_eq!(new.x, old.x + old.vx, 1e-4);
        }
    }

    #[test]
    fn test_draw_emits_one_glow_per_particle() {
        let field = ParticleField::with_seed(12, 5);
        let mut surface = HeadlessSurface::new();
        field.draw(&mut surface);
        assert_eq!(surface.draw_calls, 13);
    }
}
