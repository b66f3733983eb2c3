//! Fixed-capacity particle emitters
//!
//! Trails follow bullets, explosions burst from destroyed units. Spawning is
//! driven by an accumulator so the particle cadence does not depend on the
//! frame rate, and dead particles are compacted out in place with the
//! survivors keeping their order.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::renderer::{BillboardBatch, BillboardInstance, BlendMode, Camera};

/// Particle flavour, decides growth and blending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Trail,
    Fire,
    Smoke,
    Spark,
}

impl ParticleKind {
    pub fn blend(&self) -> BlendMode {
        match self {
            ParticleKind::Smoke => BlendMode::Alpha,
            ParticleKind::Trail | ParticleKind::Fire | ParticleKind::Spark => BlendMode::Additive,
        }
    }

    /// Peak alpha at full life
    fn max_alpha(&self) -> f32 {
        match self {
            ParticleKind::Smoke => 160.0,
            _ => 220.0,
        }
    }

    fn color(&self) -> [u8; 4] {
        match self {
            ParticleKind::Trail => [255, 230, 120, 255],
            ParticleKind::Fire => [255, 150, 60, 255],
            ParticleKind::Smoke => [90, 90, 95, 255],
            ParticleKind::Spark => [255, 245, 210, 255],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub size: f32,
    /// Degrees
    pub rotation: f32,
    pub life: f32,
    pub ttl: f32,
    pub color: [u8; 4],
    pub kind: ParticleKind,
}

impl Particle {
    /// Remaining life as a fraction of time-to-live
    pub fn life_fraction(&self) -> f32 {
        if self.ttl > 0.0 {
            (self.life / self.ttl).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Emitter tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub kind: ParticleKind,
    /// Particles per second for continuous emission
    pub spawn_rate: f32,
    pub base_size: f32,
    /// Size change per second
    pub grow: f32,
    /// Velocity multiplier applied every update
    pub damping: f32,
    pub speed: f32,
    pub jitter: f32,
    pub ttl_min: f32,
    pub ttl_max: f32,
    pub base_color: [u8; 4],
}

impl EmitterConfig {
    pub fn trail() -> Self {
        Self {
            kind: ParticleKind::Trail,
            spawn_rate: 60.0,
            base_size: 1.5,
            grow: 1.5,
            damping: 0.92,
            speed: 2.2,
            jitter: 0.25,
            ttl_min: 0.35,
            ttl_max: 0.55,
            base_color: ParticleKind::Trail.color(),
        }
    }

    pub fn explosion() -> Self {
        Self {
            kind: ParticleKind::Fire,
            spawn_rate: 90.0,
            base_size: 2.5,
            grow: 2.0,
            damping: 0.9,
            speed: 6.0,
            jitter: 0.5,
            ttl_min: 0.5,
            ttl_max: 1.2,
            base_color: ParticleKind::Fire.color(),
        }
    }
}

/// A recyclable particle buffer owned by one entity
#[derive(Debug, Clone)]
pub struct ParticleEmitter {
    pub config: EmitterConfig,
    particles: Vec<Particle>,
    capacity: usize,
    accum: f32,
}

impl ParticleEmitter {
    pub fn new(config: EmitterConfig, capacity: usize) -> Self {
        Self {
            config,
            particles: Vec::new(),
            capacity,
            accum: 0.0,
        }
    }

    pub fn trail(capacity: usize) -> Self {
        Self::new(EmitterConfig::trail(), capacity)
    }

    pub fn explosion(capacity: usize) -> Self {
        Self::new(EmitterConfig::explosion(), capacity)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn has_room(&self) -> bool {
        self.particles.len() < self.capacity
    }

    /// Continuous emission trailing behind `direction`
    pub fn emit(&mut self, origin: Vec3, direction: Vec3, dt: f32, rng: &mut impl Rng) {
        self.accum += self.config.spawn_rate * dt;
        while self.accum >= 1.0 && self.has_room() {
            let j = self.config.jitter;
            let jitter = Vec3::new(
                rng.random_range(-j..=j),
                rng.random_range(-j..=j),
                rng.random_range(-j..=j),
            );
            let vel = direction * -self.config.speed + jitter;
            let particle = self.spawn(self.config.kind, origin, vel, rng);
            self.particles.push(particle);
            self.accum -= 1.0;
        }
        if !self.has_room() {
            // Do not bank spawns while saturated
            self.accum = self.accum.min(1.0);
        }
    }

    /// Radial burst of fire, smoke and sparks
    pub fn burst(&mut self, origin: Vec3, count: usize, rng: &mut impl Rng) {
        for i in 0..count {
            if !self.has_room() {
                break;
            }
            let kind = match i % 3 {
                0 => ParticleKind::Fire,
                1 => ParticleKind::Smoke,
                _ => ParticleKind::Spark,
            };
            let dir = Vec3::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(0.0..=1.0),
                rng.random_range(-1.0..=1.0),
            )
            .normalize_or(Vec3::Y);
            let speed = match kind {
                ParticleKind::Spark => self.config.speed * rng.random_range(1.0..1.8),
                ParticleKind::Smoke => self.config.speed * rng.random_range(0.2..0.5),
                _ => self.config.speed * rng.random_range(0.5..1.0),
            };
            let particle = self.spawn(kind, origin, dir * speed, rng);
            self.particles.push(particle);
        }
    }

    fn spawn(&self, kind: ParticleKind, origin: Vec3, vel: Vec3, rng: &mut impl Rng) -> Particle {
        let ttl = rng.random_range(self.config.ttl_min..=self.config.ttl_max);
        let color = if kind == self.config.kind {
            self.config.base_color
        } else {
            kind.color()
        };
        Particle {
            pos: origin,
            vel,
            size: self.config.base_size * rng.random_range(0.9..=1.2),
            rotation: rng.random_range(0.0..360.0),
            life: ttl,
            ttl,
            color,
            kind,
        }
    }

    /// Integrate, age and fade; dead particles are compacted out
    pub fn update(&mut self, dt: f32) {
        let config = self.config;
        self.particles.retain_mut(|p| {
            p.pos += p.vel * dt;
            p.vel *= config.damping;
            match p.kind {
                ParticleKind::Trail | ParticleKind::Fire => p.size += config.grow * dt,
                ParticleKind::Smoke => p.size += config.grow * 2.0 * dt,
                ParticleKind::Spark => p.size = (p.size - config.grow * dt).max(0.05),
            }
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            p.color[3] = (p.kind.max_alpha() * p.life_fraction()) as u8;
            true
        });
    }

    /// Push a camera-facing billboard for every live particle
    pub fn draw(&self, camera: &Camera, batch: &mut BillboardBatch) {
        if self.particles.is_empty() {
            return;
        }
        let axes = camera.billboard_axes();
        for p in &self.particles {
            batch.push(
                p.kind.blend(),
                BillboardInstance::new(axes, p.pos, p.size, p.rotation, p.color),
            );
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.accum = 0.0;
    }
}
