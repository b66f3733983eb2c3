//! Bullets and the bullet pool
//!
//! Bullet speeds are per tick. A bullet moves along its direction, gains
//! `acceleration` each tick and is flagged dead once it leaves the Z range of
//! the playfield; the pool sweep removes it on the following frame.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bounds::Aabb;
use super::combat::Damage;
use super::particles::ParticleEmitter;
use super::pool::{Pool, Poolable};
use crate::consts::{FRAME_BOTTOM, FRAME_TOP, POOL_CAPACITY};

slotmap::new_key_type! {
    /// Handle to a bullet in the bullet pool
    pub struct BulletId;
}

pub type BulletPool = Pool<BulletId, Bullet>;

pub fn new_bullet_pool() -> BulletPool {
    Pool::new("bullets", POOL_CAPACITY)
}

/// Direction of travel toward the enemy formation
pub const UP: Vec3 = Vec3::NEG_Z;
/// Direction of travel toward the player
pub const DOWN: Vec3 = Vec3::Z;

/// Who fired a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Unit,
}

/// Z range bullets may occupy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaFrame {
    pub top: f32,
    pub bottom: f32,
}

impl Default for AreaFrame {
    fn default() -> Self {
        Self {
            top: FRAME_TOP,
            bottom: FRAME_BOTTOM,
        }
    }
}

impl AreaFrame {
    pub fn contains_z(&self, z: f32) -> bool {
        z >= self.top && z <= self.bottom
    }
}

/// Collision and render shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletShape {
    pub half: Vec3,
    pub radius_top: f32,
    pub radius_bottom: f32,
    /// Cylinder slices for rendering
    pub slices: u8,
}

impl BulletShape {
    /// Shape from full box sizes with the default tapered radii
    pub fn new(by_x: f32, by_y: f32, by_z: f32) -> Self {
        Self {
            half: Vec3::new(by_x, by_y, by_z) * 0.5,
            radius_top: 0.1,
            radius_bottom: 0.5,
            slices: 5,
        }
    }

    /// Radius used for bullet-vs-bullet tests: the larger radius, or half the
    /// largest planar extent when the shape has no radii
    pub fn effective_radius(&self) -> f32 {
        let r = self.radius_top.max(self.radius_bottom);
        if r > 0.0 {
            r
        } else {
            self.half.x.max(self.half.z)
        }
    }
}

impl Default for BulletShape {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletMotion {
    /// Unit vector
    pub direction: Vec3,
    pub speed: f32,
    pub acceleration: f32,
    /// Yaw in degrees derived from the direction
    pub angle: f32,
}

impl BulletMotion {
    pub fn new(direction: Vec3, speed: f32, acceleration: f32) -> Self {
        let direction = direction.normalize_or(UP);
        Self {
            direction,
            speed,
            acceleration,
            angle: direction.x.atan2(direction.z).to_degrees(),
        }
    }
}

/// Where a bullet heads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aim {
    Direction(Vec3),
    /// Fly straight at a point (flattened onto the XZ plane)
    Target(Vec3),
}

/// Everything needed to fire a bullet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletSpawn {
    pub owner: Owner,
    pub position: Vec3,
    pub aim: Aim,
    pub shape: BulletShape,
    pub damage: Damage,
    pub speed: f32,
    pub acceleration: f32,
}

impl BulletSpawn {
    fn direction(&self) -> Vec3 {
        match self.aim {
            Aim::Direction(dir) => dir,
            Aim::Target(target) => {
                let d = target - self.position;
                Vec3::new(d.x, 0.0, d.z)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bullet {
    pub pos: Vec3,
    pub motion: BulletMotion,
    pub shape: BulletShape,
    pub owner: Owner,
    pub damage: Damage,
    alive: bool,
    pub trail: ParticleEmitter,
}

impl Poolable for Bullet {
    fn is_live(&self) -> bool {
        self.alive
    }
}

impl Bullet {
    pub fn new(spawn: &BulletSpawn, trail_capacity: usize) -> Self {
        Self {
            pos: spawn.position,
            motion: BulletMotion::new(spawn.direction(), spawn.speed, spawn.acceleration),
            shape: spawn.shape,
            owner: spawn.owner,
            damage: spawn.damage,
            alive: true,
            trail: ParticleEmitter::trail(trail_capacity),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Flag for removal; returns false if it was already dead
    pub fn kill(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    /// Move one tick. Returns true when this tick took the bullet out of the
    /// frame.
    pub fn advance(&mut self, frame: &AreaFrame) -> bool {
        if !self.alive {
            return false;
        }
        self.pos += self.motion.direction * self.motion.speed;
        self.motion.speed += self.motion.acceleration;
        if self.pos.z < frame.top || self.pos.z > frame.bottom {
            return self.kill();
        }
        false
    }

    /// Emit and age the trail
    pub fn update_trail(&mut self, dt: f32, rng: &mut impl Rng) {
        if self.alive {
            self.trail.emit(self.pos, self.motion.direction, dt, rng);
        }
        self.trail.update(dt);
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_local(self.shape.half, Vec3::new(0.0, self.motion.angle, 0.0), self.pos)
    }

    pub fn effective_radius(&self) -> f32 {
        self.shape.effective_radius()
    }
}

/// Fire a bullet into the pool; `None` if the pool refused it
pub fn spawn_bullet(pool: &mut BulletPool, spawn: &BulletSpawn, trail_capacity: usize) -> Option<BulletId> {
    let id = pool.spawn(Bullet::new(spawn, trail_capacity))?;
    log::debug!(
        "[bullets] {:?} bullet spawned at {:.2}, {:.2}, {:.2}",
        spawn.owner,
        spawn.position.x,
        spawn.position.y,
        spawn.position.z
    );
    Some(id)
}
