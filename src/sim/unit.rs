//! Enemy units and the formation they fly in
//!
//! A unit oscillates around its formation slot until its health runs out.
//! It then falls out of the formation in flames and, once it has left the
//! playfield's Z range, turns invisible and is reaped by the next sweep.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bounds::Aabb;
use super::bullet::{Aim, AreaFrame, BulletShape, BulletSpawn, Owner};
use super::combat::{Damage, Vitals};
use super::movement::MovementAction;
use super::particles::ParticleEmitter;
use super::pool::{Pool, Poolable};
use super::sprite::{SpriteAnimation, SpriteSheet};
use crate::assets::ModelId;
use crate::consts::{
    POOL_CAPACITY, UNIT_ENERGY, UNIT_HEALTH, UNIT_HEIGHT, UNIT_SPACE_HORIZONTAL, UNIT_SPACE_VERTICAL,
    UNIT_WIDTH,
};
use crate::tuning::{FireParameters, UnitParameters};

slotmap::new_key_type! {
    /// Handle to a unit in the unit pool
    pub struct UnitId;
}

pub type UnitPool = Pool<UnitId, Unit>;

pub fn new_unit_pool() -> UnitPool {
    Pool::new("units", POOL_CAPACITY)
}

/// Per-tick speed gain while falling
pub const FALL_GRAVITY: f32 = 0.02;
/// Roll added per tick while falling (degrees)
pub const FALL_SPIN: f32 = 4.0;
/// Particles thrown out when a unit is destroyed
pub const EXPLOSION_BURST: usize = 24;

const HIT_SPARK_SIZE: f32 = 6.0;
const DESTRUCTION_SIZE: f32 = 14.0;

/// Fire delay multiplier range, redrawn after every shot
const FIRE_JITTER_MIN: f32 = 1.0;
const FIRE_JITTER_MAX: f32 = 2.0;

/// Column and line inside the formation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSlot {
    pub col: u16,
    pub line: u16,
}

impl GridSlot {
    /// Slot of the `index`-th unit in a formation `columns` wide
    pub fn nth(index: u16, columns: u16) -> Self {
        let columns = columns.max(1);
        Self {
            col: index % columns,
            line: index / columns,
        }
    }

    /// Centre of the slot with the whole formation centred on X
    pub fn position(&self, columns: u16, z_offset: f32) -> Vec3 {
        let full_w = UNIT_WIDTH + UNIT_SPACE_HORIZONTAL;
        let full_h = UNIT_HEIGHT + UNIT_SPACE_VERTICAL;
        let mid_x = full_w * columns as f32 / 2.0 - full_w / 2.0;
        Vec3::new(
            full_w * self.col as f32 - mid_x,
            0.0,
            full_h * self.line as f32 - z_offset,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lifecycle {
    Active,
    /// Shot down and dropping out of the formation
    Falling {
        drop: Vec3,
        speed: f32,
        spin: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Unit {
    /// Formation slot position; the oscillation and fall are added on top
    pub base: Vec3,
    pub slot: GridSlot,
    pub vitals: Vitals,
    pub last_shot: f64,
    pub fire_jitter: f32,
    pub action: MovementAction,
    pub lifecycle: Lifecycle,
    visible: bool,
    front_latch: bool,
    pub model: ModelId,
    /// Half extents of the model's collision box
    pub half: Vec3,
    pub hit_flash: Option<SpriteAnimation>,
    pub destruction: Option<SpriteAnimation>,
    pub explosion: ParticleEmitter,
}

impl Poolable for Unit {
    fn is_live(&self) -> bool {
        self.visible
    }
}

impl Unit {
    pub fn new(
        base: Vec3,
        slot: GridSlot,
        model: ModelId,
        half: Vec3,
        now: f64,
        explosion_capacity: usize,
        rng: &mut impl Rng,
    ) -> Self {
        Self {
            base,
            slot,
            vitals: Vitals::new(UNIT_HEALTH, UNIT_ENERGY),
            last_shot: now,
            fire_jitter: rng.random_range(FIRE_JITTER_MIN..FIRE_JITTER_MAX),
            action: MovementAction::new(rng),
            lifecycle: Lifecycle::Active,
            visible: true,
            front_latch: false,
            model,
            half,
            hit_flash: None,
            destruction: None,
            explosion: ParticleEmitter::explosion(explosion_capacity),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Can be hit by player bullets
    pub fn is_targetable(&self) -> bool {
        self.visible && self.is_active()
    }

    pub fn is_front_latched(&self) -> bool {
        self.front_latch
    }

    pub fn position(&self) -> Vec3 {
        let drop = match self.lifecycle {
            Lifecycle::Active => Vec3::ZERO,
            Lifecycle::Falling { drop, .. } => drop,
        };
        self.base + self.action.offset() + drop
    }

    /// Rotation in degrees around (X, Y, Z)
    pub fn rotation(&self) -> Vec3 {
        let spin = match self.lifecycle {
            Lifecycle::Active => 0.0,
            Lifecycle::Falling { spin, .. } => spin,
        };
        self.action.rotation() + Vec3::new(0.0, 0.0, spin)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_local(self.half, self.rotation(), self.position())
    }

    /// Apply a bullet's damage. Returns true when the hit destroyed the unit.
    pub fn take_hit(&mut self, damage: Damage, now: f64, rng: &mut impl Rng) -> bool {
        let destroyed = self.vitals.take(damage, now);
        match &mut self.hit_flash {
            Some(anim) => anim.restart(),
            None => {
                self.hit_flash = Some(SpriteAnimation::new(SpriteSheet::explosion_b(), 0, HIT_SPARK_SIZE, 0.8));
            }
        }
        if destroyed {
            self.start_falling(rng);
        }
        destroyed
    }

    fn start_falling(&mut self, rng: &mut impl Rng) {
        if !self.is_active() {
            return;
        }
        let origin = self.position();
        self.lifecycle = Lifecycle::Falling {
            drop: Vec3::ZERO,
            speed: 0.0,
            spin: 0.0,
        };
        self.destruction = Some(SpriteAnimation::new(
            SpriteSheet::explosion_a(),
            0,
            DESTRUCTION_SIZE,
            1.0,
        ));
        self.explosion.burst(origin, EXPLOSION_BURST, rng);
        log::debug!(
            "[units] unit at col {} line {} destroyed",
            self.slot.col,
            self.slot.line
        );
    }

    /// Advance one tick of motion. Returns true when this tick took a falling
    /// unit out of the frame.
    pub fn advance(&mut self, frame: &AreaFrame, rng: &mut impl Rng) -> bool {
        if !self.visible {
            return false;
        }
        if let Lifecycle::Falling { drop, speed, spin } = &mut self.lifecycle {
            *speed += FALL_GRAVITY;
            *drop += Vec3::new(0.0, -0.5 * *speed, *speed);
            *spin += FALL_SPIN;
        } else {
            // Drained units drift at half speed
            let factor = 0.5 + 0.5 * self.vitals.energy_ratio();
            self.action.iterate(factor, rng);
            return false;
        }
        if frame.contains_z(self.position().z) {
            return false;
        }
        self.visible = false;
        true
    }

    /// Step animations and particles
    pub fn update_effects(&mut self, dt: f32, rng: &mut impl Rng) {
        for anim in [&mut self.hit_flash, &mut self.destruction].into_iter().flatten() {
            anim.advance();
        }
        if !self.is_active() && self.visible {
            let heading = Vec3::new(0.0, -0.5, 1.0).normalize();
            self.explosion.emit(self.position(), heading, dt, rng);
        }
        self.explosion.update(dt);
    }

    /// Whether the fire cooldown has elapsed for a front-row unit
    pub fn ready_to_fire(&self, now: f64, delay: f32) -> bool {
        self.is_targetable() && self.front_latch && (now - self.last_shot) as f32 >= delay * self.fire_jitter
    }

    /// Fire at `target`, restarting the cooldown with a fresh jitter
    pub fn fire(&mut self, target: Vec3, fire: &FireParameters, now: f64, rng: &mut impl Rng) -> BulletSpawn {
        self.last_shot = now;
        self.fire_jitter = rng.random_range(FIRE_JITTER_MIN..FIRE_JITTER_MAX);
        BulletSpawn {
            owner: Owner::Unit,
            position: self.position() + Vec3::new(0.0, 0.0, self.half.z),
            aim: Aim::Target(target),
            shape: BulletShape::default(),
            damage: fire.damage(),
            speed: fire.bullet_init_speed,
            acceleration: fire.bullet_acceleration,
        }
    }
}

/// Add a unit to the pool
pub fn spawn_unit(pool: &mut UnitPool, unit: Unit) -> Option<UnitId> {
    let slot = unit.slot;
    let id = pool.spawn(unit)?;
    log::debug!("[units] unit spawned at col {} line {}", slot.col, slot.line);
    Some(id)
}

/// Lay out a level's formation, `max_col` units per line.
///
/// The count is capped to `max_col * max_ln` when a line limit is given.
pub fn spawn_unit_formation(
    pool: &mut UnitPool,
    params: &UnitParameters,
    half: Vec3,
    now: f64,
    explosion_capacity: usize,
    rng: &mut impl Rng,
) -> Vec<UnitId> {
    let columns = u16::from(params.max_col.max(1));
    let count = if params.max_ln > 0 {
        params.count.min(columns * u16::from(params.max_ln))
    } else {
        params.count
    };
    let mut ids = Vec::with_capacity(count as usize);
    for index in 0..count {
        let slot = GridSlot::nth(index, columns);
        let base = slot.position(columns, params.z_offset);
        let unit = Unit::new(base, slot, params.model, half, now, explosion_capacity, rng);
        if let Some(id) = spawn_unit(pool, unit) {
            ids.push(id);
        }
    }
    log::info!("[units] formation of {} units spawned", ids.len());
    ids
}

/// Latch every active unit that has no active unit ahead of it in its column.
///
/// The latch is one-way: once a unit is cleared to fire it keeps firing even
/// if units move back in front of it.
pub fn update_front_latches(pool: &mut UnitPool) {
    let mut front: Vec<Option<u16>> = Vec::new();
    for unit in pool.iter().filter(|u| u.is_targetable()) {
        let col = unit.slot.col as usize;
        if front.len() <= col {
            front.resize(col + 1, None);
        }
        let line = unit.slot.line;
        front[col] = Some(front[col].map_or(line, |l| l.max(line)));
    }
    for unit in pool.iter_mut() {
        if unit.front_latch || !unit.is_targetable() {
            continue;
        }
        if front.get(unit.slot.col as usize).copied().flatten() == Some(unit.slot.line) {
            unit.front_latch = true;
            log::trace!("[units] col {} line {} cleared to fire", unit.slot.col, unit.slot.line);
        }
    }
}
