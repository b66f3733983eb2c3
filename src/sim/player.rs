//! The player's ship
//!
//! Holding a direction accelerates the ship in small steps; letting go, or
//! switching direction, drops it back to the initial speed. The ship banks
//! while it moves and levels out once the keys are released.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bounds::Aabb;
use super::bullet::{Aim, BulletShape, BulletSpawn, Owner, UP};
use super::combat::{Damage, Vitals};
use super::movement::AxisDirection;
use crate::approach_zero;
use crate::assets::ModelId;
use crate::consts::{PLAYER_ENERGY, PLAYER_HEALTH, PLAYER_MAX_X, PLAYER_MAX_Z, PLAYER_OFFSET_Z};
use crate::tuning::FireParameters;

/// Key presses further apart than this restart the acceleration
pub const ACCELERATION_DELAY: f64 = 0.2;
pub const ACCELERATION_INIT: f32 = 0.1;
pub const ACCELERATION_STEP: f32 = 0.05;
pub const ACCELERATION_MAX: f32 = 1.0;

/// Banking limits and per-tick steps (degrees)
pub const MAX_ROTATE_X: f32 = 15.0;
pub const MAX_ROTATE_Z: f32 = 35.0;
pub const STEP_ROTATE_X: f32 = 1.0;
pub const STEP_ROTATE_Z: f32 = 2.0;

/// Directional and fire keys held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl Controls {
    pub fn is_moving(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Position relative to the player's home row
    pub pos: Vec3,
    pub offset_z: f32,
    pub max_x: f32,
    pub max_z: f32,
    pub vitals: Vitals,
    pub rotate_x: f32,
    pub rotate_z: f32,
    pub acceleration: f32,
    last_move: f64,
    heading_x: AxisDirection,
    heading_z: AxisDirection,
    pub last_shot: f64,
    pub model: ModelId,
    pub half: Vec3,
}

impl Player {
    pub fn new(model: ModelId, half: Vec3, now: f64) -> Self {
        Self {
            pos: Vec3::ZERO,
            offset_z: PLAYER_OFFSET_Z,
            max_x: PLAYER_MAX_X,
            max_z: PLAYER_MAX_Z,
            vitals: Vitals::new(PLAYER_HEALTH, PLAYER_ENERGY),
            rotate_x: 0.0,
            rotate_z: 0.0,
            acceleration: 0.0,
            last_move: now,
            heading_x: AxisDirection::Still,
            heading_z: AxisDirection::Still,
            last_shot: now,
            model,
            half,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.vitals.is_depleted()
    }

    /// World position of the ship
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.pos.x, self.pos.y, self.pos.z + self.offset_z)
    }

    /// Rotation in degrees; the model faces away from the camera
    pub fn rotation(&self) -> Vec3 {
        Vec3::new(self.rotate_x, 180.0, self.rotate_z)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_local(self.half, self.rotation(), self.position())
    }

    /// Returns true when the hit took the last of the health
    pub fn take_hit(&mut self, damage: Damage, now: f64) -> bool {
        self.vitals.take(damage, now)
    }

    fn direction_changed(&self, controls: &Controls) -> bool {
        (controls.left && self.heading_x != AxisDirection::Negative)
            || (controls.right && self.heading_x != AxisDirection::Positive)
            || (controls.up && self.heading_z != AxisDirection::Negative)
            || (controls.down && self.heading_z != AxisDirection::Positive)
    }

    /// Move and bank for one tick
    pub fn steer(&mut self, controls: &Controls, now: f64) {
        if !controls.is_moving() {
            self.rotate_x = approach_zero(self.rotate_x, STEP_ROTATE_X);
            self.rotate_z = approach_zero(self.rotate_z, STEP_ROTATE_Z);
            return;
        }

        let elapsed = now - self.last_move;
        self.last_move = now;
        self.acceleration = if elapsed > ACCELERATION_DELAY || self.direction_changed(controls) {
            ACCELERATION_INIT
        } else {
            (self.acceleration + ACCELERATION_STEP).min(ACCELERATION_MAX)
        };

        let a = self.acceleration;
        if controls.left {
            self.pos.x -= a;
            self.heading_x = AxisDirection::Negative;
            self.rotate_z = bank(self.rotate_z - STEP_ROTATE_Z, MAX_ROTATE_Z);
        }
        if controls.right {
            self.pos.x += a;
            self.heading_x = AxisDirection::Positive;
            self.rotate_z = bank(self.rotate_z + STEP_ROTATE_Z, MAX_ROTATE_Z);
        }
        if controls.up {
            self.pos.z -= a;
            self.heading_z = AxisDirection::Negative;
            self.rotate_x = bank(self.rotate_x + STEP_ROTATE_X, MAX_ROTATE_X);
        }
        if controls.down {
            self.pos.z += a;
            self.heading_z = AxisDirection::Positive;
            self.rotate_x = bank(self.rotate_x - STEP_ROTATE_X, MAX_ROTATE_X);
        }
        self.pos.x = self.pos.x.clamp(-self.max_x, self.max_x);
        self.pos.z = self.pos.z.clamp(-self.max_z, self.max_z);
    }

    /// Fire cooldown has elapsed
    pub fn ready_to_fire(&self, now: f64, delay: f32) -> bool {
        self.is_alive() && now - self.last_shot > f64::from(delay)
    }

    pub fn fire(&mut self, fire: &FireParameters, now: f64) -> BulletSpawn {
        self.last_shot = now;
        BulletSpawn {
            owner: Owner::Player,
            position: self.position(),
            aim: Aim::Direction(UP),
            shape: BulletShape::default(),
            damage: fire.damage(),
            speed: fire.bullet_init_speed,
            acceleration: fire.bullet_acceleration,
        }
    }
}

fn bank(angle: f32, max: f32) -> f32 {
    angle.clamp(-max, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::LevelParameters;

    const TICK: f64 = 1.0 / 60.0;

    fn player() -> Player {
        Player::new(ModelId::Transtellar, Vec3::new(3.0, 1.0, 3.0), 0.0)
    }

    fn left() -> Controls {
        Controls {
            left: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_held_key_accelerates_to_max() {
        let mut p = player();
        let mut now = 0.0;
        for _ in 0..40 {
            now += TICK;
            p.steer(&left(), now);
        }
        assert_eq!(p.acceleration, ACCELERATION_MAX);
        assert_eq!(p.rotate_z, -MAX_ROTATE_Z);
        assert_eq!(p.pos.x, -PLAYER_MAX_X);
    }

    #[test]
    fn test_direction_change_resets_acceleration() {
        let mut p = player();
        p.steer(&left(), TICK);
        p.steer(&left(), 2.0 * TICK);
        assert!(p.acceleration > ACCELERATION_INIT);
        let right = Controls {
            right: true,
            ..Default::default()
        };
        p.steer(&right, 3.0 * TICK);
        assert_eq!(p.acceleration, ACCELERATION_INIT);
    }

    #[test]
    fn test_pause_between_presses_resets_acceleration() {
        let mut p = player();
        p.steer(&left(), TICK);
        p.steer(&left(), 2.0 * TICK);
        p.steer(&left(), 1.0);
        assert_eq!(p.acceleration, ACCELERATION_INIT);
    }

    #[test]
    fn test_banking_levels_out() {
        let mut p = player();
        let up = Controls {
            up: true,
            left: true,
            ..Default::default()
        };
        for i in 1..=5 {
            p.steer(&up, i as f64 * TICK);
        }
        assert_eq!(p.rotate_x, 5.0);
        assert_eq!(p.rotate_z, -10.0);
        for i in 6..=20 {
            p.steer(&Controls::default(), i as f64 * TICK);
        }
        assert_eq!(p.rotate_x, 0.0);
        assert_eq!(p.rotate_z, 0.0);
    }

    #[test]
    fn test_fire_from_home_row() {
        let mut p = player();
        let fire = LevelParameters::first().player.fire;
        assert!(!p.ready_to_fire(0.1, fire.bullet_delay_spawn));
        assert!(p.ready_to_fire(0.25, fire.bullet_delay_spawn));
        let spawn = p.fire(&fire, 0.25);
        assert_eq!(spawn.owner, Owner::Player);
        assert_eq!(spawn.position, Vec3::new(0.0, 0.0, PLAYER_OFFSET_Z));
        assert_eq!(spawn.aim, Aim::Direction(UP));
        assert!(!p.ready_to_fire(0.3, fire.bullet_delay_spawn));
    }

    #[test]
    fn test_dead_player_holds_fire() {
        let mut p = player();
        assert!(p.take_hit(Damage::new(PLAYER_HEALTH, 0), 1.0));
        assert!(!p.is_alive());
        assert!(!p.ready_to_fire(10.0, 0.2));
    }
}
