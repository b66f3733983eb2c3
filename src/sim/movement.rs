//! Oscillating motion for enemy units
//!
//! Each axis is a small state machine: the active direction drives the offset
//! toward one side until the bound is reached, then the direction flips and a
//! new step is drawn. Banking angles are derived from the offsets and carry no
//! state of their own.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{MOVEMENT_BOUND, MOVEMENT_STEP_MAX, MOVEMENT_STEP_MIN};

/// Active direction on one axis pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisDirection {
    /// Axis does not move
    Still,
    /// Left, up or forward
    Negative,
    /// Right, down or backward
    Positive,
}

impl AxisDirection {
    pub fn sign(&self) -> f32 {
        match self {
            AxisDirection::Still => 0.0,
            AxisDirection::Negative => -1.0,
            AxisDirection::Positive => 1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            AxisDirection::Still => AxisDirection::Still,
            AxisDirection::Negative => AxisDirection::Positive,
            AxisDirection::Positive => AxisDirection::Negative,
        }
    }

    fn random(rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) {
            AxisDirection::Negative
        } else {
            AxisDirection::Positive
        }
    }
}

/// What happened to an axis during one advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisEvent {
    Idle,
    Moved,
    /// Bound reached: offset clamped, direction flipped, step redrawn
    BoundReached,
}

/// One oscillating axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisOscillator {
    pub direction: AxisDirection,
    pub step: f32,
    pub bound: f32,
    pub offset: f32,
}

impl AxisOscillator {
    pub fn still() -> Self {
        Self {
            direction: AxisDirection::Still,
            step: 0.0,
            bound: MOVEMENT_BOUND,
            offset: 0.0,
        }
    }

    pub fn new(direction: AxisDirection, bound: f32, rng: &mut impl Rng) -> Self {
        let mut axis = Self {
            direction,
            step: 0.0,
            bound,
            offset: 0.0,
        };
        axis.redraw_step(rng);
        axis
    }

    pub fn redraw_step(&mut self, rng: &mut impl Rng) {
        self.step = rng.random_range(MOVEMENT_STEP_MIN..MOVEMENT_STEP_MAX);
    }

    /// Advance one tick, scaling the step by `factor`
    pub fn advance(&mut self, factor: f32, rng: &mut impl Rng) -> AxisEvent {
        if self.direction == AxisDirection::Still {
            return AxisEvent::Idle;
        }
        self.offset += self.step * factor * self.direction.sign();
        if self.offset.abs() >= self.bound {
            self.offset = self.bound * self.offset.signum();
            self.direction = self.direction.flipped();
            self.redraw_step(rng);
            return AxisEvent::BoundReached;
        }
        AxisEvent::Moved
    }

    /// Offset normalized into [-1, 1]
    pub fn normalized(&self) -> f32 {
        if self.bound > 0.0 {
            (self.offset / self.bound).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Maximum banking angles (degrees) derived from the oscillation
pub const MAX_ROLL: f32 = 20.0;
pub const MAX_PITCH: f32 = 10.0;

/// Per-entity movement driven by three oscillating axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementAction {
    pub x: AxisOscillator,
    pub y: AxisOscillator,
    pub z: AxisOscillator,
}

impl MovementAction {
    /// Random left/right and up/down headings; forward/backward stays still
    pub fn new(rng: &mut impl Rng) -> Self {
        let x_dir = AxisDirection::random(rng);
        let y_dir = AxisDirection::random(rng);
        Self {
            x: AxisOscillator::new(x_dir, MOVEMENT_BOUND, rng),
            y: AxisOscillator::new(y_dir, MOVEMENT_BOUND, rng),
            z: AxisOscillator::still(),
        }
    }

    pub fn iterate(&mut self, factor: f32, rng: &mut impl Rng) -> [AxisEvent; 3] {
        [
            self.x.advance(factor, rng),
            self.y.advance(factor, rng),
            self.z.advance(factor, rng),
        ]
    }

    pub fn offset(&self) -> Vec3 {
        Vec3::new(self.x.offset, self.y.offset, self.z.offset)
    }

    /// Rotation in degrees around (X, Y, Z): pitch from vertical motion,
    /// roll banking against lateral motion
    pub fn rotation(&self) -> Vec3 {
        Vec3::new(
            self.y.normalized() * MAX_PITCH,
            0.0,
            -self.x.normalized() * MAX_ROLL,
        )
    }
}
