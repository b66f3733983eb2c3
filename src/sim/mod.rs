//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (pool insertion order)
//! - No rendering or platform dependencies

pub mod bounds;
pub mod bullet;
pub mod collision;
pub mod combat;
pub mod movement;
pub mod particles;
pub mod player;
pub mod pool;
pub mod sprite;
pub mod state;
pub mod tick;
pub mod unit;

pub use bounds::Aabb;
pub use bullet::{AreaFrame, Bullet, BulletId, BulletPool, BulletSpawn, Owner, spawn_bullet};
pub use collision::{CollisionPolicy, CollisionReport, Hit, Target, resolve_collisions};
pub use combat::{Damage, GameStats, StatSnapshot, Vitals};
pub use movement::MovementAction;
pub use particles::{ParticleEmitter, ParticleKind};
pub use player::{Controls, Player};
pub use pool::{Pool, Poolable};
pub use sprite::{SpriteAnimation, SpriteSheet};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
pub use unit::{Unit, UnitId, UnitPool, spawn_unit, spawn_unit_formation};
