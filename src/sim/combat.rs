//! Damage application and run statistics
//!
//! Health and energy only ever go down through saturating subtraction, so a
//! damage packet larger than what is left clamps at zero.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bullet::Owner;
use super::collision::{Hit, Target};
use super::player::Player;
use super::state::GameEvent;
use super::unit::UnitPool;
use crate::consts::{HIT_COST, HIT_FLASH_TIME, MISS_COST, SHOOT_COST, STATE_BAR_TIME};

/// Damage packet carried by a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Damage {
    pub health: u8,
    pub energy: u8,
}

impl Damage {
    pub const fn new(health: u8, energy: u8) -> Self {
        Self { health, energy }
    }
}

/// Health and energy of a unit or the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: u8,
    pub energy: u8,
    pub init_health: u8,
    pub init_energy: u8,
    /// Simulation time of the last hit (negative before the first)
    pub hit_time: f64,
}

impl Vitals {
    pub fn new(health: u8, energy: u8) -> Self {
        Self {
            health,
            energy,
            init_health: health,
            init_energy: energy,
            hit_time: f64::NEG_INFINITY,
        }
    }

    /// Apply a damage packet at time `now`. Returns true when this hit took
    /// the last of the health.
    pub fn take(&mut self, damage: Damage, now: f64) -> bool {
        let was_alive = self.health > 0;
        self.health = self.health.saturating_sub(damage.health);
        self.energy = self.energy.saturating_sub(damage.energy);
        self.hit_time = now;
        was_alive && self.health == 0
    }

    pub fn is_depleted(&self) -> bool {
        self.health == 0
    }

    pub fn health_ratio(&self) -> f32 {
        ratio(self.health, self.init_health)
    }

    pub fn energy_ratio(&self) -> f32 {
        ratio(self.energy, self.init_energy)
    }

    /// Target is inside the red hit-flash window
    pub fn is_flashing(&self, now: f64) -> bool {
        within(self.hit_time, now, HIT_FLASH_TIME)
    }

    /// Health/energy bars should be shown
    pub fn bars_visible(&self, now: f64) -> bool {
        within(self.hit_time, now, STATE_BAR_TIME)
    }
}

fn ratio(value: u8, initial: u8) -> f32 {
    if initial == 0 {
        0.0
    } else {
        value as f32 / initial as f32
    }
}

fn within(since: f64, now: f64, window: f64) -> bool {
    let elapsed = now - since;
    (0.0..window).contains(&elapsed)
}

/// Hit/miss/score counters for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameStats {
    pub hits: i32,
    pub misses: i32,
    pub shots: i32,
    pub score: i32,
}

/// Read-only copy handed to the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub hits: i32,
    pub misses: i32,
    pub score: i32,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
        self.score += HIT_COST;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
        self.score -= MISS_COST;
    }

    pub fn record_shot(&mut self) {
        self.shots += 1;
        self.score -= SHOOT_COST;
    }

    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            hits: self.hits,
            misses: self.misses,
            score: self.score,
        }
    }
}

/// Apply the frame's hits to their targets.
///
/// Every hit lands its full damage packet. Player bullets score a hit; a unit
/// that loses its last health starts falling, and later hits on it in the same
/// frame are dropped. Returns true when the player was destroyed.
pub fn apply_hits(
    hits: &[Hit],
    units: &mut UnitPool,
    player: &mut Player,
    stats: &mut GameStats,
    now: f64,
    rng: &mut impl Rng,
    events: &mut Vec<GameEvent>,
) -> bool {
    let mut player_destroyed = false;
    for hit in hits {
        match hit.target {
            Target::Unit(id) => {
                // an earlier bullet this frame may already have downed it
                let Some(unit) = units.get_mut(id).filter(|u| u.is_active()) else {
                    continue;
                };
                if hit.owner == Owner::Player {
                    stats.record_hit();
                }
                events.push(GameEvent::UnitHit { unit: id });
                if unit.take_hit(hit.damage, now, rng) {
                    events.push(GameEvent::UnitDestroyed { unit: id });
                }
            }
            Target::Player => {
                events.push(GameEvent::PlayerHit);
                if player.take_hit(hit.damage, now) {
                    log::info!("[player] destroyed at {:.2}s", now);
                    events.push(GameEvent::PlayerDestroyed);
                    player_destroyed = true;
                }
            }
        }
    }
    player_destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ModelId;
    use crate::sim::bullet::BulletId;
    use crate::sim::unit::{GridSlot, Unit, new_unit_pool, spawn_unit};
    use glam::Vec3;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use slotmap::KeyData;

    #[test]
    fn test_hit_reduces_health_and_energy() {
        let mut v = Vitals::new(100, 100);
        let killed = v.take(Damage::new(20, 10), 4.0);
        assert!(!killed);
        assert_eq!(v.health, 80);
        assert_eq!(v.energy, 90);
        assert_eq!(v.hit_time, 4.0);
    }

    #[test]
    fn test_overkill_saturates_at_zero() {
        let mut v = Vitals::new(15, 5);
        assert!(v.take(Damage::new(20, 10), 1.0));
        assert_eq!(v.health, 0);
        assert_eq!(v.energy, 0);
        // already dead: no second kill
        assert!(!v.take(Damage::new(20, 10), 2.0));
    }

    #[test]
    fn test_flash_and_bar_windows() {
        let mut v = Vitals::new(100, 100);
        assert!(!v.is_flashing(0.0));
        v.take(Damage::new(1, 1), 10.0);
        assert!(v.is_flashing(10.05));
        assert!(!v.is_flashing(10.2));
        assert!(v.bars_visible(10.5));
        assert!(!v.bars_visible(11.5));
    }

    #[test]
    fn test_score_sequence() {
        let mut stats = GameStats::new();
        stats.record_shot();
        stats.record_hit();
        stats.record_miss();
        let snap = stats.snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.score, -SHOOT_COST + HIT_COST - MISS_COST);
    }

    #[test]
    fn test_apply_hits_damages_unit_and_scores() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut units = new_unit_pool();
        let unit = Unit::new(
            Vec3::ZERO,
            GridSlot { col: 0, line: 0 },
            ModelId::InterstellarRunner,
            Vec3::ONE,
            0.0,
            0,
            &mut rng,
        );
        let id = spawn_unit(&mut units, unit).unwrap();
        let mut player = Player::new(ModelId::Transtellar, Vec3::ONE, 0.0);
        let mut stats = GameStats::new();
        let mut events = Vec::new();
        let hit = Hit {
            bullet: BulletId::from(KeyData::from_ffi(1)),
            owner: Owner::Player,
            target: Target::Unit(id),
            damage: Damage::new(20, 10),
        };

        let dead = apply_hits(&[hit], &mut units, &mut player, &mut stats, 3.0, &mut rng, &mut events);
        assert!(!dead);
        let unit = units.get(id).unwrap();
        assert_eq!((unit.vitals.health, unit.vitals.energy), (80, 90));
        assert_eq!(unit.vitals.hit_time, 3.0);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.score, HIT_COST);
        assert_eq!(events, vec![GameEvent::UnitHit { unit: id }]);
    }

    #[test]
    fn test_second_hit_on_downed_unit_is_dropped() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut units = new_unit_pool();
        let mut unit = Unit::new(
            Vec3::ZERO,
            GridSlot { col: 0, line: 0 },
            ModelId::InterstellarRunner,
            Vec3::ONE,
            0.0,
            0,
            &mut rng,
        );
        unit.vitals.health = 10;
        let id = spawn_unit(&mut units, unit).unwrap();
        let mut player = Player::new(ModelId::Transtellar, Vec3::ONE, 0.0);
        let mut stats = GameStats::new();
        let mut events = Vec::new();
        let hits: Vec<Hit> = (1..=2)
            .map(|n| Hit {
                bullet: BulletId::from(KeyData::from_ffi(n)),
                owner: Owner::Player,
                target: Target::Unit(id),
                damage: Damage::new(20, 10),
            })
            .collect();

        apply_hits(&hits, &mut units, &mut player, &mut stats, 2.0, &mut rng, &mut events);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.score, HIT_COST);
        assert_eq!(
            events,
            vec![GameEvent::UnitHit { unit: id }, GameEvent::UnitDestroyed { unit: id }]
        );
        assert!(!units.get(id).unwrap().is_active());
    }

    #[test]
    fn test_apply_hits_kills_player() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut units = new_unit_pool();
        let mut player = Player::new(ModelId::Transtellar, Vec3::ONE, 0.0);
        player.vitals.health = 5;
        let mut stats = GameStats::new();
        let mut events = Vec::new();
        let hit = Hit {
            bullet: BulletId::from(KeyData::from_ffi(1)),
            owner: Owner::Unit,
            target: Target::Player,
            damage: Damage::new(5, 10),
        };

        assert!(apply_hits(&[hit], &mut units, &mut player, &mut stats, 1.0, &mut rng, &mut events));
        assert_eq!(player.vitals.health, 0);
        // enemy hits do not score
        assert_eq!(stats, GameStats::default());
        assert_eq!(events, vec![GameEvent::PlayerHit, GameEvent::PlayerDestroyed]);
    }

    proptest! {
        #[test]
        fn prop_saturating_damage(h in any::<u8>(), e in any::<u8>(), dh in any::<u8>(), de in any::<u8>()) {
            let mut v = Vitals::new(h, e);
            v.take(Damage::new(dh, de), 0.0);
            prop_assert_eq!(v.health, if dh > h { 0 } else { h - dh });
            prop_assert_eq!(v.energy, if de > e { 0 } else { e - de });
            prop_assert!(v.health <= v.init_health);
            prop_assert!(v.energy <= v.init_energy);
        }
    }
}
