//! Fixed timestep simulation tick
//!
//! One call advances the world by one frame, in a fixed order: collisions,
//! combat, sweep, motion, firing, particles. Bullets and units move a fixed
//! amount per tick; particles and cooldowns follow the simulation clock.

use super::bullet::{Owner, spawn_bullet};
use super::collision::resolve_collisions;
use super::combat::apply_hits;
use super::player::Controls;
use super::state::{GameEvent, GamePhase, GameState};
use super::unit::update_front_latches;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn controls(&self) -> Controls {
        Controls {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            fire: self.fire,
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::GameOver => {}
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    state.time += f64::from(dt);
    state.events.clear();
    let now = state.time;

    // Collisions against the pools as they stand
    let policy = state.collision_policy();
    let report = resolve_collisions(&mut state.bullets, &state.units, &state.player, &policy);
    state
        .events
        .extend(report.clashes.iter().map(|_| GameEvent::BulletsClashed));
    state.debug_boxes = report.debug_boxes;

    let player_destroyed = apply_hits(
        &report.hits,
        &mut state.units,
        &mut state.player,
        &mut state.stats,
        now,
        &mut state.rng,
        &mut state.events,
    );

    state.bullets.sweep();
    state.units.sweep();

    if player_destroyed {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over at level {} with score {}",
            state.level.level + 1,
            state.stats.score
        );
        return;
    }
    if state.units.is_empty() {
        state.advance_level();
    }

    // Motion
    let controls = input.controls();
    state.player.steer(&controls, now);
    update_front_latches(&mut state.units);
    for unit in state.units.iter_mut() {
        unit.advance(&state.frame, &mut state.rng);
    }
    for bullet in state.bullets.iter_mut() {
        if bullet.advance(&state.frame) && bullet.owner == Owner::Player {
            state.stats.record_miss();
            state.events.push(GameEvent::Missed);
        }
    }

    fire(state, &controls, now);

    // Particles
    for bullet in state.bullets.iter_mut() {
        bullet.update_trail(dt, &mut state.rng);
    }
    for unit in state.units.iter_mut() {
        unit.update_effects(dt, &mut state.rng);
    }
}

fn fire(state: &mut GameState, controls: &Controls, now: f64) {
    let trail_capacity = state.settings.trail_capacity();

    let player_fire = state.level.player.fire;
    if controls.fire && state.player.ready_to_fire(now, player_fire.bullet_delay_spawn) {
        let spawn = state.player.fire(&player_fire, now);
        state.stats.record_shot();
        if spawn_bullet(&mut state.bullets, &spawn, trail_capacity).is_some() {
            state.events.push(GameEvent::BulletFired { owner: Owner::Player });
        }
    }

    let unit_fire = state.level.units.fire;
    let target = state.player.position();
    for unit in state.units.iter_mut() {
        if !unit.ready_to_fire(now, unit_fire.bullet_delay_spawn) {
            continue;
        }
        let spawn = unit.fire(target, &unit_fire, now, &mut state.rng);
        if spawn_bullet(&mut state.bullets, &spawn, trail_capacity).is_some() {
            state.events.push(GameEvent::BulletFired { owner: Owner::Unit });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetRegistry, ModelId};
    use crate::consts::{HIT_COST, MISS_COST, SHOOT_COST, SIM_DT};
    use crate::settings::Settings;
    use crate::sim::bullet::{Aim, BulletShape, BulletSpawn, DOWN};
    use crate::sim::combat::Damage;
    use crate::sim::unit::{GridSlot, Unit, spawn_unit};
    use glam::Vec3;

    fn new_state(seed: u64) -> GameState {
        GameState::new(&AssetRegistry::with_defaults(), Settings::default(), seed).unwrap()
    }

    /// Replace the formation with one unit that never shoots back
    fn lone_unit(state: &mut GameState, pos: Vec3) {
        state.units.clear();
        let mut unit = Unit::new(
            pos,
            GridSlot { col: 0, line: 0 },
            ModelId::InterstellarRunner,
            Vec3::new(2.5, 0.75, 2.25),
            0.0,
            0,
            &mut state.rng,
        );
        unit.last_shot = f64::INFINITY;
        spawn_unit(&mut state.units, unit).unwrap();
    }

    /// Hold fire until exactly one shot went out, then run `ticks` more
    fn fire_once(state: &mut GameState, ticks: usize) {
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        while state.stats.shots == 0 {
            tick(state, &fire, SIM_DT);
        }
        for _ in 0..ticks {
            tick(state, &TickInput::default(), SIM_DT);
        }
    }

    fn scripted_input(i: u32) -> TickInput {
        TickInput {
            left: (i / 40) % 2 == 0,
            right: (i / 40) % 2 == 1,
            up: i % 90 < 20,
            fire: i % 3 != 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state(12345);
        let mut b = new_state(12345);
        for i in 0..600 {
            let input = scripted_input(i);
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }
        assert_eq!(a.stats, b.stats);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.bullets.len(), b.bullets.len());
        let pa: Vec<Vec3> = a.units.iter().map(|u| u.position()).collect();
        let pb: Vec<Vec3> = b.units.iter().map(|u| u.position()).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_missed_shot_scores_shot_and_miss() {
        let mut state = new_state(1);
        lone_unit(&mut state, Vec3::new(500.0, 0.0, -20.0));
        fire_once(&mut state, 120);
        let snap = state.snapshot();
        assert_eq!(snap.hits, 0);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.score, -SHOOT_COST - MISS_COST);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_hit_scores_and_damages() {
        let mut state = new_state(2);
        lone_unit(&mut state, Vec3::new(0.0, 0.0, -20.0));
        fire_once(&mut state, 120);
        let snap = state.snapshot();
        assert_eq!(snap.hits, 1);
        assert_eq!(snap.misses, 0);
        assert_eq!(snap.score, HIT_COST - SHOOT_COST);
        let unit = state.units.iter().next().unwrap();
        assert_eq!(unit.vitals.health, 80);
        assert_eq!(unit.vitals.energy, 90);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_dead_bullet_reaped_next_frame() {
        let mut state = new_state(3);
        lone_unit(&mut state, Vec3::new(500.0, 0.0, -20.0));
        let spawn = BulletSpawn {
            owner: Owner::Unit,
            position: Vec3::new(100.0, 0.0, 59.5),
            aim: Aim::Direction(DOWN),
            shape: BulletShape::default(),
            damage: Damage::new(1, 1),
            speed: 1.0,
            acceleration: 0.0,
        };
        let id = spawn_bullet(&mut state.bullets, &spawn, 0).unwrap();
        tick(&mut state, &TickInput::default(), SIM_DT);
        // left the field this frame, still pooled until the next sweep
        assert!(!state.bullets.get(id).unwrap().is_alive());
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.bullets.get(id).is_none());
        assert!(state.bullets.iter().all(|b| b.is_alive()));
        // enemy bullets leaving the field are not misses
        assert_eq!(state.stats.misses, 0);
    }

    #[test]
    fn test_player_destroyed_ends_run() {
        let mut state = new_state(4);
        lone_unit(&mut state, Vec3::new(500.0, 0.0, -20.0));
        state.player.vitals.health = 1;
        let spawn = BulletSpawn {
            owner: Owner::Unit,
            position: state.player.position(),
            aim: Aim::Direction(DOWN),
            shape: BulletShape::default(),
            damage: Damage::new(5, 10),
            speed: 0.0,
            acceleration: 0.0,
        };
        spawn_bullet(&mut state.bullets, &spawn, 0).unwrap();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events.contains(&GameEvent::PlayerDestroyed));

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_cleared_formation_starts_next_level() {
        let mut state = new_state(5);
        for unit in state.units.iter_mut() {
            assert!(unit.take_hit(Damage::new(255, 0), 0.0, &mut state.rng));
        }
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.level.level == 1 {
                break;
            }
        }
        assert_eq!(state.level.level, 1);
        assert_eq!(state.units.len(), 20);
        assert!(state.events.contains(&GameEvent::LevelStarted { level: 1 }));
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = new_state(6);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 0);
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }
}
