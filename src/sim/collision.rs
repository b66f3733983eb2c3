//! Bullet collision detection
//!
//! Runs against a snapshot of the pools at the start of the frame. Hits are
//! reported rather than applied: the bullet is consumed here, while damage and
//! scoring happen in the combat pass that follows.

use glam::Vec3;

use super::bounds::{Aabb, circles_overlap_xz};
use super::bullet::{BulletId, BulletPool, Owner};
use super::combat::Damage;
use super::player::Player;
use super::unit::{UnitId, UnitPool};
use crate::settings::Settings;

/// Which collisions are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPolicy {
    /// Bullets can shoot each other down
    pub bullet_clash: bool,
    /// Bullets from the same side also clash
    pub same_owner_collides: bool,
    /// Report every tested box for the debug overlay
    pub debug_boxes: bool,
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self {
            bullet_clash: true,
            same_owner_collides: false,
            debug_boxes: false,
        }
    }
}

impl From<&Settings> for CollisionPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            bullet_clash: settings.bullet_clash,
            same_owner_collides: settings.same_owner_collides,
            debug_boxes: settings.debug_boxes,
        }
    }
}

impl CollisionPolicy {
    fn clashes(&self, a: Owner, b: Owner) -> bool {
        self.bullet_clash && (a != b || self.same_owner_collides)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Unit(UnitId),
    Player,
}

/// A bullet that struck a target this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub bullet: BulletId,
    pub owner: Owner,
    pub target: Target,
    pub damage: Damage,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    pub hits: Vec<Hit>,
    /// Pairs of bullets that destroyed each other
    pub clashes: Vec<(BulletId, BulletId)>,
    /// Every box tested, filled only when debug boxes are on
    pub debug_boxes: Vec<Aabb>,
}

/// Detect bullet hits on units and the player, then bullet-vs-bullet clashes.
///
/// A bullet is consumed by the first target it overlaps, in pool order. Dead
/// bullets are skipped, so a bullet consumed by a hit never clashes.
pub fn resolve_collisions(
    bullets: &mut BulletPool,
    units: &UnitPool,
    player: &Player,
    policy: &CollisionPolicy,
) -> CollisionReport {
    let mut report = CollisionReport::default();

    let unit_boxes: Vec<(UnitId, Aabb)> = units
        .iter_keyed()
        .filter(|(_, unit)| unit.is_targetable())
        .map(|(id, unit)| (id, unit.bounds()))
        .collect();
    let player_box = player.is_alive().then(|| player.bounds());

    if policy.debug_boxes {
        report.debug_boxes.extend(unit_boxes.iter().map(|(_, b)| *b));
        report.debug_boxes.extend(player_box);
    }

    for (id, bullet) in bullets.iter_keyed() {
        if !bullet.is_alive() {
            continue;
        }
        let bounds = bullet.bounds();
        if policy.debug_boxes {
            report.debug_boxes.push(bounds);
        }
        let target = match bullet.owner {
            Owner::Player => unit_boxes
                .iter()
                .find(|(_, b)| b.intersects(&bounds))
                .map(|(unit, _)| Target::Unit(*unit)),
            Owner::Unit => player_box
                .filter(|b| b.intersects(&bounds))
                .map(|_| Target::Player),
        };
        if let Some(target) = target {
            report.hits.push(Hit {
                bullet: id,
                owner: bullet.owner,
                target,
                damage: bullet.damage,
            });
        }
    }
    for hit in &report.hits {
        if let Some(bullet) = bullets.get_mut(hit.bullet) {
            bullet.kill();
        }
    }

    if policy.bullet_clash {
        report.clashes = find_clashes(bullets, policy);
        for &(a, b) in &report.clashes {
            for id in [a, b] {
                if let Some(bullet) = bullets.get_mut(id) {
                    bullet.kill();
                }
            }
        }
    }

    report
}

/// Pairwise XZ circle test, oldest first. A bullet that already clashed is
/// out of the running for later pairs.
fn find_clashes(bullets: &BulletPool, policy: &CollisionPolicy) -> Vec<(BulletId, BulletId)> {
    let live: Vec<(BulletId, Vec3, f32, Owner)> = bullets
        .iter_keyed()
        .filter(|(_, b)| b.is_alive())
        .map(|(id, b)| (id, b.pos, b.effective_radius(), b.owner))
        .collect();
    let mut doomed = vec![false; live.len()];
    let mut clashes = Vec::new();

    for i in 0..live.len() {
        if doomed[i] {
            continue;
        }
        let (id_a, pos_a, r_a, owner_a) = live[i];
        for j in (i + 1)..live.len() {
            if doomed[j] {
                continue;
            }
            let (id_b, pos_b, r_b, owner_b) = live[j];
            if !policy.clashes(owner_a, owner_b) {
                continue;
            }
            if circles_overlap_xz(pos_a, r_a, pos_b, r_b) {
                doomed[i] = true;
                doomed[j] = true;
                clashes.push((id_a, id_b));
                break;
            }
        }
    }
    clashes
}
