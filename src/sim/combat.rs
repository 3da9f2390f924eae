//! Collision and combat resolution
//!
//! Runs after movement, in a fixed order: mob contact damage, projectile
//! hits, skillshot hits, out-of-bounds despawn, then reaping of dead mobs.
//! Each step collects ids first and removes them in one batch afterwards,
//! so nothing is removed twice and no reward is granted twice.

use glam::Vec2;

use super::registry::{EntityId, Registry};
use super::state::{GameEvent, GameState, Mob};
use crate::Millis;
use crate::consts::{PROJECTILE_DESPAWN_MARGIN, SKILLSHOT_DESPAWN_MARGIN};

/// Strict circle overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Nearest live mob to `from`; ties go to the earliest in registry order
pub fn nearest_live_mob(mobs: &Registry<Mob>, from: Vec2) -> Option<EntityId> {
    let mut best: Option<(EntityId, f32)> = None;
    for mob in mobs.iter().filter(|m| m.is_alive()) {
        let d = mob.pos.distance_squared(from);
        if best.is_none_or(|(_, best_d)| d < best_d) {
            best = Some((mob.id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// Run the full resolver pass for one tick
pub fn resolve(state: &mut GameState, now: Millis) {
    resolve_mob_contacts(state, now);
    resolve_projectile_hits(state);
    resolve_skillshot_hits(state);
    despawn_out_of_bounds(state);
    reap_dead_mobs(state);
}

/// Mobs in range swing at the player when their attack timer allows.
///
/// A shielded player takes nothing but the swing still resets the timer.
pub fn resolve_mob_contacts(state: &mut GameState, now: Millis) {
    let player = &mut state.player;
    let mut hits = Vec::new();

    for mob in state.mobs.iter_mut().filter(|m| m.is_alive()) {
        let reach = mob.archetype().attack_range + player.radius;
        mob.attacking = mob.pos.distance(player.pos) < reach;
        if !mob.attacking || !mob.attack_ready(now) || !player.is_alive() {
            continue;
        }
        mob.last_attack = Some(now);
        if player.invulnerable {
            hits.push(GameEvent::PlayerHit {
                damage: 0.0,
                blocked: true,
            });
        } else {
            let taken = player.apply_damage(mob.damage);
            log::debug!("{} #{} hit player for {}", mob.archetype().name, mob.id.get(), taken);
            hits.push(GameEvent::PlayerHit {
                damage: taken,
                blocked: false,
            });
        }
    }
    state.extend_events(hits);
}

/// Each projectile damages the first live mob it overlaps, then is spent
pub fn resolve_projectile_hits(state: &mut GameState) {
    let mut spent = Vec::new();
    let mut hits = Vec::new();

    for proj in state.projectiles.iter() {
        let target = state
            .mobs
            .iter_mut()
            .filter(|m| m.is_alive())
            .find(|m| circles_overlap(proj.pos, proj.radius, m.pos, m.radius()));
        if let Some(mob) = target {
            mob.apply_damage(proj.damage);
            spent.push(proj.id);
            hits.push(GameEvent::MobHit {
                id: mob.id,
                damage: proj.damage,
            });
        }
    }

    state.projectiles.remove_ids(&spent);
    state.extend_events(hits);
}

/// Active skillshots touching the player deal damage and vanish
pub fn resolve_skillshot_hits(state: &mut GameState) {
    let player = &mut state.player;
    let mut spent = Vec::new();
    let mut hits = Vec::new();

    for shot in state.skillshots.iter().filter(|s| !s.is_casting()) {
        if !player.is_alive() {
            break;
        }
        if !circles_overlap(shot.pos, shot.radius(), player.pos, player.radius) {
            continue;
        }
        spent.push(shot.id);
        let blocked = player.invulnerable;
        let damage = if blocked { 0.0 } else { player.apply_damage(shot.damage) };
        hits.push(GameEvent::SkillshotHit {
            id: shot.id,
            damage,
            blocked,
        });
    }

    state.skillshots_taken += spent.len() as u32;
    state.skillshots.remove_ids(&spent);
    state.extend_events(hits);
}

/// Drop projectiles and skillshots that have left the play area.
///
/// A skillshot leaving without contact counts as dodged, once.
pub fn despawn_out_of_bounds(state: &mut GameState) {
    let bounds = state.bounds;
    let outside = |pos: Vec2, margin: f32| {
        pos.x < -margin || pos.y < -margin || pos.x > bounds.x + margin || pos.y > bounds.y + margin
    };

    let lost: Vec<EntityId> = state
        .projectiles
        .iter()
        .filter(|p| outside(p.pos, PROJECTILE_DESPAWN_MARGIN))
        .map(|p| p.id)
        .collect();
    state.projectiles.remove_ids(&lost);

    let mut gone = Vec::new();
    let mut dodged = Vec::new();
    for shot in state.skillshots.iter_mut().filter(|s| !s.is_casting()) {
        if !outside(shot.pos, SKILLSHOT_DESPAWN_MARGIN) {
            continue;
        }
        gone.push(shot.id);
        if !shot.counted {
            shot.counted = true;
            dodged.push(shot.id);
        }
    }
    state.dodged += dodged.len() as u32;
    state.skillshots.remove_ids(&gone);
    state.extend_events(dodged.into_iter().map(|id| GameEvent::SkillshotDodged { id }));
}

/// Damage every live mob within `radius` of `center`. Returns how many.
pub fn area_damage(state: &mut GameState, center: Vec2, radius: f32, damage: f32) -> usize {
    let mut struck = Vec::new();
    for mob in state.mobs.iter_mut().filter(|m| m.is_alive()) {
        if mob.pos.distance(center) < radius {
            mob.apply_damage(damage);
            struck.push(GameEvent::MobHit { id: mob.id, damage });
        }
    }
    let count = struck.len();
    state.extend_events(struck);
    count
}

/// Remove dead mobs and pay out their rewards. Returns the kill count.
pub fn reap_dead_mobs(state: &mut GameState) -> u32 {
    let dead: Vec<EntityId> = state
        .mobs
        .iter()
        .filter(|m| !m.is_alive())
        .map(|m| m.id)
        .collect();
    let removed = state.mobs.remove_ids(&dead);

    for mob in &removed {
        let archetype = mob.archetype();
        state.player.xp += archetype.xp;
        state.player.gold += archetype.gold;
        state.player.kills += 1;
        if state.wave.active {
            state.wave.killed += 1;
        }
        state.push_event(GameEvent::MobKilled {
            id: mob.id,
            kind: mob.kind,
            xp: archetype.xp,
            gold: archetype.gold,
        });
        log::debug!(
            "{} #{} killed (+{} xp, +{} gold)",
            archetype.name,
            mob.id.get(),
            archetype.xp,
            archetype.gold
        );
    }
    removed.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::archetype::{MobKind, SkillshotKind};
    use crate::sim::spawner::{cast_skillshot_from, spawn_mob_at};
    use crate::sim::state::{Projectile, ProjectileKind, SkillshotPhase};

    fn fresh() -> GameState {
        GameState::new(Settings::default())
    }

    fn shoot(state: &mut GameState, pos: Vec2, damage: f32) -> EntityId {
        let id = state.next_entity_id();
        state.projectiles.insert(Projectile {
            id,
            pos,
            vel: Vec2::ZERO,
            damage,
            radius: 8.0,
            kind: ProjectileKind::Basic,
        });
        id
    }

    #[test]
    fn test_nearest_ties_go_to_first() {
        let mut state = fresh();
        let a = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(700.0, 400.0), 1);
        spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(500.0, 400.0), 1);
        assert_eq!(nearest_live_mob(&state.mobs, state.player.pos), Some(a));
        assert_eq!(nearest_live_mob(&Registry::new(), Vec2::ZERO), None);
    }

    #[test]
    fn test_contact_respects_cooldown() {
        let mut state = fresh();
        spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(650.0, 400.0), 1);

        resolve_mob_contacts(&mut state, 0.0);
        assert_eq!(state.player.health, 92.0);
        resolve_mob_contacts(&mut state, 1200.0);
        assert_eq!(state.player.health, 92.0, "cooldown is strict");
        resolve_mob_contacts(&mut state, 1201.0);
        assert_eq!(state.player.health, 84.0);
    }

    #[test]
    fn test_shield_blocks_but_resets_timer() {
        let mut state = fresh();
        let id = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(650.0, 400.0), 1);
        state.player.invulnerable = true;

        resolve_mob_contacts(&mut state, 500.0);
        assert_eq!(state.player.health, 100.0);
        assert_eq!(state.mobs.get(id).unwrap().last_attack, Some(500.0));
    }

    #[test]
    fn test_projectile_hits_first_overlapping_mob_only() {
        let mut state = fresh();
        let first = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(300.0, 300.0), 1);
        let second = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(310.0, 300.0), 1);
        shoot(&mut state, Vec2::new(305.0, 300.0), 12.0);

        resolve_projectile_hits(&mut state);
        assert_eq!(state.mobs.get(first).unwrap().health, 8.0);
        assert_eq!(state.mobs.get(second).unwrap().health, 20.0);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_overkill_rewards_once() {
        let mut state = fresh();
        spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(300.0, 300.0), 1);
        shoot(&mut state, Vec2::new(300.0, 300.0), 50.0);
        shoot(&mut state, Vec2::new(300.0, 300.0), 50.0);

        resolve_projectile_hits(&mut state);
        // The second projectile finds no live target and keeps flying
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(reap_dead_mobs(&mut state), 1);
        assert_eq!(reap_dead_mobs(&mut state), 0);
        assert_eq!(state.player.xp, 10);
        assert_eq!(state.player.kills, 1);
    }

    #[test]
    fn test_casting_skillshot_is_harmless() {
        let mut state = fresh();
        let pos = state.player.pos;
        let id = cast_skillshot_from(&mut state, SkillshotKind::Wave, pos, 0.0);

        resolve_skillshot_hits(&mut state);
        assert_eq!(state.player.health, 100.0);

        state.skillshots.get_mut(id).unwrap().phase = SkillshotPhase::Active;
        resolve_skillshot_hits(&mut state);
        assert_eq!(state.player.health, 75.0);
        assert_eq!(state.skillshots_taken, 1);
        assert!(state.skillshots.is_empty());
    }

    #[test]
    fn test_dodge_counted_once() {
        let mut state = fresh();
        let origin = Vec2::new(-400.0, 400.0);
        let id = cast_skillshot_from(&mut state, SkillshotKind::Bolt, origin, 0.0);
        state.skillshots.get_mut(id).unwrap().phase = SkillshotPhase::Active;

        despawn_out_of_bounds(&mut state);
        despawn_out_of_bounds(&mut state);
        assert_eq!(state.dodged, 1);
        assert!(state.skillshots.is_empty());
    }

    #[test]
    fn test_projectile_leaving_canvas_removed() {
        let mut state = fresh();
        shoot(&mut state, Vec2::new(-10.0 - PROJECTILE_DESPAWN_MARGIN, 100.0), 1.0);
        shoot(&mut state, Vec2::new(100.0, 100.0), 1.0);
        despawn_out_of_bounds(&mut state);
        assert_eq!(state.projectiles.len(), 1);
    }
}
