//! Per-tick motion for every entity kind
//!
//! The player and mobs are clamped to the play area after moving.
//! Projectiles and skillshots fly freely; the resolver despawns them once
//! they leave.

use glam::Vec2;

use super::state::{GameState, Mob, Player, Projectile, Skillshot, SkillshotPhase};
use crate::consts::ARRIVAL_EPSILON;
use crate::{Millis, clamp_to_bounds, direction_to, step_toward};

/// Walk the player toward its move target
pub fn move_player(player: &mut Player, bounds: Vec2, dt: f32) {
    let Some(target) = player.move_target else {
        player.velocity = Vec2::ZERO;
        return;
    };
    if player.pos.distance(target) < ARRIVAL_EPSILON {
        player.move_target = None;
        player.velocity = Vec2::ZERO;
        return;
    }

    let before = player.pos;
    let stepped = step_toward(player.pos, target, player.speed * dt);
    player.pos = clamp_to_bounds(stepped, player.radius, bounds);
    player.velocity = if dt > 0.0 {
        (player.pos - before) / dt
    } else {
        Vec2::ZERO
    };

    if player.pos.distance(target) < ARRIVAL_EPSILON {
        player.move_target = None;
    }
}

/// Chase the player; halt once inside attack range
pub fn move_mobs<'a>(
    mobs: impl Iterator<Item = &'a mut Mob>,
    player_pos: Vec2,
    player_radius: f32,
    bounds: Vec2,
    dt: f32,
) {
    for mob in mobs.filter(|m| m.is_alive()) {
        let archetype = mob.archetype();
        let reach = archetype.attack_range + player_radius;
        if mob.pos.distance(player_pos) < reach {
            mob.attacking = true;
        } else {
            mob.attacking = false;
            mob.pos = step_toward(mob.pos, player_pos, archetype.speed * dt);
        }
        mob.pos = clamp_to_bounds(mob.pos, archetype.radius, bounds);
    }
}

pub fn move_projectiles<'a>(projectiles: impl Iterator<Item = &'a mut Projectile>, dt: f32) {
    for proj in projectiles {
        proj.pos += proj.vel * dt;
    }
}

/// Finish casts that are due and fly active skillshots.
///
/// A cast commits toward where the player is headed: its current position,
/// led by its velocity over the shot's travel time, plus the rolled aim
/// error. Only the part of the tick after activation is flown.
pub fn advance_skillshots(state: &mut GameState, now: Millis, dt: f32) {
    let player_pos = state.player.pos;
    let player_vel = state.player.velocity;
    let centre = state.bounds * 0.5;

    for shot in state.skillshots.iter_mut() {
        match shot.phase {
            SkillshotPhase::Casting {
                started_at,
                delay_ms,
            } => {
                let fires_at = started_at + delay_ms;
                if now < fires_at {
                    continue;
                }
                commit(shot, player_pos, player_vel, centre);
                let active_for = (((now - fires_at) / 1000.0) as f32).min(dt);
                shot.pos += shot.vel * active_for;
            }
            SkillshotPhase::Active => {
                shot.pos += shot.vel * dt;
            }
        }
    }
}

fn commit(shot: &mut Skillshot, player_pos: Vec2, player_vel: Vec2, fallback: Vec2) {
    let travel = if shot.speed > 0.0 {
        shot.pos.distance(player_pos) / shot.speed
    } else {
        0.0
    };
    let aim = player_pos + player_vel * travel + shot.aim_offset;
    let dir = direction_to(shot.pos, aim)
        .or_else(|| direction_to(shot.pos, fallback))
        .unwrap_or(Vec2::X);
    shot.vel = dir * shot.speed;
    shot.phase = SkillshotPhase::Active;
    log::trace!("Skillshot #{} committed toward ({:.0}, {:.0})", shot.id.get(), aim.x, aim.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{GameMode, Settings};
    use crate::sim::archetype::{MobKind, SkillshotKind};
    use crate::sim::spawner::{cast_skillshot_from, spawn_mob_at};

    #[test]
    fn test_player_arrives_and_clears_target() {
        let mut player = Player::new(&Settings::default());
        let bounds = Vec2::new(1200.0, 800.0);
        player.move_target = Some(Vec2::new(700.0, 400.0));

        // 350 u/s * 0.1 s = 35 per tick; three ticks cover the 100 units
        for _ in 0..3 {
            move_player(&mut player, bounds, 0.1);
        }
        assert_eq!(player.pos, Vec2::new(700.0, 400.0));
        assert!(player.move_target.is_none());
    }

    #[test]
    fn test_player_clamped_at_edge() {
        let mut player = Player::new(&Settings::default());
        let bounds = Vec2::new(1200.0, 800.0);
        player.pos = Vec2::new(40.0, 400.0);
        player.move_target = Some(Vec2::new(-500.0, 400.0));
        move_player(&mut player, bounds, 0.1);
        assert_eq!(player.pos.x, player.radius);
    }

    #[test]
    fn test_mob_halts_in_range() {
        let mut state = GameState::new(Settings::default());
        let near = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(660.0, 400.0), 1);
        let far = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(900.0, 400.0), 1);
        let player_pos = state.player.pos;
        let radius = state.player.radius;
        let bounds = state.bounds;

        move_mobs(state.mobs.iter_mut(), player_pos, radius, bounds, 0.1);

        let near = state.mobs.get(near).unwrap();
        assert_eq!(near.pos.x, 660.0);
        assert!(near.attacking);
        let far = state.mobs.get(far).unwrap();
        assert!((far.pos.x - 890.0).abs() < 1e-3);
        assert!(!far.attacking);
    }

    #[test]
    fn test_offscreen_mob_clamped_on_first_move() {
        let mut state = GameState::new(Settings::default());
        let id = spawn_mob_at(&mut state, MobKind::Slime, Vec2::new(-50.0, 400.0), 1);
        let (pos, radius, bounds) = (state.player.pos, state.player.radius, state.bounds);
        move_mobs(state.mobs.iter_mut(), pos, radius, bounds, 0.016);
        assert_eq!(state.mobs.get(id).unwrap().pos.x, 25.0);
    }

    #[test]
    fn test_skillshot_holds_during_cast() {
        let settings = Settings::default().with_mode(GameMode::Dodge);
        let mut state = GameState::new(settings);
        state.skillshot_spawner.cast_delay_ms = 250.0;
        state.skillshot_spawner.aim_jitter = 0.0;
        let id = cast_skillshot_from(&mut state, SkillshotKind::Bolt, Vec2::new(-50.0, 400.0), 0.0);

        advance_skillshots(&mut state, 100.0, 0.1);
        let shot = state.skillshots.get(id).unwrap();
        assert!(shot.is_casting());
        assert_eq!(shot.pos, Vec2::new(-50.0, 400.0));

        advance_skillshots(&mut state, 300.0, 0.1);
        let shot = state.skillshots.get(id).unwrap();
        assert!(!shot.is_casting());
        // Flew only the 50ms after activation, straight at the idle player
        assert!((shot.pos.x - (-50.0 + 700.0 * 0.05)).abs() < 1e-2);
        assert!(shot.vel.y.abs() < 1e-3);
    }
}
