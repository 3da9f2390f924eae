//! Variable timestep simulation tick
//!
//! One call advances the session to the host timestamp `now`. The elapsed
//! time since the previous tick is clamped to [`MAX_TICK_DT`] so a stalled
//! host never teleports entities.

use super::combat;
use super::movement;
use super::progression;
use super::spawner;
use super::state::{GameEvent, GamePhase, GameState};
use crate::Millis;
use crate::consts::MAX_TICK_DT;

/// Seconds between the previous tick and `now`, clamped to `[0, MAX_TICK_DT]`
pub fn tick_dt(last_tick: Option<Millis>, now: Millis) -> f32 {
    match last_tick {
        None => 0.0,
        Some(prev) => (((now - prev) / 1000.0) as f32).clamp(0.0, MAX_TICK_DT),
    }
}

/// Advance the game state to `now`
pub fn tick(state: &mut GameState, now: Millis) {
    let dt = tick_dt(state.last_tick, now);
    state.last_tick = Some(now);
    state.now = now;

    if state.is_over() {
        return;
    }
    state.time_ticks += 1;

    expire_shield(state, now);
    regenerate(state, dt);

    // Spawns land before movement so new arrivals are clamped this tick
    spawner::release_due_spawns(state, now);
    spawner::update_skillshot_spawner(state, now);

    let bounds = state.bounds;
    movement::move_player(&mut state.player, bounds, dt);
    let (player_pos, player_radius) = (state.player.pos, state.player.radius);
    movement::move_mobs(state.mobs.iter_mut(), player_pos, player_radius, bounds, dt);
    movement::move_projectiles(state.projectiles.iter_mut(), dt);
    movement::advance_skillshots(state, now, dt);

    combat::resolve(state, now);
    progression::apply(state);

    check_wave_cleared(state);
    check_game_over(state);

    log::trace!(
        "tick {} dt={:.3} mobs={} projectiles={} skillshots={}",
        state.time_ticks,
        dt,
        state.mobs.len(),
        state.projectiles.len(),
        state.skillshots.len()
    );
}

fn expire_shield(state: &mut GameState, now: Millis) {
    let player = &mut state.player;
    if player.shield_expires_at.is_some_and(|at| now >= at) {
        player.invulnerable = false;
        player.shield_expires_at = None;
        log::debug!("Shield expired");
    }
}

fn regenerate(state: &mut GameState, dt: f32) {
    let rate = state.settings.health_regen_per_sec;
    if rate > 0.0 && state.player.is_alive() {
        state.player.heal(rate * dt);
    }
}

fn check_wave_cleared(state: &mut GameState) {
    let wave = &state.wave;
    if !wave.active || !state.scheduler.is_empty() || !wave.is_cleared(state.mobs.len()) {
        return;
    }
    let number = wave.number;
    state.wave.active = false;
    state.push_event(GameEvent::WaveCleared { wave: number });
    log::info!("Wave {} cleared", number);
}

fn check_game_over(state: &mut GameState) {
    if state.player.is_alive() {
        return;
    }
    state.phase = GamePhase::GameOver;
    let dropped = state.scheduler.cancel();
    state.push_event(GameEvent::GameOver);
    log::info!(
        "Game over at wave {} (level {}, {} kills, {} dropped spawns)",
        state.wave.number,
        state.player.level,
        state.player.kills,
        dropped
    );
}
