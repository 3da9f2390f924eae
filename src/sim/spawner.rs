//! Wave scheduling, mob spawning and the skillshot caster

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::archetype::{MobKind, SkillshotKind};
use super::registry::EntityId;
use super::state::{GameEvent, GameState, Mob, Skillshot, SkillshotPhase};
use crate::consts::SPAWN_OFFSET;
use crate::settings::{GameMode, Settings};
use crate::Millis;

/// Number of mobs wave `wave` spawns
pub fn mobs_for_wave(settings: &Settings, wave: u32) -> u32 {
    settings.wave_base_mobs + wave.saturating_sub(1) * settings.wave_mobs_per_wave
}

/// Health and damage multiplier for `wave`
pub fn stat_multiplier(settings: &Settings, wave: u32) -> f32 {
    1.0 + wave.saturating_sub(1) as f32 * settings.wave_stat_growth
}

/// Pending spawns for the current wave, as offsets from an anchor time.
///
/// The anchor is the host time the wave started. A wave queued before the
/// session has seen any tick is anchored by the first tick instead, so the
/// stagger holds whatever clock the host uses. Cancelling drops everything
/// still queued; nothing fires after that.
#[derive(Debug, Clone, Default)]
pub struct WaveScheduler {
    offsets: VecDeque<Millis>,
    anchor: Option<Millis>,
}

impl WaveScheduler {
    /// Queue `count` spawns `interval_ms` apart, the first at `anchor`.
    /// `None` defers the anchor to the next [`take_due`](Self::take_due).
    pub fn schedule(&mut self, count: u32, anchor: Option<Millis>, interval_ms: Millis) {
        self.offsets = (0..count).map(|i| i as Millis * interval_ms).collect();
        self.anchor = anchor;
    }

    /// Pop every spawn due at or before `now`
    pub fn take_due(&mut self, now: Millis) -> u32 {
        if self.offsets.is_empty() {
            return 0;
        }
        let anchor = *self.anchor.get_or_insert(now);
        let mut due = 0;
        while self.offsets.front().is_some_and(|&offset| anchor + offset <= now) {
            self.offsets.pop_front();
            due += 1;
        }
        due
    }

    /// Drop all pending spawns. Returns how many were dropped.
    pub fn cancel(&mut self) -> usize {
        let dropped = self.offsets.len();
        self.offsets.clear();
        self.anchor = None;
        dropped
    }

    pub fn pending(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn anchor(&self) -> Option<Millis> {
        self.anchor
    }

    /// Due times of the queued spawns; relative to 0 while unanchored
    pub fn scheduled_times(&self) -> impl Iterator<Item = Millis> + '_ {
        let anchor = self.anchor.unwrap_or(0.0);
        self.offsets.iter().map(move |offset| anchor + offset)
    }
}

/// Periodic skillshot caster for dodge mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillshotSpawner {
    pub interval_ms: Millis,
    pub cast_delay_ms: Millis,
    pub speed_scale: f32,
    pub aim_jitter: f32,
    /// `None` until the first update arms it
    pub next_cast_at: Option<Millis>,
}

impl SkillshotSpawner {
    pub fn new(settings: &Settings) -> Self {
        Self {
            interval_ms: settings.skillshot_interval_ms,
            cast_delay_ms: settings.skillshot_cast_delay_ms,
            speed_scale: settings.skillshot_speed_scale,
            aim_jitter: settings.skillshot_aim_jitter,
            next_cast_at: None,
        }
    }
}

/// Begin wave `wave` at `now`.
///
/// Before the first tick `now` is not a host time yet, so the schedule is
/// anchored by that tick instead. Rejected while a wave is running or after
/// game over.
pub fn start_wave(state: &mut GameState, wave: u32, now: Millis) -> bool {
    if state.is_over() || state.wave.active || wave == 0 {
        return false;
    }
    let count = mobs_for_wave(&state.settings, wave);
    state.wave.number = wave;
    state.wave.target = count;
    state.wave.spawned = 0;
    state.wave.killed = 0;
    state.wave.active = true;
    let anchor = state.last_tick.map(|_| now);
    state
        .scheduler
        .schedule(count, anchor, state.settings.wave_spawn_interval_ms);
    state.push_event(GameEvent::WaveStarted { wave, mobs: count });
    log::info!("Wave {} started: {} mobs", wave, count);
    true
}

/// Spawn every mob whose scheduled time has come
pub fn release_due_spawns(state: &mut GameState, now: Millis) {
    if state.is_over() {
        state.scheduler.cancel();
        return;
    }
    let due = state.scheduler.take_due(now);
    for _ in 0..due {
        spawn_wave_mob(state);
    }
}

/// Spawn one mob for the active wave on a random edge
pub fn spawn_wave_mob(state: &mut GameState) -> EntityId {
    let wave = state.wave.number.max(1);
    let roll: f32 = state.rng.random();
    let kind = MobKind::roll_for_wave(wave, roll);
    let pos = edge_point(state, SPAWN_OFFSET);
    let id = spawn_mob_at(state, kind, pos, wave);
    state.wave.spawned += 1;
    id
}

/// Insert a mob of `kind` at `pos` with stats scaled for `wave`
pub fn spawn_mob_at(state: &mut GameState, kind: MobKind, pos: Vec2, wave: u32) -> EntityId {
    let archetype = kind.archetype();
    let mult = stat_multiplier(&state.settings, wave);
    let health = (archetype.health * mult).round();
    let id = state.next_entity_id();
    state.mobs.insert(Mob {
        id,
        kind,
        pos,
        health,
        max_health: health,
        damage: (archetype.damage * mult).round(),
        last_attack: None,
        attacking: false,
    });
    state.push_event(GameEvent::MobSpawned { id, kind });
    log::debug!("Spawned {} #{} at ({:.0}, {:.0})", archetype.name, id.get(), pos.x, pos.y);
    id
}

/// Fire the skillshot caster if its interval has elapsed. Dodge mode only.
pub fn update_skillshot_spawner(state: &mut GameState, now: Millis) {
    if state.is_over() || state.mode() != GameMode::Dodge {
        return;
    }
    let interval = state.skillshot_spawner.interval_ms;
    let next = *state
        .skillshot_spawner
        .next_cast_at
        .get_or_insert(now + interval);
    if now < next {
        return;
    }

    let roll: f32 = state.rng.random();
    cast_skillshot(state, SkillshotKind::roll(roll), now);

    // One cast per tick; a long stall does not unleash a burst
    let mut following = next + interval;
    if following <= now {
        following = now + interval;
    }
    state.skillshot_spawner.next_cast_at = Some(following);
}

/// Start casting a skillshot from a random edge.
///
/// The aim error is rolled now; direction commits when the cast finishes.
pub fn cast_skillshot(state: &mut GameState, kind: SkillshotKind, now: Millis) -> EntityId {
    let origin = edge_point(state, SPAWN_OFFSET);
    cast_skillshot_from(state, kind, origin, now)
}

/// Start casting a skillshot of `kind` from `origin`
pub fn cast_skillshot_from(
    state: &mut GameState,
    kind: SkillshotKind,
    origin: Vec2,
    now: Millis,
) -> EntityId {
    let spawner = state.skillshot_spawner;
    let archetype = kind.archetype();

    let angle = state.rng.random_range(0.0..TAU);
    let spread = spawner.aim_jitter * state.rng.random::<f32>().sqrt();
    let aim_offset = Vec2::from_angle(angle) * spread;

    let id = state.next_entity_id();
    state.skillshots.insert(Skillshot {
        id,
        kind,
        pos: origin,
        vel: Vec2::ZERO,
        speed: archetype.speed * spawner.speed_scale,
        damage: archetype.damage,
        aim_offset,
        phase: SkillshotPhase::Casting {
            started_at: now,
            delay_ms: spawner.cast_delay_ms,
        },
        counted: false,
    });
    state.push_event(GameEvent::SkillshotCast { id, kind });
    log::debug!("Casting {} #{}", archetype.name, id.get());
    id
}

/// Uniform point just outside one of the four canvas edges
fn edge_point(state: &mut GameState, offset: f32) -> Vec2 {
    let bounds = state.bounds;
    let side = state.rng.random_range(0..4u8);
    let along: f32 = state.rng.random();
    match side {
        0 => Vec2::new(along * bounds.x, -offset),
        1 => Vec2::new(bounds.x + offset, along * bounds.y),
        2 => Vec2::new(along * bounds.x, bounds.y + offset),
        _ => Vec2::new(-offset, along * bounds.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    #[test]
    fn test_wave_sizes() {
        let settings = Settings::default();
        assert_eq!(mobs_for_wave(&settings, 1), 5);
        assert_eq!(mobs_for_wave(&settings, 2), 8);
        assert_eq!(mobs_for_wave(&settings, 5), 17);
    }

    #[test]
    fn test_wave_one_schedule_is_staggered() {
        let mut state = GameState::new(Settings::default());
        state.last_tick = Some(1000.0);
        assert!(start_wave(&mut state, 1, 1000.0));
        let times: Vec<Millis> = state.scheduler.scheduled_times().collect();
        assert_eq!(times, vec![1000.0, 1500.0, 2000.0, 2500.0, 3000.0]);
        assert!(!start_wave(&mut state, 2, 1000.0), "wave already running");
    }

    #[test]
    fn test_wave_before_first_tick_anchors_on_it() {
        let mut state = GameState::new(Settings::default());
        assert!(start_wave(&mut state, 1, 0.0));
        assert_eq!(state.scheduler.anchor(), None);

        release_due_spawns(&mut state, 10_000.0);
        assert_eq!(state.mobs.len(), 1);
        assert_eq!(state.scheduler.anchor(), Some(10_000.0));
        release_due_spawns(&mut state, 10_499.0);
        assert_eq!(state.mobs.len(), 1);
        release_due_spawns(&mut state, 10_500.0);
        assert_eq!(state.mobs.len(), 2);
    }

    #[test]
    fn test_take_due_and_cancel() {
        let mut scheduler = WaveScheduler::default();
        scheduler.schedule(4, Some(0.0), 500.0);
        assert_eq!(scheduler.take_due(600.0), 2);
        assert_eq!(scheduler.cancel(), 2);
        assert_eq!(scheduler.take_due(10_000.0), 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_wave_mobs_spawn_offscreen_and_scale() {
        let mut state = GameState::new(Settings::default());
        state.wave.number = 3;
        let id = spawn_wave_mob(&mut state);
        let mob = state.mobs.get(id).unwrap();
        let outside = mob.pos.x < 0.0
            || mob.pos.y < 0.0
            || mob.pos.x > state.bounds.x
            || mob.pos.y > state.bounds.y;
        assert!(outside);
        let mult = stat_multiplier(&state.settings, 3);
        assert!((mult - 1.3).abs() < 1e-6);
        let expected = (mob.archetype().health * mult).round();
        assert_eq!(mob.health, expected);
    }

    #[test]
    fn test_skillshot_spawner_waits_one_interval() {
        let settings = Settings::from_preset(Difficulty::Normal).with_mode(GameMode::Dodge);
        let mut state = GameState::new(settings);
        update_skillshot_spawner(&mut state, 0.0);
        assert!(state.skillshots.is_empty());
        update_skillshot_spawner(&mut state, 999.0);
        assert!(state.skillshots.is_empty());
        update_skillshot_spawner(&mut state, 1000.0);
        assert_eq!(state.skillshots.len(), 1);
        // Long stall: still a single cast
        update_skillshot_spawner(&mut state, 9000.0);
        assert_eq!(state.skillshots.len(), 2);
    }

    #[test]
    fn test_skillshot_spawner_idle_in_survival() {
        let mut state = GameState::new(Settings::default());
        update_skillshot_spawner(&mut state, 0.0);
        update_skillshot_spawner(&mut state, 60_000.0);
        assert!(state.skillshots.is_empty());
    }

    #[test]
    fn test_cast_respects_jitter_and_scale() {
        let settings = Settings::from_preset(Difficulty::Hard).with_mode(GameMode::Dodge);
        let jitter = settings.skillshot_aim_jitter;
        let scale = settings.skillshot_speed_scale;
        let mut state = GameState::new(settings);
        for i in 0..20 {
            let id = cast_skillshot(&mut state, SkillshotKind::Bolt, i as Millis);
            let shot = state.skillshots.get(id).unwrap();
            assert!(shot.aim_offset.length() <= jitter + 1e-3);
            assert_eq!(shot.speed, 700.0 * scale);
            assert!(shot.is_casting());
        }
    }
}
