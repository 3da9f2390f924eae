//! Session facade: the command surface hosts talk to
//!
//! A [`Session`] owns one [`GameState`]. Commands take effect immediately;
//! timed behaviour advances only through [`Session::tick`].

use glam::Vec2;

use super::abilities::{self, AbilityKind};
use super::archetype::{MobKind, SkillshotKind};
use super::registry::EntityId;
use super::snapshot::SessionSnapshot;
use super::spawner;
use super::state::{GameEvent, GameState};
use super::tick;
use crate::Millis;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        log::info!(
            "New {:?} session ({}, seed {:#x})",
            settings.mode,
            settings.difficulty.as_str(),
            settings.seed
        );
        Self {
            state: GameState::new(settings),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for sandboxes and tests
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Advance to host time `now`
    pub fn tick(&mut self, now: Millis) {
        tick::tick(&mut self.state, now);
    }

    /// Point the player at `point`, clamped into the play area
    pub fn set_move_target(&mut self, point: Vec2) {
        if self.state.is_over() {
            return;
        }
        let player = &self.state.player;
        let target = crate::clamp_to_bounds(point, player.radius, self.state.bounds);
        self.state.player.move_target = Some(target);
    }

    pub fn clear_move_target(&mut self) {
        self.state.player.move_target = None;
    }

    /// Fire `kind` at the time of the latest tick.
    ///
    /// Rejected before the first tick, when there is no host time to stamp
    /// the cooldown with.
    pub fn activate_ability(&mut self, kind: AbilityKind) -> bool {
        if self.state.last_tick.is_none() {
            log::debug!("{:?} rejected: no tick yet", kind);
            return false;
        }
        let now = self.state.now;
        self.activate_ability_at(kind, now)
    }

    pub fn activate_ability_at(&mut self, kind: AbilityKind, now: Millis) -> bool {
        abilities::activate(&mut self.state, kind, now)
    }

    /// Fire an ability by name or key; unknown names are ignored
    pub fn activate_named(&mut self, name: &str) -> bool {
        match AbilityKind::from_name(name) {
            Some(kind) => self.activate_ability(kind),
            None => {
                log::warn!("Unknown ability {:?}", name);
                false
            }
        }
    }

    pub fn unlock_ability(&mut self, kind: AbilityKind) -> bool {
        abilities::unlock(&mut self.state, kind)
    }

    /// Abilities on offer at the current level
    pub fn unlockable_now(&self) -> Vec<AbilityKind> {
        self.state.player.abilities.unlockable_at(self.state.player.level)
    }

    pub fn is_ability_ready(&self, kind: AbilityKind) -> bool {
        let slot = self.state.player.abilities.slot(kind);
        slot.unlocked && slot.cooldown.is_ready(self.state.now)
    }

    pub fn cooldown_remaining_ms(&self, kind: AbilityKind) -> Millis {
        self.state
            .player
            .abilities
            .slot(kind)
            .cooldown
            .remaining_ms(self.state.now)
    }

    pub fn start_wave(&mut self, wave: u32) -> bool {
        let now = self.state.now;
        spawner::start_wave(&mut self.state, wave, now)
    }

    /// Start the wave after the last one started
    pub fn start_next_wave(&mut self) -> bool {
        let next = self.state.wave.number + 1;
        self.start_wave(next)
    }

    /// Place a mob directly, scaled for the current wave
    pub fn spawn_mob(&mut self, kind: MobKind, pos: Vec2) -> EntityId {
        let wave = self.state.wave.number.max(1);
        spawner::spawn_mob_at(&mut self.state, kind, pos, wave)
    }

    /// Begin casting a skillshot from `origin` at the latest tick time
    pub fn cast_skillshot(&mut self, kind: SkillshotKind, origin: Vec2) -> EntityId {
        let now = self.state.now;
        spawner::cast_skillshot_from(&mut self.state, kind, origin, now)
    }

    /// Throw away the session and start over with the same settings.
    ///
    /// The host clock carries over so commands issued right after a reset
    /// are stamped with the current time.
    pub fn reset(&mut self) {
        self.state.scheduler.cancel();
        let settings = self.state.settings.clone();
        let (now, last_tick) = (self.state.now, self.state.last_tick);
        log::info!("Session reset");
        self.state = GameState::new(settings);
        self.state.now = now;
        self.state.last_tick = last_tick;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&self.state)
    }

    /// Take every event recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_target_clamped() {
        let mut session = Session::default();
        session.set_move_target(Vec2::new(-100.0, 5000.0));
        let target = session.state().player.move_target.unwrap();
        assert_eq!(target, Vec2::new(32.5, 800.0 - 32.5));
    }

    #[test]
    fn test_start_next_wave_counts_up() {
        let mut session = Session::default();
        assert!(session.start_next_wave());
        assert_eq!(session.state().wave.number, 1);
        assert!(!session.start_next_wave());
        session.state_mut().wave.active = false;
        session.state_mut().scheduler.cancel();
        assert!(session.start_next_wave());
        assert_eq!(session.state().wave.target, 8);
    }

    #[test]
    fn test_drain_events_empties_log() {
        let mut session = Session::default();
        session.start_wave(1);
        let events = session.drain_events();
        assert_eq!(events, vec![GameEvent::WaveStarted { wave: 1, mobs: 5 }]);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let mut session = Session::default();
        session.start_wave(1);
        session.tick(0.0);
        session.tick(1000.0);
        assert!(!session.state().mobs.is_empty());

        session.reset();
        assert!(session.state().mobs.is_empty());
        assert!(session.state().scheduler.is_empty());
        assert_eq!(session.state().wave.number, 0);
        assert_eq!(session.state().now, 1000.0);
        assert_eq!(session.state().last_tick, Some(1000.0));
    }

    #[test]
    fn test_wave_before_first_tick_spawns_one_mob() {
        let mut session = Session::default();
        assert!(session.start_wave(1));
        session.tick(10_000.0);
        assert_eq!(session.state().mobs.len(), 1);
        assert_eq!(session.state().scheduler.pending(), 4);
    }

    #[test]
    fn test_wave_after_reset_spawns_one_mob() {
        let mut session = Session::default();
        session.tick(0.0);
        session.tick(20_000.0);
        session.reset();
        assert!(session.start_wave(1));
        session.tick(20_016.0);
        assert_eq!(session.state().mobs.len(), 1);
        assert_eq!(session.state().scheduler.pending(), 4);
    }

    #[test]
    fn test_activation_needs_a_tick() {
        let mut session = Session::default();
        session.spawn_mob(MobKind::Slime, Vec2::new(100.0, 100.0));
        assert!(!session.activate_ability(AbilityKind::BasicAttack));
        assert!(session.state().projectiles.is_empty());

        session.tick(10_000.0);
        assert!(session.activate_ability(AbilityKind::BasicAttack));
        let cooldown = session.cooldown_remaining_ms(AbilityKind::BasicAttack);
        assert_eq!(cooldown, 3000.0);
    }

    #[test]
    fn test_cooldown_after_reset_uses_host_clock() {
        let mut session = Session::default();
        session.tick(0.0);
        session.tick(50_000.0);
        session.reset();
        session.spawn_mob(MobKind::Slime, Vec2::new(100.0, 100.0));
        assert!(session.activate_ability(AbilityKind::BasicAttack));
        session.tick(50_016.0);
        assert!(!session.is_ability_ready(AbilityKind::BasicAttack));
    }

    #[test]
    fn test_activate_named_unknown() {
        let mut session = Session::default();
        assert!(!session.activate_named("meteor"));
    }
}
