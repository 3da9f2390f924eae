//! Read-only view of a session for rendering and HUD
//!
//! Built on demand from [`GameState`]; serializes to JSON for hosts that
//! live across an FFI or process boundary.

use glam::Vec2;
use serde::Serialize;

use super::archetype::{MobKind, SkillshotKind};
use super::registry::EntityId;
use super::state::{GamePhase, GameState, ProjectileKind, SkillshotPhase, WaveState};
use super::AbilityKind;
use crate::settings::GameMode;
use crate::Millis;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub mode: GameMode,
    pub phase: GamePhase,
    pub now: Millis,
    pub bounds: Vec2,
    pub player: PlayerSnapshot,
    pub abilities: Vec<AbilitySnapshot>,
    /// Abilities the player may unlock right now
    pub unlockable: Vec<AbilityKind>,
    pub mobs: Vec<MobSnapshot>,
    pub projectiles: Vec<ProjectileSnapshot>,
    pub skillshots: Vec<SkillshotSnapshot>,
    pub wave: WaveState,
    pub dodged: u32,
    pub skillshots_taken: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub pos: Vec2,
    pub radius: f32,
    pub move_target: Option<Vec2>,
    pub health: f32,
    pub max_health: f32,
    pub health_fraction: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub gold: u32,
    pub kills: u32,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AbilitySnapshot {
    pub kind: AbilityKind,
    pub unlocked: bool,
    pub ready: bool,
    pub remaining_ms: Millis,
    /// 1 right after use, 0 when ready
    pub cooldown_fraction: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MobSnapshot {
    pub id: EntityId,
    pub kind: MobKind,
    pub name: &'static str,
    pub color: &'static str,
    pub pos: Vec2,
    pub radius: f32,
    pub health_fraction: f32,
    pub attacking: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectileSnapshot {
    pub id: EntityId,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillshotSnapshot {
    pub id: EntityId,
    pub kind: SkillshotKind,
    pub color: &'static str,
    pub pos: Vec2,
    pub width: f32,
    /// Unit heading once active, zero while casting
    pub heading: Vec2,
    /// Telegraph progress in `0..=1`; 1 once active
    pub cast_progress: f32,
}

impl SessionSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let now = state.now;
        let player = &state.player;

        Self {
            mode: state.mode(),
            phase: state.phase,
            now,
            bounds: state.bounds,
            player: PlayerSnapshot {
                pos: player.pos,
                radius: player.radius,
                move_target: player.move_target,
                health: player.health,
                max_health: player.max_health,
                health_fraction: player.health_fraction(),
                level: player.level,
                xp: player.xp,
                xp_to_next: player.xp_to_next,
                gold: player.gold,
                kills: player.kills,
                invulnerable: player.invulnerable,
            },
            abilities: player
                .abilities
                .iter()
                .map(|slot| AbilitySnapshot {
                    kind: slot.kind,
                    unlocked: slot.unlocked,
                    ready: slot.unlocked && slot.cooldown.is_ready(now),
                    remaining_ms: slot.cooldown.remaining_ms(now),
                    cooldown_fraction: slot.cooldown.remaining_fraction(now),
                })
                .collect(),
            unlockable: player.abilities.unlockable_at(player.level),
            mobs: state
                .mobs
                .iter()
                .map(|mob| MobSnapshot {
                    id: mob.id,
                    kind: mob.kind,
                    name: mob.archetype().name,
                    color: mob.archetype().color,
                    pos: mob.pos,
                    radius: mob.radius(),
                    health_fraction: mob.health_fraction(),
                    attacking: mob.attacking,
                })
                .collect(),
            projectiles: state
                .projectiles
                .iter()
                .map(|proj| ProjectileSnapshot {
                    id: proj.id,
                    kind: proj.kind,
                    pos: proj.pos,
                    radius: proj.radius,
                })
                .collect(),
            skillshots: state
                .skillshots
                .iter()
                .map(|shot| SkillshotSnapshot {
                    id: shot.id,
                    kind: shot.kind,
                    color: shot.archetype().color,
                    pos: shot.pos,
                    width: shot.archetype().width,
                    heading: shot.vel.normalize_or_zero(),
                    cast_progress: match shot.phase {
                        SkillshotPhase::Casting {
                            started_at,
                            delay_ms,
                        } if delay_ms > 0.0 => {
                            (((now - started_at) / delay_ms) as f32).clamp(0.0, 1.0)
                        }
                        SkillshotPhase::Casting { .. } | SkillshotPhase::Active => 1.0,
                    },
                })
                .collect(),
            wave: state.wave.clone(),
            dodged: state.dodged,
            skillshots_taken: state.skillshots_taken,
        }
    }

    /// Pretty JSON for hosts and the headless runner
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::spawner::spawn_mob_at;

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut state = GameState::new(Settings::default());
        spawn_mob_at(&mut state, MobKind::Goblin, Vec2::new(100.0, 100.0), 1);
        let snap = SessionSnapshot::capture(&state);

        assert_eq!(snap.mobs.len(), 1);
        assert_eq!(snap.mobs[0].name, "Goblin");
        assert_eq!(snap.player.health_fraction, 1.0);
        assert_eq!(snap.abilities.len(), 5);
        assert!(snap.abilities[0].ready);
        assert!(!snap.abilities[1].unlocked);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = GameState::new(Settings::default());
        let json = SessionSnapshot::capture(&state).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["player"]["level"], 1);
        assert_eq!(value["phase"], "Playing");
    }
}
