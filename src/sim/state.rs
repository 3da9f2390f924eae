//! Session state and entity types
//!
//! Everything a tick reads or writes lives in [`GameState`], owned by a
//! single [`super::Session`].

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::abilities::Abilities;
use super::archetype::{MobArchetype, MobKind, SkillshotArchetype, SkillshotKind};
use super::registry::{Entity, EntityId, IdAllocator, Registry};
use super::spawner::{SkillshotSpawner, WaveScheduler};
use crate::consts::*;
use crate::settings::{GameMode, Settings};
use crate::Millis;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Player health reached zero; combat mutation stops
    GameOver,
}

/// The controllable champion
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Click destination; cleared on arrival
    pub move_target: Option<Vec2>,
    /// Displacement per second over the last tick
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub gold: u32,
    pub kills: u32,
    /// Shield flag; contact and skillshot damage is suppressed while set
    pub invulnerable: bool,
    pub shield_expires_at: Option<Millis>,
    pub abilities: Abilities,
}

impl Player {
    pub fn new(settings: &Settings) -> Self {
        let bounds = Vec2::new(settings.canvas_width, settings.canvas_height);
        let start = crate::clamp_to_bounds(
            Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            settings.player_radius,
            bounds,
        );
        Self {
            pos: start,
            radius: settings.player_radius,
            speed: settings.player_speed,
            move_target: None,
            velocity: Vec2::ZERO,
            health: settings.start_health,
            max_health: settings.start_health,
            level: 1,
            xp: 0,
            xp_to_next: 100,
            gold: 0,
            kills: 0,
            invulnerable: false,
            shield_expires_at: None,
            abilities: Abilities::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract health, clamped at zero. Returns the amount actually taken.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
        before - self.health
    }

    /// Add health, clamped at max
    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount.max(0.0)).clamp(0.0, self.max_health);
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }
}

/// A chasing melee hostile
#[derive(Debug, Clone)]
pub struct Mob {
    pub id: EntityId,
    pub kind: MobKind,
    pub pos: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Wave-scaled contact damage
    pub damage: f32,
    pub last_attack: Option<Millis>,
    /// Within attack range this tick (halted, swinging)
    pub attacking: bool,
}

impl Mob {
    pub fn archetype(&self) -> &'static MobArchetype {
        self.kind.archetype()
    }

    pub fn radius(&self) -> f32 {
        self.archetype().radius
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Subtract health, clamped at zero
    pub fn apply_damage(&mut self, amount: f32) {
        self.health = (self.health - amount.max(0.0)).clamp(0.0, self.max_health);
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    pub fn attack_ready(&self, now: Millis) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => now - last > self.archetype().attack_cooldown_ms,
        }
    }
}

impl Entity for Mob {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Projectile flavour, used by the host for visuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Basic,
    Special,
}

/// Player-fired projectile
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub radius: f32,
    pub kind: ProjectileKind,
}

impl Entity for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Skillshot lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SkillshotPhase {
    /// Telegraphing; neither moves nor collides
    Casting { started_at: Millis, delay_ms: Millis },
    Active,
}

/// Directional hazard aimed at the player
#[derive(Debug, Clone)]
pub struct Skillshot {
    pub id: EntityId,
    pub kind: SkillshotKind,
    pub pos: Vec2,
    /// Zero while casting
    pub vel: Vec2,
    pub speed: f32,
    pub damage: f32,
    /// Aim error added to the player position when the shot commits
    pub aim_offset: Vec2,
    pub phase: SkillshotPhase,
    /// Dodge already credited for this shot
    pub counted: bool,
}

impl Skillshot {
    pub fn archetype(&self) -> &'static SkillshotArchetype {
        self.kind.archetype()
    }

    /// Collision radius (half the shot width)
    pub fn radius(&self) -> f32 {
        self.archetype().width / 2.0
    }

    pub fn is_casting(&self) -> bool {
        matches!(self.phase, SkillshotPhase::Casting { .. })
    }
}

impl Entity for Skillshot {
    fn id(&self) -> EntityId {
        self.id
    }
}

/// Wave bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveState {
    /// Current (or last started) wave, 0 before the first
    pub number: u32,
    /// Mobs the wave will spawn
    pub target: u32,
    pub spawned: u32,
    pub killed: u32,
    pub active: bool,
}

impl WaveState {
    /// Kill target met and nothing left alive
    pub fn is_cleared(&self, live_mobs: usize) -> bool {
        self.killed >= self.target && live_mobs == 0
    }
}

/// Things that happened during a tick or command, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    WaveStarted { wave: u32, mobs: u32 },
    MobSpawned { id: EntityId, kind: MobKind },
    PlayerHit { damage: f32, blocked: bool },
    MobHit { id: EntityId, damage: f32 },
    MobKilled { id: EntityId, kind: MobKind, xp: u32, gold: u32 },
    SkillshotCast { id: EntityId, kind: SkillshotKind },
    SkillshotHit { id: EntityId, damage: f32, blocked: bool },
    SkillshotDodged { id: EntityId },
    AbilityUsed { ability: super::AbilityKind },
    AbilityUnlockable { ability: super::AbilityKind },
    AbilityUnlocked { ability: super::AbilityKind },
    LevelUp { level: u32 },
    WaveCleared { wave: u32 },
    GameOver,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Play area size
    pub bounds: Vec2,
    pub phase: GamePhase,
    pub player: Player,
    pub mobs: Registry<Mob>,
    pub projectiles: Registry<Projectile>,
    pub skillshots: Registry<Skillshot>,
    pub wave: WaveState,
    pub scheduler: WaveScheduler,
    pub skillshot_spawner: SkillshotSpawner,
    /// Skillshots that left the field without touching the player
    pub dodged: u32,
    /// Skillshots that connected
    pub skillshots_taken: u32,
    /// Timestamp of the latest tick or command
    pub now: Millis,
    /// Timestamp of the previous tick, `None` before the first
    pub last_tick: Option<Millis>,
    pub time_ticks: u64,
    /// Undrained events, oldest first, capped at `MAX_EVENTS`
    pub events: VecDeque<GameEvent>,
    pub rng: Pcg32,
    ids: IdAllocator,
}

impl GameState {
    pub fn new(settings: Settings) -> Self {
        let bounds = Vec2::new(settings.canvas_width, settings.canvas_height);
        let skillshot_spawner = SkillshotSpawner::new(&settings);
        Self {
            bounds,
            phase: GamePhase::Playing,
            player: Player::new(&settings),
            mobs: Registry::new(),
            projectiles: Registry::new(),
            skillshots: Registry::new(),
            wave: WaveState::default(),
            scheduler: WaveScheduler::default(),
            skillshot_spawner,
            dodged: 0,
            skillshots_taken: 0,
            now: 0.0,
            last_tick: None,
            time_ticks: 0,
            events: VecDeque::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            ids: IdAllocator::default(),
            settings,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.settings.mode
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn push_event(&mut self, event: GameEvent) {
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub fn extend_events(&mut self, events: impl IntoIterator<Item = GameEvent>) {
        for event in events {
            self.push_event(event);
        }
    }
}
