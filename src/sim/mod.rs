//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Host timestamps in, no wall clock reads
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod abilities;
pub mod archetype;
pub mod combat;
pub mod cooldown;
pub mod movement;
pub mod progression;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;

pub use abilities::{AbilityKind, Abilities, AbilitySlot};
pub use archetype::{MobArchetype, MobKind, SkillshotArchetype, SkillshotKind};
pub use cooldown::Cooldown;
pub use registry::{Entity, EntityId, Registry};
pub use session::Session;
pub use snapshot::SessionSnapshot;
pub use state::{
    GameEvent, GamePhase, GameState, Mob, Player, Projectile, ProjectileKind, Skillshot,
    SkillshotPhase, WaveState,
};
pub use tick::tick;
