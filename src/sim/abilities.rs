//! Player abilities: unlock gating, cooldowns and activation effects

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combat;
use super::cooldown::Cooldown;
use super::progression;
use super::state::{GameEvent, GameState, Projectile, ProjectileKind};
use crate::Millis;

/// Basic attack: damage grows with level
pub const BASIC_BASE_DAMAGE: f32 = 10.0;
pub const BASIC_DAMAGE_PER_LEVEL: f32 = 2.0;
pub const BASIC_SPEED: f32 = 500.0;
pub const BASIC_RADIUS: f32 = 8.0;

pub const FIREBALL_DAMAGE: f32 = 30.0;
pub const FIREBALL_SPEED: f32 = 400.0;
pub const FIREBALL_RADIUS: f32 = 15.0;

pub const LIGHTNING_DAMAGE: f32 = 50.0;
pub const LIGHTNING_RADIUS: f32 = 250.0;

pub const SHIELD_DURATION_MS: Millis = 3000.0;

pub const DASH_DISTANCE: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    BasicAttack,
    Fireball,
    Lightning,
    Shield,
    Dash,
}

impl AbilityKind {
    pub const ALL: [AbilityKind; 5] = [
        AbilityKind::BasicAttack,
        AbilityKind::Fireball,
        AbilityKind::Lightning,
        AbilityKind::Shield,
        AbilityKind::Dash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityKind::BasicAttack => "basic_attack",
            AbilityKind::Fireball => "fireball",
            AbilityKind::Lightning => "lightning",
            AbilityKind::Shield => "shield",
            AbilityKind::Dash => "dash",
        }
    }

    /// Resolve an ability from its name or its default key binding
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "basic_attack" | "basic" | "attack" | "space" => Some(AbilityKind::BasicAttack),
            "fireball" | "w" => Some(AbilityKind::Fireball),
            "lightning" | "e" => Some(AbilityKind::Lightning),
            "shield" | "r" => Some(AbilityKind::Shield),
            "dash" | "q" => Some(AbilityKind::Dash),
            _ if name == " " => Some(AbilityKind::BasicAttack),
            _ => None,
        }
    }

    /// Level at which the ability is offered; `None` means always unlocked
    pub fn unlock_level(&self) -> Option<u32> {
        match self {
            AbilityKind::BasicAttack => None,
            AbilityKind::Fireball => Some(3),
            AbilityKind::Lightning => Some(5),
            AbilityKind::Shield => Some(7),
            AbilityKind::Dash => Some(10),
        }
    }

    pub fn cooldown_ms(&self) -> Millis {
        match self {
            AbilityKind::BasicAttack => 3000.0,
            AbilityKind::Fireball => 2000.0,
            AbilityKind::Lightning => 3000.0,
            AbilityKind::Shield => 5000.0,
            AbilityKind::Dash => 1500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilitySlot {
    pub kind: AbilityKind,
    pub unlocked: bool,
    pub cooldown: Cooldown,
}

/// The player's full ability set, one slot per [`AbilityKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Abilities {
    slots: [AbilitySlot; 5],
}

impl Default for Abilities {
    fn default() -> Self {
        Self {
            slots: AbilityKind::ALL.map(|kind| AbilitySlot {
                kind,
                unlocked: kind.unlock_level().is_none(),
                cooldown: Cooldown::new(kind.cooldown_ms()),
            }),
        }
    }
}

impl Abilities {
    pub fn slot(&self, kind: AbilityKind) -> &AbilitySlot {
        &self.slots[Self::index(kind)]
    }

    pub fn slot_mut(&mut self, kind: AbilityKind) -> &mut AbilitySlot {
        &mut self.slots[Self::index(kind)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilitySlot> {
        self.slots.iter()
    }

    pub fn is_unlocked(&self, kind: AbilityKind) -> bool {
        self.slot(kind).unlocked
    }

    /// Abilities whose unlock level is exactly `level` and still locked
    pub fn unlockable_at(&self, level: u32) -> Vec<AbilityKind> {
        self.slots
            .iter()
            .filter(|slot| !slot.unlocked && slot.kind.unlock_level() == Some(level))
            .map(|slot| slot.kind)
            .collect()
    }

    fn index(kind: AbilityKind) -> usize {
        match kind {
            AbilityKind::BasicAttack => 0,
            AbilityKind::Fireball => 1,
            AbilityKind::Lightning => 2,
            AbilityKind::Shield => 3,
            AbilityKind::Dash => 4,
        }
    }
}

/// Try to fire `kind` at `now`.
///
/// Returns `false` without touching state when the session is over, the
/// ability is locked or cooling down, or it has nothing to act on.
pub fn activate(state: &mut GameState, kind: AbilityKind, now: Millis) -> bool {
    if state.is_over() {
        return false;
    }
    let slot = state.player.abilities.slot(kind);
    if !slot.unlocked || !slot.cooldown.is_ready(now) {
        log::trace!("{} rejected (locked or cooling down)", kind.as_str());
        return false;
    }

    let fired = match kind {
        AbilityKind::BasicAttack => {
            let damage = BASIC_BASE_DAMAGE + BASIC_DAMAGE_PER_LEVEL * state.player.level as f32;
            fire_at_nearest(
                state,
                damage,
                BASIC_SPEED,
                BASIC_RADIUS,
                ProjectileKind::Basic,
            )
        }
        AbilityKind::Fireball => fire_at_nearest(
            state,
            FIREBALL_DAMAGE,
            FIREBALL_SPEED,
            FIREBALL_RADIUS,
            ProjectileKind::Special,
        ),
        AbilityKind::Lightning => {
            let center = state.player.pos;
            let struck = combat::area_damage(state, center, LIGHTNING_RADIUS, LIGHTNING_DAMAGE);
            log::debug!("Lightning struck {} mobs", struck);
            combat::reap_dead_mobs(state);
            progression::apply(state);
            true
        }
        AbilityKind::Shield => {
            state.player.invulnerable = true;
            state.player.shield_expires_at = Some(now + SHIELD_DURATION_MS);
            true
        }
        AbilityKind::Dash => dash(state),
    };

    if !fired {
        return false;
    }

    state.player.abilities.slot_mut(kind).cooldown.try_trigger(now);
    state.push_event(GameEvent::AbilityUsed { ability: kind });
    log::debug!("{} used at {:.0}ms", kind.as_str(), now);
    true
}

/// Unlock an ability currently offered at the player's level
pub fn unlock(state: &mut GameState, kind: AbilityKind) -> bool {
    let offered = state
        .player
        .abilities
        .unlockable_at(state.player.level)
        .contains(&kind);
    if !offered {
        return false;
    }
    state.player.abilities.slot_mut(kind).unlocked = true;
    state.push_event(GameEvent::AbilityUnlocked { ability: kind });
    log::info!("Unlocked {}", kind.as_str());
    true
}

fn fire_at_nearest(
    state: &mut GameState,
    damage: f32,
    speed: f32,
    radius: f32,
    kind: ProjectileKind,
) -> bool {
    let origin = state.player.pos;
    let Some(target) = combat::nearest_live_mob(&state.mobs, origin) else {
        return false;
    };
    let Some(target_pos) = state.mobs.get(target).map(|mob| mob.pos) else {
        return false;
    };

    // Point blank: the projectile sits on the target and connects this tick
    let vel = crate::direction_to(origin, target_pos).unwrap_or(Vec2::ZERO) * speed;
    let id = state.next_entity_id();
    state.projectiles.insert(Projectile {
        id,
        pos: origin,
        vel,
        damage,
        radius,
        kind,
    });
    true
}

fn dash(state: &mut GameState) -> bool {
    let player = &mut state.player;
    let Some(target) = player.move_target else {
        return false;
    };
    let Some(dir) = crate::direction_to(player.pos, target) else {
        return false;
    };
    let reach = DASH_DISTANCE.min(player.pos.distance(target));
    player.pos = crate::clamp_to_bounds(player.pos + dir * reach, player.radius, state.bounds);
    if player.pos.distance(target) < crate::consts::ARRIVAL_EPSILON {
        player.move_target = None;
    }
    true
}
