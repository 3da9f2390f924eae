//! Experience, levels and ability unlock offers

use super::state::{GameEvent, GameState};

/// Bonus max (and current) health per level gained
pub const LEVEL_HEALTH_BONUS: f32 = 20.0;
/// Each threshold is the previous one times this, rounded
pub const XP_THRESHOLD_GROWTH: f32 = 1.5;

/// Next threshold after `current`
pub fn next_threshold(current: u32) -> u32 {
    (current as f32 * XP_THRESHOLD_GROWTH).round() as u32
}

/// Convert banked experience into levels. Returns the number gained.
///
/// Loops, so one large reward can grant several levels. Abilities whose
/// unlock level is reached are offered through `AbilityUnlockable`.
pub fn apply(state: &mut GameState) -> u32 {
    let mut gained = 0;
    while state.player.xp_to_next > 0 && state.player.xp >= state.player.xp_to_next {
        let player = &mut state.player;
        player.xp -= player.xp_to_next;
        player.level += 1;
        player.xp_to_next = next_threshold(player.xp_to_next);
        player.max_health += LEVEL_HEALTH_BONUS;
        player.heal(LEVEL_HEALTH_BONUS);
        gained += 1;

        let level = player.level;
        log::info!("Level up: {} (next at {} xp)", level, player.xp_to_next);
        state.push_event(GameEvent::LevelUp { level });
        for ability in state.player.abilities.unlockable_at(level) {
            state.push_event(GameEvent::AbilityUnlockable { ability });
        }
    }
    gained
}
