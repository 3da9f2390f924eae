//! Immutable hostile templates
//!
//! Every live mob or skillshot points at one of these by kind; instances
//! only carry their scaled health/damage and per-instance timers.

use serde::{Deserialize, Serialize};

/// Mob kinds, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobKind {
    Slime,
    Goblin,
    Orc,
    Demon,
}

/// Static mob stats shared by every instance of a kind
#[derive(Debug, Clone, PartialEq)]
pub struct MobArchetype {
    pub name: &'static str,
    pub radius: f32,
    /// Units per second
    pub speed: f32,
    pub health: f32,
    pub damage: f32,
    /// Contact distance beyond the player's hitbox edge
    pub attack_range: f32,
    pub attack_cooldown_ms: f64,
    pub xp: u32,
    pub gold: u32,
    pub color: &'static str,
}

static SLIME: MobArchetype = MobArchetype {
    name: "Slime",
    radius: 25.0,
    speed: 100.0,
    health: 20.0,
    damage: 8.0,
    attack_range: 40.0,
    attack_cooldown_ms: 1200.0,
    xp: 10,
    gold: 5,
    color: "#2ecc71",
};

static GOBLIN: MobArchetype = MobArchetype {
    name: "Goblin",
    radius: 28.0,
    speed: 130.0,
    health: 35.0,
    damage: 12.0,
    attack_range: 45.0,
    attack_cooldown_ms: 1000.0,
    xp: 15,
    gold: 10,
    color: "#e74c3c",
};

static ORC: MobArchetype = MobArchetype {
    name: "Orc",
    radius: 35.0,
    speed: 80.0,
    health: 80.0,
    damage: 20.0,
    attack_range: 50.0,
    attack_cooldown_ms: 1500.0,
    xp: 30,
    gold: 20,
    color: "#8e44ad",
};

static DEMON: MobArchetype = MobArchetype {
    name: "Demon",
    radius: 40.0,
    speed: 150.0,
    health: 120.0,
    damage: 30.0,
    attack_range: 55.0,
    attack_cooldown_ms: 800.0,
    xp: 50,
    gold: 50,
    color: "#c0392b",
};

impl MobKind {
    pub const ALL: [MobKind; 4] = [MobKind::Slime, MobKind::Goblin, MobKind::Orc, MobKind::Demon];

    pub fn archetype(self) -> &'static MobArchetype {
        match self {
            MobKind::Slime => &SLIME,
            MobKind::Goblin => &GOBLIN,
            MobKind::Orc => &ORC,
            MobKind::Demon => &DEMON,
        }
    }

    /// Pick a kind for `wave` from a uniform roll in `[0, 1)`.
    ///
    /// Pools are wave-threshold based: 1-2 slimes only, 3-5 adds goblins,
    /// 6-10 adds orcs, 11+ trades slimes for demons.
    pub fn roll_for_wave(wave: u32, roll: f32) -> MobKind {
        match wave {
            0..=2 => MobKind::Slime,
            3..=5 => {
                if roll < 0.6 {
                    MobKind::Slime
                } else {
                    MobKind::Goblin
                }
            }
            6..=10 => {
                if roll < 0.4 {
                    MobKind::Slime
                } else if roll < 0.8 {
                    MobKind::Goblin
                } else {
                    MobKind::Orc
                }
            }
            _ => {
                if roll < 0.3 {
                    MobKind::Goblin
                } else if roll < 0.6 {
                    MobKind::Orc
                } else {
                    MobKind::Demon
                }
            }
        }
    }
}

/// Skillshot kinds used by the dodge trainer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillshotKind {
    /// Narrow and fast
    Bolt,
    /// Wide and slow
    Wave,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillshotArchetype {
    pub name: &'static str,
    /// Full width of the shot; collision uses half of it
    pub width: f32,
    pub speed: f32,
    pub damage: f32,
    pub color: &'static str,
}

static BOLT: SkillshotArchetype = SkillshotArchetype {
    name: "Bolt",
    width: 30.0,
    speed: 700.0,
    damage: 15.0,
    color: "#00d2ff",
};

static WAVE: SkillshotArchetype = SkillshotArchetype {
    name: "Wave",
    width: 70.0,
    speed: 450.0,
    damage: 25.0,
    color: "#ff9f43",
};

impl SkillshotKind {
    pub fn archetype(self) -> &'static SkillshotArchetype {
        match self {
            SkillshotKind::Bolt => &BOLT,
            SkillshotKind::Wave => &WAVE,
        }
    }

    /// Bolts are the common cast, waves the occasional heavy one
    pub fn roll(roll: f32) -> SkillshotKind {
        if roll < 0.7 {
            SkillshotKind::Bolt
        } else {
            SkillshotKind::Wave
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_early_waves_only_slimes() {
        for wave in 1..=2 {
            for roll in [0.0, 0.5, 0.99] {
                assert_eq!(MobKind::roll_for_wave(wave, roll), MobKind::Slime);
            }
        }
    }

    #[test]
    fn test_pool_boundaries() {
        assert_eq!(MobKind::roll_for_wave(3, 0.59), MobKind::Slime);
        assert_eq!(MobKind::roll_for_wave(3, 0.6), MobKind::Goblin);
        assert_eq!(MobKind::roll_for_wave(10, 0.85), MobKind::Orc);
        assert_eq!(MobKind::roll_for_wave(11, 0.1), MobKind::Goblin);
        assert_eq!(MobKind::roll_for_wave(11, 0.95), MobKind::Demon);
    }

    #[test]
    fn test_archetypes_are_shared() {
        let a = MobKind::Slime.archetype();
        let b = MobKind::Slime.archetype();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.health, 20.0);
        assert_eq!(a.damage, 8.0);
    }
}
