//! Simulation settings and difficulty presets
//!
//! Loaded from JSON by native hosts; browser hosts build them in code.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Which game variant a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    /// Wave survival: mobs chase the player, abilities fight back
    #[default]
    Survival,
    /// Skillshot trainer: dodge incoming directional shots
    Dodge,
}

/// Difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "insane" => Some(Difficulty::Insane),
            _ => None,
        }
    }

    /// Milliseconds between skillshot casts
    pub fn skillshot_interval_ms(&self) -> f64 {
        match self {
            Difficulty::Easy => 1400.0,
            Difficulty::Normal => 1000.0,
            Difficulty::Hard => 700.0,
            Difficulty::Insane => 450.0,
        }
    }

    /// Skillshot travel speed multiplier applied to the archetype speed
    pub fn skillshot_speed_scale(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
            Difficulty::Insane => 1.5,
        }
    }

    /// Telegraph time before a skillshot becomes live
    pub fn skillshot_cast_delay_ms(&self) -> f64 {
        match self {
            Difficulty::Easy => 400.0,
            Difficulty::Normal => 250.0,
            Difficulty::Hard => 180.0,
            Difficulty::Insane => 120.0,
        }
    }

    /// Maximum aim error radius; shrinks as difficulty rises
    pub fn aim_jitter(&self) -> f32 {
        match self {
            Difficulty::Easy => 120.0,
            Difficulty::Normal => 70.0,
            Difficulty::Hard => 35.0,
            Difficulty::Insane => 10.0,
        }
    }

    /// Per-wave stat growth `k` in `1 + (wave - 1) * k`
    pub fn wave_stat_growth(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.10,
            Difficulty::Normal => 0.15,
            Difficulty::Hard => 0.20,
            Difficulty::Insane => 0.25,
        }
    }
}

/// Errors raised while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Session tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mode: GameMode,
    pub difficulty: Difficulty,
    /// RNG seed for spawn edges, archetype rolls and aim jitter
    pub seed: u64,

    // === World ===
    pub canvas_width: f32,
    pub canvas_height: f32,

    // === Player ===
    pub player_speed: f32,
    pub player_radius: f32,
    pub start_health: f32,
    /// Health restored per second while alive (0 disables)
    pub health_regen_per_sec: f32,

    // === Waves ===
    pub wave_base_mobs: u32,
    pub wave_mobs_per_wave: u32,
    /// Delay between staggered spawns of one wave
    pub wave_spawn_interval_ms: f64,
    pub wave_stat_growth: f32,

    // === Skillshots ===
    pub skillshot_interval_ms: f64,
    pub skillshot_speed_scale: f32,
    pub skillshot_cast_delay_ms: f64,
    pub skillshot_aim_jitter: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_preset(Difficulty::Normal)
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_preset(preset: Difficulty) -> Self {
        let mut settings = Self {
            mode: GameMode::Survival,
            difficulty: preset,
            seed: 0x5eed_cafe,

            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,

            player_speed: PLAYER_SPEED,
            player_radius: PLAYER_HITBOX_RADIUS,
            start_health: PLAYER_START_HEALTH,
            health_regen_per_sec: 0.0,

            wave_base_mobs: 5,
            wave_mobs_per_wave: 3,
            wave_spawn_interval_ms: 500.0,
            wave_stat_growth: 0.15,

            skillshot_interval_ms: 0.0,
            skillshot_speed_scale: 1.0,
            skillshot_cast_delay_ms: 0.0,
            skillshot_aim_jitter: 0.0,
        };
        settings.apply_preset(preset);
        settings
    }

    /// Apply a difficulty preset (updates difficulty-dependent fields)
    pub fn apply_preset(&mut self, preset: Difficulty) {
        self.difficulty = preset;
        self.wave_stat_growth = preset.wave_stat_growth();
        self.skillshot_interval_ms = preset.skillshot_interval_ms();
        self.skillshot_speed_scale = preset.skillshot_speed_scale();
        self.skillshot_cast_delay_ms = preset.skillshot_cast_delay_ms();
        self.skillshot_aim_jitter = preset.aim_jitter();
    }

    /// Builder-style mode switch
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder-style seed switch
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn positive(value: f64, field: &'static str) -> Result<(), SettingsError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        fn non_negative(value: f64, field: &'static str) -> Result<(), SettingsError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SettingsError::Invalid {
                    field,
                    reason: "must be zero or positive",
                })
            }
        }

        positive(self.canvas_width.into(), "canvas_width")?;
        positive(self.canvas_height.into(), "canvas_height")?;
        positive(self.player_speed.into(), "player_speed")?;
        positive(self.player_radius.into(), "player_radius")?;
        positive(self.start_health.into(), "start_health")?;
        non_negative(self.health_regen_per_sec.into(), "health_regen_per_sec")?;
        non_negative(self.wave_spawn_interval_ms, "wave_spawn_interval_ms")?;
        non_negative(self.wave_stat_growth.into(), "wave_stat_growth")?;
        positive(self.skillshot_interval_ms, "skillshot_interval_ms")?;
        positive(self.skillshot_speed_scale.into(), "skillshot_speed_scale")?;
        non_negative(self.skillshot_cast_delay_ms, "skillshot_cast_delay_ms")?;
        non_negative(self.skillshot_aim_jitter.into(), "skillshot_aim_jitter")?;

        if self.player_radius * 2.0 > self.canvas_width.min(self.canvas_height) {
            return Err(SettingsError::Invalid {
                field: "player_radius",
                reason: "player does not fit inside the canvas",
            });
        }
        if self.wave_base_mobs == 0 {
            return Err(SettingsError::Invalid {
                field: "wave_base_mobs",
                reason: "a wave needs at least one mob",
            });
        }
        Ok(())
    }

    /// Parse and validate settings from a JSON document.
    ///
    /// Tier-dependent fields left out of the document follow the
    /// document's `difficulty` rather than the Normal defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let mut settings: Settings = serde_json::from_value(value.clone())?;

        let preset = Settings::from_preset(settings.difficulty);
        let given = |key: &str| value.get(key).is_some();
        if !given("wave_stat_growth") {
            settings.wave_stat_growth = preset.wave_stat_growth;
        }
        if !given("skillshot_interval_ms") {
            settings.skillshot_interval_ms = preset.skillshot_interval_ms;
        }
        if !given("skillshot_speed_scale") {
            settings.skillshot_speed_scale = preset.skillshot_speed_scale;
        }
        if !given("skillshot_cast_delay_ms") {
            settings.skillshot_cast_delay_ms = preset.skillshot_cast_delay_ms;
        }
        if !given("skillshot_aim_jitter") {
            settings.skillshot_aim_jitter = preset.skillshot_aim_jitter;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({:?}, {})",
            path.display(),
            settings.mode,
            settings.difficulty.as_str()
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
