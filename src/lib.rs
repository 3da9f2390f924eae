//! Mob Survivor - a real-time arena simulation core
//!
//! Core modules:
//! - `sim`: Simulation session (movement, spawning, collisions, progression)
//! - `driver`: Frame driver that turns host timestamps into ticks
//! - `settings`: Data-driven tuning and difficulty presets
//! - `web`: wasm bindings and the `requestAnimationFrame` loop (wasm32 only)
//!
//! Rendering, HUD and input wiring live in the host; they read
//! [`sim::SessionSnapshot`] and call the [`sim::Session`] command methods.

pub mod driver;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use driver::{FrameDriver, run_headless};
pub use settings::{Difficulty, GameMode, Settings, SettingsError};
pub use sim::Session;

use glam::Vec2;

/// Simulation constants shared by all game modes
pub mod consts {
    /// Default play area (canvas) dimensions
    pub const CANVAS_WIDTH: f32 = 1200.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 600.0;
    pub const PLAYER_START_Y: f32 = 400.0;
    pub const PLAYER_SPEED: f32 = 350.0;
    pub const PLAYER_HITBOX_RADIUS: f32 = 32.5;
    pub const PLAYER_START_HEALTH: f32 = 100.0;

    /// Move target is cleared once the player is this close
    pub const ARRIVAL_EPSILON: f32 = 5.0;

    /// Hostiles spawn this far outside the visible area
    pub const SPAWN_OFFSET: f32 = 50.0;
    /// Projectiles are dropped as soon as they leave the canvas
    pub const PROJECTILE_DESPAWN_MARGIN: f32 = 0.0;
    /// Skillshots are despawned (and counted as dodged) past this margin
    pub const SKILLSHOT_DESPAWN_MARGIN: f32 = 150.0;

    /// Largest delta fed to a single tick (seconds). Longer host stalls
    /// (backgrounded tab) are truncated instead of teleporting entities.
    pub const MAX_TICK_DT: f32 = 0.1;

    /// Undrained events kept per session; the oldest are dropped past this
    pub const MAX_EVENTS: usize = 1024;
}

/// Timestamps are host milliseconds (e.g. `performance.now()`).
pub type Millis = f64;

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Unit vector from `from` toward `to`, or `None` when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Option<Vec2> {
    (to - from).try_normalize()
}

/// Clamp a position so a circle of `radius` stays inside `[0, bounds]`
#[inline]
pub fn clamp_to_bounds(pos: Vec2, radius: f32, bounds: Vec2) -> Vec2 {
    let min = Vec2::splat(radius);
    // A radius larger than half the area pins the entity to the centre line
    let max = (bounds - Vec2::splat(radius)).max(min);
    pos.clamp(min, max)
}

/// Move `from` toward `to` by at most `max_step`, never overshooting.
///
/// Returns the new position; a zero-length gap yields `from` unchanged.
#[inline]
pub fn step_toward(from: Vec2, to: Vec2, max_step: f32) -> Vec2 {
    let gap = to - from;
    let dist = gap.length();
    if dist <= f32::EPSILON || max_step <= 0.0 {
        return from;
    }
    let ratio = (max_step / dist).min(1.0);
    from + gap * ratio
}

/// Install the platform logger (console on wasm, `env_logger` natively).
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_guards_zero_distance() {
        let p = Vec2::new(10.0, 10.0);
        assert!(direction_to(p, p).is_none());

        let dir = direction_to(Vec2::ZERO, Vec2::new(3.0, 4.0)).unwrap();
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_toward_never_overshoots() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(10.0, 0.0);

        assert_eq!(step_toward(from, to, 4.0), Vec2::new(4.0, 0.0));
        assert_eq!(step_toward(from, to, 50.0), to);
        assert_eq!(step_toward(from, from, 50.0), from);
    }

    #[test]
    fn test_clamp_to_bounds() {
        let bounds = Vec2::new(1200.0, 800.0);
        let clamped = clamp_to_bounds(Vec2::new(-40.0, 900.0), 25.0, bounds);
        assert_eq!(clamped, Vec2::new(25.0, 775.0));

        let inside = Vec2::new(300.0, 300.0);
        assert_eq!(clamp_to_bounds(inside, 25.0, bounds), inside);
    }

    #[test]
    fn test_clamp_oversized_radius_does_not_panic() {
        let bounds = Vec2::new(40.0, 40.0);
        let clamped = clamp_to_bounds(Vec2::new(0.0, 0.0), 30.0, bounds);
        assert!(clamped.x.is_finite() && clamped.y.is_finite());
    }
}
