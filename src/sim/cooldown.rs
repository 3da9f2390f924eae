//! Per-ability cooldown tracking

use serde::{Deserialize, Serialize};

use crate::Millis;

/// Last-use timestamp plus a fixed cooldown length.
///
/// A tracker that has never fired is always ready.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub duration_ms: Millis,
    last_used: Option<Millis>,
}

impl Cooldown {
    pub fn new(duration_ms: Millis) -> Self {
        Self {
            duration_ms,
            last_used: None,
        }
    }

    pub fn last_used(&self) -> Option<Millis> {
        self.last_used
    }

    /// `now - last_used >= duration`
    pub fn is_ready(&self, now: Millis) -> bool {
        match self.last_used {
            None => true,
            Some(last) => now - last >= self.duration_ms,
        }
    }

    /// Time until ready, zero when ready
    pub fn remaining_ms(&self, now: Millis) -> Millis {
        match self.last_used {
            None => 0.0,
            Some(last) => (self.duration_ms - (now - last)).max(0.0),
        }
    }

    /// Remaining time as a 0..=1 fraction (1 = just used)
    pub fn remaining_fraction(&self, now: Millis) -> f32 {
        if self.duration_ms <= 0.0 {
            return 0.0;
        }
        (self.remaining_ms(now) / self.duration_ms) as f32
    }

    /// Stamp a use at `now` if ready. Returns whether it fired.
    pub fn try_trigger(&mut self, now: Millis) -> bool {
        if !self.is_ready(now) {
            return false;
        }
        self.last_used = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_used = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cooldown_is_ready() {
        let cd = Cooldown::new(3000.0);
        assert!(cd.is_ready(0.0));
        assert_eq!(cd.remaining_ms(0.0), 0.0);
    }

    #[test]
    fn test_trigger_gates_until_duration_elapsed() {
        let mut cd = Cooldown::new(3000.0);
        assert!(cd.try_trigger(0.0));
        assert!(!cd.try_trigger(2000.0));
        assert_eq!(cd.last_used(), Some(0.0));
        assert!((cd.remaining_ms(2000.0) - 1000.0).abs() < 1e-9);
        assert!(cd.try_trigger(3000.0));
        assert_eq!(cd.last_used(), Some(3000.0));
    }

    #[test]
    fn test_remaining_fraction() {
        let mut cd = Cooldown::new(1000.0);
        cd.try_trigger(500.0);
        assert!((cd.remaining_fraction(750.0) - 0.75).abs() < 1e-6);
        assert_eq!(cd.remaining_fraction(5000.0), 0.0);
    }
}
