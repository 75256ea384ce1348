//! Frame-by-frame interpolation between two snapshots.

use std::collections::HashMap;

use crate::player::RenderedPlayer;

/// Advances moving heads at constant velocity across one broadcast window.
///
/// Head motion is deliberately linear and grid-locked; easing is reserved for
/// the leaderboard bars. When the window runs out the interpolator holds
/// every head at its last target (never extrapolates) and fires the fetch
/// signal exactly once.
#[derive(Debug)]
pub struct Interpolator {
    time_left_s: f64,
    fetch_armed: bool,
    cancelled: bool,
}

impl Interpolator {
    pub fn new() -> Self {
        Self {
            time_left_s: 0.0,
            fetch_armed: false,
            cancelled: false,
        }
    }

    /// Start a fresh interpolation window after an accepted snapshot.
    pub fn arm(&mut self, window_s: f64) {
        self.time_left_s = window_s;
        self.fetch_armed = true;
    }

    /// Tear down: any pending window expiry becomes a no-op, so a scheduled
    /// fetch can never re-enter a dead session.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.fetch_armed = false;
    }

    /// Seconds left in the current window.
    pub fn time_left_s(&self) -> f64 {
        self.time_left_s
    }

    /// Advance one frame. `speed` is in screen units per second; only players
    /// in `Moving` state are advanced, and never past their target. Returns
    /// true when this frame exhausted the window and the next snapshot should
    /// be requested.
    pub fn advance(
        &mut self,
        dt_s: f64,
        speed: f32,
        players: &mut HashMap<u8, RenderedPlayer>,
    ) -> bool {
        // Clamp to the window so a long frame cannot overshoot the next
        // expected snapshot.
        let step = dt_s.min(self.time_left_s).max(0.0);
        if step > 0.0 {
            let distance = speed * step as f32;
            for p in players.values_mut() {
                if p.state == protocol::PlayerState::Moving {
                    p.visual = p.visual.move_towards(p.target, distance);
                }
            }
            self.time_left_s -= step;
        }

        if self.time_left_s <= 0.0 && self.fetch_armed && !self.cancelled {
            self.fetch_armed = false;
            return true;
        }
        false
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}
