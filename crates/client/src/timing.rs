//! Adaptive tick duration estimation.

/// Tracks the client's belief about the server broadcast period.
///
/// A single scalar nudged additively from observed arrival-time error: an
/// early snapshot means we are polling faster than the server produces, so
/// the estimate grows; a late one shrinks it, floored at the adjustment
/// epsilon so it stays positive. Converges toward the true period under
/// persistent bias.
#[derive(Debug, Clone)]
pub struct TickController {
    next_duration_ms: f64,
    epsilon_ms: f64,
}

impl TickController {
    pub fn new(initial_ms: f64, epsilon_ms: f64) -> Self {
        Self {
            next_duration_ms: initial_ms.max(epsilon_ms),
            epsilon_ms,
        }
    }

    /// Feed one observed arrival deviation: positive = arrived early,
    /// negative = arrived late, in milliseconds.
    pub fn adjust(&mut self, delta_arrival_ms: f64) {
        if delta_arrival_ms > self.epsilon_ms {
            self.next_duration_ms += self.epsilon_ms;
        } else if delta_arrival_ms < -self.epsilon_ms {
            self.next_duration_ms =
                (self.next_duration_ms - self.epsilon_ms).max(self.epsilon_ms);
        }
    }

    /// Current estimate in milliseconds. Always positive.
    pub fn duration_ms(&self) -> f64 {
        self.next_duration_ms
    }

    /// Current estimate as an interpolation window in seconds.
    pub fn window_secs(&self) -> f64 {
        self.next_duration_ms / 1000.0
    }
}
