//! Leaderboard bar animation.

use protocol::packets::{LeaderboardEntry, PlayerUpdate};

use crate::palette::{Palette, Rgb};

/// What one ranking bar looks like on a given frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BarState {
    pub player_id: u8,
    /// Width relative to the leader's bar; the leader itself is 1.0 whenever
    /// it owns any tiles, and every bar is 0.0 when nobody does.
    pub scale: f32,
    pub color: Rgb,
    pub label: String,
    pub label_color: Rgb,
}

/// One in-flight bar transition. Retargeting restarts it from the current
/// sampled value.
#[derive(Debug, Clone)]
struct BarTransition {
    player_id: u8,
    scale_from: f32,
    scale_to: f32,
    color_from: Rgb,
    color_to: Rgb,
    label: String,
    label_color: Rgb,
    duration_s: f64,
    elapsed_s: f64,
}

impl BarTransition {
    fn progress(&self) -> f32 {
        if self.duration_s <= 0.0 {
            return 1.0;
        }
        (self.elapsed_s / self.duration_s).clamp(0.0, 1.0) as f32
    }

    fn sample(&self) -> BarState {
        let t = self.progress();
        // Scale eases out; color runs a linear blend over the first half of
        // the window, like the original tint action.
        let scale = self.scale_from + (self.scale_to - self.scale_from) * ease_out(t);
        let color = self.color_from.lerp(self.color_to, t * 2.0);
        BarState {
            player_id: self.player_id,
            scale,
            color,
            label: self.label.clone(),
            label_color: self.label_color,
        }
    }
}

fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

/// Recomputes ranking bar targets per snapshot and animates them per frame.
#[derive(Debug)]
pub struct LeaderboardAnimator {
    top_n: usize,
    bars: Vec<BarTransition>,
}

impl LeaderboardAnimator {
    pub fn new(top_n: usize) -> Self {
        Self {
            top_n,
            bars: Vec::new(),
        }
    }

    /// Restart every bar's transition toward the new ranking. The transition
    /// spans two broadcast windows. Entries must already be validated against
    /// the player list.
    pub fn retarget(
        &mut self,
        entries: &[LeaderboardEntry],
        players: &[PlayerUpdate],
        palette: &Palette,
        window_s: f64,
    ) {
        let base = entries.first().map_or(0.0, |e| e.occupancy_ratio);
        let duration_s = window_s * 2.0;

        let mut bars = Vec::with_capacity(self.top_n.min(entries.len()));
        for (i, entry) in entries.iter().take(self.top_n).enumerate() {
            // Zero-leader degenerate case: no one owns anything, all bars
            // collapse instead of dividing by zero.
            let scale_to = if base > 0.0 {
                entry.occupancy_ratio / base
            } else {
                0.0
            };
            let color_to = palette.light(entry.player_id);
            let kills = players
                .iter()
                .find(|p| p.id == entry.player_id)
                .map_or(0, |p| p.kill_count);
            let label = format!("{:.1}%  {} kills", entry.occupancy_ratio * 100.0, kills);

            // Continue from whatever the bar at this slot currently shows.
            let (scale_from, color_from) = self
                .bars
                .get(i)
                .map(|b| {
                    let s = b.sample();
                    (s.scale, s.color)
                })
                .unwrap_or((0.0, color_to));

            bars.push(BarTransition {
                player_id: entry.player_id,
                scale_from,
                scale_to,
                color_from,
                color_to,
                label,
                label_color: palette.darker(entry.player_id),
                duration_s,
                elapsed_s: 0.0,
            });
        }
        self.bars = bars;
    }

    /// Advance all transitions by one frame and sample their current state.
    pub fn animate(&mut self, dt_s: f64) -> Vec<BarState> {
        for bar in &mut self.bars {
            bar.elapsed_s = (bar.elapsed_s + dt_s).min(bar.duration_s);
        }
        self.bars.iter().map(BarTransition::sample).collect()
    }
}
