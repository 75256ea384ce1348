//! Client view configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,
    /// Injected color table: base color per player id nibble.
    /// Index 0 is unclaimed ground, 15 is the wall color.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
}

impl Config {
    /// Load configuration from `client.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("client.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No client.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view: ViewConfig::default(),
            timing: TimingConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            palette: default_palette(),
        }
    }
}

/// Window geometry and tile presentation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewConfig {
    /// Visible rows; columns are derived from the viewport aspect ratio.
    #[serde(default = "default_rows")]
    pub rows: u16,
    /// Edge length of one grid cell in screen units.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Opacity of trail overlay tiles.
    #[serde(default = "default_track_opacity")]
    pub track_opacity: u8,
    /// Opacity of directional trail markers.
    #[serde(default = "default_angle_opacity")]
    pub angle_opacity: u8,
}

impl ViewConfig {
    /// Derive the visible column count from the viewport aspect ratio.
    /// Fixed for the lifetime of a session.
    pub fn visible_cols(&self, view_width: f32, view_height: f32) -> u16 {
        let inner = self.rows.saturating_sub(3) as f32;
        (inner * view_width / view_height).ceil() as u16 + 3
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cell_size: default_cell_size(),
            track_opacity: default_track_opacity(),
            angle_opacity: default_angle_opacity(),
        }
    }
}

fn default_rows() -> u16 {
    20
}
fn default_cell_size() -> f32 {
    40.0
}
fn default_track_opacity() -> u8 {
    128
}
fn default_angle_opacity() -> u8 {
    180
}

/// Adaptive tick estimation settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Initial estimate of the server broadcast period.
    #[serde(default = "default_next_duration_ms")]
    pub next_duration_ms: f64,
    /// Adjustment step and floor for the estimate.
    #[serde(default = "default_time_epsilon_ms")]
    pub time_epsilon_ms: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            next_duration_ms: default_next_duration_ms(),
            time_epsilon_ms: default_time_epsilon_ms(),
        }
    }
}

fn default_next_duration_ms() -> f64 {
    200.0
}
fn default_time_epsilon_ms() -> f64 {
    10.0
}

/// Ranking display settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeaderboardConfig {
    /// Number of ranking bars shown.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_palette() -> Vec<String> {
    [
        "#ffffff", "#ba68c8", "#7986cb", "#64b5f6", "#e57373", "#4dd0e1", "#4db6ac", "#81c784",
        "#aed581", "#dce775", "#90a4ae", "#ffd54f", "#ffb74d", "#ff8a65", "#a1887f", "#ffffff",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
