//! Presentation sink types.
//!
//! The core never touches a scene graph; every visual or audible side effect
//! is described by these values and consumed by a presentation adapter.

use protocol::{Direction, GridPoint, PlayerState, Position};

use crate::leaderboard::BarState;
use crate::palette::Rgb;

/// Which sprite a tile cell should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    /// Plain claimed/unclaimed ground tile.
    Square,
    /// Wall cell (color nibble 15).
    Wall,
    /// Claimed tile whose south neighbor is unclaimed ground.
    GroundBar,
    /// Trail overlay tile.
    TrailSquare,
    /// Directional trail marker left by a moving head.
    TrailMarker(Direction),
}

/// How a tile reaches its color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileFill {
    Static(Rgb),
    /// Animate from the previous round's color to the new one.
    Tint {
        from: Rgb,
        to: Rgb,
        duration_ms: f64,
    },
}

/// One cell of the per-snapshot tile diff.
#[derive(Debug, Clone, PartialEq)]
pub struct TileUpdate {
    pub point: GridPoint,
    pub sprite: SpriteKind,
    pub fill: TileFill,
    pub opacity: u8,
}

/// Round sound cue carried by a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// A territory loop was closed.
    CloseLoop,
    /// The local player killed someone.
    Kill,
    /// The local player was killed.
    Killed,
}

impl SoundCue {
    /// Map the wire sound id; 0 and unknown ids are silence.
    pub fn from_fx(fx: u8) -> Option<Self> {
        match fx {
            1 => Some(SoundCue::CloseLoop),
            2 => Some(SoundCue::Kill),
            3 => Some(SoundCue::Killed),
            _ => None,
        }
    }
}

/// Discrete output of one accepted snapshot, in presentation order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Full tile diff for the new window.
    Tiles(Vec<TileUpdate>),
    /// A head snapped to its spawn cell; any ghost/loading styling for this
    /// player should be cleared.
    PlayerSpawned { id: u8, position: Position },
    /// One-shot particle burst where a head exploded.
    Explosion { id: u8, position: Position, color: Rgb },
    /// The camera should start tracking this player's head.
    CameraFollow { id: u8 },
    /// The camera should stop tracking its current target.
    CameraRelease,
    /// Play a round sound.
    Sound(SoundCue),
    /// Fire-and-forget final score report for the host messaging channel.
    /// Emitted once per life, on first observation of the terminal state.
    FinalScore {
        occupancy_ratio: f32,
        kill_count: u16,
    },
    /// Offer the local player a respawn decision. Emitted exactly once per
    /// life; the host answers via `respawn_decided` or `leave`.
    RespawnOffered { has_respawned: bool },
}

/// Authoritative per-frame player presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerVisual {
    pub id: u8,
    pub position: Position,
    pub state: PlayerState,
}

/// Everything the presentation layer needs for one rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub players: Vec<PlayerVisual>,
    pub bars: Vec<BarState>,
    /// True when this frame ended the interpolation window and the next
    /// snapshot was requested.
    pub snapshot_requested: bool,
}
