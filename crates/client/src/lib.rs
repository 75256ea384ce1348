//! Client-side view core for native-splix.
//!
//! Turns authoritative server snapshots into smooth presentation state:
//! - decodes the windowed tile grid and diffs it against the previous round
//! - reconciles player lifecycles and interpolates moving heads per frame
//! - estimates the server broadcast period from snapshot arrival times
//! - animates the ranking bars between snapshots
//!
//! The crate is renderer-agnostic. Inbound, the host feeds
//! [`GameView::on_snapshot`] and [`GameView::on_frame`]; outbound, the view
//! talks to the transport through the [`ClientAdapter`] trait and describes
//! everything visual as [`ViewEvent`] and [`FrameOutput`] values.

mod adapter;
mod config;
mod error;
mod events;
mod grid;
mod interp;
mod leaderboard;
mod palette;
mod player;
mod reconcile;
mod timing;
mod view;

pub use adapter::ClientAdapter;
pub use config::{Config, LeaderboardConfig, TimingConfig, ViewConfig};
pub use error::ViewError;
pub use events::{
    FrameOutput, PlayerVisual, SoundCue, SpriteKind, TileFill, TileUpdate, ViewEvent,
};
pub use grid::{
    classify_tile, decode_packed, encode_packed, screen_position, tile_updates, GridWindow,
    TileMaps,
};
pub use interp::Interpolator;
pub use leaderboard::{BarState, LeaderboardAnimator};
pub use palette::{Palette, Rgb, PALETTE_LEN};
pub use player::{RenderedPlayer, OFF_WINDOW};
pub use reconcile::Reconciler;
pub use timing::TickController;
pub use view::GameView;
