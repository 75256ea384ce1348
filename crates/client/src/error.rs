//! View error types.

use protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the view core.
///
/// None of these are fatal to a session: a rejected snapshot leaves the last
/// good state rendered and the next request cycle recovers.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view has no registered player identity yet")]
    NotRegistered,

    #[error("snapshot window is {actual_rows}x{actual_cols}, session expects {rows}x{cols}")]
    WindowMismatch {
        rows: u16,
        cols: u16,
        actual_rows: u16,
        actual_cols: u16,
    },

    #[error("snapshot leaderboard is empty")]
    EmptyLeaderboard,

    #[error("leaderboard references unknown player {0}")]
    UnknownLeaderboardPlayer(u8),

    #[error("palette color {0:?} is not a #rrggbb value")]
    InvalidColor(String),

    #[error("palette must contain {expected} colors, got {actual}")]
    PaletteSize { expected: usize, actual: usize },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
