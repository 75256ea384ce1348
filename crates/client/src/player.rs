//! Per-player rendered state.

use protocol::{Direction, PlayerState, Position};

/// Parking spot for heads that left the board.
pub const OFF_WINDOW: Position = Position::new(1e9, 1e9);

/// The view-side twin of one server player: where its head is drawn right
/// now and where the current interpolation window is taking it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPlayer {
    pub id: u8,
    /// Screen position drawn this frame.
    pub visual: Position,
    /// Screen position of the snapshot head cell.
    pub target: Position,
    pub state: PlayerState,
    pub direction: Direction,
}

impl RenderedPlayer {
    /// A head snapped to a fixed position with no pending motion.
    pub fn snapped(id: u8, position: Position, state: PlayerState, direction: Direction) -> Self {
        Self {
            id,
            visual: position,
            target: position,
            state,
            direction,
        }
    }
}
