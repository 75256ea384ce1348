//! Shared protocol crate for native-splix.
//!
//! This crate contains:
//! - Binary reading/writing utilities
//! - Packet definitions, builders and parsers
//! - Shared types (GridPoint, Direction, PlayerState, etc.)

mod binary;
mod error;
pub mod packets;

pub use binary::{pack_cell, split_cell, BinaryReader, BinaryWriter};
pub use error::ProtocolError;

/// Color nibble value reserved for walls.
pub const WALL_CELL: u8 = 15;

/// Color nibble value for unclaimed ground.
pub const EMPTY_CELL: u8 = 0;

/// Represents an on-screen 2D position using glam's Vec2.
pub type Position = glam::Vec2;

/// Absolute grid coordinate (row, col). Signed so that positions one cell
/// outside the map edge can still be expressed during interpolation seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPoint {
    pub row: i16,
    pub col: i16,
}

impl GridPoint {
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }
}

/// Heading of a player or trail marker.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    pub fn from_u8(v: u8) -> Result<Self, ProtocolError> {
        match v {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Right),
            2 => Ok(Direction::Down),
            3 => Ok(Direction::Left),
            other => Err(ProtocolError::InvalidDirection(other)),
        }
    }

    /// Grid delta as (d_row, d_col) for one step along this heading.
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Unit vector in screen space, where +x points along increasing columns
    /// and +y along decreasing rows.
    pub fn vector(self) -> Position {
        let (dr, dc) = self.delta();
        Position::new(dc as f32, -(dr as f32))
    }
}

/// Per-player lifecycle state carried in every snapshot.
///
/// Transitions are snapshot-driven; the client never infers them locally
/// beyond interpolating `Moving` positions.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// Advancing one cell per broadcast round.
    Moving = 0,
    /// Died this round; the head explodes and leaves the window.
    Exploded = 1,
    /// Temporarily disconnected; position is held as-is.
    Ghost = 2,
    /// (Re)entered the world this round; the head snaps to its position.
    Spawned = 3,
}

impl PlayerState {
    pub fn from_u8(v: u8) -> Result<Self, ProtocolError> {
        match v {
            0 => Ok(PlayerState::Moving),
            1 => Ok(PlayerState::Exploded),
            2 => Ok(PlayerState::Ghost),
            3 => Ok(PlayerState::Spawned),
            other => Err(ProtocolError::InvalidState(other)),
        }
    }

    /// True for states that keep the head on the board.
    pub fn is_alive(self) -> bool {
        matches!(self, PlayerState::Moving | PlayerState::Spawned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_vector_matches_delta() {
        for d in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ] {
            let (dr, dc) = d.delta();
            assert_eq!(d.vector(), Position::new(dc as f32, -dr as f32));
        }
        // Rows grow downward on the grid, so "up" points at +y on screen.
        assert_eq!(Direction::Up.vector(), Position::new(0.0, 1.0));
    }
}
