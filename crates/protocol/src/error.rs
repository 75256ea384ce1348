//! Protocol error types.

use thiserror::Error;

/// Errors that can occur during protocol parsing.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid packet opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Map payload length mismatch: expected {expected} bytes, got {actual}")]
    MapLength { expected: usize, actual: usize },

    #[error("Invalid direction value: {0}")]
    InvalidDirection(u8),

    #[error("Invalid player state value: {0}")]
    InvalidState(u8),
}
