//! Client -> Server packet building and parsing.

use crate::{BinaryReader, BinaryWriter, Direction, ProtocolError};

/// Parsed client packet.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    /// Join a room (0x00).
    Register,
    /// Viewport announcement (0x01).
    RegisterViewport {
        player_id: u8,
        room_id: u16,
        rows: u16,
        cols: u16,
    },
    /// Snapshot request (0x10) carrying the client's send timestamp in ms.
    RequestWorld { timestamp_ms: f64 },
    /// Heading change (0x11).
    ChangeDirection { player_id: u8, direction: Direction },
    /// Continue after death (0x12).
    Respawn { player_id: u8 },
    /// Leave the session (0x13).
    Leave { player_id: u8 },
}

impl ClientPacket {
    /// Parse a client packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        if data.is_empty() {
            return Err(ProtocolError::UnexpectedEof);
        }

        let mut r = BinaryReader::new(data.to_vec());
        let opcode = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;

        match opcode {
            0x00 => Ok(ClientPacket::Register),
            0x01 => {
                let player_id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
                let room_id = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;
                let rows = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;
                let cols = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;
                Ok(ClientPacket::RegisterViewport {
                    player_id,
                    room_id,
                    rows,
                    cols,
                })
            }
            0x10 => {
                let timestamp_ms = r.try_get_f64().ok_or(ProtocolError::UnexpectedEof)?;
                Ok(ClientPacket::RequestWorld { timestamp_ms })
            }
            0x11 => {
                let player_id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
                let dir = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
                Ok(ClientPacket::ChangeDirection {
                    player_id,
                    direction: Direction::from_u8(dir)?,
                })
            }
            0x12 => {
                let player_id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
                Ok(ClientPacket::Respawn { player_id })
            }
            0x13 => {
                let player_id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
                Ok(ClientPacket::Leave { player_id })
            }
            _ => Err(ProtocolError::InvalidOpcode(opcode)),
        }
    }

    /// Serialize this packet for sending.
    pub fn build(&self) -> BinaryWriter {
        match *self {
            ClientPacket::Register => {
                let mut w = BinaryWriter::with_capacity(1);
                w.put_u8(0x00);
                w
            }
            ClientPacket::RegisterViewport {
                player_id,
                room_id,
                rows,
                cols,
            } => {
                let mut w = BinaryWriter::with_capacity(8);
                w.put_u8(0x01);
                w.put_u8(player_id);
                w.put_u16(room_id);
                w.put_u16(rows);
                w.put_u16(cols);
                w
            }
            ClientPacket::RequestWorld { timestamp_ms } => {
                let mut w = BinaryWriter::with_capacity(9);
                w.put_u8(0x10);
                w.put_f64(timestamp_ms);
                w
            }
            ClientPacket::ChangeDirection {
                player_id,
                direction,
            } => {
                let mut w = BinaryWriter::with_capacity(3);
                w.put_u8(0x11);
                w.put_u8(player_id);
                w.put_u8(direction as u8);
                w
            }
            ClientPacket::Respawn { player_id } => {
                let mut w = BinaryWriter::with_capacity(2);
                w.put_u8(0x12);
                w.put_u8(player_id);
                w
            }
            ClientPacket::Leave { player_id } => {
                let mut w = BinaryWriter::with_capacity(2);
                w.put_u8(0x13);
                w.put_u8(player_id);
                w
            }
        }
    }
}
