//! Server -> Client packet building and parsing.

use bytes::Bytes;

use crate::{BinaryReader, BinaryWriter, Direction, GridPoint, PlayerState, ProtocolError};

/// Registration reply (0x01).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Welcome {
    pub player_id: u8,
    pub room_id: u16,
}

/// A directional trail marker emitted for a cell inside the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackMark {
    pub point: GridPoint,
    pub direction: Direction,
}

/// Per-player data carried in every snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerUpdate {
    /// Stable 1-based identity, valid for the whole match.
    pub id: u8,
    pub head: GridPoint,
    pub direction: Direction,
    pub state: PlayerState,
    pub kill_count: u16,
    /// Trail markers for cells within the current window only.
    pub tracks: Vec<TrackMark>,
}

/// One row of the server-side ranking, ordered descending by ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeaderboardEntry {
    pub player_id: u8,
    /// Share of the board owned by this player, in `[0, 1]`.
    pub occupancy_ratio: f32,
}

/// One atomic authoritative world update (0x10).
///
/// The map payload is one byte per visible cell in row-major order starting
/// at `origin`: high nibble = trail owner, low nibble = tile owner/wall.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub origin: GridPoint,
    pub rows: u16,
    pub cols: u16,
    pub map: Bytes,
    pub players: Vec<PlayerUpdate>,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Sound cue for this round; 0 = silence.
    pub sound_fx: u8,
    /// Echo of the client's request timestamp, in ms.
    pub server_timestamp_ms: f64,
}

/// Build a Welcome packet (0x01).
pub fn build_welcome(player_id: u8, room_id: u16) -> BinaryWriter {
    let mut w = BinaryWriter::with_capacity(4);
    w.put_u8(0x01);
    w.put_u8(player_id);
    w.put_u16(room_id);
    w
}

impl Welcome {
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = BinaryReader::new(data.to_vec());
        match r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)? {
            0x01 => {}
            other => return Err(ProtocolError::InvalidOpcode(other)),
        }
        let player_id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
        let room_id = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;
        Ok(Welcome { player_id, room_id })
    }
}

/// Build a Snapshot packet (0x10).
///
/// Fails if the map payload does not cover exactly `rows * cols` cells.
pub fn build_snapshot(s: &Snapshot) -> Result<BinaryWriter, ProtocolError> {
    let expected = s.rows as usize * s.cols as usize;
    if s.map.len() != expected {
        return Err(ProtocolError::MapLength {
            expected,
            actual: s.map.len(),
        });
    }

    let mut w = BinaryWriter::with_capacity(32 + expected + s.players.len() * 16);
    w.put_u8(0x10);
    w.put_i16(s.origin.row);
    w.put_i16(s.origin.col);
    w.put_u16(s.rows);
    w.put_u16(s.cols);
    w.put_slice(&s.map);

    w.put_u8(s.players.len() as u8);
    for p in &s.players {
        w.put_u8(p.id);
        w.put_i16(p.head.row);
        w.put_i16(p.head.col);
        w.put_u8(p.direction as u8);
        w.put_u8(p.state as u8);
        w.put_u16(p.kill_count);
        w.put_u16(p.tracks.len() as u16);
        for t in &p.tracks {
            w.put_i16(t.point.row);
            w.put_i16(t.point.col);
            w.put_u8(t.direction as u8);
        }
    }

    w.put_u8(s.leaderboard.len() as u8);
    for e in &s.leaderboard {
        w.put_u8(e.player_id);
        w.put_f32(e.occupancy_ratio);
    }

    w.put_u8(s.sound_fx);
    w.put_f64(s.server_timestamp_ms);
    Ok(w)
}

impl Snapshot {
    /// Parse a Snapshot packet from raw bytes.
    pub fn parse(data: &[u8]) -> Result<Self, ProtocolError> {
        let mut r = BinaryReader::new(data.to_vec());
        match r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)? {
            0x10 => {}
            other => return Err(ProtocolError::InvalidOpcode(other)),
        }

        let origin = GridPoint::new(
            r.try_get_i16().ok_or(ProtocolError::UnexpectedEof)?,
            r.try_get_i16().ok_or(ProtocolError::UnexpectedEof)?,
        );
        let rows = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;
        let cols = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;

        let expected = rows as usize * cols as usize;
        let map = r
            .try_get_bytes(expected)
            .ok_or(ProtocolError::MapLength {
                expected,
                actual: r.remaining(),
            })?;

        let player_count = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
        let mut players = Vec::with_capacity(player_count as usize);
        for _ in 0..player_count {
            let id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
            let head = GridPoint::new(
                r.try_get_i16().ok_or(ProtocolError::UnexpectedEof)?,
                r.try_get_i16().ok_or(ProtocolError::UnexpectedEof)?,
            );
            let direction =
                Direction::from_u8(r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?)?;
            let state =
                PlayerState::from_u8(r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?)?;
            let kill_count = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;

            let track_count = r.try_get_u16().ok_or(ProtocolError::UnexpectedEof)?;
            let mut tracks = Vec::with_capacity(track_count as usize);
            for _ in 0..track_count {
                let point = GridPoint::new(
                    r.try_get_i16().ok_or(ProtocolError::UnexpectedEof)?,
                    r.try_get_i16().ok_or(ProtocolError::UnexpectedEof)?,
                );
                let direction =
                    Direction::from_u8(r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?)?;
                tracks.push(TrackMark { point, direction });
            }

            players.push(PlayerUpdate {
                id,
                head,
                direction,
                state,
                kill_count,
                tracks,
            });
        }

        let board_count = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
        let mut leaderboard = Vec::with_capacity(board_count as usize);
        for _ in 0..board_count {
            let player_id = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
            let occupancy_ratio = r.try_get_f32().ok_or(ProtocolError::UnexpectedEof)?;
            leaderboard.push(LeaderboardEntry {
                player_id,
                occupancy_ratio,
            });
        }

        let sound_fx = r.try_get_u8().ok_or(ProtocolError::UnexpectedEof)?;
        let server_timestamp_ms = r.try_get_f64().ok_or(ProtocolError::UnexpectedEof)?;

        Ok(Snapshot {
            origin,
            rows,
            cols,
            map,
            players,
            leaderboard,
            sound_fx,
            server_timestamp_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            origin: GridPoint::new(2, 5),
            rows: 2,
            cols: 3,
            map: Bytes::from_static(&[0x31, 0x00, 0x0F, 0x12, 0x01, 0x21]),
            players: vec![PlayerUpdate {
                id: 1,
                head: GridPoint::new(2, 6),
                direction: Direction::Right,
                state: PlayerState::Moving,
                kill_count: 3,
                tracks: vec![TrackMark {
                    point: GridPoint::new(2, 5),
                    direction: Direction::Right,
                }],
            }],
            leaderboard: vec![LeaderboardEntry {
                player_id: 1,
                occupancy_ratio: 0.25,
            }],
            sound_fx: 2,
            server_timestamp_ms: 1700000000500.0,
        }
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = sample_snapshot();
        let data = build_snapshot(&snapshot).unwrap().finish();
        assert_eq!(Snapshot::parse(&data).unwrap(), snapshot);
    }

    #[test]
    fn test_snapshot_truncated_map() {
        let snapshot = sample_snapshot();
        let data = build_snapshot(&snapshot).unwrap().finish();
        // Chop the packet inside the map payload.
        let err = Snapshot::parse(&data[..10]).unwrap_err();
        assert!(matches!(err, ProtocolError::MapLength { expected: 6, .. }));
    }

    #[test]
    fn test_build_rejects_short_map() {
        let mut snapshot = sample_snapshot();
        snapshot.map = Bytes::from_static(&[0x31]);
        assert!(matches!(
            build_snapshot(&snapshot),
            Err(ProtocolError::MapLength {
                expected: 6,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_welcome_roundtrip() {
        let data = build_welcome(7, 3).finish();
        assert_eq!(
            Welcome::parse(&data).unwrap(),
            Welcome {
                player_id: 7,
                room_id: 3
            }
        );
    }
}
