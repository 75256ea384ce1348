//! Outbound boundary toward the transport layer.

use protocol::Direction;

/// What the view core needs from whoever owns the connection.
///
/// Calls are fire-and-forget: delivery failures are the adapter's problem and
/// always recoverable by the next request cycle, so nothing here returns an
/// error to the core.
pub trait ClientAdapter {
    /// Announce the fixed window size for this session's snapshots.
    fn register_viewport(&mut self, player_id: u8, room_id: u16, rows: u16, cols: u16);

    /// Ask the server for the next world snapshot.
    fn request_snapshot(&mut self, request_timestamp_ms: f64);

    /// Change the local player's heading.
    fn change_direction(&mut self, player_id: u8, direction: Direction);

    /// Continue after death.
    fn respawn(&mut self, player_id: u8);

    /// Leave the session.
    fn leave(&mut self, player_id: u8);
}
