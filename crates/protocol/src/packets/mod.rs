//! Packet definitions for the splix protocol.
//!
//! This module contains both client->server and server->client packet types.

mod client;
mod server;

pub use client::*;
pub use server::*;

/// Opcodes for client -> server packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOpcode {
    /// Join a room and request a player identity.
    Register = 0x00,
    /// Announce the viewport window size for snapshot broadcasts.
    RegisterViewport = 0x01,
    /// Request the next world snapshot.
    RequestWorld = 0x10,
    /// Change the local player's heading.
    ChangeDirection = 0x11,
    /// Continue after death.
    Respawn = 0x12,
    /// Leave the session.
    Leave = 0x13,
}

/// Opcodes for server -> client packets.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOpcode {
    /// Registration reply carrying player and room ids.
    Welcome = 0x01,
    /// Authoritative world snapshot.
    Snapshot = 0x10,
}
