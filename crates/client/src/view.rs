//! The view core: snapshot intake on one side, frame output on the other.

use std::collections::HashMap;

use protocol::packets::Snapshot;
use protocol::Direction;
use tracing::{debug, info, warn};

use crate::adapter::ClientAdapter;
use crate::config::Config;
use crate::error::ViewError;
use crate::events::{FrameOutput, PlayerVisual, SoundCue, ViewEvent};
use crate::grid::{self, TileMaps};
use crate::interp::Interpolator;
use crate::leaderboard::LeaderboardAnimator;
use crate::palette::{Palette, Rgb};
use crate::player::RenderedPlayer;
use crate::reconcile::Reconciler;
use crate::timing::TickController;

/// Identity assigned by the server at registration.
#[derive(Debug)]
struct Registration {
    room_id: u16,
    reconciler: Reconciler,
}

/// Owns the whole client-side world picture for one session.
///
/// Single-threaded and frame-driven: the host calls [`on_snapshot`] when the
/// transport delivers a world update and [`on_frame`] once per rendered
/// frame; the two never run concurrently. All grids and player state are
/// replaced by assignment on each snapshot, never mutated in place.
///
/// [`on_snapshot`]: GameView::on_snapshot
/// [`on_frame`]: GameView::on_frame
pub struct GameView<A: ClientAdapter> {
    adapter: A,
    config: Config,
    palette: Palette,
    rows: u16,
    cols: u16,
    registration: Option<Registration>,
    maps: TileMaps,
    tick: TickController,
    interp: Interpolator,
    board: LeaderboardAnimator,
    rendered: HashMap<u8, RenderedPlayer>,
}

impl<A: ClientAdapter> GameView<A> {
    /// Build a view for one session. The window size is derived here, once,
    /// from the viewport aspect ratio and stays fixed afterwards.
    pub fn new(
        adapter: A,
        config: Config,
        view_width: f32,
        view_height: f32,
    ) -> Result<Self, ViewError> {
        let palette = Palette::from_hex_list(&config.palette)?;
        let rows = config.view.rows;
        let cols = config.view.visible_cols(view_width, view_height);
        let tick = TickController::new(
            config.timing.next_duration_ms,
            config.timing.time_epsilon_ms,
        );
        let board = LeaderboardAnimator::new(config.leaderboard.top_n);
        info!(rows, cols, "view window sized");
        Ok(Self {
            adapter,
            config,
            palette,
            rows,
            cols,
            registration: None,
            maps: TileMaps::default(),
            tick,
            interp: Interpolator::new(),
            board,
            rendered: HashMap::new(),
        })
    }

    /// Adopt the identity the server assigned, announce the viewport and
    /// request the first snapshot.
    pub fn register(&mut self, player_id: u8, room_id: u16, now_ms: f64) {
        info!(player_id, room_id, "registered in room");
        self.registration = Some(Registration {
            room_id,
            reconciler: Reconciler::new(player_id),
        });
        self.adapter
            .register_viewport(player_id, room_id, self.rows, self.cols);
        self.adapter.request_snapshot(now_ms);
    }

    pub fn local_player_id(&self) -> Option<u8> {
        self.registration.as_ref().map(|r| r.reconciler.local_id())
    }

    pub fn room_id(&self) -> Option<u16> {
        self.registration.as_ref().map(|r| r.room_id)
    }

    /// Current broadcast period estimate in milliseconds.
    pub fn next_duration_ms(&self) -> f64 {
        self.tick.duration_ms()
    }

    /// The installed tile windows, for presentation layers that want direct
    /// cell reads beyond the per-snapshot diff.
    pub fn maps(&self) -> &TileMaps {
        &self.maps
    }

    /// Random (light, dark) color pair for loading screen accents.
    pub fn loading_accent(&self) -> (Rgb, Rgb) {
        self.palette.random_accent()
    }

    /// Consume one authoritative snapshot.
    ///
    /// Validation happens before any state is touched: a rejected snapshot
    /// leaves the previous windows rendered and the tick estimate unchanged,
    /// but still re-arms the request window so the session keeps asking for
    /// a fresh snapshot. On success, returns the discrete presentation
    /// events in order.
    pub fn on_snapshot(
        &mut self,
        snapshot: &Snapshot,
        arrival_deviation_ms: f64,
    ) -> Result<Vec<ViewEvent>, ViewError> {
        let out = self.apply_snapshot(snapshot, arrival_deviation_ms);
        if out.is_err() && self.registration.is_some() {
            // The reply was consumed even though it was unusable; without a
            // new window no frame would ever request again.
            self.interp.arm(self.tick.window_secs());
        }
        out
    }

    fn apply_snapshot(
        &mut self,
        snapshot: &Snapshot,
        arrival_deviation_ms: f64,
    ) -> Result<Vec<ViewEvent>, ViewError> {
        let Some(reg) = self.registration.as_mut() else {
            return Err(ViewError::NotRegistered);
        };

        if snapshot.rows != self.rows || snapshot.cols != self.cols {
            warn!(
                rows = snapshot.rows,
                cols = snapshot.cols,
                "rejecting snapshot with wrong window size"
            );
            return Err(ViewError::WindowMismatch {
                rows: self.rows,
                cols: self.cols,
                actual_rows: snapshot.rows,
                actual_cols: snapshot.cols,
            });
        }
        let (color, track) =
            grid::decode_packed(snapshot.origin, self.rows, self.cols, &snapshot.map)?;
        if snapshot.leaderboard.is_empty() {
            warn!("rejecting snapshot with empty leaderboard");
            return Err(ViewError::EmptyLeaderboard);
        }
        if let Some(bad) = snapshot
            .leaderboard
            .iter()
            .find(|e| !snapshot.players.iter().any(|p| p.id == e.player_id))
        {
            warn!(player = bad.player_id, "rejecting snapshot with unknown ranked player");
            return Err(ViewError::UnknownLeaderboardPlayer(bad.player_id));
        }

        // Accepted: from here on the snapshot is consumed atomically.
        self.tick.adjust(arrival_deviation_ms);

        let mut marker_tiles = Vec::new();
        let mut events = Vec::new();
        reg.reconciler.apply(
            &snapshot.players,
            &mut self.rendered,
            &color,
            self.config.view.cell_size,
            self.config.view.angle_opacity,
            &self.palette,
            &mut marker_tiles,
            &mut events,
        );

        self.maps.install(color, track);
        let mut tiles = grid::tile_updates(
            &self.maps,
            &self.palette,
            &self.config.view,
            self.tick.duration_ms(),
        );
        // Directional markers overlay the base trail tiles.
        tiles.append(&mut marker_tiles);

        self.board.retarget(
            &snapshot.leaderboard,
            &snapshot.players,
            &self.palette,
            self.tick.window_secs(),
        );
        if let Some(mine) = snapshot
            .leaderboard
            .iter()
            .find(|e| e.player_id == reg.reconciler.local_id())
        {
            reg.reconciler.set_last_ratio(mine.occupancy_ratio);
        }

        let mut out = Vec::with_capacity(events.len() + 3);
        out.push(ViewEvent::Tiles(tiles));
        out.append(&mut events);
        if let Some(cue) = SoundCue::from_fx(snapshot.sound_fx) {
            out.push(ViewEvent::Sound(cue));
        }
        reg.reconciler.check_respawn(&snapshot.players, &mut out);

        self.interp.arm(self.tick.window_secs());
        debug!(
            players = snapshot.players.len(),
            duration_ms = self.tick.duration_ms(),
            "applied snapshot"
        );
        Ok(out)
    }

    /// Advance one rendered frame of size `dt_s` seconds.
    ///
    /// When the interpolation window runs out this requests the next
    /// snapshot through the adapter, exactly once per window, stamped with
    /// `now_ms`.
    pub fn on_frame(&mut self, dt_s: f64, now_ms: f64) -> FrameOutput {
        let speed = self.config.view.cell_size / self.tick.duration_ms() as f32 * 1000.0;
        let fetch = self.interp.advance(dt_s, speed, &mut self.rendered);
        if fetch {
            self.adapter.request_snapshot(now_ms);
        }

        let mut players: Vec<PlayerVisual> = self
            .rendered
            .values()
            .map(|p| PlayerVisual {
                id: p.id,
                position: p.visual,
                state: p.state,
            })
            .collect();
        players.sort_by_key(|p| p.id);

        FrameOutput {
            players,
            bars: self.board.animate(dt_s),
            snapshot_requested: fetch,
        }
    }

    /// Forward a heading change for the local player.
    pub fn change_direction(&mut self, direction: Direction) -> Result<(), ViewError> {
        let id = self.local_player_id().ok_or(ViewError::NotRegistered)?;
        self.adapter.change_direction(id, direction);
        Ok(())
    }

    /// The host's respawn policy decided to continue this player.
    pub fn respawn_decided(&mut self) -> Result<(), ViewError> {
        let Some(reg) = self.registration.as_mut() else {
            return Err(ViewError::NotRegistered);
        };
        reg.reconciler.respawn_decided();
        let id = reg.reconciler.local_id();
        self.adapter.respawn(id);
        Ok(())
    }

    /// Leave the session and tear the view down.
    pub fn leave(&mut self) -> Result<(), ViewError> {
        let id = self.local_player_id().ok_or(ViewError::NotRegistered)?;
        self.adapter.leave(id);
        self.shutdown();
        Ok(())
    }

    /// Cancel the pending snapshot request cycle. Safe to call more than
    /// once; after this no frame can re-enter the adapter.
    pub fn shutdown(&mut self) {
        info!("view shut down");
        self.interp.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use protocol::packets::{LeaderboardEntry, PlayerUpdate, TrackMark};
    use protocol::{GridPoint, PlayerState, Position};

    #[derive(Debug, PartialEq)]
    enum Call {
        Viewport(u8, u16, u16, u16),
        Request(f64),
        Direction(u8, Direction),
        Respawn(u8),
        Leave(u8),
    }

    #[derive(Default)]
    struct RecordingAdapter {
        calls: Vec<Call>,
    }

    impl ClientAdapter for RecordingAdapter {
        fn register_viewport(&mut self, player_id: u8, room_id: u16, rows: u16, cols: u16) {
            self.calls.push(Call::Viewport(player_id, room_id, rows, cols));
        }
        fn request_snapshot(&mut self, request_timestamp_ms: f64) {
            self.calls.push(Call::Request(request_timestamp_ms));
        }
        fn change_direction(&mut self, player_id: u8, direction: Direction) {
            self.calls.push(Call::Direction(player_id, direction));
        }
        fn respawn(&mut self, player_id: u8) {
            self.calls.push(Call::Respawn(player_id));
        }
        fn leave(&mut self, player_id: u8) {
            self.calls.push(Call::Leave(player_id));
        }
    }

    const ROWS: u16 = 20;
    const COLS: u16 = 34;

    fn view() -> GameView<RecordingAdapter> {
        // 16:9 viewport with the default 20 rows derives 34 columns.
        GameView::new(
            RecordingAdapter::default(),
            Config::default(),
            1920.0,
            1080.0,
        )
        .unwrap()
    }

    fn registered_view() -> GameView<RecordingAdapter> {
        let mut v = view();
        v.register(1, 7, 0.0);
        v.adapter.calls.clear();
        v
    }

    fn snapshot(players: Vec<PlayerUpdate>, leaderboard: Vec<LeaderboardEntry>) -> Snapshot {
        Snapshot {
            origin: GridPoint::new(0, 0),
            rows: ROWS,
            cols: COLS,
            map: Bytes::from(vec![0u8; ROWS as usize * COLS as usize]),
            players,
            leaderboard,
            sound_fx: 0,
            server_timestamp_ms: 0.0,
        }
    }

    fn moving(id: u8, head: GridPoint) -> PlayerUpdate {
        PlayerUpdate {
            id,
            head,
            direction: Direction::Right,
            state: PlayerState::Moving,
            kill_count: 0,
            tracks: Vec::new(),
        }
    }

    fn entry(player_id: u8, occupancy_ratio: f32) -> LeaderboardEntry {
        LeaderboardEntry {
            player_id,
            occupancy_ratio,
        }
    }

    #[test]
    fn test_register_announces_viewport_and_requests() {
        let mut v = view();
        v.register(1, 7, 42.0);
        assert_eq!(
            v.adapter.calls,
            vec![Call::Viewport(1, 7, ROWS, COLS), Call::Request(42.0)]
        );
        assert_eq!(v.local_player_id(), Some(1));
        assert_eq!(v.room_id(), Some(7));
    }

    #[test]
    fn test_snapshot_before_registration_is_rejected() {
        let mut v = view();
        let snap = snapshot(vec![moving(1, GridPoint::new(2, 2))], vec![entry(1, 0.1)]);
        assert!(matches!(
            v.on_snapshot(&snap, 0.0),
            Err(ViewError::NotRegistered)
        ));
    }

    #[test]
    fn test_rejected_snapshot_preserves_state() {
        let mut v = registered_view();
        let good = snapshot(vec![moving(1, GridPoint::new(2, 2))], vec![entry(1, 0.1)]);
        v.on_snapshot(&good, 25.0).unwrap();
        assert_eq!(v.next_duration_ms(), 210.0);

        // Wrong map length: rejected before anything advances.
        let mut bad = good.clone();
        bad.map = Bytes::from(vec![0u8; 5]);
        assert!(matches!(
            v.on_snapshot(&bad, 25.0),
            Err(ViewError::Protocol(protocol::ProtocolError::MapLength { .. }))
        ));
        assert_eq!(v.next_duration_ms(), 210.0);
        assert!(v.maps().color().is_some());

        // Leaderboard naming an absent player is also a rejection.
        let mut bad = good.clone();
        bad.leaderboard = vec![entry(9, 0.5)];
        assert!(matches!(
            v.on_snapshot(&bad, 25.0),
            Err(ViewError::UnknownLeaderboardPlayer(9))
        ));
        let mut bad = good.clone();
        bad.leaderboard.clear();
        assert!(matches!(
            v.on_snapshot(&bad, 25.0),
            Err(ViewError::EmptyLeaderboard)
        ));
        assert_eq!(v.next_duration_ms(), 210.0);
    }

    #[test]
    fn test_frame_advance_matches_spec_speed() {
        let mut v = registered_view();
        let snap = snapshot(vec![moving(1, GridPoint::new(0, 3))], vec![entry(1, 0.1)]);
        v.on_snapshot(&snap, 0.0).unwrap();

        // Default config: cell 40, window 200ms, so 100ms moves 20 units.
        // The head was seeded one cell behind (0,2) = (80, 0).
        let out = v.on_frame(0.1, 0.0);
        assert!(!out.snapshot_requested);
        assert_eq!(out.players.len(), 1);
        assert_eq!(out.players[0].position, Position::new(100.0, 0.0));
    }

    #[test]
    fn test_window_expiry_requests_exactly_once() {
        let mut v = registered_view();
        let snap = snapshot(vec![moving(1, GridPoint::new(0, 3))], vec![entry(1, 0.1)]);
        v.on_snapshot(&snap, 0.0).unwrap();

        let out = v.on_frame(0.15, 1.0);
        assert!(!out.snapshot_requested);
        let out = v.on_frame(0.15, 2.0);
        assert!(out.snapshot_requested);
        // Held at the target while the next snapshot is late; no re-request.
        let out = v.on_frame(0.5, 3.0);
        assert!(!out.snapshot_requested);
        assert_eq!(out.players[0].position, Position::new(120.0, 0.0));
        assert_eq!(v.adapter.calls, vec![Call::Request(2.0)]);

        // The next snapshot re-arms the cycle.
        v.on_snapshot(&snap, 0.0).unwrap();
        let out = v.on_frame(0.5, 4.0);
        assert!(out.snapshot_requested);
    }

    #[test]
    fn test_rejected_snapshot_keeps_request_cycle_alive() {
        let mut v = registered_view();
        let good = snapshot(vec![moving(1, GridPoint::new(0, 3))], vec![entry(1, 0.1)]);
        v.on_snapshot(&good, 0.0).unwrap();
        assert!(v.on_frame(0.5, 1.0).snapshot_requested);

        // The requested snapshot comes back malformed.
        let mut bad = good.clone();
        bad.map = Bytes::from(vec![0u8; 5]);
        assert!(v.on_snapshot(&bad, 0.0).is_err());

        // One window later the session asks again instead of stalling.
        assert!(!v.on_frame(0.1, 2.0).snapshot_requested);
        assert!(v.on_frame(0.5, 3.0).snapshot_requested);
        assert_eq!(v.adapter.calls, vec![Call::Request(1.0), Call::Request(3.0)]);
    }

    #[test]
    fn test_shutdown_cancels_pending_request() {
        let mut v = registered_view();
        let snap = snapshot(vec![moving(1, GridPoint::new(0, 3))], vec![entry(1, 0.1)]);
        v.on_snapshot(&snap, 0.0).unwrap();
        v.shutdown();
        let out = v.on_frame(1.0, 5.0);
        assert!(!out.snapshot_requested);
        assert!(v.adapter.calls.is_empty());
    }

    #[test]
    fn test_snapshot_event_assembly() {
        let mut v = registered_view();
        let mut p = moving(1, GridPoint::new(0, 3));
        p.tracks = vec![TrackMark {
            point: GridPoint::new(0, 2),
            direction: Direction::Right,
        }];
        let mut snap = snapshot(vec![p], vec![entry(1, 0.1)]);
        snap.sound_fx = 2;
        let events = v.on_snapshot(&snap, 0.0).unwrap();

        let ViewEvent::Tiles(tiles) = &events[0] else {
            panic!("first event must be the tile diff");
        };
        // Two layers per cell plus the one directional marker.
        assert_eq!(tiles.len(), ROWS as usize * COLS as usize * 2 + 1);
        assert!(events.contains(&ViewEvent::Sound(SoundCue::Kill)));
    }

    #[test]
    fn test_local_death_reports_last_known_ratio() {
        let mut v = registered_view();
        let spawn = PlayerUpdate {
            state: PlayerState::Spawned,
            ..moving(1, GridPoint::new(0, 3))
        };
        v.on_snapshot(&snapshot(vec![spawn], vec![entry(1, 0.37)]), 0.0)
            .unwrap();

        let dead = PlayerUpdate {
            state: PlayerState::Exploded,
            kill_count: 5,
            ..moving(1, GridPoint::new(0, 4))
        };
        let events = v
            .on_snapshot(&snapshot(vec![dead.clone()], vec![entry(1, 0.29)]), 0.0)
            .unwrap();
        assert!(events.contains(&ViewEvent::FinalScore {
            occupancy_ratio: 0.29,
            kill_count: 5
        }));
        assert!(events.contains(&ViewEvent::RespawnOffered {
            has_respawned: false
        }));

        // A repeat of the terminal snapshot offers nothing further.
        let events = v
            .on_snapshot(&snapshot(vec![dead], vec![entry(1, 0.0)]), 0.0)
            .unwrap();
        assert!(!events.iter().any(|e| matches!(e, ViewEvent::RespawnOffered { .. })));
    }

    #[test]
    fn test_command_forwarding() {
        let mut v = view();
        assert!(matches!(
            v.change_direction(Direction::Up),
            Err(ViewError::NotRegistered)
        ));

        let mut v = registered_view();
        v.change_direction(Direction::Up).unwrap();
        v.respawn_decided().unwrap();
        v.leave().unwrap();
        assert_eq!(
            v.adapter.calls,
            vec![
                Call::Direction(1, Direction::Up),
                Call::Respawn(1),
                Call::Leave(1)
            ]
        );
    }
}
