//! Snapshot-driven player state reconciliation.

use std::collections::HashMap;

use protocol::{packets::PlayerUpdate, PlayerState};
use tracing::trace;

use crate::events::{SpriteKind, TileFill, TileUpdate, ViewEvent};
use crate::grid::{screen_position, GridWindow};
use crate::palette::Palette;
use crate::player::{RenderedPlayer, OFF_WINDOW};

/// Classifies each player's transition against its last rendered state and
/// emits the matching presentation events.
///
/// Also owns the local player's death bookkeeping: the respawn offer is
/// idempotent per life (`asking` latches on the first terminal observation
/// and only a Spawned snapshot releases it), and `has_respawned` remembers
/// whether a continuation was already used this match.
#[derive(Debug)]
pub struct Reconciler {
    local_id: u8,
    asking: bool,
    has_respawned: bool,
    last_ratio: f32,
}

impl Reconciler {
    /// `asking` starts latched: the player is not on the board until the
    /// first Spawned snapshot arrives.
    pub fn new(local_id: u8) -> Self {
        Self {
            local_id,
            asking: true,
            has_respawned: false,
            last_ratio: 0.0,
        }
    }

    pub fn local_id(&self) -> u8 {
        self.local_id
    }

    /// The host answered the respawn offer with a continuation.
    pub fn respawn_decided(&mut self) {
        self.has_respawned = true;
    }

    /// Remember the local player's most recent occupancy ratio so the final
    /// score can be reported after the player left the board.
    pub fn set_last_ratio(&mut self, ratio: f32) {
        self.last_ratio = ratio;
    }

    /// Reconcile every player in the new snapshot against its rendered twin.
    /// Trail markers land in `tiles`, discrete transitions in `events`.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &mut self,
        players: &[PlayerUpdate],
        rendered: &mut HashMap<u8, RenderedPlayer>,
        window: &GridWindow,
        cell_size: f32,
        angle_opacity: u8,
        palette: &Palette,
        tiles: &mut Vec<TileUpdate>,
        events: &mut Vec<ViewEvent>,
    ) {
        rendered.retain(|id, _| players.iter().any(|p| p.id == *id));

        for p in players {
            let head_pos = screen_position(cell_size, p.head);
            let prev = rendered.get(&p.id).copied();

            match p.state {
                PlayerState::Spawned => {
                    rendered.insert(
                        p.id,
                        RenderedPlayer::snapped(p.id, head_pos, p.state, p.direction),
                    );
                    events.push(ViewEvent::PlayerSpawned {
                        id: p.id,
                        position: head_pos,
                    });
                    if p.id == self.local_id {
                        events.push(ViewEvent::CameraFollow { id: p.id });
                        self.asking = false;
                    }
                }
                PlayerState::Exploded => {
                    let already_dead = prev.is_some_and(|q| q.state == PlayerState::Exploded);
                    rendered.insert(
                        p.id,
                        RenderedPlayer::snapped(p.id, OFF_WINDOW, p.state, p.direction),
                    );
                    if !already_dead {
                        if p.id == self.local_id {
                            events.push(ViewEvent::CameraRelease);
                        }
                        events.push(ViewEvent::Explosion {
                            id: p.id,
                            position: head_pos,
                            color: palette.dark(p.id),
                        });
                    }
                }
                PlayerState::Moving => {
                    // Seed from the rendered position when one exists;
                    // otherwise back-compute one cell behind the head so the
                    // very first frame already has a sensible start point.
                    let visual = match prev {
                        Some(q) if q.state.is_alive() => q.visual,
                        _ => head_pos - p.direction.vector() * cell_size,
                    };
                    rendered.insert(
                        p.id,
                        RenderedPlayer {
                            id: p.id,
                            visual,
                            target: head_pos,
                            state: p.state,
                            direction: p.direction,
                        },
                    );
                }
                PlayerState::Ghost => {
                    // Hold in place until the connection resolves.
                    let held = prev.unwrap_or_else(|| {
                        RenderedPlayer::snapped(p.id, head_pos, p.state, p.direction)
                    });
                    rendered.insert(
                        p.id,
                        RenderedPlayer {
                            state: PlayerState::Ghost,
                            ..held
                        },
                    );
                }
            }

            for t in &p.tracks {
                if window.contains(t.point.row, t.point.col) {
                    tiles.push(TileUpdate {
                        point: t.point,
                        sprite: SpriteKind::TrailMarker(t.direction),
                        fill: TileFill::Static(palette.light(p.id)),
                        opacity: angle_opacity,
                    });
                }
            }

            trace!(
                player = p.id,
                state = ?p.state,
                tracks = p.tracks.len(),
                "reconciled player"
            );
        }
    }

    /// After the ranking update, offer the local player a respawn decision if
    /// its terminal state was observed for the first time this life.
    pub fn check_respawn(&mut self, players: &[PlayerUpdate], events: &mut Vec<ViewEvent>) {
        let Some(lp) = players.iter().find(|p| p.id == self.local_id) else {
            return;
        };
        if !self.asking && lp.state == PlayerState::Exploded {
            self.asking = true;
            events.push(ViewEvent::FinalScore {
                occupancy_ratio: self.last_ratio,
                kill_count: lp.kill_count,
            });
            events.push(ViewEvent::RespawnOffered {
                has_respawned: self.has_respawned,
            });
        }
    }
}
