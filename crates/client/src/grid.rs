//! Windowed tile grid: decoding, demotion and per-cell presentation diffing.
//!
//! Grids are addressed in absolute coordinates but only cover the window
//! `[origin, origin + size)`. A published window is never mutated; each
//! snapshot installs freshly decoded windows and demotes the previous color
//! window for diffing.

use protocol::{pack_cell, split_cell, GridPoint, Position, EMPTY_CELL, WALL_CELL};

use crate::config::ViewConfig;
use crate::error::ViewError;
use crate::events::{SpriteKind, TileFill, TileUpdate};
use crate::palette::Palette;

/// One nibble map covering the visible window, indexed in absolute grid
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWindow {
    origin: GridPoint,
    rows: u16,
    cols: u16,
    cells: Vec<u8>,
}

impl GridWindow {
    fn new(origin: GridPoint, rows: u16, cols: u16, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), rows as usize * cols as usize);
        Self {
            origin,
            rows,
            cols,
            cells,
        }
    }

    pub fn origin(&self) -> GridPoint {
        self.origin
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// True if the absolute coordinate lies inside the window.
    pub fn contains(&self, row: i16, col: i16) -> bool {
        row >= self.origin.row
            && row < self.origin.row + self.rows as i16
            && col >= self.origin.col
            && col < self.origin.col + self.cols as i16
    }

    /// Nibble value at an absolute coordinate, None outside the window.
    pub fn get(&self, row: i16, col: i16) -> Option<u8> {
        if !self.contains(row, col) {
            return None;
        }
        let r = (row - self.origin.row) as usize;
        let c = (col - self.origin.col) as usize;
        Some(self.cells[r * self.cols as usize + c])
    }

    /// Iterate `(row, col, value)` over the window in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (i16, i16, u8)> + '_ {
        let origin = self.origin;
        // Split the flat index in usize; cell counts can exceed i16.
        let cols = self.cols as usize;
        self.cells.iter().enumerate().map(move |(k, &v)| {
            let row = origin.row + (k / cols) as i16;
            let col = origin.col + (k % cols) as i16;
            (row, col, v)
        })
    }
}

/// Decode a packed map payload into (color, track) windows.
///
/// Fails with a corruption error if the payload does not cover exactly
/// `rows * cols` cells.
pub fn decode_packed(
    origin: GridPoint,
    rows: u16,
    cols: u16,
    bytes: &[u8],
) -> Result<(GridWindow, GridWindow), ViewError> {
    let expected = rows as usize * cols as usize;
    if bytes.len() != expected {
        return Err(protocol::ProtocolError::MapLength {
            expected,
            actual: bytes.len(),
        }
        .into());
    }
    let mut color = Vec::with_capacity(expected);
    let mut track = Vec::with_capacity(expected);
    for &byte in bytes {
        let (t, c) = split_cell(byte);
        color.push(c);
        track.push(t);
    }
    Ok((
        GridWindow::new(origin, rows, cols, color),
        GridWindow::new(origin, rows, cols, track),
    ))
}

/// Re-pack two nibble windows into the wire byte layout.
pub fn encode_packed(color: &GridWindow, track: &GridWindow) -> Vec<u8> {
    debug_assert_eq!(color.cells.len(), track.cells.len());
    color
        .cells
        .iter()
        .zip(&track.cells)
        .map(|(&c, &t)| pack_cell(t, c))
        .collect()
}

/// The current color/track windows plus the demoted previous color window.
#[derive(Debug, Default)]
pub struct TileMaps {
    color: Option<GridWindow>,
    track: Option<GridWindow>,
    old_color: Option<GridWindow>,
}

impl TileMaps {
    /// Install freshly decoded windows, demoting the current color window.
    /// The demoted window is only ever read afterwards.
    pub fn install(&mut self, color: GridWindow, track: GridWindow) {
        self.old_color = self.color.take();
        self.color = Some(color);
        self.track = Some(track);
    }

    pub fn color(&self) -> Option<&GridWindow> {
        self.color.as_ref()
    }

    pub fn track(&self) -> Option<&GridWindow> {
        self.track.as_ref()
    }

    pub fn old_color(&self) -> Option<&GridWindow> {
        self.old_color.as_ref()
    }

    /// Previous round's color nibble at an absolute coordinate, if it was
    /// inside the previous window.
    pub fn old_color_at(&self, row: i16, col: i16) -> Option<u8> {
        self.old_color.as_ref().and_then(|m| m.get(row, col))
    }
}

/// Screen position of a grid cell: +x along columns, -y along rows.
pub fn screen_position(cell_size: f32, point: GridPoint) -> Position {
    Position::new(
        cell_size * point.col as f32,
        -cell_size * point.row as f32,
    )
}

/// Pick the ground sprite for a cell: wall, claimed tile with an exposed
/// south edge ("ground bar"), or a plain square.
pub fn classify_tile(color: &GridWindow, row: i16, col: i16) -> SpriteKind {
    match color.get(row, col) {
        Some(WALL_CELL) => SpriteKind::Wall,
        Some(v) if v != EMPTY_CELL && color.get(row + 1, col) == Some(EMPTY_CELL) => {
            SpriteKind::GroundBar
        }
        _ => SpriteKind::Square,
    }
}

/// Recompute the full tile presentation for the freshly installed windows.
///
/// Cells whose color changed since the previous window get a tint transition
/// from the old color over one broadcast period; everything else is static.
pub fn tile_updates(
    maps: &TileMaps,
    palette: &Palette,
    view: &ViewConfig,
    tint_ms: f64,
) -> Vec<TileUpdate> {
    let (Some(color), Some(track)) = (maps.color(), maps.track()) else {
        return Vec::new();
    };

    let mut updates = Vec::with_capacity(color.cells.len() * 2);
    for (row, col, value) in color.iter() {
        let point = GridPoint::new(row, col);
        let target = palette.light(value);
        let fill = match maps.old_color_at(row, col) {
            Some(old) if old != value => TileFill::Tint {
                from: palette.light(old),
                to: target,
                duration_ms: tint_ms,
            },
            _ => TileFill::Static(target),
        };
        updates.push(TileUpdate {
            point,
            sprite: classify_tile(color, row, col),
            fill,
            opacity: u8::MAX,
        });

        // Trail overlay for the same cell.
        let owner = track.get(row, col).unwrap_or(EMPTY_CELL);
        updates.push(TileUpdate {
            point,
            sprite: SpriteKind::TrailSquare,
            fill: TileFill::Static(palette.light(owner)),
            opacity: if owner == EMPTY_CELL {
                0
            } else {
                view.track_opacity
            },
        });
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn palette() -> Palette {
        Palette::from_hex_list(&Config::default().palette).unwrap()
    }

    #[test]
    fn test_decode_splits_nibbles() {
        let origin = GridPoint::new(0, 0);
        let (color, track) = decode_packed(origin, 1, 2, &[0x31, 0x0F]).unwrap();
        assert_eq!(color.get(0, 0), Some(1));
        assert_eq!(track.get(0, 0), Some(3));
        assert_eq!(color.get(0, 1), Some(WALL_CELL));
        assert_eq!(track.get(0, 1), Some(0));
        assert_eq!(color.get(1, 0), None);
    }

    #[test]
    fn test_decode_rejects_bad_length() {
        let err = decode_packed(GridPoint::new(0, 0), 2, 2, &[0x00; 3]).unwrap_err();
        assert!(matches!(
            err,
            ViewError::Protocol(protocol::ProtocolError::MapLength {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_encode_roundtrip() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let (color, track) = decode_packed(GridPoint::new(4, -2), 16, 16, &bytes).unwrap();
        assert_eq!(encode_packed(&color, &track), bytes);
    }

    #[test]
    fn test_absolute_indexing_follows_origin() {
        let (color, _) = decode_packed(GridPoint::new(10, 20), 2, 2, &[1, 2, 3, 4]).unwrap();
        assert_eq!(color.get(10, 20), Some(1));
        assert_eq!(color.get(11, 21), Some(4));
        assert_eq!(color.get(0, 0), None);
        assert!(!color.contains(12, 20));
    }

    #[test]
    fn test_iter_covers_windows_beyond_i16_cells() {
        // 200x200 = 40_000 cells, more than fit in an i16 flat index.
        let cells = vec![0u8; 200 * 200];
        let (color, _) = decode_packed(GridPoint::new(0, 0), 200, 200, &cells).unwrap();
        let (row, col, _) = color.iter().last().unwrap();
        assert_eq!((row, col), (199, 199));
        assert_eq!(color.iter().count(), 40_000);
    }

    #[test]
    fn test_demotion_is_one_step() {
        let mut maps = TileMaps::default();
        let first = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x01]).unwrap();
        maps.install(first.0.clone(), first.1);
        assert!(maps.old_color().is_none());

        let second = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x02]).unwrap();
        maps.install(second.0, second.1);
        assert_eq!(maps.old_color(), Some(&first.0));

        let third = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x03]).unwrap();
        maps.install(third.0, third.1);
        // Exactly one step behind, never two.
        assert_eq!(maps.old_color_at(0, 0), Some(2));
    }

    #[test]
    fn test_classification() {
        // 2x2 window: owned tile above empty ground, wall beside it.
        let (color, _) = decode_packed(GridPoint::new(0, 0), 2, 2, &[0x01, 0x0F, 0x00, 0x0F])
            .unwrap();
        assert_eq!(classify_tile(&color, 0, 0), SpriteKind::GroundBar);
        assert_eq!(classify_tile(&color, 0, 1), SpriteKind::Wall);
        assert_eq!(classify_tile(&color, 1, 0), SpriteKind::Square);
        // Bottom row has no south neighbor inside the window.
        assert_eq!(classify_tile(&color, 1, 1), SpriteKind::Wall);
    }

    #[test]
    fn test_track_cleared_keeps_fill_classification() {
        // Spec scenario: 0x31 -> 0x01 clears the trail but the tile's fill
        // stays an owned square with no transition.
        let mut maps = TileMaps::default();
        let first = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x31]).unwrap();
        maps.install(first.0, first.1);
        let second = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x01]).unwrap();
        maps.install(second.0, second.1);

        let pal = palette();
        let updates = tile_updates(&maps, &pal, &crate::config::ViewConfig::default(), 200.0);
        let ground = &updates[0];
        let trail = &updates[1];

        assert_eq!(ground.sprite, SpriteKind::Square);
        assert_eq!(ground.fill, TileFill::Static(pal.light(1)));
        assert_eq!(trail.sprite, SpriteKind::TrailSquare);
        assert_eq!(trail.opacity, 0);
    }

    #[test]
    fn test_tint_on_color_change() {
        let mut maps = TileMaps::default();
        let first = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x02]).unwrap();
        maps.install(first.0, first.1);
        let second = decode_packed(GridPoint::new(0, 0), 1, 1, &[0x03]).unwrap();
        maps.install(second.0, second.1);

        let pal = palette();
        let updates = tile_updates(&maps, &pal, &crate::config::ViewConfig::default(), 150.0);
        assert_eq!(
            updates[0].fill,
            TileFill::Tint {
                from: pal.light(2),
                to: pal.light(3),
                duration_ms: 150.0
            }
        );
    }

    #[test]
    fn test_screen_position() {
        let pos = screen_position(40.0, GridPoint::new(2, 3));
        assert_eq!(pos, Position::new(120.0, -80.0));
    }
}
