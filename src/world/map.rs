use std::sync::Arc;

use crate::EngineError;

/// Tile index stored in a grid cell. `0` is empty space.
pub type TileId = u16;

pub const EMPTY: TileId = 0;

/// One level's worth of tiles, indexed `[x][y]` like the map editor lays
/// them out (stored column-major).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileId>,
}

impl Grid {
    /// Build from a flat column-major tile list (`tiles[x * height + y]`).
    pub fn new(width: usize, height: usize, tiles: Vec<TileId>) -> Result<Self, EngineError> {
        if tiles.len() != width * height {
            return Err(EngineError::TileCount {
                width,
                height,
                expected: width * height,
                found: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> TileId) -> Self {
        let mut tiles = Vec::with_capacity(width * height);
        for x in 0..width {
            for y in 0..height {
                tiles.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// Build from `columns[x][y]`. Ragged input is padded with empty tiles.
    pub fn from_columns(columns: &[Vec<TileId>]) -> Self {
        let height = columns.iter().map(Vec::len).max().unwrap_or(0);
        Self::from_fn(columns.len(), height, |x, y| {
            columns[x].get(y).copied().unwrap_or(EMPTY)
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at `(x, y)`, `None` outside the grid.
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Option<TileId> {
        if self.contains(x, y) {
            Some(self.tiles[x as usize * self.height + y as usize])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, tile: TileId) {
        if x < self.width && y < self.height {
            self.tiles[x * self.height + y] = tile;
        }
    }
}

/// Read-only access to the stacked levels of a world.
pub trait WorldMap: Sync {
    /// Number of vertical levels; at least one for a usable map.
    fn num_levels(&self) -> usize;

    /// Tile grid of level `n`, `0 <= n < num_levels()`.
    fn level(&self, n: usize) -> &Grid;
}

/// The stock [`WorldMap`]: a list of equally sized grids.
#[derive(Clone, Debug)]
pub struct TileMap {
    levels: Vec<Grid>,
}

impl TileMap {
    /// All levels must share the first level's width and height.
    pub fn new(levels: Vec<Grid>) -> Result<Self, EngineError> {
        validate_levels(levels.len(), |n| &levels[n])?;
        Ok(Self { levels })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.levels[0].width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.levels[0].height
    }

    /// True if `(x, y)` is inside the grid and empty on the ground level.
    pub fn is_open(&self, x: f64, y: f64) -> bool {
        if x < 0.0 || y < 0.0 {
            return false;
        }
        self.levels[0].tile(x as i32, y as i32) == Some(EMPTY)
    }
}

impl WorldMap for TileMap {
    fn num_levels(&self) -> usize {
        self.levels.len()
    }

    fn level(&self, n: usize) -> &Grid {
        &self.levels[n]
    }
}

impl<W: WorldMap + Send> WorldMap for Arc<W> {
    fn num_levels(&self) -> usize {
        (**self).num_levels()
    }

    fn level(&self, n: usize) -> &Grid {
        (**self).level(n)
    }
}

/// Shared size check for any [`WorldMap`] implementation.
pub(crate) fn validate_levels<'g>(
    count: usize,
    level: impl Fn(usize) -> &'g Grid,
) -> Result<(), EngineError> {
    if count == 0 {
        return Err(EngineError::EmptyMap);
    }
    let first = level(0);
    if first.width == 0 || first.height == 0 {
        return Err(EngineError::EmptyLevel(0));
    }
    for n in 1..count {
        let g = level(n);
        if g.width != first.width || g.height != first.height {
            return Err(EngineError::LevelSizeMismatch {
                level: n,
                expected_w: first.width,
                expected_h: first.height,
                found_w: g.width,
                found_h: g.height,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `w`×`h` room: border tiles are `1`, interior empty.
    fn room(w: usize, h: usize) -> Grid {
        Grid::from_fn(w, h, |x, y| {
            if x == 0 || y == 0 || x == w - 1 || y == h - 1 { 1 } else { EMPTY }
        })
    }

    #[test]
    fn indexing_is_x_then_y() {
        let g = Grid::from_columns(&[vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!((g.width(), g.height()), (2, 3));
        assert_eq!(g.tile(0, 2), Some(3));
        assert_eq!(g.tile(1, 0), Some(4));
        assert_eq!(g.tile(2, 0), None);
        assert_eq!(g.tile(-1, 0), None);
    }

    #[test]
    fn tile_count_checked() {
        let err = Grid::new(2, 2, vec![0; 3]).unwrap_err();
        assert!(matches!(err, EngineError::TileCount { expected: 4, found: 3, .. }));
    }

    #[test]
    fn levels_must_match() {
        let err = TileMap::new(vec![room(5, 5), room(5, 6)]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::LevelSizeMismatch { level: 1, found_h: 6, .. }
        ));
        assert!(matches!(TileMap::new(vec![]), Err(EngineError::EmptyMap)));
    }

    #[test]
    fn open_cells() {
        let map = TileMap::new(vec![room(5, 5)]).unwrap();
        assert!(map.is_open(2.5, 2.5));
        assert!(!map.is_open(0.5, 2.5));
        assert!(!map.is_open(-0.5, 2.5));
        assert!(!map.is_open(7.0, 2.5));
    }
}
