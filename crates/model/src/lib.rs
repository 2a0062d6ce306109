use bitvec::prelude::{BitVec, Lsb0};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TileSize {
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("tile size must be finite and positive, got {width}x{height}")]
    InvalidTileSize { width: f32, height: f32 },
}

impl TileSize {
    pub fn new(width: f32, height: f32) -> Result<Self, GridError> {
        let valid = |length: f32| length.is_finite() && length > 0.0;
        if !valid(width) || !valid(height) {
            return Err(GridError::InvalidTileSize { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// World-space origin of a grid cell.
    pub fn cell_origin(self, coord: GridCoord) -> (f32, f32) {
        (coord.x as f32 * self.width, coord.y as f32 * self.height)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct GridCoord {
    pub x: i32,
    pub y: i32,
}

impl GridCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, columns: usize, rows: usize) -> Self {
        Self {
            x: self.x.saturating_add(columns as i32),
            y: self.y.saturating_add(rows as i32),
        }
    }
}

/// Snaps `value` down to the tile grid, rounding toward negative infinity.
///
/// Returns the cell index and the world coordinate of that cell's edge, so
/// `start <= value < start + tile` holds for negative values as well.
pub fn snap_down(value: f32, tile: f32) -> (i32, f32) {
    let index = (value / tile).floor();
    (index as i32, index * tile)
}

/// Number of cells needed to cover the whole world along each axis.
pub fn world_tile_bounds(world_width: f32, world_height: f32, tile: TileSize) -> (usize, usize) {
    (
        cells_to_cover(world_width, tile.width),
        cells_to_cover(world_height, tile.height),
    )
}

fn cells_to_cover(length: f32, tile: f32) -> usize {
    if !length.is_finite() || length <= 0.0 {
        return 0;
    }
    (length / tile).ceil() as usize
}

fn whole_cells(length: f32, tile: f32) -> usize {
    if !length.is_finite() || length <= 0.0 {
        return 0;
    }
    (length / tile).floor() as usize
}

/// Cell window covering a visible area, clamped to what the world can hold.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GridWindow {
    pub columns: usize,
    pub rows: usize,
    pub count: usize,
}

impl GridWindow {
    pub fn for_view(
        visible_width: f32,
        visible_height: f32,
        world_width: f32,
        world_height: f32,
        tile: TileSize,
    ) -> Self {
        // One extra cell per axis covers a view that straddles a cell edge.
        let columns = whole_cells(visible_width, tile.width).saturating_add(1);
        let rows = whole_cells(visible_height, tile.height).saturating_add(1);
        let (world_columns, world_rows) = world_tile_bounds(world_width, world_height, tile);
        let max_tiles = world_columns.saturating_mul(world_rows);
        Self {
            columns,
            rows,
            count: columns.saturating_mul(rows).min(max_tiles),
        }
    }

    pub const fn cells(self) -> usize {
        self.columns.saturating_mul(self.rows)
    }
}

pub trait EmptyKey: Copy + PartialEq {
    const EMPTY: Self;
    #[inline]
    fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TileMapError {
    #[error("grid coordinate ({x}, {y}) is outside the {columns}x{rows} tile map")]
    OutOfBounds {
        x: i32,
        y: i32,
        columns: u32,
        rows: u32,
    },
}

/// Dense tile storage for a bounded world.
///
/// Lookups outside the map answer "no tile", which is what the grid
/// renderer expects from a tile source at the world edge.
#[derive(Debug, Clone)]
pub struct TileMap<K> {
    // tiles.len() == columns * rows == dirty_bits.len()
    columns: u32,
    rows: u32,
    tiles: Box<[K]>,
    dirty_bits: BitVec<usize, Lsb0>,
    dirty_count: usize,
}

impl<K: EmptyKey> TileMap<K> {
    pub fn new(columns: u32, rows: u32) -> Self {
        let len = columns as usize * rows as usize;
        Self {
            columns,
            rows,
            tiles: vec![K::EMPTY; len].into_boxed_slice(),
            dirty_bits: BitVec::repeat(false, len),
            dirty_count: 0,
        }
    }

    pub fn filled(columns: u32, rows: u32, mut key_at: impl FnMut(GridCoord) -> K) -> Self {
        let mut map = Self::new(columns, rows);
        for index in 0..map.tiles.len() {
            let coord = map.coord_at(index);
            map.tiles[index] = key_at(coord);
        }
        map
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn world_size(&self, tile: TileSize) -> (f32, f32) {
        (
            self.columns as f32 * tile.width,
            self.rows as f32 * tile.height,
        )
    }

    pub fn contains(&self, coord: GridCoord) -> bool {
        self.index_of(coord).is_some()
    }

    pub fn get(&self, coord: GridCoord) -> Option<K> {
        let key = self.tiles[self.index_of(coord)?];
        (!key.is_empty()).then_some(key)
    }

    pub fn set_tile(&mut self, coord: GridCoord, key: K) -> Result<(), TileMapError> {
        let index = self.index_of(coord).ok_or(TileMapError::OutOfBounds {
            x: coord.x,
            y: coord.y,
            columns: self.columns,
            rows: self.rows,
        })?;
        self.tiles[index] = key;
        let was_dirty = self.dirty_bits[index];
        self.dirty_bits.set(index, true);
        self.dirty_count += !was_dirty as usize;
        Ok(())
    }

    pub fn clear_tile(&mut self, coord: GridCoord) -> Result<(), TileMapError> {
        self.set_tile(coord, K::EMPTY)
    }

    pub fn has_dirty(&self) -> bool {
        self.dirty_count > 0
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty_count
    }

    pub fn iter_dirty_coords(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.dirty_bits
            .iter_ones()
            .map(|index| self.coord_at(index))
    }

    pub fn clear_dirty(&mut self) {
        self.dirty_bits.fill(false);
        self.dirty_count = 0;
    }

    fn index_of(&self, coord: GridCoord) -> Option<usize> {
        let x = u32::try_from(coord.x).ok()?;
        let y = u32::try_from(coord.y).ok()?;
        if x >= self.columns || y >= self.rows {
            return None;
        }
        Some(y as usize * self.columns as usize + x as usize)
    }

    fn coord_at(&self, index: usize) -> GridCoord {
        let columns = self.columns as usize;
        GridCoord {
            x: (index % columns) as i32,
            y: (index / columns) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Copy, Clone, PartialEq)]
    struct Key(u16);

    impl EmptyKey for Key {
        const EMPTY: Self = Key(0);
    }

    fn tile(width: f32, height: f32) -> TileSize {
        TileSize::new(width, height).expect("tile size")
    }

    #[test]
    fn tile_size_rejects_non_positive_dimensions() {
        assert!(TileSize::new(0.0, 32.0).is_err());
        assert!(TileSize::new(32.0, -1.0).is_err());
        assert!(TileSize::new(f32::NAN, 32.0).is_err());
        assert!(TileSize::new(32.0, 16.0).is_ok());
    }

    #[test]
    fn snap_down_rounds_toward_negative_infinity() {
        for &(value, expected_index) in &[
            (0.0, 0),
            (31.0, 0),
            (32.0, 1),
            (100.0, 3),
            (-1.0, -1),
            (-32.0, -1),
            (-33.0, -2),
        ] {
            let (index, start) = snap_down(value, 32.0);
            assert_eq!(index, expected_index, "index for {value}");
            assert!(start <= value && value < start + 32.0, "cover {value}");
            assert_eq!(start % 32.0, 0.0);
        }
    }

    #[test]
    fn window_adds_one_cell_per_axis_and_clamps_to_world() {
        let window = GridWindow::for_view(96.0, 64.0, 320.0, 320.0, tile(32.0, 32.0));
        assert_eq!(
            window,
            GridWindow {
                columns: 4,
                rows: 3,
                count: 12
            }
        );

        let clamped = GridWindow::for_view(400.0, 400.0, 64.0, 40.0, tile(32.0, 32.0));
        assert_eq!(clamped.columns, 13);
        assert_eq!(clamped.rows, 13);
        assert_eq!(clamped.count, 4);
    }

    #[test]
    fn window_for_empty_world_has_no_tiles() {
        let window = GridWindow::for_view(96.0, 64.0, 0.0, 320.0, tile(32.0, 32.0));
        assert_eq!(window.count, 0);
        assert_eq!(window.cells(), 12);

        let degenerate = GridWindow::for_view(f32::NAN, -5.0, 320.0, 320.0, tile(32.0, 32.0));
        assert_eq!(degenerate.columns, 1);
        assert_eq!(degenerate.rows, 1);
        assert_eq!(degenerate.count, 1);
    }

    #[test]
    fn window_saturates_for_huge_visible_areas() {
        let wide = GridWindow::for_view(1.0e30, 1.0, 320.0, 320.0, tile(32.0, 32.0));
        assert_eq!(wide.columns, usize::MAX);
        assert_eq!(wide.rows, 1);
        assert_eq!(wide.count, 100);
        assert_eq!(wide.cells(), usize::MAX);

        let huge = GridWindow::for_view(1.0e30, 1.0e30, 320.0, 320.0, tile(32.0, 32.0));
        assert_eq!(huge.cells(), usize::MAX);
        assert_eq!(huge.count, 100);
    }

    #[test]
    fn tile_map_answers_none_outside_bounds_and_for_empty_keys() {
        let mut map = TileMap::<Key>::new(3, 2);
        map.set_tile(GridCoord::new(2, 1), Key(7)).expect("set tile");

        assert_eq!(map.get(GridCoord::new(2, 1)), Some(Key(7)));
        assert_eq!(map.get(GridCoord::new(0, 0)), None);
        assert_eq!(map.get(GridCoord::new(-1, 0)), None);
        assert_eq!(map.get(GridCoord::new(3, 0)), None);
        assert_eq!(
            map.set_tile(GridCoord::new(0, 2), Key(1)),
            Err(TileMapError::OutOfBounds {
                x: 0,
                y: 2,
                columns: 3,
                rows: 2
            })
        );
    }

    #[test]
    fn tile_map_tracks_dirty_cells_once() {
        let mut map = TileMap::filled(4, 4, |coord| Key((coord.x + coord.y * 4) as u16 + 1));
        assert!(!map.has_dirty());

        map.set_tile(GridCoord::new(1, 2), Key(99)).expect("set");
        map.clear_tile(GridCoord::new(1, 2)).expect("clear");
        map.set_tile(GridCoord::new(3, 0), Key(5)).expect("set");

        assert_eq!(map.dirty_count(), 2);
        let dirty: Vec<_> = map.iter_dirty_coords().collect();
        assert_eq!(dirty, vec![GridCoord::new(3, 0), GridCoord::new(1, 2)]);
        assert_eq!(map.get(GridCoord::new(1, 2)), None);

        map.clear_dirty();
        assert!(!map.has_dirty());
        assert_eq!(map.iter_dirty_coords().count(), 0);
    }
}
