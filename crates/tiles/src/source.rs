use model::{EmptyKey, GridCoord, TileMap};

use crate::Tint;

/// Content for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile<T> {
    pub texture: T,
    pub tint: Option<Tint>,
}

impl<T> Tile<T> {
    pub fn new(texture: T) -> Self {
        Self {
            texture,
            tint: None,
        }
    }

    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tint = Some(tint);
        self
    }
}

/// Maps grid coordinates to tile content.
///
/// Called up to `rows * columns` times per update, so lookups must be cheap.
/// Coordinates outside the world are passed through unchecked and must
/// answer `None`.
pub trait TileSource {
    type Texture;

    fn tile(&self, grid_x: i32, grid_y: i32) -> Option<Tile<Self::Texture>>;
}

/// Tile source backed by a closure.
#[derive(Debug, Clone, Copy)]
pub struct FromFn<F>(F);

pub fn from_fn<T, F>(lookup: F) -> FromFn<F>
where
    F: Fn(i32, i32) -> Option<Tile<T>>,
{
    FromFn(lookup)
}

impl<T, F> TileSource for FromFn<F>
where
    F: Fn(i32, i32) -> Option<Tile<T>>,
{
    type Texture = T;

    fn tile(&self, grid_x: i32, grid_y: i32) -> Option<Tile<T>> {
        (self.0)(grid_x, grid_y)
    }
}

impl<K: EmptyKey> TileSource for TileMap<K> {
    type Texture = K;

    fn tile(&self, grid_x: i32, grid_y: i32) -> Option<Tile<K>> {
        self.get(GridCoord::new(grid_x, grid_y)).map(Tile::new)
    }
}
