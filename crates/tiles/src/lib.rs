//! Viewport-driven tile grid backed by a recycled slot pool.
//!
//! `TileGridRenderer` sizes its pool from the visible area on scale changes
//! and re-assigns slots to visible cells on any transform change. Idle frames
//! with an unchanged transform cost one comparison.

mod config;
mod debug;
mod error;
mod group;
mod plugin;
mod source;

use model::snap_down;
use view::{ViewTransform, Viewport};

pub use config::{DEFAULT_MAX_TILES, RenderGroupConfig, TileGridConfig};
pub use debug::{CellDump, DebugSink, MemoryDebugSink, TracingDebugSink};
pub use error::{PluginError, PluginHostError, TileGridError};
pub use group::{Slot, SlotGroup, Tint};
pub use model::{GridCoord, GridWindow, TileSize};
pub use plugin::{PluginHost, ViewportPlugin};
pub use source::{FromFn, Tile, TileSource, from_fn};

pub const DEFAULT_PLUGIN_NAME: &str = "tiles";

/// Snapped top-left cell of the last update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridOrigin {
    pub coord: GridCoord,
    pub x_start: f32,
    pub y_start: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Slots that received a tile this pass.
    pub displayed: usize,
    /// Window cells the tile source left empty.
    pub empty_cells: usize,
    /// Slots below `count` that were switched off.
    pub hidden_slots: usize,
    /// Cells with content that found no free slot below `count`.
    pub overflow_cells: usize,
    pub live_slots: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Idle,
    Reconciled { relayout: bool, stats: UpdateStats },
}

pub struct TileGridRenderer<S: TileSource> {
    name: String,
    tile: TileSize,
    source: S,
    config: TileGridConfig,
    group: SlotGroup<S::Texture>,
    window: GridWindow,
    origin: GridOrigin,
    last: Option<ViewTransform>,
    debug_sink: Option<Box<dyn DebugSink>>,
}

impl<S: TileSource> TileGridRenderer<S> {
    pub fn new(
        tile_width: f32,
        tile_height: f32,
        source: S,
        config: TileGridConfig,
    ) -> Result<Self, TileGridError> {
        let tile = TileSize::new(tile_width, tile_height)?;
        let group = SlotGroup::new(config.group)?;
        let debug_sink = config
            .debug
            .then(|| Box::new(TracingDebugSink) as Box<dyn DebugSink>);
        Ok(Self {
            name: DEFAULT_PLUGIN_NAME.to_owned(),
            tile,
            source,
            config,
            group,
            window: GridWindow::default(),
            origin: GridOrigin::default(),
            last: None,
            debug_sink,
        })
    }

    /// Replaces the sink that receives usage lines when `debug` is enabled.
    pub fn with_debug_sink(mut self, sink: impl DebugSink + 'static) -> Self {
        self.debug_sink = Some(Box::new(sink));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tile_size(&self) -> TileSize {
        self.tile
    }

    pub fn config(&self) -> TileGridConfig {
        self.config
    }

    pub fn window(&self) -> GridWindow {
        self.window
    }

    pub fn origin(&self) -> GridOrigin {
        self.origin
    }

    pub fn slots(&self) -> &[Slot<S::Texture>] {
        self.group.slots()
    }

    pub fn group(&self) -> &SlotGroup<S::Texture> {
        &self.group
    }

    pub fn visible_count(&self) -> usize {
        self.group.slots().iter().filter(|slot| slot.is_visible()).count()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the tile source. Call [`Self::invalidate`] after
    /// changing what it returns so the next update re-assigns slots.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Forgets the cached transform so the next update runs a full layout and
    /// assignment pass.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Recomputes the cell window from the visible area and reconciles the
    /// pool with it.
    ///
    /// On error the pool and the previous window are left untouched.
    pub fn layout<V: Viewport + ?Sized>(
        &mut self,
        viewport: &V,
    ) -> Result<GridWindow, TileGridError> {
        let window = GridWindow::for_view(
            viewport.world_screen_width(),
            viewport.world_screen_height(),
            viewport.world_width(),
            viewport.world_height(),
            self.tile,
        );
        if let Err(error) = self.group.ensure_capacity(window.count) {
            tracing::warn!(
                columns = window.columns,
                rows = window.rows,
                count = window.count,
                "tile grid layout rejected: {error}"
            );
            return Err(error);
        }

        let (mut created, mut removed, mut hidden) = (0, 0, 0);
        if self.group.len() > window.count {
            if self.config.shrink {
                removed = self.group.truncate(window.count);
            } else {
                // Assignment never reaches past count, so these stay off.
                hidden = self.group.hide_from(window.count);
            }
        } else {
            self.group.reassert_sizes(self.tile);
            created = self.group.grow_to(window.count, self.tile)?;
        }
        self.window = window;

        tracing::debug!(
            columns = window.columns,
            rows = window.rows,
            count = window.count,
            created,
            removed,
            hidden,
            slots = self.group.len(),
            "tile grid layout"
        );
        Ok(window)
    }

    /// Per-frame entry point.
    ///
    /// Returns [`UpdateOutcome::Idle`] without touching any slot when the
    /// viewport transform equals the one seen by the last successful update.
    pub fn update<V: Viewport + ?Sized>(
        &mut self,
        viewport: &V,
    ) -> Result<UpdateOutcome, TileGridError> {
        let transform = viewport.transform();
        if self.last == Some(transform) {
            tracing::trace!("tile grid idle");
            return Ok(UpdateOutcome::Idle);
        }

        let relayout = self
            .last
            .is_none_or(|last| !last.same_scale(&transform));
        if relayout {
            self.layout(viewport)?;
        }

        let (x_index, x_start) = snap_down(viewport.left(), self.tile.width());
        let (y_index, y_start) = snap_down(viewport.top(), self.tile.height());
        self.origin = GridOrigin {
            coord: GridCoord::new(x_index, y_index),
            x_start,
            y_start,
        };

        let stats = self.assign_slots();
        self.last = Some(transform);

        if stats.overflow_cells > 0 {
            tracing::warn!(
                overflow_cells = stats.overflow_cells,
                count = self.window.count,
                "tile source returned content outside the world bounds"
            );
        }
        if self.config.debug {
            self.emit_debug_line(stats);
        }
        Ok(UpdateOutcome::Reconciled { relayout, stats })
    }

    /// Lists every cell of the last window alongside the slot at the same
    /// pool index. Read-only.
    pub fn dump_debug(&self) -> Vec<CellDump> {
        let GridWindow { columns, rows, .. } = self.window;
        let origin = self.origin.coord;
        (0..rows)
            .flat_map(|row| (0..columns).map(move |column| (column, row)))
            .zip(self.group.slots())
            .map(|((column, row), slot)| CellDump {
                column,
                row,
                grid: origin.offset(column, row),
                position: slot.position(),
                visible: slot.is_visible(),
            })
            .collect()
    }

    fn assign_slots(&mut self) -> UpdateStats {
        let GridWindow {
            columns,
            rows,
            count,
        } = self.window;
        let mut stats = UpdateStats {
            live_slots: self.group.len(),
            ..UpdateStats::default()
        };
        if count == 0 {
            stats.empty_cells = self.window.cells();
            return stats;
        }

        let allows_tint = self.group.allows_tint();
        let origin = self.origin;
        let (tile_width, tile_height) = (self.tile.width(), self.tile.height());
        let mut cursor = 0;
        for row in 0..rows {
            for column in 0..columns {
                let coord = origin.coord.offset(column, row);
                let Some(tile) = self.source.tile(coord.x, coord.y) else {
                    stats.empty_cells += 1;
                    continue;
                };
                if cursor == count {
                    stats.overflow_cells += 1;
                    continue;
                }
                let slot = self
                    .group
                    .get_mut(cursor)
                    .expect("layout keeps at least count slots in the pool");
                let tint = if allows_tint { tile.tint } else { None };
                slot.assign(
                    tile.texture,
                    tint,
                    origin.x_start + column as f32 * tile_width,
                    origin.y_start + row as f32 * tile_height,
                );
                cursor += 1;
            }
        }

        // Slots at or beyond count were switched off by layout.
        for index in cursor..count {
            self.group
                .get_mut(index)
                .expect("layout keeps at least count slots in the pool")
                .hide();
        }
        stats.displayed = cursor;
        stats.hidden_slots = count - cursor;
        stats
    }

    /// Sends `"{displayed} tiles with {empty} empty using {live} slots"`.
    ///
    /// `empty` adds the slots hidden below `count` to the empty window cells,
    /// so it is `empty_cells + hidden_slots` rather than either figure alone.
    fn emit_debug_line(&mut self, stats: UpdateStats) {
        let Some(sink) = self.debug_sink.as_mut() else {
            return;
        };
        let line = format!(
            "{} tiles with {} empty using {} slots",
            stats.displayed,
            stats.empty_cells + stats.hidden_slots,
            stats.live_slots
        );
        sink.log(&line);
    }
}

impl<S> std::fmt::Debug for TileGridRenderer<S>
where
    S: TileSource + std::fmt::Debug,
    S::Texture: std::fmt::Debug,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TileGridRenderer")
            .field("name", &self.name)
            .field("tile", &self.tile)
            .field("source", &self.source)
            .field("config", &self.config)
            .field("group", &self.group)
            .field("window", &self.window)
            .field("origin", &self.origin)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
