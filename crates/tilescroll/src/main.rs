mod config;

use std::path::PathBuf;

use anyhow::{Context, bail};
use model::{EmptyKey, GridCoord, TileMap, snap_down};
use tiles::{PluginHost, Tile, TileGridRenderer, TileSource, UpdateOutcome, UpdateStats, from_fn};
use tracing_subscriber::EnvFilter;
use view::ScrollViewport;

use crate::config::SessionConfig;

const ZOOM_EVERY_FRAMES: u32 = 60;
const ZOOM_STEP: f32 = 1.25;
const EDIT_EVERY_FRAMES: u32 = 45;
const RESIZED_SCREEN_WIDTH_FACTOR: f32 = 0.75;
const DECOR_DENSITY: u32 = 7;
const DUMP_CELLS: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct TerrainKey(u8);

impl TerrainKey {
    const GRASS: Self = TerrainKey(1);
    const SAND: Self = TerrainKey(2);
    const WATER: Self = TerrainKey(3);
}

impl EmptyKey for TerrainKey {
    const EMPTY: Self = TerrainKey(0);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct DecorSprite(u8);

#[derive(Debug, Default)]
struct SessionSummary {
    reconciled_frames: u32,
    idle_frames: u32,
    relayouts: u32,
    peak_slots: usize,
    overflow_cells: usize,
    last: UpdateStats,
}

impl SessionSummary {
    fn record(&mut self, outcome: UpdateOutcome) {
        let UpdateOutcome::Reconciled { relayout, stats } = outcome else {
            self.idle_frames += 1;
            return;
        };
        self.reconciled_frames += 1;
        self.relayouts += relayout as u32;
        self.peak_slots = self.peak_slots.max(stats.live_slots);
        self.overflow_cells += stats.overflow_cells;
        self.last = stats;
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match parse_config_path()? {
        Some(path) => SessionConfig::load(&path)?,
        None => SessionConfig::default(),
    };
    run_session(&config)
}

fn run_session(config: &SessionConfig) -> anyhow::Result<()> {
    let (world_width, world_height) = config.world_size();
    let mut viewport = ScrollViewport::new(
        config.screen_width,
        config.screen_height,
        world_width,
        world_height,
    )
    .context("create viewport")?;

    let map = TileMap::filled(config.world_columns, config.world_rows, terrain_at);
    let mut ground = TileGridRenderer::new(config.tile_width, config.tile_height, map, config.renderer)
        .context("create ground layer")?
        .with_name("ground");

    let mut overlays = PluginHost::new();
    let decor = TileGridRenderer::new(
        config.tile_width,
        config.tile_height,
        decor_source(config.world_columns, config.world_rows),
        config.decor,
    )
    .context("create decor layer")?
    .with_name("decor");
    overlays
        .add(Box::new(decor))
        .context("register decor layer")?;

    tracing::info!(
        world_width,
        world_height,
        frames = config.frames,
        overlays = overlays.len(),
        "tile session started"
    );

    let center = (config.screen_width * 0.5, config.screen_height * 0.5);
    let resize_at = config.frames / 2;
    let mut summary = SessionSummary::default();
    for frame in 0..config.frames {
        viewport
            .pan_by(-config.pan_speed, -config.pan_speed * 0.5)
            .context("pan viewport")?;

        if frame > 0 && frame % ZOOM_EVERY_FRAMES == 0 {
            let factor = if (frame / ZOOM_EVERY_FRAMES) % 2 == 1 {
                1.0 / ZOOM_STEP
            } else {
                ZOOM_STEP
            };
            viewport
                .zoom_about_point(factor, center.0, center.1)
                .context("zoom viewport")?;
        }

        if frame > 0 && frame == resize_at {
            viewport
                .resize_screen(
                    config.screen_width * RESIZED_SCREEN_WIDTH_FACTOR,
                    config.screen_height,
                )
                .context("resize screen")?;
            ground.invalidate();
            overlays.invalidate_all();
            tracing::info!(frame, "screen resized");
        }

        if frame % EDIT_EVERY_FRAMES == EDIT_EVERY_FRAMES - 1 {
            erase_under_point(&mut ground, &viewport, center)?;
        }
        if ground.source().has_dirty() {
            refresh_edited(&mut ground, frame);
        }

        let outcome = ground
            .update(&viewport)
            .with_context(|| format!("update ground layer at frame {frame}"))?;
        summary.record(outcome);
        overlays
            .update_all(&viewport)
            .with_context(|| format!("update overlays at frame {frame}"))?;
    }

    for cell in ground.dump_debug().iter().take(DUMP_CELLS) {
        tracing::debug!(target: "tilescroll::dump", "{cell}");
    }
    tracing::info!(
        reconciled = summary.reconciled_frames,
        idle = summary.idle_frames,
        relayouts = summary.relayouts,
        peak_slots = summary.peak_slots,
        overflow_cells = summary.overflow_cells,
        last_displayed = summary.last.displayed,
        visible = ground.visible_count(),
        "tile session finished"
    );
    Ok(())
}

fn erase_under_point(
    ground: &mut TileGridRenderer<TileMap<TerrainKey>>,
    viewport: &ScrollViewport,
    (screen_x, screen_y): (f32, f32),
) -> anyhow::Result<()> {
    let (world_x, world_y) = viewport
        .screen_to_world(screen_x, screen_y)
        .context("map screen center to world")?;
    let tile = ground.tile_size();
    let (grid_x, _) = snap_down(world_x, tile.width());
    let (grid_y, _) = snap_down(world_y, tile.height());
    let coord = GridCoord::new(grid_x, grid_y);
    if ground.source().tile(coord.x, coord.y).is_none() {
        return Ok(());
    }
    ground
        .source_mut()
        .clear_tile(coord)
        .with_context(|| format!("erase tile at ({grid_x}, {grid_y})"))?;
    tracing::info!(grid_x, grid_y, "erased tile");
    Ok(())
}

fn refresh_edited(ground: &mut TileGridRenderer<TileMap<TerrainKey>>, frame: u32) {
    let map = ground.source();
    for coord in map.iter_dirty_coords() {
        tracing::debug!(frame, grid_x = coord.x, grid_y = coord.y, "tile edited");
    }
    tracing::info!(frame, edited = map.dirty_count(), "refreshing ground layer");
    ground.source_mut().clear_dirty();
    ground.invalidate();
}

fn cell_hash(x: i32, y: i32) -> u32 {
    let mut hash = (x as u32).wrapping_mul(0x9e37_79b1) ^ (y as u32).wrapping_mul(0x85eb_ca77);
    hash ^= hash >> 15;
    hash = hash.wrapping_mul(0x2c1b_3c6d);
    hash ^ (hash >> 12)
}

fn terrain_at(coord: GridCoord) -> TerrainKey {
    let hash = cell_hash(coord.x, coord.y);
    if hash % 23 == 0 {
        return TerrainKey::EMPTY;
    }
    match hash % 10 {
        0..=5 => TerrainKey::GRASS,
        6 | 7 => TerrainKey::SAND,
        _ => TerrainKey::WATER,
    }
}

fn decor_source(
    columns: u32,
    rows: u32,
) -> impl TileSource<Texture = DecorSprite> + 'static {
    from_fn(move |x: i32, y: i32| {
        let inside = x >= 0 && y >= 0 && (x as u32) < columns && (y as u32) < rows;
        let hash = cell_hash(y, x);
        (inside && hash % DECOR_DENSITY == 0).then(|| {
            Tile::new(DecorSprite((hash >> 8) as u8 % 4)).with_tint(hash & 0x00ff_ffff)
        })
    })
}

fn parse_config_path() -> anyhow::Result<Option<PathBuf>> {
    const USAGE: &str = "usage: tilescroll [--config <path>] | [<path>]";
    let mut args = std::env::args_os();
    let _program = args.next();

    let Some(first_arg) = args.next() else {
        return Ok(None);
    };

    let path = if first_arg == "--config" {
        let Some(path) = args.next() else {
            bail!("missing config path after --config; {USAGE}");
        };
        path
    } else {
        first_arg
    };
    if args.next().is_some() {
        bail!("too many arguments; {USAGE}");
    }
    Ok(Some(PathBuf::from(path)))
}
