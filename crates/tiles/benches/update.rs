use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tiles::{Tile, TileGridConfig, TileGridRenderer, from_fn};
use view::ScrollViewport;

fn checker(x: i32, y: i32) -> Option<Tile<u32>> {
    ((x + y) & 1 == 0).then(|| Tile::new((x ^ y) as u32))
}

fn bench_idle_update(c: &mut Criterion) {
    let mut renderer = TileGridRenderer::new(32.0, 32.0, from_fn(checker), TileGridConfig::default())
        .expect("renderer");
    let viewport = ScrollViewport::new(1280.0, 720.0, 64_000.0, 64_000.0).expect("viewport");
    renderer.update(&viewport).expect("warm-up");

    c.bench_function("update_idle", |b| {
        b.iter(|| renderer.update(black_box(&viewport)))
    });
}

fn bench_pan_update(c: &mut Criterion) {
    let mut renderer = TileGridRenderer::new(32.0, 32.0, from_fn(checker), TileGridConfig::default())
        .expect("renderer");
    let mut viewport = ScrollViewport::new(1280.0, 720.0, 64_000.0, 64_000.0).expect("viewport");
    renderer.update(&viewport).expect("warm-up");

    c.bench_function("update_pan_1280x720", |b| {
        b.iter(|| {
            viewport.pan_by(black_box(-3.0), black_box(-1.0)).expect("pan");
            renderer.update(&viewport)
        })
    });
}

fn bench_zoom_update(c: &mut Criterion) {
    let mut renderer = TileGridRenderer::new(
        32.0,
        32.0,
        from_fn(checker),
        TileGridConfig::container().with_shrink(true),
    )
    .expect("renderer");
    let mut viewport = ScrollViewport::new(1280.0, 720.0, 64_000.0, 64_000.0).expect("viewport");
    let mut zoomed_out = false;

    c.bench_function("update_zoom_toggle", |b| {
        b.iter(|| {
            zoomed_out = !zoomed_out;
            let zoom = if zoomed_out { 0.5 } else { 1.0 };
            viewport.set_zoom(black_box(zoom)).expect("zoom");
            renderer.update(&viewport)
        })
    });
}

criterion_group!(benches, bench_idle_update, bench_pan_update, bench_zoom_update);
criterion_main!(benches);
