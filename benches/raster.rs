use criterion::{black_box, criterion_group, criterion_main, Criterion};
use span_raster::{
    fill_polygon, poly_line, CapStyle, DashPattern, JoinStyle, LineGc, LineStyle, Point,
    PolygonShape, Rop, Span, SpanSink,
};

/// Counts pixels without storing anything.
#[derive(Default)]
struct PixelCounter(u64);

impl SpanSink for PixelCounter {
    fn fill_spans(&mut self, spans: &[Span], _sorted: bool, _pen: span_raster::Pen) {
        self.0 += spans.iter().map(|s| s.width.max(0) as u64).sum::<u64>();
    }
}

fn zigzag(count: i32) -> Vec<Point> {
    (0..count)
        .map(|i| Point::new(i * 7, if i % 2 == 0 { 0 } else { 90 }))
        .collect()
}

fn star(points: usize, r: f64) -> Vec<Point> {
    (0..points)
        .map(|i| {
            let a = std::f64::consts::TAU * (i * 2 % points) as f64 / points as f64;
            Point::new(
                500 + (r * a.cos()).round() as i32,
                500 + (r * a.sin()).round() as i32,
            )
        })
        .collect()
}

fn bench_fill(c: &mut Criterion) {
    // RUST_LOG=span_raster=debug shows the dispatch of each call
    let _ = env_logger::try_init();
    let gc = LineGc::new();
    let shape = star(101, 480.0);
    c.bench_function("fill_star_101", |b| {
        b.iter(|| {
            let mut sink = PixelCounter::default();
            fill_polygon(&mut sink, &gc, PolygonShape::Complex, black_box(&shape)).unwrap();
            black_box(sink.0)
        })
    });
}

fn bench_wide_lines(c: &mut Criterion) {
    let path = zigzag(200);
    let copy = LineGc::new()
        .with_line_width(9)
        .with_cap_style(CapStyle::Round)
        .with_join_style(JoinStyle::Miter);
    let xor = copy.clone().with_rop(Rop::Xor);
    c.bench_function("wide_zigzag_copy", |b| {
        b.iter(|| {
            let mut sink = PixelCounter::default();
            poly_line(&mut sink, &copy, black_box(&path)).unwrap();
            black_box(sink.0)
        })
    });
    c.bench_function("wide_zigzag_xor", |b| {
        b.iter(|| {
            let mut sink = PixelCounter::default();
            poly_line(&mut sink, &xor, black_box(&path)).unwrap();
            black_box(sink.0)
        })
    });
}

fn bench_dashes(c: &mut Criterion) {
    let path = zigzag(200);
    let gc = LineGc::new()
        .with_line_width(5)
        .with_line_style(LineStyle::DoubleDash)
        .with_cap_style(CapStyle::Round)
        .with_dashes(DashPattern::new(&[9, 4, 2, 4]).unwrap(), 0);
    c.bench_function("double_dash_zigzag", |b| {
        b.iter(|| {
            let mut sink = PixelCounter::default();
            poly_line(&mut sink, &gc, black_box(&path)).unwrap();
            black_box(sink.0)
        })
    });
    let thin = gc.clone().with_line_width(0);
    c.bench_function("thin_dash_zigzag", |b| {
        b.iter(|| {
            let mut sink = PixelCounter::default();
            poly_line(&mut sink, &thin, black_box(&path)).unwrap();
            black_box(sink.0)
        })
    });
}

criterion_group!(raster_benches, bench_fill, bench_wide_lines, bench_dashes);
criterion_main!(raster_benches);
