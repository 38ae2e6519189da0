// Named test scenes drawn through span-raster onto a PixelSurface.

use span_raster::{
    draw_polygon, fill_polygon, poly_line, poly_segment, CapStyle, DashPattern, FillingRule,
    JoinStyle, LineGc, LineStyle, PixelSurface, Point, PolygonShape, Result, Rop,
};

use crate::GrayImage;

type SceneFn = fn(&mut PixelSurface, u32, u32) -> Result<()>;

const SCENES: &[(&str, SceneFn)] = &[
    ("polygons", render_polygons),
    ("caps_joins", render_caps_joins),
    ("dashes", render_dashes),
    ("thin_lines", render_thin_lines),
    ("xor_strokes", render_xor_strokes),
];

/// Render a named scene. Returns `Ok(None)` for an unknown name.
pub fn render_scene(name: &str, width: u32, height: u32) -> Result<Option<GrayImage>> {
    let Some((_, scene)) = SCENES.iter().find(|(n, _)| *n == name) else {
        return Ok(None);
    };
    let mut surface = PixelSurface::new(width, height, Rop::Copy);
    surface.set_colors(1, 2);
    scene(&mut surface, width, height)?;
    log::info!("rendered '{}' at {}x{}", name, width, height);
    Ok(Some(GrayImage::from_surface(&surface)))
}

/// List all scene names.
pub fn available_scenes() -> Vec<&'static str> {
    SCENES.iter().map(|(n, _)| *n).collect()
}

fn pts(list: &[(i32, i32)]) -> Vec<Point> {
    list.iter().map(|&p| p.into()).collect()
}

/// A five-point star of radius `r` centred on `(cx, cy)`.
fn star(cx: i32, cy: i32, r: f64) -> Vec<Point> {
    (0..5)
        .map(|i| {
            let a = std::f64::consts::PI * (-0.5 + i as f64 * 0.8);
            Point::new(cx + (r * a.cos()).round() as i32, cy + (r * a.sin()).round() as i32)
        })
        .collect()
}

fn render_polygons(s: &mut PixelSurface, w: u32, h: u32) -> Result<()> {
    let (w, h) = (w as i32, h as i32);
    let r = (w.min(h) / 5) as f64;
    let mut gc = LineGc::new();
    fill_polygon(s, &gc, PolygonShape::Complex, &star(w / 4, h / 3, r))?;
    gc.set_fill_rule(FillingRule::EvenOdd);
    fill_polygon(s, &gc, PolygonShape::Complex, &star(3 * w / 4, h / 3, r))?;
    let hex: Vec<Point> = (0..6)
        .map(|i| {
            let a = std::f64::consts::PI * i as f64 / 3.0;
            Point::new(
                w / 2 + (r * a.cos()).round() as i32,
                3 * h / 4 + (r * a.sin()).round() as i32,
            )
        })
        .collect();
    fill_polygon(s, &gc, PolygonShape::Convex, &hex)
}

fn render_caps_joins(s: &mut PixelSurface, w: u32, h: u32) -> Result<()> {
    let (w, h) = (w as i32, h as i32);
    let caps = [CapStyle::Butt, CapStyle::Round, CapStyle::Projecting];
    let joins = [JoinStyle::Miter, JoinStyle::Round, JoinStyle::Bevel];
    let cw = w / 3;
    let ch = h / 3;
    let lw = (cw.min(ch) / 8).max(2);
    for (row, join) in joins.iter().enumerate() {
        for (col, cap) in caps.iter().enumerate() {
            let x0 = col as i32 * cw;
            let y0 = row as i32 * ch;
            let gc = LineGc::new()
                .with_line_width(lw)
                .with_cap_style(*cap)
                .with_join_style(*join);
            let path = pts(&[
                (x0 + cw / 5, y0 + 4 * ch / 5),
                (x0 + cw / 2, y0 + ch / 5),
                (x0 + 4 * cw / 5, y0 + 4 * ch / 5),
            ]);
            poly_line(s, &gc, &path)?;
        }
    }
    Ok(())
}

fn render_dashes(s: &mut PixelSurface, w: u32, h: u32) -> Result<()> {
    let (w, h) = (w as i32, h as i32);
    let pattern = DashPattern::new(&[12, 6, 3, 6])?;
    let styles = [LineStyle::OnOffDash, LineStyle::DoubleDash];
    let caps = [CapStyle::Butt, CapStyle::Round, CapStyle::Projecting];
    let mut y = h / 8;
    for style in styles {
        for cap in caps {
            let gc = LineGc::new()
                .with_line_width(5)
                .with_line_style(style)
                .with_cap_style(cap)
                .with_dashes(pattern.clone(), 0);
            poly_line(s, &gc, &pts(&[(w / 10, y), (9 * w / 10, y + h / 40)]))?;
            y += h / 8;
        }
    }
    let gc = LineGc::new()
        .with_line_style(LineStyle::OnOffDash)
        .with_dashes(pattern, 0);
    draw_polygon(s, &gc, false, &pts(&[(w / 10, y), (9 * w / 10, y), (w / 2, h - 2)]))
}

fn render_thin_lines(s: &mut PixelSurface, w: u32, h: u32) -> Result<()> {
    let (w, h) = (w as i32, h as i32);
    let centre = Point::new(w / 2, h / 2);
    let r = (w.min(h) / 2 - 2) as f64;
    let spokes: Vec<(Point, Point)> = (0..32)
        .map(|i| {
            let a = std::f64::consts::PI * i as f64 / 16.0;
            let tip = Point::new(
                centre.x + (r * a.cos()).round() as i32,
                centre.y + (r * a.sin()).round() as i32,
            );
            (centre, tip)
        })
        .collect();
    poly_segment(s, &LineGc::new(), &spokes)
}

fn render_xor_strokes(s: &mut PixelSurface, w: u32, h: u32) -> Result<()> {
    let (w, h) = (w as i32, h as i32);
    // Every pixel of a careful stroke is touched once, so a second pass
    // over the same path erases the first.
    *s = PixelSurface::new(w as u32, h as u32, Rop::Xor);
    s.set_colors(1, 2);
    let gc = LineGc::new()
        .with_line_width((w.min(h) / 16).max(3))
        .with_cap_style(CapStyle::Round)
        .with_join_style(JoinStyle::Round)
        .with_rop(Rop::Xor);
    let path = pts(&[(w / 8, h / 8), (7 * w / 8, h / 4), (w / 4, 7 * h / 8), (7 * w / 8, 7 * h / 8)]);
    poly_line(s, &gc, &path)
}
