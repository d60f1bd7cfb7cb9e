//! Software rasterizer for scene snapshots.
//!
//! Fills are scanline-based over flattened paths (nonzero winding);
//! text goes through ab_glyph coverage rasterization. Quality targets a
//! thumbnail, not print: nearest-neighbour image sampling and a square
//! pen for strokes are deliberate.

use crate::fonts::FontLibrary;
use crate::scene::{DashPattern, DrawOp, Scene, TextRun};
use crate::{RenderError, RenderResult};
use ab_glyph::{Font, ScaleFont};
use image::{ImageEncoder, Rgba, RgbaImage};
use inkvite_core::Align;
use kurbo::{Affine, BezPath, Point, Rect, Shape};
use std::collections::HashMap;

const FLATTEN_TOLERANCE: f64 = 0.25;

/// Decode an uploaded image (PNG/JPEG/WebP) into RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> RenderResult<RgbaImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
    Ok(decoded.to_rgba8())
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(img: &RgbaImage) -> RenderResult<Vec<u8>> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(out)
}

/// Render a scene at `scale` device pixels per logical unit.
pub fn render_scene(
    scene: &Scene,
    logical_width: u32,
    logical_height: u32,
    scale: f64,
    images: &HashMap<String, RgbaImage>,
    fonts: &FontLibrary,
) -> RgbaImage {
    let width = (logical_width as f64 * scale).round().max(1.0) as u32;
    let height = (logical_height as f64 * scale).round().max(1.0) as u32;
    let mut img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let device = Affine::scale(scale);

    for op in scene.ops() {
        match op {
            DrawOp::Clear { color } => {
                let rgba = color_bytes(*color);
                for px in img.pixels_mut() {
                    *px = Rgba(rgba);
                }
            }
            DrawOp::Image {
                url,
                dst,
                clip,
                transform,
            } => {
                let full = device * *transform;
                match images.get(url) {
                    Some(src) => draw_image(&mut img, src, *dst, clip.as_ref(), full),
                    None => {
                        // placeholder wash where the image would be
                        let path = clip.clone().unwrap_or_else(|| dst.to_path(0.1));
                        fill_path(&mut img, &path, [226, 226, 234, 255], full);
                    }
                }
            }
            DrawOp::Fill {
                path,
                color,
                transform,
            } => {
                fill_path(&mut img, path, color_bytes(*color), device * *transform);
            }
            DrawOp::Stroke {
                path,
                color,
                width,
                dash,
                transform,
            } => {
                stroke_path(
                    &mut img,
                    path,
                    color_bytes(*color),
                    *width,
                    *dash,
                    device * *transform,
                );
            }
            DrawOp::Text { run, transform } => {
                draw_text(&mut img, run, fonts, device * *transform);
            }
            DrawOp::Animation { id, .. } => {
                // no vector animation player in this backend; the slot
                // stays empty and whatever sits beneath shows through
                log::debug!("animation layer {id} skipped by raster backend");
            }
        }
    }
    img
}

fn color_bytes(color: peniko::Color) -> [u8; 4] {
    let rgba = color.to_rgba8();
    [rgba.r, rgba.g, rgba.b, rgba.a]
}

/// Source-over blend of one pixel with fractional coverage.
fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, color: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    let alpha = (color[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let src = color[channel] as f32;
        let old = dst.0[channel] as f32;
        dst.0[channel] = (src * alpha + old * (1.0 - alpha)).round() as u8;
    }
    let old_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((alpha + old_a * (1.0 - alpha)) * 255.0).round() as u8;
}

/// Flatten a transformed path into line segments.
fn flatten(path: &BezPath, transform: Affine) -> Vec<(Point, Point)> {
    let mut transformed = path.clone();
    transformed.apply_affine(transform);
    let mut segments = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(transformed.iter(), FLATTEN_TOLERANCE, |el| match el {
        kurbo::PathEl::MoveTo(p) => {
            start = p;
            last = p;
        }
        kurbo::PathEl::LineTo(p) => {
            segments.push((last, p));
            last = p;
        }
        kurbo::PathEl::ClosePath => {
            segments.push((last, start));
            last = start;
        }
        _ => {}
    });
    segments
}

/// Nonzero-winding scanline fill.
fn fill_path(img: &mut RgbaImage, path: &BezPath, color: [u8; 4], transform: Affine) {
    let segments = flatten(path, transform);
    if segments.is_empty() {
        return;
    }
    let (y_min, y_max) = segments.iter().fold((f64::MAX, f64::MIN), |(lo, hi), (a, b)| {
        (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
    });
    let row_start = y_min.floor().max(0.0) as i64;
    let row_end = y_max.ceil().min(img.height() as f64) as i64;

    for row in row_start..row_end {
        let y = row as f64 + 0.5;
        // signed crossings at this scanline
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for (a, b) in &segments {
            let (x, dir) = if a.y <= y && b.y > y {
                (a.x + (y - a.y) / (b.y - a.y) * (b.x - a.x), 1)
            } else if b.y <= y && a.y > y {
                (b.x + (y - b.y) / (a.y - b.y) * (a.x - b.x), -1)
            } else {
                continue;
            };
            crossings.push((x, dir));
        }
        crossings.sort_by(|p, q| p.0.total_cmp(&q.0));
        let mut winding = 0;
        let mut span_start = 0.0;
        for (x, dir) in crossings {
            if winding == 0 {
                span_start = x;
            }
            winding += dir;
            if winding == 0 {
                let from = span_start.floor().max(0.0) as i64;
                let to = x.ceil().min(img.width() as f64) as i64;
                for col in from..to {
                    let px = col as f64 + 0.5;
                    if px >= span_start && px < x {
                        blend_pixel(img, col, row, color, 1.0);
                    }
                }
            }
        }
    }
}

/// Stroke with a square pen, optionally dashed. Dash phase restarts on
/// every subpath segment, which matches how the selection chrome is
/// drawn on the interactive canvas.
fn stroke_path(
    img: &mut RgbaImage,
    path: &BezPath,
    color: [u8; 4],
    width: f64,
    dash: Option<DashPattern>,
    transform: Affine,
) {
    let pen = (width * transform.as_coeffs()[0]).max(1.0);
    let half = pen / 2.0;
    let dash_scale = transform.as_coeffs()[0];
    for (a, b) in flatten(path, transform) {
        let length = a.distance(b);
        if length == 0.0 {
            continue;
        }
        let step = 0.5;
        let mut t = 0.0;
        while t <= length {
            let visible = match dash {
                Some(DashPattern { on, off }) => {
                    let period = (on + off) * dash_scale;
                    (t % period) < on * dash_scale
                }
                None => true,
            };
            if visible {
                let p = a + (b - a) * (t / length);
                let from_x = (p.x - half).floor() as i64;
                let to_x = (p.x + half).ceil() as i64;
                let from_y = (p.y - half).floor() as i64;
                let to_y = (p.y + half).ceil() as i64;
                for y in from_y..to_y {
                    for x in from_x..to_x {
                        blend_pixel(img, x, y, color, 1.0);
                    }
                }
            }
            t += step;
        }
    }
}

/// Coverage mask of a clip path at device resolution, used to window
/// image draws. 255 inside, 0 outside.
fn clip_mask(path: &BezPath, transform: Affine, width: u32, height: u32) -> Vec<u8> {
    let mut mask_img = RgbaImage::new(width, height);
    fill_path(&mut mask_img, path, [255, 255, 255, 255], transform);
    mask_img.pixels().map(|p| p.0[3]).collect()
}

fn draw_image(
    img: &mut RgbaImage,
    src: &RgbaImage,
    dst: Rect,
    clip: Option<&BezPath>,
    transform: Affine,
) {
    let device_dst = transform.transform_rect_bbox(dst);
    if device_dst.width() <= 0.0 || device_dst.height() <= 0.0 {
        return;
    }
    let mask = clip.map(|path| clip_mask(path, transform, img.width(), img.height()));

    let x0 = device_dst.x0.floor().max(0.0) as i64;
    let y0 = device_dst.y0.floor().max(0.0) as i64;
    let x1 = device_dst.x1.ceil().min(img.width() as f64) as i64;
    let y1 = device_dst.y1.ceil().min(img.height() as f64) as i64;

    for y in y0..y1 {
        for x in x0..x1 {
            let u = (x as f64 + 0.5 - device_dst.x0) / device_dst.width();
            let v = (y as f64 + 0.5 - device_dst.y0) / device_dst.height();
            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                continue;
            }
            let sx = ((u * src.width() as f64) as u32).min(src.width() - 1);
            let sy = ((v * src.height() as f64) as u32).min(src.height() - 1);
            let pixel = src.get_pixel(sx, sy).0;
            let coverage = match &mask {
                Some(mask) => mask[(y as usize) * img.width() as usize + x as usize] as f32 / 255.0,
                None => 1.0,
            };
            blend_pixel(img, x, y, pixel, coverage);
        }
    }
}

/// Lay out and rasterize a text run. Fields whose family resolves to no
/// registered font draw nothing.
fn draw_text(img: &mut RgbaImage, run: &TextRun, fonts: &FontLibrary, transform: Affine) {
    let Some(font) = fonts.resolve(&run.family, run.weight, run.style) else {
        log::debug!("no font registered for family {:?}, skipping text", run.family);
        return;
    };
    let scale = transform.as_coeffs()[0];
    let px_size = (run.size * scale) as f32;
    let scaled = font.as_scaled(px_size);
    let letter_spacing = (run.letter_spacing * scale) as f32;
    let line_advance = (run.size * run.line_height * scale) as f32;
    let bounds = transform.transform_rect_bbox(run.bounds);
    let color = [run.color.r, run.color.g, run.color.b, run.color.a];

    for (index, line) in run.text.split('\n').enumerate() {
        let line_width = line_layout_width(&scaled, line, letter_spacing);
        let origin_x = match run.align {
            Align::Left => bounds.x0 as f32,
            Align::Center => (bounds.x0 + bounds.x1) as f32 / 2.0 - line_width / 2.0,
            Align::Right => bounds.x1 as f32 - line_width,
        };
        let baseline = bounds.y0 as f32 + scaled.ascent() + index as f32 * line_advance;

        let mut caret = origin_x;
        for ch in line.chars() {
            let glyph_id = font.glyph_id(ch);
            let glyph = glyph_id.with_scale_and_position(px_size, ab_glyph::point(caret, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let glyph_bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let x = gx as i64 + glyph_bounds.min.x as i64;
                    let y = gy as i64 + glyph_bounds.min.y as i64;
                    blend_pixel(img, x, y, color, coverage);
                });
            }
            caret += scaled.h_advance(glyph_id) + letter_spacing;
        }
    }
}

fn line_layout_width<F: Font, S: ScaleFont<F>>(scaled: &S, line: &str, letter_spacing: f32) -> f32 {
    let mut width = 0.0;
    let mut glyphs = 0;
    for ch in line.chars() {
        width += scaled.h_advance(scaled.font().glyph_id(ch));
        glyphs += 1;
    }
    if glyphs > 1 {
        width += letter_spacing * (glyphs - 1) as f32;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Circle;
    use peniko::Color;

    fn solid(c: [u8; 4]) -> peniko::Color {
        Color::from_rgba8(c[0], c[1], c[2], c[3])
    }

    #[test]
    fn test_fill_covers_interior_not_exterior() {
        let mut scene = Scene::new();
        scene.push(DrawOp::Fill {
            path: Rect::new(10.0, 10.0, 30.0, 30.0).to_path(0.1),
            color: solid([255, 0, 0, 255]),
            transform: Affine::IDENTITY,
        });
        let img = render_scene(&scene, 40, 40, 1.0, &HashMap::new(), &FontLibrary::new());
        assert_eq!(img.get_pixel(20, 20).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_circle_fill_misses_corners() {
        let mut scene = Scene::new();
        scene.push(DrawOp::Fill {
            path: Circle::new((20.0, 20.0), 15.0).to_path(0.1),
            color: solid([0, 0, 255, 255]),
            transform: Affine::IDENTITY,
        });
        let img = render_scene(&scene, 40, 40, 1.0, &HashMap::new(), &FontLibrary::new());
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 255, 255]);
        // corner of the bounding box stays background
        assert_eq!(img.get_pixel(7, 7).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_pixel_ratio_scales_output() {
        let scene = Scene::new();
        let img = render_scene(&scene, 420, 588, 2.0, &HashMap::new(), &FontLibrary::new());
        assert_eq!((img.width(), img.height()), (840, 1176));
    }

    #[test]
    fn test_image_draw_respects_clip() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        let mut images = HashMap::new();
        images.insert("memory://photo.png".to_string(), src);
        let mut scene = Scene::new();
        scene.push(DrawOp::Image {
            url: "memory://photo.png".to_string(),
            dst: Rect::new(0.0, 0.0, 40.0, 40.0),
            clip: Some(Circle::new((20.0, 20.0), 15.0).to_path(0.1)),
            transform: Affine::IDENTITY,
        });
        let img = render_scene(&scene, 40, 40, 1.0, &images, &FontLibrary::new());
        assert_eq!(img.get_pixel(20, 20).0, [0, 255, 0, 255]);
        // outside the clip the source never lands
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_missing_image_draws_placeholder() {
        let mut scene = Scene::new();
        scene.push(DrawOp::Image {
            url: "memory://gone.png".to_string(),
            dst: Rect::new(0.0, 0.0, 10.0, 10.0),
            clip: None,
            transform: Affine::IDENTITY,
        });
        let img = render_scene(&scene, 20, 20, 1.0, &HashMap::new(), &FontLibrary::new());
        assert_ne!(img.get_pixel(5, 5).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_png_round_trip() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let png = encode_png(&img).unwrap();
        let back = decode_image(&png).unwrap();
        assert_eq!(back.dimensions(), (8, 8));
        assert_eq!(back.get_pixel(4, 4).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_unregistered_font_renders_nothing() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut scene = Scene::new();
        scene.push(DrawOp::Text {
            run: TextRun {
                text: "Hello".to_string(),
                family: "Montserrat".to_string(),
                weight: inkvite_core::Weight::Normal,
                style: inkvite_core::FontStyle::Normal,
                size: 20.0,
                color: inkvite_core::Rgba::black(),
                align: Align::Center,
                letter_spacing: 0.0,
                line_height: 1.0,
                bounds: Rect::new(0.0, 0.0, 100.0, 30.0),
            },
            transform: Affine::IDENTITY,
        });
        let img = render_scene(&scene, 100, 30, 1.0, &HashMap::new(), &FontLibrary::new());
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
