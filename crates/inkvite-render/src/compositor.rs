//! Scene construction and snapshots.

use crate::fonts::FontLibrary;
use crate::interact::{Corner, Gesture, HANDLE_SIZE, ROTATE_OFFSET};
use crate::mask::mask_geometry;
use crate::raster;
use crate::scene::{DashPattern, DrawOp, Scene, TextRun};
use crate::RenderResult;
use image::RgbaImage;
use inkvite_core::{field_box, AnimationLayer, EditorMode, EditorState, Field, Rgba, Selection};
use kurbo::{Affine, Point, Rect, Shape};
use peniko::Color;
use std::collections::HashMap;

/// Stroke color of selection chrome.
const SELECTION_HEX: &str = "#B7A9FF";

/// Dash pattern of selection outlines.
const SELECTION_DASH: DashPattern = DashPattern { on: 4.0, off: 2.0 };

const OUTLINE_WIDTH: f64 = 1.5;

/// Amount the field highlight box is inflated beyond the content box.
const HIGHLIGHT_INFLATE: f64 = 4.0;

/// Builds display lists from editor state and rasterizes snapshots.
///
/// Owns the decoded image cache and the font registry; holds the
/// in-flight pointer gesture but never the document itself.
pub struct Compositor {
    pub mode: EditorMode,
    pub(crate) gesture: Option<Gesture>,
    images: HashMap<String, RgbaImage>,
    fonts: FontLibrary,
}

impl Compositor {
    pub fn new(mode: EditorMode) -> Self {
        Self {
            mode,
            gesture: None,
            images: HashMap::new(),
            fonts: FontLibrary::new(),
        }
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }

    /// Decode and cache an image under its URL so scene ops can
    /// reference it.
    pub fn load_image(&mut self, url: &str, bytes: &[u8]) -> RenderResult<()> {
        let decoded = raster::decode_image(bytes)?;
        self.images.insert(url.to_string(), decoded);
        Ok(())
    }

    pub fn has_image(&self, url: &str) -> bool {
        self.images.contains_key(url)
    }

    /// Build the interactive display list, selection chrome included.
    pub fn build_scene(&self, state: &EditorState) -> Scene {
        self.compose(state, true)
    }

    /// Rasterize the current state to PNG at `420·r x 588·r` pixels.
    /// Selection chrome is left out; the snapshot is artwork, not UI.
    pub fn snapshot_png(&self, state: &EditorState, pixel_ratio: f64) -> RenderResult<Vec<u8>> {
        let scene = self.compose(state, false);
        let canvas = state.design.canvas;
        let img = raster::render_scene(
            &scene,
            canvas.width,
            canvas.height,
            pixel_ratio,
            &self.images,
            &self.fonts,
        );
        raster::encode_png(&img)
    }

    fn compose(&self, state: &EditorState, chrome: bool) -> Scene {
        let mut scene = Scene::new();
        let canvas_rect = state.design.canvas.rect();
        scene.push(DrawOp::Clear {
            color: Color::WHITE,
        });

        if let Some(url) = &state.design.background_url {
            scene.push(DrawOp::Image {
                url: url.clone(),
                dst: canvas_rect,
                clip: None,
                transform: Affine::IDENTITY,
            });
        }

        // each animation layer occupies its own z-order slot; backends
        // without a lottie player leave the slot empty
        for layer in &state.design.animations {
            let (x, y, w, h) = layer.frame();
            let rect = Rect::new(x, y, x + w, y + h);
            let transform = rotate_about(rect, layer.rotation());
            let AnimationLayer::Lottie(lottie) = layer;
            scene.push(DrawOp::Animation {
                id: lottie.id.clone(),
                src: lottie.lottie_src.clone(),
                payload: lottie.lottie_data.clone(),
                dst: rect,
                transform,
            });
            let selected = state.selection == Selection::Animation(layer.id().to_string());
            if chrome && selected && self.mode == EditorMode::Admin {
                self.push_frame_chrome(&mut scene, rect, transform);
            }
        }

        if let Some(photo) = state.design.photo.as_ref().filter(|p| p.has_photo) {
            let rect = Rect::new(photo.x, photo.y, photo.x + photo.width, photo.y + photo.height);
            let transform = rotate_about(rect, photo.rotation());
            let clip = mask_geometry(photo.photo_shape, rect).clip_path();
            match &photo.sample_photo_url {
                Some(url) => scene.push(DrawOp::Image {
                    url: url.clone(),
                    dst: rect,
                    clip: Some(clip.clone()),
                    transform,
                }),
                None => scene.push(DrawOp::Fill {
                    path: clip.clone(),
                    color: Color::from_rgba8(226, 226, 234, 255),
                    transform,
                }),
            }
            // the dashed mask outline marks every enabled photo frame;
            // only the transform handles wait for selection
            if chrome && self.mode == EditorMode::Admin {
                scene.push(DrawOp::Stroke {
                    path: clip,
                    color: selection_color(),
                    width: OUTLINE_WIDTH,
                    dash: Some(SELECTION_DASH),
                    transform,
                });
                if state.selection == Selection::Photo {
                    self.push_frame_chrome(&mut scene, rect, transform);
                }
            }
        }

        for field in &state.design.fields {
            let bounds = field_box(field);
            scene.push(DrawOp::Text {
                run: text_run(field, bounds),
                transform: Affine::IDENTITY,
            });
            if chrome && state.selection == Selection::Field(field.id.clone()) {
                scene.push(DrawOp::Stroke {
                    path: bounds.inflate(HIGHLIGHT_INFLATE, HIGHLIGHT_INFLATE).to_path(0.1),
                    color: selection_color(),
                    width: OUTLINE_WIDTH,
                    dash: Some(SELECTION_DASH),
                    transform: Affine::IDENTITY,
                });
            }
        }

        scene
    }

    /// Corner handles plus the rotate anchor for a transformable frame.
    fn push_frame_chrome(&self, scene: &mut Scene, rect: Rect, transform: Affine) {
        scene.push(DrawOp::Stroke {
            path: rect.to_path(0.1),
            color: selection_color(),
            width: OUTLINE_WIDTH,
            dash: Some(SELECTION_DASH),
            transform,
        });
        for corner in Corner::ALL {
            let p = corner.point(rect);
            scene.push(DrawOp::Fill {
                path: handle_rect(p).to_path(0.1),
                color: selection_color(),
                transform,
            });
        }
        let anchor = Point::new(rect.center().x, rect.y0 - ROTATE_OFFSET);
        scene.push(DrawOp::Fill {
            path: kurbo::Circle::new(anchor, HANDLE_SIZE / 2.0).to_path(0.1),
            color: selection_color(),
            transform,
        });
    }
}

fn selection_color() -> Color {
    Rgba::from_hex(SELECTION_HEX).into()
}

fn handle_rect(center: Point) -> Rect {
    Rect::new(
        center.x - HANDLE_SIZE / 2.0,
        center.y - HANDLE_SIZE / 2.0,
        center.x + HANDLE_SIZE / 2.0,
        center.y + HANDLE_SIZE / 2.0,
    )
}

fn rotate_about(rect: Rect, degrees: f64) -> Affine {
    if degrees == 0.0 {
        return Affine::IDENTITY;
    }
    let center = rect.center();
    Affine::translate(center.to_vec2())
        * Affine::rotate(degrees.to_radians())
        * Affine::translate(-center.to_vec2())
}

fn text_run(field: &Field, bounds: Rect) -> TextRun {
    TextRun {
        text: field.text.clone(),
        family: field.font.clone(),
        weight: field.weight,
        style: field.style,
        size: field.size,
        color: field.color,
        align: field.align,
        letter_spacing: field.letter_spacing(),
        line_height: field.line_height(),
        bounds,
    }
}
