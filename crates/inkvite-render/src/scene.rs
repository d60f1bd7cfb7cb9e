//! Display list produced by the compositor.
//!
//! Backends (the raster snapshot here, a GPU surface elsewhere) consume
//! the list in order; painter's algorithm, no implicit state.

use inkvite_core::{Align, FontStyle, Rgba, Weight};
use kurbo::{Affine, BezPath, Rect};
use peniko::Color;

/// A laid-out block of text: one field's content.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub family: String,
    pub weight: Weight,
    pub style: FontStyle,
    pub size: f64,
    pub color: Rgba,
    pub align: Align,
    pub letter_spacing: f64,
    pub line_height: f64,
    /// Content box the run is aligned within.
    pub bounds: Rect,
}

/// Dash pattern for selection chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashPattern {
    pub on: f64,
    pub off: f64,
}

/// One paint operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Solid fill of the whole canvas.
    Clear { color: Color },
    /// An image referenced by URL, stretched into `dst`, optionally
    /// clipped. Unresolvable URLs draw the placeholder fill instead.
    Image {
        url: String,
        dst: Rect,
        clip: Option<BezPath>,
        transform: Affine,
    },
    /// Filled path.
    Fill {
        path: BezPath,
        color: Color,
        transform: Affine,
    },
    /// Stroked path, optionally dashed.
    Stroke {
        path: BezPath,
        color: Color,
        width: f64,
        dash: Option<DashPattern>,
        transform: Affine,
    },
    /// Text block.
    Text { run: TextRun, transform: Affine },
    /// An animation layer's slot in the z-order. Backends with a vector
    /// animation player draw the payload into `dst`; the raster backend
    /// has none and leaves the slot empty.
    Animation {
        id: String,
        src: Option<String>,
        payload: Option<serde_json::Value>,
        dst: Rect,
        transform: Affine,
    },
}

/// An ordered display list in logical canvas coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    ops: Vec<DrawOp>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
