//! Inkvite Render Library
//!
//! Canvas compositor for the invitation editor: turns an
//! [`inkvite_core::EditorState`] into a display list, routes pointer
//! interaction back as canvas events, and rasterizes snapshots to PNG
//! for template thumbnails.

pub mod compositor;
pub mod fonts;
pub mod interact;
pub mod mask;
pub mod raster;
pub mod scene;

pub use compositor::Compositor;
pub use fonts::FontLibrary;
pub use interact::{CanvasEvent, Corner, HandleKind, PointerEvent};
pub use mask::{mask_geometry, MaskGeometry};
pub use scene::{DashPattern, DrawOp, Scene, TextRun};

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Font error: {0}")]
    Font(String),
    #[error("Image decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
