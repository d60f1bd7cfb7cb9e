//! Photo mask layer.

use serde::{Deserialize, Serialize};

/// Closed set of mask shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoShape {
    Circle,
    /// Rounded rectangle (soft corners).
    #[default]
    Rect,
    /// Doorway silhouette: semicircular top, straight sides, flat bottom.
    Arch,
}

/// The photo mask layer. At most one per design.
///
/// When `has_photo` is false the shape, geometry, and sample URL are
/// retained but not rendered, so re-enabling restores prior placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoLayer {
    pub has_photo: bool,
    pub photo_shape: PhotoShape,
    #[serde(default)]
    pub sample_photo_url: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

impl PhotoLayer {
    /// Minimum bounding box edge accepted by a resize gesture, in
    /// logical units.
    pub const MIN_SIZE: f64 = 32.0;

    /// Rotation in degrees (defaults to 0).
    pub fn rotation(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }
}

impl Default for PhotoLayer {
    /// Default frame: square rounded-rect mask near canvas centre,
    /// disabled.
    fn default() -> Self {
        Self {
            has_photo: false,
            photo_shape: PhotoShape::Rect,
            sample_photo_url: None,
            x: 200.0,
            y: 200.0,
            width: 240.0,
            height: 240.0,
            rotation: Some(0.0),
        }
    }
}

/// Rebuild a photo layer from legacy flat document scalars.
///
/// Returns the default disabled frame when the legacy flag is unset;
/// otherwise a default frame carrying the legacy shape and sample URL
/// (trimmed, empty collapsed to `None`).
pub fn photo_from_legacy(
    has_photo: bool,
    shape: Option<PhotoShape>,
    sample_photo_url: Option<&str>,
) -> PhotoLayer {
    if !has_photo {
        return PhotoLayer::default();
    }
    let sample = sample_photo_url
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    PhotoLayer {
        has_photo: true,
        photo_shape: shape.unwrap_or_default(),
        sample_photo_url: sample,
        ..PhotoLayer::default()
    }
}
