//! Animation layers.
//!
//! A tagged union with a single variant today (embedded Lottie vector
//! animation); every consumer matches exhaustively so new kinds force a
//! compile-time review.

use serde::{Deserialize, Serialize};

/// An embedded Lottie animation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LottieLayer {
    pub id: String,
    /// Storage URL of the animation payload. Accepts the legacy
    /// `lottieUrl` name on read; always written as `lottieSrc`.
    #[serde(default, alias = "lottieUrl", skip_serializing_if = "Option::is_none")]
    pub lottie_src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay: Option<bool>,
    #[serde(default, rename = "loop", skip_serializing_if = "Option::is_none")]
    pub loop_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,

    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i64>,

    /// Decoded animation payload. Runtime-only: attached by hydration
    /// after load, stripped by `#[serde(skip)]` before persistence.
    #[serde(skip)]
    pub lottie_data: Option<serde_json::Value>,
}

impl LottieLayer {
    /// Minimum bounding box edge accepted by a resize gesture, in
    /// logical units.
    pub const MIN_SIZE: f64 = 10.0;

    pub fn rotation(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }
}

/// Animation layer variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnimationLayer {
    Lottie(LottieLayer),
}

impl AnimationLayer {
    pub fn id(&self) -> &str {
        match self {
            AnimationLayer::Lottie(l) => &l.id,
        }
    }

    pub fn is_lottie(&self) -> bool {
        match self {
            AnimationLayer::Lottie(_) => true,
        }
    }

    /// Bounding box as (x, y, width, height).
    pub fn frame(&self) -> (f64, f64, f64, f64) {
        match self {
            AnimationLayer::Lottie(l) => (l.x, l.y, l.width, l.height),
        }
    }

    pub fn rotation(&self) -> f64 {
        match self {
            AnimationLayer::Lottie(l) => l.rotation(),
        }
    }

    /// Copy with the runtime payload removed. Used by the codec before
    /// persistence; the `#[serde(skip)]` already guarantees omission,
    /// this keeps the serialized in-memory copy cheap as well.
    pub fn without_runtime_data(&self) -> AnimationLayer {
        match self {
            AnimationLayer::Lottie(l) => AnimationLayer::Lottie(LottieLayer {
                lottie_data: None,
                ..l.clone()
            }),
        }
    }

    /// Apply a transform patch.
    pub fn patched(&self, patch: &AnimationPatch) -> AnimationLayer {
        match self {
            AnimationLayer::Lottie(l) => {
                let mut next = l.clone();
                if let Some(v) = patch.x {
                    next.x = v;
                }
                if let Some(v) = patch.y {
                    next.y = v;
                }
                if let Some(v) = patch.width {
                    next.width = v;
                }
                if let Some(v) = patch.height {
                    next.height = v;
                }
                if let Some(v) = patch.rotation {
                    next.rotation = Some(v);
                }
                if let Some(v) = patch.z_index {
                    next.z_index = Some(v);
                }
                AnimationLayer::Lottie(next)
            }
        }
    }
}

/// Transform patch reported by the compositor for an animation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub z_index: Option<i64>,
}
