//! Animation payload hydration.
//!
//! Persisted documents carry only the storage URL of each animation;
//! the decoded payload is fetched after load. A fetch failure is
//! isolated to its layer: the layer stays in the design (its URL
//! intact) so a later save cannot silently drop it.

use crate::document::DesignDocument;
use crate::layers::AnimationLayer;
use crate::storage::AssetStore;

/// Outcome of one hydration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub hydrated: usize,
    /// Layer ids whose payload fetch failed.
    pub failed: Vec<String>,
}

impl HydrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch and attach the runtime payload for every animation layer that
/// has a source URL but no payload yet. Layers without a URL and layers
/// already hydrated are skipped.
pub async fn hydrate_animations(
    design: &mut DesignDocument,
    assets: &dyn AssetStore,
) -> HydrationReport {
    let mut report = HydrationReport::default();
    for layer in &mut design.animations {
        let AnimationLayer::Lottie(lottie) = layer;
        if lottie.lottie_data.is_some() {
            continue;
        }
        let Some(url) = lottie.lottie_src.clone() else {
            continue;
        };
        match assets.download(&url).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(payload) => {
                    lottie.lottie_data = Some(payload);
                    report.hydrated += 1;
                }
                Err(err) => {
                    log::warn!("animation {}: payload is not valid JSON: {}", lottie.id, err);
                    report.failed.push(lottie.id.clone());
                }
            },
            Err(err) => {
                log::warn!("animation {}: payload fetch failed: {}", lottie.id, err);
                report.failed.push(lottie.id.clone());
            }
        }
    }
    report
}
