//! Admin template editing flow.

use crate::paths::{lottie_payload_path, preview_thumb_path, template_asset_path};
use crate::{SessionError, SessionResult};
use inkvite_core::{
    clean_tags, hydrate_animations, normalize, serialize, AnimationLayer, AssetStore, EditorMode,
    EditorState, HydrationReport, IdentityProvider, LottieLayer, StorageError, TemplateStore,
    UploadOptions,
};
use inkvite_render::Compositor;
use serde_json::json;
use uuid::Uuid;

/// Default frame of a freshly attached animation layer.
const ANIMATION_DEFAULT_FRAME: (f64, f64, f64, f64) = (80.0, 80.0, 260.0, 260.0);

/// Thumbnails are rendered at twice the logical resolution.
const PREVIEW_PIXEL_RATIO: f64 = 2.0;

/// Result of a save that also refreshed the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub thumbnail_url: Option<String>,
    /// Set when the document saved but the preview pipeline failed.
    pub preview_error: Option<String>,
}

/// One admin editing one existing template.
pub struct AdminEditSession<'a> {
    store: &'a dyn TemplateStore,
    assets: &'a dyn AssetStore,
    pub editor: EditorState,
    hydration: HydrationReport,
}

impl<'a> AdminEditSession<'a> {
    /// Load, normalize, and hydrate a template. Missing documents are
    /// fatal; a failed animation payload fetch is not.
    pub async fn open(
        identity: &dyn IdentityProvider,
        store: &'a dyn TemplateStore,
        assets: &'a dyn AssetStore,
        id: &str,
    ) -> SessionResult<AdminEditSession<'a>> {
        let claims = identity.claims().await?;
        claims.require_admin()?;

        let raw = store.load(id).await?;
        let normalized = normalize(id, &raw);
        let mut editor = EditorState::new(EditorMode::Admin, normalized.meta, normalized.design);
        let hydration = hydrate_animations(&mut editor.design, assets).await;
        if !hydration.is_clean() {
            log::warn!(
                "template {}: {} animation payload(s) unavailable",
                id,
                hydration.failed.len()
            );
        }
        editor.select_field("f1");
        Ok(Self {
            store,
            assets,
            editor,
            hydration,
        })
    }

    pub fn hydration(&self) -> &HydrationReport {
        &self.hydration
    }

    /// Upload any staged background, then write the serialized document
    /// (metadata merged over what the backend already holds).
    pub async fn save(&mut self) -> SessionResult<()> {
        let id = self.editor.meta.id.clone();
        // consume the staged background only once its upload landed
        if let Some(pending) = self.editor.pending_background().cloned() {
            let path = template_asset_path(&id, &pending.extension);
            let url = self
                .assets
                .upload(&path, pending.bytes, UploadOptions::default())
                .await?;
            self.editor.set_background_url(url);
        }
        let payload = serialize(&self.editor.meta, &self.editor.design);
        self.store.save(&id, payload, true).await?;
        self.store
            .upsert_tags(&clean_tags(&self.editor.meta.tags))
            .await?;
        Ok(())
    }

    /// Upload an animation payload and add its layer to the design,
    /// already hydrated. One animation per template: the payload lives
    /// at a fixed path and a re-attach overwrites it.
    pub async fn attach_animation(&mut self, payload: Vec<u8>) -> SessionResult<String> {
        let parsed: serde_json::Value = serde_json::from_slice(&payload)
            .map_err(|e| SessionError::Storage(StorageError::Serialization(e.to_string())))?;
        let id = self.editor.meta.id.clone();
        let options = UploadOptions {
            content_type: Some("application/json".to_string()),
            cache_control: None,
        };
        let url = self
            .assets
            .upload(&lottie_payload_path(&id), payload, options)
            .await?;

        let layer_id = Uuid::new_v4().simple().to_string();
        let (x, y, width, height) = ANIMATION_DEFAULT_FRAME;
        self.editor.remove_animation(None);
        self.editor.add_animation(AnimationLayer::Lottie(LottieLayer {
            id: layer_id.clone(),
            lottie_src: Some(url),
            autoplay: Some(true),
            loop_enabled: Some(true),
            speed: None,
            x,
            y,
            width,
            height,
            rotation: None,
            z_index: None,
            lottie_data: Some(parsed),
        }));
        Ok(layer_id)
    }

    /// Save, then refresh the preview thumbnail. The preview is
    /// best-effort: its failure never rolls back or fails the save, it
    /// only shows up in the outcome.
    pub async fn save_with_preview(
        &mut self,
        compositor: &Compositor,
    ) -> SessionResult<SaveOutcome> {
        self.save().await?;
        let id = self.editor.meta.id.clone();

        match self.refresh_preview(compositor, &id).await {
            Ok(url) => Ok(SaveOutcome {
                thumbnail_url: Some(url),
                preview_error: None,
            }),
            Err(err) => {
                log::warn!("template {}: preview refresh failed: {}", id, err);
                Ok(SaveOutcome {
                    thumbnail_url: None,
                    preview_error: Some(err.to_string()),
                })
            }
        }
    }

    async fn refresh_preview(
        &self,
        compositor: &Compositor,
        id: &str,
    ) -> SessionResult<String> {
        let png = compositor.snapshot_png(&self.editor, PREVIEW_PIXEL_RATIO)?;
        let url = self
            .assets
            .upload(&preview_thumb_path(id), png, UploadOptions::png_immutable())
            .await?;
        self.store
            .save(id, json!({ "thumbnailUrl": url }), true)
            .await?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkvite_core::{
        block_on, FieldPatch, MemoryAssetStore, MemoryTemplateStore, StaticIdentity, StorageError,
    };
    use serde_json::json;

    fn seed_template(store: &MemoryTemplateStore, id: &str) {
        let doc = json!({
            "title": "Seeded",
            "tags": ["wedding"],
            "backgroundUrl": "memory://bg.png",
            "designJSON": {
                "canvas": { "width": 420, "height": 588, "version": 1 },
                "background": { "url": "memory://bg.png" },
                "layers": {
                    "fields": [{
                        "id": "f1", "label": "Title", "text": "Hello",
                        "font": "Montserrat", "color": "#48435c",
                        "align": "center", "weight": "normal", "style": "normal",
                        "size": 44.0, "x": 50.5, "y": 110.0
                    }],
                    "animations": [{
                        "type": "lottie", "id": "a1",
                        "lottieSrc": "memory://templates/x/lottie/main.json",
                        "x": 0.0, "y": 0.0, "width": 100.0, "height": 100.0
                    }]
                }
            }
        });
        block_on(store.save(id, doc, false)).unwrap();
    }

    #[test]
    fn test_open_missing_template_is_fatal() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        let identity = StaticIdentity::admin();
        let result = block_on(AdminEditSession::open(&identity, &store, &assets, "nope42"));
        assert!(matches!(
            result,
            Err(SessionError::Storage(StorageError::NotFound(_)))
        ));
    }

    #[test]
    fn test_open_survives_payload_fetch_failure() {
        let _ = env_logger::builder().is_test(true).try_init();
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store, "t1");
        assets.fail_downloads_matching("lottie/main.json");

        let identity = StaticIdentity::admin();
        let session =
            block_on(AdminEditSession::open(&identity, &store, &assets, "t1")).unwrap();
        assert_eq!(session.hydration().failed, vec!["a1".to_string()]);
        // layer kept, URL intact, ready to save without data loss
        assert_eq!(session.editor.design.animations.len(), 1);
    }

    #[test]
    fn test_edit_and_save_round_trip() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store, "t1");
        let identity = StaticIdentity::admin();
        let mut session =
            block_on(AdminEditSession::open(&identity, &store, &assets, "t1")).unwrap();

        session.editor.update_field(
            "f1",
            &FieldPatch {
                text: Some("See you there".to_string()),
                ..FieldPatch::default()
            },
        );
        block_on(session.save()).unwrap();

        let doc = block_on(store.load("t1")).unwrap();
        assert_eq!(
            doc["designJSON"]["layers"]["fields"][0]["text"],
            json!("See you there")
        );
        // animation survived the save with its source, not its payload
        let anim = &doc["designJSON"]["layers"]["animations"][0];
        assert_eq!(anim["lottieSrc"], json!("memory://templates/x/lottie/main.json"));
        assert!(anim.get("lottieData").is_none());
    }

    #[test]
    fn test_attach_animation_uploads_and_replaces() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store, "t1");
        let identity = StaticIdentity::admin();
        let mut session =
            block_on(AdminEditSession::open(&identity, &store, &assets, "t1")).unwrap();

        let layer_id =
            block_on(session.attach_animation(br#"{"v":"5.7.4"}"#.to_vec())).unwrap();
        // the seeded animation was replaced, not stacked
        assert_eq!(session.editor.design.animations.len(), 1);
        assert_eq!(session.editor.design.animations[0].id(), layer_id);
        let url = block_on(assets.download("memory://templates/t1/lottie/main.json"));
        assert!(url.is_ok());

        // garbage payloads never reach storage
        let uploads_before = assets.upload_count();
        assert!(block_on(session.attach_animation(b"not json".to_vec())).is_err());
        assert_eq!(assets.upload_count(), uploads_before);
    }

    #[test]
    fn test_save_with_preview_merges_thumbnail_url() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store, "t1");
        let identity = StaticIdentity::admin();
        let mut session =
            block_on(AdminEditSession::open(&identity, &store, &assets, "t1")).unwrap();

        let compositor = Compositor::new(inkvite_core::EditorMode::Admin);
        let outcome = block_on(session.save_with_preview(&compositor)).unwrap();
        let url = outcome.thumbnail_url.unwrap();
        assert_eq!(url, "memory://previews/t1/thumb.png");
        assert!(outcome.preview_error.is_none());

        let doc = block_on(store.load("t1")).unwrap();
        assert_eq!(doc["thumbnailUrl"], json!(url));
        // the saved design was not clobbered by the merge
        assert!(doc.get("designJSON").is_some());

        // the uploaded bytes are a decodable PNG at pixel ratio 2
        let png = block_on(assets.download(&url)).unwrap();
        let img = inkvite_render::raster::decode_image(&png).unwrap();
        assert_eq!(img.dimensions(), (840, 1176));
    }

    #[test]
    fn test_preview_failure_does_not_fail_the_save() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store, "t1");
        let identity = StaticIdentity::admin();
        let mut session =
            block_on(AdminEditSession::open(&identity, &store, &assets, "t1")).unwrap();

        session.editor.update_field(
            "f1",
            &FieldPatch {
                text: Some("Changed".to_string()),
                ..FieldPatch::default()
            },
        );
        assets.fail_uploads_matching("previews/");

        let compositor = Compositor::new(inkvite_core::EditorMode::Admin);
        let outcome = block_on(session.save_with_preview(&compositor)).unwrap();
        assert!(outcome.thumbnail_url.is_none());
        assert!(outcome.preview_error.is_some());

        // the save itself landed and kept no thumbnail
        let doc = block_on(store.load("t1")).unwrap();
        assert_eq!(
            doc["designJSON"]["layers"]["fields"][0]["text"],
            json!("Changed")
        );
        assert!(doc.get("thumbnailUrl").is_none());
    }

    #[test]
    fn test_non_admin_cannot_open() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store, "t1");
        let identity = StaticIdentity::user("u1");
        let result = block_on(AdminEditSession::open(&identity, &store, &assets, "t1"));
        assert!(matches!(result, Err(SessionError::Auth(_))));
    }
}
