//! End-user invitation editing flow.
//!
//! Opens a template read-mostly: the user personalizes field text and
//! saves the result as their own invitation document, never touching
//! the template.

use crate::SessionResult;
use inkvite_core::{
    hydrate_animations, normalize, AssetStore, Claims, EditorMode, EditorState, FieldPatch,
    HydrationReport, IdentityProvider, TemplateStore,
};
use serde_json::json;

pub struct UserEditSession<'a> {
    store: &'a dyn TemplateStore,
    claims: Claims,
    pub editor: EditorState,
    hydration: HydrationReport,
}

impl<'a> UserEditSession<'a> {
    /// Open a template for personalization. Any signed-in state is
    /// accepted; the user id is only required at save time.
    pub async fn open(
        identity: &dyn IdentityProvider,
        store: &'a dyn TemplateStore,
        assets: &dyn AssetStore,
        template_id: &str,
    ) -> SessionResult<UserEditSession<'a>> {
        let claims = identity.claims().await?;
        let raw = store.load(template_id).await?;
        let normalized = normalize(template_id, &raw);
        let mut editor = EditorState::new(EditorMode::User, normalized.meta, normalized.design);
        let hydration = hydrate_animations(&mut editor.design, assets).await;
        Ok(Self {
            store,
            claims,
            editor,
            hydration,
        })
    }

    pub fn hydration(&self) -> &HydrationReport {
        &self.hydration
    }

    /// The only mutation a user session exposes.
    pub fn update_text(&mut self, field_id: &str, text: &str) {
        self.editor.update_field(
            field_id,
            &FieldPatch {
                text: Some(text.to_string()),
                ..FieldPatch::default()
            },
        );
    }

    /// Save the personalized result as the user's invitation: a flat
    /// document of the fields over the template background, owned by
    /// the signed-in user. Animation runtime payloads are not copied.
    pub async fn save_invitation(&self, invitation_id: &str) -> SessionResult<()> {
        let user_id = self.claims.require_user()?;
        let doc = json!({
            "title": self.editor.meta.title,
            "templateId": self.editor.meta.id,
            "backgroundUrl": self.editor.design.background_url,
            "fields": self.editor.design.fields,
            "userId": user_id,
        });
        self.store.save(invitation_id, doc, false).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;
    use inkvite_core::{block_on, MemoryAssetStore, MemoryTemplateStore, StaticIdentity};

    fn seed_template(store: &MemoryTemplateStore) {
        let doc = json!({
            "title": "Seeded",
            "backgroundUrl": "memory://bg.png",
            "fields": [{
                "id": "f1", "label": "Title", "text": "Hello",
                "font": "Montserrat", "color": "#48435c",
                "align": "center", "weight": "normal", "style": "normal",
                "size": 44.0, "x": 50.5, "y": 110.0,
                "lock": { "style": true }
            }],
            "animationLayers": [{
                "type": "lottie", "id": "a1",
                "lottieUrl": "memory://anim.json",
                "x": 0.0, "y": 0.0, "width": 50.0, "height": 50.0
            }]
        });
        block_on(store.save("tmpl01", doc, false)).unwrap();
    }

    #[test]
    fn test_user_edits_text_and_saves_flat_invitation() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store);
        let identity = StaticIdentity::user("u1");
        let mut session =
            block_on(UserEditSession::open(&identity, &store, &assets, "tmpl01")).unwrap();

        session.update_text("f1", "Nina turns 5!");
        block_on(session.save_invitation("inv1")).unwrap();

        let doc = block_on(store.load("inv1")).unwrap();
        assert_eq!(doc["userId"], json!("u1"));
        assert_eq!(doc["templateId"], json!("tmpl01"));
        assert_eq!(doc["fields"][0]["text"], json!("Nina turns 5!"));
        assert_eq!(doc["backgroundUrl"], json!("memory://bg.png"));
        // invitations carry no animation layers
        assert!(doc.get("animationLayers").is_none());
    }

    #[test]
    fn test_style_stays_locked_for_users() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store);
        let identity = StaticIdentity::user("u1");
        let mut session =
            block_on(UserEditSession::open(&identity, &store, &assets, "tmpl01")).unwrap();

        session.editor.update_field(
            "f1",
            &FieldPatch {
                size: Some(99.0),
                ..FieldPatch::default()
            },
        );
        assert_eq!(session.editor.design.fields[0].size, 44.0);
    }

    #[test]
    fn test_anonymous_save_is_rejected() {
        let store = MemoryTemplateStore::new();
        let assets = MemoryAssetStore::new();
        seed_template(&store);
        let identity = StaticIdentity::anonymous();
        let session =
            block_on(UserEditSession::open(&identity, &store, &assets, "tmpl01")).unwrap();
        let result = block_on(session.save_invitation("inv1"));
        assert!(matches!(result, Err(SessionError::Auth(_))));
    }
}
