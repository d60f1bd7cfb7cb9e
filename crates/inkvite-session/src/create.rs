//! Admin template creation flow.

use crate::paths::template_asset_path;
use crate::{SessionError, SessionResult, ValidationError};
use inkvite_core::{
    clean_tags, serialize, AssetStore, Category, EditorMode, EditorState, IdentityProvider,
    TemplateStore, UploadOptions,
};
use uuid::Uuid;

/// Where the creation flow stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatePhase {
    /// Form and design still being filled in.
    Collecting,
    /// A save is in flight.
    Saving,
    /// Saved; the id is now a real template.
    Created { id: String },
}

/// One admin creating one new template.
///
/// Authorization happens at construction: the session does not exist
/// unless the admin claim resolved. Validation is purely local and a
/// failed save attempt performs no store calls at all.
pub struct AdminCreateSession<'a> {
    store: &'a dyn TemplateStore,
    assets: &'a dyn AssetStore,
    categories: Vec<Category>,
    pub editor: EditorState,
    phase: CreatePhase,
}

impl<'a> AdminCreateSession<'a> {
    pub async fn begin(
        identity: &dyn IdentityProvider,
        store: &'a dyn TemplateStore,
        assets: &'a dyn AssetStore,
        categories: Vec<Category>,
    ) -> SessionResult<AdminCreateSession<'a>> {
        let claims = identity.claims().await?;
        claims.require_admin()?;
        Ok(Self {
            store,
            assets,
            categories,
            editor: EditorState::new_template(EditorMode::Admin),
            phase: CreatePhase::Collecting,
        })
    }

    pub fn phase(&self) -> &CreatePhase {
        &self.phase
    }

    /// Check the form locally. Empty means ready to save.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.editor.meta.title.trim().is_empty() {
            errors.push(ValidationError::MissingTitle);
        }
        if Category::resolve(&self.categories, &self.editor.meta.subcategory_id).is_none() {
            errors.push(ValidationError::UnknownSubcategory);
        }
        let has_background =
            self.editor.design.background_url.is_some() || self.editor.pending_background().is_some();
        if !has_background {
            errors.push(ValidationError::MissingBackground);
        }
        errors
    }

    /// Validate, upload the staged background, and write the template
    /// in a single document save. Returns the new template id.
    pub async fn save(&mut self) -> SessionResult<String> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SessionError::Validation(errors));
        }
        self.phase = CreatePhase::Saving;
        let id = Uuid::new_v4().simple().to_string();

        let result = self.write(&id).await;
        match result {
            Ok(()) => {
                self.phase = CreatePhase::Created { id: id.clone() };
                Ok(id)
            }
            Err(err) => {
                // editor state is intact; the admin can retry
                self.editor.meta.id = String::new();
                self.phase = CreatePhase::Collecting;
                Err(err)
            }
        }
    }

    async fn write(&mut self, id: &str) -> SessionResult<()> {
        self.editor.meta.id = id.to_string();
        // the staged background stays staged until the upload lands, so
        // a failed save can be retried without re-picking the file
        if let Some(pending) = self.editor.pending_background().cloned() {
            let path = template_asset_path(id, &pending.extension);
            let url = self
                .assets
                .upload(&path, pending.bytes, UploadOptions::default())
                .await?;
            self.editor.set_background_url(url);
        }
        if let Some((category, _)) =
            Category::resolve(&self.categories, &self.editor.meta.subcategory_id)
        {
            self.editor.meta.category_id = category.id.clone();
        }

        let payload = serialize(&self.editor.meta, &self.editor.design);
        self.store.save(id, payload, false).await?;
        self.store
            .upsert_tags(&clean_tags(&self.editor.meta.tags))
            .await?;
        Ok(())
    }
}
