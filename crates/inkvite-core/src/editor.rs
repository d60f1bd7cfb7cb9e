//! Selection and mutation controller.
//!
//! All document edits flow through [`EditorState`]: it owns the working
//! copy of the design, tracks the single active selection, and enforces
//! the per-attribute field locks. Mutations rebuild the affected layer
//! collection instead of editing in place, so a caller holding an old
//! snapshot never observes a partial edit.

use crate::document::{default_first_field, default_next_field, DesignDocument, TemplateMeta};
use crate::layers::{
    with_field_updated, AnimationLayer, AnimationPatch, Field, FieldPatch, PhotoLayer,
};

/// Who is driving the editor. User mode exposes only the text mutation
/// surface; everything else is admin-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Admin,
    User,
}

/// The single active selection. Selecting one layer kind always clears
/// the others.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Field(String),
    Photo,
    Animation(String),
}

/// Lock categories for field attributes. Each patched attribute belongs
/// to exactly one category; a locked category silently drops its part
/// of the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAttr {
    Text,
    Style,
    Position,
}

impl FieldAttr {
    /// Whether `lock` permits edits to this category.
    pub fn allowed_by(self, lock: &crate::layers::FieldLock) -> bool {
        match self {
            FieldAttr::Text => !lock.text,
            FieldAttr::Style => !lock.style,
            FieldAttr::Position => !lock.position,
        }
    }
}

/// Pending background image, staged locally until the next save uploads
/// it and rewrites the document's background URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBackground {
    pub bytes: Vec<u8>,
    pub extension: String,
}

/// The working editor state for one open template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    pub mode: EditorMode,
    pub meta: TemplateMeta,
    pub design: DesignDocument,
    pub selection: Selection,
    pub min_fields: usize,
    pending_background: Option<PendingBackground>,
}

impl EditorState {
    /// Editor over an existing design.
    pub fn new(mode: EditorMode, meta: TemplateMeta, design: DesignDocument) -> Self {
        Self {
            mode,
            meta,
            design,
            selection: Selection::None,
            min_fields: 1,
            pending_background: None,
        }
    }

    /// Editor over a fresh design seeded with the default title field.
    pub fn new_template(mode: EditorMode) -> Self {
        let design = DesignDocument {
            fields: vec![default_first_field()],
            photo: Some(PhotoLayer::default()),
            ..DesignDocument::default()
        };
        let mut state = Self::new(mode, TemplateMeta::default(), design);
        state.selection = Selection::Field("f1".to_string());
        state
    }

    pub fn selected_field(&self) -> Option<&Field> {
        match &self.selection {
            Selection::Field(id) => self.design.fields.iter().find(|f| &f.id == id),
            _ => None,
        }
    }

    /// Select a field by id. No-op (and `false`) when the id does not
    /// exist.
    pub fn select_field(&mut self, id: &str) -> bool {
        if self.design.fields.iter().any(|f| f.id == id) {
            self.selection = Selection::Field(id.to_string());
            true
        } else {
            false
        }
    }

    /// Select an animation layer by id, clearing any field selection.
    pub fn select_animation(&mut self, id: &str) -> bool {
        if self.design.animations.iter().any(|a| a.id() == id) {
            self.selection = Selection::Animation(id.to_string());
            true
        } else {
            false
        }
    }

    /// Select the photo layer. Only meaningful while the layer is
    /// enabled.
    pub fn select_photo(&mut self) -> bool {
        if self.design.photo.as_ref().is_some_and(|p| p.has_photo) {
            self.selection = Selection::Photo;
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::None;
    }

    /// Patch a field's attributes. Locked categories are dropped from
    /// the patch without error; in user mode only the text category is
    /// applied at all.
    pub fn update_field(&mut self, id: &str, patch: &FieldPatch) {
        let Some(field) = self.design.fields.iter().find(|f| f.id == id) else {
            return;
        };
        let mut allowed = FieldPatch::default();
        if FieldAttr::Text.allowed_by(&field.lock) {
            allowed.text = patch.text.clone();
        }
        if self.mode == EditorMode::Admin {
            if FieldAttr::Style.allowed_by(&field.lock) {
                allowed.label = patch.label.clone();
                allowed.font = patch.font.clone();
                allowed.color = patch.color;
                allowed.align = patch.align;
                allowed.weight = patch.weight;
                allowed.style = patch.style;
                allowed.size = patch.size;
                allowed.letter_spacing = patch.letter_spacing;
                allowed.line_height = patch.line_height;
            }
            if FieldAttr::Position.allowed_by(&field.lock) {
                allowed.y = patch.y;
            }
            // Locks themselves are an admin control, never lockable.
            allowed.lock = patch.lock;
        }
        self.design.fields = with_field_updated(&self.design.fields, id, &allowed);
    }

    /// Vertical drag of a field. The x coordinate is derived from the
    /// content box and never user-draggable.
    pub fn drag_field(&mut self, id: &str, y: f64) {
        self.update_field(
            id,
            &FieldPatch {
                y: Some(y),
                ..FieldPatch::default()
            },
        );
    }

    /// Delete a field. Refuses (returning `false`) when the design
    /// would drop below `min_fields`. Selection moves to the first
    /// remaining field when the deleted one was selected.
    pub fn delete_field(&mut self, id: &str) -> bool {
        if self.mode != EditorMode::Admin {
            return false;
        }
        if self.design.fields.len() <= self.min_fields {
            return false;
        }
        let before = self.design.fields.len();
        self.design.fields.retain(|f| f.id != id);
        if self.design.fields.len() == before {
            return false;
        }
        if self.selection == Selection::Field(id.to_string()) {
            self.selection = match self.design.fields.first() {
                Some(f) => Selection::Field(f.id.clone()),
                None => Selection::None,
            };
        }
        true
    }

    /// Add a field with palette-cycled defaults, select it, and return
    /// its id. Ids stay unique even after deletions left gaps.
    pub fn add_field(&mut self) -> Option<String> {
        if self.mode != EditorMode::Admin {
            return None;
        }
        let count = self.design.fields.len();
        let mut n = count + 1;
        while self.design.fields.iter().any(|f| f.id == format!("f{}", n)) {
            n += 1;
        }
        let id = format!("f{}", n);
        self.design.fields.push(default_next_field(count, id.clone()));
        self.selection = Selection::Field(id.clone());
        Some(id)
    }

    /// Reset letter spacing and line height on the selected field.
    pub fn reset_spacing(&mut self) {
        let Selection::Field(id) = self.selection.clone() else {
            return;
        };
        self.update_field(
            &id,
            &FieldPatch {
                letter_spacing: Some(0.0),
                line_height: Some(1.0),
                ..FieldPatch::default()
            },
        );
    }

    /// Apply a transform patch to an animation layer.
    pub fn update_animation(&mut self, id: &str, patch: &AnimationPatch) {
        if self.mode != EditorMode::Admin {
            return;
        }
        self.design.animations = self
            .design
            .animations
            .iter()
            .map(|a| if a.id() == id { a.patched(patch) } else { a.clone() })
            .collect();
    }

    /// Remove one animation layer by id, or all of them when `id` is
    /// `None`. Clears the selection when it pointed at a removed layer.
    pub fn remove_animation(&mut self, id: Option<&str>) {
        if self.mode != EditorMode::Admin {
            return;
        }
        match id {
            Some(id) => self.design.animations.retain(|a| a.id() != id),
            None => self.design.animations.clear(),
        }
        if let Selection::Animation(selected) = &self.selection {
            if !self.design.animations.iter().any(|a| a.id() == *selected) {
                self.selection = Selection::None;
            }
        }
    }

    pub fn add_animation(&mut self, layer: AnimationLayer) {
        if self.mode != EditorMode::Admin {
            return;
        }
        self.design.animations.push(layer);
    }

    /// Replace the photo layer wholesale. Selection drops back to none
    /// when the replacement disables the layer.
    pub fn update_photo_layer(&mut self, photo: PhotoLayer) {
        if self.mode != EditorMode::Admin {
            return;
        }
        if !photo.has_photo && self.selection == Selection::Photo {
            self.selection = Selection::None;
        }
        self.design.photo = Some(photo);
    }

    /// Stage a background image for upload on the next save.
    pub fn set_background_pending(&mut self, bytes: Vec<u8>, extension: &str) {
        if self.mode != EditorMode::Admin {
            return;
        }
        self.pending_background = Some(PendingBackground {
            bytes,
            extension: extension.to_string(),
        });
    }

    /// Point the design at an already-uploaded background.
    pub fn set_background_url(&mut self, url: String) {
        self.design.background_url = Some(url);
        self.pending_background = None;
    }

    pub fn clear_background(&mut self) {
        if self.mode != EditorMode::Admin {
            return;
        }
        self.design.background_url = None;
        self.pending_background = None;
    }

    /// The staged background, if any. The save path uploads it and
    /// clears it through [`EditorState::set_background_url`], so a
    /// failed upload leaves it staged for retry.
    pub fn pending_background(&self) -> Option<&PendingBackground> {
        self.pending_background.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{FONTS, PASTEL_COLORS};
    use crate::layers::{FieldLock, LottieLayer, Rgba};

    fn lottie(id: &str) -> AnimationLayer {
        AnimationLayer::Lottie(LottieLayer {
            id: id.to_string(),
            lottie_src: None,
            autoplay: None,
            loop_enabled: None,
            speed: None,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            rotation: None,
            z_index: None,
            lottie_data: None,
        })
    }

    fn admin_state() -> EditorState {
        EditorState::new_template(EditorMode::Admin)
    }

    #[test]
    fn test_new_template_selects_first_field() {
        let state = admin_state();
        assert_eq!(state.design.fields.len(), 1);
        assert_eq!(state.selection, Selection::Field("f1".to_string()));
    }

    #[test]
    fn test_locked_text_rejects_update_silently() {
        let mut state = admin_state();
        state.update_field(
            "f1",
            &FieldPatch {
                lock: Some(FieldLock {
                    text: true,
                    ..FieldLock::default()
                }),
                ..FieldPatch::default()
            },
        );
        state.update_field(
            "f1",
            &FieldPatch {
                text: Some("blocked".to_string()),
                size: Some(60.0),
                ..FieldPatch::default()
            },
        );
        let field = &state.design.fields[0];
        assert_eq!(field.text, "Your Text");
        assert_eq!(field.size, 60.0);
    }

    #[test]
    fn test_locked_position_rejects_drag() {
        let mut state = admin_state();
        state.update_field(
            "f1",
            &FieldPatch {
                lock: Some(FieldLock {
                    position: true,
                    ..FieldLock::default()
                }),
                ..FieldPatch::default()
            },
        );
        state.drag_field("f1", 400.0);
        assert_eq!(state.design.fields[0].y, 110.0);
    }

    #[test]
    fn test_user_mode_edits_text_only() {
        let mut state = admin_state();
        state.mode = EditorMode::User;
        state.update_field(
            "f1",
            &FieldPatch {
                text: Some("Our Wedding".to_string()),
                size: Some(99.0),
                ..FieldPatch::default()
            },
        );
        assert_eq!(state.design.fields[0].text, "Our Wedding");
        assert_eq!(state.design.fields[0].size, 44.0);
        assert!(state.add_field().is_none());
        assert!(!state.delete_field("f1"));
    }

    #[test]
    fn test_delete_keeps_minimum_and_reselects() {
        let mut state = admin_state();
        let id2 = state.add_field().unwrap();
        assert!(state.delete_field(&id2));
        assert_eq!(state.selection, Selection::Field("f1".to_string()));
        // last field can never go
        assert!(!state.delete_field("f1"));
        assert_eq!(state.design.fields.len(), 1);
    }

    #[test]
    fn test_add_field_cycles_palettes_and_avoids_id_collision() {
        let mut state = admin_state();
        let id2 = state.add_field().unwrap();
        assert_eq!(id2, "f2");
        let field = state.design.fields.last().unwrap();
        assert_eq!(field.font, FONTS[1 % FONTS.len()]);
        assert_eq!(field.color, Rgba::from_hex(PASTEL_COLORS[1 % PASTEL_COLORS.len()]));
        assert_eq!(field.y, 220.0 + 38.0);

        // delete f1 and add again: count-based id would collide with f2
        assert!(state.delete_field("f1"));
        let id3 = state.add_field().unwrap();
        assert_ne!(id3, "f2");
        let ids: Vec<&str> = state.design.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.iter().collect::<std::collections::HashSet<_>>().len(), 2);
    }

    #[test]
    fn test_reset_spacing_touches_selection_only() {
        let mut state = admin_state();
        let id2 = state.add_field().unwrap();
        state.update_field(
            "f1",
            &FieldPatch {
                letter_spacing: Some(3.0),
                line_height: Some(2.0),
                ..FieldPatch::default()
            },
        );
        state.update_field(
            &id2,
            &FieldPatch {
                letter_spacing: Some(5.0),
                ..FieldPatch::default()
            },
        );
        state.select_field("f1");
        state.reset_spacing();
        assert_eq!(state.design.fields[0].letter_spacing, Some(0.0));
        assert_eq!(state.design.fields[0].line_height, Some(1.0));
        assert_eq!(state.design.fields[1].letter_spacing, Some(5.0));
    }

    #[test]
    fn test_selection_is_mutually_exclusive() {
        let mut state = admin_state();
        state.add_animation(lottie("a1"));
        let mut photo = PhotoLayer::default();
        photo.has_photo = true;
        state.update_photo_layer(photo);

        assert!(state.select_animation("a1"));
        assert_eq!(state.selection, Selection::Animation("a1".to_string()));
        assert!(state.select_photo());
        assert_eq!(state.selection, Selection::Photo);
        assert!(state.select_field("f1"));
        assert_eq!(state.selection, Selection::Field("f1".to_string()));
        assert!(!state.select_animation("missing"));
        assert_eq!(state.selection, Selection::Field("f1".to_string()));
    }

    #[test]
    fn test_remove_animation_none_removes_all() {
        let mut state = admin_state();
        state.add_animation(lottie("a1"));
        state.add_animation(lottie("a2"));
        state.select_animation("a1");
        state.remove_animation(None);
        assert!(state.design.animations.is_empty());
        assert_eq!(state.selection, Selection::None);
    }

    #[test]
    fn test_remove_animation_by_id() {
        let mut state = admin_state();
        state.add_animation(lottie("a1"));
        state.add_animation(lottie("a2"));
        state.remove_animation(Some("a1"));
        assert_eq!(state.design.animations.len(), 1);
        assert_eq!(state.design.animations[0].id(), "a2");
    }

    #[test]
    fn test_disabling_photo_clears_its_selection() {
        let mut state = admin_state();
        let mut photo = PhotoLayer::default();
        photo.has_photo = true;
        state.update_photo_layer(photo.clone());
        state.select_photo();
        photo.has_photo = false;
        state.update_photo_layer(photo);
        assert_eq!(state.selection, Selection::None);
    }

    #[test]
    fn test_background_staging() {
        let mut state = admin_state();
        state.set_background_pending(vec![1, 2, 3], "png");
        let pending = state.pending_background().unwrap();
        assert_eq!(pending.extension, "png");
        state.set_background_url("memory://bg.png".to_string());
        assert!(state.pending_background().is_none());
        assert_eq!(state.design.background_url.as_deref(), Some("memory://bg.png"));
        state.clear_background();
        assert_eq!(state.design.background_url, None);
    }
}
