//! Text field layer.

use super::Rgba;
use serde::{Deserialize, Serialize};

/// Horizontal text alignment within the content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    #[default]
    Normal,
    Bold,
}

/// Font slant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Per-attribute edit locks. A locked attribute silently rejects
/// updates coming through the mutation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldLock {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub text: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub style: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub position: bool,
}

impl FieldLock {
    pub fn is_empty(&self) -> bool {
        !(self.text || self.style || self.position)
    }
}

/// A text layer. `id` is immutable once created; the order of fields in
/// a design defines z-order among text layers (later = on top).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub label: String,
    pub text: String,
    pub font: String,
    pub color: Rgba,
    pub align: Align,
    pub weight: Weight,
    pub style: FontStyle,
    pub size: f64,
    /// Computed from the centred content box; kept in the document for
    /// wire compatibility but never user-draggable.
    pub x: f64,
    /// Free-drag axis.
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "FieldLock::is_empty")]
    pub lock: FieldLock,
}

impl Field {
    /// Effective letter spacing (defaults to 0).
    pub fn letter_spacing(&self) -> f64 {
        self.letter_spacing.unwrap_or(0.0)
    }

    /// Effective line height multiplier (defaults to 1).
    pub fn line_height(&self) -> f64 {
        self.line_height.unwrap_or(1.0)
    }

    /// Number of rendered lines (an empty field still occupies one line).
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count().max(1)
    }

    /// Return a copy with the patch shallow-merged over this field.
    /// `id` is never patched.
    pub fn merged(&self, patch: &FieldPatch) -> Field {
        let mut next = self.clone();
        if let Some(v) = &patch.label {
            next.label = v.clone();
        }
        if let Some(v) = &patch.text {
            next.text = v.clone();
        }
        if let Some(v) = &patch.font {
            next.font = v.clone();
        }
        if let Some(v) = patch.color {
            next.color = v;
        }
        if let Some(v) = patch.align {
            next.align = v;
        }
        if let Some(v) = patch.weight {
            next.weight = v;
        }
        if let Some(v) = patch.style {
            next.style = v;
        }
        if let Some(v) = patch.size {
            next.size = v;
        }
        if let Some(v) = patch.y {
            next.y = v;
        }
        if let Some(v) = patch.letter_spacing {
            next.letter_spacing = Some(v);
        }
        if let Some(v) = patch.line_height {
            next.line_height = Some(v);
        }
        if let Some(v) = patch.lock {
            next.lock = v;
        }
        next
    }
}

/// Shallow patch for a [`Field`]. Absent members leave the field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub label: Option<String>,
    pub text: Option<String>,
    pub font: Option<String>,
    pub color: Option<Rgba>,
    pub align: Option<Align>,
    pub weight: Option<Weight>,
    pub style: Option<FontStyle>,
    pub size: Option<f64>,
    pub y: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
    pub lock: Option<FieldLock>,
}

/// The single mutation primitive: return a new field collection with
/// the entry matching `id` replaced by a shallow merge of `patch`.
/// Untouched entries are cloned as-is; the input slice is never
/// modified.
pub fn with_field_updated(fields: &[Field], id: &str, patch: &FieldPatch) -> Vec<Field> {
    fields
        .iter()
        .map(|f| if f.id == id { f.merged(patch) } else { f.clone() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field(id: &str) -> Field {
        Field {
            id: id.to_string(),
            label: "Title".to_string(),
            text: "Hi".to_string(),
            font: "Montserrat".to_string(),
            color: Rgba::from_hex("#48435c"),
            align: Align::Center,
            weight: Weight::Normal,
            style: FontStyle::Normal,
            size: 44.0,
            x: 50.5,
            y: 110.0,
            letter_spacing: Some(0.0),
            line_height: Some(1.0),
            lock: FieldLock::default(),
        }
    }

    #[test]
    fn test_merge_patches_only_given_attributes() {
        let field = sample_field("f1");
        let merged = field.merged(&FieldPatch {
            text: Some("Hello".to_string()),
            ..Default::default()
        });
        assert_eq!(merged.text, "Hello");
        assert_eq!(merged.y, field.y);
        assert_eq!(merged.font, field.font);
    }

    #[test]
    fn test_update_does_not_alias_input() {
        let fields = vec![sample_field("f1"), sample_field("f2")];
        let before = fields.clone();
        let updated = with_field_updated(
            &fields,
            "f2",
            &FieldPatch {
                y: Some(300.0),
                ..Default::default()
            },
        );
        assert_eq!(fields, before);
        assert_eq!(updated[1].y, 300.0);
        assert_eq!(updated[0], fields[0]);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let fields = vec![sample_field("f1")];
        let updated = with_field_updated(
            &fields,
            "missing",
            &FieldPatch {
                text: Some("x".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(updated, fields);
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut field = sample_field("f1");
        field.letter_spacing = Some(1.5);
        field.lock.text = true;
        let json = serde_json::to_value(&field).unwrap();
        assert!(json.get("letterSpacing").is_some());
        assert!(json.get("lineHeight").is_some());
        assert_eq!(json["lock"]["text"], serde_json::json!(true));
        assert!(json["lock"].get("style").is_none());
    }

    #[test]
    fn test_empty_lock_is_omitted() {
        let field = sample_field("f1");
        let json = serde_json::to_value(&field).unwrap();
        assert!(json.get("lock").is_none());
    }

    #[test]
    fn test_line_count() {
        let mut field = sample_field("f1");
        assert_eq!(field.line_count(), 1);
        field.text = "a\nb\nc".to_string();
        assert_eq!(field.line_count(), 3);
        field.text = String::new();
        assert_eq!(field.line_count(), 1);
    }
}
