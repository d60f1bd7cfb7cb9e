//! Design document codec.
//!
//! Bidirectional mapping between the persisted document shapes and the
//! in-memory layer model. Three historical shapes remain readable, in
//! fixed priority order:
//!
//! 1. the current versioned `designJSON` envelope,
//! 2. the transitional nested `design` object, falling back per-item to
//!    legacy top-level scalars,
//! 3. legacy top-level scalars only.
//!
//! Only the versioned envelope is ever written back.

use crate::document::{Canvas, DesignDocument, TemplateMeta, BASE_CANVAS};
use crate::layers::{photo_from_legacy, AnimationLayer, Field, PhotoLayer, PhotoShape};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

/// A loaded template: metadata plus the canonical design state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTemplate {
    pub meta: TemplateMeta,
    pub design: DesignDocument,
}

/// Normalize any persisted document shape into the canonical in-memory
/// form. Never errors on missing optional data; malformed individual
/// layer entries are skipped with a warning so one bad layer cannot
/// poison a whole template.
pub fn normalize(id: &str, raw: &Value) -> NormalizedTemplate {
    let meta = TemplateMeta {
        id: id.to_string(),
        title: str_at(raw, "title").unwrap_or_default(),
        category_id: str_at(raw, "categoryId").unwrap_or_default(),
        subcategory_id: str_at(raw, "subcategoryId").unwrap_or_default(),
        tags: tags_at(raw),
    };

    let design = if let Some(envelope) = raw.get("designJSON").filter(|v| v.is_object()) {
        from_envelope(raw, envelope)
    } else {
        from_transitional_or_legacy(raw)
    };

    NormalizedTemplate { meta, design }
}

/// Read the current versioned envelope; the photo falls back to legacy
/// scalars when the envelope carries none (mixed-era documents exist).
fn from_envelope(raw: &Value, envelope: &Value) -> DesignDocument {
    let canvas = envelope
        .get("canvas")
        .and_then(|v| serde_json::from_value::<Canvas>(v.clone()).ok())
        .unwrap_or(BASE_CANVAS);
    let background_url = envelope
        .get("background")
        .and_then(|b| str_at(b, "url"))
        .filter(|s| !s.is_empty());
    let layers = envelope.get("layers");
    let fields = lenient_vec::<Field>(layers.and_then(|l| l.get("fields")), "field");
    let animations =
        lenient_vec::<AnimationLayer>(layers.and_then(|l| l.get("animations")), "animation");
    let photo = layers
        .and_then(|l| l.get("photo"))
        .and_then(parse_photo)
        .or_else(|| Some(legacy_photo(raw)));

    DesignDocument {
        canvas,
        background_url,
        fields,
        animations,
        photo,
    }
}

/// Read the transitional nested `design` object, falling back to the
/// legacy top-level scalars for anything it is missing.
fn from_transitional_or_legacy(raw: &Value) -> DesignDocument {
    let design = raw.get("design").cloned().unwrap_or(Value::Null);

    let background_url = str_at(&design, "backgroundUrl")
        .filter(|s| !s.is_empty())
        .or_else(|| str_at(raw, "backgroundUrl").filter(|s| !s.is_empty()));

    let fields_raw = design
        .get("fields")
        .filter(|v| v.is_array())
        .or_else(|| raw.get("fields"));
    let animations_raw = design
        .get("animationLayers")
        .filter(|v| v.is_array())
        .or_else(|| raw.get("animationLayers"));

    let photo = design
        .get("photo")
        .and_then(parse_photo)
        .unwrap_or_else(|| legacy_photo(raw));

    DesignDocument {
        canvas: BASE_CANVAS,
        background_url,
        fields: lenient_vec::<Field>(fields_raw, "field"),
        animations: lenient_vec::<AnimationLayer>(animations_raw, "animation"),
        photo: Some(photo),
    }
}

/// Synthesize a photo layer from legacy flat scalars
/// (`hasPhoto`/`photoShape`/`samplePhotoUrl`).
fn legacy_photo(raw: &Value) -> PhotoLayer {
    let has_photo = raw
        .get("hasPhoto")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let shape = raw
        .get("photoShape")
        .and_then(|v| serde_json::from_value::<PhotoShape>(v.clone()).ok());
    let sample = str_at(raw, "samplePhotoUrl");
    photo_from_legacy(has_photo, shape, sample.as_deref())
}

fn parse_photo(value: &Value) -> Option<PhotoLayer> {
    match serde_json::from_value::<PhotoLayer>(value.clone()) {
        Ok(photo) => Some(photo),
        Err(err) => {
            log::warn!("skipping malformed photo layer: {}", err);
            None
        }
    }
}

/// Parse an array of layer entries, skipping malformed members.
fn lenient_vec<T: DeserializeOwned>(value: Option<&Value>, kind: &str) -> Vec<T> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value::<T>(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                log::warn!("skipping malformed {} entry: {}", kind, err);
                None
            }
        })
        .collect()
}

fn str_at(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn tags_at(value: &Value) -> Vec<String> {
    value
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Trim, drop empties, and de-duplicate case-insensitively, keeping the
/// first-seen spelling.
pub fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Serialize the canonical state into the current persisted shape:
/// versioned `designJSON` plus top-level metadata and summary flags.
///
/// The runtime animation payload is stripped, and the photo object is
/// omitted entirely while the layer is disabled.
pub fn serialize(meta: &TemplateMeta, design: &DesignDocument) -> Value {
    let animations: Vec<AnimationLayer> = design
        .animations
        .iter()
        .map(AnimationLayer::without_runtime_data)
        .collect();
    let has_lottie = animations.iter().any(AnimationLayer::is_lottie);
    let has_photo = design.photo.as_ref().is_some_and(|p| p.has_photo);

    let mut layers = Map::new();
    layers.insert("fields".to_string(), to_value(&design.fields));
    layers.insert("animations".to_string(), to_value(&animations));
    if has_photo {
        layers.insert("photo".to_string(), to_value(&design.photo));
    }

    let title = meta.title.trim();
    let title = if title.is_empty() { "Untitled" } else { title };

    json!({
        "id": meta.id,
        "title": title,
        "categoryId": nullable(&meta.category_id),
        "subcategoryId": nullable(&meta.subcategory_id),
        "tags": clean_tags(&meta.tags),
        "backgroundUrl": design.background_url,
        "hasBackground": design.background_url.is_some(),
        "hasLottie": has_lottie,
        "hasPhotos": has_photo,
        "designJSON": {
            "canvas": design.canvas,
            "background": { "url": design.background_url },
            "layers": Value::Object(layers),
        },
    })
}

fn nullable(s: &str) -> Value {
    if s.is_empty() {
        Value::Null
    } else {
        Value::String(s.to_string())
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    // Layer types serialize infallibly (no maps with non-string keys).
    serde_json::to_value(value).unwrap_or(Value::Null)
}
