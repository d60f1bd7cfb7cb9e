//! Font registration and lookup.

use crate::{RenderError, RenderResult};
use ab_glyph::FontArc;
use inkvite_core::{FontStyle, Weight};
use std::collections::HashMap;

type FontKey = (String, Weight, FontStyle);

/// Registry of loaded fonts, keyed by family, weight, and style.
///
/// Lookup falls back from the exact face to the family's regular face.
/// A family with no registered face at all resolves to `None`; callers
/// render nothing for it, matching a hydration placeholder.
#[derive(Default)]
pub struct FontLibrary {
    fonts: HashMap<FontKey, FontArc>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw font bytes (TTF/OTF).
    pub fn register(
        &mut self,
        family: &str,
        weight: Weight,
        style: FontStyle,
        bytes: Vec<u8>,
    ) -> RenderResult<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| RenderError::Font(format!("{}: {}", family, e)))?;
        self.fonts.insert((family.to_string(), weight, style), font);
        Ok(())
    }

    /// Resolve a face, falling back to the family's regular face.
    pub fn resolve(&self, family: &str, weight: Weight, style: FontStyle) -> Option<&FontArc> {
        self.fonts
            .get(&(family.to_string(), weight, style))
            .or_else(|| {
                self.fonts
                    .get(&(family.to_string(), Weight::Normal, FontStyle::Normal))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}
