//! Design document and canvas constants.

use crate::layers::{Align, AnimationLayer, Field, FieldLock, FontStyle, PhotoLayer, Rgba, Weight};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Logical canvas descriptor. All layer coordinates live in this space;
/// rendering scales uniformly to the display without distorting the
/// aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub version: u32,
}

/// Base canvas for the vertical 5x7 format, in preview units.
pub const BASE_CANVAS: Canvas = Canvas {
    width: 420,
    height: 588,
    version: 1,
};

pub const CANVAS_W: f64 = BASE_CANVAS.width as f64;
pub const CANVAS_H: f64 = BASE_CANVAS.height as f64;

/// Content box for text: ~76% of the canvas width, centred.
pub const BOX_WIDTH: f64 = 319.0;
pub const BOX_PAD: f64 = 8.0;

/// Full-size export reference (1500x2100) and the preview scale that
/// maps it onto the base canvas.
pub const BASE_CANVAS_PX: (u32, u32) = (1500, 2100);
pub const PREVIEW_SCALE: f64 = CANVAS_W / BASE_CANVAS_PX.0 as f64;

/// Default fill palette, cycled by insertion index for new fields.
pub const PASTEL_COLORS: [&str; 3] = ["#48435c", "#333333", "#6c6c81"];

/// Default font palette, cycled by insertion index for new fields.
pub const FONTS: [&str; 6] = [
    "Affection",
    "Willowshine",
    "Montserrat",
    "Caveat",
    "Playfair Display",
    "Cormorant Garamond",
];

/// Left edge of the centred text content box.
pub fn content_box_x() -> f64 {
    (CANVAS_W - BOX_WIDTH) / 2.0
}

impl Canvas {
    /// Full canvas rectangle in logical units.
    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }
}

/// Content box occupied by a field: full box width at the field's
/// position, tall enough for its rendered lines.
pub fn field_box(field: &Field) -> Rect {
    let height = field.line_count() as f64 * field.size * field.line_height() + BOX_PAD;
    Rect::new(field.x, field.y, field.x + BOX_WIDTH, field.y + height)
}

/// Build the default first field for a new template.
pub fn default_first_field() -> Field {
    Field {
        id: "f1".to_string(),
        label: "Title".to_string(),
        text: "Your Text".to_string(),
        font: FONTS[0].to_string(),
        color: Rgba::from_hex(PASTEL_COLORS[0]),
        align: Align::Center,
        weight: Weight::Normal,
        style: FontStyle::Normal,
        size: 44.0,
        x: content_box_x(),
        y: 110.0,
        letter_spacing: Some(0.0),
        line_height: Some(1.0),
        lock: FieldLock::default(),
    }
}

/// Build an additional field; `existing` is the current field count and
/// drives the palette cycling and the stacked default position.
pub fn default_next_field(existing: usize, id: String) -> Field {
    Field {
        id,
        label: "New Field".to_string(),
        text: String::new(),
        font: FONTS[existing % FONTS.len()].to_string(),
        color: Rgba::from_hex(PASTEL_COLORS[existing % PASTEL_COLORS.len()]),
        align: Align::Center,
        weight: Weight::Normal,
        style: FontStyle::Normal,
        size: 28.0,
        x: content_box_x(),
        y: 220.0 + existing as f64 * 38.0,
        letter_spacing: Some(0.0),
        line_height: Some(1.0),
        lock: FieldLock::default(),
    }
}

/// The unit of persistence: canvas descriptor, background reference,
/// and the ordered layer collections. Owned exclusively by the active
/// session; the compositor and mutation controller work on transient
/// views synchronized back at save time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DesignDocument {
    pub canvas: Canvas,
    pub background_url: Option<String>,
    pub fields: Vec<Field>,
    pub animations: Vec<AnimationLayer>,
    pub photo: Option<PhotoLayer>,
}

impl Default for Canvas {
    fn default() -> Self {
        BASE_CANVAS
    }
}

/// Template metadata, merged independently of the design payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateMeta {
    pub id: String,
    pub title: String,
    pub category_id: String,
    pub subcategory_id: String,
    pub tags: Vec<String>,
}

/// A category with its subcategories, as listed in the admin UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub title: String,
}

impl Category {
    /// Find the category owning a subcategory id.
    pub fn resolve<'a>(
        categories: &'a [Category],
        subcategory_id: &str,
    ) -> Option<(&'a Category, &'a Subcategory)> {
        categories.iter().find_map(|cat| {
            cat.subcategories
                .iter()
                .find(|s| s.id == subcategory_id)
                .map(|s| (cat, s))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_box_is_centred() {
        assert_eq!(content_box_x(), (420.0 - 319.0) / 2.0);
    }

    #[test]
    fn test_first_field_defaults() {
        let f = default_first_field();
        assert_eq!(f.id, "f1");
        assert_eq!(f.size, 44.0);
        assert_eq!(f.y, 110.0);
        assert_eq!(f.font, "Affection");
    }

    #[test]
    fn test_next_field_cycles_palettes() {
        let f = default_next_field(7, "f8".to_string());
        assert_eq!(f.font, FONTS[7 % FONTS.len()]);
        assert_eq!(f.color, Rgba::from_hex(PASTEL_COLORS[7 % PASTEL_COLORS.len()]));
        assert_eq!(f.y, 220.0 + 7.0 * 38.0);
        assert_eq!(f.size, 28.0);
    }

    #[test]
    fn test_field_box_grows_with_lines() {
        let mut f = default_first_field();
        let one = field_box(&f);
        assert_eq!(one.height(), 44.0 + BOX_PAD);
        assert_eq!(one.width(), BOX_WIDTH);
        f.text = "a\nb".to_string();
        f.line_height = Some(1.5);
        assert_eq!(field_box(&f).height(), 2.0 * 44.0 * 1.5 + BOX_PAD);
    }

    #[test]
    fn test_category_resolution() {
        let categories = vec![Category {
            id: "c1".to_string(),
            title: "Birthday".to_string(),
            subcategories: vec![Subcategory {
                id: "s1".to_string(),
                title: "Kids".to_string(),
            }],
        }];
        let (cat, sub) = Category::resolve(&categories, "s1").unwrap();
        assert_eq!(cat.id, "c1");
        assert_eq!(sub.title, "Kids");
        assert!(Category::resolve(&categories, "nope").is_none());
    }
}
