//! Photo mask geometry.
//!
//! Every mask is derived from the photo layer's bounding box alone, so
//! the clip path and the selection outline are always the same curve.

use inkvite_core::PhotoShape;
use kurbo::{Arc, BezPath, Circle, Point, Rect, RoundedRect, Shape, Vec2};

/// Corner radius cap for the rounded-rect mask, in logical units.
const CORNER_RADIUS: f64 = 12.0;

/// Fraction of the box height the arch crown may occupy.
const ARCH_CROWN_FRACTION: f64 = 0.6;

/// Resolved mask geometry for a photo layer bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskGeometry {
    /// Largest circle inscribed in the box, centred.
    Circle { center: Point, radius: f64 },
    /// Soft-cornered rectangle.
    RoundedRect { rect: Rect, radius: f64 },
    /// Doorway silhouette: elliptical crown over straight sides and a
    /// flat bottom. `arc_height` is the crown's vertical extent.
    Arch { rect: Rect, arc_height: f64 },
}

/// Compute the mask geometry for a shape within a bounding box.
pub fn mask_geometry(shape: PhotoShape, rect: Rect) -> MaskGeometry {
    match shape {
        PhotoShape::Circle => MaskGeometry::Circle {
            center: rect.center(),
            radius: rect.width().min(rect.height()) / 2.0,
        },
        PhotoShape::Rect => MaskGeometry::RoundedRect {
            rect,
            radius: CORNER_RADIUS.min(rect.width() / 2.0).min(rect.height() / 2.0),
        },
        PhotoShape::Arch => MaskGeometry::Arch {
            rect,
            arc_height: (rect.width() / 2.0).min(rect.height() * ARCH_CROWN_FRACTION),
        },
    }
}

impl MaskGeometry {
    /// The closed clip path. Also used verbatim for the selection
    /// outline stroke.
    pub fn clip_path(&self) -> BezPath {
        const TOLERANCE: f64 = 0.1;
        match *self {
            MaskGeometry::Circle { center, radius } => {
                Circle::new(center, radius).to_path(TOLERANCE)
            }
            MaskGeometry::RoundedRect { rect, radius } => {
                RoundedRect::from_rect(rect, radius).to_path(TOLERANCE)
            }
            MaskGeometry::Arch { rect, arc_height } => {
                let shoulder_y = rect.y0 + arc_height;
                let crown = Arc {
                    center: Point::new(rect.center().x, shoulder_y),
                    radii: Vec2::new(rect.width() / 2.0, arc_height),
                    start_angle: std::f64::consts::PI,
                    sweep_angle: std::f64::consts::PI,
                    x_rotation: 0.0,
                };
                let mut path = BezPath::new();
                path.move_to(Point::new(rect.x0, rect.y1));
                path.line_to(Point::new(rect.x0, shoulder_y));
                for el in crown.append_iter(TOLERANCE) {
                    path.push(el);
                }
                path.line_to(Point::new(rect.x1, rect.y1));
                path.close_path();
                path
            }
        }
    }

    /// Bounding box of the mask.
    pub fn bounds(&self) -> Rect {
        match *self {
            MaskGeometry::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            ),
            MaskGeometry::RoundedRect { rect, .. } | MaskGeometry::Arch { rect, .. } => rect,
        }
    }
}
