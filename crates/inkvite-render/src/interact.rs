//! Pointer interaction.
//!
//! The compositor never mutates the document. Pointer handlers hit-test
//! against the current [`EditorState`], track the in-flight gesture,
//! and report [`CanvasEvent`]s for the host to apply back through the
//! mutation controller.

use crate::compositor::Compositor;
use inkvite_core::{
    field_box, AnimationPatch, EditorMode, EditorState, LottieLayer, PhotoLayer, Selection,
};
use kurbo::{Point, Rect, Vec2};

/// Size of a square resize handle, in logical units.
pub const HANDLE_SIZE: f64 = 10.0;

/// Distance of the rotate handle above the frame's top edge.
pub const ROTATE_OFFSET: f64 = 24.0;

/// Frame corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Corner position on a rect.
    pub fn point(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }

    fn signs(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }
}

/// What a grabbed handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Move,
    Resize(Corner),
    Rotate,
}

/// A pointer event in logical canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up,
}

/// Outputs of the interaction layer, to be applied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    FieldSelected(String),
    /// Vertical drag only; x is derived from the content box.
    FieldDragged { id: String, y: f64 },
    PhotoSelected,
    PhotoTransformed {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
    },
    AnimationSelected(String),
    AnimationTransformed { id: String, patch: AnimationPatch },
    SelectionCleared,
}

#[derive(Debug, Clone, PartialEq)]
enum Target {
    Field { id: String, start_y: f64 },
    Photo,
    Animation(String),
}

/// In-flight gesture state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Gesture {
    target: Target,
    handle: HandleKind,
    start: Point,
    /// Frame at pointer-down: (x, y, width, height).
    frame: (f64, f64, f64, f64),
    rotation: f64,
}

fn frame_rect(frame: (f64, f64, f64, f64)) -> Rect {
    Rect::new(frame.0, frame.1, frame.0 + frame.2, frame.1 + frame.3)
}

/// Map a canvas point into a frame's unrotated space.
fn to_local(pos: Point, rect: Rect, rotation_degrees: f64) -> Point {
    let center = rect.center();
    let angle = -rotation_degrees.to_radians();
    let delta = pos - center;
    let rotated = Vec2::new(
        delta.x * angle.cos() - delta.y * angle.sin(),
        delta.x * angle.sin() + delta.y * angle.cos(),
    );
    center + rotated
}

fn hit_handle(local: Point, rect: Rect) -> Option<HandleKind> {
    let rotate_anchor = Point::new(rect.center().x, rect.y0 - ROTATE_OFFSET);
    if local.distance(rotate_anchor) <= HANDLE_SIZE {
        return Some(HandleKind::Rotate);
    }
    for corner in Corner::ALL {
        if local.distance(corner.point(rect)) <= HANDLE_SIZE {
            return Some(HandleKind::Resize(corner));
        }
    }
    if rect.contains(local) {
        return Some(HandleKind::Move);
    }
    None
}

impl Compositor {
    /// Route a pointer event, returning events for the host to apply.
    pub fn pointer(&mut self, state: &EditorState, event: PointerEvent) -> Vec<CanvasEvent> {
        match event {
            PointerEvent::Down(pos) => self.pointer_down(state, pos),
            PointerEvent::Move(pos) => self.pointer_move(pos),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, state: &EditorState, pos: Point) -> Vec<CanvasEvent> {
        self.gesture = None;

        // fields are topmost; later fields stack higher
        if let Some(field) = state
            .design
            .fields
            .iter()
            .rev()
            .find(|f| field_box(f).contains(pos))
        {
            let mut events = Vec::new();
            if state.selection != Selection::Field(field.id.clone()) {
                events.push(CanvasEvent::FieldSelected(field.id.clone()));
            }
            if self.mode == EditorMode::Admin && !field.lock.position {
                self.gesture = Some(Gesture {
                    target: Target::Field {
                        id: field.id.clone(),
                        start_y: field.y,
                    },
                    handle: HandleKind::Move,
                    start: pos,
                    frame: (field.x, field.y, 0.0, 0.0),
                    rotation: 0.0,
                });
            }
            return events;
        }

        if self.mode != EditorMode::Admin {
            // layers below the text are inert for users
            return if state.selection == Selection::None {
                Vec::new()
            } else {
                vec![CanvasEvent::SelectionCleared]
            };
        }

        if let Some(photo) = state.design.photo.as_ref().filter(|p| p.has_photo) {
            let rect = Rect::new(photo.x, photo.y, photo.x + photo.width, photo.y + photo.height);
            let local = to_local(pos, rect, photo.rotation());
            let handle = if state.selection == Selection::Photo {
                hit_handle(local, rect)
            } else {
                rect.contains(local).then_some(HandleKind::Move)
            };
            if let Some(handle) = handle {
                let mut events = Vec::new();
                if state.selection != Selection::Photo {
                    events.push(CanvasEvent::PhotoSelected);
                }
                self.gesture = Some(Gesture {
                    target: Target::Photo,
                    handle,
                    start: pos,
                    frame: (photo.x, photo.y, photo.width, photo.height),
                    rotation: photo.rotation(),
                });
                return events;
            }
        }

        for layer in state.design.animations.iter().rev() {
            let (x, y, w, h) = layer.frame();
            let rect = Rect::new(x, y, x + w, y + h);
            let local = to_local(pos, rect, layer.rotation());
            let selected = state.selection == Selection::Animation(layer.id().to_string());
            let handle = if selected {
                hit_handle(local, rect)
            } else {
                rect.contains(local).then_some(HandleKind::Move)
            };
            if let Some(handle) = handle {
                let mut events = Vec::new();
                if !selected {
                    events.push(CanvasEvent::AnimationSelected(layer.id().to_string()));
                }
                self.gesture = Some(Gesture {
                    target: Target::Animation(layer.id().to_string()),
                    handle,
                    start: pos,
                    frame: (x, y, w, h),
                    rotation: layer.rotation(),
                });
                return events;
            }
        }

        if state.selection == Selection::None {
            Vec::new()
        } else {
            vec![CanvasEvent::SelectionCleared]
        }
    }

    fn pointer_move(&mut self, pos: Point) -> Vec<CanvasEvent> {
        let Some(gesture) = self.gesture.clone() else {
            return Vec::new();
        };
        let delta = pos - gesture.start;

        match (&gesture.target, gesture.handle) {
            (Target::Field { id, start_y }, HandleKind::Move) => {
                vec![CanvasEvent::FieldDragged {
                    id: id.clone(),
                    y: start_y + delta.y,
                }]
            }
            (target, HandleKind::Move) => {
                let (x, y, w, h) = gesture.frame;
                self.transform_event(target, x + delta.x, y + delta.y, w, h, gesture.rotation)
            }
            (target, HandleKind::Resize(corner)) => {
                let (signs_x, signs_y) = corner.signs();
                let (x, y, w, h) = gesture.frame;
                let new_w = w + delta.x * signs_x;
                let new_h = h + delta.y * signs_y;
                let floor = match target {
                    Target::Photo => PhotoLayer::MIN_SIZE,
                    Target::Animation(_) => LottieLayer::MIN_SIZE,
                    Target::Field { .. } => return Vec::new(),
                };
                // decline, never clamp: an undersized gesture leaves the
                // frame exactly where it was
                if new_w < floor || new_h < floor {
                    return Vec::new();
                }
                let new_x = if signs_x < 0.0 { x + delta.x } else { x };
                let new_y = if signs_y < 0.0 { y + delta.y } else { y };
                self.transform_event(target, new_x, new_y, new_w, new_h, gesture.rotation)
            }
            (target, HandleKind::Rotate) => {
                let rect = frame_rect(gesture.frame);
                let center = rect.center();
                let from = (gesture.start - center).atan2();
                let to = (pos - center).atan2();
                let rotation = gesture.rotation + (to - from).to_degrees();
                let (x, y, w, h) = gesture.frame;
                self.transform_event(target, x, y, w, h, rotation)
            }
        }
    }

    fn pointer_up(&mut self) -> Vec<CanvasEvent> {
        self.gesture = None;
        Vec::new()
    }

    fn transform_event(
        &self,
        target: &Target,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
    ) -> Vec<CanvasEvent> {
        match target {
            Target::Photo => vec![CanvasEvent::PhotoTransformed {
                x,
                y,
                width,
                height,
                rotation,
            }],
            Target::Animation(id) => vec![CanvasEvent::AnimationTransformed {
                id: id.clone(),
                patch: AnimationPatch {
                    x: Some(x),
                    y: Some(y),
                    width: Some(width),
                    height: Some(height),
                    rotation: Some(rotation),
                    z_index: None,
                },
            }],
            Target::Field { .. } => Vec::new(),
        }
    }
}
