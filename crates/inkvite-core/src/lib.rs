//! Inkvite Core Library
//!
//! Platform-agnostic document model and editing logic for the Inkvite
//! invitation template editor: layer definitions, the design document
//! codec with its legacy-schema fallback chain, the selection/mutation
//! controller, and the persistence adapter traits.

pub mod auth;
pub mod codec;
pub mod document;
pub mod editor;
pub mod hydrate;
pub mod layers;
pub mod route;
pub mod storage;

pub use auth::{AuthError, Claims, IdentityProvider, StaticIdentity};
pub use codec::{clean_tags, normalize, serialize, NormalizedTemplate};
pub use document::{
    field_box, Canvas, Category, DesignDocument, Subcategory, TemplateMeta, BASE_CANVAS,
};
pub use editor::{EditorMode, EditorState, FieldAttr, PendingBackground, Selection};
pub use hydrate::{hydrate_animations, HydrationReport};
pub use layers::{
    Align, AnimationLayer, AnimationPatch, Field, FieldLock, FieldPatch, FontStyle, LottieLayer,
    PhotoLayer, PhotoShape, Rgba, Weight,
};
pub use route::{RouteInfo, MIN_TEMPLATE_ID_LEN};
pub use storage::{block_on, AssetStore, BoxFuture, MemoryAssetStore, MemoryTemplateStore, StorageError, StorageResult, TemplateStore, UploadOptions};
