//! Storage path layout.
//!
//! All uploads for one template live under its id so deleting the
//! template can reap them in one prefix sweep.

use uuid::Uuid;

/// Path for an uploaded template asset (backgrounds, sample photos).
/// Each upload gets a fresh name so cached URLs never go stale.
pub fn template_asset_path(template_id: &str, extension: &str) -> String {
    format!(
        "templates/{}/assets/{}.{}",
        template_id,
        Uuid::new_v4().simple(),
        extension
    )
}

/// Path of a template's animation payload.
pub fn lottie_payload_path(template_id: &str) -> String {
    format!("templates/{}/lottie/main.json", template_id)
}

/// Path of a template's preview thumbnail.
pub fn preview_thumb_path(template_id: &str) -> String {
    format!("previews/{}/thumb.png", template_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_paths_are_unique_per_upload() {
        let a = template_asset_path("t1", "png");
        let b = template_asset_path("t1", "png");
        assert_ne!(a, b);
        assert!(a.starts_with("templates/t1/assets/"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn test_fixed_paths() {
        assert_eq!(lottie_payload_path("t1"), "templates/t1/lottie/main.json");
        assert_eq!(preview_thumb_path("t1"), "previews/t1/thumb.png");
    }
}
