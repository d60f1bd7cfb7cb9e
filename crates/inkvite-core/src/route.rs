//! Editor entry routing.
//!
//! The host shell hands the editor a redirect target of the form
//! `template/<id>` (or a bare id). Ids shorter than the minimum length
//! cannot be real document ids, so they select the new-template flow.

/// Real template ids are at least this long; anything shorter routes to
/// template creation.
pub const MIN_TEMPLATE_ID_LEN: usize = 6;

/// Parsed entry target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteInfo {
    /// Create a new template from scratch.
    NewTemplate,
    /// Open an existing template for editing.
    EditTemplate { id: String },
}

impl RouteInfo {
    /// Parse a redirect target. The `template/` prefix is optional and
    /// stripped; whitespace is ignored.
    pub fn parse(target: &str) -> RouteInfo {
        let id = target.trim().trim_start_matches("template/").trim();
        if id.len() < MIN_TEMPLATE_ID_LEN {
            RouteInfo::NewTemplate
        } else {
            RouteInfo::EditTemplate { id: id.to_string() }
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, RouteInfo::NewTemplate)
    }
}
