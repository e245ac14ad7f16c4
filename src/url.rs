//! Story page URLs and the edit mode they imply.

const MODIFY_SEGMENT: &str = "modify/";
const BACKGROUND_SEGMENT: &str = "modify_bkg/";

/// Whether the story page allows structural edits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditMode {
    /// `/modify/...` pages: palette shown, edits and pointer-leave saves enabled.
    Modify,
    /// Published story pages: read-only.
    View,
}

impl EditMode {
    #[must_use]
    pub fn from_page_url(page_url: &str) -> Self {
        if page_url.contains("/modify/") { Self::Modify } else { Self::View }
    }

    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Modify)
    }
}

/// Lowercase and replace spaces with underscores, the server's story key form.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Editing page URL for a story.
#[must_use]
pub fn modify_url(base_url: &str, section: &str, title: &str) -> String {
    format!("{}/modify/{}/{}", base_url.trim_end_matches('/'), slugify(section), slugify(title))
}

/// Page URL to edit: `explicit` when given, otherwise built from section and
/// title with [`modify_url`]. `None` if neither is available.
#[must_use]
pub fn resolve_page_url(
    explicit: Option<&str>,
    base_url: &str,
    section: Option<&str>,
    title: Option<&str>,
) -> Option<String> {
    if let Some(url) = explicit {
        return Some(url.to_owned());
    }
    Some(modify_url(base_url, section?, title?))
}

/// Background save URL: the first `modify/` segment becomes `modify_bkg/`.
#[must_use]
pub fn background_url(page_url: &str) -> String {
    page_url.replacen(MODIFY_SEGMENT, BACKGROUND_SEGMENT, 1)
}

#[cfg(test)]
#[path = "url_test.rs"]
mod tests;
