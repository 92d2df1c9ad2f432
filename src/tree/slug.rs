//! Slug codec
//!
//! Display names become URL-safe slugs: lowercase, every run of characters
//! outside `[a-z0-9]` collapsed to one hyphen, no hyphen at either end.
//! Distinct names may collide (`"AI | ML"` and `"AI-ML"` both give `ai-ml`).

/// Convert a display name into its URL slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Whether `name` is addressed by `slug`.
pub fn matches(name: &str, slug: &str) -> bool {
    slugify(name) == slug
}
