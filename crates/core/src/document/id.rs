/// Identifier utilities for pages, sections and anchors.
///
/// Ids are opaque to every consumer; the prefixes only make stored
/// documents easier to read:
/// - Page: `page_{uuid}`
/// - Section: `sec_{uuid}`
use uuid::Uuid;

const PAGE_PREFIX: &str = "page_";
const SECTION_PREFIX: &str = "sec_";

/// Appended to the anchor id of a duplicated section.
pub const DUPLICATE_ANCHOR_SUFFIX: &str = "-copy";

pub fn new_page_id() -> String {
    format!("{PAGE_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn new_section_id() -> String {
    format!("{SECTION_PREFIX}{}", Uuid::new_v4().simple())
}

/// Generate ids until one is not taken.
pub fn fresh_id(generate: fn() -> String, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate();
        if !taken(&id) {
            return id;
        }
    }
}

/// Anchor for a new section: the type prefix plus a short tail of its id.
pub fn anchor_for(prefix: &str, section_id: &str) -> String {
    let tail: String = section_id
        .chars()
        .rev()
        .take(6)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{prefix}-{tail}")
}

pub fn duplicate_anchor(anchor_id: &str) -> String {
    format!("{anchor_id}{DUPLICATE_ANCHOR_SUFFIX}")
}

/// `base` if unused, otherwise `base-2`, `base-3`, …
pub fn unique_slug(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
