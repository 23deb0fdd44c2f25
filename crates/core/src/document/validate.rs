/// Document invariant checks.
use std::collections::HashSet;

use thiserror::Error;

use super::model::{Document, CURRENT_VERSION, HOME_SLUG};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported document version {0}")]
    Version(u32),
    #[error("document has no home page")]
    MissingHomePage,
    #[error("document has {0} home pages")]
    MultipleHomePages(usize),
    #[error("home page slug must be \"home\", found {0:?}")]
    HomeSlug(String),
    #[error("duplicate page id {0}")]
    DuplicatePageId(String),
    #[error("page {0} has an empty slug")]
    EmptySlug(String),
    #[error("duplicate page slug {0:?}")]
    DuplicateSlug(String),
    #[error("duplicate section id {section_id} on page {page_id}")]
    DuplicateSectionId { page_id: String, section_id: String },
}

/// Validate the structural invariants every stored document must hold.
pub fn validate_document(doc: &Document) -> Result<(), ValidationError> {
    if doc.version != CURRENT_VERSION {
        return Err(ValidationError::Version(doc.version));
    }

    let homes: Vec<_> = doc.pages.iter().filter(|p| p.is_home_page).collect();
    match homes.as_slice() {
        [] => return Err(ValidationError::MissingHomePage),
        [home] if home.slug != HOME_SLUG => {
            return Err(ValidationError::HomeSlug(home.slug.clone()))
        }
        [_] => {}
        many => return Err(ValidationError::MultipleHomePages(many.len())),
    }

    let mut page_ids = HashSet::new();
    let mut slugs = HashSet::new();
    for page in &doc.pages {
        if !page_ids.insert(page.id.as_str()) {
            return Err(ValidationError::DuplicatePageId(page.id.clone()));
        }
        if page.slug.is_empty() {
            return Err(ValidationError::EmptySlug(page.id.clone()));
        }
        if !slugs.insert(page.slug.as_str()) {
            return Err(ValidationError::DuplicateSlug(page.slug.clone()));
        }

        let mut section_ids = HashSet::new();
        for section in &page.sections {
            if !section_ids.insert(section.id.as_str()) {
                return Err(ValidationError::DuplicateSectionId {
                    page_id: page.id.clone(),
                    section_id: section.id.clone(),
                });
            }
        }
    }
    Ok(())
}
