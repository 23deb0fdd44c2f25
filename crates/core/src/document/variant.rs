//! Presentation dispatch for section variants.
//!
//! A renderer picks its strategy from `section.type` and
//! `section.data.variant` alone. Unrecognized variant strings resolve to the
//! type's default strategy, so a section never renders blank.

use tracing::warn;

use super::model::Page;
use super::section::{Section, SectionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub section_type: SectionType,
    pub variant: &'static str,
    /// The stored variant was not recognized.
    pub fallback: bool,
}

pub fn resolve_strategy(section: &Section) -> Strategy {
    let section_type = section.section_type();
    let stored = section.variant();
    match section_type
        .variants()
        .iter()
        .copied()
        .find(|v| *v == stored)
    {
        Some(variant) => Strategy {
            section_type,
            variant,
            fallback: false,
        },
        None => {
            warn!(
                section_id = %section.id,
                section_type = section_type.as_str(),
                variant = stored,
                "unrecognized section variant, using default strategy"
            );
            Strategy {
                section_type,
                variant: section_type.default_variant(),
                fallback: true,
            }
        }
    }
}

/// Implemented by whatever turns sections into presentation.
pub trait SectionRenderer {
    type Output;

    fn render(&self, section: &Section, strategy: Strategy, locale: &str) -> Self::Output;
}

pub fn render_section<R: SectionRenderer>(
    renderer: &R,
    section: &Section,
    locale: &str,
) -> R::Output {
    renderer.render(section, resolve_strategy(section), locale)
}

/// Render the visible sections of a page in order.
pub fn render_page<R: SectionRenderer>(renderer: &R, page: &Page, locale: &str) -> Vec<R::Output> {
    page.sections
        .iter()
        .filter(|s| s.visible)
        .map(|s| render_section(renderer, s, locale))
        .collect()
}
