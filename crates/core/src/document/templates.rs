//! Curated starting layouts.

use serde::Serialize;

use super::factory::{create_empty_document, create_home_page, create_page, create_section};
use super::model::{Document, LocalizedText, NavLink, Page, StylePreset};
use super::section::SectionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// Single page with the usual clinic sections.
    Classic,
    /// Single page, hero plus contact details.
    Minimal,
    /// Home page plus services, team, gallery and contact pages.
    Full,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::Classic, Template::Minimal, Template::Full];

    pub fn id(self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Minimal => "minimal",
            Template::Full => "full",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Template::Classic => "Classic",
            Template::Minimal => "Minimal",
            Template::Full => "Full clinic site",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// A fresh, ready-to-edit document seeded from this template.
    pub fn create_config(self) -> Document {
        let mut doc = create_empty_document();
        doc.template_id = Some(self.id().to_string());

        match self {
            Template::Classic => {
                doc.pages = vec![home(&[
                    SectionType::Hero,
                    SectionType::ServicesGrid,
                    SectionType::DoctorShowcase,
                    SectionType::Testimonials,
                    SectionType::Schedule,
                    SectionType::ContactInfo,
                    SectionType::Map,
                ])];
            }
            Template::Minimal => {
                doc.style_preset = StylePreset::Modern;
                doc.pages = vec![home(&[SectionType::Hero, SectionType::ContactInfo])];
            }
            Template::Full => {
                doc.style_preset = StylePreset::Elegant;
                doc.navbar.show_booking_button = true;
                doc.pages = vec![
                    home(&[
                        SectionType::Hero,
                        SectionType::Text,
                        SectionType::Testimonials,
                        SectionType::Booking,
                    ]),
                    page(
                        "services",
                        "Services",
                        "الخدمات",
                        &[SectionType::ServicesGrid, SectionType::Faq],
                    ),
                    page(
                        "team",
                        "Our team",
                        "فريقنا",
                        &[SectionType::DoctorShowcase],
                    ),
                    page(
                        "gallery",
                        "Gallery",
                        "المعرض",
                        &[SectionType::PhotoGallery],
                    ),
                    page(
                        "contact",
                        "Contact",
                        "اتصل بنا",
                        &[
                            SectionType::ContactInfo,
                            SectionType::Schedule,
                            SectionType::Map,
                        ],
                    ),
                ];
                doc.navbar.links = doc
                    .pages
                    .iter()
                    .map(|p| NavLink {
                        label: p.title_localized.clone(),
                        href: if p.is_home_page {
                            "/".to_string()
                        } else {
                            format!("/{}", p.slug)
                        },
                        page_id: Some(p.id.clone()),
                    })
                    .collect();
            }
        }
        doc
    }
}

fn home(kinds: &[SectionType]) -> Page {
    create_home_page(kinds.iter().copied().map(create_section).collect())
}

fn page(slug: &str, en: &str, ar: &str, kinds: &[SectionType]) -> Page {
    Page {
        sections: kinds.iter().copied().map(create_section).collect(),
        ..create_page(slug, en, LocalizedText::pair(en, ar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::validate::validate_document;

    #[test]
    fn every_template_is_valid() {
        for template in Template::ALL {
            let doc = template.create_config();
            assert_eq!(validate_document(&doc), Ok(()), "{}", template.id());
            assert_eq!(doc.template_id.as_deref(), Some(template.id()));
            assert!(doc.home_page().is_some());
        }
    }

    #[test]
    fn full_template_links_every_page() {
        let doc = Template::Full.create_config();
        assert_eq!(doc.pages.len(), 5);
        assert_eq!(doc.navbar.links.len(), doc.pages.len());
        for (link, page) in doc.navbar.links.iter().zip(&doc.pages) {
            assert_eq!(link.page_id.as_deref(), Some(page.id.as_str()));
        }
    }

    #[test]
    fn templates_are_fresh_each_call() {
        let a = Template::Classic.create_config();
        let b = Template::Classic.create_config();
        assert_ne!(a.pages[0].sections[0].id, b.pages[0].sections[0].id);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(Template::from_id("minimal"), Some(Template::Minimal));
        assert_eq!(Template::from_id("brutalist"), None);
    }
}
