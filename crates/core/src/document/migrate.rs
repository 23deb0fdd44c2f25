//! Upgrade stored documents of any vintage to the current schema.
//!
//! Version history:
//! - unversioned: a flat `sections` list, written before versioning existed.
//! - 1: same flat shape, tagged `"version": 1`.
//! - 2: `pages`, each with its own `sections`; adds `footer` and
//!   `stylePreset`. Section `data.variant` became mandatory during the
//!   life of version 2, so every load also backfills it.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::factory::create_home_page;
use super::model::{Document, Footer, Navbar, StylePreset, CURRENT_VERSION};
use super::section::{Section, SectionData, SectionType};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("unsupported document version {0}")]
    UnsupportedVersion(u64),
    #[error("unrecognized document shape")]
    UnrecognizedShape,
    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Flat, single-page layout used by version 1 and unversioned documents.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentV1 {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    navbar: Navbar,
    #[serde(default)]
    sections: Vec<Section>,
    #[serde(default)]
    template_id: Option<String>,
    #[serde(default)]
    updated_at: String,
}

impl From<DocumentV1> for Document {
    fn from(v1: DocumentV1) -> Self {
        Document {
            version: CURRENT_VERSION,
            enabled: v1.enabled,
            style_preset: StylePreset::default(),
            navbar: v1.navbar,
            footer: Footer::default(),
            pages: vec![create_home_page(v1.sections)],
            template_id: v1.template_id,
            updated_at: v1.updated_at,
        }
    }
}

/// Bring a stored document up to the current version.
///
/// `None` and JSON `null` yield `Ok(None)`. Anything carrying a flat
/// `sections` list without a version tag is treated as version 1.
pub fn ensure_latest(raw: Option<Value>) -> Result<Option<Document>, MigrationError> {
    let raw = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw,
    };
    if !raw.is_object() {
        return Err(MigrationError::UnrecognizedShape);
    }

    let version = match raw.get("version") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.as_u64().ok_or(MigrationError::UnrecognizedShape)?),
    };

    let doc = match version {
        Some(v) if v == u64::from(CURRENT_VERSION) => serde_json::from_value(raw)?,
        Some(1) => migrate_v1(raw)?,
        Some(other) => return Err(MigrationError::UnsupportedVersion(other)),
        None if raw.get("sections").is_some_and(Value::is_array) => {
            debug!("untagged document with a section list, migrating as version 1");
            migrate_v1(raw)?
        }
        None => return Err(MigrationError::UnrecognizedShape),
    };
    Ok(Some(doc))
}

fn migrate_v1(raw: Value) -> Result<Document, MigrationError> {
    let v1: DocumentV1 = serde_json::from_value(raw)?;
    debug!(sections = v1.sections.len(), "migrating version 1 document");
    Ok(v1.into())
}

/// Backfill an in-memory document, returning the same `Arc` when there is
/// nothing to repair.
pub fn ensure_latest_document(doc: Arc<Document>) -> Arc<Document> {
    if !needs_backfill(&doc) {
        return doc;
    }
    let mut doc = doc;
    let repaired = backfill_document(Arc::make_mut(&mut doc));
    debug!(repaired, "backfilled section variants");
    doc
}

fn needs_backfill(doc: &Document) -> bool {
    doc.pages
        .iter()
        .flat_map(|p| &p.sections)
        .any(|s| match &s.data {
            SectionData::PhotoGallery(g) => g.variant.is_empty() || g.layout != g.variant,
            data => data.variant().is_empty(),
        })
}

/// Give every section a variant, returning how many were repaired.
pub fn backfill_document(doc: &mut Document) -> usize {
    let mut repaired = 0;
    for section in doc.pages.iter_mut().flat_map(|p| p.sections.iter_mut()) {
        let kind = section.section_type();
        match &mut section.data {
            SectionData::PhotoGallery(g) => {
                if g.variant.is_empty() || g.layout != g.variant {
                    g.sync_layout(g.variant.is_empty());
                    if g.variant.is_empty() {
                        g.variant = kind.default_variant().to_string();
                        g.layout = g.variant.clone();
                    }
                    repaired += 1;
                }
            }
            data => {
                if data.variant().is_empty() {
                    *data.variant_mut() = kind.default_variant().to_string();
                    repaired += 1;
                }
            }
        }
    }
    repaired
}

/// Fill `variant` on a raw section `data` object.
///
/// Photo galleries predate `variant` and used `layout`; the two are made
/// equal, preferring `variant`, then `layout`, then the default.
pub(crate) fn backfill_section_data(kind: SectionType, data: &mut Map<String, Value>) {
    let present = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    if kind == SectionType::PhotoGallery {
        let resolved = present("variant")
            .or_else(|| present("layout"))
            .unwrap_or_else(|| kind.default_variant().to_string());
        data.insert("layout".into(), Value::String(resolved.clone()));
        data.insert("variant".into(), Value::String(resolved));
    } else if present("variant").is_none() {
        data.insert(
            "variant".into(),
            Value::String(kind.default_variant().to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::factory::{create_empty_document, create_section};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn v1_doc() -> Value {
        json!({
            "version": 1,
            "enabled": true,
            "navbar": { "enabled": true, "sticky": false, "links": [] },
            "templateId": "classic",
            "updatedAt": "2024-03-01T10:00:00Z",
            "sections": [
                { "id": "s1", "type": "hero", "anchorId": "top", "data": { "variant": "split" } },
                { "id": "s2", "type": "text", "data": { "variant": "standard" } },
            ],
        })
    }

    #[test]
    fn null_and_missing_yield_none() {
        assert!(ensure_latest(None).unwrap().is_none());
        assert!(ensure_latest(Some(Value::Null)).unwrap().is_none());
    }

    #[test]
    fn v1_becomes_single_home_page() {
        let raw = v1_doc();
        let expected: Vec<Section> =
            serde_json::from_value(raw["sections"].clone()).unwrap();

        let doc = ensure_latest(Some(raw)).unwrap().unwrap();

        assert_eq!(doc.version, CURRENT_VERSION);
        assert_eq!(doc.pages.len(), 1);
        let home = &doc.pages[0];
        assert!(home.is_home_page);
        assert_eq!(home.slug, "home");
        assert_eq!(home.sections, expected);
        assert!(doc.enabled);
        assert!(!doc.navbar.sticky);
        assert_eq!(doc.template_id.as_deref(), Some("classic"));
        assert_eq!(doc.updated_at, "2024-03-01T10:00:00Z");
        assert_eq!(doc.style_preset, StylePreset::Clinical);
        assert_eq!(doc.footer, Footer::default());
        assert!(doc.footer.enabled && doc.footer.show_phone && doc.footer.show_email);
    }

    #[test]
    fn untagged_section_list_is_treated_as_v1() {
        let mut raw = v1_doc();
        raw.as_object_mut().unwrap().remove("version");
        let doc = ensure_latest(Some(raw)).unwrap().unwrap();
        assert_eq!(doc.pages[0].sections.len(), 2);
    }

    #[test]
    fn pre_localization_strings_load_as_default_locale() {
        let raw = json!({
            "version": 1,
            "sections": [
                { "id": "a", "type": "hero", "data": { "heading": "Welcome" } },
                { "id": "b", "type": "text", "data": { "heading": null, "body": "<p>Hi</p>" } },
            ],
        });

        let doc = ensure_latest(Some(raw)).unwrap().unwrap();

        let sections = &doc.pages[0].sections;
        let SectionData::Hero(hero) = &sections[0].data else {
            panic!("expected hero data");
        };
        assert_eq!(hero.heading.get("ar"), "Welcome");
        assert_eq!(hero.variant, "centered");
        let SectionData::Text(text) = &sections[1].data else {
            panic!("expected text data");
        };
        assert_eq!(text.body.get("en"), "<p>Hi</p>");
        assert!(text.heading.locales().next().is_none());
    }

    #[test]
    fn unrecognized_input_is_rejected() {
        assert!(matches!(
            ensure_latest(Some(json!({ "hello": "world" }))),
            Err(MigrationError::UnrecognizedShape)
        ));
        assert!(matches!(
            ensure_latest(Some(json!([1, 2, 3]))),
            Err(MigrationError::UnrecognizedShape)
        ));
        assert!(matches!(
            ensure_latest(Some(json!({ "version": 7, "pages": [] }))),
            Err(MigrationError::UnsupportedVersion(7))
        ));
    }

    #[test]
    fn missing_variants_get_type_defaults() {
        let sections: Vec<Value> = SectionType::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| json!({ "id": format!("s{i}"), "type": kind.as_str(), "data": {} }))
            .collect();
        let raw = json!({
            "version": 2,
            "pages": [{ "id": "p1", "slug": "home", "isHomePage": true, "sections": sections }],
        });

        let doc = ensure_latest(Some(raw)).unwrap().unwrap();
        for section in &doc.pages[0].sections {
            assert_eq!(section.variant(), section.section_type().default_variant());
        }
        let faq = doc.pages[0]
            .sections
            .iter()
            .find(|s| s.section_type() == SectionType::Faq)
            .unwrap();
        assert_eq!(faq.variant(), "accordion");
    }

    #[test]
    fn gallery_layout_and_variant_stay_consistent() {
        let gallery = |data: Value| {
            let raw = json!({
                "version": 2,
                "pages": [{
                    "id": "p1", "slug": "home", "isHomePage": true,
                    "sections": [{ "id": "g", "type": "photo_gallery", "data": data }],
                }],
            });
            let doc = ensure_latest(Some(raw)).unwrap().unwrap();
            let SectionData::PhotoGallery(g) = doc.pages[0].sections[0].data.clone() else {
                panic!("expected a gallery");
            };
            (g.variant, g.layout)
        };

        assert_eq!(gallery(json!({ "layout": "masonry" })), ("masonry".into(), "masonry".into()));
        assert_eq!(gallery(json!({})), ("grid".into(), "grid".into()));
        assert_eq!(
            gallery(json!({ "variant": "carousel", "layout": "grid" })),
            ("carousel".into(), "carousel".into())
        );
    }

    #[test]
    fn current_document_keeps_identity() {
        let mut doc = create_empty_document();
        doc.pages[0].sections.push(create_section(SectionType::PhotoGallery));
        let doc = Arc::new(doc);

        let same = ensure_latest_document(Arc::clone(&doc));
        assert!(Arc::ptr_eq(&doc, &same));
        let again = ensure_latest_document(Arc::clone(&same));
        assert!(Arc::ptr_eq(&doc, &again));
    }

    #[test]
    fn in_memory_backfill_repairs_and_is_idempotent() {
        let mut doc = create_empty_document();
        let mut faq = create_section(SectionType::Faq);
        faq.data.variant_mut().clear();
        doc.pages[0].sections.push(faq);
        let doc = Arc::new(doc);

        let repaired = ensure_latest_document(Arc::clone(&doc));
        assert!(!Arc::ptr_eq(&doc, &repaired));
        assert_eq!(repaired.pages[0].sections[0].variant(), "accordion");

        let again = ensure_latest_document(Arc::clone(&repaired));
        assert!(Arc::ptr_eq(&repaired, &again));
    }

    #[test]
    fn v2_round_trips_through_json() {
        let doc = create_empty_document();
        let raw = serde_json::to_value(&doc).unwrap();
        let loaded = ensure_latest(Some(raw)).unwrap().unwrap();
        assert_eq!(loaded, doc);
    }
}
