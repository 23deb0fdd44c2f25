/// Serializable editor commands, one per engine operation.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::model::{Document, Footer, LocalizedText, Navbar, Style, StylePreset};
use crate::document::section::SectionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    AddPage {
        slug: String,
        title: String,
        #[serde(default)]
        title_localized: LocalizedText,
    },
    RemovePage {
        id: String,
    },
    RenamePage {
        id: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title_localized: Option<LocalizedText>,
    },
    UpdatePageSlug {
        id: String,
        slug: String,
    },
    TogglePageVisibility {
        id: String,
    },
    AddSection {
        section_type: SectionType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    RemoveSection {
        id: String,
    },
    DuplicateSection {
        id: String,
    },
    MoveSection {
        from_index: usize,
        to_index: usize,
    },
    UpdateSection {
        id: String,
        patch: SectionPatch,
    },
    UpdateSectionData {
        id: String,
        data: Map<String, Value>,
    },
    ToggleSectionVisibility {
        id: String,
    },
    SetNavbar {
        navbar: Navbar,
    },
    SetFooter {
        footer: Footer,
    },
    SetStylePreset {
        preset: StylePreset,
    },
    SetEnabled {
        enabled: bool,
    },
    ApplyTemplate {
        document: Box<Document>,
    },
}

/// Partial update of a section's top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

/// Whether a dispatched mutation changed the document.
///
/// Invalid mutations (removing the home page, moving past the end of the
/// section list, unknown ids) are absorbed rather than raised; the outcome
/// lets callers tell the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationOutcome {
    Applied,
    Ignored,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mutations_are_tagged_by_op() {
        let m: Mutation = serde_json::from_value(json!({
            "op": "addSection",
            "sectionType": "faq",
            "index": 0,
        }))
        .unwrap();
        assert_eq!(
            m,
            Mutation::AddSection {
                section_type: SectionType::Faq,
                index: Some(0),
            }
        );

        let value = serde_json::to_value(Mutation::MoveSection {
            from_index: 2,
            to_index: 0,
        })
        .unwrap();
        assert_eq!(value, json!({ "op": "moveSection", "fromIndex": 2, "toIndex": 0 }));
    }

    #[test]
    fn section_patch_omits_unset_fields() {
        let patch = SectionPatch {
            visible: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "visible": false }));
    }
}
