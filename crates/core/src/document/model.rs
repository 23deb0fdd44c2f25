use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::section::Section;

/// Schema version written by this crate.
pub const CURRENT_VERSION: u32 = 2;

/// Slug reserved for the home page.
pub const HOME_SLUG: &str = "home";

/// Locale used when a translation is missing.
pub const DEFAULT_LOCALE: &str = "en";

/// Second locale every factory seeds placeholder copy in.
pub const SECONDARY_LOCALE: &str = "ar";

/// The persisted root of a site: navigation chrome, theme and pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub version: u32,
    /// Whether the built site is publicly served.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub style_preset: StylePreset,
    #[serde(default)]
    pub navbar: Navbar,
    #[serde(default)]
    pub footer: Footer,
    /// Ordered list of pages; order is navigation order.
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub updated_at: String,
}

impl Document {
    pub fn home_page(&self) -> Option<&Page> {
        self.pages.iter().find(|p| p.is_home_page)
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn page_by_slug(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.slug == slug)
    }

    /// Pages that appear in navigation and are served.
    pub fn visible_pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter().filter(|p| p.visible)
    }
}

/// One navigable page of the built site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub title_localized: LocalizedText,
    /// Render order.
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub is_home_page: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl Page {
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }
}

/// Copy keyed by locale code. Serialized as a plain JSON object
/// (`{"en": "...", "ar": "..."}`) so editing widgets can round-trip it.
///
/// Documents written before localization stored bare strings; those load
/// as default-locale text, and `null` loads as empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum LocalizedRepr {
    Locales(BTreeMap<String, String>),
    Plain(String),
    Null,
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match LocalizedRepr::deserialize(deserializer)? {
            LocalizedRepr::Locales(map) => Self(map),
            LocalizedRepr::Plain(text) if text.is_empty() => Self::default(),
            LocalizedRepr::Plain(text) => {
                let mut map = BTreeMap::new();
                map.insert(DEFAULT_LOCALE.to_string(), text);
                Self(map)
            }
            LocalizedRepr::Null => Self::default(),
        })
    }
}

impl LocalizedText {
    /// Text in the default and secondary locales.
    pub fn pair(default: impl Into<String>, secondary: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(DEFAULT_LOCALE.to_string(), default.into());
        map.insert(SECONDARY_LOCALE.to_string(), secondary.into());
        Self(map)
    }

    pub fn set(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0.insert(locale.into(), text.into());
    }

    /// Resolve for `locale`, then the default locale, then any translation.
    pub fn get(&self, locale: &str) -> &str {
        self.0
            .get(locale)
            .or_else(|| self.0.get(DEFAULT_LOCALE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }
}

/// Named visual theme applied to the whole site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    #[default]
    Clinical,
    Modern,
    Warm,
    Elegant,
}

/// Palette of design tokens usable for backgrounds and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorToken {
    #[default]
    White,
    Light,
    Muted,
    Primary,
    Secondary,
    Accent,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Spacing {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "sm")]
    Small,
    #[default]
    #[serde(rename = "md")]
    Medium,
    #[serde(rename = "lg")]
    Large,
    #[serde(rename = "xl")]
    ExtraLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutWidth {
    Full,
    #[default]
    Contained,
    Narrow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    pub background_color: ColorToken,
    pub text_color: ColorToken,
    pub padding: Spacing,
    pub layout: LayoutWidth,
    pub bg_image: Option<String>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: ColorToken::White,
            text_color: ColorToken::Dark,
            padding: Spacing::Medium,
            layout: LayoutWidth::Contained,
            bg_image: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavLink {
    pub label: LocalizedText,
    pub href: String,
    /// Set when the link points at a page of this document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Navbar {
    pub enabled: bool,
    pub show_logo: bool,
    pub logo_url: Option<String>,
    pub sticky: bool,
    pub show_booking_button: bool,
    pub links: Vec<NavLink>,
    pub background_color: ColorToken,
    pub text_color: ColorToken,
}

impl Default for Navbar {
    fn default() -> Self {
        Self {
            enabled: true,
            show_logo: true,
            logo_url: None,
            sticky: true,
            show_booking_button: false,
            links: Vec::new(),
            background_color: ColorToken::White,
            text_color: ColorToken::Dark,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterScheme {
    #[default]
    Plain,
    Dark,
    Brand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Footer {
    pub enabled: bool,
    pub show_clinic_name: bool,
    pub show_phone: bool,
    pub show_email: bool,
    pub show_address: bool,
    pub show_social_links: bool,
    pub links: Vec<NavLink>,
    pub color_scheme: FooterScheme,
    pub copyright: LocalizedText,
}

impl Default for Footer {
    /// Footer synthesized for documents that predate it.
    fn default() -> Self {
        Self {
            enabled: true,
            show_clinic_name: true,
            show_phone: true,
            show_email: true,
            show_address: false,
            show_social_links: false,
            links: Vec::new(),
            color_scheme: FooterScheme::Plain,
            copyright: LocalizedText::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn localized_text_accepts_bare_strings_and_null() {
        let text: LocalizedText = serde_json::from_value(json!("Welcome")).unwrap();
        let mut expected = LocalizedText::default();
        expected.set("en", "Welcome");
        assert_eq!(text, expected);
        assert_eq!(serde_json::to_value(&text).unwrap(), json!({ "en": "Welcome" }));

        let empty: LocalizedText = serde_json::from_value(json!(null)).unwrap();
        assert!(empty.locales().next().is_none());
        let blank: LocalizedText = serde_json::from_value(json!("")).unwrap();
        assert!(blank.locales().next().is_none());

        assert!(serde_json::from_value::<LocalizedText>(json!(42)).is_err());
    }

    #[test]
    fn localized_text_falls_back_to_default_locale() {
        let text = LocalizedText::pair("Welcome", "أهلاً");
        assert_eq!(text.get("ar"), "أهلاً");
        assert_eq!(text.get("fr"), "Welcome");

        let mut only_ar = LocalizedText::default();
        only_ar.set("ar", "مرحبا");
        assert_eq!(only_ar.get("en"), "مرحبا");
        assert_eq!(LocalizedText::default().get("en"), "");
    }

    #[test]
    fn style_uses_design_token_names() {
        let style = Style {
            padding: Spacing::ExtraLarge,
            layout: LayoutWidth::Narrow,
            ..Style::default()
        };
        let value = serde_json::to_value(&style).unwrap();
        assert_eq!(
            value,
            json!({
                "backgroundColor": "white",
                "textColor": "dark",
                "padding": "xl",
                "layout": "narrow",
                "bgImage": null,
            })
        );
    }

    #[test]
    fn missing_chrome_fields_take_defaults() {
        let doc: Document = serde_json::from_value(json!({
            "version": 2,
            "pages": [],
        }))
        .unwrap();
        assert!(!doc.enabled);
        assert_eq!(doc.style_preset, StylePreset::Clinical);
        assert_eq!(doc.footer, Footer::default());
        assert!(doc.navbar.links.is_empty());
        assert_eq!(doc.template_id, None);
    }
}
