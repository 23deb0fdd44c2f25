//! Sections: typed content blocks on a page.
//!
//! A section's `type` selects the shape of its `data`, and every `data`
//! payload carries a `variant` string selecting the presentation strategy
//! within that type. On the wire the pair is flat:
//!
//! ```json
//! { "id": "sec_…", "type": "faq", "visible": true, "anchorId": "faq",
//!   "style": { … }, "data": { "variant": "accordion", "items": [] } }
//! ```
//!
//! `variant` is kept as a string so unknown strategies written by a newer
//! editor survive a round trip; see [`crate::document::variant`] for how
//! a renderer resolves it.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use super::migrate::backfill_section_data;
use super::model::{LocalizedText, Spacing, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Hero,
    Text,
    ServicesGrid,
    DoctorShowcase,
    PhotoGallery,
    ContactInfo,
    Testimonials,
    Faq,
    Booking,
    Schedule,
    Map,
    Divider,
    Button,
    Image,
}

impl SectionType {
    pub const ALL: [SectionType; 14] = [
        SectionType::Hero,
        SectionType::Text,
        SectionType::ServicesGrid,
        SectionType::DoctorShowcase,
        SectionType::PhotoGallery,
        SectionType::ContactInfo,
        SectionType::Testimonials,
        SectionType::Faq,
        SectionType::Booking,
        SectionType::Schedule,
        SectionType::Map,
        SectionType::Divider,
        SectionType::Button,
        SectionType::Image,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Hero => "hero",
            SectionType::Text => "text",
            SectionType::ServicesGrid => "services_grid",
            SectionType::DoctorShowcase => "doctor_showcase",
            SectionType::PhotoGallery => "photo_gallery",
            SectionType::ContactInfo => "contact_info",
            SectionType::Testimonials => "testimonials",
            SectionType::Faq => "faq",
            SectionType::Booking => "booking",
            SectionType::Schedule => "schedule",
            SectionType::Map => "map",
            SectionType::Divider => "divider",
            SectionType::Button => "button",
            SectionType::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Recognized presentation variants. The first entry is the default.
    pub fn variants(self) -> &'static [&'static str] {
        match self {
            SectionType::Hero => &["centered", "split", "minimal"],
            SectionType::Text => &["standard", "two_column", "highlighted"],
            SectionType::ServicesGrid => &["cards", "list", "icons"],
            SectionType::DoctorShowcase => &["grid", "carousel", "featured"],
            SectionType::PhotoGallery => &["grid", "carousel", "masonry"],
            SectionType::ContactInfo => &["card", "split", "inline"],
            SectionType::Testimonials => &["carousel", "grid", "single"],
            SectionType::Faq => &["accordion", "list", "two_column"],
            SectionType::Booking => &["form", "cta", "embed"],
            SectionType::Schedule => &["table", "cards", "compact"],
            SectionType::Map => &["embed", "card", "full_width"],
            SectionType::Divider => &["line", "space", "wave"],
            SectionType::Button => &["primary", "secondary", "outline"],
            SectionType::Image => &["full", "contained", "rounded"],
        }
    }

    pub fn default_variant(self) -> &'static str {
        self.variants()[0]
    }

    /// Prefix used for anchor ids, e.g. `services-grid`.
    pub fn anchor_prefix(self) -> String {
        self.as_str().replace('_', "-")
    }
}

/// One content block on a page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawSection")]
pub struct Section {
    pub id: String,
    pub visible: bool,
    /// In-page deep link target. Not required to be unique.
    pub anchor_id: String,
    pub style: Style,
    pub data: SectionData,
}

impl Section {
    pub fn section_type(&self) -> SectionType {
        self.data.section_type()
    }

    pub fn variant(&self) -> &str {
        self.data.variant()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    id: String,
    #[serde(rename = "type")]
    section_type: SectionType,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    anchor_id: String,
    #[serde(default)]
    style: Style,
    #[serde(default)]
    data: Value,
}

impl TryFrom<RawSection> for Section {
    type Error = serde_json::Error;

    fn try_from(raw: RawSection) -> Result<Self, Self::Error> {
        let mut data = match raw.data {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "section {} data must be an object, found {other}",
                    raw.id
                )))
            }
        };
        backfill_section_data(raw.section_type, &mut data);
        Ok(Section {
            id: raw.id,
            visible: raw.visible,
            anchor_id: raw.anchor_id,
            style: raw.style,
            data: SectionData::from_value(raw.section_type, Value::Object(data))?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionRef<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    section_type: SectionType,
    visible: bool,
    anchor_id: &'a str,
    style: &'a Style,
    data: &'a SectionData,
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SectionRef {
            id: &self.id,
            section_type: self.section_type(),
            visible: self.visible,
            anchor_id: &self.anchor_id,
            style: &self.style,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

/// Section payload; the enum arm is the section's type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionData {
    Hero(HeroData),
    Text(TextData),
    ServicesGrid(ServicesGridData),
    DoctorShowcase(DoctorShowcaseData),
    PhotoGallery(PhotoGalleryData),
    ContactInfo(ContactInfoData),
    Testimonials(TestimonialsData),
    Faq(FaqData),
    Booking(BookingData),
    Schedule(ScheduleData),
    Map(MapData),
    Divider(DividerData),
    Button(ButtonData),
    Image(ImageData),
}

impl SectionData {
    /// Decode a `data` object for the given type.
    pub fn from_value(kind: SectionType, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            SectionType::Hero => SectionData::Hero(serde_json::from_value(value)?),
            SectionType::Text => SectionData::Text(serde_json::from_value(value)?),
            SectionType::ServicesGrid => SectionData::ServicesGrid(serde_json::from_value(value)?),
            SectionType::DoctorShowcase => {
                SectionData::DoctorShowcase(serde_json::from_value(value)?)
            }
            SectionType::PhotoGallery => SectionData::PhotoGallery(serde_json::from_value(value)?),
            SectionType::ContactInfo => SectionData::ContactInfo(serde_json::from_value(value)?),
            SectionType::Testimonials => SectionData::Testimonials(serde_json::from_value(value)?),
            SectionType::Faq => SectionData::Faq(serde_json::from_value(value)?),
            SectionType::Booking => SectionData::Booking(serde_json::from_value(value)?),
            SectionType::Schedule => SectionData::Schedule(serde_json::from_value(value)?),
            SectionType::Map => SectionData::Map(serde_json::from_value(value)?),
            SectionType::Divider => SectionData::Divider(serde_json::from_value(value)?),
            SectionType::Button => SectionData::Button(serde_json::from_value(value)?),
            SectionType::Image => SectionData::Image(serde_json::from_value(value)?),
        })
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn section_type(&self) -> SectionType {
        match self {
            SectionData::Hero(_) => SectionType::Hero,
            SectionData::Text(_) => SectionType::Text,
            SectionData::ServicesGrid(_) => SectionType::ServicesGrid,
            SectionData::DoctorShowcase(_) => SectionType::DoctorShowcase,
            SectionData::PhotoGallery(_) => SectionType::PhotoGallery,
            SectionData::ContactInfo(_) => SectionType::ContactInfo,
            SectionData::Testimonials(_) => SectionType::Testimonials,
            SectionData::Faq(_) => SectionType::Faq,
            SectionData::Booking(_) => SectionType::Booking,
            SectionData::Schedule(_) => SectionType::Schedule,
            SectionData::Map(_) => SectionType::Map,
            SectionData::Divider(_) => SectionType::Divider,
            SectionData::Button(_) => SectionType::Button,
            SectionData::Image(_) => SectionType::Image,
        }
    }

    pub fn variant(&self) -> &str {
        match self {
            SectionData::Hero(d) => &d.variant,
            SectionData::Text(d) => &d.variant,
            SectionData::ServicesGrid(d) => &d.variant,
            SectionData::DoctorShowcase(d) => &d.variant,
            SectionData::PhotoGallery(d) => &d.variant,
            SectionData::ContactInfo(d) => &d.variant,
            SectionData::Testimonials(d) => &d.variant,
            SectionData::Faq(d) => &d.variant,
            SectionData::Booking(d) => &d.variant,
            SectionData::Schedule(d) => &d.variant,
            SectionData::Map(d) => &d.variant,
            SectionData::Divider(d) => &d.variant,
            SectionData::Button(d) => &d.variant,
            SectionData::Image(d) => &d.variant,
        }
    }

    pub fn variant_mut(&mut self) -> &mut String {
        match self {
            SectionData::Hero(d) => &mut d.variant,
            SectionData::Text(d) => &mut d.variant,
            SectionData::ServicesGrid(d) => &mut d.variant,
            SectionData::DoctorShowcase(d) => &mut d.variant,
            SectionData::PhotoGallery(d) => &mut d.variant,
            SectionData::ContactInfo(d) => &mut d.variant,
            SectionData::Testimonials(d) => &mut d.variant,
            SectionData::Faq(d) => &mut d.variant,
            SectionData::Booking(d) => &mut d.variant,
            SectionData::Schedule(d) => &mut d.variant,
            SectionData::Map(d) => &mut d.variant,
            SectionData::Divider(d) => &mut d.variant,
            SectionData::Button(d) => &mut d.variant,
            SectionData::Image(d) => &mut d.variant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroData {
    pub variant: String,
    pub heading: LocalizedText,
    pub subheading: LocalizedText,
    pub cta_label: LocalizedText,
    pub cta_href: String,
    pub image_url: Option<String>,
    /// Keys not modelled here, kept so they round-trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextData {
    pub variant: String,
    pub heading: LocalizedText,
    /// Rich-text HTML as returned by the editing widget.
    pub body: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServicesGridData {
    pub variant: String,
    pub heading: LocalizedText,
    pub services: Vec<ServiceItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceItem {
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DoctorShowcaseData {
    pub variant: String,
    pub heading: LocalizedText,
    pub doctors: Vec<DoctorCard>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DoctorCard {
    pub name: String,
    pub specialty: LocalizedText,
    pub photo_url: Option<String>,
    pub bio: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoGalleryData {
    pub variant: String,
    /// Older name for `variant`; the two are kept equal.
    pub layout: String,
    pub heading: LocalizedText,
    pub images: Vec<GalleryImage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PhotoGalleryData {
    /// Make `variant` and `layout` agree, taking `layout` as the source
    /// when `prefer_layout` is set.
    pub fn sync_layout(&mut self, prefer_layout: bool) {
        if prefer_layout && !self.layout.is_empty() {
            self.variant = self.layout.clone();
        } else {
            self.layout = self.variant.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GalleryImage {
    pub url: String,
    pub caption: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInfoData {
    pub variant: String,
    pub heading: LocalizedText,
    pub phone: String,
    pub email: String,
    pub address: LocalizedText,
    pub whatsapp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TestimonialsData {
    pub variant: String,
    pub heading: LocalizedText,
    pub testimonials: Vec<Testimonial>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Testimonial {
    pub author: String,
    pub quote: LocalizedText,
    /// 1..=5, 0 when unrated.
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqData {
    pub variant: String,
    pub heading: LocalizedText,
    pub items: Vec<FaqItem>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FaqItem {
    pub question: LocalizedText,
    pub answer: LocalizedText,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingData {
    pub variant: String,
    pub heading: LocalizedText,
    pub description: LocalizedText,
    pub button_label: LocalizedText,
    pub booking_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleData {
    pub variant: String,
    pub heading: LocalizedText,
    pub hours: Vec<OpeningHours>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpeningHours {
    pub day: LocalizedText,
    /// `HH:MM`, local time.
    pub opens: String,
    pub closes: String,
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapData {
    pub variant: String,
    pub address: LocalizedText,
    pub embed_url: Option<String>,
    pub zoom: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DividerData {
    pub variant: String,
    pub spacing: Spacing,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ButtonData {
    pub variant: String,
    pub label: LocalizedText,
    pub href: String,
    pub alignment: Alignment,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageData {
    pub variant: String,
    pub url: Option<String>,
    pub alt: LocalizedText,
    pub caption: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}
