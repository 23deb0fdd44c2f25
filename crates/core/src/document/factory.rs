//! Factories for structurally valid sections, pages and documents.
//!
//! Every section type has exactly one factory function below;
//! [`create_section`] dispatches on the type and is where a new section
//! type gets wired in.

use chrono::Utc;

use super::id::{anchor_for, new_page_id, new_section_id};
use super::model::{
    Document, Footer, LocalizedText, Navbar, Page, Spacing, Style, StylePreset, CURRENT_VERSION,
    HOME_SLUG,
};
use super::section::*;

fn t(en: &str, ar: &str) -> LocalizedText {
    LocalizedText::pair(en, ar)
}

/// Build a complete default section of the given type with a fresh id.
pub fn create_section(kind: SectionType) -> Section {
    let data = match kind {
        SectionType::Hero => hero(),
        SectionType::Text => text(),
        SectionType::ServicesGrid => services_grid(),
        SectionType::DoctorShowcase => doctor_showcase(),
        SectionType::PhotoGallery => photo_gallery(),
        SectionType::ContactInfo => contact_info(),
        SectionType::Testimonials => testimonials(),
        SectionType::Faq => faq(),
        SectionType::Booking => booking(),
        SectionType::Schedule => schedule(),
        SectionType::Map => map(),
        SectionType::Divider => divider(),
        SectionType::Button => button(),
        SectionType::Image => image(),
    };
    let id = new_section_id();
    Section {
        anchor_id: anchor_for(&kind.anchor_prefix(), &id),
        id,
        visible: true,
        style: Style::default(),
        data,
    }
}

fn hero() -> SectionData {
    SectionData::Hero(HeroData {
        variant: SectionType::Hero.default_variant().into(),
        heading: t("Welcome to our clinic", "مرحباً بكم في عيادتنا"),
        subheading: t(
            "Compassionate care for the whole family",
            "رعاية متكاملة لجميع أفراد الأسرة",
        ),
        cta_label: t("Book an appointment", "احجز موعداً"),
        cta_href: "#booking".into(),
        image_url: None,
        ..Default::default()
    })
}

fn text() -> SectionData {
    SectionData::Text(TextData {
        variant: SectionType::Text.default_variant().into(),
        heading: t("About us", "من نحن"),
        body: t(
            "<p>Tell your patients who you are and what you stand for.</p>",
            "<p>عرّف مرضاك بك وبقيمك.</p>",
        ),
        ..Default::default()
    })
}

fn services_grid() -> SectionData {
    let item = |en: &str, ar: &str, icon: &str| ServiceItem {
        title: t(en, ar),
        description: t("Describe this service.", "صف هذه الخدمة."),
        icon: icon.into(),
    };
    SectionData::ServicesGrid(ServicesGridData {
        variant: SectionType::ServicesGrid.default_variant().into(),
        heading: t("Our services", "خدماتنا"),
        services: vec![
            item("General consultation", "استشارة عامة", "stethoscope"),
            item("Laboratory tests", "تحاليل مخبرية", "flask"),
            item("Vaccinations", "التطعيمات", "syringe"),
        ],
        ..Default::default()
    })
}

fn doctor_showcase() -> SectionData {
    SectionData::DoctorShowcase(DoctorShowcaseData {
        variant: SectionType::DoctorShowcase.default_variant().into(),
        heading: t("Meet our doctors", "تعرّف على أطبائنا"),
        doctors: vec![DoctorCard {
            name: "Dr. Jane Doe".into(),
            specialty: t("General practitioner", "طبيب عام"),
            photo_url: None,
            bio: t("A short biography.", "نبذة قصيرة."),
        }],
        ..Default::default()
    })
}

fn photo_gallery() -> SectionData {
    let variant = SectionType::PhotoGallery.default_variant();
    SectionData::PhotoGallery(PhotoGalleryData {
        variant: variant.into(),
        layout: variant.into(),
        heading: t("Our clinic", "عيادتنا"),
        images: Vec::new(),
        ..Default::default()
    })
}

fn contact_info() -> SectionData {
    SectionData::ContactInfo(ContactInfoData {
        variant: SectionType::ContactInfo.default_variant().into(),
        heading: t("Contact us", "تواصل معنا"),
        phone: String::new(),
        email: String::new(),
        address: t("Street, City", "الشارع، المدينة"),
        whatsapp: None,
        ..Default::default()
    })
}

fn testimonials() -> SectionData {
    SectionData::Testimonials(TestimonialsData {
        variant: SectionType::Testimonials.default_variant().into(),
        heading: t("What our patients say", "ماذا يقول مرضانا"),
        testimonials: vec![Testimonial {
            author: "A happy patient".into(),
            quote: t("Friendly staff and great care.", "طاقم ودود ورعاية ممتازة."),
            rating: 5,
        }],
        ..Default::default()
    })
}

fn faq() -> SectionData {
    SectionData::Faq(FaqData {
        variant: SectionType::Faq.default_variant().into(),
        heading: t("Frequently asked questions", "الأسئلة الشائعة"),
        items: vec![FaqItem {
            question: t("Do I need an appointment?", "هل أحتاج إلى موعد؟"),
            answer: t(
                "Walk-ins are welcome, but appointments are seen first.",
                "نرحب بالزيارات دون موعد، لكن الأولوية للمواعيد.",
            ),
        }],
        ..Default::default()
    })
}

fn booking() -> SectionData {
    SectionData::Booking(BookingData {
        variant: SectionType::Booking.default_variant().into(),
        heading: t("Book a visit", "احجز زيارة"),
        description: t("Pick a time that suits you.", "اختر الوقت المناسب لك."),
        button_label: t("Book now", "احجز الآن"),
        booking_url: None,
        ..Default::default()
    })
}

fn schedule() -> SectionData {
    let day = |en: &str, ar: &str, closed: bool| OpeningHours {
        day: t(en, ar),
        opens: if closed { String::new() } else { "09:00".into() },
        closes: if closed { String::new() } else { "17:00".into() },
        closed,
    };
    SectionData::Schedule(ScheduleData {
        variant: SectionType::Schedule.default_variant().into(),
        heading: t("Opening hours", "ساعات العمل"),
        hours: vec![
            day("Monday – Friday", "الاثنين – الجمعة", false),
            day("Saturday", "السبت", false),
            day("Sunday", "الأحد", true),
        ],
        ..Default::default()
    })
}

fn map() -> SectionData {
    SectionData::Map(MapData {
        variant: SectionType::Map.default_variant().into(),
        address: t("Street, City", "الشارع، المدينة"),
        embed_url: None,
        zoom: 15,
        ..Default::default()
    })
}

fn divider() -> SectionData {
    SectionData::Divider(DividerData {
        variant: SectionType::Divider.default_variant().into(),
        spacing: Spacing::Medium,
        ..Default::default()
    })
}

fn button() -> SectionData {
    SectionData::Button(ButtonData {
        variant: SectionType::Button.default_variant().into(),
        label: t("Learn more", "اعرف المزيد"),
        href: "#".into(),
        alignment: Alignment::Center,
        ..Default::default()
    })
}

fn image() -> SectionData {
    SectionData::Image(ImageData {
        variant: SectionType::Image.default_variant().into(),
        url: None,
        alt: t("Image", "صورة"),
        caption: LocalizedText::default(),
        ..Default::default()
    })
}

/// A non-home page with no sections.
pub fn create_page(
    slug: impl Into<String>,
    title: impl Into<String>,
    title_localized: LocalizedText,
) -> Page {
    Page {
        id: new_page_id(),
        slug: slug.into(),
        title: title.into(),
        title_localized,
        sections: Vec::new(),
        is_home_page: false,
        visible: true,
    }
}

pub fn create_home_page(sections: Vec<Section>) -> Page {
    Page {
        is_home_page: true,
        sections,
        ..create_page(HOME_SLUG, "Home", t("Home", "الرئيسية"))
    }
}

/// Version-2 document with a single empty home page, not yet published.
pub fn create_empty_document() -> Document {
    Document {
        version: CURRENT_VERSION,
        enabled: false,
        style_preset: StylePreset::default(),
        navbar: Navbar::default(),
        footer: Footer::default(),
        pages: vec![create_home_page(Vec::new())],
        template_id: None,
        updated_at: Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::SECONDARY_LOCALE;
    use crate::document::validate::validate_document;

    #[test]
    fn every_type_gets_its_default_variant() {
        for kind in SectionType::ALL {
            let section = create_section(kind);
            assert_eq!(section.section_type(), kind);
            assert_eq!(section.variant(), kind.default_variant());
            assert!(section.visible);
            assert!(section.anchor_id.starts_with(&kind.anchor_prefix()));
        }
    }

    #[test]
    fn placeholder_copy_is_bilingual() {
        let SectionData::Hero(hero) = create_section(SectionType::Hero).data else {
            panic!("hero factory returned another type");
        };
        let locales: Vec<_> = hero.heading.locales().collect();
        assert!(locales.contains(&"en"));
        assert!(locales.contains(&SECONDARY_LOCALE));
    }

    #[test]
    fn gallery_layout_matches_variant() {
        let SectionData::PhotoGallery(gallery) = create_section(SectionType::PhotoGallery).data
        else {
            panic!("gallery factory returned another type");
        };
        assert_eq!(gallery.variant, "grid");
        assert_eq!(gallery.layout, "grid");
    }

    #[test]
    fn empty_document_has_one_home_page() {
        let a = create_empty_document();
        let b = create_empty_document();

        assert_eq!(a.version, CURRENT_VERSION);
        assert!(!a.enabled);
        assert!(a.navbar.links.is_empty());
        assert_eq!(a.pages.len(), 1);
        assert!(a.pages[0].is_home_page);
        assert_eq!(a.pages[0].slug, "home");
        assert!(a.pages[0].sections.is_empty());
        assert_ne!(a.pages[0].id, b.pages[0].id);
        assert_eq!(validate_document(&a), Ok(()));
    }
}
