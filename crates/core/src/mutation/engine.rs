//! # Mutation Engine
//!
//! Every structural edit goes through [`Editor`]. An edit never touches the
//! current document in place: it builds the next document from a copy of
//! the previous one, records the previous snapshot for undo and installs
//! the result.
//!
//! Edits that would break an invariant, or that reference something that
//! does not exist, are ignored. The methods return nothing;
//! [`Editor::dispatch`] reports whether a command took effect.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::document::factory::{create_empty_document, create_page, create_section};
use crate::document::id::{duplicate_anchor, fresh_id, new_page_id, new_section_id, unique_slug};
use crate::document::migrate::{ensure_latest, MigrationError};
use crate::document::model::{
    Document, Footer, LocalizedText, Navbar, Page, StylePreset, HOME_SLUG,
};
use crate::document::section::{SectionData, SectionType};
use crate::events::{EditorEvent, EventBus};

use super::history::History;
use super::types::{Mutation, MutationOutcome, SectionPatch};

/// Editor state shared between the UI side and the autosave task.
pub type SharedEditor = Arc<Mutex<Editor>>;

#[derive(Debug)]
pub struct Editor {
    document: Arc<Document>,
    selected_page_id: Option<String>,
    selected_section_id: Option<String>,
    history: History,
    /// Document differs from the last successfully persisted copy.
    dirty: bool,
    /// Bumped on every change to `document`.
    revision: u64,
    events: Option<EventBus>,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        let mut editor = Self {
            document: Arc::new(document),
            selected_page_id: None,
            selected_section_id: None,
            history: History::new(),
            dirty: false,
            revision: 0,
            events: None,
        };
        editor.select_home_page();
        editor
    }

    /// Start from a stored document of any supported vintage, or an empty
    /// document when nothing is stored.
    pub fn from_stored(raw: Option<Value>) -> Result<Self, MigrationError> {
        let document = ensure_latest(raw)?.unwrap_or_else(create_empty_document);
        Ok(Self::new(document))
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Publish [`EditorEvent::DocumentChanged`] on `bus` after every change.
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn into_shared(self) -> SharedEditor {
        Arc::new(Mutex::new(self))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Cheap handle on the current document.
    pub fn snapshot(&self) -> Arc<Document> {
        Arc::clone(&self.document)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected_page_id(&self) -> Option<&str> {
        self.selected_page_id.as_deref()
    }

    pub fn selected_section_id(&self) -> Option<&str> {
        self.selected_section_id.as_deref()
    }

    pub fn selected_page(&self) -> Option<&Page> {
        self.selected_page_id
            .as_deref()
            .and_then(|id| self.document.page(id))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Replace the document wholesale, dropping history. The loaded
    /// document is considered persisted.
    pub fn load(&mut self, document: Document) {
        self.document = Arc::new(document);
        self.history.clear();
        self.dirty = false;
        self.selected_section_id = None;
        self.select_home_page();
        self.changed();
    }

    /// Record a successful save of `revision`. The dirty flag is cleared
    /// only if nothing was edited since that revision was taken.
    pub fn mark_saved(&mut self, revision: u64, updated_at: &str) {
        Arc::make_mut(&mut self.document).updated_at = updated_at.to_string();
        if revision == self.revision {
            self.dirty = false;
        }
    }

    pub fn select_page(&mut self, id: &str) {
        if self.document.page(id).is_some() {
            self.selected_page_id = Some(id.to_string());
            self.selected_section_id = None;
        }
    }

    pub fn select_section(&mut self, id: Option<&str>) {
        match id {
            Some(id) if self.selected_page().is_some_and(|p| p.section(id).is_some()) => {
                self.selected_section_id = Some(id.to_string());
            }
            Some(_) => {}
            None => self.selected_section_id = None,
        }
    }

    /// Apply a command, reporting whether it changed the document.
    pub fn dispatch(&mut self, mutation: Mutation) -> MutationOutcome {
        let before = self.revision;
        match mutation {
            Mutation::AddPage {
                slug,
                title,
                title_localized,
            } => self.add_page(&slug, &title, title_localized),
            Mutation::RemovePage { id } => self.remove_page(&id),
            Mutation::RenamePage {
                id,
                title,
                title_localized,
            } => self.rename_page(&id, &title, title_localized),
            Mutation::UpdatePageSlug { id, slug } => self.update_page_slug(&id, &slug),
            Mutation::TogglePageVisibility { id } => self.toggle_page_visibility(&id),
            Mutation::AddSection {
                section_type,
                index,
            } => self.add_section(section_type, index),
            Mutation::RemoveSection { id } => self.remove_section(&id),
            Mutation::DuplicateSection { id } => self.duplicate_section(&id),
            Mutation::MoveSection {
                from_index,
                to_index,
            } => self.move_section(from_index, to_index),
            Mutation::UpdateSection { id, patch } => self.update_section(&id, patch),
            Mutation::UpdateSectionData { id, data } => self.update_section_data(&id, data),
            Mutation::ToggleSectionVisibility { id } => self.toggle_section_visibility(&id),
            Mutation::SetNavbar { navbar } => self.set_navbar(navbar),
            Mutation::SetFooter { footer } => self.set_footer(footer),
            Mutation::SetStylePreset { preset } => self.set_style_preset(preset),
            Mutation::SetEnabled { enabled } => self.set_enabled(enabled),
            Mutation::ApplyTemplate { document } => self.apply_template(*document),
        }
        if self.revision == before {
            MutationOutcome::Ignored
        } else {
            MutationOutcome::Applied
        }
    }

    // Pages

    /// Append an empty page and select it. A taken slug gets a numeric
    /// suffix.
    pub fn add_page(&mut self, slug: &str, title: &str, title_localized: LocalizedText) {
        let slug = slug.trim();
        if slug.is_empty() {
            return;
        }
        let doc = &self.document;
        let slug = unique_slug(slug, |s| doc.page_by_slug(s).is_some() || s == HOME_SLUG);
        let mut page = create_page(slug, title, title_localized);
        page.id = fresh_id(new_page_id, |id| doc.page(id).is_some());
        let page_id = page.id.clone();

        if self.edit("add_page", |next| {
            next.pages.push(page);
            true
        }) {
            self.selected_page_id = Some(page_id);
            self.selected_section_id = None;
        }
    }

    /// Remove a page. The home page cannot be removed.
    pub fn remove_page(&mut self, id: &str) {
        if !self.document.page(id).is_some_and(|p| !p.is_home_page) {
            return;
        }
        if self.edit("remove_page", |next| {
            next.pages.retain(|p| p.id != id);
            true
        }) && self.selected_page_id.as_deref() == Some(id)
        {
            self.selected_section_id = None;
            self.select_home_page();
        }
    }

    pub fn rename_page(&mut self, id: &str, title: &str, title_localized: Option<LocalizedText>) {
        self.edit("rename_page", |next| {
            let Some(page) = next.page_mut(id) else {
                return false;
            };
            page.title = title.to_string();
            if let Some(localized) = title_localized {
                page.title_localized = localized;
            }
            true
        });
    }

    /// Change a page's slug. Taken slugs and slug changes on the home page
    /// are ignored.
    pub fn update_page_slug(&mut self, id: &str, slug: &str) {
        let slug = slug.trim();
        let doc = &self.document;
        let valid = !slug.is_empty()
            && doc.page(id).is_some_and(|p| !p.is_home_page)
            && slug != HOME_SLUG
            && doc.page_by_slug(slug).is_none();
        if !valid {
            return;
        }
        self.edit("update_page_slug", |next| {
            next.page_mut(id)
                .map(|page| page.slug = slug.to_string())
                .is_some()
        });
    }

    pub fn toggle_page_visibility(&mut self, id: &str) {
        self.edit("toggle_page_visibility", |next| {
            next.page_mut(id)
                .map(|page| page.visible = !page.visible)
                .is_some()
        });
    }

    // Sections, scoped to the selected page

    /// Insert a default section at `index` (clamped), or append, and
    /// select it.
    pub fn add_section(&mut self, kind: SectionType, index: Option<usize>) {
        let Some(page) = self.selected_page() else {
            return;
        };
        let mut section = create_section(kind);
        if page.section(&section.id).is_some() {
            section.id = fresh_id(new_section_id, |id| page.section(id).is_some());
        }
        let section_id = section.id.clone();

        if self.edit_selected_page("add_section", |page| {
            let at = index.map_or(page.sections.len(), |i| i.min(page.sections.len()));
            page.sections.insert(at, section);
            true
        }) {
            self.selected_section_id = Some(section_id);
        }
    }

    pub fn remove_section(&mut self, id: &str) {
        if self.edit_selected_page("remove_section", |page| {
            let before = page.sections.len();
            page.sections.retain(|s| s.id != id);
            page.sections.len() != before
        }) && self.selected_section_id.as_deref() == Some(id)
        {
            self.selected_section_id = None;
        }
    }

    /// Insert a copy right after the original with a new id and the anchor
    /// suffixed by [`DUPLICATE_ANCHOR_SUFFIX`](crate::document::id::DUPLICATE_ANCHOR_SUFFIX).
    pub fn duplicate_section(&mut self, id: &str) {
        self.edit_selected_page("duplicate_section", |page| {
            let Some(index) = page.section_index(id) else {
                return false;
            };
            let mut copy = page.sections[index].clone();
            copy.id = fresh_id(new_section_id, |candidate| page.section(candidate).is_some());
            copy.anchor_id = duplicate_anchor(&copy.anchor_id);
            page.sections.insert(index + 1, copy);
            true
        });
    }

    pub fn move_section(&mut self, from_index: usize, to_index: usize) {
        if from_index == to_index {
            return;
        }
        self.edit_selected_page("move_section", |page| {
            let len = page.sections.len();
            if from_index >= len || to_index >= len {
                return false;
            }
            let section = page.sections.remove(from_index);
            page.sections.insert(to_index, section);
            true
        });
    }

    /// Merge top-level fields into a section.
    pub fn update_section(&mut self, id: &str, patch: SectionPatch) {
        self.edit_selected_page("update_section", |page| {
            let Some(section) = page.sections.iter_mut().find(|s| s.id == id) else {
                return false;
            };
            if let Some(visible) = patch.visible {
                section.visible = visible;
            }
            if let Some(anchor_id) = patch.anchor_id {
                section.anchor_id = anchor_id;
            }
            if let Some(style) = patch.style {
                section.style = style;
            }
            true
        });
    }

    /// Shallow-merge `patch` into a section's `data`. A merge that no
    /// longer decodes as the section's type, or that blanks the variant,
    /// is ignored.
    pub fn update_section_data(&mut self, id: &str, patch: Map<String, Value>) {
        if patch.contains_key("type") {
            return;
        }
        self.edit_selected_page("update_section_data", |page| {
            let Some(section) = page.sections.iter_mut().find(|s| s.id == id) else {
                return false;
            };
            let kind = section.section_type();
            let Ok(Value::Object(mut merged)) = section.data.to_value() else {
                return false;
            };
            let layout_only = patch.contains_key("layout") && !patch.contains_key("variant");
            merged.extend(patch);

            let mut data = match SectionData::from_value(kind, Value::Object(merged)) {
                Ok(data) => data,
                Err(err) => {
                    debug!(section_id = id, error = %err, "section data patch rejected");
                    return false;
                }
            };
            if let SectionData::PhotoGallery(gallery) = &mut data {
                gallery.sync_layout(layout_only);
            }
            if data.variant().is_empty() {
                return false;
            }
            section.data = data;
            true
        });
    }

    pub fn toggle_section_visibility(&mut self, id: &str) {
        self.edit_selected_page("toggle_section_visibility", |page| {
            page.sections
                .iter_mut()
                .find(|s| s.id == id)
                .map(|s| s.visible = !s.visible)
                .is_some()
        });
    }

    // Site chrome

    pub fn set_navbar(&mut self, navbar: Navbar) {
        self.edit("set_navbar", |next| {
            next.navbar = navbar;
            true
        });
    }

    pub fn set_footer(&mut self, footer: Footer) {
        self.edit("set_footer", |next| {
            next.footer = footer;
            true
        });
    }

    pub fn set_style_preset(&mut self, preset: StylePreset) {
        self.edit("set_style_preset", |next| {
            next.style_preset = preset;
            true
        });
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.edit("set_enabled", |next| {
            next.enabled = enabled;
            true
        });
    }

    /// Replace the whole document with a template's output, undoably.
    pub fn apply_template(&mut self, document: Document) {
        if self.commit("apply_template", document) {
            self.selected_section_id = None;
            self.select_home_page();
        }
    }

    // History

    pub fn undo(&mut self) {
        let current = Arc::clone(&self.document);
        let Some(previous) = self.history.undo(current) else {
            return;
        };
        self.restore(previous);
        debug!(revision = self.revision, "undo");
    }

    pub fn redo(&mut self) {
        let current = Arc::clone(&self.document);
        let Some(next) = self.history.redo(current) else {
            return;
        };
        self.restore(next);
        debug!(revision = self.revision, "redo");
    }

    fn restore(&mut self, snapshot: Arc<Document>) {
        self.document = snapshot;
        self.dirty = true;
        self.repair_selection();
        self.changed();
    }

    // Internals

    /// Build the next document from a copy of the current one. `edit`
    /// returns false to abandon the change.
    fn edit(&mut self, op: &'static str, edit: impl FnOnce(&mut Document) -> bool) -> bool {
        let mut next = Document::clone(&self.document);
        if !edit(&mut next) {
            trace!(op, "mutation ignored");
            return false;
        }
        self.commit(op, next)
    }

    fn edit_selected_page(&mut self, op: &'static str, edit: impl FnOnce(&mut Page) -> bool) -> bool {
        let Some(page_id) = self.selected_page_id.clone() else {
            trace!(op, "mutation ignored, no page selected");
            return false;
        };
        self.edit(op, |next| next.page_mut(&page_id).is_some_and(edit))
    }

    /// Install `next` as the current document. Every edit that got this
    /// far is recorded, even one that leaves the document equal, so `n`
    /// edits are always undone by `n` undos.
    fn commit(&mut self, op: &'static str, next: Document) -> bool {
        let previous = std::mem::replace(&mut self.document, Arc::new(next));
        self.history.record(previous);
        self.dirty = true;
        self.changed();
        debug!(op, revision = self.revision, "mutation applied");
        true
    }

    fn changed(&mut self) {
        self.revision += 1;
        if let Some(bus) = &self.events {
            bus.emit(EditorEvent::DocumentChanged {
                revision: self.revision,
            });
        }
    }

    fn select_home_page(&mut self) {
        self.selected_page_id = self.document.home_page().map(|p| p.id.clone());
    }

    fn repair_selection(&mut self) {
        let page = self
            .selected_page_id
            .as_deref()
            .and_then(|id| self.document.page(id));
        match page {
            None => {
                self.selected_section_id = None;
                self.select_home_page();
            }
            Some(page) => {
                if let Some(section_id) = self.selected_section_id.as_deref() {
                    if page.section(section_id).is_none() {
                        self.selected_section_id = None;
                    }
                }
            }
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(create_empty_document())
    }
}
