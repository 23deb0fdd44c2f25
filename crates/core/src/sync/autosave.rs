//! # Autosave
//!
//! Watches the editor for changes and persists the document after edits
//! settle.
//!
//! - A change while the editor is dirty (re)starts the debounce timer, so a
//!   burst of edits produces one write after the burst goes quiet.
//! - At most one write is in flight. Starting a save cancels the previous
//!   one, so an older write can never land after a newer one.
//! - A cancelled write leaves the status alone. A failed write sets
//!   [`SaveStatus::Error`] until the next attempt. A successful write shows
//!   [`SaveStatus::Saved`] for a short window, then returns to idle.
//! - Shutdown (or dropping [`Autosave`]) clears the timer and cancels any
//!   in-flight write.
//!
//! The editor lock and the synchronizer's state lock are never held at the
//! same time, so callers may query [`Autosave::status`] while holding the
//! editor.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::events::{EditorEvent, EventBus, SaveEvent};
use crate::mutation::SharedEditor;

use super::status::{SaveOutcome, SaveStatus};
use super::transport::{SaveTransport, SavedDocument, SyncError};

#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    /// Quiet period after the last edit before writing.
    pub debounce: Duration,
    /// How long `Saved` is shown before reverting to `Idle`.
    pub saved_display: Duration,
}

impl AutosaveConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_saved_display(mut self, saved_display: Duration) -> Self {
        self.saved_display = saved_display;
        self
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(3000),
            saved_display: Duration::from_secs(2),
        }
    }
}

/// Owns the autosave tasks for one editing session.
pub struct Autosave {
    shared: Arc<Shared>,
    watcher: JoinHandle<()>,
    shutdown: CancellationToken,
}

struct Shared {
    editor: SharedEditor,
    transport: Arc<dyn SaveTransport>,
    config: AutosaveConfig,
    events: EventBus,
    state: Mutex<SyncState>,
}

#[derive(Default)]
struct SyncState {
    status: SaveStatus,
    last_error: Option<String>,
    /// Pending debounce timer and its sequence number.
    timer: Option<JoinHandle<()>>,
    timer_seq: u64,
    in_flight: Option<CancellationToken>,
    /// Pending `Saved` -> `Idle` revert.
    revert: Option<JoinHandle<()>>,
    closed: bool,
}

impl Autosave {
    /// Start watching `events` for changes to `editor`. The editor must
    /// publish on the same bus (see [`Editor::with_events`](crate::mutation::Editor::with_events)).
    pub fn spawn(
        editor: SharedEditor,
        transport: impl SaveTransport,
        config: AutosaveConfig,
        events: EventBus,
    ) -> Self {
        Self::spawn_shared(editor, Arc::new(transport), config, events)
    }

    pub fn spawn_shared(
        editor: SharedEditor,
        transport: Arc<dyn SaveTransport>,
        config: AutosaveConfig,
        events: EventBus,
    ) -> Self {
        let mut rx = events.subscribe();
        let shared = Arc::new(Shared {
            editor,
            transport,
            config,
            events,
            state: Mutex::new(SyncState::default()),
        });
        let shutdown = CancellationToken::new();

        let watcher = {
            let shared = Arc::clone(&shared);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                shared.schedule();
                loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        event = rx.recv() => match event {
                            Ok(EditorEvent::DocumentChanged { .. }) => shared.schedule(),
                            Ok(_) => {}
                            Err(RecvError::Lagged(skipped)) => {
                                trace!(skipped, "autosave watcher lagged");
                                shared.schedule();
                            }
                            Err(RecvError::Closed) => break,
                        },
                    }
                }
            })
        };

        Self {
            shared,
            watcher,
            shutdown,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.shared.state.lock().status
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.shared.state.lock().last_error.clone()
    }

    /// Whether a debounce timer is pending.
    pub fn is_scheduled(&self) -> bool {
        self.shared.state.lock().timer.is_some()
    }

    /// Save right away, cancelling any pending timer and superseding any
    /// in-flight write.
    pub async fn save_now(&self) -> SaveOutcome {
        self.shared.save().await
    }

    /// Stop watching, clear the timer and cancel any in-flight write.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.watcher.abort();
        let mut state = self.shared.state.lock();
        state.closed = true;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        if let Some(revert) = state.revert.take() {
            revert.abort();
        }
        if let Some(in_flight) = state.in_flight.take() {
            in_flight.cancel();
        }
        trace!("autosave shut down");
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Shared {
    /// Restart the debounce timer if the editor is dirty.
    fn schedule(self: &Arc<Self>) {
        if !self.editor.lock().is_dirty() {
            return;
        }
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.timer_seq += 1;
        let seq = state.timer_seq;
        let shared = Arc::clone(self);
        let debounce = self.config.debounce;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            shared.fire(seq).await;
        }));
        trace!(debounce_ms = debounce.as_millis() as u64, "autosave scheduled");
    }

    async fn fire(self: Arc<Self>, seq: u64) {
        {
            let mut state = self.state.lock();
            if state.timer_seq != seq || state.closed {
                return;
            }
            // Detach so a later reschedule cannot abort this save.
            state.timer = None;
        }
        if !self.editor.lock().is_dirty() {
            return;
        }
        self.save().await;
    }

    async fn save(self: &Arc<Self>) -> SaveOutcome {
        let (document, revision) = {
            let editor = self.editor.lock();
            (editor.snapshot(), editor.revision())
        };

        let token = CancellationToken::new();
        {
            let mut state = self.state.lock();
            if state.closed {
                return SaveOutcome::Cancelled;
            }
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            if let Some(revert) = state.revert.take() {
                revert.abort();
            }
            if let Some(previous) = state.in_flight.replace(token.clone()) {
                trace!("superseding in-flight save");
                previous.cancel();
            }
            self.set_status(&mut state, SaveStatus::Saving);
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = self.transport.save(&document) => Some(result),
        };
        self.finish(&token, revision, result)
    }

    fn finish(
        self: &Arc<Self>,
        token: &CancellationToken,
        revision: u64,
        result: Option<Result<SavedDocument, SyncError>>,
    ) -> SaveOutcome {
        let result = match result {
            Some(result) if !token.is_cancelled() => result,
            _ => {
                trace!(revision, "save cancelled");
                return SaveOutcome::Cancelled;
            }
        };
        // The write landed, so recording it is correct even if a newer save
        // starts before the state lock is taken below.
        if let Ok(saved) = &result {
            self.editor.lock().mark_saved(revision, &saved.updated_at);
        }

        let mut state = self.state.lock();
        if token.is_cancelled() {
            trace!(revision, "save superseded after completing");
            return SaveOutcome::Cancelled;
        }
        state.in_flight = None;

        match result {
            Ok(saved) => {
                state.last_error = None;
                self.set_status(&mut state, SaveStatus::Saved);
                self.events.emit(EditorEvent::Saved(SaveEvent {
                    revision,
                    updated_at: saved.updated_at.clone(),
                    timestamp: Utc::now(),
                }));
                info!(revision, updated_at = %saved.updated_at, "document saved");

                let shared = Arc::clone(self);
                let display = self.config.saved_display;
                state.revert = Some(tokio::spawn(async move {
                    tokio::time::sleep(display).await;
                    let mut state = shared.state.lock();
                    if state.status == SaveStatus::Saved {
                        shared.set_status(&mut state, SaveStatus::Idle);
                    }
                    state.revert = None;
                }));
                SaveOutcome::Saved(saved)
            }
            Err(err) => {
                warn!(revision, error = %err, "autosave failed");
                state.last_error = Some(err.to_string());
                self.set_status(&mut state, SaveStatus::Error);
                self.events.emit(EditorEvent::SaveFailed {
                    message: err.to_string(),
                });
                SaveOutcome::Failed(err)
            }
        }
    }

    fn set_status(&self, state: &mut SyncState, status: SaveStatus) {
        if state.status != status {
            state.status = status;
            self.events.emit(EditorEvent::SaveStatusChanged { status });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::section::SectionType;
    use crate::mutation::Editor;
    use crate::sync::transport::MemoryTransport;
    use tokio::time::{sleep, Instant};

    struct Session {
        editor: SharedEditor,
        transport: Arc<MemoryTransport>,
        autosave: Autosave,
    }

    fn session(transport: MemoryTransport) -> Session {
        let bus = EventBus::new(256);
        let editor = Editor::default().with_events(bus.clone()).into_shared();
        let transport = Arc::new(transport);
        let autosave = Autosave::spawn_shared(
            Arc::clone(&editor),
            Arc::clone(&transport) as Arc<dyn SaveTransport>,
            AutosaveConfig::default(),
            bus,
        );
        Session {
            editor,
            transport,
            autosave,
        }
    }

    fn edit(editor: &SharedEditor) {
        editor.lock().add_section(SectionType::Text, None);
    }

    #[tokio::test(start_paused = true)]
    async fn clean_editor_schedules_nothing() {
        let s = session(MemoryTransport::new());
        sleep(Duration::from_secs(10)).await;
        assert!(!s.autosave.is_scheduled());
        assert_eq!(s.transport.attempts(), 0);
        assert_eq!(s.autosave.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_is_saved_after_debounce() {
        let s = session(MemoryTransport::new());
        let start = Instant::now();
        edit(&s.editor);

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(s.transport.attempts(), 0);
        assert!(s.autosave.is_scheduled());

        sleep(Duration::from_millis(2)).await;
        assert_eq!(s.transport.attempts(), 1);
        let waited = s.transport.attempt_times()[0] - start;
        assert!(waited >= Duration::from_millis(3000) && waited < Duration::from_millis(3002));
        assert_eq!(s.autosave.status(), SaveStatus::Saved);
        assert!(!s.editor.lock().is_dirty());

        let saved = s.transport.last_saved().unwrap();
        assert_eq!(s.editor.lock().document().updated_at, saved.updated_at);
    }

    #[tokio::test(start_paused = true)]
    async fn saved_status_reverts_to_idle() {
        let s = session(MemoryTransport::new());
        edit(&s.editor);
        sleep(Duration::from_millis(3001)).await;
        assert_eq!(s.autosave.status(), SaveStatus::Saved);

        sleep(Duration::from_millis(1990)).await;
        assert_eq!(s.autosave.status(), SaveStatus::Saved);
        sleep(Duration::from_millis(20)).await;
        assert_eq!(s.autosave.status(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_sticky_and_keeps_edits() {
        let transport = MemoryTransport::new();
        transport.fail_next(1);
        let s = session(transport);
        edit(&s.editor);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(s.autosave.status(), SaveStatus::Error);
        assert!(s.autosave.last_error().unwrap().contains("injected failure"));
        assert!(s.editor.lock().is_dirty());
        assert_eq!(s.editor.lock().selected_page().unwrap().sections.len(), 1);

        assert!(s.autosave.save_now().await.is_saved());
        assert_eq!(s.autosave.status(), SaveStatus::Saved);
        assert_eq!(s.autosave.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn save_now_cancels_pending_timer() {
        let s = session(MemoryTransport::new());
        edit(&s.editor);
        sleep(Duration::from_millis(1)).await;
        assert!(s.autosave.is_scheduled());

        assert!(s.autosave.save_now().await.is_saved());
        assert!(!s.autosave.is_scheduled());

        sleep(Duration::from_secs(10)).await;
        assert_eq!(s.transport.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_during_save_stay_dirty_and_are_saved_next() {
        let s = session(MemoryTransport::with_latency(Duration::from_millis(500)));
        edit(&s.editor);
        sleep(Duration::from_millis(3100)).await;
        assert_eq!(s.autosave.status(), SaveStatus::Saving);

        edit(&s.editor);
        sleep(Duration::from_millis(500)).await;
        // First write landed, but the newer edit is not in it.
        assert_eq!(s.transport.completed(), 1);
        assert!(s.editor.lock().is_dirty());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(s.transport.completed(), 2);
        assert!(!s.editor.lock().is_dirty());
        assert_eq!(
            s.transport.last_saved().unwrap().pages[0].sections.len(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_in_flight_write() {
        let s = session(MemoryTransport::with_latency(Duration::from_secs(1)));
        edit(&s.editor);
        sleep(Duration::from_millis(3100)).await;
        assert_eq!(s.transport.attempts(), 1);

        s.autosave.shutdown();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(s.transport.abandoned(), 1);
        assert_eq!(s.transport.completed(), 0);
        assert_eq!(s.autosave.status(), SaveStatus::Saving);
        assert!(s.editor.lock().is_dirty());

        edit(&s.editor);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(s.transport.attempts(), 1);
        assert!(s.autosave.save_now().await.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_clears_pending_timer() {
        let s = session(MemoryTransport::new());
        edit(&s.editor);
        sleep(Duration::from_millis(1)).await;
        let Session {
            transport,
            autosave,
            ..
        } = s;
        drop(autosave);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(transport.attempts(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn status_is_readable_while_editor_is_locked() {
        let Session {
            editor,
            transport,
            autosave,
        } = session(MemoryTransport::with_latency(Duration::from_millis(50)));
        let autosave = Arc::new(autosave);
        edit(&editor);

        let saving = {
            let autosave = Arc::clone(&autosave);
            tokio::spawn(async move { autosave.save_now().await })
        };
        while transport.attempts() == 0 {
            sleep(Duration::from_millis(5)).await;
        }

        {
            let _held = editor.lock();
            // The write finishes meanwhile and waits for the editor.
            for _ in 0..10 {
                assert_eq!(autosave.status(), SaveStatus::Saving);
                std::thread::sleep(Duration::from_millis(20));
            }
        }

        assert!(saving.await.unwrap().is_saved());
        assert_eq!(autosave.status(), SaveStatus::Saved);
        assert!(!editor.lock().is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn status_transitions_are_published() {
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let editor = Editor::default().with_events(bus.clone()).into_shared();
        let _autosave = Autosave::spawn(
            Arc::clone(&editor),
            MemoryTransport::new(),
            AutosaveConfig::default().with_debounce(Duration::from_millis(100)),
            bus,
        );

        edit(&editor);
        sleep(Duration::from_secs(3)).await;

        let mut statuses = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let EditorEvent::SaveStatusChanged { status } = event {
                statuses.push(status);
            }
        }
        assert_eq!(
            statuses,
            vec![SaveStatus::Saving, SaveStatus::Saved, SaveStatus::Idle]
        );
    }
}
