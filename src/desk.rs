//! The study desk: session state machine, tasks, notes and settings wired to
//! the persistent store and the chime.
//!
//! Every operation that changes a durable field writes that key before it
//! returns. Write failures are logged and otherwise ignored.

use serde::Serialize;

use crate::chime::Chime;
use crate::notes::Notes;
use crate::session::{Counters, Session, Tick};
use crate::settings::{Settings, SettingsManager};
use crate::storage::{Key, Store};
use crate::tasks::{Task, TaskList};

pub struct Desk<S: Store> {
    store: S,
    chime: Box<dyn Chime>,
    session: Session,
    tasks: TaskList,
    notes: Notes,
    settings: SettingsManager,
    pending_completion: bool,
}

impl<S: Store> std::fmt::Debug for Desk<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desk")
            .field("session", &self.session)
            .field("tasks", &self.tasks)
            .field("notes", &self.notes)
            .field("pending_completion", &self.pending_completion)
            .finish_non_exhaustive()
    }
}

impl<S: Store> Desk<S> {
    /// Build the desk from whatever the store holds, defaulting each key
    /// independently.
    pub fn open(store: S, chime: Box<dyn Chime>) -> Self {
        let settings = store.load(Key::Settings, Settings::default()).clamped();
        let counters = Counters {
            completed_sessions: store.load(Key::CompletedSessions, 0u32),
            total_studied_secs: store.load(Key::TotalStudiedSec, 0u64),
        };
        let tasks = TaskList::from(store.load(Key::Tasks, Vec::<Task>::new()));
        let notes = Notes::new(store.load(Key::Notes, String::new()));

        tracing::debug!(
            ?settings,
            completed = counters.completed_sessions,
            studied = counters.total_studied_secs,
            tasks = tasks.len(),
            "desk opened"
        );

        Self {
            store,
            chime,
            session: Session::new(settings, counters),
            tasks,
            notes,
            settings: SettingsManager::default(),
            pending_completion: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn notes(&self) -> &Notes {
        &self.notes
    }

    pub fn settings_manager(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn has_pending_completion(&self) -> bool {
        self.pending_completion
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start_or_pause(&mut self) -> bool {
        self.chime.unlock();
        let running = self.session.start_or_pause();
        tracing::debug!(running, phase = %self.session.phase(), "start/pause");
        running
    }

    /// One elapsed second. A completed phase is only recorded here; the
    /// caller applies it with [`Desk::finish_pending_phase`] on its next turn.
    pub fn tick(&mut self) -> Tick {
        let before = self.session.counters();
        let outcome = self.session.tick();
        self.persist_counters(before);
        if outcome == Tick::PhaseComplete {
            self.pending_completion = true;
        }
        outcome
    }

    /// Apply a completion recorded by [`Desk::tick`]. Returns whether a
    /// transition happened.
    pub fn finish_pending_phase(&mut self) -> bool {
        if !std::mem::take(&mut self.pending_completion) {
            return false;
        }
        self.advance(false);
        true
    }

    /// Skip forward to the next phase.
    pub fn skip_forward(&mut self) {
        self.pending_completion = false;
        self.advance(true);
    }

    /// Step back to the previous phase.
    pub fn step_back(&mut self) {
        self.pending_completion = false;
        let before = self.session.counters();
        self.session.retreat_phase();
        tracing::debug!(phase = %self.session.phase(), "stepped back");
        self.persist_counters(before);
    }

    fn advance(&mut self, manual: bool) {
        self.chime.play();
        let before = self.session.counters();
        let from = self.session.phase();
        self.session.advance_phase(manual);
        tracing::debug!(%from, to = %self.session.phase(), manual, "phase advanced");
        self.persist_counters(before);
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn open_settings(&mut self) {
        let current = *self.session.settings();
        self.settings.open(&current);
    }

    pub fn settings_manager_mut(&mut self) -> &mut SettingsManager {
        &mut self.settings
    }

    /// Commit the open draft and restart the current phase with it.
    pub fn apply_settings_and_close(&mut self) {
        if let Some(settings) = self.settings.apply_and_close() {
            self.apply_settings(settings);
        }
    }

    pub fn discard_settings(&mut self) {
        self.settings.discard();
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.pending_completion = false;
        self.session.apply_settings_and_restart_phase(settings);
        let applied = *self.session.settings();
        tracing::info!(?applied, "settings applied");
        self.persist(Key::Settings, &applied);
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, text: &str) -> Option<String> {
        let id = self.tasks.add(text)?;
        self.persist(Key::Tasks, &self.tasks.tasks().to_vec());
        Some(id)
    }

    pub fn toggle_task(&mut self, id: &str) -> bool {
        if !self.tasks.toggle(id) {
            return false;
        }
        self.persist(Key::Tasks, &self.tasks.tasks().to_vec());
        true
    }

    // ── Notes ────────────────────────────────────────────────────────

    /// Edit the notes through `f`; the text is persisted only if it changed.
    pub fn edit_notes<F: FnOnce(&mut Notes)>(&mut self, f: F) {
        let before = self.notes.text().to_string();
        f(&mut self.notes);
        if self.notes.text() != before {
            self.persist(Key::Notes, &self.notes.text().to_string());
        }
    }

    // ── Reset ────────────────────────────────────────────────────────

    /// Clear every persisted key and return to the defaults.
    pub fn hard_reset(&mut self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!(%err, "failed to clear persisted state");
        }
        self.session = Session::new(Settings::default(), Counters::default());
        self.tasks = TaskList::default();
        self.notes = Notes::default();
        self.settings.discard();
        self.pending_completion = false;
        tracing::info!("hard reset");
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn persist_counters(&mut self, before: Counters) {
        let after = self.session.counters();
        if after.completed_sessions != before.completed_sessions {
            self.persist(Key::CompletedSessions, &after.completed_sessions);
        }
        if after.total_studied_secs != before.total_studied_secs {
            self.persist(Key::TotalStudiedSec, &after.total_studied_secs);
        }
    }

    fn persist<T: Serialize>(&mut self, key: Key, value: &T) {
        if let Err(err) = self.store.save(key, value) {
            tracing::warn!(%key, %err, "failed to persist value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Phase;
    use crate::storage::MemoryStore;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct CountingChime {
        plays: Rc<Cell<u32>>,
        unlocks: Rc<Cell<u32>>,
    }

    impl Chime for CountingChime {
        fn unlock(&mut self) {
            self.unlocks.set(self.unlocks.get() + 1);
        }

        fn play(&mut self) {
            self.plays.set(self.plays.get() + 1);
        }
    }

    fn desk_with(store: MemoryStore) -> (Desk<MemoryStore>, CountingChime) {
        let chime = CountingChime::default();
        (Desk::open(store, Box::new(chime.clone())), chime)
    }

    fn short_settings() -> Settings {
        Settings {
            study_min: 25,
            break_min: 5,
            goal_hrs: 1.0,
        }
    }

    #[test]
    fn opens_with_defaults_from_empty_store() {
        let (desk, _) = desk_with(MemoryStore::default());
        let s = desk.session();
        assert_eq!(*s.settings(), Settings::default());
        assert_eq!(s.phase(), Phase::Study);
        assert!(s.is_paused());
        assert_eq!(s.time_left(), 3000);
        assert_eq!(s.counters(), Counters::default());
        assert!(desk.tasks().is_empty());
        assert_eq!(desk.notes().text(), "");
    }

    #[test]
    fn opens_from_persisted_values() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        store.save(Key::CompletedSessions, &2u32).unwrap();
        store.save(Key::TotalStudiedSec, &3000u64).unwrap();
        store.save(Key::Notes, &"remember milk").unwrap();

        let (desk, _) = desk_with(store);
        assert_eq!(desk.session().time_left(), 1500);
        assert_eq!(desk.session().completed_sessions(), 2);
        assert_eq!(desk.session().total_studied_secs(), 3000);
        assert_eq!(desk.notes().text(), "remember milk");
    }

    #[test]
    fn huge_persisted_goal_does_not_overflow() {
        let mut store = MemoryStore::default();
        store
            .set_raw(Key::Settings, r#"{"studyMin":1,"breakMin":1,"goalHrs":1e300}"#)
            .unwrap();

        let (desk, _) = desk_with(store);
        assert_eq!(desk.session().goal_sessions(), u64::MAX);
        assert_eq!(desk.session().goal_percent(), 0.0);
    }

    #[test]
    fn saturated_persisted_counters_survive_a_skip() {
        let mut store = MemoryStore::default();
        store.save(Key::CompletedSessions, &u32::MAX).unwrap();
        store.save(Key::TotalStudiedSec, &u64::MAX).unwrap();

        let (mut desk, _) = desk_with(store);
        desk.skip_forward();
        assert_eq!(desk.session().phase(), Phase::Break);
        assert_eq!(desk.session().completed_sessions(), u32::MAX);
        assert_eq!(desk.session().total_studied_secs(), u64::MAX);

        desk.skip_forward();
        desk.start_or_pause();
        desk.tick();
        assert_eq!(desk.session().total_studied_secs(), u64::MAX);
    }

    #[test]
    fn malformed_values_fall_back_per_key() {
        let mut store = MemoryStore::default();
        store.set_raw(Key::Tasks, "42").unwrap();
        store.save(Key::CompletedSessions, &4u32).unwrap();
        store
            .save(
                Key::Settings,
                &serde_json::json!({"studyMin": 0, "breakMin": 0, "goalHrs": 0.0}),
            )
            .unwrap();

        let (desk, _) = desk_with(store);
        assert!(desk.tasks().is_empty());
        assert_eq!(desk.session().completed_sessions(), 4);
        assert_eq!(desk.session().settings().study_min, 1);
        assert_eq!(desk.session().settings().goal_hrs, 0.1);
    }

    #[test]
    fn ticks_persist_counters() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        let (mut desk, chime) = desk_with(store);

        desk.start_or_pause();
        assert_eq!(chime.unlocks.get(), 1);
        for _ in 0..1500 {
            if desk.tick() == Tick::PhaseComplete {
                assert!(desk.has_pending_completion());
                assert!(desk.finish_pending_phase());
            }
        }

        let s = desk.session();
        assert_eq!(s.completed_sessions(), 1);
        assert_eq!(s.total_studied_secs(), 1500);
        assert_eq!(s.phase(), Phase::Break);
        assert_eq!(s.time_left(), 300);
        assert_eq!(chime.plays.get(), 1);
        assert_eq!(desk.store().load(Key::CompletedSessions, 0u32), 1);
        assert_eq!(desk.store().load(Key::TotalStudiedSec, 0u64), 1500);
    }

    #[test]
    fn pending_completion_waits_for_next_turn() {
        let mut store = MemoryStore::default();
        store
            .save(
                Key::Settings,
                &Settings {
                    study_min: 1,
                    break_min: 1,
                    goal_hrs: 1.0,
                },
            )
            .unwrap();
        let (mut desk, chime) = desk_with(store);
        desk.start_or_pause();
        for _ in 0..59 {
            desk.tick();
        }
        assert_eq!(desk.tick(), Tick::PhaseComplete);
        assert_eq!(desk.session().phase(), Phase::Study);
        assert_eq!(desk.session().time_left(), 0);
        assert_eq!(chime.plays.get(), 0);

        assert!(desk.finish_pending_phase());
        assert!(!desk.finish_pending_phase());
        assert_eq!(desk.session().phase(), Phase::Break);
        assert_eq!(chime.plays.get(), 1);
    }

    #[test]
    fn manual_skip_supersedes_pending_completion() {
        let mut store = MemoryStore::default();
        store
            .save(
                Key::Settings,
                &Settings {
                    study_min: 1,
                    break_min: 1,
                    goal_hrs: 1.0,
                },
            )
            .unwrap();
        let (mut desk, _) = desk_with(store);
        desk.start_or_pause();
        for _ in 0..60 {
            desk.tick();
        }
        assert!(desk.has_pending_completion());

        desk.skip_forward();
        assert!(!desk.finish_pending_phase());
        assert_eq!(desk.session().phase(), Phase::Break);
        assert_eq!(desk.session().completed_sessions(), 1);
        assert_eq!(desk.session().total_studied_secs(), 60);
    }

    #[test]
    fn skip_forward_chimes_and_credits_remaining() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        let (mut desk, chime) = desk_with(store);
        desk.start_or_pause();
        for _ in 0..100 {
            desk.tick();
        }
        desk.skip_forward();
        assert_eq!(chime.plays.get(), 1);
        assert_eq!(desk.session().total_studied_secs(), 1500);
        assert_eq!(desk.store().load(Key::TotalStudiedSec, 0u64), 1500);

        // Break -> study also chimes.
        desk.skip_forward();
        assert_eq!(chime.plays.get(), 2);
        assert_eq!(desk.session().phase(), Phase::Study);
    }

    #[test]
    fn step_back_is_silent_and_persists() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        let (mut desk, chime) = desk_with(store);
        desk.skip_forward();
        assert_eq!(chime.plays.get(), 1);

        desk.step_back();
        assert_eq!(chime.plays.get(), 1);
        assert_eq!(desk.session().phase(), Phase::Study);
        assert_eq!(desk.store().load(Key::CompletedSessions, 9u32), 0);
        assert_eq!(desk.store().load(Key::TotalStudiedSec, 9u64), 0);
    }

    #[test]
    fn settings_draft_applies_only_on_commit() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        let (mut desk, _) = desk_with(store);
        desk.start_or_pause();
        for _ in 0..300 {
            desk.tick();
        }

        desk.open_settings();
        {
            let mgr = desk.settings_manager_mut();
            mgr.backspace();
            mgr.backspace();
            mgr.type_char('3');
            mgr.type_char('0');
        }
        // Draft edits leave the running timer alone.
        assert_eq!(desk.session().time_left(), 1200);
        assert!(desk.is_running());

        desk.apply_settings_and_close();
        assert_eq!(desk.session().time_left(), 1800);
        assert_eq!(desk.session().phase(), Phase::Study);
        assert!(!desk.is_running());
        assert_eq!(desk.session().total_studied_secs(), 300);
        assert_eq!(
            desk.store().load(Key::Settings, Settings::default()).study_min,
            30
        );
    }

    #[test]
    fn discarded_draft_changes_nothing() {
        let (mut desk, _) = desk_with(MemoryStore::default());
        desk.open_settings();
        desk.settings_manager_mut().type_char('0');
        desk.discard_settings();
        desk.apply_settings_and_close();
        assert_eq!(*desk.session().settings(), Settings::default());
        assert!(desk.store().get_raw(Key::Settings).unwrap().is_none());
    }

    #[test]
    fn tasks_are_persisted_on_change() {
        let (mut desk, _) = desk_with(MemoryStore::default());
        assert_eq!(desk.add_task("   "), None);
        assert!(desk.store().get_raw(Key::Tasks).unwrap().is_none());

        let id = desk.add_task("Read ch.3").unwrap();
        assert!(desk.toggle_task(&id));
        assert!(!desk.toggle_task("missing"));

        let saved: Vec<Task> = desk.store().load(Key::Tasks, Vec::new());
        assert_eq!(saved.len(), 1);
        assert!(saved[0].done);
        assert_eq!(saved[0].text, "Read ch.3");
    }

    #[test]
    fn notes_are_persisted_when_text_changes() {
        let (mut desk, _) = desk_with(MemoryStore::default());
        desk.edit_notes(|n| n.move_left());
        assert!(desk.store().get_raw(Key::Notes).unwrap().is_none());

        desk.edit_notes(|n| n.insert('a'));
        desk.edit_notes(|n| n.newline());
        assert_eq!(desk.store().load(Key::Notes, String::new()), "a\n");
    }

    #[test]
    fn hard_reset_clears_store_and_state() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        let (mut desk, _) = desk_with(store);
        desk.add_task("x");
        desk.edit_notes(|n| n.insert('y'));
        desk.skip_forward();

        desk.hard_reset();
        assert!(desk.store().is_empty());
        assert!(desk.tasks().is_empty());
        assert_eq!(desk.notes().text(), "");
        assert_eq!(*desk.session().settings(), Settings::default());
        assert_eq!(desk.session().counters(), Counters::default());
        assert_eq!(desk.session().time_left(), 3000);
    }

    #[test]
    fn reload_without_mutation_is_identical() {
        let mut store = MemoryStore::default();
        store.save(Key::Settings, &short_settings()).unwrap();
        let (mut desk, _) = desk_with(store);
        desk.add_task("a");
        desk.edit_notes(|n| n.insert('z'));
        desk.skip_forward();

        let snapshot = desk.store().clone();
        let (reloaded, _) = desk_with(snapshot);
        assert_eq!(reloaded.tasks(), desk.tasks());
        assert_eq!(reloaded.notes().text(), desk.notes().text());
        assert_eq!(reloaded.session().counters(), desk.session().counters());
        assert_eq!(reloaded.session().settings(), desk.session().settings());
    }
}
