//! The study/break state machine.
//!
//! Two orthogonal axes: the [`Phase`] (study or break) and whether the
//! countdown is running. The machine owns no clock: an external scheduler
//! calls [`Session::tick`] once per elapsed second while running.
//!
//! A tick that exhausts the phase does not switch phases itself. It reports
//! [`Tick::PhaseComplete`] and the caller applies
//! [`Session::advance_phase`] on its next turn.

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[strum(serialize = "STUDYING")]
    Study,
    #[strum(serialize = "BREAK")]
    Break,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    PhaseComplete,
}

/// Durable counters, persisted whenever they change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub completed_sessions: u32,
    pub total_studied_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    phase: Phase,
    running: bool,
    has_started: bool,
    time_left: u64,
    counters: Counters,
}

impl Session {
    /// Fresh machine at the start of a paused study phase.
    pub fn new(settings: Settings, counters: Counters) -> Self {
        Self::with_phase(settings, Phase::Study, counters)
    }

    pub fn with_phase(settings: Settings, phase: Phase, counters: Counters) -> Self {
        let settings = settings.clamped();
        let mut session = Self {
            settings,
            phase,
            running: false,
            has_started: false,
            time_left: 0,
            counters,
        };
        session.reset_phase(phase);
        session
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_study(&self) -> bool {
        self.phase == Phase::Study
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        !self.running
    }

    pub fn has_started(&self) -> bool {
        self.has_started
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn completed_sessions(&self) -> u32 {
        self.counters.completed_sessions
    }

    pub fn total_studied_secs(&self) -> u64 {
        self.counters.total_studied_secs
    }

    /// Full length of the current phase in seconds.
    pub fn phase_duration(&self) -> u64 {
        self.duration_of(self.phase)
    }

    /// 1-based position in the global study/break sequence.
    pub fn session_ordinal(&self) -> u64 {
        u64::from(self.counters.completed_sessions) * 2 + u64::from(self.is_study())
    }

    /// Number of study+break sessions needed to reach the daily goal.
    pub fn goal_sessions(&self) -> u64 {
        let study_sessions = (self.settings.goal_hrs * 60.0 / f64::from(self.settings.study_min))
            .ceil()
            .max(0.0);
        // `as` saturates, so an absurd stored goal stays finite here.
        (study_sessions as u64).saturating_mul(2)
    }

    /// Share of the daily goal studied so far, capped at 100.
    pub fn goal_percent(&self) -> f64 {
        let goal = self.settings.goal_secs();
        if goal <= 0.0 {
            return 100.0;
        }
        (self.counters.total_studied_secs as f64 / goal * 100.0).min(100.0)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let total = self.phase_duration();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.time_left as f64 / total as f64)
    }

    pub fn status_label(&self) -> &'static str {
        match (self.running, self.phase) {
            (false, _) => "PAUSED",
            (true, Phase::Study) => "STUDYING",
            (true, Phase::Break) => "BREAK",
        }
    }

    pub fn action_label(&self) -> &'static str {
        if self.running {
            "PAUSE"
        } else if self.has_started {
            "RESUME"
        } else {
            "START"
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Toggle between running and paused. Returns the new running state.
    pub fn start_or_pause(&mut self) -> bool {
        if self.running {
            self.running = false;
        } else {
            self.running = true;
            self.has_started = true;
        }
        self.running
    }

    /// One elapsed second.
    pub fn tick(&mut self) -> Tick {
        if !self.running {
            return Tick::Continue;
        }
        if self.time_left == 0 {
            // Completion already reported and not yet applied.
            return Tick::PhaseComplete;
        }

        self.time_left -= 1;
        if self.is_study() {
            self.counters.total_studied_secs = self.counters.total_studied_secs.saturating_add(1);
        }

        if self.time_left == 0 {
            Tick::PhaseComplete
        } else {
            Tick::Continue
        }
    }

    /// Move to the next phase. `manual` marks a user skip, which credits the
    /// unconsumed study time in one lump.
    pub fn advance_phase(&mut self, manual: bool) {
        match self.phase {
            Phase::Study => {
                if manual {
                    self.counters.total_studied_secs =
                        self.counters.total_studied_secs.saturating_add(self.time_left);
                }
                self.counters.completed_sessions = self.counters.completed_sessions.saturating_add(1);
                self.reset_phase(Phase::Break);
            }
            Phase::Break => self.reset_phase(Phase::Study),
        }
    }

    /// Step back to the previous phase.
    pub fn retreat_phase(&mut self) {
        match self.phase {
            Phase::Study if self.counters.completed_sessions > 0 => {
                self.reset_phase(Phase::Break);
            }
            // No earlier phase: restart the first one.
            Phase::Study => self.reset_phase(Phase::Study),
            Phase::Break => {
                let study = self.settings.study_secs();
                self.counters.total_studied_secs =
                    self.counters.total_studied_secs.saturating_sub(study);
                self.counters.completed_sessions =
                    self.counters.completed_sessions.saturating_sub(1);
                self.reset_phase(Phase::Study);
            }
        }
    }

    /// Replace the settings and restart the current phase at its new length.
    pub fn apply_settings_and_restart_phase(&mut self, settings: Settings) {
        self.settings = settings.clamped();
        self.reset_phase(self.phase);
    }

    fn reset_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.time_left = self.duration_of(phase);
        self.running = false;
        self.has_started = false;
    }

    fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Study => self.settings.study_secs(),
            Phase::Break => self.settings.break_secs(),
        }
    }
}
