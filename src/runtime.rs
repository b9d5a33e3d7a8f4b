use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// How long an unarmed runner waits for input before reporting `Idle`.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum StudyEvent {
    Key(KeyEvent),
    Resize,
    /// One timer interval elapsed while the ticker was armed.
    Tick,
    /// Nothing happened while the ticker was disarmed.
    Idle,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait StudyEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<StudyEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<StudyEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                // Windows reports releases too; only presses drive the app.
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(StudyEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(StudyEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StudyEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StudyEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The one-second cadence the study timer runs on.
    pub fn seconds() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<StudyEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<StudyEvent>) -> Self {
        Self { rx }
    }
}

impl StudyEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<StudyEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks are only produced while the runner is armed. Disarming drops the
/// pending deadline, so no tick can fire after a pause.
pub struct Runner<E: StudyEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    deadline: Option<Instant>,
}

impl<E: StudyEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            deadline: None,
        }
    }

    /// Start ticking one interval from now. No-op when already armed.
    pub fn arm(&mut self) {
        if self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.ticker.interval());
        }
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// Arm or disarm to match the timer's running state.
    pub fn sync(&mut self, running: bool) {
        if running {
            self.arm();
        } else {
            self.disarm();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// One interval past `deadline`. Missed intervals are dropped, never
    /// replayed as a burst.
    fn next_deadline(&self, deadline: Instant) -> Instant {
        let interval = self.ticker.interval();
        let now = Instant::now();
        let next = deadline + interval;
        if next <= now {
            now + interval
        } else {
            next
        }
    }

    /// Blocks until the next event or tick deadline.
    pub fn step(&mut self) -> StudyEvent {
        match self.deadline {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                match self.event_source.recv_timeout(wait) {
                    Ok(ev) => ev,
                    Err(RecvTimeoutError::Timeout) => {
                        self.deadline = Some(self.next_deadline(deadline));
                        StudyEvent::Tick
                    }
                    Err(RecvTimeoutError::Disconnected) => {
                        std::thread::sleep(wait);
                        self.deadline = Some(self.next_deadline(deadline));
                        StudyEvent::Tick
                    }
                }
            }
            None => match self.event_source.recv_timeout(IDLE_WAIT) {
                Ok(ev) => ev,
                Err(RecvTimeoutError::Timeout) => StudyEvent::Idle,
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(IDLE_WAIT);
                    StudyEvent::Idle
                }
            },
        }
    }
}
