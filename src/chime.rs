use std::io::{self, Write};

/// Audible cue on phase transitions. Fire-and-forget: implementations
/// swallow their own failures.
pub trait Chime {
    /// Called on every start/pause press, before any tone is needed.
    fn unlock(&mut self) {}

    fn play(&mut self);
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            tracing::debug!(%err, "terminal bell failed");
        }
    }
}

/// Silent chime for `--mute` and headless use.
#[derive(Debug, Default)]
pub struct Muted;

impl Chime for Muted {
    fn play(&mut self) {}
}
