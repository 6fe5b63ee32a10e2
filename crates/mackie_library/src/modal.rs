//! Display mode state machine.

/// What the displays currently show. Exactly one mode is active at a
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    ChannelStrip,
    Time,
    InfoOverlay,
}

/// Tick-driven modal state. `InfoOverlay` is the only mode that expires
/// on its own; the others persist until toggled from an input handler.
/// Toggles are edge-triggered and must never be issued from inside a
/// render pass.
#[derive(Debug, Default)]
pub struct ModalTimer {
    mode: Mode,
    info_elapsed: u32,
    info_duration: u32,
}

impl ModalTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Flips between channel strip and time display. Ignored while an
    /// info overlay is up. Returns the mode now in effect.
    pub fn toggle_time(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::ChannelStrip => Mode::Time,
            Mode::Time => Mode::ChannelStrip,
            Mode::InfoOverlay => Mode::InfoOverlay,
        };
        self.mode
    }

    /// Enters the info overlay for `duration` ticks, restarting the
    /// countdown if one is already running.
    pub fn show_info(&mut self, duration: u32) {
        self.info_duration = duration;
        self.info_elapsed = 0;
        self.mode = Mode::InfoOverlay;
    }

    /// Advances the overlay countdown. Returns true when the overlay
    /// just expired and the displays fall back to channel strip mode.
    pub fn tick(&mut self) -> bool {
        if self.mode != Mode::InfoOverlay {
            return false;
        }
        self.info_elapsed += 1;
        if self.info_elapsed >= self.info_duration {
            self.mode = Mode::ChannelStrip;
            true
        } else {
            false
        }
    }
}
