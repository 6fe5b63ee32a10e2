//! Local stand-in for the host session.
//!
//! A real host integration would implement [`SongView`] against the
//! DAW's API; the standalone driver advances this model from the tick
//! clock so connected displays have live content.

use mackie_library::controller::ParameterCell;
use mackie_library::song::SongView;

use crate::settings::Settings;

/// Pulses per beat in the bars.beats.subdivision.ticks readout.
const PULSES_PER_BEAT: u64 = 240;

pub(crate) struct Session {
    track_names: Vec<String>,
    return_track_names: Vec<String>,
    tick_ms: u64,
    tempo_bpm: u64,
    beats_per_bar: u64,
    frames_per_second: u64,
    elapsed_ticks: u64,
    playing: bool,
}

impl Session {
    pub(crate) fn new(settings: &Settings) -> Self {
        Self {
            track_names: settings.track_names.clone(),
            return_track_names: settings.return_track_names.clone(),
            tick_ms: settings.tick_ms,
            tempo_bpm: settings.tempo_bpm,
            beats_per_bar: settings.beats_per_bar,
            frames_per_second: settings.frames_per_second,
            elapsed_ticks: 0,
            playing: false,
        }
    }

    /// Advances the transport by one driver tick while playing.
    pub(crate) fn advance(&mut self) {
        if self.playing {
            self.elapsed_ticks += 1;
        }
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ticks * self.tick_ms
    }

    fn beat_ms(&self) -> u64 {
        60_000 / self.tempo_bpm
    }

    /// Demo pan parameters, one per strip that maps to a track.
    pub(crate) fn pan_parameters(&self, strips: usize) -> Vec<Option<ParameterCell>> {
        (0..strips)
            .map(|i| {
                self.track_names.get(i).map(|_| ParameterCell {
                    name: "Pan".to_string(),
                    value: "<C>".to_string(),
                })
            })
            .collect()
    }

    /// Demo send levels as raw strip strings.
    pub(crate) fn send_levels(&self, strips: usize) -> Vec<String> {
        (0..strips)
            .map(|i| {
                if self.track_names.get(i).is_some() {
                    format!("-{}.0dB", 6 + i)
                } else {
                    String::new()
                }
            })
            .collect()
    }

    /// Demo input routing labels.
    pub(crate) fn io_labels(&self, strips: usize) -> Vec<String> {
        (0..strips)
            .map(|i| {
                if self.track_names.get(i).is_some() {
                    format!("In {}", i + 1)
                } else {
                    String::new()
                }
            })
            .collect()
    }
}

impl SongView for Session {
    fn track_name(&self, index: usize) -> Option<&str> {
        self.track_names.get(index).map(|s| s.as_str())
    }

    fn return_track_name(&self, index: usize) -> Option<&str> {
        self.return_track_names.get(index).map(|s| s.as_str())
    }

    fn beats_position(&self) -> String {
        let beat_ms = self.beat_ms();
        let total_beats = self.elapsed_ms() / beat_ms;
        let bar = total_beats / self.beats_per_bar + 1;
        let beat = total_beats % self.beats_per_bar + 1;
        let pulses = self.elapsed_ms() % beat_ms * PULSES_PER_BEAT / beat_ms;
        format!("{bar}.{beat}.{}.{}", pulses / 60 + 1, pulses % 60)
    }

    fn smpte_position(&self) -> String {
        let ms = self.elapsed_ms();
        let frames = ms % 1000 * self.frames_per_second / 1000;
        let seconds = ms / 1000;
        format!(
            "{:02}:{:02}:{:02}:{:02}",
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60,
            frames
        )
    }
}
