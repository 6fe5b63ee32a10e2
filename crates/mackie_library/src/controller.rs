//! Multiplexes session state onto every attached display unit.

use crate::NUM_CHANNEL_STRIPS;
use crate::display::{DeviceType, DisplaySurface, LINE_WIDTH, Row, SysexSink};
use crate::modal::{ModalTimer, Mode};
use crate::song::SongView;
use crate::text::{center, compact, left_align, right_align};

const POSITION_LABEL: &str = "Position [Bars.Beats.Subdivision.Ticks]";
const SMPTE_LABEL: &str = "SMPTE    [Hours:Minutes:Seconds:Frames]";

/// Column where the time values start; labels fill the space before it.
const TIME_LABEL_WIDTH: usize = 40;
const TIME_VALUE_WIDTH: usize = 16;
const SMPTE_VALUE_CURSOR: usize = 43;

/// One channel strip worth of injected parameter data, e.g. a send
/// knob with its current value.
#[derive(Debug, Clone)]
pub struct ParameterCell {
    pub name: String,
    pub value: String,
}

/// What the channel strip cells are fed from. Installing one source
/// drops the other.
#[derive(Debug, Default)]
enum StripSource {
    #[default]
    Empty,
    Parameters(Vec<Option<ParameterCell>>),
    Strings(Vec<String>),
}

/// Drives the home display plus any stacked extension displays, in one
/// of three modes: channel strip cells, the song position, or a
/// transient status overlay. Rendering happens on the host tick, every
/// 100 ms or so.
pub struct MainDisplayController {
    surfaces: Vec<DisplaySurface>,
    modal: ModalTimer,
    source: StripSource,
    show_parameter_names: bool,
    bank_channel_offset: usize,
    meters_enabled: bool,
    show_return_tracks: bool,
    info_lines: [String; 2],
    last_sent_time: String,
}

impl Default for MainDisplayController {
    fn default() -> Self {
        Self::new()
    }
}

impl MainDisplayController {
    pub fn new() -> Self {
        Self {
            surfaces: vec![DisplaySurface::new(DeviceType::Main)],
            modal: ModalTimer::new(),
            source: StripSource::Empty,
            show_parameter_names: false,
            bank_channel_offset: 0,
            meters_enabled: false,
            show_return_tracks: false,
            info_lines: [String::new(), String::new()],
            last_sent_time: String::new(),
        }
    }

    /// Wires up stacked extension units: offsets run across the left
    /// extensions first, then the home unit, then the right extensions,
    /// eight strips apart. Replaces any previous wiring and drops the
    /// strip content, so call this once, right after startup.
    pub fn set_extensions(&mut self, left: usize, right: usize) {
        self.surfaces.clear();
        for _ in 0..left {
            self.surfaces.push(DisplaySurface::new(DeviceType::Extension));
        }
        self.surfaces.push(DisplaySurface::new(DeviceType::Main));
        for _ in 0..right {
            self.surfaces.push(DisplaySurface::new(DeviceType::Extension));
        }
        for (index, surface) in self.surfaces.iter_mut().enumerate() {
            surface.set_stack_offset(index * NUM_CHANNEL_STRIPS);
        }
        self.source = StripSource::Empty;
        self.refresh_state();
    }

    pub fn surfaces(&self) -> &[DisplaySurface] {
        &self.surfaces
    }

    /// Total number of channel strips across all units.
    pub fn strip_count(&self) -> usize {
        self.surfaces.len() * NUM_CHANNEL_STRIPS
    }

    pub fn mode(&self) -> Mode {
        self.modal.mode()
    }

    /// Installs parameter cells for the lower row (and, when parameter
    /// names are shown, the upper row). `None` falls back to blank
    /// cells. Drops any raw strip strings.
    pub fn set_parameters(&mut self, parameters: Option<Vec<Option<ParameterCell>>>) {
        self.source = match parameters {
            Some(cells) => StripSource::Parameters(cells),
            None => StripSource::Empty,
        };
    }

    /// Installs raw lower-row strings. Drops any parameter cells.
    pub fn set_channel_strip_strings(&mut self, strings: Option<Vec<String>>) {
        self.source = match strings {
            Some(strings) => StripSource::Strings(strings),
            None => StripSource::Empty,
        };
    }

    /// When set, the upper row shows the injected parameter names
    /// instead of track names.
    pub fn set_show_parameter_names(&mut self, enable: bool) {
        self.show_parameter_names = enable;
    }

    /// First session track shown on the leftmost strip.
    pub fn set_channel_offset(&mut self, channel_offset: usize) {
        self.bank_channel_offset = channel_offset;
    }

    pub fn channel_offset(&self) -> usize {
        self.bank_channel_offset
    }

    /// While meters are on, the hardware draws level bars over the
    /// lower row, so we stop writing it.
    pub fn enable_meters(&mut self, enabled: bool) {
        if self.meters_enabled != enabled {
            self.meters_enabled = enabled;
            self.refresh_state();
        }
    }

    pub fn meters_enabled(&self) -> bool {
        self.meters_enabled
    }

    /// Shows return track names on the upper row instead of the
    /// regular visible tracks.
    pub fn set_show_return_track_names(&mut self, show_returns: bool) {
        self.show_return_tracks = show_returns;
    }

    pub fn returns_shown(&self) -> bool {
        self.show_return_tracks
    }

    /// Drops every surface's last-sent cache so the next tick repaints
    /// the hardware. Used after connect and after dropouts.
    pub fn refresh_state(&mut self) {
        for surface in &mut self.surfaces {
            surface.reset_cache();
        }
        self.last_sent_time.clear();
    }

    /// Handles the SMPTE/Beats switch: flips between channel strip and
    /// time mode, painting the static time labels on entry. Ignored
    /// while an info overlay is up.
    pub fn toggle_time_mode(&mut self, song: &dyn SongView, out: &mut dyn SysexSink) {
        if self.modal.toggle_time() != Mode::Time {
            return;
        }
        self.last_sent_time = right_align(&song.beats_position(), TIME_VALUE_WIDTH);
        let upper = format!(
            "{}{}",
            left_align(POSITION_LABEL, TIME_LABEL_WIDTH),
            self.last_sent_time
        );
        let lower = format!(
            "{}{}",
            left_align(SMPTE_LABEL, TIME_LABEL_WIDTH),
            right_align(&song.smpte_position(), TIME_VALUE_WIDTH)
        );
        for surface in &mut self.surfaces {
            surface.send_row(&upper, Row::Upper, 0, out);
            surface.send_row(&lower, Row::Lower, 0, out);
        }
    }

    /// Flashes the current assignment on every unit for `duration`
    /// ticks, then falls back to channel strip mode.
    pub fn show_assignment_status(
        &mut self,
        status1: &str,
        status2: &str,
        duration: u32,
        out: &mut dyn SysexSink,
    ) {
        self.modal.show_info(duration);
        let lines = [center(status1, LINE_WIDTH), status2.to_string()];
        for surface in &mut self.surfaces {
            surface.send_row(&lines[0], Row::Upper, 0, out);
            surface.send_row(&lines[1], Row::Lower, 0, out);
        }
        self.info_lines = lines;
    }

    /// Periodic render, called from the host tick (nominally 100 ms).
    pub fn on_tick(&mut self, song: &dyn SongView, out: &mut dyn SysexSink) {
        match self.modal.mode() {
            Mode::ChannelStrip => self.render_channel_strips(song, out),
            Mode::Time => self.render_time(song, out),
            Mode::InfoOverlay => {
                // Repaint the stored lines; the byte-level dedup keeps
                // this off the wire while nothing changed.
                let [upper, lower] = self.info_lines.clone();
                for surface in &mut self.surfaces {
                    surface.send_row(&upper, Row::Upper, 0, out);
                    surface.send_row(&lower, Row::Lower, 0, out);
                }
                self.modal.tick();
            }
        }
    }

    fn render_channel_strips(&mut self, song: &dyn SongView, out: &mut dyn SysexSink) {
        let Self {
            surfaces,
            source,
            show_parameter_names,
            bank_channel_offset,
            meters_enabled,
            show_return_tracks,
            ..
        } = self;
        let mut strip_index = 0;
        for surface in surfaces.iter_mut() {
            let mut upper = String::with_capacity(LINE_WIDTH);
            let mut lower = String::with_capacity(LINE_WIDTH);
            for slot in 0..NUM_CHANNEL_STRIPS {
                let track_index = *bank_channel_offset + surface.stack_offset() + slot;
                let upper_label = match source {
                    StripSource::Parameters(cells) if *show_parameter_names => cells
                        .get(strip_index)
                        .and_then(|cell| cell.as_ref())
                        .map(|cell| cell.name.as_str())
                        .unwrap_or(""),
                    _ => {
                        let name = if *show_return_tracks {
                            song.return_track_name(track_index)
                        } else {
                            song.track_name(track_index)
                        };
                        name.unwrap_or("")
                    }
                };
                upper.push_str(&compact(upper_label));
                upper.push(' ');
                let lower_label = match source {
                    StripSource::Parameters(cells) => cells
                        .get(strip_index)
                        .and_then(|cell| cell.as_ref())
                        .map(|cell| cell.value.as_str())
                        .unwrap_or(""),
                    StripSource::Strings(strings) => strings
                        .get(strip_index)
                        .map(|s| s.as_str())
                        .unwrap_or(""),
                    StripSource::Empty => "",
                };
                lower.push_str(&compact(lower_label));
                lower.push(' ');
                strip_index += 1;
            }
            // Nothing assigned at all reads as "No Sends/Returns"; an
            // empty lower row alone as "No Entries". The upper-row
            // check runs first and wins.
            let blank = " ".repeat(LINE_WIDTH);
            if upper == blank {
                lower = center("No Sends/Returns", LINE_WIDTH);
            }
            if lower == blank {
                lower = center("No Entries", LINE_WIDTH);
            }
            surface.send_row(&upper, Row::Upper, 0, out);
            if !*meters_enabled {
                surface.send_row(&lower, Row::Lower, 0, out);
            }
        }
    }

    fn render_time(&mut self, song: &dyn SongView, out: &mut dyn SysexSink) {
        // Value-level dedup on top of the byte-level one, so a standing
        // transport costs no formatting traffic at all.
        let beats = right_align(&song.beats_position(), TIME_VALUE_WIDTH);
        if self.last_sent_time == beats {
            return;
        }
        self.last_sent_time = beats.clone();
        let smpte = song.smpte_position();
        for surface in &mut self.surfaces {
            surface.send_row(&beats, Row::Upper, TIME_LABEL_WIDTH, out);
            surface.send_row(&smpte, Row::Lower, SMPTE_VALUE_CURSOR, out);
        }
    }

    /// Best-effort farewell on every unit, called while shutting down.
    pub fn teardown(&mut self, out: &mut dyn SysexSink) {
        self.enable_meters(false);
        for surface in &mut self.surfaces {
            surface.teardown(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSong {
        tracks: Vec<String>,
        returns: Vec<String>,
        beats: String,
        smpte: String,
    }

    impl FakeSong {
        fn empty() -> Self {
            Self::with_tracks(&[])
        }

        fn with_tracks(names: &[&str]) -> Self {
            Self {
                tracks: names.iter().map(|n| n.to_string()).collect(),
                returns: vec!["A-Reverb".into(), "B-Delay".into()],
                beats: "1.1.1.0".into(),
                smpte: "00:00:00:00".into(),
            }
        }
    }

    impl SongView for FakeSong {
        fn track_name(&self, index: usize) -> Option<&str> {
            self.tracks.get(index).map(|s| s.as_str())
        }

        fn return_track_name(&self, index: usize) -> Option<&str> {
            self.returns.get(index).map(|s| s.as_str())
        }

        fn beats_position(&self) -> String {
            self.beats.clone()
        }

        fn smpte_position(&self) -> String {
            self.smpte.clone()
        }
    }

    fn row_text(frame: &[u8]) -> (u8, String) {
        let position = frame[6];
        let text = frame[7..frame.len() - 1].iter().map(|&b| b as char).collect();
        (position, text)
    }

    #[test]
    fn home_unit_alone_sits_at_offset_zero() {
        let controller = MainDisplayController::new();
        assert_eq!(controller.surfaces().len(), 1);
        assert_eq!(controller.surfaces()[0].stack_offset(), 0);
        assert_eq!(controller.strip_count(), 8);
    }

    #[test]
    fn extensions_stack_left_to_right() {
        let mut controller = MainDisplayController::new();
        controller.set_extensions(1, 1);
        let offsets: Vec<usize> = controller
            .surfaces()
            .iter()
            .map(|s| s.stack_offset())
            .collect();
        assert_eq!(offsets, vec![0, 8, 16]);
        let types: Vec<DeviceType> = controller
            .surfaces()
            .iter()
            .map(|s| s.device_type())
            .collect();
        assert_eq!(
            types,
            vec![DeviceType::Extension, DeviceType::Main, DeviceType::Extension]
        );
    }

    #[test]
    fn channel_strip_upper_row_shows_track_names() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick", "Snare"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        assert_eq!(out.len(), 2);
        let (position, upper) = row_text(&out[0]);
        assert_eq!(position, 56);
        assert_eq!(upper.len(), LINE_WIDTH);
        assert!(upper.starts_with(" Kick  Snare "));
    }

    #[test]
    fn bank_offset_shifts_the_visible_tracks() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick", "Snare", "Hats"]);
        controller.set_channel_offset(2);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        let (_, upper) = row_text(&out[0]);
        assert!(upper.starts_with(" Hats "));
    }

    #[test]
    fn second_unit_renders_the_next_bank_of_tracks() {
        let mut controller = MainDisplayController::new();
        controller.set_extensions(0, 1);
        let names: Vec<String> = (1..=16).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let song = FakeSong::with_tracks(&refs);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        // Two rows per unit; the extension's upper row starts at track 9.
        assert_eq!(out.len(), 4);
        let (_, upper) = row_text(&out[2]);
        assert!(upper.starts_with("  T9  "));
    }

    #[test]
    fn blank_upper_row_reads_no_sends_returns() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::empty();
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        let (_, lower) = row_text(&out[1]);
        assert_eq!(lower, center("No Sends/Returns", LINE_WIDTH));
    }

    #[test]
    fn blank_lower_row_reads_no_entries() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        let (_, lower) = row_text(&out[1]);
        assert_eq!(lower, center("No Entries", LINE_WIDTH));
    }

    #[test]
    fn meters_suppress_the_lower_row() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        controller.enable_meters(true);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        assert_eq!(out.len(), 1);
        let (position, _) = row_text(&out[0]);
        assert_eq!(position, 56);
    }

    #[test]
    fn return_tracks_replace_visible_tracks_when_requested() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        controller.set_show_return_track_names(true);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        let (_, upper) = row_text(&out[0]);
        // "A-Reverb" squeezed into six characters.
        assert!(upper.starts_with(&compact("A-Reverb")));
    }

    #[test]
    fn parameters_fill_the_lower_row_and_optionally_the_upper() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        let cell = ParameterCell {
            name: "Pan".into(),
            value: "<C>".into(),
        };
        controller.set_parameters(Some(vec![Some(cell)]));
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        let (_, upper) = row_text(&out[0]);
        let (_, lower) = row_text(&out[1]);
        assert!(upper.starts_with(" Kick "));
        assert!(lower.starts_with(" <C>  "));

        controller.set_show_parameter_names(true);
        controller.refresh_state();
        out.clear();
        controller.on_tick(&song, &mut out);
        let (_, upper) = row_text(&out[0]);
        assert!(upper.starts_with(" Pan  "));
    }

    #[test]
    fn installing_strings_drops_parameters() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        controller.set_parameters(Some(vec![Some(ParameterCell {
            name: "Pan".into(),
            value: "<C>".into(),
        })]));
        controller.set_channel_strip_strings(Some(vec!["SendA".into()]));
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.on_tick(&song, &mut out);
        let (_, lower) = row_text(&out[1]);
        assert!(lower.starts_with("SendA "));
    }

    #[test]
    fn time_mode_paints_labels_on_entry() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.toggle_time_mode(&song, &mut out);
        assert_eq!(controller.mode(), Mode::Time);
        assert_eq!(out.len(), 2);
        let (position, upper) = row_text(&out[0]);
        assert_eq!(position, 56);
        assert!(upper.starts_with(POSITION_LABEL));
        assert!(upper.ends_with("1.1.1.0"));
        assert_eq!(upper.len(), LINE_WIDTH);
    }

    #[test]
    fn time_values_resend_only_when_the_position_moves() {
        let mut controller = MainDisplayController::new();
        let mut song = FakeSong::with_tracks(&["Kick"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.toggle_time_mode(&song, &mut out);
        out.clear();

        // Standing still: nothing is formatted, nothing is sent.
        controller.on_tick(&song, &mut out);
        assert!(out.is_empty());

        song.beats = "2.1.1.0".into();
        song.smpte = "00:00:02:00".into();
        controller.on_tick(&song, &mut out);
        assert_eq!(out.len(), 2);
        let (beats_position, beats) = row_text(&out[0]);
        let (smpte_position, smpte) = row_text(&out[1]);
        assert_eq!(beats_position as usize, LINE_WIDTH + TIME_LABEL_WIDTH);
        assert_eq!(beats.trim(), "2.1.1.0");
        assert_eq!(smpte_position as usize, SMPTE_VALUE_CURSOR);
        assert_eq!(smpte, "00:00:02:00");
    }

    #[test]
    fn leaving_time_mode_returns_to_channel_strips() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.toggle_time_mode(&song, &mut out);
        controller.toggle_time_mode(&song, &mut out);
        assert_eq!(controller.mode(), Mode::ChannelStrip);
    }

    #[test]
    fn assignment_status_overlays_every_unit_and_expires() {
        let mut controller = MainDisplayController::new();
        controller.set_extensions(0, 1);
        let song = FakeSong::with_tracks(&["Kick"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.show_assignment_status("Pan", "", 5, &mut out);
        assert_eq!(controller.mode(), Mode::InfoOverlay);
        assert_eq!(out.len(), 4);
        let (_, upper) = row_text(&out[0]);
        assert_eq!(upper, center("Pan", LINE_WIDTH));

        for _ in 0..4 {
            controller.on_tick(&song, &mut out);
            assert_eq!(controller.mode(), Mode::InfoOverlay);
        }
        controller.on_tick(&song, &mut out);
        assert_eq!(controller.mode(), Mode::ChannelStrip);
    }

    #[test]
    fn time_toggle_is_ignored_while_the_overlay_is_up() {
        let mut controller = MainDisplayController::new();
        let song = FakeSong::with_tracks(&["Kick"]);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.show_assignment_status("Sends", "", 3, &mut out);
        controller.toggle_time_mode(&song, &mut out);
        assert_eq!(controller.mode(), Mode::InfoOverlay);
    }

    #[test]
    fn teardown_says_goodbye_on_every_unit() {
        let mut controller = MainDisplayController::new();
        controller.set_extensions(1, 0);
        let mut out: Vec<Vec<u8>> = Vec::new();
        controller.teardown(&mut out);
        assert_eq!(out.len(), 4);
    }
}
