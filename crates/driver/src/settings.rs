use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub(crate) struct Settings {
    /// MIDI ports of the surface, as listed by the system.
    pub input_port: String,
    pub output_port: String,
    /// Extension units daisy-chained left/right of the home unit.
    pub left_extensions: usize,
    pub right_extensions: usize,
    /// Render period in milliseconds.
    pub tick_ms: u64,
    /// How long assignment overlays stay up, in ticks.
    pub info_duration_ticks: u32,
    /// SMPTE frame rate for the time readout (24, 25 or 30).
    pub frames_per_second: u64,
    pub tempo_bpm: u64,
    pub beats_per_bar: u64,
    /// Demo session content, shown until a host integration feeds
    /// real track data.
    pub track_names: Vec<String>,
    pub return_track_names: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_port: "Platform M+".to_string(),
            output_port: "Platform M+".to_string(),
            left_extensions: 0,
            right_extensions: 0,
            tick_ms: 100,
            info_duration_ticks: 15,
            frames_per_second: 25,
            tempo_bpm: 120,
            beats_per_bar: 4,
            track_names: ["Drums", "Bass", "Keys", "Lead Vocal", "Gtr L", "Gtr R", "FX", "Mix"]
                .map(String::from)
                .to_vec(),
            return_track_names: ["A-Reverb", "B-Delay"].map(String::from).to_vec(),
        }
    }
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.input_port.is_empty() {
            return Err("Input port name must not be empty".to_string());
        }

        if self.output_port.is_empty() {
            return Err("Output port name must not be empty".to_string());
        }

        if self.tick_ms == 0 {
            return Err("tick_ms must be at least 1".to_string());
        }

        if self.info_duration_ticks == 0 {
            return Err("info_duration_ticks must be at least 1".to_string());
        }

        if !matches!(self.frames_per_second, 24 | 25 | 30) {
            return Err(format!(
                "frames_per_second must be 24, 25 or 30 (found {})",
                self.frames_per_second
            ));
        }

        if self.tempo_bpm == 0 || self.tempo_bpm > 960 {
            return Err("tempo_bpm must be between 1 and 960".to_string());
        }

        if self.beats_per_bar == 0 {
            return Err("beats_per_bar must be at least 1".to_string());
        }

        Ok(())
    }
}
