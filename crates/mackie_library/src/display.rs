//! One physical 2-row / 56-character Mackie Control display segment.

use log::trace;

use crate::text::center;

/// Characters per display row.
pub const LINE_WIDTH: usize = 56;

const SYSEX_HEADER: [u8; 4] = [0xf0, 0x00, 0x00, 0x66];
const SYSEX_CMD_DISPLAY: u8 = 0x12;
const SYSEX_END: u8 = 0xf7;

/// Device id byte in the SysEx header. Extension units answer to a
/// different id than the home unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Main,
    Extension,
}

impl DeviceType {
    fn id(self) -> u8 {
        match self {
            DeviceType::Main => 0x14,
            DeviceType::Extension => 0x15,
        }
    }
}

/// Display row, as addressed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Upper,
    Lower,
}

impl Row {
    fn index(self) -> usize {
        match self {
            Row::Upper => 0,
            Row::Lower => 1,
        }
    }
}

/// Where display SysEx frames go. The driver backs this with a real
/// MIDI output; tests collect frames in a `Vec`.
pub trait SysexSink {
    fn send_sysex(&mut self, frame: &[u8]);
}

impl SysexSink for Vec<Vec<u8>> {
    fn send_sysex(&mut self, frame: &[u8]) {
        self.push(frame.to_vec());
    }
}

pub struct DisplaySurface {
    device_type: DeviceType,
    stack_offset: usize,
    last_sent: [Option<Vec<u8>>; 2],
}

impl DisplaySurface {
    pub fn new(device_type: DeviceType) -> Self {
        Self {
            device_type,
            stack_offset: 0,
            last_sent: [None, None],
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn stack_offset(&self) -> usize {
        self.stack_offset
    }

    /// Offset gained by stacking extension units: the leftmost unit
    /// starts at 0, the next at 8, and so on.
    pub fn set_stack_offset(&mut self, offset: usize) {
        self.stack_offset = offset;
    }

    /// Writes `text` at `cursor_offset` within `row`, skipping the wire
    /// entirely when the row already shows the same bytes.
    pub fn send_row(&mut self, text: &str, row: Row, cursor_offset: usize, out: &mut dyn SysexSink) {
        // Rows are swapped on the wire, a quirk of the unit firmware.
        let position = match row {
            Row::Lower => cursor_offset,
            Row::Upper => LINE_WIDTH + cursor_offset,
        };
        // SysEx data bytes must stay below 0x80.
        let payload: Vec<u8> = text
            .chars()
            .map(|c| {
                let code = c as u32;
                if code >= 128 { 0 } else { code as u8 }
            })
            .collect();
        if self.last_sent[row.index()].as_deref() == Some(payload.as_slice()) {
            return;
        }
        let mut frame = Vec::with_capacity(payload.len() + 7);
        frame.extend_from_slice(&SYSEX_HEADER);
        frame.push(self.device_type.id());
        frame.push(SYSEX_CMD_DISPLAY);
        frame.push(position as u8);
        frame.extend_from_slice(&payload);
        frame.push(SYSEX_END);
        trace!(
            "display +{} {row:?} @{cursor_offset}: {text:?}",
            self.stack_offset
        );
        self.last_sent[row.index()] = Some(payload);
        out.send_sysex(&frame);
    }

    /// Drops the last-sent cache so the next write goes out even if the
    /// content did not change. Used after connect and on refresh.
    pub fn reset_cache(&mut self) {
        self.last_sent = [None, None];
    }

    /// Best-effort goodbye banner, shown while the driver goes away.
    pub fn teardown(&mut self, out: &mut dyn SysexSink) {
        self.send_row(&center("Platform M+", LINE_WIDTH), Row::Upper, 0, out);
        self.send_row(&center("surface is offline", LINE_WIDTH), Row::Lower, 0, out);
    }
}
