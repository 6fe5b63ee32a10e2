//! Display engine for Mackie Control protocol surfaces.
//!
//! Renders session state (track names, parameter values, the song
//! position) onto the 2x56 character displays of a Platform M+ class
//! unit and any stacked extension units, deduplicating SysEx traffic
//! along the way. The engine is single threaded and tick driven; it
//! owns no MIDI connection of its own and writes through
//! [`display::SysexSink`].

pub mod controller;
pub mod display;
pub mod modal;
pub mod song;
pub mod text;

/// Channel strips per display unit.
pub const NUM_CHANNEL_STRIPS: usize = 8;
