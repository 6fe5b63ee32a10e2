//! Session state the displays render from.
//!
//! The host session itself is outside this crate; whoever embeds the
//! engine implements this view. The standalone driver keeps a small
//! local model behind it.

pub trait SongView {
    /// Name of the visible track at `index`, if one exists.
    fn track_name(&self, index: usize) -> Option<&str>;

    /// Name of the return track at `index`, if one exists.
    fn return_track_name(&self, index: usize) -> Option<&str>;

    /// Current song position as "bars.beats.subdivision.ticks".
    fn beats_position(&self) -> String;

    /// Current song position as "hours:minutes:seconds:frames".
    fn smpte_position(&self) -> String;
}
