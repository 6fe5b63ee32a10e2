//! Text layout for the 2x56 character displays.

/// Width of one channel strip cell on the display.
pub const CELL_WIDTH: usize = 6;

/// Removal preference when squeezing an over-long label: spaces first,
/// then vowels. The literal order is part of the observable display
/// output and must not be reordered.
const ELISION_ORDER: [char; 6] = [' ', 'i', 'o', 'u', 'e', 'a'];

/// Squeezes an arbitrary label into exactly [`CELL_WIDTH`] characters.
///
/// Over-long labels lose a trailing "dB" unit first (only when a decimal
/// point shows this is a numeric value), then spaces and vowels from the
/// right, never touching the first character. Short labels are centered,
/// odd padding biased right.
pub fn compact(label: &str) -> String {
    if label.is_empty() {
        return " ".repeat(CELL_WIDTH);
    }
    let mut chars: Vec<char> = label.chars().collect();
    if label.trim().chars().count() > CELL_WIDTH && label.ends_with("dB") && label.contains('.') {
        chars.truncate(chars.len() - 2);
    }
    if chars.len() > CELL_WIDTH {
        for victim in ELISION_ORDER {
            while chars.len() > CELL_WIDTH {
                match rfind_from(&chars, victim, 1) {
                    Some(pos) => {
                        chars.remove(pos);
                    }
                    None => break,
                }
            }
        }
        // No spaces or vowels left to drop: hard truncate.
        chars.truncate(CELL_WIDTH);
    } else {
        chars = center_chars(&chars, CELL_WIDTH);
    }
    let cell: String = chars.into_iter().collect();
    debug_assert_eq!(cell.chars().count(), CELL_WIDTH);
    cell
}

/// Rightmost occurrence of `needle` at index `start` or later.
fn rfind_from(chars: &[char], needle: char, start: usize) -> Option<usize> {
    chars[start..]
        .iter()
        .rposition(|&c| c == needle)
        .map(|pos| pos + start)
}

fn center_chars(chars: &[char], width: usize) -> Vec<char> {
    let mut padded = Vec::with_capacity(width);
    let left = (width - chars.len()) / 2;
    padded.resize(left, ' ');
    padded.extend_from_slice(chars);
    padded.resize(width, ' ');
    padded
}

/// Centers `text` in `width` spaces, extra padding on the right.
/// Text wider than `width` is returned unchanged.
pub fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    center_chars(&text.chars().collect::<Vec<_>>(), width)
        .into_iter()
        .collect()
}

/// Left-justifies `text` in `width` spaces without truncating.
pub fn left_align(text: &str, width: usize) -> String {
    let mut out = text.to_string();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}

/// Right-justifies `text` in `width` spaces without truncating.
pub fn right_align(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.chars().count());
    let mut out = " ".repeat(pad);
    out.push_str(text);
    out
}
