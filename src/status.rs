//! the status line, as consumed by dwm's status bar.
//!
//! dwm's status parser treats two control bytes as colour-zone markers: [`NORMAL`] switches to
//! the normal scheme and [`ACCENT`] to the highlighted one. fragments carry these markers
//! themselves, and the composer interleaves the labels between them.

use std::fmt::{self, Display, Write};

/// switches the renderer to its normal colour scheme.
pub const NORMAL: char = '\x01';
/// switches the renderer to its accented colour scheme.
pub const ACCENT: char = '\x02';

/// length caps, in characters.
pub mod cap {
    pub const STATUS: usize = 255;
    pub const CLOCK: usize = 31;
    pub const NET: usize = 31;
    pub const MEDIA: usize = 127;
    pub const VOLUME: usize = 3;
}

/// one cycle's worth of sampled fragments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sample {
    /// `artist ACCENT title`, or empty when nothing is playing.
    pub media: String,
    /// fraction of cpu time spent working.
    pub cpu: f64,
    /// fraction of memory in use.
    pub mem: f64,
    /// network fragment, delimiters included.
    pub net: String,
    /// volume token.
    pub volume: String,
    /// clock fragment, delimiters included.
    pub time: String,
}

// === impl Sample ===

impl Sample {
    /// composes the status line, truncated to [`cap::STATUS`].
    pub fn compose(&self) -> String {
        let mut status = String::with_capacity(cap::STATUS);
        // writing to a `String` cannot fail.
        let _ = write!(status, "{self}");
        truncate(&mut status, cap::STATUS);
        status
    }
}

impl Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            media,
            cpu,
            mem,
            net,
            volume,
            time,
        } = self;

        write!(
            f,
            "{NORMAL}{media}{NORMAL} Cpu{ACCENT}{cpu:.2} {NORMAL}Mem{ACCENT}{mem:.2}{net} \
             {NORMAL}Vol{ACCENT}{volume} {time}"
        )
    }
}

/// truncates `s` to at most `cap` characters.
pub fn truncate(s: &mut String, cap: usize) {
    if let Some((end, _)) = s.char_indices().nth(cap) {
        s.truncate(end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sample {
        Sample {
            media: "A\x02B".to_owned(),
            cpu: 0.123,
            mem: 0.5,
            net: "\x01 Eth\x02On".to_owned(),
            volume: "42".to_owned(),
            time: "\x01Tue\x0205\x01Mar\x0214:07".to_owned(),
        }
    }

    #[test]
    fn layout_is_byte_exact() {
        assert_eq!(
            sample().compose(),
            "\x01A\x02B\x01 Cpu\x020.12 \x01Mem\x020.50\x01 Eth\x02On \x01Vol\x0242 \
             \x01Tue\x0205\x01Mar\x0214:07"
        );
    }

    #[test]
    fn empty_media_keeps_markers() {
        let status = Sample {
            media: String::new(),
            ..sample()
        }
        .compose();
        assert!(status.starts_with("\x01\x01 Cpu\x02"));
    }

    #[test]
    fn status_is_capped() {
        let status = Sample {
            media: "x".repeat(400),
            ..sample()
        }
        .compose();
        assert_eq!(status.chars().count(), cap::STATUS);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let mut s = "héllo".to_owned();
        truncate(&mut s, 2);
        assert_eq!(s, "hé");
    }

    #[test]
    fn truncate_short_string_is_noop() {
        let mut s = "N/A".to_owned();
        truncate(&mut s, cap::VOLUME);
        assert_eq!(s, "N/A");
    }
}
