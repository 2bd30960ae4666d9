use {
    crate::{
        source::Clock,
        status::{cap, truncate},
    },
    chrono::{DateTime, Local},
    std::fmt::Write,
    tracing::warn,
};

/// dwm-style clock: `NORMAL weekday ACCENT day NORMAL month ACCENT HH:MM`.
pub const DEFAULT_FORMAT: &str = "\x01%a\x02%d\x01%b\x02%H:%M";

/// samples the clock, formatting the current time with a strftime-style `format`.
pub fn sample(clock: &impl Clock, format: &str) -> String {
    render(&clock.now(), format)
}

/// formats `time`, truncated to [`cap::CLOCK`].
///
/// an invalid format string yields an empty fragment rather than a panic.
pub fn render(time: &DateTime<Local>, format: &str) -> String {
    let mut out = String::new();
    if let Err(error) = write!(out, "{}", time.format(format)) {
        warn!(%error, %format, "invalid clock format");
        out.clear();
    }
    truncate(&mut out, cap::CLOCK);
    out
}
