use {
    super::{DisplayError, Sink},
    crate::status::{ACCENT, NORMAL},
    crossterm::{
        QueueableCommand, cursor,
        style::{self, Stylize},
        terminal,
    },
    std::io::{self, Write},
};

/// previews the status line on a terminal, rewriting the current line each cycle.
pub struct Terminal<W = io::Stdout> {
    out: W,
}

/// the colour zone a run of text is rendered in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Zone {
    Normal,
    Accent,
}

// === impl Terminal ===

impl Terminal {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for Terminal<W> {
    fn publish(&mut self, status: &str) -> Result<(), DisplayError> {
        let Self { out } = self;

        out.queue(cursor::MoveToColumn(0))?
            .queue(terminal::Clear(terminal::ClearType::CurrentLine))?;

        for (zone, text) in zones(status) {
            let styled = match zone {
                Zone::Normal => text.grey(),
                Zone::Accent => text.green(),
            };
            out.queue(style::PrintStyledContent(styled))?;
        }

        out.flush()?;
        Ok(())
    }
}

/// splits a status line into runs of text and the zone each is drawn in.
///
/// the delimiter bytes themselves are dropped, as are empty runs.
pub fn zones(status: &str) -> Vec<(Zone, &str)> {
    let mut zones = Vec::new();
    let mut zone = Zone::Normal;
    let mut rest = status;

    while let Some(at) = rest.find([NORMAL, ACCENT]) {
        let (text, tail) = rest.split_at(at);
        if !text.is_empty() {
            zones.push((zone, text));
        }
        let mut chars = tail.chars();
        zone = match chars.next() {
            Some(ACCENT) => Zone::Accent,
            _ => Zone::Normal,
        };
        rest = chars.as_str();
    }

    if !rest.is_empty() {
        zones.push((zone, rest));
    }

    zones
}
