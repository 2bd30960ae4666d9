use {
    crate::source::StatsSource,
    std::{
        io::{self, BufRead, BufReader},
        num::ParseIntError,
        str::FromStr,
    },
};

pub use self::{cpu_time::CpuTime, jiffies::Jiffies};

mod cpu_time;
mod jiffies;


#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum StatParseError {
    #[error("empty entry")]
    Empty,
    #[error("unrecognized entry kind: {kind}")]
    UnrecognizedEntry { kind: String },
    #[error("invalid time value: {0}")]
    JiffiesParse(#[source] ParseIntError),
    #[error("expected {} cpu time columns, found {found}", CpuTime::COLUMNS)]
    TooFewColumns { found: usize },
    #[error("no aggregate cpu line")]
    MissingCpuLine,
}

#[derive(Debug, thiserror::Error)]
pub enum StatReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Entry(#[from] StatParseError),
}

/// reads the aggregate `cpu` line from the given source of kernel statistics.
///
/// see `proc_stat(5)` for more information. per-cpu (`cpuN`) lines and every other entry in
/// the table are skipped.
pub fn read(stats: &impl StatsSource) -> Result<CpuTime, StatReadError> {
    let reader = stats.open().map(BufReader::new)?;

    for line in reader.lines() {
        let line = line?;
        if line.split_whitespace().next() == Some("cpu") {
            return line.parse::<CpuTime>().map_err(StatReadError::from);
        }
    }

    Err(StatParseError::MissingCpuLine.into())
}
