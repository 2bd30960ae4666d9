use super::*;

/// how the system's cpus have spent their time since boot, in aggregate.
///
/// only the first seven columns of the `cpu` line are kept. `steal`, `guest`, and `guest_nice`
/// are not reported by older kernels, and are not needed here.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CpuTime {
    /// time spent in user mode.
    user: Jiffies,
    /// time spent in user mode with low priority (nice).
    nice: Jiffies,
    /// time spent in system mode.
    system: Jiffies,
    /// time spent in the idle task.
    idle: Jiffies,
    /// time waiting for i/o to complete.
    ///
    /// this value is not reliable, and may decrease in certain conditions.
    iowait: Jiffies,
    /// time servicing interrupts.
    irq: Jiffies,
    /// time servicing softirqs.
    softirq: Jiffies,
}

// === impl CpuTime ===

impl CpuTime {
    /// the number of columns read from a `cpu` line.
    pub const COLUMNS: usize = 7;

    /// returns the sum of all seven columns, idle time included.
    pub fn total(&self) -> Jiffies {
        let Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
        } = *self;

        user + nice + system + idle + iowait + irq + softirq
    }

    /// returns the time spent doing work.
    ///
    /// NB: this is `user + nice + system` only. i/o wait and interrupt servicing count towards
    /// [`CpuTime::total()`] but not towards work, so the resulting fraction sits below what
    /// `total - idle` would report.
    pub fn work(&self) -> Jiffies {
        let Self {
            user,
            nice,
            system,
            idle: _,
            iowait: _,
            irq: _,
            softirq: _,
        } = *self;

        user + nice + system
    }
}

impl FromStr for CpuTime {
    type Err = StatParseError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("cpu") => {}
            Some(kind) => {
                return Err(StatParseError::UnrecognizedEntry {
                    kind: kind.to_owned(),
                });
            }
            None => return Err(StatParseError::Empty),
        }

        tokens
            .take(Self::COLUMNS)
            .map(str::parse::<Jiffies>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StatParseError::JiffiesParse)
            .and_then(Self::try_from)
    }
}

impl TryFrom<Vec<Jiffies>> for CpuTime {
    type Error = StatParseError;
    fn try_from(times: Vec<Jiffies>) -> Result<Self, Self::Error> {
        let found = times.len();
        <_ as TryInto<[_; CpuTime::COLUMNS]>>::try_into(times)
            .map(Self::from)
            .map_err(|_| StatParseError::TooFewColumns { found })
    }
}

impl From<[Jiffies; CpuTime::COLUMNS]> for CpuTime {
    fn from(
        [user, nice, system, idle, iowait, irq, softirq]: [Jiffies; CpuTime::COLUMNS],
    ) -> Self {
        Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
        }
    }
}

impl From<CpuTime> for [Jiffies; CpuTime::COLUMNS] {
    fn from(
        CpuTime {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
        }: CpuTime,
    ) -> Self {
        [user, nice, system, idle, iowait, irq, softirq]
    }
}
