use {
    crate::{
        source::{ProcFile, StatsSource},
        stat::{self, CpuTime, Jiffies, StatReadError},
    },
    tracing::{debug, warn},
};

/// observes kernel cpu statistics, and computes utilization between two readings.
pub struct Sentinel<S = ProcFile> {
    /// the underlying source of kernel statistics.
    source: S,
    inner: Inner,
}

enum Inner {
    /// no baseline could be read yet.
    Initialized,
    /// a baseline is held for the next observation.
    Running {
        /// the last recorded counters.
        last: Counters,
    },
}

/// the pair of counters carried from one cycle to the next.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counters {
    /// all ticks, idle included.
    pub total: Jiffies,
    /// ticks spent in user, nice, and system mode.
    pub work: Jiffies,
}

// === impl Sentinel ===

impl<S: StatsSource> Sentinel<S> {
    /// creates a new [`Sentinel`], reading the initial baseline from `source`.
    pub fn new(source: S) -> Self {
        let mut sentinel = Self {
            source,
            inner: Inner::Initialized,
        };
        sentinel.rebase();
        sentinel
    }

    /// returns the fraction of cpu time spent working since the baseline was last recorded.
    ///
    /// the baseline is left untouched; see [`Sentinel::rebase()`]. if either reading is
    /// missing, this returns `0.0`.
    pub fn observe(&self) -> f64 {
        let Self { source, inner } = self;

        let Inner::Running { last } = inner else {
            return 0.0;
        };

        match Self::read(source) {
            Ok(now) => fraction(*last, now),
            Err(error) => {
                warn!(%error, "failed to read cpu statistics");
                0.0
            }
        }
    }

    /// records fresh counters as the baseline for the next observation.
    ///
    /// on failure the previous baseline, if any, is kept.
    pub fn rebase(&mut self) {
        let Self { source, inner } = self;

        match Self::read(source) {
            Ok(last) => *inner = Inner::Running { last },
            Err(error) => warn!(%error, "failed to record cpu baseline"),
        }
    }

    /// returns the current baseline, if one has been recorded.
    pub fn baseline(&self) -> Option<Counters> {
        match self.inner {
            Inner::Initialized => None,
            Inner::Running { last } => Some(last),
        }
    }

    fn read(source: &S) -> Result<Counters, StatReadError> {
        stat::read(source).map(Counters::from)
    }
}

/// computes `(work_now - work_prev) / (total_now - total_prev)`.
///
/// returns `0.0` when the total has not advanced. the result is not clamped.
pub fn fraction(prev: Counters, now: Counters) -> f64 {
    let total = match now.total.since(prev.total) {
        Some(total) if total > Jiffies::ZERO => total,
        _ => return 0.0,
    };
    let Some(work) = now.work.since(prev.work) else {
        debug!(?prev, ?now, "work counter went backwards");
        return 0.0;
    };

    work / total
}

// === impl Counters ===

impl From<CpuTime> for Counters {
    fn from(time: CpuTime) -> Self {
        Self {
            total: time.total(),
            work: time.work(),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockStatFile};

    fn counters(total: u64, work: u64) -> Counters {
        Counters {
            total: Jiffies::new(total),
            work: Jiffies::new(work),
        }
    }

    #[test]
    fn fraction_of_deltas() {
        let f = fraction(counters(1000, 100), counters(1400, 200));
        assert!((f - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn fraction_is_zero_when_total_is_unchanged() {
        assert_eq!(fraction(counters(1000, 100), counters(1000, 150)), 0.0);
    }

    #[test]
    fn fraction_is_zero_when_total_goes_backwards() {
        assert_eq!(fraction(counters(1000, 100), counters(900, 150)), 0.0);
    }

    #[test]
    fn fraction_is_not_clamped() {
        // not reachable with real counters, but nothing here pretends otherwise.
        let f = fraction(counters(0, 0), counters(10, 20));
        assert!((f - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn observe_leaves_baseline_untouched() {
        let source = MockStatFile::new(["cpu 10 0 0 90 0 0 0\n"]);
        source.push("cpu 20 0 0 180 0 0 0\n");
        source.push("cpu 30 0 0 270 0 0 0\n");

        let sentinel = Sentinel::new(source);
        assert_eq!(sentinel.baseline(), Some(counters(100, 10)));

        let first = sentinel.observe();
        assert!((first - 0.1).abs() < 1e-9);
        let second = sentinel.observe();
        assert!((second - 0.1).abs() < 1e-9);
        assert_eq!(sentinel.baseline(), Some(counters(100, 10)));
    }

    #[test]
    fn rebase_moves_the_baseline() {
        let source = MockStatFile::new(["cpu 10 0 0 90 0 0 0\n", "cpu 50 0 0 150 0 0 0\n"]);
        source.push("cpu 60 0 0 240 0 0 0\n");

        let mut sentinel = Sentinel::new(source);
        sentinel.rebase();
        assert_eq!(sentinel.baseline(), Some(counters(200, 50)));

        let f = sentinel.observe();
        assert!((f - 0.1).abs() < 1e-9);
    }

    #[test]
    fn missing_baseline_reads_as_idle() {
        let sentinel = Sentinel::new(MockStatFile::new(["garbage\n", "cpu 1 1 1 1 1 1 1\n"]));
        assert_eq!(sentinel.baseline(), None);
        assert_eq!(sentinel.observe(), 0.0);
    }

    #[test]
    fn failed_rebase_keeps_previous_baseline() {
        let mut sentinel = Sentinel::new(MockStatFile::new(["cpu 1 1 1 1 1 1 1\n"]));
        sentinel.rebase();
        assert_eq!(sentinel.baseline(), Some(counters(7, 3)));
    }

    #[test]
    fn unreadable_observation_reads_as_idle() {
        let sentinel = Sentinel::new(MockStatFile::new(["cpu 1 1 1 1 1 1 1\n"]));
        assert_eq!(sentinel.observe(), 0.0);
    }
}
