use std::{
    cell::RefCell,
    collections::VecDeque,
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::PathBuf,
};

pub use self::{clock::*, stats::*};

mod clock {
    use chrono::{DateTime, Local};

    /// a source of wall-clock time.
    pub trait Clock {
        fn now(&self) -> DateTime<Local>;
    }

    /// the system's local time.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct LocalClock;

    impl Clock for LocalClock {
        fn now(&self) -> DateTime<Local> {
            Local::now()
        }
    }

    /// a clock that is stopped at a fixed moment.
    #[derive(Clone, Copy, Debug)]
    pub struct FixedClock(pub DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            let Self(time) = self;
            *time
        }
    }
}

/// abstracts over providers of kernel statistics.
mod stats {
    use super::*;

    /// a source of kernel statistics.
    pub trait StatsSource {
        /// returns a reader.
        fn open(&self) -> io::Result<impl Read>;
    }

    /// stats backed by a file, e.g. `/proc/stat` or `/proc/meminfo`.
    #[derive(Clone, Debug)]
    pub struct ProcFile {
        path: PathBuf,
    }

    /// a mock stat source.
    ///
    /// each call to [`StatsSource::open()`] yields the next queued string. once the queue is
    /// empty, opening fails as though the file did not exist.
    #[derive(Default)]
    pub struct MockStatFile {
        stats: RefCell<VecDeque<String>>,
    }

    // === impl ProcFile ===

    impl ProcFile {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl StatsSource for ProcFile {
        fn open(&self) -> io::Result<impl Read> {
            File::open(&self.path).map(BufReader::new)
        }
    }

    // === impl MockStatFile ===

    impl MockStatFile {
        pub fn new<I>(stats: I) -> Self
        where
            I: IntoIterator,
            I::Item: Into<String>,
        {
            let stats = stats.into_iter().map(Into::into).collect();
            Self {
                stats: RefCell::new(stats),
            }
        }

        pub fn push(&self, stat: impl Into<String>) {
            self.stats.borrow_mut().push_back(stat.into());
        }
    }

    impl StatsSource for MockStatFile {
        fn open(&self) -> io::Result<impl Read> {
            let Self { stats } = self;

            stats
                .borrow_mut()
                .pop_front()
                .map(Cursor::new)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock stats are empty"))
        }
    }
}
