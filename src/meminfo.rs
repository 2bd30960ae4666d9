//! system memory utilization via `/proc/meminfo`.

use {
    crate::source::StatsSource,
    std::{
        io::{self, Read},
        num::ParseIntError,
        str::FromStr,
    },
    tracing::warn,
};

/// the fields of `/proc/meminfo` needed to compute utilization, in kilobytes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MemInfo {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    pub cached: u64,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum MemInfoParseError {
    #[error("{label} not found")]
    Missing { label: &'static str },
    #[error("invalid value for {label}: {source}")]
    Value {
        label: &'static str,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MemInfoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] MemInfoParseError),
}

// === impl MemInfo ===

impl MemInfo {
    const TOTAL: &str = "MemTotal:";
    const FREE: &str = "MemFree:";
    const BUFFERS: &str = "Buffers:";
    const CACHED: &str = "Cached:";

    /// reads memory information from the given source.
    pub fn read(source: &impl StatsSource) -> Result<Self, MemInfoError> {
        let mut content = String::new();
        source.open()?.read_to_string(&mut content)?;
        content.parse().map_err(MemInfoError::from)
    }

    /// returns `(total - free - buffers - cached) / total`, clamped to `[0.0, 1.0]`.
    ///
    /// a zero total yields `0.0`.
    pub fn utilization(&self) -> f64 {
        let Self {
            total,
            free,
            buffers,
            cached,
        } = *self;

        if total == 0 {
            return 0.0;
        }

        let used = total as f64 - free as f64 - buffers as f64 - cached as f64;
        (used / total as f64).clamp(0.0, 1.0)
    }
}

impl FromStr for MemInfo {
    type Err = MemInfoParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mut total, mut free, mut buffers, mut cached) = (None, None, None, None);

        for line in s.lines() {
            let mut words = line.split_whitespace();
            let (Some(label), Some(value)) = (words.next(), words.next()) else {
                continue;
            };
            let (slot, label) = match label {
                Self::TOTAL => (&mut total, Self::TOTAL),
                Self::FREE => (&mut free, Self::FREE),
                Self::BUFFERS => (&mut buffers, Self::BUFFERS),
                Self::CACHED => (&mut cached, Self::CACHED),
                _ => continue,
            };
            let value = value
                .parse::<u64>()
                .map_err(|source| MemInfoParseError::Value { label, source })?;
            slot.get_or_insert(value);

            if total.is_some() && free.is_some() && buffers.is_some() && cached.is_some() {
                break;
            }
        }

        let require = |value: Option<u64>, label: &'static str| {
            value.ok_or(MemInfoParseError::Missing { label })
        };
        Ok(Self {
            total: require(total, Self::TOTAL)?,
            free: require(free, Self::FREE)?,
            buffers: require(buffers, Self::BUFFERS)?,
            cached: require(cached, Self::CACHED)?,
        })
    }
}

/// samples memory utilization, reading `0.0` if the source is unreadable or malformed.
pub fn sample(source: &impl StatsSource) -> f64 {
    match MemInfo::read(source) {
        Ok(info) => info.utilization(),
        Err(error) => {
            warn!(%error, "failed to read memory information");
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::source::MockStatFile};

    const SAMPLE_MEMINFO: &str = "\
MemTotal:        3884292 kB
MemFree:          218456 kB
MemAvailable:    2456780 kB
Buffers:          123456 kB
Cached:          1987654 kB
SwapCached:            0 kB
Active:          1234567 kB
";

    #[test]
    fn parse_meminfo() {
        let info = SAMPLE_MEMINFO.parse::<MemInfo>().unwrap();
        assert_eq!(
            info,
            MemInfo {
                total: 3884292,
                free: 218456,
                buffers: 123456,
                cached: 1987654,
            }
        );
    }

    #[test]
    fn swap_cached_is_not_cached() {
        const MEMINFO: &str = "\
MemTotal: 100 kB
MemFree: 10 kB
Buffers: 10 kB
SwapCached: 70 kB
Cached: 20 kB
";
        assert_eq!(MEMINFO.parse::<MemInfo>().unwrap().cached, 20);
    }

    #[test]
    fn utilization() {
        let info = SAMPLE_MEMINFO.parse::<MemInfo>().unwrap();
        let expected = (3884292.0 - 218456.0 - 123456.0 - 1987654.0) / 3884292.0;
        assert!((info.utilization() - expected).abs() < 1e-12);
    }

    #[test]
    fn utilization_is_clamped() {
        let info = MemInfo {
            total: 100,
            free: 80,
            buffers: 30,
            cached: 30,
        };
        assert_eq!(info.utilization(), 0.0);
    }

    #[test]
    fn zero_total_is_zero() {
        assert_eq!(MemInfo::default().utilization(), 0.0);
    }

    #[test]
    fn missing_field() {
        let err = "MemTotal: 100 kB\nMemFree: 10 kB\n"
            .parse::<MemInfo>()
            .unwrap_err();
        assert_eq!(err, MemInfoParseError::Missing { label: "Buffers:" });
    }

    #[test]
    fn bad_value() {
        let err = "MemTotal: lots kB\n".parse::<MemInfo>().unwrap_err();
        assert!(matches!(
            err,
            MemInfoParseError::Value {
                label: "MemTotal:",
                ..
            }
        ));
    }

    #[test]
    fn sample_falls_back_to_zero() {
        assert_eq!(sample(&MockStatFile::new(["nonsense"])), 0.0);
        assert_eq!(sample(&MockStatFile::default()), 0.0);
    }

    #[test]
    fn sample_reads_source() {
        let source = MockStatFile::new([SAMPLE_MEMINFO]);
        let expected = SAMPLE_MEMINFO.parse::<MemInfo>().unwrap().utilization();
        assert_eq!(sample(&source), expected);
    }
}
