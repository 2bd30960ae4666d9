use std::{
    ops::{Add, Div},
    str::FromStr,
};

/// a count of kernel clock ticks.
///
/// `/proc/stat` reports cpu time in units of `USER_HZ`, usually 1/100th of a second.
#[derive(Clone, Copy, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Jiffies(u64);

// === impl Jiffies ===

impl Jiffies {
    pub const ZERO: Self = Self(0);

    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// returns the ticks elapsed since `earlier`, or `None` if the counter went backwards.
    pub fn since(self, earlier: Self) -> Option<Self> {
        let (Self(now), Self(then)) = (self, earlier);
        now.checked_sub(then).map(Self)
    }
}

impl FromStr for Jiffies {
    type Err = <u64 as FromStr>::Err;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl Add for Jiffies {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        Self(lhs.saturating_add(rhs))
    }
}

impl Div for Jiffies {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        let (Self(lhs), Self(rhs)) = (self, rhs);
        lhs as f64 / rhs as f64
    }
}
