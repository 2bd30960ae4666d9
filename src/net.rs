use {
    crate::status::{ACCENT, NORMAL, cap, truncate},
    serde::Deserialize,
    std::{
        fs,
        path::{Path, PathBuf},
    },
    tracing::{debug, warn},
};

pub use self::wireless::{IwSocket, WirelessError};

mod wireless;


/// shown when the wired interface is up.
pub const WIRED: &str = "\x01 Eth\x02On";
/// shown when no interface is usable.
pub const OFFLINE: &str = "\x01 Eth\x02No";

/// the network interfaces to watch, in priority order.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct Interfaces {
    /// where per-interface state lives, usually `/sys/class/net`.
    pub sysfs: PathBuf,
    /// checked first.
    pub wired: String,
    /// checked if the wired interface is not up.
    pub wireless: String,
}

/// a source of wireless configuration and signal statistics.
pub trait Wireless {
    fn query(&self, device: &str) -> Result<WirelessInfo, WirelessError>;
}

/// the basic configuration and signal quality reported by a wireless driver.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WirelessInfo {
    /// the network name.
    pub essid: String,
    /// whether the network name is active.
    pub essid_on: bool,
    pub quality: Quality,
}

/// driver-reported link quality, on a driver-defined scale.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Quality {
    pub current: u8,
    pub max: u8,
}

// === impl Interfaces ===

impl Default for Interfaces {
    fn default() -> Self {
        Self {
            sysfs: PathBuf::from("/sys/class/net"),
            wired: "enp4s0".to_owned(),
            wireless: "wlan0".to_owned(),
        }
    }
}

impl Interfaces {
    /// returns true iff the operational state of `device` reads exactly `up`.
    pub fn is_up(&self, device: &str) -> bool {
        is_up(&self.sysfs, device)
    }

    /// samples the network fragment.
    ///
    /// the wired interface wins if it is up. otherwise a wireless interface that is up and
    /// associated with a named network is shown by name and quality. anything else is
    /// [`OFFLINE`].
    pub fn sample(&self, wireless: &impl Wireless) -> String {
        let Self {
            sysfs: _,
            wired,
            wireless: device,
        } = self;

        if self.is_up(wired) {
            return WIRED.to_owned();
        }

        if !self.is_up(device) {
            return OFFLINE.to_owned();
        }

        match wireless.query(device) {
            Ok(info) if info.essid_on => info.fragment(),
            Ok(_) => {
                debug!(%device, "wireless interface has no active essid");
                OFFLINE.to_owned()
            }
            Err(error) => {
                warn!(%error, %device, "wireless query failed");
                OFFLINE.to_owned()
            }
        }
    }
}

/// returns true iff `<sysfs>/<device>/operstate` reads exactly `up`.
pub fn is_up(sysfs: &Path, device: &str) -> bool {
    let path = sysfs.join(device).join("operstate");
    match fs::read_to_string(&path) {
        Ok(state) => state.trim() == "up",
        Err(error) => {
            debug!(%error, path = %path.display(), "cannot read operstate");
            false
        }
    }
}

// === impl WirelessInfo ===

impl WirelessInfo {
    /// renders `NORMAL essid ACCENT percent`, truncated to [`cap::NET`].
    pub fn fragment(&self) -> String {
        let Self {
            essid,
            essid_on: _,
            quality,
        } = self;

        let mut fragment = format!("{NORMAL}{essid}{ACCENT}{}", quality.percent());
        truncate(&mut fragment, cap::NET);
        fragment
    }
}

// === impl Quality ===

impl Quality {
    /// returns `current * 100 / max`, rounded down. a zero maximum reads as zero.
    pub fn percent(&self) -> u32 {
        let Self { current, max } = *self;
        match max {
            0 => 0,
            max => u32::from(current) * 100 / u32::from(max),
        }
    }
}
