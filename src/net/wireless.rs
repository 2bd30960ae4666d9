//! linux wireless extensions.
//!
//! this speaks the same `SIOCGIW*` ioctls that `iwconfig(8)` uses, over a datagram socket that
//! is opened for each query and closed when it returns.

use {
    super::{Quality, Wireless, WirelessInfo},
    nix::{
        errno::Errno,
        libc::{c_char, c_void},
        sys::socket::{AddressFamily, SockFlag, SockType, socket},
    },
    std::os::fd::{AsRawFd, RawFd},
    tracing::debug,
};

const IFNAMSIZ: usize = 16;
const IW_ESSID_MAX_SIZE: usize = 32;

const SIOCGIWRANGE: u32 = 0x8B0B;
const SIOCGIWSTATS: u32 = 0x8B0F;
const SIOCGIWESSID: u32 = 0x8B1B;

/// room for a `struct iw_range`, which is a little over a kilobyte.
const RANGE_SIZE: usize = 2048;
/// offset of `max_qual.qual` within `struct iw_range`.
const RANGE_MAX_QUAL: usize = 44;
/// room for a `struct iw_statistics`.
const STATS_SIZE: usize = 64;
/// offset of `qual.qual` within `struct iw_statistics`.
const STATS_QUAL: usize = 2;

mod ioctl {
    use super::{IwReq, SIOCGIWESSID, SIOCGIWRANGE, SIOCGIWSTATS};

    nix::ioctl_read_bad!(siocgiwessid, SIOCGIWESSID, IwReq);
    nix::ioctl_read_bad!(siocgiwstats, SIOCGIWSTATS, IwReq);
    nix::ioctl_read_bad!(siocgiwrange, SIOCGIWRANGE, IwReq);
}

/// queries wireless drivers through the kernel's wireless extensions.
#[derive(Clone, Copy, Debug, Default)]
pub struct IwSocket;

#[derive(Debug, thiserror::Error)]
pub enum WirelessError {
    #[error("invalid interface name: {0:?}")]
    InterfaceName(String),
    #[error("failed to open socket: {0}")]
    Socket(#[source] Errno),
    #[error("{request} failed: {source}")]
    Ioctl {
        request: &'static str,
        #[source]
        source: Errno,
    },
}

/// `struct iw_point`.
#[repr(C)]
#[allow(dead_code, reason = "read by the kernel")]
#[derive(Clone, Copy)]
struct IwPoint {
    pointer: *mut c_void,
    length: u16,
    flags: u16,
}

/// `union iwreq_data`, of which only the `iw_point` member is used.
#[repr(C)]
#[allow(dead_code, reason = "read by the kernel")]
union IwReqData {
    point: IwPoint,
    raw: [u8; 16],
}

/// `struct iwreq`.
#[repr(C)]
#[allow(dead_code, reason = "read by the kernel")]
struct IwReq {
    name: [c_char; IFNAMSIZ],
    data: IwReqData,
}

// === impl IwSocket ===

impl Wireless for IwSocket {
    fn query(&self, device: &str) -> Result<WirelessInfo, WirelessError> {
        let socket = socket(
            AddressFamily::Inet,
            SockType::Datagram,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(WirelessError::Socket)?;
        let fd = socket.as_raw_fd();

        let (essid, essid_on) = Self::essid(fd, device)?;

        // signal statistics are best-effort; a driver that cannot report them reads as zero.
        let quality = Quality {
            current: Self::stats(fd, device).unwrap_or_else(|error| {
                debug!(%error, %device, "no signal statistics");
                0
            }),
            max: Self::range(fd, device).unwrap_or_else(|error| {
                debug!(%error, %device, "no signal range");
                0
            }),
        };

        Ok(WirelessInfo {
            essid,
            essid_on,
            quality,
        })
    }
}

impl IwSocket {
    /// returns the network name, and whether it is active.
    fn essid(fd: RawFd, device: &str) -> Result<(String, bool), WirelessError> {
        let mut buf = [0u8; IW_ESSID_MAX_SIZE + 2];
        let mut req = IwReq::new(device, &mut buf, 0)?;

        // SAFETY: `req` points at `buf`, which outlives the call and is as long as it claims.
        unsafe { ioctl::siocgiwessid(fd, &mut req) }.map_err(|source| WirelessError::Ioctl {
            request: "SIOCGIWESSID",
            source,
        })?;

        // SAFETY: every member of the union is plain data, and the kernel writes `iw_point`.
        let IwPoint { length, flags, .. } = unsafe { req.data.point };
        let length = usize::from(length).min(IW_ESSID_MAX_SIZE);
        let essid = String::from_utf8_lossy(&buf[..length])
            .trim_end_matches('\0')
            .to_owned();

        Ok((essid, flags != 0))
    }

    /// returns the current link quality.
    fn stats(fd: RawFd, device: &str) -> Result<u8, WirelessError> {
        let mut buf = [0u8; STATS_SIZE];
        // a non-zero flag asks the driver to clear its "updated" markers.
        let mut req = IwReq::new(device, &mut buf, 1)?;

        // SAFETY: `req` points at `buf`, which outlives the call and is as long as it claims.
        unsafe { ioctl::siocgiwstats(fd, &mut req) }.map_err(|source| WirelessError::Ioctl {
            request: "SIOCGIWSTATS",
            source,
        })?;

        Ok(buf[STATS_QUAL])
    }

    /// returns the maximum link quality.
    fn range(fd: RawFd, device: &str) -> Result<u8, WirelessError> {
        let mut buf = vec![0u8; RANGE_SIZE];
        let mut req = IwReq::new(device, &mut buf, 0)?;

        // SAFETY: `req` points at `buf`, which outlives the call and is as long as it claims.
        unsafe { ioctl::siocgiwrange(fd, &mut req) }.map_err(|source| WirelessError::Ioctl {
            request: "SIOCGIWRANGE",
            source,
        })?;

        Ok(buf[RANGE_MAX_QUAL])
    }
}

// === impl IwReq ===

impl IwReq {
    fn new(device: &str, buf: &mut [u8], flags: u16) -> Result<Self, WirelessError> {
        let bytes = device.as_bytes();
        if bytes.is_empty() || bytes.len() >= IFNAMSIZ || bytes.contains(&0) {
            return Err(WirelessError::InterfaceName(device.to_owned()));
        }

        let mut name = [0 as c_char; IFNAMSIZ];
        for (dst, src) in name.iter_mut().zip(bytes) {
            *dst = *src as c_char;
        }

        let mut data = IwReqData { raw: [0; 16] };
        data.point = IwPoint {
            pointer: buf.as_mut_ptr().cast(),
            length: u16::try_from(buf.len()).unwrap_or(u16::MAX),
            flags,
        };

        Ok(Self { name, data })
    }
}
