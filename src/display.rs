//! where the status line goes.

use {
    std::io,
    tracing::{debug, info},
    x11rb::{
        connection::Connection,
        errors::{ConnectError, ConnectionError},
        protocol::xproto::{AtomEnum, PropMode, Window},
        rust_connection::RustConnection,
        wrapper::ConnectionExt as _,
    },
};

pub use self::terminal::{Terminal, Zone, zones};

mod terminal;

/// a consumer of composed status lines.
pub trait Sink {
    /// publishes `status`, and ensures it has been delivered.
    fn publish(&mut self, status: &str) -> Result<(), DisplayError>;
}

/// the root window of an x display, whose name dwm renders as its status bar.
///
/// the connection is opened once and held until this is dropped.
pub struct RootWindow {
    conn: RustConnection,
    root: Window,
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("could not open display: {0}")]
    Connect(#[from] ConnectError),
    #[error("display has no screen {0}")]
    NoScreen(usize),
    #[error("display connection failed: {0}")]
    Connection(#[from] ConnectionError),
    #[error("terminal write failed: {0}")]
    Terminal(#[from] io::Error),
}

// === impl RootWindow ===

impl RootWindow {
    /// connects to the named display, or `$DISPLAY` if `None`, and resolves the default
    /// screen's root window.
    pub fn open(display: Option<&str>) -> Result<Self, DisplayError> {
        let (conn, screen) = x11rb::connect(display)?;
        let root = conn
            .setup()
            .roots
            .get(screen)
            .map(|screen| screen.root)
            .ok_or(DisplayError::NoScreen(screen))?;

        info!(screen, root, "connected to display");
        Ok(Self { conn, root })
    }
}

impl Sink for RootWindow {
    fn publish(&mut self, status: &str) -> Result<(), DisplayError> {
        let Self { conn, root } = self;

        conn.change_property8(
            PropMode::REPLACE,
            *root,
            AtomEnum::WM_NAME,
            AtomEnum::STRING,
            status.as_bytes(),
        )?;
        conn.flush()?;

        debug!(?status, "stored root window name");
        Ok(())
    }
}
