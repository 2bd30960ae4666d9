//! a compact status line for dwm.
//!
//! every cycle samples the system, composes one line of text, and stores it as the name of the
//! x root window, where dwm draws it as its status bar.

#[cfg(not(target_os = "linux"))]
compile_error!("dwmstatus supports only linux");

use {
    self::{
        display::{DisplayError, Sink},
        net::Wireless,
        sentinel::Sentinel,
        source::{Clock, LocalClock, ProcFile},
        status::Sample,
    },
    std::{
        sync::mpsc::{Receiver, RecvTimeoutError},
        time::Duration,
    },
    tracing::{debug, info},
};

pub use self::{config::Config, display::RootWindow, net::IwSocket};

pub mod clock;
pub mod config;
pub mod display;
pub mod meminfo;
pub mod mpd;
pub mod net;
pub mod sentinel;
pub mod source;
pub mod stat;
pub mod status;
pub mod volume;

/// the status line's sampling loop.
pub struct App<K = RootWindow, W = IwSocket, C = LocalClock> {
    config: Config,
    /// where composed lines are published.
    sink: K,
    /// the wireless driver interface.
    wireless: W,
    clock: C,
    /// carries the cpu baseline from one cycle to the next.
    sentinel: Sentinel<ProcFile>,
    meminfo: ProcFile,
}

/// why a sleep ended.
#[derive(Debug, Eq, PartialEq)]
enum Wake {
    Elapsed,
    Shutdown,
}

// === impl App ===

impl<K: Sink, W: Wireless, C: Clock> App<K, W, C> {
    /// initializes a new application, recording the initial cpu baseline.
    pub fn new(config: Config, sink: K, wireless: W, clock: C) -> Self {
        let sentinel = Sentinel::new(ProcFile::new(&config.proc_stat));
        let meminfo = ProcFile::new(&config.proc_meminfo);

        Self {
            config,
            sink,
            wireless,
            clock,
            sentinel,
            meminfo,
        }
    }

    /// runs the application until `shutdown` fires, or the configured number of cycles is
    /// done.
    ///
    /// a failure to publish ends the loop; the display connection cannot recover from it.
    pub fn run(&mut self, shutdown: &Receiver<()>) -> Result<(), DisplayError> {
        let interval = self.config.interval();
        let mut done = 0_u64;

        loop {
            self.cycle()?;
            done += 1;

            if self.config.cycles.is_some_and(|limit| done >= limit) {
                info!(cycles = done, "cycle limit reached");
                return Ok(());
            }

            if Self::sleep(interval, shutdown) == Wake::Shutdown {
                info!(cycles = done, "shutting down");
                return Ok(());
            }
        }
    }

    /// samples, composes, and publishes one status line, then moves the cpu baseline forward.
    ///
    /// returns the published line.
    pub fn cycle(&mut self) -> Result<String, DisplayError> {
        let status = self.sample().compose();
        debug!(?status, "composed");

        self.sink.publish(&status)?;
        self.sentinel.rebase();

        Ok(status)
    }

    /// takes one sample of every metric.
    pub fn sample(&self) -> Sample {
        let Self {
            config,
            sink: _,
            wireless,
            clock,
            sentinel,
            meminfo,
        } = self;

        let cpu = sentinel.observe();
        let mem = meminfo::sample(meminfo);
        let net = config.net.sample(wireless);
        let time = clock::sample(clock, &config.clock_format);
        let media = mpd::sample(&config.mpd);
        let volume = volume::sample(config.volume_file.as_deref());

        Sample {
            media,
            cpu,
            mem,
            net,
            volume,
            time,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// sleeps for `interval`, waking early if `shutdown` fires.
    fn sleep(interval: Duration, shutdown: &Receiver<()>) -> Wake {
        match shutdown.recv_timeout(interval) {
            Ok(()) => Wake::Shutdown,
            Err(RecvTimeoutError::Timeout) => Wake::Elapsed,
            Err(RecvTimeoutError::Disconnected) => {
                // nobody is left to ask for a shutdown.
                std::thread::sleep(interval);
                Wake::Elapsed
            }
        }
    }
}
