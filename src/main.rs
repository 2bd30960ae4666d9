//! a compact status line for dwm.

use {
    anyhow::Context,
    clap::Parser,
    dwmstatus::{
        App, Config, IwSocket, RootWindow,
        display::{Sink, Terminal},
        source::LocalClock,
    },
    std::{
        path::PathBuf,
        sync::mpsc::{self, Receiver},
    },
    tracing::{error, info},
    tracing_subscriber::EnvFilter,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// read configuration from this file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// milliseconds to sleep between updates.
    #[arg(short, long)]
    interval: Option<u64>,
    /// update once, then exit.
    #[arg(long)]
    once: bool,
    /// print the status line to the terminal instead of the root window.
    #[arg(long)]
    stdout: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config()?;
    info!(?config, "starting");

    let shutdown = shutdown_channel()?;

    if cli.stdout {
        return run(config, Terminal::stdout(), &shutdown);
    }

    let window = match RootWindow::open(config.display.as_deref()) {
        Ok(window) => window,
        Err(err) => {
            error!(%err, "could not open display");
            return Err(err).context("could not open display");
        }
    };
    run(config, window, &shutdown)
}

fn run(config: Config, sink: impl Sink, shutdown: &Receiver<()>) -> anyhow::Result<()> {
    App::new(config, sink, IwSocket, LocalClock)
        .run(shutdown)
        .context("lost the display")
}

/// returns a channel that fires once SIGINT or SIGTERM arrives.
fn shutdown_channel() -> anyhow::Result<Receiver<()>> {
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("failed to install signal handler")?;
    Ok(rx)
}

// === impl Cli ===

impl Cli {
    /// loads the config file, and applies command line overrides on top of it.
    fn config(&self) -> anyhow::Result<Config> {
        let Self {
            config,
            interval,
            once,
            stdout: _,
        } = self;

        let mut config = match config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };

        if let Some(interval) = interval {
            config.interval_ms = *interval;
        }
        if *once {
            config.cycles = Some(1);
        }

        Ok(config)
    }
}
