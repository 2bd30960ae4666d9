//! end-to-end cycles over synthetic system sources.

use {
    chrono::{Local, TimeZone},
    dwmstatus::{
        App, Config,
        display::{DisplayError, Sink},
        mpd::MpdConfig,
        net::{Interfaces, Quality, Wireless, WirelessError, WirelessInfo},
        source::FixedClock,
        status::{ACCENT, NORMAL, cap},
    },
    std::{
        fs,
        io::{self, BufRead, BufReader, Write},
        net::TcpListener,
        path::Path,
        sync::mpsc,
        thread,
        time::{Duration, Instant},
    },
    tempfile::TempDir,
};

/// records every published line.
#[derive(Default)]
struct Recorder {
    lines: Vec<String>,
}

impl Sink for Recorder {
    fn publish(&mut self, status: &str) -> Result<(), DisplayError> {
        self.lines.push(status.to_owned());
        Ok(())
    }
}

/// a display that has gone away.
struct Broken;

impl Sink for Broken {
    fn publish(&mut self, _: &str) -> Result<(), DisplayError> {
        Err(DisplayError::Terminal(io::Error::from(
            io::ErrorKind::BrokenPipe,
        )))
    }
}

/// a wireless driver associated with `HomeNet` at quality 40/70.
struct HomeNet;

impl Wireless for HomeNet {
    fn query(&self, _: &str) -> Result<WirelessInfo, WirelessError> {
        Ok(WirelessInfo {
            essid: "HomeNet".to_owned(),
            essid_on: true,
            quality: Quality {
                current: 40,
                max: 70,
            },
        })
    }
}

fn tuesday() -> FixedClock {
    let time = Local
        .with_ymd_and_hms(2024, 3, 5, 14, 7, 0)
        .earliest()
        .expect("valid local time");
    FixedClock(time)
}

/// lays out fake `/proc` and `/sys` files, and a volume file, under a temporary directory.
fn system(root: &Path) -> Config {
    fs::write(root.join("stat"), "cpu 100 0 0 900 0 0 0 0 0 0\nintr 1\n").unwrap();
    fs::write(
        root.join("meminfo"),
        "MemTotal: 1000 kB\nMemFree: 250 kB\nMemAvailable: 500 kB\nBuffers: 125 kB\nCached: 125 kB\n",
    )
    .unwrap();
    for (device, state) in [("eth0", "down\n"), ("wlan0", "up\n")] {
        let dir = root.join("net").join(device);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("operstate"), state).unwrap();
    }
    fs::write(root.join("volume"), "42\n").unwrap();

    Config {
        interval_ms: 50,
        proc_stat: root.join("stat"),
        proc_meminfo: root.join("meminfo"),
        volume_file: Some(root.join("volume")),
        net: Interfaces {
            sysfs: root.join("net"),
            wired: "eth0".to_owned(),
            wireless: "wlan0".to_owned(),
        },
        mpd: closed_port(),
        ..Config::default()
    }
}

/// an mpd endpoint that refuses connections.
fn closed_port() -> MpdConfig {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    MpdConfig {
        host: "127.0.0.1".to_owned(),
        port,
        timeout_ms: 1_000,
    }
}

/// a stub daemon that answers a single connection as though "A" were playing "B".
fn playing_daemon() -> (MpdConfig, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        stream.write_all(b"OK MPD 0.23.5\n").unwrap();
        let mut line = String::new();
        while line != "command_list_end\n" {
            line.clear();
            if reader.read_line(&mut line).unwrap() == 0 {
                return;
            }
        }
        stream
            .write_all(b"state: play\nlist_OK\nArtist: A\nTitle: B\nlist_OK\nOK\n")
            .unwrap();
    });
    let config = MpdConfig {
        host: "127.0.0.1".to_owned(),
        port,
        timeout_ms: 5_000,
    };
    (config, handle)
}

#[test]
fn one_cycle_composes_every_fragment() {
    let dir = TempDir::new().unwrap();
    let (mpd, daemon) = playing_daemon();
    let config = Config {
        mpd,
        ..system(dir.path())
    };
    let stat = config.proc_stat.clone();

    let mut app = App::new(config, Recorder::default(), HomeNet, tuesday());
    // 50 of the 500 ticks that pass before the cycle are work.
    fs::write(&stat, "cpu 150 0 0 1350 0 0 0 0 0 0\n").unwrap();

    let status = app.cycle().unwrap();
    daemon.join().unwrap();

    assert_eq!(
        status,
        "\x01A\x02B\x01 Cpu\x020.10 \x01Mem\x020.50\x01HomeNet\x0257 \x01Vol\x0242 \
         \x01Tue\x0205\x01Mar\x0214:07"
    );
    assert_eq!(app.sink().lines, vec![status]);
}

#[test]
fn missing_sources_fall_back() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        proc_stat: dir.path().join("nope"),
        proc_meminfo: dir.path().join("nope"),
        volume_file: Some(dir.path().join("nope")),
        net: Interfaces {
            sysfs: dir.path().join("nope"),
            ..Interfaces::default()
        },
        mpd: closed_port(),
        ..Config::default()
    };

    let mut app = App::new(config, Recorder::default(), HomeNet, tuesday());
    let status = app.cycle().unwrap();

    assert_eq!(
        status,
        "\x01\x01 Cpu\x020.00 \x01Mem\x020.00\x01 Eth\x02No \x01Vol\x02N/A \
         \x01Tue\x0205\x01Mar\x0214:07"
    );
}

#[test]
fn fragments_stay_within_caps() {
    let dir = TempDir::new().unwrap();
    let config = system(dir.path());
    fs::write(dir.path().join("volume"), "100000\n").unwrap();

    let mut app = App::new(config, Recorder::default(), HomeNet, tuesday());
    let sample = app.sample();
    assert!(sample.volume.chars().count() <= cap::VOLUME);
    assert!(sample.net.chars().count() <= cap::NET);
    assert!(sample.time.chars().count() <= cap::CLOCK);
    assert!(sample.media.chars().count() <= cap::MEDIA);

    let status = app.cycle().unwrap();
    assert!(status.chars().count() <= cap::STATUS);
    assert_eq!(status.matches(NORMAL).count(), 7);
    assert_eq!(status.matches(ACCENT).count(), 6);
}

#[test]
fn cadence_follows_interval() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        cycles: Some(4),
        ..system(dir.path())
    };
    let interval = config.interval();
    let (_tx, shutdown) = mpsc::channel();

    let mut app = App::new(config, Recorder::default(), HomeNet, tuesday());
    let start = Instant::now();
    app.run(&shutdown).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(app.sink().lines.len(), 4);
    // there is no sleep after the last cycle.
    assert!(elapsed >= interval * 3, "{elapsed:?}");
    assert!(elapsed < interval * 3 + Duration::from_secs(2), "{elapsed:?}");
}

#[test]
fn shutdown_interrupts_sleep() {
    let dir = TempDir::new().unwrap();
    let config = Config {
        interval_ms: 60_000,
        ..system(dir.path())
    };
    let (tx, shutdown) = mpsc::channel();
    tx.send(()).unwrap();

    let mut app = App::new(config, Recorder::default(), HomeNet, tuesday());
    let start = Instant::now();
    app.run(&shutdown).unwrap();

    assert_eq!(app.sink().lines.len(), 1);
    assert!(start.elapsed() < Duration::from_secs(30));
}

#[test]
fn lost_display_ends_the_loop() {
    let dir = TempDir::new().unwrap();
    let (_tx, shutdown) = mpsc::channel();

    let mut app = App::new(system(dir.path()), Broken, HomeNet, tuesday());
    assert!(matches!(
        app.run(&shutdown),
        Err(DisplayError::Terminal(_))
    ));
}
