//! a minimal client for the music player daemon.
//!
//! a fresh connection is made for every sample, and dropped before the sample returns. see
//! <https://mpd.readthedocs.io/en/latest/protocol.html> for the protocol itself.

use {
    crate::status::{ACCENT, cap, truncate},
    serde::Deserialize,
    std::{
        env,
        io::{self, BufRead, BufReader, Read, Write},
        net::{TcpStream, ToSocketAddrs},
        os::unix::net::UnixStream,
        time::Duration,
    },
    tracing::{debug, trace, warn},
};

/// where to find the daemon.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct MpdConfig {
    /// a host name, or an absolute path to a unix socket. either may carry a `password@`
    /// prefix.
    pub host: String,
    pub port: u16,
    /// applies to connecting, and to every read and write thereafter.
    pub timeout_ms: u64,
}

/// the tags of the current song that the status line shows.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Song {
    pub artist: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MpdError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("unexpected greeting: {0:?}")]
    Greeting(String),
    #[error("server error: {0}")]
    Ack(String),
    #[error("malformed response line: {0:?}")]
    Malformed(String),
    #[error("connection closed mid-response")]
    Closed,
}

/// one conversation with the daemon.
pub struct Session<S> {
    stream: BufReader<S>,
}

// === impl MpdConfig ===

impl Default for MpdConfig {
    /// like libmpdclient, honours `MPD_HOST` and `MPD_PORT`.
    fn default() -> Self {
        Self {
            host: env::var("MPD_HOST").unwrap_or_else(|_| Self::HOST.to_owned()),
            port: env::var("MPD_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(Self::PORT),
            timeout_ms: Self::TIMEOUT_MS,
        }
    }
}

impl MpdConfig {
    const HOST: &str = "localhost";
    const PORT: u16 = 6600;
    const TIMEOUT_MS: u64 = 30_000;

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }

    /// connects to the daemon and asks what is playing.
    ///
    /// returns `Ok(None)` if playback is stopped. the connection is closed before returning.
    pub fn now_playing(&self) -> Result<Option<Song>, MpdError> {
        let (password, host) = self.endpoint();
        let timeout = self.timeout();

        if host.starts_with('/') {
            let stream = UnixStream::connect(host).map_err(|source| MpdError::Connect {
                addr: host.to_owned(),
                source,
            })?;
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
            Session::new(stream).now_playing(password)
        } else {
            let stream = Self::connect_tcp(host, self.port, timeout)?;
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
            Session::new(stream).now_playing(password)
        }
    }

    /// splits the optional `password@` prefix off the host, as libmpdclient does.
    pub fn endpoint(&self) -> (Option<&str>, &str) {
        match self.host.split_once('@') {
            Some((password, host)) if !password.is_empty() && !self.host.starts_with('/') => {
                (Some(password), host)
            }
            _ => (None, &self.host),
        }
    }

    fn connect_tcp(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, MpdError> {
        let addr = format!("{host}:{port}");
        let connect_error = |source: io::Error| MpdError::Connect {
            addr: addr.clone(),
            source,
        };

        let mut last = io::Error::new(io::ErrorKind::NotFound, "no addresses resolved");
        for resolved in (host, port).to_socket_addrs().map_err(connect_error)? {
            match TcpStream::connect_timeout(&resolved, timeout) {
                Ok(stream) => return Ok(stream),
                Err(error) => last = error,
            }
        }

        Err(connect_error(last))
    }
}

// === impl Session ===

impl<S: Read + Write> Session<S> {
    const GREETING: &str = "OK MPD ";
    const LIST_OK: &str = "list_OK";
    const OK: &str = "OK";
    const ACK: &str = "ACK ";

    pub fn new(stream: S) -> Self {
        Self {
            stream: BufReader::new(stream),
        }
    }

    /// sends `status` and `currentsong` as one command list, and reads both replies.
    ///
    /// a `password` is sent at the head of the list. if the daemon rejects it, the whole list is
    /// refused with an `ACK`.
    pub fn now_playing(mut self, password: Option<&str>) -> Result<Option<Song>, MpdError> {
        self.greeting()?;

        let login = password.map(|password| format!("password {}", Self::quote(password)));
        let mut commands = vec!["command_list_ok_begin"];
        commands.extend(login.as_deref());
        commands.extend(["status", "currentsong", "command_list_end"]);
        self.send(&commands)?;

        if login.is_some() {
            self.response()?;
        }
        let status = self.response()?;
        let song = self.response()?;
        self.finish()?;

        let state = Self::first(&status, "state");
        debug!(?state, "mpd status");
        match state {
            Some("play" | "pause") => Ok(Some(Song {
                artist: Self::first(&song, "Artist").map(ToOwned::to_owned),
                title: Self::first(&song, "Title").map(ToOwned::to_owned),
            })),
            _ => Ok(None),
        }
    }

    fn greeting(&mut self) -> Result<(), MpdError> {
        let line = self.line()?;
        match line.strip_prefix(Self::GREETING) {
            Some(version) => {
                trace!(%version, "connected to mpd");
                Ok(())
            }
            None => Err(MpdError::Greeting(line)),
        }
    }

    fn send(&mut self, commands: &[&str]) -> Result<(), MpdError> {
        let mut batch = commands.join("\n");
        batch.push('\n');
        trace!(?batch, "sending");

        let stream = self.stream.get_mut();
        stream.write_all(batch.as_bytes())?;
        stream.flush()?;
        Ok(())
    }

    /// reads `key: value` pairs up to the next `list_OK`.
    fn response(&mut self) -> Result<Vec<(String, String)>, MpdError> {
        let mut pairs = Vec::new();
        loop {
            let line = self.line()?;
            if line == Self::LIST_OK {
                return Ok(pairs);
            }
            if let Some(ack) = line.strip_prefix(Self::ACK) {
                return Err(MpdError::Ack(ack.to_owned()));
            }
            match line.split_once(": ") {
                Some((key, value)) => pairs.push((key.to_owned(), value.to_owned())),
                None => return Err(MpdError::Malformed(line)),
            }
        }
    }

    /// reads the `OK` that closes the command list.
    fn finish(&mut self) -> Result<(), MpdError> {
        let line = self.line()?;
        if line == Self::OK {
            return Ok(());
        }
        match line.strip_prefix(Self::ACK) {
            Some(ack) => Err(MpdError::Ack(ack.to_owned())),
            None => Err(MpdError::Malformed(line)),
        }
    }

    fn line(&mut self) -> Result<String, MpdError> {
        let mut line = String::new();
        if self.stream.read_line(&mut line)? == 0 {
            return Err(MpdError::Closed);
        }
        let line = line.trim_end_matches(['\n', '\r']).to_owned();
        trace!(?line, "received");
        Ok(line)
    }

    /// quotes a command argument.
    fn quote(arg: &str) -> String {
        let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }

    /// returns the first value for `key`.
    fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.as_str())
    }
}

// === impl Song ===

impl Song {
    /// renders `artist ACCENT title`, truncated to [`cap::MEDIA`]. absent tags render empty.
    pub fn fragment(&self) -> String {
        let Self { artist, title } = self;
        let (artist, title) = (artist.as_deref(), title.as_deref());

        let mut fragment = format!(
            "{}{ACCENT}{}",
            artist.unwrap_or_default(),
            title.unwrap_or_default()
        );
        truncate(&mut fragment, cap::MEDIA);
        fragment
    }
}

/// samples the media fragment. any failure, including no daemon at all, yields an empty one.
pub fn sample(config: &MpdConfig) -> String {
    match config.now_playing() {
        Ok(Some(song)) => song.fragment(),
        Ok(None) => String::new(),
        Err(error @ MpdError::Connect { .. }) => {
            debug!(%error, "mpd unavailable");
            String::new()
        }
        Err(error) => {
            warn!(%error, "mpd query failed");
            String::new()
        }
    }
}
