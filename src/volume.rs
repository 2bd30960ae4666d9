use {
    crate::status::{cap, truncate},
    std::{fs, io, path::Path},
    tracing::debug,
};

/// shown when there is no volume file to read.
pub const UNAVAILABLE: &str = "N/A";

/// samples the user-set volume from the first whitespace-delimited token of `path`.
///
/// the token is passed through verbatim, truncated to [`cap::VOLUME`]. a missing path or an
/// unreadable file yields [`UNAVAILABLE`]; a file with no token yields an empty fragment.
pub fn sample(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return UNAVAILABLE.to_owned();
    };

    match read(path) {
        Ok(mut volume) => {
            truncate(&mut volume, cap::VOLUME);
            volume
        }
        Err(error) => {
            debug!(%error, path = %path.display(), "volume file unavailable");
            UNAVAILABLE.to_owned()
        }
    }
}

/// reads the first token as raw bytes, so that a file which is not utf-8 still yields one.
fn read(path: &Path) -> io::Result<String> {
    let content = fs::read(path)?;
    let token = content
        .split(u8::is_ascii_whitespace)
        .find(|token| !token.is_empty())
        .unwrap_or_default();
    Ok(String::from_utf8_lossy(token).into_owned())
}
