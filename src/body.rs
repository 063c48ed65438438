//! Lazily read request body with an optional byte ceiling.
//!
//! The body is **not** pre-buffered: data frames are pulled from the
//! connection only when the handler reads. A ceiling installed by
//! [`BodyLimit`](crate::middleware::BodyLimit) is enforced during those
//! reads — a handler that never touches the body never trips it.

use std::fmt;

use bytes::{Bytes, BytesMut};
use http_body_util::BodyExt;
use hyper::body::Incoming;

/// An incoming request body.
///
/// Produced by the server from the hyper connection, or constructed from a
/// buffered payload for tests and embedding.
pub struct Body {
    source: Source,
    /// Remaining byte budget. `None` means unlimited.
    remaining: Option<u64>,
}

enum Source {
    Incoming(Incoming),
    Buffered(Bytes),
    #[cfg(test)]
    Chunks(std::collections::VecDeque<Bytes>),
}

impl Body {
    /// An empty body.
    pub fn empty() -> Self {
        Self { source: Source::Buffered(Bytes::new()), remaining: None }
    }

    /// Installs a cumulative byte ceiling on subsequent reads.
    ///
    /// The boundary is inclusive: exactly `max` bytes read fine, one more
    /// fails with [`BodyError::TooLarge`]. Installing a second ceiling keeps
    /// the smaller of the two.
    pub fn limit(&mut self, max: u64) {
        self.remaining = Some(self.remaining.map_or(max, |cur| cur.min(max)));
    }

    /// Returns the next data chunk, or `None` at end of body.
    ///
    /// A chunk that would push the cumulative read count past the installed
    /// ceiling is withheld and [`BodyError::TooLarge`] is returned instead.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, BodyError> {
        let chunk = match &mut self.source {
            Source::Incoming(incoming) => loop {
                match incoming.frame().await {
                    None => break None,
                    Some(Err(e)) => return Err(BodyError::Transport(e)),
                    Some(Ok(frame)) => match frame.into_data() {
                        Ok(data) if data.is_empty() => continue,
                        Ok(data) => break Some(data),
                        // Trailers carry no body bytes.
                        Err(_) => continue,
                    },
                }
            },
            Source::Buffered(bytes) => {
                if bytes.is_empty() {
                    None
                } else {
                    Some(std::mem::take(bytes))
                }
            }
            #[cfg(test)]
            Source::Chunks(chunks) => chunks.pop_front(),
        };

        if let (Some(data), Some(remaining)) = (&chunk, &mut self.remaining) {
            let len = data.len() as u64;
            if len > *remaining {
                return Err(BodyError::TooLarge);
            }
            *remaining -= len;
        }

        Ok(chunk)
    }

    /// Reads the remaining body into one contiguous buffer.
    pub async fn read_to_end(&mut self) -> Result<Bytes, BodyError> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf.freeze())
    }

    #[cfg(test)]
    pub(crate) fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
    {
        Self { source: Source::Chunks(chunks.into_iter().collect()), remaining: None }
    }
}

impl From<Incoming> for Body {
    fn from(incoming: Incoming) -> Self {
        Self { source: Source::Incoming(incoming), remaining: None }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self { source: Source::Buffered(bytes), remaining: None }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes::from(bytes).into()
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Bytes::from_static(s.as_bytes()).into()
    }
}

// ── BodyError ─────────────────────────────────────────────────────────────────

/// Failure while reading a request body.
#[derive(Debug)]
pub enum BodyError {
    /// The installed byte ceiling was exceeded. Handlers conventionally map
    /// this to `413 Content Too Large`.
    TooLarge,
    /// The connection failed mid-body.
    Transport(hyper::Error),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge => write!(f, "request body too large"),
            Self::Transport(e) => write!(f, "body read: {e}"),
        }
    }
}

impl std::error::Error for BodyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TooLarge => None,
            Self::Transport(e) => Some(e),
        }
    }
}
