use std::fmt;
use std::time::Duration;

/// How a connection url is served, which decides how patient the connector is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// `mem://`: ephemeral, lives and dies with the process.
    Memory,
    /// `rocksdb://`, `surrealkv://`: embedded, backed by local files.
    Embedded,
    /// `ws://`, `wss://`, `http://`, `https://`: a separate `SurrealDB` server.
    Remote,
}

impl Engine {
    /// Classifies a connection url by its scheme. Returns `None` for schemes
    /// the `any` engine does not understand.
    #[must_use]
    pub fn of(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once("://")?;
        match scheme {
            "mem" | "memory" => Some(Self::Memory),
            "rocksdb" | "surrealkv" | "file" => Some(Self::Embedded),
            "ws" | "wss" | "http" | "https" => Some(Self::Remote),
            _ => None,
        }
    }

    /// Whether the engine may still be starting when the client connects.
    #[must_use]
    pub const fn needs_warmup(self) -> bool {
        matches!(self, Self::Remote)
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Embedded => "embedded",
            Self::Remote => "remote",
        })
    }
}

/// Health-check schedule used while a remote engine warms up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    pub attempts: u32,
    /// Delay after the first failure; doubled after each further one.
    pub initial_delay: Duration,
}

impl Default for Retry {
    fn default() -> Self {
        Self { attempts: 3, initial_delay: Duration::from_millis(500) }
    }
}

impl Retry {
    /// Delays slept between consecutive attempts.
    pub fn delays(self) -> impl Iterator<Item = Duration> {
        std::iter::successors(Some(self.initial_delay), |d| d.checked_mul(2))
            .take(self.attempts.saturating_sub(1) as usize)
    }
}
