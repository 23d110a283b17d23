//! Background image fetching.
//!
//! A fetch is a single-shot request. The document hands out a
//! [`FetchRequest`] when its background becomes a URL; a fetcher performs the
//! download somewhere else and the resulting [`FetchCompletion`] is applied
//! back on the thread that owns the document.

use crate::error::EmojiArtResult;
use url::Url;

/// Identifies one fetch so late results for a replaced background can be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

/// A background download the document is waiting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub url: Url,
}

impl FetchRequest {
    /// Pair this request with its outcome.
    pub fn complete(self, result: EmojiArtResult<Vec<u8>>) -> FetchCompletion {
        FetchCompletion {
            ticket: self.ticket,
            url: self.url,
            result,
        }
    }
}

/// Outcome of a [`FetchRequest`]: the raw bytes or why there are none.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub url: Url,
    pub result: EmojiArtResult<Vec<u8>>,
}

/// Something that can download background images.
///
/// `fetch` must not block; completions are collected with `poll_completions`
/// from the thread that owns the document.
pub trait ImageFetcher {
    /// Start a download.
    fn fetch(&mut self, request: FetchRequest);

    /// Drain finished downloads (non-blocking).
    fn poll_completions(&mut self) -> Vec<FetchCompletion>;

    /// Number of downloads started but not yet drained.
    fn in_flight(&self) -> usize;
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use crate::error::EmojiArtError;
    use std::sync::mpsc::{Receiver, Sender, channel};
    use std::thread;
    use std::time::Duration;

    /// Default HTTP timeout for background downloads.
    pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

    /// Fetcher for native platforms.
    ///
    /// Each download runs on its own thread and reports back through a channel.
    pub struct HttpFetcher {
        client: reqwest::blocking::Client,
        tx: Sender<FetchCompletion>,
        rx: Receiver<FetchCompletion>,
        in_flight: usize,
    }

    impl HttpFetcher {
        /// Create a fetcher with the default timeout.
        pub fn new() -> EmojiArtResult<Self> {
            Self::with_timeout(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
        }

        /// Create a fetcher with a custom request timeout.
        pub fn with_timeout(timeout: Duration) -> EmojiArtResult<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| EmojiArtError::Fetch(e.to_string()))?;
            let (tx, rx) = channel();
            Ok(Self {
                client,
                tx,
                rx,
                in_flight: 0,
            })
        }
    }

    impl ImageFetcher for HttpFetcher {
        fn fetch(&mut self, request: FetchRequest) {
            let client = self.client.clone();
            let tx = self.tx.clone();
            self.in_flight += 1;

            thread::spawn(move || {
                log::debug!("Fetch thread: downloading {}", request.url);
                let result = download(&client, &request.url);
                if let Err(e) = &result {
                    log::debug!("Fetch thread: {} failed: {}", request.url, e);
                }
                // The receiver only goes away when the fetcher is dropped
                let _ = tx.send(request.complete(result));
            });
        }

        fn poll_completions(&mut self) -> Vec<FetchCompletion> {
            let completions: Vec<_> = self.rx.try_iter().collect();
            self.in_flight = self.in_flight.saturating_sub(completions.len());
            completions
        }

        fn in_flight(&self) -> usize {
            self.in_flight
        }
    }

    /// Download the bytes behind a URL. `file:` URLs are read from disk.
    pub(crate) fn download(client: &reqwest::blocking::Client, url: &Url) -> EmojiArtResult<Vec<u8>> {
        match url.scheme() {
            "http" | "https" => {
                let response = client
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| EmojiArtError::Fetch(e.to_string()))?;
                let bytes = response
                    .bytes()
                    .map_err(|e| EmojiArtError::Fetch(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| EmojiArtError::Fetch(format!("not a local path: {}", url)))?;
                Ok(std::fs::read(path)?)
            }
            other => Err(EmojiArtError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{DEFAULT_FETCH_TIMEOUT_SECS, HttpFetcher};
