//! Transcript sources.
//!
//! Speech recognition itself happens outside this crate. A capture backend
//! only delivers finished transcripts to a callback, one string per
//! utterance.

mod browser;
mod native;

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use thiserror::Error;

pub use browser::{BrowserCapture, TranscriptSender};
pub use native::NativeCapture;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    #[error("{0} speech capture is not available")]
    Unavailable(&'static str),

    #[error("Already listening")]
    AlreadyListening,

    #[error("Transcript channel is closed")]
    Closed,

    #[error("Unknown capture backend: {0} (expected native or browser)")]
    UnknownBackend(String),
}

pub trait SpeechCapture {
    /// Begin delivering transcripts to `on_transcript` in the background.
    fn start_listening<F>(
        &mut self,
        on_transcript: F,
    ) -> impl Future<Output = Result<(), CaptureError>> + Send
    where
        F: FnMut(String) + Send + 'static;

    /// Stop delivering transcripts. A no-op when not listening.
    fn stop_listening(&mut self) -> impl Future<Output = ()> + Send;

    fn is_available(&self) -> bool;
}

/// Which capture implementation to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureBackend {
    /// Transcripts read line by line from an external recognizer (stdin)
    #[default]
    Native,
    /// Transcripts pushed in by an embedding host
    Browser,
}

impl CaptureBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureBackend::Native => "native",
            CaptureBackend::Browser => "browser",
        }
    }
}

impl fmt::Display for CaptureBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureBackend {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(CaptureBackend::Native),
            "browser" | "web" => Ok(CaptureBackend::Browser),
            _ => Err(CaptureError::UnknownBackend(s.to_string())),
        }
    }
}

/// The configured capture backend.
pub enum Capture {
    Native(NativeCapture),
    Browser(BrowserCapture),
}

impl Capture {
    /// Construct the backend named by `backend`. The browser variant also
    /// returns the handle its host uses to push transcripts in.
    pub fn from_backend(backend: CaptureBackend) -> (Self, Option<TranscriptSender>) {
        match backend {
            CaptureBackend::Native => (Capture::Native(NativeCapture::stdin()), None),
            CaptureBackend::Browser => {
                let (capture, sender) = BrowserCapture::new();
                (Capture::Browser(capture), Some(sender))
            }
        }
    }

    pub fn backend(&self) -> CaptureBackend {
        match self {
            Capture::Native(_) => CaptureBackend::Native,
            Capture::Browser(_) => CaptureBackend::Browser,
        }
    }
}

impl SpeechCapture for Capture {
    async fn start_listening<F>(&mut self, on_transcript: F) -> Result<(), CaptureError>
    where
        F: FnMut(String) + Send + 'static,
    {
        match self {
            Capture::Native(capture) => capture.start_listening(on_transcript).await,
            Capture::Browser(capture) => capture.start_listening(on_transcript).await,
        }
    }

    async fn stop_listening(&mut self) {
        match self {
            Capture::Native(capture) => capture.stop_listening().await,
            Capture::Browser(capture) => capture.stop_listening().await,
        }
    }

    fn is_available(&self) -> bool {
        match self {
            Capture::Native(capture) => capture.is_available(),
            Capture::Browser(capture) => capture.is_available(),
        }
    }
}
