use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{CaptureError, SpeechCapture};

/// Reads one final transcript per line from an external recognizer.
///
/// The reader is consumed by the first `start_listening` call; once it is
/// exhausted the capture is no longer available.
pub struct NativeCapture {
    reader: Option<Box<dyn AsyncBufRead + Send + Unpin>>,
    task: Option<JoinHandle<()>>,
}

impl NativeCapture {
    /// Capture transcripts piped into stdin.
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            task: None,
        }
    }
}

impl SpeechCapture for NativeCapture {
    async fn start_listening<F>(&mut self, mut on_transcript: F) -> Result<(), CaptureError>
    where
        F: FnMut(String) + Send + 'static,
    {
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return Err(CaptureError::AlreadyListening);
        }
        let reader = self.reader.take().ok_or(CaptureError::Unavailable("native"))?;

        debug!("Native capture started");
        self.task = Some(tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let transcript = line.trim();
                        if !transcript.is_empty() {
                            on_transcript(transcript.to_string());
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Voice recognition error: {}", e);
                        break;
                    }
                }
            }
            debug!("Native capture finished");
        }));
        Ok(())
    }

    async fn stop_listening(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }

    fn is_available(&self) -> bool {
        self.reader.is_some()
    }
}
