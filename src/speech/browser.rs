use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{CaptureError, SpeechCapture};

/// Handle an embedding host uses to feed recognized speech in.
#[derive(Clone)]
pub struct TranscriptSender {
    tx: mpsc::UnboundedSender<String>,
}

impl TranscriptSender {
    pub fn push(&self, transcript: impl Into<String>) -> Result<(), CaptureError> {
        self.tx
            .send(transcript.into())
            .map_err(|_| CaptureError::Closed)
    }
}

/// Transcripts pushed in by a host that runs its own recognizer.
pub struct BrowserCapture {
    rx: Option<mpsc::UnboundedReceiver<String>>,
    task: Option<Listener>,
}

struct Listener {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<mpsc::UnboundedReceiver<String>>,
}

impl BrowserCapture {
    pub fn new() -> (Self, TranscriptSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        let capture = Self {
            rx: Some(rx),
            task: None,
        };
        (capture, TranscriptSender { tx })
    }
}

impl SpeechCapture for BrowserCapture {
    async fn start_listening<F>(&mut self, mut on_transcript: F) -> Result<(), CaptureError>
    where
        F: FnMut(String) + Send + 'static,
    {
        if self.task.is_some() {
            return Err(CaptureError::AlreadyListening);
        }
        let mut rx = self.rx.take().ok_or(CaptureError::Unavailable("browser"))?;

        let (stop, mut stopped) = oneshot::channel();

        debug!("Browser capture started");
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    transcript = rx.recv() => match transcript {
                        Some(transcript) => on_transcript(transcript),
                        None => break,
                    },
                }
            }
            debug!("Browser capture finished");
            rx
        });
        self.task = Some(Listener { stop, handle });
        Ok(())
    }

    /// Stops delivery. Transcripts pushed meanwhile stay queued for the next
    /// `start_listening`.
    async fn stop_listening(&mut self) {
        if let Some(listener) = self.task.take() {
            let _ = listener.stop.send(());
            if let Ok(rx) = listener.handle.await {
                self.rx = Some(rx);
            }
        }
    }

    fn is_available(&self) -> bool {
        self.rx.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pushed_transcripts_are_delivered() {
        let (mut capture, sender) = BrowserCapture::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        capture
            .start_listening(move |text| {
                let _ = tx.send(text);
            })
            .await
            .unwrap();
        assert_eq!(
            capture.start_listening(|_| {}).await,
            Err(CaptureError::AlreadyListening)
        );

        sender.push("pay david 100000").unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("pay david 100000"));

        drop(sender);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_stop_keeps_queue_for_restart() {
        let (mut capture, sender) = BrowserCapture::new();

        capture.start_listening(|_| {}).await.unwrap();
        capture.stop_listening().await;
        assert!(capture.is_available());

        sender.push("check my balance").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        capture
            .start_listening(move |text| {
                let _ = tx.send(text);
            })
            .await
            .unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("check my balance"));
    }

    #[tokio::test]
    async fn test_push_after_capture_dropped_fails() {
        let (capture, sender) = BrowserCapture::new();
        drop(capture);
        assert_eq!(sender.push("hello"), Err(CaptureError::Closed));
    }
}
