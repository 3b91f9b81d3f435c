use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::ai::{ImproveError, TextImprover};

/// Create a temporary notes directory with test files
pub fn create_test_notes_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test note with content
pub fn create_test_file(notes_dir: &TempDir, filename: &str, content: &str) -> PathBuf {
    let file_path = notes_dir.path().join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Improver whose behaviour is picked by the text it is given:
///
/// - `fail...`: fails with "model unavailable"
/// - `unload...`: fails with an unload-flavoured message
/// - `hang...`: waits for its token, then aborts
/// - `stubborn...`: never finishes and ignores its token
/// - anything else: streams each word, then returns the text uppercased
#[derive(Clone, Default)]
pub struct ScriptedImprover {
    latency: Duration,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedImprover {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextImprover for ScriptedImprover {
    async fn improve_text(
        &self,
        text: &str,
        on_chunk: &(dyn for<'c> Fn(&'c str) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<String, ImproveError> {
        self.calls.lock().unwrap().push(text.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(Arc::clone(&self.in_flight));

        if !self.latency.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => return Err(ImproveError::Aborted),
                _ = tokio::time::sleep(self.latency) => {}
            }
        }

        if text.starts_with("fail") {
            Err(ImproveError::failed("model unavailable"))
        } else if text.starts_with("unload") {
            Err(ImproveError::failed("fetch aborted by page unload"))
        } else if text.starts_with("hang") {
            cancel.cancelled().await;
            Err(ImproveError::Aborted)
        } else if text.starts_with("stubborn") {
            std::future::pending::<()>().await;
            Err(ImproveError::Aborted)
        } else {
            for word in text.split_whitespace() {
                on_chunk(word);
            }
            Ok(text.to_uppercase())
        }
    }
}
