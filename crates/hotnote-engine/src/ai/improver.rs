use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Streaming text-improvement capability.
///
/// Implementations push partial output through `on_chunk` as it arrives
/// and resolve with the full result. When `cancel` fires they should stop
/// and return [`ImproveError::Aborted`]; the queue also races the call
/// against the token, so an implementation that ignores it is still cut
/// off.
#[async_trait]
pub trait TextImprover: Send + Sync {
    async fn improve_text(
        &self,
        text: &str,
        on_chunk: &(dyn for<'c> Fn(&'c str) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<String, ImproveError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImproveError {
    /// Cancelled through the request's token
    #[error("Request aborted")]
    Aborted,
    /// The capability failed; the message is kept verbatim
    #[error("Text improvement failed: {0}")]
    Failed(String),
    /// Discarded by [`AiQueue::clear`](super::AiQueue::clear) before it started
    #[error("Request discarded: queue was cleared")]
    Cleared,
    /// The queue went away without settling the request
    #[error("Request interrupted before completion")]
    Interrupted,
}

impl ImproveError {
    pub fn failed(message: impl Into<String>) -> Self {
        ImproveError::Failed(message.into())
    }

    /// Failures raised while the page is being torn down
    pub(crate) fn mentions_unload(&self) -> bool {
        match self {
            ImproveError::Failed(message) => {
                let message = message.to_lowercase();
                message.contains("unload") || message.contains("navigation")
            }
            _ => false,
        }
    }
}

pub type ChunkCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type CompleteCallback = Box<dyn FnOnce(&str) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(&ImproveError) + Send>;

/// Selected text submitted for improvement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub text: String,
}

/// A request to improve one selection, with its callbacks and token
pub struct ImproveRequest {
    pub selection: Selection,
    pub cancel: CancellationToken,
    pub(crate) on_chunk: ChunkCallback,
    pub(crate) on_complete: Option<CompleteCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl ImproveRequest {
    pub fn new(text: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            selection: Selection { text: text.into() },
            cancel,
            on_chunk: Arc::new(|_| {}),
            on_complete: None,
            on_error: None,
        }
    }

    /// Called with each streamed chunk
    pub fn on_chunk(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_chunk = Arc::new(callback);
        self
    }

    /// Called once with the final text on success
    pub fn on_complete(mut self, callback: impl FnOnce(&str) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Called once on a genuine failure. Not called for aborts, page
    /// unloads or cleared requests.
    pub fn on_error(mut self, callback: impl FnOnce(&ImproveError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for ImproveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImproveRequest")
            .field("selection", &self.selection)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}
