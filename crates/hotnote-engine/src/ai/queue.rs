use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use super::decorations::{DecorationRange, Decorations};
use super::improver::{ImproveError, ImproveRequest, TextImprover};
use super::visibility::PageVisibility;

/// Pause between finishing one request and starting the next
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueOptions {
    pub settle_delay: Duration,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Identifier handed out per enqueued request, in enqueue order
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct RequestId(pub u64);

/// The request the queue most recently started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRequest {
    pub id: RequestId,
    pub text: String,
}

struct Queued {
    id: RequestId,
    request: ImproveRequest,
    reply: oneshot::Sender<Result<String, ImproveError>>,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<Queued>,
    current: Option<CurrentRequest>,
    processing: bool,
    decorations: Decorations,
    next_id: u64,
}

struct Shared {
    improver: Arc<dyn TextImprover>,
    visibility: PageVisibility,
    options: QueueOptions,
    state: Mutex<QueueState>,
}

/// Single-flight queue in front of a [`TextImprover`].
///
/// Requests run one at a time in enqueue order, each caller getting its
/// own future for its own result. Between two requests the queue waits
/// [`QueueOptions::settle_delay`]. Outcomes fall into three groups:
///
/// - the page was hidden or unloading: resolved as `Ok("")`, nobody needs
///   to hear about it
/// - the request's token fired: `Err(ImproveError::Aborted)`
/// - anything else: the request's `on_error` runs and the error is returned
///
/// No outcome stops the queue; the next request always gets its turn.
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct AiQueue {
    shared: Arc<Shared>,
}

impl AiQueue {
    pub fn new(
        improver: impl TextImprover + 'static,
        visibility: PageVisibility,
        options: QueueOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                improver: Arc::new(improver),
                visibility,
                options,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    /// Queue `request` and return a future for its outcome.
    ///
    /// The request joins the queue immediately, whether or not the
    /// returned future is polled. Must be called from within a Tokio
    /// runtime for the queue to make progress.
    pub fn enqueue(
        &self,
        request: ImproveRequest,
    ) -> impl Future<Output = Result<String, ImproveError>> + Send + 'static {
        let (reply, receiver) = oneshot::channel();
        let start_processing = {
            let mut state = self.shared.state();
            let id = RequestId(state.next_id);
            state.next_id += 1;
            log::debug!(
                "ai queue: enqueued request {} ({} waiting)",
                id.0,
                state.pending.len()
            );
            state.pending.push_back(Queued { id, request, reply });
            !std::mem::replace(&mut state.processing, true)
        };

        if start_processing {
            schedule(Arc::clone(&self.shared), Duration::ZERO);
        }

        async move {
            receiver
                .await
                .unwrap_or(Err(ImproveError::Interrupted))
        }
    }

    /// Requests waiting to start, not counting the one in flight
    pub fn size(&self) -> usize {
        self.shared.state().pending.len()
    }

    /// True from the first enqueue until the queue has drained
    pub fn is_busy(&self) -> bool {
        self.shared.state().processing
    }

    /// Discard every waiting request. Each discarded future resolves to
    /// [`ImproveError::Cleared`]; the request in flight is unaffected.
    pub fn clear(&self) {
        let discarded: Vec<Queued> = self.shared.state().pending.drain(..).collect();
        if !discarded.is_empty() {
            log::info!("ai queue: cleared {} waiting request(s)", discarded.len());
        }
        for queued in discarded {
            let _ = queued.reply.send(Err(ImproveError::Cleared));
        }
    }

    pub fn current_request(&self) -> Option<CurrentRequest> {
        self.shared.state().current.clone()
    }

    pub fn add_decoration(&self, from: usize, to: usize) {
        self.shared.state().decorations.add(from, to);
    }

    pub fn remove_decoration(&self, from: usize, to: usize) {
        self.shared.state().decorations.remove(from, to);
    }

    pub fn active_decorations(&self) -> Vec<DecorationRange> {
        self.shared.state().decorations.snapshot()
    }

    pub fn clear_decorations(&self) {
        self.shared.state().decorations.clear();
    }

    pub fn visibility(&self) -> &PageVisibility {
        &self.shared.visibility
    }
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pop the next request and mark it current, or go idle when empty
    fn begin_next(&self) -> Option<Queued> {
        let mut state = self.state();
        match state.pending.pop_front() {
            Some(queued) => {
                state.current = Some(CurrentRequest {
                    id: queued.id,
                    text: queued.request.selection.text.clone(),
                });
                state.processing = true;
                Some(queued)
            }
            None => {
                state.current = None;
                state.processing = false;
                None
            }
        }
    }

    /// Drop every waiting request and go idle
    fn abandon(&self) {
        let mut state = self.state();
        state.current = None;
        state.processing = false;
        state.pending.clear();
    }

    async fn service(&self, id: RequestId, request: ImproveRequest) -> Result<String, ImproveError> {
        let ImproveRequest {
            selection,
            cancel,
            on_chunk,
            on_complete,
            on_error,
        } = request;

        let result = if cancel.is_cancelled() {
            Err(ImproveError::Aborted)
        } else {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ImproveError::Aborted),
                result = self.improver.improve_text(&selection.text, &*on_chunk, &cancel) => result,
            }
        };

        match result {
            Ok(text) => {
                log::debug!("ai queue: request {} completed", id.0);
                if let Some(on_complete) = on_complete {
                    on_complete(&text);
                }
                Ok(text)
            }
            Err(error) if self.visibility.is_hidden() || error.mentions_unload() => {
                log::info!("ai queue: request {} ended by page unload: {error}", id.0);
                Ok(String::new())
            }
            Err(error) if error == ImproveError::Aborted || cancel.is_cancelled() => {
                log::debug!("ai queue: request {} aborted", id.0);
                Err(ImproveError::Aborted)
            }
            Err(error) => {
                log::warn!("ai queue: request {} failed: {error}", id.0);
                if let Some(on_error) = on_error {
                    on_error(&error);
                }
                Err(error)
            }
        }
    }
}

/// Schedules the next iteration when dropped, on every exit path out of
/// an iteration including unwinding.
struct ScheduleNext(Arc<Shared>);

impl Drop for ScheduleNext {
    fn drop(&mut self) {
        let delay = self.0.options.settle_delay;
        schedule(Arc::clone(&self.0), delay);
    }
}

fn schedule(shared: Arc<Shared>, delay: Duration) {
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                process_next(shared).await;
            });
        }
        Err(_) => {
            log::warn!("ai queue: no async runtime, dropping waiting requests");
            shared.abandon();
        }
    }
}

async fn process_next(shared: Arc<Shared>) {
    let Some(Queued { id, request, reply }) = shared.begin_next() else {
        log::debug!("ai queue: drained");
        return;
    };
    let _next = ScheduleNext(Arc::clone(&shared));

    log::debug!("ai queue: starting request {}", id.0);
    let outcome = shared.service(id, request).await;
    let _ = reply.send(outcome);
}
