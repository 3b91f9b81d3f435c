//! AI text improvement, one request at a time.
//!
//! The editor lets a user ask for an improved version of a selection while
//! an earlier request may still be streaming. The underlying capability
//! ([`TextImprover`]) must never run twice concurrently, so every request
//! goes through an [`AiQueue`] that services them in order and settles
//! each caller's future separately.
//!
//! The queue also keeps the list of document ranges currently highlighted
//! as "AI at work" ([`DecorationRange`]). That list is plain bookkeeping
//! driven by the caller.

mod decorations;
pub mod improver;
pub mod queue;
mod visibility;

pub use decorations::DecorationRange;
pub use improver::{ChunkCallback, ImproveError, ImproveRequest, Selection, TextImprover};
pub use queue::{AiQueue, CurrentRequest, DEFAULT_SETTLE_DELAY, QueueOptions, RequestId};
pub use visibility::PageVisibility;
