pub mod ai;
pub mod comments;
pub mod io;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use ai::{AiQueue, DecorationRange, ImproveError, ImproveRequest, PageVisibility, QueueOptions};
pub use comments::*;
pub use io::*;
