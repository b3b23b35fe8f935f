pub mod fetch;
pub mod sequence;
pub mod cursor;

#[cfg(feature = "config")]
pub mod config;

pub use cursor::{CursorPhase, PageCursor, PagingError};
pub use fetch::{PageFetch, infallible};
pub use sequence::{PagedSequence, PagedSequenceError};
