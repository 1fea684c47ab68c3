//! The cooperative stop signal shared between a running workflow and its caller.
//!
//! Workflows only call the synchronous `is_cancelled`, between blocks of work;
//! the block in flight always completes and is flushed before they return.

pub use tokio_util::sync::CancellationToken;
