//! Feeding one prioritized replay buffer from multiple threads.
//!
//! The sum tree inside the buffer is not safe under concurrent mutation, so the buffer
//! lives in an `Arc<Mutex<R>>` and every `push`, `batch` and `update_priority` takes
//! the same lock.
//!
//! Producers do not lock the buffer themselves. Each one holds a
//! [`ReplayBufferProxy`], which collects pushed items and sends them in bulk as
//! [`PushedItemMessage`]s over a [`crossbeam_channel`]. A [`PushedItemConsumer`]
//! thread receives the messages and pushes their items into the shared buffer,
//! while the learner samples batches and updates priorities under the same lock.
mod messages;
mod pushed_item_consumer;
mod replay_buffer_proxy;
pub use messages::PushedItemMessage;
pub use pushed_item_consumer::PushedItemConsumer;
pub use replay_buffer_proxy::{ReplayBufferProxy, ReplayBufferProxyConfig};
use thiserror::Error;

/// Errors in feeding a shared replay buffer.
#[derive(Error, Debug)]
pub enum ReplayAsyncError {
    /// The receiving side of the channel is gone.
    #[error("Failed to send pushed items")]
    SendMsgForPush,

    /// A thread panicked while holding the lock of the replay buffer.
    #[error("Lock of the replay buffer is poisoned")]
    BufferLockPoisoned,
}
