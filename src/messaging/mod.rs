// ============================================================================
// Messaging
// ============================================================================
//
// Inbound message transport. The listener only sees `MessageSource`, so tests
// can feed it from a channel instead of a broker.
//
// ============================================================================

mod redpanda;

pub use redpanda::RedpandaConsumer;

use async_trait::async_trait;

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Wait for the next message value. An empty vec stands for a message
    /// without a payload.
    async fn next_message(&self) -> anyhow::Result<Vec<u8>>;
}
