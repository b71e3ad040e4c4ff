use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::domain::customer::{loyalty_award, CustomerService};
use crate::messaging::MessageSource;
use crate::metrics::Metrics;
use crate::models::{OrderCreatedPayload, OrderEventEnvelope, ORDER_CREATED};

// ============================================================================
// Loyalty Listener
// ============================================================================
//
// Reads order events and credits loyalty points for completed sales:
//
//   OrderCreated { customer_id, total_amount }
//     → floor(total_amount / 10) points
//     → CustomerService::add_loyalty_points
//
// Guest orders, other event types, undecodable messages and totals under
// 10 are skipped. A failed award is logged and dropped; the next message is
// processed regardless. Read failures back off before reading again.
//
// ============================================================================

const DEFAULT_READ_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Undecodable,
    OtherEventType,
    GuestOrder,
    BelowThreshold,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undecodable => "undecodable",
            Self::OtherEventType => "other_event_type",
            Self::GuestOrder => "guest_order",
            Self::BelowThreshold => "below_threshold",
        }
    }
}

/// What happened to a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Skipped(SkipReason),
    Awarded {
        customer_id: String,
        points: i32,
        total: i32,
    },
    Failed,
}

pub struct LoyaltyListener {
    source: Arc<dyn MessageSource>,
    service: Arc<dyn CustomerService>,
    metrics: Option<Arc<Metrics>>,
    read_backoff: Duration,
}

impl LoyaltyListener {
    pub fn new(source: Arc<dyn MessageSource>, service: Arc<dyn CustomerService>) -> Self {
        Self {
            source,
            service,
            metrics: None,
            read_backoff: DEFAULT_READ_BACKOFF,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    #[cfg(test)]
    pub fn with_read_backoff(mut self, backoff: Duration) -> Self {
        self.read_backoff = backoff;
        self
    }

    /// Consume until `shutdown` is cancelled.
    ///
    /// Cancellation interrupts a pending read or backoff, never a message
    /// that is already being processed.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!("🎧 Starting loyalty listener");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = self.source.next_message() => next,
            };

            match next {
                Ok(value) => {
                    self.process_message(&value).await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read order event");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_read_error();
                    }

                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.read_backoff) => {}
                    }
                }
            }
        }

        tracing::info!("Stopping loyalty listener");
    }

    pub async fn process_message(&self, value: &[u8]) -> MessageOutcome {
        let started = Instant::now();
        let outcome = self.handle(value).await;
        let elapsed = started.elapsed().as_secs_f64();

        if let MessageOutcome::Awarded { customer_id, points, total } = &outcome {
            tracing::info!(customer_id = %customer_id, points, total, "Loyalty points added");
        }

        if let Some(metrics) = &self.metrics {
            match &outcome {
                MessageOutcome::Awarded { points, .. } => metrics.record_awarded(*points, elapsed),
                MessageOutcome::Skipped(reason) => metrics.record_skipped(reason.as_str(), elapsed),
                MessageOutcome::Failed => metrics.record_failed(elapsed),
            }
        }

        outcome
    }

    async fn handle(&self, value: &[u8]) -> MessageOutcome {
        let envelope: OrderEventEnvelope = match serde_json::from_slice(value) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable order event");
                return MessageOutcome::Skipped(SkipReason::Undecodable);
            }
        };

        if envelope.event_type != ORDER_CREATED {
            tracing::debug!(event_type = %envelope.event_type, "Ignoring order event");
            return MessageOutcome::Skipped(SkipReason::OtherEventType);
        }

        let payload: OrderCreatedPayload = match serde_json::from_value(envelope.payload) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(
                    event_id = envelope.event_id.as_deref().unwrap_or(""),
                    error = %e,
                    "Skipping OrderCreated event with undecodable payload"
                );
                return MessageOutcome::Skipped(SkipReason::Undecodable);
            }
        };

        let Some(customer_id) = payload.customer_id() else {
            tracing::debug!(order_id = %payload.order_id(), "Guest order, no loyalty points");
            return MessageOutcome::Skipped(SkipReason::GuestOrder);
        };

        tracing::info!(
            event_id = envelope.event_id.as_deref().unwrap_or(""),
            order_id = %payload.order_id(),
            customer_id = %customer_id,
            ordered_at = ?envelope.timestamp,
            "Processing OrderCreated event for loyalty"
        );

        let points = loyalty_award(payload.total_amount);
        if points == 0 {
            return MessageOutcome::Skipped(SkipReason::BelowThreshold);
        }

        match self.service.add_loyalty_points(customer_id, points).await {
            Ok(total) => MessageOutcome::Awarded {
                customer_id: customer_id.to_string(),
                points,
                total,
            },
            Err(e) => {
                tracing::error!(
                    order_id = %payload.order_id(),
                    customer_id = %customer_id,
                    points,
                    kind = e.kind(),
                    error = %e,
                    "Failed to add loyalty points"
                );
                MessageOutcome::Failed
            }
        }
    }
}
