use crate::allocator::OrderIdAllocator;
use crate::error::{Error, Result};
use crate::gateway::{
    OrderDirectory, OrderDraft, OrderGateway, OrderRecord, OrderStatus, OrderSubmission,
};
use crate::sleep::{SleepProvider, TokioSleep};
use chrono::Utc;
use core::time::Duration;
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Attempt budget and backoff pacing for the submission loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total creation attempts, including the first. Values below 1 are
    /// treated as 1.
    pub max_attempts: u32,
    /// Backoff grows linearly: attempt `n` waits `n * base_delay` before the
    /// next try.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

/// The allocate → create → classify → reallocate loop.
///
/// Each attempt draws a fresh identifier from the shared allocator, stamps
/// the submission defaults, and hands the payload to the gateway. The
/// backend's uniqueness constraint is the authority: when it reports a
/// duplicate-class failure the loop backs off and tries again with the next
/// identifier, up to [`RetryPolicy::max_attempts`]. Any other failure
/// propagates on first occurrence.
///
/// The same identifier is never resubmitted: the allocator's counter has
/// already advanced past it, so the colliding number is simply abandoned as a
/// gap in the sequence.
pub struct OrderSubmitter<D, G> {
    allocator: Arc<OrderIdAllocator<D>>,
    gateway: G,
    policy: RetryPolicy,
}

impl<D, G> OrderSubmitter<D, G>
where
    D: OrderDirectory,
    G: OrderGateway,
{
    pub fn new(allocator: Arc<OrderIdAllocator<D>>, gateway: G) -> Self {
        Self::with_policy(allocator, gateway, RetryPolicy::default())
    }

    pub fn with_policy(
        allocator: Arc<OrderIdAllocator<D>>,
        gateway: G,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            allocator,
            gateway,
            policy,
        }
    }

    /// The shared allocator backing this submitter.
    pub fn allocator(&self) -> &OrderIdAllocator<D> {
        &self.allocator
    }

    /// The creation collaborator.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Creates an order, absorbing identifier collisions.
    ///
    /// Backoff sleeps on Tokio's timer; use [`submit_with`] to supply another
    /// [`SleepProvider`].
    ///
    /// # Errors
    ///
    /// - [`Error::Rejected`] on the first non-duplicate failure.
    /// - [`Error::RetriesExhausted`] when every attempt in the budget
    ///   collided.
    ///
    /// [`submit_with`]: Self::submit_with
    pub async fn submit(&self, draft: OrderDraft) -> Result<OrderRecord> {
        self.submit_with::<TokioSleep>(draft).await
    }

    /// [`submit`](Self::submit), generic over the backoff timer.
    pub async fn submit_with<S>(&self, draft: OrderDraft) -> Result<OrderRecord>
    where
        S: SleepProvider,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            let id = self.allocator.next_id().await;
            let submission = OrderSubmission {
                id: id.to_string(),
                status: OrderStatus::Pending,
                submitted_at: Utc::now(),
                fields: draft.fields().clone(),
            };

            match self.gateway.create_order(&submission).await {
                Ok(record) => {
                    tracing::debug!(id = %submission.id, attempt, "order created");
                    return Ok(record);
                }
                Err(err) if err.is_duplicate() => {
                    if attempt >= max_attempts {
                        return Err(Error::RetriesExhausted {
                            attempts: attempt,
                            last: err,
                        });
                    }
                    tracing::warn!(
                        id = %submission.id,
                        attempt,
                        %err,
                        "identifier already taken; backing off and reallocating"
                    );
                    S::sleep_for(self.policy.base_delay * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(Error::Rejected(err)),
            }
        }
    }
}
