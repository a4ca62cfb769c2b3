use crate::{
    Error, GatewayError, OrderDirectory, OrderDraft, OrderGateway, OrderIdAllocator, OrderRecord,
    OrderStatus, OrderSubmission, OrderSubmitter, RetryPolicy, TokioYield,
};
use core::time::Duration;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct EmptyDirectory;

impl OrderDirectory for EmptyDirectory {
    async fn list_order_ids(&self) -> Result<Vec<String>, GatewayError> {
        Ok(Vec::new())
    }
}

/// Fails with the scripted errors in order, then succeeds by echoing the
/// submission back as the stored record.
struct ScriptedGateway {
    failures: Mutex<VecDeque<GatewayError>>,
    seen_ids: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new(failures: Vec<GatewayError>) -> Self {
        Self {
            failures: Mutex::new(failures.into()),
            seen_ids: Mutex::new(Vec::new()),
        }
    }

    fn seen_ids(&self) -> Vec<String> {
        self.seen_ids.lock().clone()
    }
}

impl OrderGateway for ScriptedGateway {
    async fn create_order(&self, submission: &OrderSubmission) -> Result<OrderRecord, GatewayError> {
        self.seen_ids.lock().push(submission.id.clone());
        match self.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(OrderRecord {
                id: submission.id.clone(),
                status: submission.status,
                submitted_at: submission.submitted_at,
                fields: submission.fields.clone(),
            }),
        }
    }
}

fn submitter(gateway: ScriptedGateway) -> OrderSubmitter<EmptyDirectory, ScriptedGateway> {
    OrderSubmitter::with_policy(
        Arc::new(OrderIdAllocator::new(EmptyDirectory)),
        gateway,
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
        },
    )
}

#[tokio::test(start_paused = true)]
async fn retries_duplicates_with_fresh_identifiers() {
    let submitter = submitter(ScriptedGateway::new(vec![
        GatewayError::new("duplicate key value"),
        GatewayError::new("duplicate key value"),
    ]));

    let record = submitter.submit(OrderDraft::new()).await.unwrap();
    assert_eq!(record.id, "ORD-003");
    assert_eq!(
        submitter.gateway().seen_ids(),
        vec!["ORD-001", "ORD-002", "ORD-003"]
    );
}

#[tokio::test(start_paused = true)]
async fn backoff_is_linear_in_the_attempt_number() {
    let submitter = submitter(ScriptedGateway::new(vec![
        GatewayError::new("duplicate key value"),
        GatewayError::new("duplicate key value"),
    ]));

    let started = tokio::time::Instant::now();
    submitter.submit(OrderDraft::new()).await.unwrap();
    // 1 * 200ms after the first collision, 2 * 200ms after the second.
    assert_eq!(started.elapsed(), Duration::from_millis(600));
}

#[tokio::test]
async fn non_duplicate_failure_propagates_immediately() {
    let submitter = submitter(ScriptedGateway::new(vec![GatewayError::new(
        "validation error: missing field",
    )]));

    let err = submitter.submit(OrderDraft::new()).await.unwrap_err();
    assert!(matches!(err, Error::Rejected(_)));
    assert_eq!(err.gateway_error().message(), "validation error: missing field");
    assert_eq!(submitter.gateway().seen_ids().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn attempt_budget_is_respected() {
    let submitter = submitter(ScriptedGateway::new(vec![
        GatewayError::new("conflict"),
        GatewayError::new("conflict"),
        GatewayError::new("conflict"),
    ]));

    let err = submitter.submit(OrderDraft::new()).await.unwrap_err();
    match err {
        Error::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 3);
            assert_eq!(last.message(), "conflict");
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(submitter.gateway().seen_ids().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn structured_conflict_status_is_retried() {
    let submitter = submitter(ScriptedGateway::new(vec![GatewayError::with_status(
        409,
        "row exists",
    )]));

    let record = submitter.submit(OrderDraft::new()).await.unwrap();
    assert_eq!(record.id, "ORD-002");
    assert_eq!(submitter.gateway().seen_ids().len(), 2);
}

#[tokio::test]
async fn submission_carries_defaults_and_draft_fields() {
    let submitter = submitter(ScriptedGateway::new(vec![]));

    let record = submitter
        .submit(OrderDraft::new().field("customer", "acme").field("quantity", 12))
        .await
        .unwrap();
    assert_eq!(record.id, "ORD-001");
    assert_eq!(record.status, OrderStatus::Pending);
    assert_eq!(record.fields["customer"], "acme");
    assert_eq!(record.fields["quantity"], 12);
}

#[tokio::test]
async fn yield_provider_retries_without_timers() {
    // No paused clock here: TokioYield must drive the loop to completion
    // with no timer in play at all.
    let submitter = submitter(ScriptedGateway::new(vec![
        GatewayError::new("duplicate key value"),
        GatewayError::new("duplicate key value"),
    ]));

    let record = submitter
        .submit_with::<TokioYield>(OrderDraft::new())
        .await
        .unwrap();
    assert_eq!(record.id, "ORD-003");
    assert_eq!(submitter.gateway().seen_ids().len(), 3);
}

#[tokio::test]
async fn zero_attempt_budget_still_tries_once() {
    let submitter = OrderSubmitter::with_policy(
        Arc::new(OrderIdAllocator::new(EmptyDirectory)),
        ScriptedGateway::new(vec![]),
        RetryPolicy {
            max_attempts: 0,
            base_delay: Duration::ZERO,
        },
    );

    let record = submitter.submit(OrderDraft::new()).await.unwrap();
    assert_eq!(record.id, "ORD-001");
}

#[tokio::test(start_paused = true)]
async fn concurrent_submissions_never_reuse_an_identifier() {
    let allocator = Arc::new(OrderIdAllocator::new(EmptyDirectory));
    let submitter = Arc::new(OrderSubmitter::new(
        Arc::clone(&allocator),
        ScriptedGateway::new(vec![GatewayError::new("duplicate key value")]),
    ));

    let (a, b) = tokio::join!(
        submitter.submit(OrderDraft::new()),
        submitter.submit(OrderDraft::new()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.id, b.id);

    let mut seen = submitter.gateway().seen_ids();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), submitter.gateway().seen_ids().len());
}
