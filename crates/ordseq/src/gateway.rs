use chrono::{DateTime, Utc};
use core::future::Future;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message fragments that mark a creation failure as a uniqueness collision.
///
/// Matching is case-insensitive. Free-text matching is the floor contract:
/// backends that report a structured status use the 409 fast path in
/// [`GatewayError::is_duplicate`] instead.
const DUPLICATE_KEYWORDS: [&str; 4] = ["duplicate", "already exists", "conflict", "unique"];

/// Read access to the existing order collection.
///
/// The allocator calls this exactly once per initialization scan to rebuild
/// its high-water mark. Implement it with a plain `async fn`:
///
/// ```
/// use ordseq::{GatewayError, OrderDirectory};
///
/// struct Backend;
///
/// impl OrderDirectory for Backend {
///     async fn list_order_ids(&self) -> Result<Vec<String>, GatewayError> {
///         Ok(vec!["ORD-001".into()])
///     }
/// }
/// ```
pub trait OrderDirectory {
    /// Returns the identifiers of all existing orders, in no particular
    /// order. Strings that do not parse as identifiers are tolerated.
    fn list_order_ids(&self) -> impl Future<Output = Result<Vec<String>, GatewayError>> + Send;
}

/// Write access to the order collection.
///
/// The backend owns the uniqueness constraint; a submission carrying an
/// identifier that is already taken must fail with an error that
/// [`GatewayError::is_duplicate`] can recognize.
pub trait OrderGateway {
    /// Creates one order record from a fully populated submission.
    fn create_order(
        &self,
        submission: &OrderSubmission,
    ) -> impl Future<Output = Result<OrderRecord, GatewayError>> + Send;
}

/// A failure reported by the backend collaborators.
///
/// Carries the human-readable message the transport surfaced and, when the
/// transport exposes one, an HTTP-ish status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    status: Option<u16>,
    message: String,
}

impl GatewayError {
    /// A failure with a message but no structured status.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// A failure with both a status code and a message.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// The structured status code, if the transport reported one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The human-readable failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this failure is a uniqueness collision.
    ///
    /// A structured `409 Conflict` status is checked first; otherwise the
    /// message is scanned case-insensitively for the duplicate keywords.
    pub fn is_duplicate(&self) -> bool {
        if self.status == Some(409) {
            return true;
        }
        let message = self.message.to_ascii_lowercase();
        DUPLICATE_KEYWORDS.iter().any(|kw| message.contains(kw))
    }
}

/// Lifecycle state of an order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted, awaiting backend processing. The initial state stamped on
    /// every new submission.
    Pending,
    Confirmed,
    Cancelled,
}

/// The caller-provided part of an order: every field except the identifier,
/// timestamp, and lifecycle state, which the submitter fills in.
///
/// # Example
///
/// ```
/// use ordseq::OrderDraft;
///
/// let draft = OrderDraft::new()
///     .field("customer", "acme")
///     .field("quantity", 12);
/// assert_eq!(draft.fields().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderDraft {
    fields: Map<String, Value>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one field, replacing any previous value under the same key.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for OrderDraft {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// A fully populated creation request: the draft fields plus the allocated
/// identifier and the submitter's defaults.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSubmission {
    /// The allocated identifier, rendered in canonical form.
    pub id: String,
    pub status: OrderStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// An order record as stored by the backend.
///
/// Fields beyond the known ones are preserved untouched so the record can
/// round-trip through callers that know more of the order schema than this
/// crate does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub status: OrderStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
