//! Sequential, human-readable order identifiers (`ORD-001`, `ORD-002`, …)
//! for clients of a REST order collection that has no server-side sequence
//! generator.
//!
//! The crate has two moving parts:
//!
//! - [`OrderIdAllocator`]: scans the existing orders once (single-flight,
//!   lazily) to find the high-water mark, then issues strictly increasing
//!   identifiers from a local counter. The counter is advisory: the backend
//!   remains the source of truth for uniqueness.
//! - [`OrderSubmitter`]: the allocate → create → classify → reallocate loop.
//!   Two sessions can legitimately compute the same "next" number; when the
//!   backend reports a duplicate-class failure, the submitter backs off,
//!   draws a fresh identifier, and retries within a bounded budget.
//!
//! The backend is consumed through two narrow traits, [`OrderDirectory`] and
//! [`OrderGateway`], so any transport (or a test stub) plugs in with a plain
//! `async fn`.
//!
//! # Example
//!
//! ```
//! use ordseq::{
//!     GatewayError, OrderDirectory, OrderDraft, OrderGateway, OrderIdAllocator, OrderRecord,
//!     OrderSubmission, OrderSubmitter,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Backend;
//!
//! impl OrderDirectory for Backend {
//!     async fn list_order_ids(&self) -> Result<Vec<String>, GatewayError> {
//!         Ok(vec!["ORD-041".into(), "ORD-042".into()])
//!     }
//! }
//!
//! impl OrderGateway for Backend {
//!     async fn create_order(&self, submission: &OrderSubmission) -> Result<OrderRecord, GatewayError> {
//!         Ok(OrderRecord {
//!             id: submission.id.clone(),
//!             status: submission.status,
//!             submitted_at: submission.submitted_at,
//!             fields: submission.fields.clone(),
//!         })
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let allocator = Arc::new(OrderIdAllocator::new(Backend));
//! let submitter = OrderSubmitter::new(allocator, Backend);
//!
//! let record = submitter
//!     .submit(OrderDraft::new().field("customer", "acme"))
//!     .await
//!     .unwrap();
//! assert_eq!(record.id, "ORD-043");
//! # }
//! ```

mod allocator;
mod error;
mod gateway;
mod id;
mod sleep;
mod submit;

pub use crate::allocator::*;
pub use crate::error::*;
pub use crate::gateway::*;
pub use crate::id::*;
pub use crate::sleep::*;
pub use crate::submit::*;
