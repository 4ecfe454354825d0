//! # OpsDesk Webhooks
//!
//! Write side of the command center. Every user mutation becomes exactly one
//! JSON POST to the automation host; the verdict is returned to the caller and
//! nothing is retried.

pub mod dispatcher;
pub mod payload;

pub use dispatcher::{DispatchError, Endpoint, WebhookDispatcher, WebhookSink};
pub use payload::{ApprovalPayload, CreateTaskPayload, UpdateTaskPayload};
