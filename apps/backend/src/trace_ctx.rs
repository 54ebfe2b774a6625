//! Request-scoped trace id.
//!
//! [`RequestTrace`](crate::middleware::RequestTrace) opens the scope for each
//! request; error rendering reads it so a problem response and the log lines
//! of its request share one id.

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

pub const UNKNOWN_TRACE_ID: &str = "unknown";

task_local! {
    static CURRENT: String;
}

/// Trace id of the running request, or `"unknown"` outside of one.
pub fn trace_id() -> String {
    CURRENT
        .try_with(Clone::clone)
        .unwrap_or_else(|_| UNKNOWN_TRACE_ID.to_string())
}

pub fn new_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Run `fut` with `trace_id` as the current id.
pub async fn scope<F: Future>(trace_id: String, fut: F) -> F::Output {
    CURRENT.scope(trace_id, fut).await
}
