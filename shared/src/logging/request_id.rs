//! Request-id propagation through async tasks

use std::future::Future;
use uuid::Uuid;

/// Header carrying the correlation id in and out of the HTTP layer
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

tokio::task_local! {
    static REQUEST_ID: String;
}

/// Run `fut` with `request_id` visible to `current_request_id()`
pub async fn with_request_id<F>(request_id: impl Into<String>, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(request_id.into(), fut).await
}

/// Request id of the enclosing `with_request_id` scope, if any
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}
