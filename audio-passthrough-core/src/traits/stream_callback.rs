use std::sync::Arc;

use crate::models::stream_types::CallbackEvent;

/// Callback registered on a stream with `reg_callback`.
///
/// Invoked synchronously on the caller's thread from inside the operation
/// that produced the event (flush, transfer retries). Keep it short.
pub type StreamCallback = Arc<dyn Fn(CallbackEvent) + Send + Sync + 'static>;
