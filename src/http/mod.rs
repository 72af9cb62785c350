//! HTTP layer
//!
//! One transport for issuing a single API request, plus the bounded retry
//! wrapper every logical fetch goes through.
//!
//! # Behavior
//!
//! - **Transport**: one GET per call, token and API version applied to the
//!   URL only when not already present
//! - **Retry**: fixed backoff, shared budget for remote error indicators and
//!   transient transport failures, last remote message surfaced on exhaustion

mod retry;
mod transport;

pub use retry::{fetch_page, with_retries};
pub use transport::Transport;
