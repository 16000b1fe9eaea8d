//! Optional observability helpers for API calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every [`Client::execute`](crate::Client::execute) inside a span named
//!   `httpx.call` with the `method` and `stage` fields.
//! - Enable `metrics` to increment the `httpx_call_total` counter for every
//!   attempt/success/failure, labeled by `outcome`.
//!
//! The authenticating transport is deliberately silent; only the client records calls.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to [`Client::execute`](crate::Client::execute).
	Attempt,
	/// Response decoded (or copied) successfully.
	Success,
	/// Response status fell inside `400..=599`.
	ApiError,
	/// Any other failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::ApiError => "api_error",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
