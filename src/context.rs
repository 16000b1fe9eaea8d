//! Cancellation and deadline carrier for a single API call.
//!
//! A [`CallContext`] travels with the request through the request's extensions. The client
//! races every dispatch against [`CallContext::done`], so an in-flight call is abandoned as soon
//! as the context is canceled or its deadline passes, and the context error is preferred over
//! raw transport failures.

// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{_prelude::*, error::ContextError};

/// Cancellation token plus optional deadline shared by clones of the same context.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
	cancellation: CancellationToken,
	deadline: Option<OffsetDateTime>,
}
impl CallContext {
	/// Creates a context that never expires until [`cancel`](Self::cancel) is called.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an absolute deadline.
	pub fn with_deadline(mut self, deadline: OffsetDateTime) -> Self {
		self.deadline = Some(deadline);

		self
	}

	/// Sets a deadline relative to the current clock.
	pub fn with_timeout(self, timeout: Duration) -> Self {
		self.with_deadline(OffsetDateTime::now_utc() + timeout)
	}

	/// Returns the configured deadline, if any.
	pub fn deadline(&self) -> Option<OffsetDateTime> {
		self.deadline
	}

	/// Time left before the deadline, clamped at zero.
	pub fn remaining(&self) -> Option<Duration> {
		self.deadline.map(|deadline| {
			let left = deadline - OffsetDateTime::now_utc();

			if left.is_negative() { Duration::ZERO } else { left }
		})
	}

	/// Marks the context (and every clone) as canceled, waking every pending [`done`](Self::done).
	pub fn cancel(&self) {
		self.cancellation.cancel();
	}

	/// Token canceled together with this context, for wiring into other tasks.
	pub fn cancellation_token(&self) -> &CancellationToken {
		&self.cancellation
	}

	/// Resolves once the context is canceled or its deadline passes, reporting which.
	pub async fn done(&self) -> ContextError {
		let remaining =
			self.remaining().map(|left| std::time::Duration::try_from(left).unwrap_or_default());

		match remaining {
			Some(left) => tokio::select! {
				() = self.cancellation.cancelled() => ContextError::Canceled,
				() = tokio::time::sleep(left) => ContextError::DeadlineExceeded,
			},
			None => {
				self.cancellation.cancelled().await;

				ContextError::Canceled
			},
		}
	}

	/// Returns `true` once the context was canceled or its deadline passed.
	pub fn is_done(&self) -> bool {
		self.err().is_some()
	}

	/// Reports why the context is done, or `None` while it is still live.
	pub fn err(&self) -> Option<ContextError> {
		if self.cancellation.is_cancelled() {
			return Some(ContextError::Canceled);
		}

		match self.deadline {
			Some(deadline) if OffsetDateTime::now_utc() >= deadline =>
				Some(ContextError::DeadlineExceeded),
			_ => None,
		}
	}

	/// Attaches a clone of this context to the request extensions.
	pub fn attach(&self, request: &mut HttpRequest) {
		request.extensions_mut().insert(self.clone());
	}

	/// Reads the context attached to a request, if any.
	pub fn of(request: &HttpRequest) -> Option<&Self> {
		request.extensions().get::<Self>()
	}
}
