//! Credential capabilities consumed by the authenticating transport.
//!
//! [`Token`] and [`TokenSource`] are the only seams between the pipeline and a credential
//! scheme. Any concrete credential (compact JWT, static API key, signed query parameter) plugs in
//! by implementing [`Token`]; refresh and caching policy lives entirely behind [`TokenSource`].

pub mod fixed;
pub mod jwt;
pub mod secret;
pub mod source;

pub use fixed::*;
pub use jwt::*;
pub use secret::*;
pub use source::*;

// self
use crate::_prelude::*;

/// Boxed future returned by [`TokenSource::token`].
pub type TokenFuture<'a> = Pin<Box<dyn Future<Output = Result<Arc<dyn Token>>> + 'a + Send>>;

/// Credential that can judge its own freshness and stamp itself onto a request.
///
/// Tokens are shared read-only across concurrent stampings, so implementations must be
/// immutable once constructed.
pub trait Token
where
	Self: Debug + Send + Sync,
{
	/// Returns `true` while the credential is usable.
	fn valid(&self) -> bool;

	/// Writes the credential onto `request` as a single header or query parameter.
	///
	/// Must be idempotent and must not depend on any other request state.
	fn set_authorization(&self, request: &mut HttpRequest);
}

/// Supplier of [`Token`]s.
///
/// Implementations are called concurrently by every in-flight dispatch and own their internal
/// synchronization. They may return a cached token or refresh one; callers never mutate the
/// returned token.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Produces a token or fails.
	fn token(&self) -> TokenFuture<'_>;
}
impl<S> TokenSource for Arc<S>
where
	S: ?Sized + TokenSource,
{
	fn token(&self) -> TokenFuture<'_> {
		(**self).token()
	}
}
