//! Built-in [`TokenSource`] implementations.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenFuture, TokenSource},
};

/// Source that always yields the same shared token.
#[derive(Clone, Debug)]
pub struct StaticTokenSource(Arc<dyn Token>);
impl StaticTokenSource {
	/// Wraps a token.
	pub fn new(token: impl Token + 'static) -> Self {
		Self(Arc::new(token))
	}
}
impl From<Arc<dyn Token>> for StaticTokenSource {
	fn from(token: Arc<dyn Token>) -> Self {
		Self(token)
	}
}
impl TokenSource for StaticTokenSource {
	fn token(&self) -> TokenFuture<'_> {
		let token = self.0.clone();

		Box::pin(async move { Ok(token) })
	}
}

/// Source backed by an async closure, typically one that calls a login endpoint.
pub struct FnTokenSource<F>(F);
impl<F, Fut> FnTokenSource<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: Future<Output = Result<Arc<dyn Token>>> + Send + 'static,
{
	/// Wraps `fetch`.
	pub fn new(fetch: F) -> Self {
		Self(fetch)
	}
}
impl<F> Debug for FnTokenSource<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnTokenSource(..)")
	}
}
impl<F, Fut> TokenSource for FnTokenSource<F>
where
	F: Fn() -> Fut + Send + Sync,
	Fut: Future<Output = Result<Arc<dyn Token>>> + Send + 'static,
{
	fn token(&self) -> TokenFuture<'_> {
		Box::pin((self.0)())
	}
}

/// Caches the last token from an inner source and refreshes it once it stops being
/// [`valid`](Token::valid).
///
/// Concurrent callers that observe a stale token wait on a single refresh instead of
/// stampeding the inner source. A failed refresh is returned to every waiter; the stale token is
/// never served in its place.
pub struct CachedTokenSource<S> {
	inner: S,
	cached: RwLock<Option<Arc<dyn Token>>>,
	refresh_guard: AsyncMutex<()>,
}
impl<S> CachedTokenSource<S>
where
	S: TokenSource,
{
	/// Wraps `inner` with an empty cache.
	pub fn new(inner: S) -> Self {
		Self { inner, cached: RwLock::new(None), refresh_guard: AsyncMutex::new(()) }
	}

	/// Seeds the cache, e.g. with a token restored from disk.
	pub fn with_token(self, token: Arc<dyn Token>) -> Self {
		*self.cached.write() = Some(token);

		self
	}

	/// Returns the cached token if it is still valid.
	pub fn cached(&self) -> Option<Arc<dyn Token>> {
		self.cached.read().as_ref().filter(|token| token.valid()).cloned()
	}

	/// Drops the cached token so the next call refreshes.
	pub fn invalidate(&self) {
		self.cached.write().take();
	}

	async fn refresh(&self) -> Result<Arc<dyn Token>> {
		let _singleflight = self.refresh_guard.lock().await;

		// Another caller may have refreshed while this one waited.
		if let Some(token) = self.cached() {
			return Ok(token);
		}

		let token = self.inner.token().await?;

		*self.cached.write() = Some(token.clone());

		Ok(token)
	}
}
impl<S> Debug for CachedTokenSource<S> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedTokenSource").field("cached", &self.cached.read().is_some()).finish()
	}
}
impl<S> TokenSource for CachedTokenSource<S>
where
	S: TokenSource,
{
	fn token(&self) -> TokenFuture<'_> {
		Box::pin(async move {
			match self.cached() {
				Some(token) => Ok(token),
				None => self.refresh().await,
			}
		})
	}
}
