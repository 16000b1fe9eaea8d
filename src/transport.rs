//! Authenticating transport that stamps every outgoing request with a token.
//!
//! [`AuthTransport`] wraps any [`HttpTransport`]. Each dispatch copies the caller's request,
//! asks the [`TokenSource`] for a token, stamps the copy, and delegates. The transport never
//! checks [`Token::valid`](crate::auth::Token::valid) before sending: deciding when a token is
//! too old is the source's job, and a token handed out by the source is always used. It also
//! performs no retries, logging, or caching of its own.

// self
use crate::{
	_prelude::*,
	auth::TokenSource,
	error::{ConfigError, TokenError},
	http::{HttpTransport, TransportFuture},
};

/// [`HttpTransport`] that injects a token from a [`TokenSource`] into every request.
#[derive(Clone, Default)]
pub struct AuthTransport {
	/// Supplies the token added to each outgoing request; dispatching without one fails.
	pub source: Option<Arc<dyn TokenSource>>,
	/// Underlying transport; defaults to [`ReqwestTransport`](crate::http::ReqwestTransport).
	pub transport: Option<Arc<dyn HttpTransport>>,
}
impl AuthTransport {
	/// Creates a transport that authenticates through `source`.
	pub fn new(source: impl 'static + TokenSource) -> Self {
		Self { source: Some(Arc::new(source)), transport: None }
	}

	/// Sets the underlying transport requests are delegated to.
	pub fn with_transport(mut self, transport: impl HttpTransport) -> Self {
		self.transport = Some(Arc::new(transport));

		self
	}

	/// Returns a ready-to-use executing transport, e.g. for [`Client::copy`](crate::Client::copy).
	pub fn client(self) -> Arc<dyn HttpTransport> {
		Arc::new(self)
	}

	fn transport(&self) -> Result<Arc<dyn HttpTransport>> {
		match &self.transport {
			Some(transport) => Ok(transport.clone()),
			None => default_transport(),
		}
	}
}
impl Debug for AuthTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthTransport")
			.field("source_set", &self.source.is_some())
			.field("transport_set", &self.transport.is_some())
			.finish()
	}
}
impl HttpTransport for AuthTransport {
	fn round_trip<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			let mut stamped = clone_request(request);
			let source = self.source.as_ref().ok_or(ConfigError::MissingTokenSource)?;
			let token = source.token().await.map_err(TokenError::source_failure)?;

			token.set_authorization(&mut stamped);

			self.transport()?.round_trip(&stamped).await
		})
	}
}

/// Copies a request so the copy can be modified without the original ever observing it.
///
/// Method, URI, version, extensions, and body are copied as values; the header map is rebuilt
/// entry by entry so no header storage is shared with the original.
pub fn clone_request(request: &HttpRequest) -> HttpRequest {
	let mut copy = HttpRequest::new(request.body().clone());

	*copy.method_mut() = request.method().clone();
	*copy.uri_mut() = request.uri().clone();
	*copy.version_mut() = request.version();
	*copy.extensions_mut() = request.extensions().clone();

	let headers = copy.headers_mut();

	headers.reserve(request.headers().len());

	for (name, value) in request.headers() {
		headers.append(name.clone(), value.clone());
	}

	copy
}

#[cfg(feature = "reqwest")]
fn default_transport() -> Result<Arc<dyn HttpTransport>> {
	Ok(Arc::new(crate::http::ReqwestTransport::default()))
}
#[cfg(not(feature = "reqwest"))]
fn default_transport() -> Result<Arc<dyn HttpTransport>> {
	Err(ConfigError::MissingTransport.into())
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::header::{AUTHORIZATION, HeaderValue};
	// self
	use super::*;

	#[test]
	fn clone_request_copies_headers_independently() {
		let original = http::Request::post("https://api.example.com/v1/items?x=1")
			.header("accept", "application/json")
			.header("x-multi", "a")
			.header("x-multi", "b")
			.body(b"{}".to_vec())
			.expect("Request should build.");
		let mut copy = clone_request(&original);

		copy.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("Token t"));
		copy.headers_mut().append("x-multi", HeaderValue::from_static("c"));

		assert_eq!(copy.method(), original.method());
		assert_eq!(copy.uri(), original.uri());
		assert_eq!(copy.body(), original.body());
		assert!(original.headers().get(AUTHORIZATION).is_none());
		assert_eq!(original.headers().get_all("x-multi").iter().count(), 2);
		assert_eq!(copy.headers().get_all("x-multi").iter().count(), 3);
	}

	#[tokio::test]
	async fn missing_source_is_a_configuration_error() {
		let request = HttpRequest::new(Vec::new());
		let err = AuthTransport::default()
			.round_trip(&request)
			.await
			.expect_err("Dispatch without a source must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingTokenSource)));
	}
}
