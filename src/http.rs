//! Transport primitives for dispatching API requests.
//!
//! [`HttpTransport`] is the pipeline's only dependency on an HTTP stack. Requests and responses
//! are plain [`http`] values with fully buffered bodies, so a transport borrows the request it is
//! given and hands back an owned response. The crate ships [`ReqwestTransport`] as the default
//! implementation; the authenticating transport in [`crate::transport`] layers on top of any
//! implementation.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::_prelude::*;
#[cfg(feature = "reqwest")]
use crate::{
	context::CallContext,
	error::{ConfigError, TransportError},
};

/// Outgoing request with a buffered body.
pub type HttpRequest = http::Request<Vec<u8>>;
/// Incoming response with a buffered body.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`HttpTransport::round_trip`].
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse>> + 'a + Send>>;

/// Executes a single HTTP exchange.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by many
/// clients and concurrent calls. They receive the request by reference and must not assume
/// they may keep it; anything that needs to be changed before sending is changed on a copy.
/// An error means no response was received; HTTP error statuses are returned as responses.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves to the complete response.
	fn round_trip<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a>;
}
impl<T> HttpTransport for Arc<T>
where
	T: ?Sized + HttpTransport,
{
	fn round_trip<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
		(**self).round_trip(request)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// When the request carries a [`CallContext`], the remaining time is applied as the request
/// timeout and the exchange is abandoned as soon as the context is canceled.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds the wrapped client from a configured reqwest builder.
	pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self> {
		let client = builder.build().map_err(ConfigError::http_client_build)?;

		Ok(Self(client))
	}

	fn to_reqwest(&self, request: &HttpRequest) -> Result<reqwest::Request, ReqwestError> {
		let mut builder = self
			.0
			.request(request.method().clone(), request.uri().to_string())
			.version(request.version())
			.headers(request.headers().clone())
			.body(request.body().clone());

		if let Some(timeout) = CallContext::of(request)
			.and_then(CallContext::remaining)
			.and_then(|left| std::time::Duration::try_from(left).ok())
		{
			builder = builder.timeout(timeout);
		}

		builder.build()
	}

	async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
		let outgoing = self.to_reqwest(request).map_err(|e| TransportError::network(request, e))?;
		let response =
			self.0.execute(outgoing).await.map_err(|e| TransportError::network(request, e))?;
		let status = response.status();
		let version = response.version();
		let headers = response.headers().to_owned();
		let body =
			response.bytes().await.map_err(|e| TransportError::network(request, e))?.to_vec();
		let mut converted = HttpResponse::new(body);

		*converted.status_mut() = status;
		*converted.version_mut() = version;
		*converted.headers_mut() = headers;

		Ok(converted)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn round_trip<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
		Box::pin(async move {
			// Dropping the pending send aborts the connection once the context is done.
			match CallContext::of(request) {
				Some(ctx) => tokio::select! {
					reason = ctx.done() => Err(reason.into()),
					result = self.send(request) => result,
				},
				None => self.send(request).await,
			}
		})
	}
}
