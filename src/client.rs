//! JSON API client: request building against a base URL and response classification.
//!
//! [`Client`] resolves slash-prefixed paths against its base URL, encodes JSON bodies, and sets
//! the standard `Accept`/`User-Agent` headers. [`Client::execute`] dispatches through the
//! configured [`HttpTransport`] and turns the outcome into one of: a decoded target, an
//! [`Error::Api`] carrying the response envelope, or a transport/context error.
//!
//! Authentication is layered in by copying a configured client onto an
//! [`AuthTransport`](crate::transport::AuthTransport):
//!
//! ```no_run
//! # async fn demo() -> httpx::error::Result<()> {
//! use httpx::{
//! 	Client, Method, Target,
//! 	auth::{CachedTokenSource, JwtToken, StaticTokenSource},
//! 	context::CallContext,
//! 	transport::AuthTransport,
//! };
//!
//! let base = Client::new("https://api.example.com", "svc/1.0")?;
//! let source = CachedTokenSource::new(StaticTokenSource::new(JwtToken::new("h.p.s")?));
//! let api = base.copy(AuthTransport::new(source).client());
//! let request = api.build_request(Method::GET, "/v1/me", &[], None::<&()>)?;
//! let mut me = serde_json::Value::Null;
//!
//! api.execute(&CallContext::new(), &request, Some(Target::json(&mut me))).await?;
//! # Ok(())
//! # }
//! ```

pub mod response;

pub use response::Response;

// std
use std::io::Write;
// crates.io
use http::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	context::CallContext,
	error::{ConfigError, TransportError},
	http::HttpTransport,
	obs::{self, CallOutcome, CallSpan},
	transport::clone_request,
};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "httpx";

const JSON: &str = "application/json";

/// Destination for a successful response body.
pub enum Target<'a, T> {
	/// Decode the body as JSON into the referenced value; an empty body leaves it untouched.
	Json(&'a mut T),
	/// Copy the body verbatim into the writer.
	Raw(&'a mut (dyn Write + Send)),
}
impl<'a, T> Target<'a, T>
where
	T: DeserializeOwned,
{
	/// Decodes into `value`.
	pub fn json(value: &'a mut T) -> Self {
		Self::Json(value)
	}
}
impl<'a> Target<'a, ()> {
	/// Copies raw bytes into `sink`.
	pub fn raw(sink: &'a mut (dyn Write + Send)) -> Self {
		Self::Raw(sink)
	}
}
impl<T> Debug for Target<'_, T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Json(_) => f.write_str("Target::Json(..)"),
			Self::Raw(_) => f.write_str("Target::Raw(..)"),
		}
	}
}

/// JSON API client bound to one base URL.
///
/// Cloning is cheap; clones share the executing transport.
#[derive(Clone)]
pub struct Client {
	base_url: Url,
	user_agent: String,
	transport: Arc<dyn HttpTransport>,
}
impl Client {
	/// Creates a client backed by the default reqwest transport.
	///
	/// An empty `user_agent` falls back to [`DEFAULT_USER_AGENT`].
	#[cfg(feature = "reqwest")]
	pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
		Self::with_transport(base_url, user_agent, crate::http::ReqwestTransport::default())
	}

	/// Creates a client that executes requests through `transport`.
	pub fn with_transport(
		base_url: &str,
		user_agent: &str,
		transport: impl HttpTransport,
	) -> Result<Self> {
		let base_url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
			url: base_url.to_owned(),
			source,
		})?;
		let user_agent =
			if user_agent.is_empty() { DEFAULT_USER_AGENT.to_owned() } else { user_agent.to_owned() };

		Ok(Self { base_url, user_agent, transport: Arc::new(transport) })
	}

	/// Returns a client sharing this client's base URL and user agent but executing through
	/// `transport`.
	pub fn copy(&self, transport: impl HttpTransport) -> Self {
		Self {
			base_url: self.base_url.clone(),
			user_agent: self.user_agent.clone(),
			transport: Arc::new(transport),
		}
	}

	/// Base URL requests are resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// User agent stamped on every request.
	pub fn user_agent(&self) -> &str {
		&self.user_agent
	}

	/// Builds a JSON API request.
	///
	/// `path` must start with `/` and is resolved against the base URL. `query` pairs are merged
	/// into the resolved URL's query, replacing existing values for the same key. A `Some` body
	/// is serialized as JSON and labeled `application/json`.
	pub fn build_request<B>(
		&self,
		method: Method,
		path: &str,
		query: &[(&str, &str)],
		body: Option<&B>,
	) -> Result<HttpRequest>
	where
		B: ?Sized + Serialize,
	{
		let mut url = self.resolve(path)?;

		if !query.is_empty() {
			merge_query(&mut url, query);
		}

		let body = body.map(serde_json::to_vec).transpose().map_err(ConfigError::BodyEncode)?;
		let mut builder = http::Request::builder().method(method).uri(url.as_str());

		if body.is_some() {
			builder = builder.header(CONTENT_TYPE, JSON);
		}

		let request = builder
			.header(ACCEPT, JSON)
			.header(USER_AGENT, self.user_agent.as_str())
			.body(body.unwrap_or_default())
			.map_err(ConfigError::from)?;

		Ok(request)
	}

	/// Builds a request whose body is sent unmodified with the caller's content type, e.g. a
	/// pre-encoded `multipart/form-data` payload.
	pub fn build_multipart_request<B>(
		&self,
		method: Method,
		path: &str,
		body: Option<B>,
		content_type: &str,
	) -> Result<HttpRequest>
	where
		B: Into<Vec<u8>>,
	{
		let body = body.ok_or(ConfigError::MissingBody)?;
		let url = self.resolve(path)?;
		let request = http::Request::builder()
			.method(method)
			.uri(url.as_str())
			.header(CONTENT_TYPE, content_type)
			.header(ACCEPT, JSON)
			.header(USER_AGENT, self.user_agent.as_str())
			.body(body.into())
			.map_err(ConfigError::from)?;

		Ok(request)
	}

	/// Sends `request` and classifies the response.
	///
	/// - `target` is required; `None` fails before any network I/O.
	/// - A context that is already done fails before any network I/O. A context that finishes
	///   while the call is in flight abandons it with the context error, which is also returned
	///   instead of the transport error when dispatch fails after the context finished.
	/// - Statuses in `400..=599` return [`Error::Api`] with the body text as the message and
	///   leave the target untouched.
	/// - Otherwise the body is copied into a [`Target::Raw`] sink or decoded into a
	///   [`Target::Json`] value; an empty body is not an error.
	pub async fn execute<T>(
		&self,
		ctx: &CallContext,
		request: &HttpRequest,
		target: Option<Target<'_, T>>,
	) -> Result<Response>
	where
		T: DeserializeOwned,
	{
		let target = target.ok_or(ConfigError::MissingTarget)?;
		let span = CallSpan::new(request.method(), "execute");

		obs::record_call_outcome(CallOutcome::Attempt);

		let result = span.instrument(self.dispatch(ctx, request, target)).await;

		let (outcome, status) = match &result {
			Ok(response) => (CallOutcome::Success, Some(response.status)),
			Err(e @ Error::Api(_)) => (CallOutcome::ApiError, e.status()),
			Err(e) => (CallOutcome::Failure, e.status()),
		};

		obs::record_call_outcome(outcome);
		obs::trace_call_outcome(outcome, status);

		result
	}

	async fn dispatch<T>(
		&self,
		ctx: &CallContext,
		request: &HttpRequest,
		target: Target<'_, T>,
	) -> Result<Response>
	where
		T: DeserializeOwned,
	{
		if let Some(err) = ctx.err() {
			return Err(err.into());
		}

		let mut outgoing = clone_request(request);

		ctx.attach(&mut outgoing);

		let dispatched = tokio::select! {
			reason = ctx.done() => return Err(reason.into()),
			dispatched = self.transport.round_trip(&outgoing) => dispatched,
		};
		let raw = match dispatched {
			Ok(raw) => raw,
			Err(e) => return Err(ctx.err().map(Error::from).unwrap_or(e)),
		};
		let mut response = Response::new(request, &raw);
		let body = raw.into_body();

		if response.has_error() {
			response.error_message = Some(String::from_utf8_lossy(&body).into_owned());

			return Err(Error::Api(Box::new(response)));
		}

		match target {
			Target::Raw(sink) => sink.write_all(&body).map_err(TransportError::Io)?,
			Target::Json(value) => {
				// Whitespace-only bodies end the stream before any value, same as an empty one.
				if body.iter().all(u8::is_ascii_whitespace) {
					return Ok(response);
				}

				let mut de = serde_json::Deserializer::from_slice(&body);

				match serde_path_to_error::deserialize(&mut de) {
					Ok(decoded) => *value = decoded,
					Err(source) => return Err(Error::Decode { response: Box::new(response), source }),
				}
			},
		}

		Ok(response)
	}

	fn resolve(&self, path: &str) -> Result<Url> {
		if !path.starts_with('/') {
			return Err(ConfigError::RelativePath { path: path.to_owned() }.into());
		}

		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidUrl { path: path.to_owned(), source }.into())
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_url", &self.base_url.as_str())
			.field("user_agent", &self.user_agent)
			.finish()
	}
}

fn merge_query(url: &mut Url, params: &[(&str, &str)]) {
	let mut merged = BTreeMap::<String, Vec<String>>::new();

	for (key, value) in url.query_pairs() {
		merged.entry(key.into_owned()).or_default().push(value.into_owned());
	}
	for (key, value) in params {
		merged.insert((*key).to_owned(), vec![(*value).to_owned()]);
	}

	url.query_pairs_mut()
		.clear()
		.extend_pairs(merged.iter().flat_map(|(key, values)| values.iter().map(move |v| (key, v))));
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::http::TransportFuture;

	#[derive(Default)]
	struct Canned {
		status: u16,
		body: &'static str,
		calls: AtomicUsize,
	}
	impl Canned {
		fn new(status: u16, body: &'static str) -> Arc<Self> {
			Arc::new(Self { status, body, calls: AtomicUsize::new(0) })
		}
	}
	impl HttpTransport for Canned {
		fn round_trip<'a>(&'a self, _: &'a HttpRequest) -> TransportFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let response = http::Response::builder()
				.status(self.status)
				.body(self.body.as_bytes().to_vec())
				.map_err(|e| Error::from(ConfigError::from(e)));

			Box::pin(async move { response })
		}
	}

	struct Stalled;
	impl HttpTransport for Stalled {
		fn round_trip<'a>(&'a self, _: &'a HttpRequest) -> TransportFuture<'a> {
			Box::pin(std::future::pending())
		}
	}

	fn client(transport: Arc<Canned>) -> Client {
		Client::with_transport("https://api.example.com/base/", "", transport)
			.expect("Client should build.")
	}

	#[test]
	fn empty_user_agent_falls_back() {
		let client = client(Canned::new(200, ""));

		assert_eq!(client.user_agent(), DEFAULT_USER_AGENT);
	}

	#[test]
	fn base_url_must_be_absolute() {
		let err = Client::with_transport("api/v1", "ua", Canned::new(200, ""))
			.expect_err("Relative base URLs must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidBaseUrl { .. })));
	}

	#[test]
	fn path_replaces_base_path() {
		let request = client(Canned::new(200, ""))
			.build_request(Method::GET, "/v1/users", &[], None::<&()>)
			.expect("Request should build.");

		assert_eq!(request.uri(), "https://api.example.com/v1/users");
		assert!(request.headers().get(CONTENT_TYPE).is_none());
		assert_eq!(request.headers()[ACCEPT], JSON);
		assert_eq!(request.headers()[USER_AGENT], DEFAULT_USER_AGENT);
		assert!(request.body().is_empty());
	}

	#[test]
	fn query_params_overwrite_existing_keys() {
		let request = client(Canned::new(200, ""))
			.build_request(
				Method::GET,
				"/search?q=old&tag=a&tag=b",
				&[("q", "new value"), ("page", "2")],
				None::<&()>,
			)
			.expect("Request should build.");

		assert_eq!(request.uri().query(), Some("page=2&q=new+value&tag=a&tag=b"));
	}

	#[test]
	fn relative_paths_are_rejected_by_both_builders() {
		let client = client(Canned::new(200, ""));

		for path in ["v1/users", "", "https://evil.example.com/"] {
			let err = client
				.build_request(Method::GET, path, &[], None::<&()>)
				.expect_err("Relative paths must be rejected.");

			assert!(matches!(err, Error::Config(ConfigError::RelativePath { .. })));

			let err = client
				.build_multipart_request(Method::POST, path, Some(b"x".to_vec()), "text/plain")
				.expect_err("Relative paths must be rejected.");

			assert!(matches!(err, Error::Config(ConfigError::RelativePath { .. })));
		}
	}

	#[test]
	fn multipart_passes_body_through() {
		let client = client(Canned::new(200, ""));
		let request = client
			.build_multipart_request(
				Method::POST,
				"/upload",
				Some(b"--b\r\nraw\r\n--b--".to_vec()),
				"multipart/form-data; boundary=b",
			)
			.expect("Request should build.");

		assert_eq!(request.body().as_slice(), b"--b\r\nraw\r\n--b--");
		assert_eq!(request.headers()[CONTENT_TYPE], "multipart/form-data; boundary=b");

		let err = client
			.build_multipart_request(Method::POST, "/upload", None::<Vec<u8>>, "text/plain")
			.expect_err("Missing bodies must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::MissingBody)));
	}

	#[tokio::test]
	async fn missing_target_skips_network() {
		let transport = Canned::new(200, "{}");
		let client = client(transport.clone());
		let request = client
			.build_request(Method::GET, "/v1/ping", &[], None::<&()>)
			.expect("Request should build.");
		let err = client
			.execute::<()>(&CallContext::new(), &request, None)
			.await
			.expect_err("Missing target must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingTarget)));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn canceled_context_skips_network() {
		let transport = Canned::new(200, "{}");
		let client = client(transport.clone());
		let ctx = CallContext::new();
		let request = client
			.build_request(Method::GET, "/v1/ping", &[], None::<&()>)
			.expect("Request should build.");
		let mut out = serde_json::Value::Null;

		ctx.cancel();

		let err = client
			.execute(&ctx, &request, Some(Target::json(&mut out)))
			.await
			.expect_err("Canceled context must fail.");

		assert!(matches!(err, Error::Context(crate::error::ContextError::Canceled)));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn whitespace_body_is_not_a_decode_error() {
		let client = client(Canned::new(204, " \n"));
		let request = client
			.build_request(Method::DELETE, "/v1/items/1", &[], None::<&()>)
			.expect("Request should build.");
		let mut out = vec![1_u8];
		let response = client
			.execute(&CallContext::new(), &request, Some(Target::json(&mut out)))
			.await
			.expect("Empty bodies must not fail.");

		assert_eq!(response.status, StatusCode::NO_CONTENT);
		assert_eq!(out, vec![1]);
	}

	#[tokio::test]
	async fn malformed_json_returns_envelope() {
		let client = client(Canned::new(200, "{\"a\":\"x\"}"));
		let request = client
			.build_request(Method::GET, "/v1/items", &[], None::<&()>)
			.expect("Request should build.");
		let mut out = BTreeMap::<String, u32>::new();
		let err = client
			.execute(&CallContext::new(), &request, Some(Target::json(&mut out)))
			.await
			.expect_err("Type mismatch must fail.");

		assert_eq!(err.status(), Some(StatusCode::OK));
		assert!(matches!(err, Error::Decode { .. }));
		assert!(out.is_empty());
	}

	#[tokio::test]
	async fn trailing_data_after_first_value_is_ignored() {
		let client = client(Canned::new(200, "{\"a\":1}\n{\"a\":2} trailing"));
		let request = client
			.build_request(Method::GET, "/v1/items", &[], None::<&()>)
			.expect("Request should build.");
		let mut out = BTreeMap::<String, u32>::new();

		client
			.execute(&CallContext::new(), &request, Some(Target::json(&mut out)))
			.await
			.expect("Only the first value is decoded.");

		assert_eq!(out.get("a"), Some(&1));
	}

	#[tokio::test]
	async fn in_flight_call_is_abandoned_on_cancel() {
		let client = Client::with_transport("https://api.example.com/", "", Stalled)
			.expect("Client should build.");
		let request = client
			.build_request(Method::GET, "/v1/slow", &[], None::<&()>)
			.expect("Request should build.");
		let ctx = CallContext::new();
		let canceler = ctx.clone();
		let mut out = serde_json::Value::Null;

		tokio::spawn(async move {
			tokio::time::sleep(std::time::Duration::from_millis(20)).await;
			canceler.cancel();
		});

		let err = client
			.execute(&ctx, &request, Some(Target::json(&mut out)))
			.await
			.expect_err("Canceled call must not wait for the transport.");

		assert!(matches!(err, Error::Context(crate::error::ContextError::Canceled)), "{err:?}");
	}

	#[tokio::test]
	async fn in_flight_call_is_abandoned_at_deadline() {
		let client = Client::with_transport("https://api.example.com/", "", Stalled)
			.expect("Client should build.");
		let request = client
			.build_request(Method::GET, "/v1/slow", &[], None::<&()>)
			.expect("Request should build.");
		let ctx = CallContext::new().with_timeout(Duration::milliseconds(20));
		let mut out = serde_json::Value::Null;
		let err = client
			.execute(&ctx, &request, Some(Target::json(&mut out)))
			.await
			.expect_err("Deadline must abandon the call.");

		assert!(matches!(err, Error::Context(crate::error::ContextError::DeadlineExceeded)));
	}
}
