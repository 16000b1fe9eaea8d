//! Pipeline-level error types shared across the client, transports, and tokens.

// self
use crate::{_prelude::*, client::Response};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for foreign failure sources.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; never retried internally.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Token could not be produced or parsed.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Transport failure with no HTTP response (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Caller's call context was canceled or ran past its deadline.
	#[error(transparent)]
	Context(#[from] ContextError),

	/// Response status fell inside `400..=599`; the envelope carries status, method, URL, and body.
	#[error("{0}")]
	Api(Box<Response>),
	/// Response body could not be decoded into the requested target.
	#[error("Failed to decode the response body of {} {}.", .response.method, .response.url)]
	Decode {
		/// Envelope of the response whose body was consumed.
		response: Box<Response>,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl Error {
	/// Returns the HTTP status code when the error originates from an application response.
	pub fn status(&self) -> Option<StatusCode> {
		match self {
			Self::Api(response) | Self::Decode { response, .. } => Some(response.status),
			_ => None,
		}
	}

	/// Returns the response envelope attached to application and decode errors.
	pub fn response(&self) -> Option<&Response> {
		match self {
			Self::Api(response) | Self::Decode { response, .. } => Some(&**response),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised before any network I/O.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base URL cannot be parsed or is not absolute.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Offending URL string.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request path does not start with `/`.
	#[error("Request path must have a preceding slash, but `{path}` does not.")]
	RelativePath {
		/// Offending path.
		path: String,
	},
	/// Request path cannot be resolved against the base URL.
	#[error("Request path `{path}` cannot be resolved against the base URL.")]
	InvalidUrl {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// JSON body could not be serialized.
	#[error("Request body could not be encoded as JSON.")]
	BodyEncode(#[source] serde_json::Error),
	/// Raw body builder received no body.
	#[error("Raw request body must be provided.")]
	MissingBody,
	/// HTTP request assembly failed (method, header value, URI).
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Authenticating transport dispatched without a token source.
	#[error("Authenticating transport has no token source configured.")]
	MissingTokenSource,
	/// No executing transport configured and the default transport is not compiled in.
	#[error("No HTTP transport configured; enable the `reqwest` feature or supply one.")]
	MissingTransport,
	/// Response target was not supplied.
	#[error("Response target must be provided.")]
	MissingTarget,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Token production and parsing failures.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Token source failed to produce a token.
	#[error("Token source failed to produce a token.")]
	Source {
		/// Source-specific failure.
		#[source]
		source: BoxError,
	},
	/// Compact token does not have exactly three dot-separated segments.
	#[error("Token is not a well-formed compact token: expected 3 segments, found {segments}.")]
	Malformed {
		/// Number of segments found.
		segments: usize,
	},
	/// Payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	PayloadEncoding(#[from] base64::DecodeError),
	/// Payload segment does not decode to a JSON object.
	#[error("Token payload is not a JSON object.")]
	PayloadJson(#[source] serde_path_to_error::Error<serde_json::Error>),
	/// Token cannot be carried in an HTTP header.
	#[error("Token cannot be encoded as an HTTP header value.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
}
impl TokenError {
	/// Wraps a token source failure.
	pub fn source_failure(src: impl Into<BoxError>) -> Self {
		Self::Source { source: src.into() }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {method} {url}.")]
	Network {
		/// Request method.
		method: Method,
		/// Request URL.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error with the request it belongs to.
	pub fn network(
		request: &HttpRequest,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network {
			method: request.method().clone(),
			url: request.uri().to_string(),
			source: Box::new(src),
		}
	}
}

/// Call context termination reasons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum ContextError {
	/// Call context was canceled by its owner.
	#[error("Call context was canceled.")]
	Canceled,
	/// Call context deadline elapsed.
	#[error("Call context deadline exceeded.")]
	DeadlineExceeded,
}
