//! Non-expiring credentials such as API keys.

// crates.io
use http::{
	Uri,
	header::{HeaderName, HeaderValue},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	error::TokenError,
};

/// Where a [`StaticToken`] is written on the outgoing request.
#[derive(Clone, Debug)]
pub enum Placement {
	/// Header carrying the pre-rendered credential.
	Header {
		/// Header name, e.g. `authorization` or `x-api-key`.
		name: HeaderName,
		/// Rendered (and sensitive-flagged) header value.
		value: HeaderValue,
	},
	/// Query parameter carrying the credential.
	Query {
		/// Parameter name, e.g. `api_key`.
		name: String,
	},
}

/// Fixed credential that never expires; valid while non-empty.
#[derive(Clone, Debug)]
pub struct StaticToken {
	secret: TokenSecret,
	placement: Placement,
}
impl StaticToken {
	/// Stamps `authorization: <scheme> <secret>`.
	pub fn bearer(secret: impl Into<String>, scheme: &str) -> Result<Self, TokenError> {
		Self::header(http::header::AUTHORIZATION, secret, scheme)
	}

	/// Stamps `<name>: <scheme> <secret>`; an empty scheme writes the bare secret.
	pub fn header(
		name: HeaderName,
		secret: impl Into<String>,
		scheme: &str,
	) -> Result<Self, TokenError> {
		let secret = TokenSecret::new(secret);
		let value = secret.header_value(scheme)?;

		Ok(Self { secret, placement: Placement::Header { name, value } })
	}

	/// Stamps `?<name>=<secret>` onto the request URI, replacing any previous value.
	pub fn query(name: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { secret: TokenSecret::new(secret), placement: Placement::Query { name: name.into() } }
	}

	/// Placement used when stamping.
	pub fn placement(&self) -> &Placement {
		&self.placement
	}

	fn stamp_query(&self, name: &str, request: &mut HttpRequest) {
		let uri = request.uri();
		let retained = uri
			.query()
			.map(|query| {
				form_urlencoded::parse(query.as_bytes())
					.filter(|(key, _)| key != name)
					.map(|(key, value)| (key.into_owned(), value.into_owned()))
					.collect::<Vec<_>>()
			})
			.unwrap_or_default();
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		serializer.extend_pairs(retained);
		serializer.append_pair(name, self.secret.expose());

		let path_and_query = format!("{}?{}", uri.path(), serializer.finish());
		let mut parts = uri.clone().into_parts();

		// Serializer output is always a valid query; the fallback keeps the URI untouched.
		if let Ok(path_and_query) = path_and_query.parse() {
			parts.path_and_query = Some(path_and_query);

			if let Ok(stamped) = Uri::from_parts(parts) {
				*request.uri_mut() = stamped;
			}
		}
	}
}
impl Token for StaticToken {
	fn valid(&self) -> bool {
		!self.secret.is_empty()
	}

	fn set_authorization(&self, request: &mut HttpRequest) {
		match &self.placement {
			Placement::Header { name, value } => {
				request.headers_mut().insert(name.clone(), value.clone());
			},
			Placement::Query { name } => self.stamp_query(name, request),
		}
	}
}
