//! Compact (JWT-style) token whose freshness is read from its `exp` claim.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use http::header::{AUTHORIZATION, HeaderValue};
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	error::TokenError,
};

/// Token expiring within this window is reported invalid so sources refresh ahead of time.
pub const EXPIRY_SAFETY_MARGIN: Duration = Duration::seconds(10);

/// Authorization scheme used by [`JwtToken::new`].
pub const DEFAULT_SCHEME: &str = "Token";

/// Compact `header.payload.signature` token.
///
/// The expiry is decoded once at construction. The signature is never verified; this type only
/// needs the claim to decide when a refresh is due. A token whose payload carries no numeric
/// `exp` claim is never valid.
#[derive(Clone)]
pub struct JwtToken {
	token: TokenSecret,
	authorization: HeaderValue,
	expires_at: Option<OffsetDateTime>,
}
impl JwtToken {
	/// Parses `token`, stamping requests with `Authorization: Token <token>`.
	pub fn new(token: impl Into<String>) -> Result<Self, TokenError> {
		Self::with_scheme(token, DEFAULT_SCHEME)
	}

	/// Parses `token`, stamping requests with `Authorization: <scheme> <token>`.
	pub fn with_scheme(token: impl Into<String>, scheme: &str) -> Result<Self, TokenError> {
		let token = TokenSecret::new(token);
		let expires_at = decode_expiry(token.expose())?;
		let authorization = token.header_value(scheme)?;

		Ok(Self { token, authorization, expires_at })
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		self.token.expose()
	}

	/// Expiry instant recovered from the `exp` claim, if any.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Evaluates validity against the provided instant.
	pub fn valid_at(&self, instant: OffsetDateTime) -> bool {
		if self.token.is_empty() {
			return false;
		}

		self.expires_at
			.and_then(|expires_at| expires_at.checked_sub(EXPIRY_SAFETY_MARGIN))
			.is_some_and(|cutoff| instant < cutoff)
	}
}
impl Token for JwtToken {
	fn valid(&self) -> bool {
		self.valid_at(OffsetDateTime::now_utc())
	}

	fn set_authorization(&self, request: &mut HttpRequest) {
		request.headers_mut().insert(AUTHORIZATION, self.authorization.clone());
	}
}
impl Debug for JwtToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtToken")
			.field("token", &self.token)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

fn decode_expiry(token: &str) -> Result<Option<OffsetDateTime>, TokenError> {
	let segments = token.split('.').collect::<Vec<_>>();
	let [_, payload, _] = segments.as_slice() else {
		return Err(TokenError::Malformed { segments: segments.len() });
	};
	let mut padded = (*payload).to_owned();

	while padded.len() % 4 != 0 {
		padded.push('=');
	}

	let bytes = URL_SAFE.decode(padded)?;
	let mut de = serde_json::Deserializer::from_slice(&bytes);
	let claims: Map<String, Value> =
		serde_path_to_error::deserialize(&mut de).map_err(TokenError::PayloadJson)?;

	// Non-numeric or out-of-range `exp` leaves the expiry undiscoverable.
	Ok(claims
		.get("exp")
		.and_then(Value::as_f64)
		.and_then(|exp| OffsetDateTime::from_unix_timestamp(exp.trunc() as i64).ok()))
}
