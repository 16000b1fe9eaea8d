//! Secure token secret wrapper that redacts sensitive material.

// crates.io
use http::header::{HeaderValue, InvalidHeaderValue};
// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner credential. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns `true` if the secret holds no characters.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Renders `"{scheme} {secret}"` (or the bare secret when `scheme` is empty) as a header value
	/// flagged sensitive, so HTTP stacks skip it when printing headers.
	pub fn header_value(&self, scheme: &str) -> Result<HeaderValue, InvalidHeaderValue> {
		let mut value = if scheme.is_empty() {
			HeaderValue::from_str(&self.0)?
		} else {
			HeaderValue::from_str(&format!("{scheme} {}", self.0))?
		};

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("api-key-123");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "api-key-123");
	}

	#[test]
	fn header_value_prefixes_scheme_and_is_sensitive() {
		let secret = TokenSecret::new("abc.def.ghi");
		let with_scheme = secret.header_value("Token").expect("Header value should be valid.");
		let bare = secret.header_value("").expect("Header value should be valid.");

		assert_eq!(with_scheme, "Token abc.def.ghi");
		assert!(with_scheme.is_sensitive());
		assert_eq!(bare, "abc.def.ghi");
	}

	#[test]
	fn header_value_rejects_control_characters() {
		assert!(TokenSecret::new("line\nbreak").header_value("Bearer").is_err());
	}
}
