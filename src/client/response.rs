//! Response envelope returned by [`Client::execute`](crate::Client::execute).

// crates.io
use http::HeaderMap;
// self
use crate::_prelude::*;

/// Status and metadata of an executed call.
///
/// On success the body has already been written into the caller's target and
/// `error_message` is `None`. For statuses in `400..=599` the body text is captured in
/// `error_message` and the envelope itself is returned as [`Error::Api`].
#[derive(Clone, Debug)]
pub struct Response {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Method of the request that produced this response.
	pub method: Method,
	/// URL of the request that produced this response.
	pub url: String,
	/// Response body text for error statuses.
	pub error_message: Option<String>,
}
impl Response {
	pub(crate) fn new(request: &HttpRequest, response: &HttpResponse) -> Self {
		Self {
			status: response.status(),
			headers: response.headers().clone(),
			method: request.method().clone(),
			url: request.uri().to_string(),
			error_message: None,
		}
	}

	/// Returns `true` when the status falls inside `400..=599`.
	pub fn has_error(&self) -> bool {
		is_error_status(self.status)
	}
}
impl Display for Response {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(
			f,
			"{} {}: {} {}",
			self.method,
			self.url,
			self.status.as_u16(),
			self.error_message.as_deref().unwrap_or_default()
		)
	}
}

pub(crate) fn is_error_status(status: StatusCode) -> bool {
	(400..=599).contains(&status.as_u16())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn error_range_is_inclusive() {
		for (code, expected) in [(399, false), (400, true), (404, true), (599, true), (600, false)] {
			let status = StatusCode::from_u16(code).expect("Status code should be valid.");

			assert_eq!(is_error_status(status), expected, "{code}");
		}
	}

	#[test]
	fn display_names_method_url_status_and_message() {
		let request = http::Request::delete("https://api.example.com/v1/items/7")
			.body(Vec::new())
			.expect("Request should build.");
		let raw = http::Response::builder()
			.status(409)
			.body(Vec::new())
			.expect("Response should build.");
		let mut response = Response::new(&request, &raw);

		response.error_message = Some("conflict".into());

		assert!(response.has_error());
		assert_eq!(response.to_string(), "DELETE https://api.example.com/v1/items/7: 409 conflict");
	}
}
