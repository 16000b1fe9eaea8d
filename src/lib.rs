//! Authenticated JSON API client pipeline: build requests against a base URL, inject refreshable
//! tokens without touching caller state, and surface transport and HTTP-status failures through
//! one error type.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod context;
pub mod error;
pub mod http;
pub mod obs;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{Token, TokenFuture, TokenSource},
		http::{HttpTransport, TransportFuture},
	};

	/// Token that stamps a fixed `authorization` header and reports a fixed validity.
	#[derive(Debug)]
	pub struct FixedToken {
		/// Header value written by [`Token::set_authorization`].
		pub value: &'static str,
		/// Value reported by [`Token::valid`].
		pub valid: bool,
	}
	impl Token for FixedToken {
		fn valid(&self) -> bool {
			self.valid
		}

		fn set_authorization(&self, request: &mut HttpRequest) {
			request.headers_mut().insert(
				::http::header::AUTHORIZATION,
				::http::HeaderValue::from_static(self.value),
			);
		}
	}

	/// Source that hands out a new [`FixedToken`] per call, cycling through its values.
	#[derive(Debug)]
	pub struct SequenceSource {
		values: Vec<&'static str>,
		/// Number of tokens produced so far.
		pub calls: Mutex<usize>,
	}
	impl SequenceSource {
		/// Creates a source cycling through `values`.
		///
		/// # Panics
		///
		/// Panics when `values` is empty.
		pub fn new(values: impl IntoIterator<Item = &'static str>) -> Self {
			let values = values.into_iter().collect::<Vec<_>>();

			assert!(!values.is_empty(), "SequenceSource needs at least one value.");

			Self { values, calls: Mutex::new(0) }
		}
	}
	impl TokenSource for SequenceSource {
		fn token(&self) -> TokenFuture<'_> {
			let value = {
				let mut calls = self.calls.lock();
				let value = self.values[*calls % self.values.len()];

				*calls += 1;

				value
			};

			Box::pin(async move { Ok(Arc::new(FixedToken { value, valid: true }) as Arc<dyn Token>) })
		}
	}

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_transport() -> crate::http::ReqwestTransport {
		crate::http::ReqwestTransport::from_builder(
			ReqwestClient::builder()
				.danger_accept_invalid_certs(true)
				.danger_accept_invalid_hostnames(true),
		)
		.expect("Failed to build insecure Reqwest transport for tests.")
	}

	/// Transport that records every request it sees and answers with a canned response, or
	/// echoes the request body back when no canned body is configured.
	#[derive(Debug, Default)]
	pub struct RecordingTransport {
		/// Status returned for every request.
		pub status: u16,
		/// Canned body; `None` echoes the request body.
		pub body: Option<Vec<u8>>,
		/// Requests observed, in dispatch order.
		pub seen: Mutex<Vec<HttpRequest>>,
	}
	impl RecordingTransport {
		/// Answers every request with `status` and `body`.
		pub fn canned(status: u16, body: impl Into<Vec<u8>>) -> Arc<Self> {
			Arc::new(Self { status, body: Some(body.into()), seen: Default::default() })
		}

		/// Answers every request with `200` and the request body.
		pub fn echo() -> Arc<Self> {
			Arc::new(Self { status: 200, body: None, seen: Default::default() })
		}

		/// Snapshot of the recorded requests.
		pub fn requests(&self) -> Vec<HttpRequest> {
			self.seen.lock().clone()
		}
	}
	impl HttpTransport for RecordingTransport {
		fn round_trip<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
			Box::pin(async move {
				self.seen.lock().push(crate::transport::clone_request(request));

				let body = self.body.clone().unwrap_or_else(|| request.body().clone());
				let response = ::http::Response::builder()
					.status(self.status)
					.header(::http::header::CONTENT_TYPE, "application/json")
					.body(body)
					.map_err(crate::error::ConfigError::from)?;

				Ok(response)
			})
		}
	}

}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use ::http::{Method, StatusCode};
	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::{
		error::{Error, Result},
		http::{HttpRequest, HttpResponse},
	};
}

pub use ::http::{Method, StatusCode};
pub use client::{Client, Response, Target};
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
