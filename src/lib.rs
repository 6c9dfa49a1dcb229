//! Bearer-authenticated HTTP client that keeps concurrent callers oblivious to credential
//! expiry: one refresh per burst of authorization failures, one replay per failed call, and
//! one redirect to the login surface when the session cannot be recovered.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod classify;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod credential;
pub mod decorate;
pub mod error;
pub mod http;
pub mod obs;
pub mod request;
pub mod retry;
pub mod session;
pub mod source;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::AuthClient,
		config::ClientConfig,
		session::{Navigator, RecordingNavigator},
	};

	/// Builds a validated configuration rooted at `base_url` with the default endpoint layout.
	pub fn test_config(base_url: &str) -> ClientConfig {
		let base = Url::parse(base_url).expect("Test base URL should parse successfully.");

		ClientConfig::builder(base).build().expect("Default test configuration should be valid.")
	}

	/// Constructs an [`AuthClient`] backed by the HTTP credential source plus a navigator that
	/// records every redirect for later inspection.
	pub fn build_test_client(config: ClientConfig) -> (AuthClient, Arc<RecordingNavigator>) {
		let navigator = Arc::new(RecordingNavigator::default());
		let dyn_navigator: Arc<dyn Navigator> = navigator.clone();
		let client = AuthClient::new(config, dyn_navigator)
			.expect("Reqwest client should build for tests.");

		(client, navigator)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeSet, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{
		Client as ReqwestClient, Error as ReqwestError, Method, Response, StatusCode,
		header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue},
	};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
