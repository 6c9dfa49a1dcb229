//! Redacted bearer credential wrapper.

// self
use crate::_prelude::*;

/// Opaque bearer token with an externally managed expiry.
///
/// The client never parses or validates the token; it only attaches it and, after an
/// authorization failure, asks for a replacement.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds the `Authorization: Bearer <token>` header value, marked sensitive.
	pub fn bearer_header(&self) -> Result<HeaderValue, InvalidCredential> {
		let mut value =
			HeaderValue::from_str(&format!("Bearer {}", self.0)).map_err(|_| InvalidCredential)?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Raised when a token contains bytes that cannot travel in an HTTP header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Credential contains characters that are not valid in an Authorization header.")]
pub struct InvalidCredential;

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credential_formatters_redact() {
		let credential = Credential::new("super-secret");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(format!("{credential}"), "<redacted>");
	}

	#[test]
	fn bearer_header_is_sensitive() {
		let header = Credential::new("abc.def")
			.bearer_header()
			.expect("Plain ASCII tokens should encode into a header.");

		assert!(header.is_sensitive());
		assert_eq!(header.to_str().expect("Header should be visible ASCII."), "Bearer abc.def");
	}

	#[test]
	fn bearer_header_rejects_control_characters() {
		assert_eq!(Credential::new("line\nbreak").bearer_header(), Err(InvalidCredential));
	}
}
