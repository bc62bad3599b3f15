use axum::extract::FromRequest;
use common::Error;

pub mod auth;
pub mod booking;
pub mod profile;

/// JSON body extractor that reports malformed bodies as validation errors
/// instead of axum's default rejections
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Collect the names of all absent required fields
///
/// Strings consisting only of whitespace count as absent
pub(crate) fn missing_fields(fields: &[(&'static str, bool)]) -> Result<(), Error> {
	let missing = fields
		.iter()
		.filter(|(_, present)| !present)
		.map(|(name, _)| *name)
		.collect::<Vec<&str>>();

	if missing.is_empty() {
		return Ok(());
	}

	Err(Error::MissingRequestData(format!(
		"missing required fields: {}",
		missing.join(", ")
	)))
}

/// Whether an optional string field holds a non-blank value
pub(crate) fn is_present(value: Option<&String>) -> bool {
	value.is_some_and(|v| !v.trim().is_empty())
}
