use std::borrow::Cow;
use std::sync::LazyLock;

use common::Error;
use db::ProfileKind;
use profile::{NewProfile, Profile};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use validator_derive::Validate;

use crate::schemas::{is_present, missing_fields};

static SYMBOL_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"[!@#$%¨&*(),.?":<>{}|]"#).unwrap());
static UPPERCASE_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[A-Z]").unwrap());
static DIGIT_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\d").unwrap());

fn password_error(code: &'static str, message: &'static str) -> ValidationError {
	ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Check a password against the password rules
///
/// # Errors
/// Errors with the first rule the password breaks
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
	if password.chars().count() < 8 {
		return Err(password_error(
			"password-length",
			"password must be at least 8 characters long",
		));
	}

	if !SYMBOL_REGEX.is_match(password) {
		return Err(password_error(
			"password-symbol",
			"password must contain at least one special symbol",
		));
	}

	if !UPPERCASE_REGEX.is_match(password) {
		return Err(password_error(
			"password-uppercase",
			"password must contain at least one uppercase letter",
		));
	}

	if DIGIT_REGEX.find_iter(password).count() < 2 {
		return Err(password_error(
			"password-digits",
			"password must contain at least two digits",
		));
	}

	Ok(())
}

/// Parse a profile kind, case insensitive
///
/// # Errors
/// Errors if the kind is not one of the known kinds
pub fn parse_kind(kind: &str) -> Result<ProfileKind, Error> {
	match kind.trim().to_lowercase().as_str() {
		"user" => Ok(ProfileKind::User),
		"professional" => Ok(ProfileKind::Professional),
		"admin" => Ok(ProfileKind::Admin),
		_ => {
			Err(Error::ValidationError(format!(
				"kind must be one of: {}",
				ProfileKind::get_variants().join(", ")
			)))
		},
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct RegisterRequest {
	#[validate(length(
		min = 2,
		max = 64,
		message = "name must be between 2 and 64 characters long",
		code = "name-length"
	))]
	pub name:     Option<String>,
	#[validate(email(message = "invalid email", code = "email"))]
	pub email:    Option<String>,
	#[validate(length(
		min = 6,
		max = 32,
		message = "phone must be between 6 and 32 characters long",
		code = "phone-length"
	))]
	pub phone:    Option<String>,
	#[validate(custom(function = "validate_password"))]
	pub password: Option<String>,
	pub category: Option<String>,
	pub kind:     Option<String>,
}

impl RegisterRequest {
	/// Check this request and turn it into a [`NewProfile`]
	///
	/// # Errors
	/// Errors if a field is missing or invalid, or if an admin profile is
	/// requested
	pub fn into_new_profile(self) -> Result<NewProfile, Error> {
		missing_fields(&[
			("name", is_present(self.name.as_ref())),
			("email", is_present(self.email.as_ref())),
			("phone", is_present(self.phone.as_ref())),
			("password", is_present(self.password.as_ref())),
		])?;

		self.validate()?;

		let kind = match self.kind.as_deref() {
			Some(k) => parse_kind(k)?,
			None => ProfileKind::default(),
		};

		if kind == ProfileKind::Admin {
			return Err(Error::Forbidden);
		}

		let (Some(name), Some(email), Some(phone), Some(password)) =
			(self.name, self.email, self.phone, self.password)
		else {
			return Err(Error::Infallible(
				"profile field vanished after presence check".to_string(),
			));
		};

		Ok(NewProfile {
			name,
			email: email.trim().to_lowercase(),
			phone,
			password,
			category: self.category,
			kind,
		})
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LoginRequest {
	pub email:    Option<String>,
	pub password: Option<String>,
}

impl LoginRequest {
	/// Get the email and password of this request
	///
	/// # Errors
	/// Errors if either is missing
	pub fn credentials(self) -> Result<(String, String), Error> {
		match (self.email, self.password) {
			(Some(email), Some(password))
				if !email.trim().is_empty() && !password.is_empty() =>
			{
				Ok((email.trim().to_lowercase(), password))
			},
			_ => {
				Err(Error::MissingRequestData(
					"email and password are required".to_string(),
				))
			},
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LoginResponse {
	pub profile: Profile,
	pub token:   String,
}
