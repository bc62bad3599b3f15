use common::Error;
use profile::ProfileUpdate;
use serde::{Deserialize, Serialize};
use validator::Validate;
use validator_derive::Validate;

use crate::schemas::auth::{parse_kind, validate_password};
use crate::session::Session;

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateProfileRequest {
	#[validate(length(
		min = 2,
		max = 64,
		message = "name must be between 2 and 64 characters long",
		code = "name-length"
	))]
	pub name:      Option<String>,
	#[validate(email(message = "invalid email", code = "email"))]
	pub email:     Option<String>,
	#[validate(length(
		min = 6,
		max = 32,
		message = "phone must be between 6 and 32 characters long",
		code = "phone-length"
	))]
	pub phone:     Option<String>,
	#[validate(custom(function = "validate_password"))]
	pub password:  Option<String>,
	pub category:  Option<String>,
	pub kind:      Option<String>,
	pub is_active: Option<bool>,
}

impl UpdateProfileRequest {
	/// Check this request on behalf of `session` and turn it into a
	/// [`ProfileUpdate`]
	///
	/// Only admins may change the kind or active state of a profile
	///
	/// # Errors
	/// Errors if a field is invalid or the session may not make the change
	pub fn into_profile_update(
		self,
		session: &Session,
	) -> Result<ProfileUpdate, Error> {
		self.validate()?;

		if !session.data.profile_is_admin
			&& (self.kind.is_some() || self.is_active.is_some())
		{
			return Err(Error::Forbidden);
		}

		let kind = self.kind.as_deref().map(parse_kind).transpose()?;

		Ok(ProfileUpdate {
			name: self.name,
			email: self.email.map(|e| e.trim().to_lowercase()),
			phone: self.phone,
			password: self.password,
			category: self.category,
			kind,
			is_active: self.is_active,
		})
	}
}
