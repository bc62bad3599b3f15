#[macro_use]
extern crate tracing;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use chrono::{NaiveDateTime, Utc};
use common::{DbConn, Error};
use db::{ProfileKind, profile};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = profile)]
#[diesel(check_for_backend(Pg))]
pub struct Profile {
	pub id:            i32,
	pub name:          String,
	pub email:         String,
	pub phone:         String,
	#[serde(skip)]
	pub password_hash: String,
	pub category:      Option<String>,
	pub kind:          ProfileKind,
	pub is_active:     bool,
	pub created_at:    NaiveDateTime,
	pub updated_at:    NaiveDateTime,
	pub last_login_at: Option<NaiveDateTime>,
}

impl Profile {
	/// Get a [`Profile`] given its id
	#[instrument(skip(conn))]
	pub async fn get(p_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				profile
					.find(p_id)
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| Error::NotFound(format!("profile {p_id}")))?;

		Ok(profile)
	}

	/// Get a list of all [`Profile`]s
	#[instrument(skip(conn))]
	pub async fn get_all(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let profiles = conn
			.interact(|conn| {
				use self::profile::dsl::*;

				profile.order(id).select(Self::as_select()).load(conn)
			})
			.await??;

		Ok(profiles)
	}

	/// Get a [`Profile`] given its email, if any
	#[instrument(skip(conn))]
	pub async fn get_by_email(
		query_email: String,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				profile
					.filter(email.eq(query_email))
					.select(Self::as_select())
					.first(conn)
					.optional()
			})
			.await??;

		Ok(profile)
	}

	/// Apply a partial update to this [`Profile`]
	///
	/// The resulting kind and category must still satisfy the category rule
	/// of [`resolve_category`]
	#[instrument(skip_all, fields(profile_id = self.id))]
	pub async fn update(
		self,
		changes: ProfileUpdate,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let self_id = self.id;

		let new_kind = changes.kind.unwrap_or(self.kind);
		let new_category = resolve_category(
			new_kind,
			changes.category.or(self.category),
		)?;

		let password_hash = match changes.password {
			Some(ref password) => Some(Self::hash_password(password)?),
			None => None,
		};

		let changeset = ProfileChangeset {
			name: changes.name,
			email: changes.email,
			phone: changes.phone,
			password_hash,
			category: Some(new_category),
			kind: Some(new_kind),
			is_active: changes.is_active,
		};

		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				diesel::update(profile.find(self_id))
					.set(changeset)
					.returning(Self::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("updated profile {}", profile.id);

		Ok(profile)
	}

	/// Delete a [`Profile`] given its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(p_id: i32, conn: &DbConn) -> Result<(), Error> {
		let deleted = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				diesel::delete(profile.find(p_id)).execute(conn)
			})
			.await??;

		if deleted == 0 {
			return Err(Error::NotFound(format!("profile {p_id}")));
		}

		info!("deleted profile with id {p_id}");

		Ok(())
	}

	/// Mark a [`Profile`] as inactive, blocking further logins
	#[instrument(skip(conn))]
	pub async fn disable(p_id: i32, conn: &DbConn) -> Result<(), Error> {
		conn.interact(move |conn| {
			use self::profile::dsl::*;

			diesel::update(profile.find(p_id))
				.set(is_active.eq(false))
				.execute(conn)
		})
		.await??;

		warn!("disabled profile {p_id}");

		Ok(())
	}

	/// Set the `last_login_at` field to the current datetime for the given
	/// [`Profile`]
	#[instrument(skip_all, fields(profile_id = self.id))]
	pub async fn update_last_login(self, conn: &DbConn) -> Result<Self, Error> {
		let self_id = self.id;
		let now = Utc::now().naive_utc();

		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				diesel::update(profile.find(self_id))
					.set(last_login_at.eq(now))
					.returning(Self::as_returning())
					.get_result(conn)
			})
			.await??;

		Ok(profile)
	}

	/// Hash a password using Argon2
	pub fn hash_password(password: &str) -> Result<String, Error> {
		let salt = SaltString::generate(&mut OsRng);
		let hashed_password = Argon2::default()
			.hash_password(password.as_bytes(), &salt)?
			.to_string();

		Ok(hashed_password)
	}
}

/// Check the category rule for a profile kind
///
/// Professionals must have a non-empty category, every other kind has none
///
/// # Errors
/// Errors if a professional has no category
pub fn resolve_category(
	kind: ProfileKind,
	category: Option<String>,
) -> Result<Option<String>, Error> {
	if !kind.requires_category() {
		return Ok(None);
	}

	match category {
		Some(c) if !c.trim().is_empty() => Ok(Some(c)),
		_ => {
			Err(Error::ValidationError(
				"category is required for professionals".to_string(),
			))
		},
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewProfile {
	pub name:     String,
	pub email:    String,
	pub phone:    String,
	pub password: String,
	pub category: Option<String>,
	pub kind:     ProfileKind,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = profile)]
#[diesel(check_for_backend(Pg))]
struct InsertableNewProfile {
	name:          String,
	email:         String,
	phone:         String,
	password_hash: String,
	category:      Option<String>,
	kind:          ProfileKind,
}

impl NewProfile {
	/// Insert this [`NewProfile`], hashing its password
	#[instrument(skip_all)]
	pub async fn insert(self, conn: &DbConn) -> Result<Profile, Error> {
		let category = resolve_category(self.kind, self.category)?;
		let password_hash = Profile::hash_password(&self.password)?;

		let insertable = InsertableNewProfile {
			name: self.name,
			email: self.email,
			phone: self.phone,
			password_hash,
			category,
			kind: self.kind,
		};

		let profile = conn
			.interact(|conn| {
				use self::profile::dsl::*;

				diesel::insert_into(profile)
					.values(insertable)
					.returning(Profile::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created profile {} ({:?})", profile.id, profile.kind);

		Ok(profile)
	}
}

/// A partial update of a [`Profile`], absent fields are left untouched
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ProfileUpdate {
	pub name:      Option<String>,
	pub email:     Option<String>,
	pub phone:     Option<String>,
	pub password:  Option<String>,
	pub category:  Option<String>,
	pub kind:      Option<ProfileKind>,
	pub is_active: Option<bool>,
}

#[derive(AsChangeset, Clone, Debug)]
#[diesel(table_name = profile)]
#[diesel(check_for_backend(Pg))]
struct ProfileChangeset {
	name:          Option<String>,
	email:         Option<String>,
	phone:         Option<String>,
	password_hash: Option<String>,
	category:      Option<Option<String>>,
	kind:          Option<ProfileKind>,
	is_active:     Option<bool>,
}
