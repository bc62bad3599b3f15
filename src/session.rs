//! User sessions and failed login bookkeeping, both kept in redis

use axum::RequestPartsExt;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use common::{Error, InternalServerError, RedisConn};
use db::ProfileKind;
use profile::Profile;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

use crate::AppState;

/// A session for any logged in profile
///
/// ```rs
/// pub async fn foo_route(session: Session) -> impl IntoResponse {
///     println!("{:?}", session.data.profile_id);
///
///     ()
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Session {
	pub id:   Uuid,
	pub data: SessionData,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SessionData {
	pub profile_id:       i32,
	pub profile_is_admin: bool,
}

impl FromRequestParts<AppState> for Session {
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		state: &AppState,
	) -> Result<Self, Self::Rejection> {
		let session_id = match parts.extensions.get::<Uuid>() {
			Some(id) => *id,
			None => {
				return Err(InternalServerError::SessionWithoutAuthError.into());
			},
		};

		let State(mut conn) = parts
			.extract_with_state::<State<RedisConn>, AppState>(state)
			.await
			.map_err(|_| Error::InternalServerError)?;

		let session = Self::get(session_id, &mut conn).await?;

		let Some(session) = session else {
			return Err(Error::Infallible(
				"failed to retrieve session despite passing auth middleware"
					.to_string(),
			));
		};

		Ok(session)
	}
}

impl Session {
	fn key(id: Uuid) -> String { format!("session:{id}") }

	fn profile_key(profile_id: i32) -> String {
		format!("profile_sessions:{profile_id}")
	}

	/// Create and store a new [`Session`] for a given [`Profile`]
	#[instrument(skip(profile, conn), fields(profile_id = profile.id))]
	pub async fn create(
		lifetime: Duration,
		profile: &Profile,
		conn: &mut RedisConn,
	) -> Result<Self, Error> {
		let id = Uuid::new_v4();

		let data = SessionData {
			profile_id:       profile.id,
			profile_is_admin: profile.kind == ProfileKind::Admin,
		};

		let session = Self { id, data };

		// Add a buffer of 10 seconds to ensure the cached session doesn't
		// expire before the session cookie does
		let expiry = lifetime.whole_seconds() + 10;

		let data = serde_json::to_string(&data)
			.map_err(InternalServerError::SerdeJsonError)?;

		let profile_key = Self::profile_key(profile.id);

		// The profile index outlives its newest session and may hold ids of
		// sessions that already expired
		let _: () = redis::pipe()
			.atomic()
			.set_ex(Self::key(id), &data, expiry.unsigned_abs())
			.ignore()
			.sadd(&profile_key, id.to_string())
			.ignore()
			.expire(&profile_key, expiry)
			.ignore()
			.query_async(conn)
			.await?;

		debug!("stored session {} in cache for profile {}", id, profile.id);

		Ok(session)
	}

	/// Get a session from the cache
	#[instrument(skip(conn))]
	pub async fn get(
		id: Uuid,
		conn: &mut RedisConn,
	) -> Result<Option<Self>, Error> {
		let data_string: Option<String> = conn.get(Self::key(id)).await?;

		let Some(data_string) = data_string.as_ref() else {
			return Ok(None);
		};

		let data: SessionData = serde_json::from_str(data_string)
			.map_err(InternalServerError::SerdeJsonError)?;

		let session = Self { id, data };

		Ok(Some(session))
	}

	/// Remove a session given its id
	#[instrument(skip(conn))]
	pub async fn delete(id: Uuid, conn: &mut RedisConn) -> Result<(), Error> {
		let _: i32 = conn.del(Self::key(id)).await?;

		Ok(())
	}

	/// Remove every session belonging to a profile, returning how many were
	/// still alive
	#[instrument(skip(conn))]
	pub async fn revoke_all(
		profile_id: i32,
		conn: &mut RedisConn,
	) -> Result<usize, Error> {
		let profile_key = Self::profile_key(profile_id);

		let ids: Vec<String> = conn.smembers(&profile_key).await?;

		let keys: Vec<String> = ids
			.iter()
			.filter_map(|id| Uuid::parse_str(id).ok())
			.map(Self::key)
			.chain(std::iter::once(profile_key))
			.collect();

		let removed: usize = conn.del(keys).await?;

		// The profile index itself is counted when it existed
		let revoked = removed.saturating_sub(usize::from(!ids.is_empty()));

		info!("revoked {revoked} sessions of profile {profile_id}");

		Ok(revoked)
	}

	/// Check if a session with this id exists
	#[instrument(skip(conn))]
	pub async fn exists(id: Uuid, conn: &mut RedisConn) -> Result<bool, Error> {
		let exists: i32 = conn.exists(Self::key(id)).await?;

		Ok(exists == 1)
	}

	/// Whether this session may act on the profile with id `profile_id`
	#[must_use]
	pub fn may_manage(&self, profile_id: i32) -> bool {
		self.data.profile_is_admin || self.data.profile_id == profile_id
	}

	/// Convert this [`Session`] into an access token cookie
	#[must_use]
	pub fn to_access_token_cookie(
		self,
		name: String,
		lifetime: Duration,
		secure: bool,
	) -> Cookie<'static> {
		Cookie::build((name, self.id.to_string()))
			.http_only(true)
			.max_age(lifetime)
			.path("/")
			.same_site(SameSite::Lax)
			.secure(secure)
			.into()
	}
}

/// Failed login counters, keyed by profile id
///
/// Counters live in redis so they survive restarts and are shared between
/// server instances
pub struct LoginAttempts;

impl LoginAttempts {
	fn key(profile_id: i32) -> String { format!("login_attempts:{profile_id}") }

	/// Record a failed login, returning the number of failures so far
	#[instrument(skip(conn))]
	pub async fn record_failure(
		profile_id: i32,
		conn: &mut RedisConn,
	) -> Result<u32, Error> {
		let attempts: u32 = conn.incr(Self::key(profile_id), 1).await?;

		debug!("profile {profile_id} has {attempts} failed login attempts");

		Ok(attempts)
	}

	/// Forget all failed logins of a profile
	#[instrument(skip(conn))]
	pub async fn reset(profile_id: i32, conn: &mut RedisConn) -> Result<(), Error> {
		let _: i32 = conn.del(Self::key(profile_id)).await?;

		Ok(())
	}
}
