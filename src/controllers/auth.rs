//! Controllers for authorization

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::NoContent;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Cookie;
use db::ProfileKind;
use profile::Profile;

use crate::schemas::JsonBody;
use crate::schemas::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::session::{LoginAttempts, Session};
use crate::{Config, DbConn, DbPool, Error, LoginError, RedisConn};

#[instrument(skip_all)]
pub(crate) async fn register_profile(
	State(pool): State<DbPool>,
	JsonBody(register_data): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Profile>), Error> {
	let new_profile = register_data.into_new_profile()?;

	let conn = pool.get().await?;
	let profile = new_profile.insert(&conn).await?;

	info!("registered new profile {} ({:?})", profile.id, profile.kind);

	Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(skip_all)]
pub(crate) async fn login_profile(
	State(pool): State<DbPool>,
	State(mut r_conn): State<RedisConn>,
	State(config): State<Config>,
	jar: PrivateCookieJar,
	JsonBody(login_data): JsonBody<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<LoginResponse>), Error> {
	let (email, password) = login_data.credentials()?;

	let conn = pool.get().await?;
	let Some(profile) = Profile::get_by_email(email.clone(), &conn).await?
	else {
		return Err(LoginError::UnknownEmail(email).into());
	};

	if !profile.is_active {
		return Err(LoginError::Inactive.into());
	}

	let password_hash = PasswordHash::new(&profile.password_hash)?;

	match Argon2::default().verify_password(password.as_bytes(), &password_hash)
	{
		Ok(()) => (),
		Err(argon2::password_hash::Error::Password) => {
			let err =
				reject_password(&profile, &config, &conn, &mut r_conn).await?;

			return Err(err.into());
		},
		Err(e) => return Err(e.into()),
	}

	LoginAttempts::reset(profile.id, &mut r_conn).await?;

	let session =
		Session::create(config.access_cookie_lifetime, &profile, &mut r_conn)
			.await?;
	let access_token_cookie = session.to_access_token_cookie(
		config.access_cookie_name,
		config.access_cookie_lifetime,
		config.production,
	);
	let jar = jar.add(access_token_cookie);

	let profile = profile.update_last_login(&conn).await?;

	info!("logged in profile {}", profile.id);

	Ok((jar, Json(LoginResponse { profile, token: session.id.to_string() })))
}

/// Count a failed login against a profile and decide which error to report,
/// disabling the profile and ending its sessions once it runs out of attempts
///
/// Admin profiles are never counted
async fn reject_password(
	profile: &Profile,
	config: &Config,
	conn: &DbConn,
	r_conn: &mut RedisConn,
) -> Result<LoginError, Error> {
	if profile.kind == ProfileKind::Admin {
		return Ok(LoginError::InvalidPassword);
	}

	let attempts = LoginAttempts::record_failure(profile.id, r_conn).await?;

	if attempts < config.max_login_attempts {
		return Ok(LoginError::InvalidPassword);
	}

	Profile::disable(profile.id, conn).await?;
	LoginAttempts::reset(profile.id, r_conn).await?;
	Session::revoke_all(profile.id, r_conn).await?;

	Ok(LoginError::TooManyAttempts)
}

#[instrument(skip_all, fields(profile_id = session.data.profile_id))]
pub(crate) async fn logout_profile(
	State(config): State<Config>,
	State(mut r_conn): State<RedisConn>,
	session: Session,
	jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, NoContent), Error> {
	Session::delete(session.id, &mut r_conn).await?;

	let access_token = Cookie::build(config.access_cookie_name).path("/");
	let jar = jar.remove(access_token);

	info!("logged out profile {}", session.data.profile_id);

	Ok((jar, NoContent))
}
