//! Controllers for [`Profile`]s

use axum::Json;
use axum::extract::{Path, State};
use axum::response::NoContent;
use profile::Profile;

use crate::schemas::JsonBody;
use crate::schemas::profile::UpdateProfileRequest;
use crate::session::Session;
use crate::{DbPool, Error, RedisConn};

#[instrument(skip(pool))]
pub(crate) async fn get_all_profiles(
	State(pool): State<DbPool>,
) -> Result<Json<Vec<Profile>>, Error> {
	let conn = pool.get().await?;
	let profiles = Profile::get_all(&conn).await?;

	Ok(Json(profiles))
}

#[instrument(skip(pool))]
pub(crate) async fn get_current_profile(
	State(pool): State<DbPool>,
	session: Session,
) -> Result<Json<Profile>, Error> {
	let conn = pool.get().await?;
	let profile = Profile::get(session.data.profile_id, &conn).await?;

	Ok(Json(profile))
}

#[instrument(skip_all, fields(profile_id = profile_id))]
pub(crate) async fn update_profile(
	State(pool): State<DbPool>,
	State(mut r_conn): State<RedisConn>,
	session: Session,
	Path(profile_id): Path<i32>,
	JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Profile>, Error> {
	if !session.may_manage(profile_id) {
		return Err(Error::Forbidden);
	}

	let changes = request.into_profile_update(&session)?;

	let conn = pool.get().await?;
	let profile = Profile::get(profile_id, &conn).await?;
	let profile = profile.update(changes, &conn).await?;

	if !profile.is_active {
		Session::revoke_all(profile.id, &mut r_conn).await?;
	}

	info!(
		"profile {} updated by profile {}",
		profile.id, session.data.profile_id
	);

	Ok(Json(profile))
}

#[instrument(skip(pool, r_conn))]
pub(crate) async fn delete_profile(
	State(pool): State<DbPool>,
	State(mut r_conn): State<RedisConn>,
	session: Session,
	Path(profile_id): Path<i32>,
) -> Result<NoContent, Error> {
	if !session.may_manage(profile_id) {
		return Err(Error::Forbidden);
	}

	let conn = pool.get().await?;
	Profile::delete_by_id(profile_id, &conn).await?;

	Session::revoke_all(profile_id, &mut r_conn).await?;

	info!(
		"profile {} deleted by profile {}",
		profile_id, session.data.profile_id
	);

	Ok(NoContent)
}
