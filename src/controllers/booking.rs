//! Controllers for [`Booking`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use booking::{Booking, BookingFilter};

use crate::schemas::JsonBody;
use crate::schemas::booking::{BookingRequest, BookingResponse};
use crate::session::Session;
use crate::{DbPool, Error};

#[instrument(skip(pool))]
pub(crate) async fn create_booking(
	State(pool): State<DbPool>,
	session: Session,
	JsonBody(request): JsonBody<BookingRequest>,
) -> Result<Json<BookingResponse>, Error> {
	let new_booking = request.into_new_booking()?;

	let conn = pool.get().await?;
	let booking = new_booking.check_and_insert(&conn).await?;

	info!(
		"profile {} booked {} for professional {}",
		session.data.profile_id, booking.id, booking.professional_id
	);

	Ok(Json(booking.into()))
}

#[instrument(skip(pool))]
pub(crate) async fn get_bookings(
	State(pool): State<DbPool>,
	Query(filter): Query<BookingFilter>,
) -> Result<Json<Vec<BookingResponse>>, Error> {
	let conn = pool.get().await?;
	let bookings = Booking::get_all(filter, &conn).await?;

	Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

#[instrument(skip(pool))]
pub(crate) async fn get_booking(
	State(pool): State<DbPool>,
	Path(booking_id): Path<i32>,
) -> Result<Json<BookingResponse>, Error> {
	let conn = pool.get().await?;
	let booking = Booking::get_by_id(booking_id, &conn).await?;

	Ok(Json(booking.into()))
}

#[instrument(skip(pool))]
pub(crate) async fn update_booking(
	State(pool): State<DbPool>,
	session: Session,
	Path(booking_id): Path<i32>,
	JsonBody(request): JsonBody<BookingRequest>,
) -> Result<Json<BookingResponse>, Error> {
	let changes = request.into_new_booking()?;

	let conn = pool.get().await?;
	let booking = Booking::check_and_update(booking_id, changes, &conn).await?;

	info!(
		"profile {} moved booking {} to {} {}",
		session.data.profile_id, booking.id, booking.date, booking.start_time
	);

	Ok(Json(booking.into()))
}
