//! Bookings of professionals and the scheduling conflict checks guarding them

#[macro_use]
extern crate tracing;

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::{BookingError, DbConn, Error};
use db::{ProfileKind, booking, profile};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

mod interval;

pub use interval::{Interval, find_conflict, parse_date, parse_time};

/// A scheduled service of a professional
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct Booking {
	pub id:               i32,
	pub professional_id:  i32,
	pub description:      String,
	pub duration_minutes: i32,
	pub price:            BigDecimal,
	pub date:             NaiveDate,
	pub start_time:       NaiveTime,
	pub created_at:       NaiveDateTime,
	pub updated_at:       NaiveDateTime,
}

/// Optional filters when listing [`Booking`]s
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
pub struct BookingFilter {
	pub professional_id: Option<i32>,
	pub date:            Option<NaiveDate>,
}

impl Booking {
	/// The interval of time this [`Booking`] occupies
	///
	/// # Errors
	/// Errors if the stored duration is not positive
	pub fn interval(&self) -> Result<Interval, Error> {
		Interval::new(self.date, self.start_time, self.duration_minutes)
	}

	/// Get a [`Booking`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking
					.find(b_id)
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| Error::NotFound(format!("booking {b_id}")))?;

		Ok(booking)
	}

	/// Get all [`Booking`]s matching a filter, ordered by date and start time
	#[instrument(skip(conn))]
	pub async fn get_all(
		filter: BookingFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				let mut query = booking.into_boxed();

				if let Some(p_id) = filter.professional_id {
					query = query.filter(professional_id.eq(p_id));
				}

				if let Some(d) = filter.date {
					query = query.filter(date.eq(d));
				}

				query
					.order((date, start_time, id))
					.select(Self::as_select())
					.load(conn)
			})
			.await??;

		Ok(bookings)
	}

	/// Overwrite the [`Booking`] with id `b_id` if the new slot is free
	///
	/// The booking itself is excluded from the conflict set, so saving it
	/// unchanged always succeeds
	#[instrument(skip(conn))]
	pub async fn check_and_update(
		b_id: i32,
		changes: NewBooking,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let candidate = changes.interval()?;

		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					use self::booking::dsl::*;

					let target = booking
						.find(b_id)
						.select(id)
						.for_update()
						.get_result::<i32>(conn)
						.optional()?;

					if target.is_none() {
						return Err(Error::NotFound(format!("booking {b_id}")));
					}

					lock_professional(changes.professional_id, conn)?;

					let existing = booking
						.filter(professional_id.eq(changes.professional_id))
						.filter(date.eq(changes.date))
						.filter(id.ne(b_id))
						.select(Self::as_select())
						.load(conn)?;

					check_conflicts(&candidate, &existing)?;

					diesel::update(booking.find(b_id))
						.set(&changes)
						.returning(Self::as_returning())
						.get_result(conn)
						.map_err(Into::into)
				})
			})
			.await??;

		info!("updated booking {booking:?}");

		Ok(booking)
	}
}

#[derive(AsChangeset, Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct NewBooking {
	pub professional_id:  i32,
	pub description:      String,
	pub duration_minutes: i32,
	pub price:            BigDecimal,
	pub date:             NaiveDate,
	pub start_time:       NaiveTime,
}

impl NewBooking {
	/// The interval of time this [`NewBooking`] would occupy
	///
	/// # Errors
	/// Errors if the duration is not positive
	pub fn interval(&self) -> Result<Interval, Error> {
		Interval::new(self.date, self.start_time, self.duration_minutes)
	}

	/// Insert this [`NewBooking`] if its slot is free
	///
	/// The check and the insert share one transaction holding a lock on the
	/// professional, so concurrent requests for the same professional are
	/// checked one after the other
	#[instrument(skip(conn))]
	pub async fn check_and_insert(self, conn: &DbConn) -> Result<Booking, Error> {
		let candidate = self.interval()?;

		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					use self::booking::dsl::*;

					lock_professional(self.professional_id, conn)?;

					let existing = booking
						.filter(professional_id.eq(self.professional_id))
						.filter(date.eq(self.date))
						.select(Booking::as_select())
						.load(conn)?;

					check_conflicts(&candidate, &existing)?;

					diesel::insert_into(booking)
						.values(&self)
						.returning(Booking::as_returning())
						.get_result(conn)
						.map_err(Into::into)
				})
			})
			.await??;

		info!("created booking {booking:?}");

		Ok(booking)
	}
}

/// Lock the profile row of a professional for the rest of the transaction
///
/// Fails if the profile does not exist or is not a professional
fn lock_professional(p_id: i32, conn: &mut PgConnection) -> Result<(), Error> {
	let kind = profile::table
		.find(p_id)
		.select(profile::kind)
		.for_update()
		.get_result::<ProfileKind>(conn)
		.optional()?;

	match kind {
		Some(ProfileKind::Professional) => Ok(()),
		_ => Err(BookingError::NotAProfessional(p_id).into()),
	}
}

/// Reject `candidate` if it overlaps any of `existing`
fn check_conflicts(
	candidate: &Interval,
	existing: &[Booking],
) -> Result<(), Error> {
	let intervals = existing
		.iter()
		.map(|b| b.interval().map(|i| (b.id, i)))
		.collect::<Result<Vec<_>, _>>()?;

	if let Some(conflict) = find_conflict(candidate, intervals) {
		debug!("slot {candidate:?} conflicts with booking {conflict}");

		return Err(BookingError::Conflict(Some(conflict)).into());
	}

	Ok(())
}
