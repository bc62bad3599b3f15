//! Time intervals occupied by bookings and the parsing of their bounds

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use common::Error;

/// Accepted time-of-day formats, most specific first
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Accepted calendar date format
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A half-open interval `[start, end)` on the timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
	pub start: NaiveDateTime,
	pub end:   NaiveDateTime,
}

impl Interval {
	/// Build the interval covered by an appointment starting at `start_time`
	/// on `date` and lasting `duration_minutes`
	///
	/// # Errors
	/// Errors if the duration is not strictly positive
	pub fn new(
		date: NaiveDate,
		start_time: NaiveTime,
		duration_minutes: i32,
	) -> Result<Self, Error> {
		if duration_minutes <= 0 {
			return Err(Error::ValidationError(format!(
				"duration must be a positive number of minutes, got \
				 {duration_minutes}"
			)));
		}

		let start = date.and_time(start_time);
		let end = start + TimeDelta::minutes(i64::from(duration_minutes));

		Ok(Self { start, end })
	}

	/// Check whether two intervals strictly overlap
	///
	/// Intervals that only touch (one ends where the other starts) do not
	/// overlap
	#[must_use]
	pub fn overlaps(&self, other: &Self) -> bool {
		self.start < other.end && self.end > other.start
	}
}

/// Find the first of `existing` that overlaps `candidate`, returning its key
pub fn find_conflict<K, I>(candidate: &Interval, existing: I) -> Option<K>
where
	I: IntoIterator<Item = (K, Interval)>,
{
	existing
		.into_iter()
		.find(|(_, interval)| candidate.overlaps(interval))
		.map(|(key, _)| key)
}

/// Parse a calendar date in `YYYY-MM-DD` form
///
/// # Errors
/// Errors if the value is not a valid date
pub fn parse_date(value: &str) -> Result<NaiveDate, Error> {
	NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
		Error::ValidationError(format!("invalid date '{value}'"))
	})
}

/// Parse a time of day, with or without a seconds component
///
/// # Errors
/// Errors if the value matches none of the accepted formats
pub fn parse_time(value: &str) -> Result<NaiveTime, Error> {
	let value = value.trim();

	TIME_FORMATS
		.iter()
		.find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
		.ok_or_else(|| Error::ValidationError(format!("invalid time '{value}'")))
}
