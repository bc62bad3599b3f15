use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use booking::{Booking, NewBooking, parse_date, parse_time};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use common::Error;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use validator::Validate;
use validator_derive::Validate;

use crate::schemas::{is_present, missing_fields};

/// Prices are stored with two decimal places
const PRICE_SCALE: i64 = 2;

/// Prices must stay below this amount
const PRICE_LIMIT: i64 = 100_000_000;

/// A price as sent by a client, either a JSON number or a string
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
	Number(serde_json::Number),
	Text(String),
}

/// Read a price from its decimal text so JSON numbers keep the digits the
/// client wrote instead of their binary floating point expansion
fn deserialize_price<'de, D>(
	deserializer: D,
) -> Result<Option<BigDecimal>, D::Error>
where
	D: Deserializer<'de>,
{
	let text = match Option::<PriceInput>::deserialize(deserializer)? {
		None => return Ok(None),
		Some(PriceInput::Number(n)) => n.to_string(),
		Some(PriceInput::Text(t)) => t,
	};

	BigDecimal::from_str(text.trim())
		.map(Some)
		.map_err(|_| serde::de::Error::custom(format!("invalid price '{text}'")))
}

/// Body of a booking create or update request
///
/// Every field is optional at the parsing stage so that all missing fields
/// can be reported at once. Numbers may be sent as JSON numbers or strings
#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct BookingRequest {
	#[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
	pub professional_id:  Option<i32>,
	pub description:      Option<String>,
	#[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
	#[validate(range(
		min = 1,
		message = "duration must be a positive number of minutes",
		code = "duration-range"
	))]
	pub duration_minutes: Option<i32>,
	#[serde(default, deserialize_with = "deserialize_price")]
	pub price:            Option<BigDecimal>,
	pub date:             Option<String>,
	pub start_time:       Option<String>,
}

impl BookingRequest {
	/// Check this request and turn it into a [`NewBooking`]
	///
	/// # Errors
	/// Errors if a field is missing, malformed, or out of range
	pub fn into_new_booking(self) -> Result<NewBooking, Error> {
		missing_fields(&[
			("professional_id", self.professional_id.is_some()),
			("description", is_present(self.description.as_ref())),
			("duration_minutes", self.duration_minutes.is_some()),
			("price", self.price.is_some()),
			("date", is_present(self.date.as_ref())),
			("start_time", is_present(self.start_time.as_ref())),
		])?;

		self.validate()?;

		let (
			Some(professional_id),
			Some(description),
			Some(duration_minutes),
			Some(price),
			Some(date),
			Some(start_time),
		) = (
			self.professional_id,
			self.description,
			self.duration_minutes,
			self.price,
			self.date,
			self.start_time,
		)
		else {
			return Err(Error::Infallible(
				"booking field vanished after presence check".to_string(),
			));
		};

		if price <= BigDecimal::zero() {
			return Err(Error::ValidationError(
				"price must be a positive amount".to_string(),
			));
		}

		if price.normalized().fractional_digit_count() > PRICE_SCALE {
			return Err(Error::ValidationError(format!(
				"price must have at most {PRICE_SCALE} decimal places"
			)));
		}

		if price >= BigDecimal::from(PRICE_LIMIT) {
			return Err(Error::ValidationError(format!(
				"price must be below {PRICE_LIMIT}"
			)));
		}

		let date = parse_date(&date)?;
		let start_time = parse_time(&start_time)?;

		Ok(NewBooking {
			professional_id,
			description,
			duration_minutes,
			price,
			date,
			start_time,
		})
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BookingResponse {
	pub id:               i32,
	pub professional_id:  i32,
	pub description:      String,
	pub duration_minutes: i32,
	pub price:            BigDecimal,
	pub date:             NaiveDate,
	pub start_time:       NaiveTime,
	pub end_time:         NaiveTime,
	pub created_at:       NaiveDateTime,
	pub updated_at:       NaiveDateTime,
}

impl From<Booking> for BookingResponse {
	fn from(value: Booking) -> Self {
		let end_time = value
			.interval()
			.map_or(value.start_time, |interval| interval.end.time());

		Self {
			id: value.id,
			professional_id: value.professional_id,
			description: value.description,
			duration_minutes: value.duration_minutes,
			price: value.price,
			date: value.date,
			start_time: value.start_time,
			end_time,
			created_at: value.created_at,
			updated_at: value.updated_at,
		}
	}
}
