use deadpool_diesel::postgres::{Manager, Pool};
use time::Duration;

use crate::RedisConn;

#[derive(Clone, Debug)]
pub struct Config {
	pub production: bool,

	pub database_url: String,
	pub redis_url:    String,

	pub bind_address: String,

	pub access_cookie_name:     String,
	pub access_cookie_lifetime: Duration,

	pub max_login_attempts: u32,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	fn get_env_default(var: &str, default: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| default.to_string())
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if a required environment variable is missing or a numeric
	/// variable does not parse
	#[must_use]
	pub fn from_env() -> Self {
		let production = Self::get_env_default("PRODUCTION", "false")
			.parse::<bool>()
			.unwrap_or_else(|_| panic!("PRODUCTION must be true or false"));

		let database_url = Self::get_env_var("DATABASE_URL");
		let redis_url = Self::get_env_var("REDIS_URL");

		let bind_address = Self::get_env_default("BIND_ADDRESS", "0.0.0.0:80");

		let access_cookie_name = Self::get_env_default(
			"ACCESS_COOKIE_NAME",
			"slotbook_access_token",
		);
		let access_cookie_lifetime = Duration::minutes(
			Self::get_env_default("ACCESS_COOKIE_LIFETIME_MINUTES", "1440")
				.parse::<i64>()
				.unwrap_or_else(|_| {
					panic!("ACCESS_COOKIE_LIFETIME_MINUTES must be a number")
				}),
		);

		let max_login_attempts =
			Self::get_env_default("MAX_LOGIN_ATTEMPTS", "3")
				.parse::<u32>()
				.unwrap_or_else(|_| panic!("MAX_LOGIN_ATTEMPTS must be a number"));

		Self {
			production,
			database_url,
			redis_url,
			bind_address,
			access_cookie_name,
			access_cookie_lifetime,
			max_login_attempts,
		}
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}

	/// Create a redis connection for the given config
	///
	/// # Panics
	/// Panics if connecting to redis fails
	pub async fn create_redis_connection(&self) -> RedisConn {
		let client = redis::Client::open(self.redis_url.as_str())
			.expect("COULD NOT CREATE REDIS CLIENT");

		client
			.get_multiplexed_async_connection()
			.await
			.expect("COULD NOT CONNECT TO REDIS")
	}
}
