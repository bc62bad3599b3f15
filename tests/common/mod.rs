use axum::http::StatusCode;
use axum_extra::extract::cookie::Key;
use axum_test::{TestResponse, TestServer};
use db::ProfileKind;
use profile::{NewProfile, Profile};
use serde_json::{Value, json};
use slotbook::{AppState, Config, routes};

mod mock_db;
mod mock_redis;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};
use mock_redis::{RedisUrlGuard, RedisUrlProvider};

/// Password shared by every seeded profile
pub const PASSWORD: &str = "Secret#12";

pub const PROFESSIONAL_EMAIL: &str = "ana@slotbook.test";
pub const OTHER_PROFESSIONAL_EMAIL: &str = "bruno@slotbook.test";
pub const USER_EMAIL: &str = "carla@slotbook.test";
pub const ADMIN_EMAIL: &str = "admin@slotbook.test";

/// Profiles present in every fresh test environment
#[allow(dead_code)]
pub struct Seed {
	pub professional:       Profile,
	pub other_professional: Profile,
	pub user:               Profile,
	pub admin:              Profile,
}

#[allow(dead_code)]
pub struct TestEnv {
	pub app:         TestServer,
	pub config:      Config,
	pub seed:        Seed,
	pub db_guard:    DatabaseGuard,
	pub redis_guard: RedisUrlGuard,
}

fn seed_profile(
	name: &str,
	email: &str,
	kind: ProfileKind,
	category: Option<&str>,
) -> NewProfile {
	NewProfile {
		name: name.to_string(),
		email: email.to_string(),
		phone: "+55 11 90000-0000".to_string(),
		password: PASSWORD.to_string(),
		category: category.map(ToString::to_string),
		kind,
	}
}

impl TestEnv {
	/// Get a test environment with a fresh database and redis for running
	/// tests
	///
	/// # Panics
	/// Panics if seeding or building the test server fails
	pub async fn new() -> Self {
		let config = Config::from_env();

		let db_guard = (*DATABASE_PROVIDER).acquire().await;

		let seed = {
			let conn = db_guard.pool.get().await.unwrap();

			Seed {
				professional:       seed_profile(
					"Ana Barbosa",
					PROFESSIONAL_EMAIL,
					ProfileKind::Professional,
					Some("barber"),
				)
				.insert(&conn)
				.await
				.unwrap(),
				other_professional: seed_profile(
					"Bruno Dias",
					OTHER_PROFESSIONAL_EMAIL,
					ProfileKind::Professional,
					Some("manicure"),
				)
				.insert(&conn)
				.await
				.unwrap(),
				user:               seed_profile(
					"Carla Mendes",
					USER_EMAIL,
					ProfileKind::User,
					None,
				)
				.insert(&conn)
				.await
				.unwrap(),
				admin:              seed_profile(
					"Root Admin",
					ADMIN_EMAIL,
					ProfileKind::Admin,
					None,
				)
				.insert(&conn)
				.await
				.unwrap(),
			}
		};

		let redis_guard = RedisUrlProvider::acquire();
		let redis_connection = redis_guard.connect().await;

		let state = AppState {
			config: config.clone(),
			database_pool: db_guard.pool.clone(),
			redis_connection,
			cookie_jar_key: Key::from(&[0u8; 64]),
		};
		let app = routes::get_app_router(state);

		let test_server =
			TestServer::builder().save_cookies().build(app).unwrap();

		TestEnv { app: test_server, config, seed, db_guard, redis_guard }
	}

	/// Log in with the seeded password, keeping the access cookie
	///
	/// # Panics
	/// Panics if logging in fails
	#[allow(dead_code)]
	pub async fn login(&self, email: &str) -> String {
		let response = self.login_with(email, PASSWORD).await;

		assert_eq!(response.status_code(), StatusCode::OK);

		let body = response.json::<Value>();

		body["token"].as_str().unwrap().to_string()
	}

	#[allow(dead_code)]
	pub async fn login_with(&self, email: &str, password: &str) -> TestResponse {
		self.app
			.post("/auth/login")
			.json(&json!({ "email": email, "password": password }))
			.await
	}

	/// Forget all stored cookies, acting as an anonymous client
	#[allow(dead_code)]
	pub fn forget_session(&mut self) { self.app.clear_cookies(); }
}
