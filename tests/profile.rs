use axum::http::StatusCode;
use serde_json::{Value, json};

mod common;

use common::{ADMIN_EMAIL, OTHER_PROFESSIONAL_EMAIL, TestEnv, USER_EMAIL};

#[tokio::test(flavor = "multi_thread")]
async fn get_all_profiles() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env.app.get("/profiles").await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Vec<Value>>().len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn profiles_need_a_session() {
	let env = TestEnv::new().await;

	let response = env.app.get("/profiles").await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
	assert_eq!(response.json::<Value>()["code"], 11);
}

#[tokio::test(flavor = "multi_thread")]
async fn get_current_profile() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env.app.get("/profiles/me").await;
	let body = response.json::<Value>();

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(body["id"], env.seed.user.id);
	assert_eq!(body["email"], USER_EMAIL);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_own_profile() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.user.id))
		.json(&json!({ "name": "Carla M.", "phone": "+55 11 91111-2222" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<Value>();

	assert_eq!(body["name"], "Carla M.");
	assert_eq!(body["phone"], "+55 11 91111-2222");
	assert_eq!(body["email"], USER_EMAIL);
}

#[tokio::test(flavor = "multi_thread")]
async fn changed_password_is_used_for_login() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.user.id))
		.json(&json!({ "password": "Changed#56" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let response = env.login_with(USER_EMAIL, "Changed#56").await;

	assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_weak_password() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.user.id))
		.json(&json!({ "password": "weak" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_rejects_taken_email() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.user.id))
		.json(&json!({ "email": ADMIN_EMAIL }))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_other_profile_is_forbidden() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.professional.id))
		.json(&json!({ "name": "Hijacked" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn users_cannot_promote_themselves() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.user.id))
		.json(&json!({ "kind": "admin" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_changes_kind() {
	let env = TestEnv::new().await;
	env.login(ADMIN_EMAIL).await;

	let path = format!("/profiles/{}", env.seed.user.id);

	let response =
		env.app.put(&path).json(&json!({ "kind": "professional" })).await;

	assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

	let response = env
		.app
		.put(&path)
		.json(&json!({ "kind": "professional", "category": "nails" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<Value>();

	assert_eq!(body["kind"], "professional");
	assert_eq!(body["category"], "nails");

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.professional.id))
		.json(&json!({ "kind": "user" }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Value>()["category"], Value::Null);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_reactivates_profile() {
	let env = TestEnv::new().await;

	for _ in 0..env.config.max_login_attempts {
		env.login_with(OTHER_PROFESSIONAL_EMAIL, "Wrong#123").await;
	}

	env.login(ADMIN_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.other_professional.id))
		.json(&json!({ "is_active": true }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Value>()["is_active"], true);

	env.login(OTHER_PROFESSIONAL_EMAIL).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_deactivation_ends_sessions() {
	let mut env = TestEnv::new().await;

	let token = env.login(USER_EMAIL).await;
	env.login(ADMIN_EMAIL).await;

	let response = env
		.app
		.put(&format!("/profiles/{}", env.seed.user.id))
		.json(&json!({ "is_active": false }))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Value>()["is_active"], false);

	let response = env.app.get("/profiles/me").await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Value>()["email"], ADMIN_EMAIL);

	env.forget_session();

	let response =
		env.app.get("/profiles/me").authorization_bearer(token).await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_profile_loses_every_session() {
	let mut env = TestEnv::new().await;

	let token = env.login(OTHER_PROFESSIONAL_EMAIL).await;
	env.login(ADMIN_EMAIL).await;

	let response = env
		.app
		.delete(&format!("/profiles/{}", env.seed.other_professional.id))
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	env.forget_session();

	let response =
		env.app.get("/profiles/me").authorization_bearer(token).await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_own_profile() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.delete(&format!("/profiles/{}", env.seed.user.id))
		.await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let response = env.app.get("/profiles/me").await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

	let response = env.login_with(USER_EMAIL, common::PASSWORD).await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_other_profile_is_forbidden() {
	let env = TestEnv::new().await;
	env.login(USER_EMAIL).await;

	let response = env
		.app
		.delete(&format!("/profiles/{}", env.seed.admin.id))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn admin_deletes_professional_and_bookings() {
	let env = TestEnv::new().await;
	env.login(ADMIN_EMAIL).await;

	let p_id = env.seed.professional.id;

	let response = env
		.app
		.post("/services")
		.json(&json!({
			"professional_id": p_id,
			"description": "beard trim",
			"duration_minutes": 20,
			"price": 15,
			"date": "2024-06-01",
			"start_time": "11:00",
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let response = env.app.delete(&format!("/profiles/{p_id}")).await;

	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let bookings = env.app.get("/services").await.json::<Vec<Value>>();

	assert!(bookings.is_empty());

	let response = env.app.delete(&format!("/profiles/{p_id}")).await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
