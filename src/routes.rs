use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::auth::{login_profile, logout_profile, register_profile};
use crate::controllers::booking::{
	create_booking,
	get_booking,
	get_bookings,
	update_booking,
};
use crate::controllers::healthcheck;
use crate::controllers::profile::{
	delete_profile,
	get_all_profiles,
	get_current_profile,
	update_profile,
};
use crate::middleware::AuthLayer;

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/auth", auth_routes(&state))
		.nest("/profiles", profile_routes(&state))
		.nest("/services", booking_routes(&state));

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(10)))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/register", post(register_profile))
		.route("/login", post(login_profile))
		.route(
			"/logout",
			post(logout_profile).route_layer(AuthLayer::new(state.clone())),
		)
}

/// Profile routes, all of which need a session
fn profile_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/", get(get_all_profiles))
		.route("/me", get(get_current_profile))
		.route("/{profile_id}", put(update_profile).delete(delete_profile))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Booking routes with auth protection for write operations
fn booking_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/", post(create_booking))
		.route("/{id}", put(update_booking))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new()
		.route("/", get(get_bookings))
		.route("/{id}", get(get_booking))
		.merge(authenticated)
}
