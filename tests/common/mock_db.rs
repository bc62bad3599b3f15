use std::sync::LazyLock;

use common::{DbConn, DbPool};
use deadpool_diesel::postgres::{Manager, Pool};
use diesel::prelude::*;
use diesel_migrations::{
	EmbeddedMigrations,
	MigrationHarness,
	embed_migrations,
};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Global test database provider
pub static DATABASE_PROVIDER: LazyLock<DatabaseProvider> =
	LazyLock::new(DatabaseProvider::new);

/// Hands out throwaway databases on the server named by `DATABASE_URL`
pub struct DatabaseProvider {
	server_url: String,
	root_pool:  DbPool,
}

/// A migrated test database, dropped together with this guard
pub struct DatabaseGuard {
	root_conn:     DbConn,
	database_name: String,
	pub pool:      DbPool,
}

fn build_pool(url: String) -> DbPool {
	let manager = Manager::new(url, deadpool_diesel::Runtime::Tokio1);

	Pool::builder(manager).max_size(4).build().unwrap()
}

impl DatabaseProvider {
	fn new() -> Self {
		if Ok("true".to_string()) == std::env::var("CI") {
			tracing_subscriber::fmt()
				.pretty()
				.with_thread_names(true)
				.with_max_level(tracing::Level::DEBUG)
				.init();
		}

		let database_url = std::env::var("DATABASE_URL").unwrap();
		let (server_url, _) = database_url.rsplit_once('/').unwrap();

		Self {
			server_url: server_url.to_string(),
			root_pool:  build_pool(database_url),
		}
	}

	/// Create and migrate a fresh database
	///
	/// # Panics
	/// Panics if the database cannot be created or migrated
	pub async fn acquire(&self) -> DatabaseGuard {
		let database_name =
			format!("slotbook_test_{}", Uuid::new_v4().simple());

		let root_conn = self
			.root_pool
			.get()
			.await
			.expect("could not get root pool connection");

		let create_db_query = format!("CREATE DATABASE {database_name};");

		root_conn
			.interact(|conn| diesel::sql_query(create_db_query).execute(conn))
			.await
			.expect("could not interact with root connection")
			.expect("could not create test database");

		let pool = build_pool(format!("{}/{database_name}", self.server_url));

		pool.get()
			.await
			.expect("could not connect to test database")
			.interact(|conn| {
				conn.run_pending_migrations(MIGRATIONS).map(|_| ())
			})
			.await
			.expect("could not interact with test database")
			.expect("could not run migrations");

		DatabaseGuard { root_conn, database_name, pool }
	}
}

impl Drop for DatabaseGuard {
	fn drop(&mut self) {
		self.pool.close();

		let drop_db_query =
			format!("DROP DATABASE {} WITH (FORCE);", self.database_name);

		futures::executor::block_on(async move {
			self.root_conn
				.interact(|conn| diesel::sql_query(drop_db_query).execute(conn))
				.await
				.expect("could not interact with root connection")
				.expect("could not drop test database");
		});
	}
}
