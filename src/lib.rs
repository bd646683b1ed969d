#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod tally;

use config::DatabaseFairing;
use logging::LoggerFairing;

/// Construct the server, ready to be ignited and launched.
/// Database connection and index setup happen at ignition via the fairings.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(DatabaseFairing)
}

/// Get a database client for tests.
/// Configured via `MONGODB_URI`, defaulting to a local instance.
#[cfg(test)]
pub(crate) async fn db_client() -> mongodb::Client {
    let db_uri =
        std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .expect("Failed to connect to test database")
}

/// Get a random database name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// Construct a server against a specific database, bypassing the database
/// fairing. Used by the `#[backend_test]` harness.
#[cfg(test)]
pub(crate) async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create test indexes");
    rocket::build()
        .mount("/", api::routes())
        .manage(client)
        .manage(db)
}
