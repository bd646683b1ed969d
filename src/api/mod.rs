mod admin;
mod voting;

use rocket::Route;

/// All the API routes.
pub fn routes() -> Vec<Route> {
    let mut routes = voting::routes();
    routes.extend(admin::routes());
    routes
}
