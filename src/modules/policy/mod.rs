pub mod controller;
pub mod routes;
pub mod schema;

pub use routes::policy_routes;
