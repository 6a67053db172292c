//! HTTP surface under `/utils`

pub mod handlers;
pub mod routes;

pub use routes::create_routes;
