//! REST API layer

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod mapper;
pub mod openapi;
pub mod resource;
pub mod routes;

pub use auth::{Authenticated, Claims, JwtVerifier};
pub use error::Problem;
pub use openapi::ApiDoc;
pub use routes::register_routes;
