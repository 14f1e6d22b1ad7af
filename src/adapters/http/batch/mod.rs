//! Batch HTTP module.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::batch_routes;
