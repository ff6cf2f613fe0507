/*
 * Responsibility
 * - Public surface of the IDM API (routes() re-export etc.)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
mod routes;

pub use routes::routes;
