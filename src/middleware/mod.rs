/*
 * Responsibility
 * - middleware entry points (auth gate, transport, CORS)
 */
pub mod auth;
pub mod cors;
pub mod http;
