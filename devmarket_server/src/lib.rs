//! # DevMarket server
//! This crate hosts the HTTP and WebSocket front end of the DevMarket engine. It is responsible for:
//! * Authenticating requests with access tokens issued by the identity provider.
//! * Exposing the order workflow, messaging, review and profile APIs as JSON endpoints under `/api`.
//! * Holding live WebSocket connections, so that messages and order updates reach online users immediately.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/ws`: The live delivery socket.
//! * `/api/...`: See [routes](routes/index.html).

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod ws;
