//! The public API of the DevMarket engine.
//!
//! Each API object is generic over a backend implementing the relevant [`crate::traits`], so the same logic runs
//! against SQLite in production and against mocks in tests.
pub mod message_dispatcher;
pub mod objects;
pub mod order_flow_api;
pub mod profile_api;
pub mod review_api;
