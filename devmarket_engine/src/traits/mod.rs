//! # Backend contracts
//!
//! This module defines the behaviour that a storage backend must expose in order to drive the DevMarket engine.
//! [`crate::SqliteDatabase`] implements all of them.
//!
//! * [`OrderManagement`] covers gigs, orders, payment proofs and the conditional status write.
//! * [`MessageManagement`] covers the message log.
//! * [`ReviewManagement`] covers reviews of completed orders.
//! * [`UserManagement`] covers user profiles and gig publishing.
//!
//! Each trait has its own error type, so that the API layer can map failures precisely.
mod message_management;
mod order_management;
mod review_management;
mod user_management;

pub use message_management::{MessageManagement, MessagingError};
pub use order_management::{OrderFlowError, OrderManagement};
pub use review_management::{ReviewError, ReviewManagement};
pub use user_management::{UserApiError, UserManagement};

/// True if the error is a violation of a uniqueness constraint in the backing store.
pub(crate) fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
