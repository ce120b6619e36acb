use thiserror::Error;

use crate::db_types::{NewReview, Order, OrderId, Review, UserId};

#[derive(Debug, Clone, Error)]
pub enum ReviewError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Can only review completed orders")]
    OrderNotCompleted,
    #[error("Not a participant of this order")]
    NotAParticipant,
    #[error("You have already reviewed this order")]
    AlreadyReviewed,
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),
}

impl From<sqlx::Error> for ReviewError {
    fn from(e: sqlx::Error) -> Self {
        ReviewError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ReviewManagement {
    async fn fetch_order_for_review(&self, order_id: &OrderId) -> Result<Option<Order>, ReviewError>;

    async fn fetch_review(&self, order_id: &OrderId, reviewer_id: &UserId) -> Result<Option<Review>, ReviewError>;

    /// Stores the review. A second review by the same reviewer for the same order fails with
    /// [`ReviewError::AlreadyReviewed`].
    async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewError>;

    /// Reviews received by `user_id`, newest first.
    async fn fetch_reviews_for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewError>;
}
