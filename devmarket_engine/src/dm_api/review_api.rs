use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewReview, OrderId, OrderStatusType, Review, UserId},
    traits::{ReviewError, ReviewManagement},
};

pub struct ReviewApi<B> {
    db: B,
}

impl<B> Debug for ReviewApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReviewApi")
    }
}

impl<B> ReviewApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ReviewApi<B>
where B: ReviewManagement
{
    /// Leaves a review of the other participant of a completed order. Each participant can review an order once.
    pub async fn create_review(
        &self,
        actor: &UserId,
        order_id: &OrderId,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review, ReviewError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::InvalidRating(rating));
        }
        let order = self
            .db
            .fetch_order_for_review(order_id)
            .await?
            .ok_or_else(|| ReviewError::OrderNotFound(order_id.clone()))?;
        if order.status != OrderStatusType::Completed {
            return Err(ReviewError::OrderNotCompleted);
        }
        let reviewee_id = order.counterparty(actor).cloned().ok_or(ReviewError::NotAParticipant)?;
        if self.db.fetch_review(order_id, actor).await?.is_some() {
            return Err(ReviewError::AlreadyReviewed);
        }
        let review = NewReview { order_id: order.id, reviewer_id: actor.clone(), reviewee_id, rating, comment };
        let review = self.db.insert_review(review).await?;
        info!("⭐️ {} reviewed {} for order {} ({}★)", review.reviewer_id, review.reviewee_id, review.order_id, rating);
        Ok(review)
    }

    /// Reviews received by `user_id`, newest first.
    pub async fn reviews_for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewError> {
        self.db.fetch_reviews_for_user(user_id).await
    }
}
