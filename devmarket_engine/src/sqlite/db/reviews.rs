use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewReview, OrderId, Review, ReviewId, UserId};

pub async fn insert_review(review: NewReview, conn: &mut SqliteConnection) -> Result<Review, sqlx::Error> {
    let review: Review = sqlx::query_as(
        r#"
            INSERT INTO reviews (id, order_id, reviewer_id, reviewee_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(ReviewId::random())
    .bind(review.order_id)
    .bind(review.reviewer_id)
    .bind(review.reviewee_id)
    .bind(review.rating)
    .bind(review.comment)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Review {} ({}★) stored for order {}", review.id, review.rating, review.order_id);
    Ok(review)
}

pub async fn fetch_review(
    order_id: &OrderId,
    reviewer_id: &UserId,
    conn: &mut SqliteConnection,
) -> Result<Option<Review>, sqlx::Error> {
    let review = sqlx::query_as("SELECT * FROM reviews WHERE order_id = $1 AND reviewer_id = $2")
        .bind(order_id.as_str())
        .bind(reviewer_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(review)
}

pub async fn fetch_reviews_for_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Review>, sqlx::Error> {
    let reviews = sqlx::query_as("SELECT * FROM reviews WHERE reviewee_id = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(user_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(reviews)
}
