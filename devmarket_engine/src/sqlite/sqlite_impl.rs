//! `SqliteDatabase` is a concrete implementation of a DevMarket engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every write runs in its own transaction and is committed before the call returns, so that it is visible to the
//! other connections in the pool.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{gigs, messages, new_pool, orders, payment_proofs, reviews, users};
use crate::{
    db_types::{
        Gig,
        GigId,
        Message,
        NewGig,
        NewMessage,
        NewOrder,
        NewPaymentProof,
        NewReview,
        NewUser,
        Order,
        OrderId,
        OrderStatusType,
        PaymentProof,
        Review,
        User,
        UserId,
    },
    objects::Pagination,
    traits::{
        is_unique_violation,
        MessageManagement,
        MessagingError,
        OrderFlowError,
        OrderManagement,
        ReviewError,
        ReviewManagement,
        UserApiError,
        UserManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool for {url}");
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date with the migrations embedded in this crate.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete for {}", self.url);
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_gig(&self, gig_id: &GigId) -> Result<Option<Gig>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let gig = gigs::fetch_gig(gig_id, &mut conn).await?;
        Ok(gig)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_user(&self, user_id: &UserId, page: Pagination) -> Result<Vec<Order>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, page, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(order_id, expected, new_status, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Inserts the proof and runs the conditional status update inside a single transaction. If the update finds the
    /// order in some other status, the transaction is rolled back and the proof goes with it.
    async fn submit_payment_proof(
        &self,
        proof: NewPaymentProof,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<(PaymentProof, Order)>, OrderFlowError> {
        let mut tx = self.pool.begin().await?;
        let order_id = proof.order_id.clone();
        let proof = payment_proofs::insert_payment_proof(proof, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                OrderFlowError::PaymentAlreadySubmitted(order_id.clone())
            } else {
                OrderFlowError::from(e)
            }
        })?;
        match orders::update_order_status(&order_id, expected, new_status, &mut tx).await? {
            Some(order) => {
                tx.commit().await?;
                Ok(Some((proof, order)))
            },
            None => {
                tx.rollback().await?;
                debug!("🗃️ Order {order_id} left {expected} before its payment proof was stored. Proof discarded");
                Ok(None)
            },
        }
    }

    async fn fetch_payment_proof(&self, order_id: &OrderId) -> Result<Option<PaymentProof>, OrderFlowError> {
        let mut conn = self.pool.acquire().await?;
        let proof = payment_proofs::fetch_payment_proof(order_id, &mut conn).await?;
        Ok(proof)
    }
}

impl MessageManagement for SqliteDatabase {
    async fn user_exists(&self, user_id: &UserId) -> Result<bool, MessagingError> {
        let mut conn = self.pool.acquire().await?;
        let exists = users::user_exists(user_id, &mut conn).await?;
        Ok(exists)
    }

    async fn order_exists(&self, order_id: &OrderId) -> Result<bool, MessagingError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order.is_some())
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message, MessagingError> {
        let mut tx = self.pool.begin().await?;
        let message = messages::insert_message(message, &mut tx).await?;
        tx.commit().await?;
        Ok(message)
    }

    async fn fetch_conversation(
        &self,
        user: &UserId,
        other: &UserId,
        page: Pagination,
    ) -> Result<Vec<Message>, MessagingError> {
        let mut conn = self.pool.acquire().await?;
        let messages = messages::fetch_conversation(user, other, page, &mut conn).await?;
        Ok(messages)
    }
}

impl ReviewManagement for SqliteDatabase {
    async fn fetch_order_for_review(&self, order_id: &OrderId) -> Result<Option<Order>, ReviewError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_review(&self, order_id: &OrderId, reviewer_id: &UserId) -> Result<Option<Review>, ReviewError> {
        let mut conn = self.pool.acquire().await?;
        let review = reviews::fetch_review(order_id, reviewer_id, &mut conn).await?;
        Ok(review)
    }

    async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewError> {
        let mut tx = self.pool.begin().await?;
        let review = reviews::insert_review(review, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                ReviewError::AlreadyReviewed
            } else {
                ReviewError::from(e)
            }
        })?;
        tx.commit().await?;
        Ok(review)
    }

    async fn fetch_reviews_for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewError> {
        let mut conn = self.pool.acquire().await?;
        let reviews = reviews::fetch_reviews_for_user(user_id, &mut conn).await?;
        Ok(reviews)
    }
}

impl UserManagement for SqliteDatabase {
    async fn upsert_user(&self, user: NewUser) -> Result<User, UserApiError> {
        let mut tx = self.pool.begin().await?;
        let email = user.email.clone();
        let user = users::upsert_user(user, &mut tx).await.map_err(|e| {
            if is_unique_violation(&e) {
                UserApiError::EmailInUse(email)
            } else {
                UserApiError::from(e)
            }
        })?;
        tx.commit().await?;
        Ok(user)
    }

    async fn fetch_user(&self, user_id: &UserId) -> Result<Option<User>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn insert_gig(&self, gig: NewGig) -> Result<Gig, UserApiError> {
        let mut tx = self.pool.begin().await?;
        let gig = gigs::insert_gig(gig, &mut tx).await?;
        tx.commit().await?;
        Ok(gig)
    }

    async fn fetch_gig_by_id(&self, gig_id: &GigId) -> Result<Option<Gig>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        let gig = gigs::fetch_gig(gig_id, &mut conn).await?;
        Ok(gig)
    }
}
