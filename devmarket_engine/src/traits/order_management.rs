use thiserror::Error;

use crate::{
    db_types::{Gig, GigId, NewOrder, NewPaymentProof, Order, OrderId, OrderStatusType, PaymentProof, UserId},
    objects::Pagination,
    transitions::TransitionError,
};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Gig {0} does not exist")]
    GigNotFound(GigId),
    #[error("Cannot transition an order from {from} to {to}")]
    InvalidTransition { from: OrderStatusType, to: OrderStatusType },
    #[error("Not allowed. {0}")]
    Forbidden(String),
    #[error("Cannot purchase your own gig")]
    CannotOrderOwnGig,
    #[error("A payment proof has already been submitted for order {0}")]
    PaymentAlreadySubmitted(OrderId),
}

impl From<sqlx::Error> for OrderFlowError {
    fn from(e: sqlx::Error) -> Self {
        OrderFlowError::DatabaseError(e.to_string())
    }
}

impl From<TransitionError> for OrderFlowError {
    fn from(e: TransitionError) -> Self {
        OrderFlowError::InvalidTransition { from: e.from, to: e.to }
    }
}

/// The `OrderManagement` trait defines the storage behaviour behind the order workflow.
///
/// Backends never decide whether a status change is legal; that is the job of [`crate::TransitionTable`] and
/// [`crate::OrderFlowApi`]. They must however make the status write conditional, so that concurrent writers cannot
/// both succeed.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    async fn fetch_gig(&self, gig_id: &GigId) -> Result<Option<Gig>, OrderFlowError>;

    /// Stores a new order in `PENDING_PAYMENT` with a fresh id and returns it.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;

    /// Orders in which `user_id` is either the client or the freelancer, newest first.
    async fn fetch_orders_for_user(&self, user_id: &UserId, page: Pagination) -> Result<Vec<Order>, OrderFlowError>;

    /// Sets the status of the order to `new_status` and refreshes `updated_at`, but only if the stored status is still
    /// `expected`. The check and the write must be a single atomic step.
    ///
    /// Returns the updated order, or `None` if no order with that id is in the `expected` status.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<Order>, OrderFlowError>;

    /// Stores the payment proof and moves the order from `expected` to `new_status` as one atomic unit.
    ///
    /// At most one proof exists per order; a second proof fails with [`OrderFlowError::PaymentAlreadySubmitted`].
    /// If the order is no longer in `expected`, the proof is discarded and `None` is returned. On any failure nothing
    /// is stored, so the request can simply be retried.
    async fn submit_payment_proof(
        &self,
        proof: NewPaymentProof,
        expected: OrderStatusType,
        new_status: OrderStatusType,
    ) -> Result<Option<(PaymentProof, Order)>, OrderFlowError>;

    async fn fetch_payment_proof(&self, order_id: &OrderId) -> Result<Option<PaymentProof>, OrderFlowError>;
}
