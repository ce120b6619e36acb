use devmarket_engine::{
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
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn fetch_gig(&self, gig_id: &GigId) -> Result<Option<Gig>, OrderFlowError>;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_orders_for_user(&self, user_id: &UserId, page: Pagination) -> Result<Vec<Order>, OrderFlowError>;
        async fn update_order_status(&self, order_id: &OrderId, expected: OrderStatusType, new_status: OrderStatusType) -> Result<Option<Order>, OrderFlowError>;
        async fn submit_payment_proof(&self, proof: NewPaymentProof, expected: OrderStatusType, new_status: OrderStatusType) -> Result<Option<(PaymentProof, Order)>, OrderFlowError>;
        async fn fetch_payment_proof(&self, order_id: &OrderId) -> Result<Option<PaymentProof>, OrderFlowError>;
    }
}

mock! {
    pub MessageManager {}
    impl MessageManagement for MessageManager {
        async fn user_exists(&self, user_id: &UserId) -> Result<bool, MessagingError>;
        async fn order_exists(&self, order_id: &OrderId) -> Result<bool, MessagingError>;
        async fn insert_message(&self, message: NewMessage) -> Result<Message, MessagingError>;
        async fn fetch_conversation(&self, user: &UserId, other: &UserId, page: Pagination) -> Result<Vec<Message>, MessagingError>;
    }
}

mock! {
    pub ReviewManager {}
    impl ReviewManagement for ReviewManager {
        async fn fetch_order_for_review(&self, order_id: &OrderId) -> Result<Option<Order>, ReviewError>;
        async fn fetch_review(&self, order_id: &OrderId, reviewer_id: &UserId) -> Result<Option<Review>, ReviewError>;
        async fn insert_review(&self, review: NewReview) -> Result<Review, ReviewError>;
        async fn fetch_reviews_for_user(&self, user_id: &UserId) -> Result<Vec<Review>, ReviewError>;
    }
}

mock! {
    pub UserManager {}
    impl UserManagement for UserManager {
        async fn upsert_user(&self, user: NewUser) -> Result<User, UserApiError>;
        async fn fetch_user(&self, user_id: &UserId) -> Result<Option<User>, UserApiError>;
        async fn insert_gig(&self, gig: NewGig) -> Result<Gig, UserApiError>;
        async fn fetch_gig_by_id(&self, gig_id: &GigId) -> Result<Option<Gig>, UserApiError>;
    }
}
