use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
pub use dm_common::Cents;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
use uuid::Uuid;

//--------------------------------------       Identifiers      --------------------------------------------------------
/// Declares a string-backed identifier newtype. New values are random v4 UUIDs.
macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Type, Serialize, Deserialize)]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_type!(
    /// The identity of a marketplace user. Issued by the identity provider and trusted as-is.
    UserId
);
id_type!(GigId);
id_type!(OrderId);
id_type!(PaymentProofId);
id_type!(MessageId);
id_type!(ReviewId);

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatusType {
    /// The order has been placed and the client still has to pay.
    PendingPayment,
    /// The client has uploaded a proof of payment.
    PaymentSubmitted,
    /// The freelancer has confirmed receipt of the payment.
    PaymentConfirmed,
    /// The freelancer is working on the order.
    InProgress,
    /// The freelancer has delivered the work and is waiting for the client's verdict.
    Submitted,
    /// The client has accepted the delivery. Terminal.
    Completed,
    /// The client has sent the delivery back for changes.
    RevisionRequested,
    /// Reserved. No transition leads here.
    Cancelled,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 8] = [
        OrderStatusType::PendingPayment,
        OrderStatusType::PaymentSubmitted,
        OrderStatusType::PaymentConfirmed,
        OrderStatusType::InProgress,
        OrderStatusType::Submitted,
        OrderStatusType::Completed,
        OrderStatusType::RevisionRequested,
        OrderStatusType::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::PendingPayment => "PENDING_PAYMENT",
            OrderStatusType::PaymentSubmitted => "PAYMENT_SUBMITTED",
            OrderStatusType::PaymentConfirmed => "PAYMENT_CONFIRMED",
            OrderStatusType::InProgress => "IN_PROGRESS",
            OrderStatusType::Submitted => "SUBMITTED",
            OrderStatusType::Completed => "COMPLETED",
            OrderStatusType::RevisionRequested => "REVISION_REQUESTED",
            OrderStatusType::Cancelled => "CANCELLED",
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid conversion: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatusType::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ConversionError(format!("Invalid order status: {s}")))
    }
}

impl From<String> for OrderStatusType {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to PENDING_PAYMENT");
            OrderStatusType::PendingPayment
        })
    }
}

//--------------------------------------     PaymentStatus     ---------------------------------------------------------
/// Verification state of an order's payment. Every order starts as `Pending`; nothing moves it yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Verified,
    Rejected,
}

//--------------------------------------      Participant      ---------------------------------------------------------
/// The side a user is on in an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Participant {
    Client,
    Freelancer,
}

impl Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Participant::Client => f.write_str("client"),
            Participant::Freelancer => f.write_str("freelancer"),
        }
    }
}

//--------------------------------------         User          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl NewUser {
    pub fn new<S: Into<String>>(id: UserId, email: S, full_name: S) -> Self {
        Self { id, email: email.into(), full_name: full_name.into(), bio: None, avatar_url: None }
    }
}

//--------------------------------------          Gig          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Gig {
    pub id: GigId,
    pub freelancer_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Cents,
    pub delivery_days: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGig {
    pub freelancer_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Cents,
    pub delivery_days: i64,
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub gig_id: GigId,
    pub client_id: UserId,
    pub freelancer_id: UserId,
    pub status: OrderStatusType,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    /// Changes on every status write, and only then.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Which side of the order `user` is on, if any.
    pub fn participant(&self, user: &UserId) -> Option<Participant> {
        if &self.client_id == user {
            Some(Participant::Client)
        } else if &self.freelancer_id == user {
            Some(Participant::Freelancer)
        } else {
            None
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participant(user).is_some()
    }

    /// The other participant, from the point of view of `user`.
    pub fn counterparty(&self, user: &UserId) -> Option<&UserId> {
        match self.participant(user)? {
            Participant::Client => Some(&self.freelancer_id),
            Participant::Freelancer => Some(&self.client_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub gig_id: GigId,
    pub client_id: UserId,
    pub freelancer_id: UserId,
}

//--------------------------------------     PaymentProof      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentProof {
    pub id: PaymentProofId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub proof_reference: String,
    pub payer_name: String,
    pub amount: Cents,
    pub submitted_at: DateTime<Utc>,
    /// Reserved. Always `false` at present.
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaymentProof {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub proof_reference: String,
    pub payer_name: String,
    pub amount: Cents,
}

//--------------------------------------        Message        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub order_id: Option<OrderId>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub order_id: Option<OrderId>,
    pub content: String,
}

impl NewMessage {
    pub fn new<S: Into<String>>(sender_id: UserId, receiver_id: UserId, content: S) -> Self {
        Self { sender_id, receiver_id, order_id: None, content: content.into() }
    }

    pub fn with_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }
}

//--------------------------------------        Review         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub order_id: OrderId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub order_id: OrderId,
    pub reviewer_id: UserId,
    pub reviewee_id: UserId,
    pub rating: i64,
    pub comment: Option<String>,
}
