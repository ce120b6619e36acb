//! The order lifecycle.
//!
//! An order can only move along the edges of a fixed table:
//!
//! ```text
//! PENDING_PAYMENT ──► PAYMENT_SUBMITTED ──► PAYMENT_CONFIRMED ──► IN_PROGRESS ──► SUBMITTED ──► COMPLETED
//!                                                                    ▲               │
//!                                                                    └── REVISION_REQUESTED ◄┘
//! ```
//!
//! `COMPLETED` is terminal. `CANCELLED` exists as a status but nothing leads to it.
//!
//! Requesting the status an order already has is not an error: it is reported as [`Transition::Unchanged`] so that
//! callers can treat repeated requests as successful no-ops.
//!
//! The table knows nothing about who is asking. Whether a given user may request a given status is decided by the
//! calling operation.
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::db_types::OrderStatusType;

static ORDER_TRANSITIONS: Lazy<TransitionTable> = Lazy::new(TransitionTable::build);

/// The outcome of checking a requested status change against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The order is already in the requested status. Nothing needs to be written.
    Unchanged,
    /// The requested status is a valid next status.
    Allowed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot transition an order from {from} to {to}")]
pub struct TransitionError {
    pub from: OrderStatusType,
    pub to: OrderStatusType,
}

/// Immutable map of each status to the statuses that may directly follow it.
#[derive(Debug)]
pub struct TransitionTable {
    edges: HashMap<OrderStatusType, HashSet<OrderStatusType>>,
}

impl TransitionTable {
    /// The process-wide table. Built on first use and never modified.
    pub fn get() -> &'static TransitionTable {
        &ORDER_TRANSITIONS
    }

    fn build() -> Self {
        use OrderStatusType::*;
        let edges = [
            (PendingPayment, vec![PaymentSubmitted]),
            (PaymentSubmitted, vec![PaymentConfirmed]),
            (PaymentConfirmed, vec![InProgress]),
            (InProgress, vec![Submitted]),
            (Submitted, vec![Completed, RevisionRequested]),
            (RevisionRequested, vec![InProgress]),
            (Completed, vec![]),
            (Cancelled, vec![]),
        ]
        .into_iter()
        .map(|(from, to)| (from, to.into_iter().collect()))
        .collect();
        Self { edges }
    }

    /// The statuses that may directly follow `from`. Empty for terminal statuses.
    pub fn allowed_from(&self, from: OrderStatusType) -> Vec<OrderStatusType> {
        OrderStatusType::ALL.into_iter().filter(|to| self.is_allowed(from, *to)).collect()
    }

    /// True iff `to` is a valid next status for `from`. A status is never a valid successor of itself.
    pub fn is_allowed(&self, from: OrderStatusType, to: OrderStatusType) -> bool {
        self.edges.get(&from).map(|next| next.contains(&to)).unwrap_or(false)
    }

    /// Validates a requested status change. This never touches storage.
    pub fn check(&self, from: OrderStatusType, to: OrderStatusType) -> Result<Transition, TransitionError> {
        if from == to {
            Ok(Transition::Unchanged)
        } else if self.is_allowed(from, to) {
            Ok(Transition::Allowed)
        } else {
            Err(TransitionError { from, to })
        }
    }
}
