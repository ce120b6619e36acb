use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{GigId, NewOrder, NewPaymentProof, Order, OrderId, OrderStatusType, Participant, PaymentProof, UserId},
    events::{EventProducers, OrderStatusChangedEvent},
    objects::{Pagination, PaymentDetails},
    traits::{OrderFlowError, OrderManagement},
    transitions::{Transition, TransitionTable},
};

/// `OrderFlowApi` drives orders through their lifecycle.
///
/// [`Self::apply_transition`] is the single place where an order's status is written. The remaining operations are
/// the user-facing steps of the workflow; each one checks that the caller is on the right side of the order before
/// delegating to it.
pub struct OrderFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Places an order for a gig. The new order starts in `PENDING_PAYMENT`.
    ///
    /// Freelancers cannot buy their own gigs.
    pub async fn create_order(&self, client_id: &UserId, gig_id: &GigId) -> Result<Order, OrderFlowError> {
        let gig = self.db.fetch_gig(gig_id).await?.ok_or_else(|| OrderFlowError::GigNotFound(gig_id.clone()))?;
        if &gig.freelancer_id == client_id {
            debug!("🔄️📦️ {client_id} tried to buy their own gig {gig_id}");
            return Err(OrderFlowError::CannotOrderOwnGig);
        }
        let order = NewOrder { gig_id: gig.id, client_id: client_id.clone(), freelancer_id: gig.freelancer_id };
        let order = self.db.insert_order(order).await?;
        info!("🔄️📦️ Order {} placed by {} with {}", order.id, order.client_id, order.freelancer_id);
        Ok(order)
    }

    /// Moves the order to `requested` on behalf of `actor`.
    ///
    /// * `NotFound` if the order does not exist.
    /// * `Forbidden` if `actor` is neither the client nor the freelancer.
    /// * If the order is already in `requested`, it is returned as-is and nothing is written.
    /// * `InvalidTransition` if `requested` is not a valid next status.
    ///
    /// The write only happens if the status is still the one that was read. If another request changed it in the
    /// meantime, this call fails with `InvalidTransition` from the status that is stored now.
    pub async fn apply_transition(
        &self,
        order_id: &OrderId,
        requested: OrderStatusType,
        actor: &UserId,
    ) -> Result<Order, OrderFlowError> {
        let order = self.order_for_participant(order_id, actor).await?;
        self.transition(order, requested).await
    }

    /// Client uploads a proof of payment. The proof is stored and the order moves to `PAYMENT_SUBMITTED` in one atomic
    /// step: either both happen or neither does.
    pub async fn submit_payment(
        &self,
        order_id: &OrderId,
        actor: &UserId,
        details: PaymentDetails,
    ) -> Result<Order, OrderFlowError> {
        let order = self.order_for_role(order_id, actor, Participant::Client).await?;
        let requested = OrderStatusType::PaymentSubmitted;
        if TransitionTable::get().check(order.status, requested)? == Transition::Unchanged {
            debug!("🔄️💰️ Payment for order {order_id} was already submitted. Nothing to do");
            return Ok(order);
        }
        let proof = NewPaymentProof {
            order_id: order.id.clone(),
            user_id: actor.clone(),
            proof_reference: details.proof_reference,
            payer_name: details.payer_name,
            amount: details.amount,
        };
        let from = order.status;
        match self.db.submit_payment_proof(proof, from, requested).await? {
            Some((proof, updated)) => {
                info!("🔄️💰️ Payment proof {} of {} submitted for order {order_id}", proof.id, proof.amount);
                self.status_changed(updated, from).await
            },
            None => self.lost_race(&order.id, requested).await,
        }
    }

    /// Freelancer confirms that the client's payment arrived.
    pub async fn confirm_payment(&self, order_id: &OrderId, actor: &UserId) -> Result<Order, OrderFlowError> {
        let order = self.order_for_role(order_id, actor, Participant::Freelancer).await?;
        self.transition(order, OrderStatusType::PaymentConfirmed).await
    }

    /// Freelancer starts (or, after a revision request, resumes) work on the order.
    pub async fn start_work(&self, order_id: &OrderId, actor: &UserId) -> Result<Order, OrderFlowError> {
        let order = self.order_for_role(order_id, actor, Participant::Freelancer).await?;
        self.transition(order, OrderStatusType::InProgress).await
    }

    /// Freelancer delivers the work.
    pub async fn submit_work(&self, order_id: &OrderId, actor: &UserId) -> Result<Order, OrderFlowError> {
        let order = self.order_for_role(order_id, actor, Participant::Freelancer).await?;
        self.transition(order, OrderStatusType::Submitted).await
    }

    /// Client accepts the delivery. The order is complete.
    pub async fn approve_work(&self, order_id: &OrderId, actor: &UserId) -> Result<Order, OrderFlowError> {
        let order = self.order_for_role(order_id, actor, Participant::Client).await?;
        self.transition(order, OrderStatusType::Completed).await
    }

    /// Client sends the delivery back for changes.
    pub async fn request_revision(&self, order_id: &OrderId, actor: &UserId) -> Result<Order, OrderFlowError> {
        let order = self.order_for_role(order_id, actor, Participant::Client).await?;
        self.transition(order, OrderStatusType::RevisionRequested).await
    }

    /// All orders in which the user is either the client or the freelancer, newest first.
    pub async fn orders_for_user(&self, user_id: &UserId, page: Pagination) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_orders_for_user(user_id, page).await
    }

    /// Fetches the order, provided `user_id` takes part in it.
    pub async fn order_for_participant(&self, order_id: &OrderId, user_id: &UserId) -> Result<Order, OrderFlowError> {
        let order =
            self.db.fetch_order(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if !order.is_participant(user_id) {
            debug!("🔄️ {user_id} is not a participant in order {order_id}");
            return Err(OrderFlowError::Forbidden(format!("{user_id} is not a participant in order {order_id}")));
        }
        Ok(order)
    }

    /// The payment proof submitted for the order, if any. Only participants may see it.
    pub async fn payment_proof(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> Result<Option<PaymentProof>, OrderFlowError> {
        let order = self.order_for_participant(order_id, user_id).await?;
        self.db.fetch_payment_proof(&order.id).await
    }

    async fn order_for_role(
        &self,
        order_id: &OrderId,
        actor: &UserId,
        role: Participant,
    ) -> Result<Order, OrderFlowError> {
        let order = self.order_for_participant(order_id, actor).await?;
        match order.participant(actor) {
            Some(r) if r == role => Ok(order),
            _ => {
                debug!("🔄️ {actor} tried to act as the {role} of order {order_id}");
                Err(OrderFlowError::Forbidden(format!("Only the {role} of order {order_id} can do this")))
            },
        }
    }

    async fn transition(&self, order: Order, requested: OrderStatusType) -> Result<Order, OrderFlowError> {
        let from = order.status;
        if TransitionTable::get().check(from, requested)? == Transition::Unchanged {
            debug!("🔄️ Order {} is already {requested}. Nothing to do", order.id);
            return Ok(order);
        }
        match self.db.update_order_status(&order.id, from, requested).await? {
            Some(updated) => self.status_changed(updated, from).await,
            None => self.lost_race(&order.id, requested).await,
        }
    }

    async fn status_changed(&self, updated: Order, from: OrderStatusType) -> Result<Order, OrderFlowError> {
        info!("🔄️ Order {} moved from {from} to {}", updated.id, updated.status);
        self.call_status_changed_hook(&updated, from).await;
        Ok(updated)
    }

    /// Another request changed the status between our read and our write. Report the failure from the status that
    /// is stored now.
    async fn lost_race(&self, order_id: &OrderId, requested: OrderStatusType) -> Result<Order, OrderFlowError> {
        let current =
            self.db.fetch_order(order_id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        warn!("🔄️ Order {order_id} changed to {} while moving it to {requested}. The request loses", current.status);
        Err(OrderFlowError::InvalidTransition { from: current.status, to: requested })
    }

    async fn call_status_changed_hook(&self, order: &Order, previous_status: OrderStatusType) {
        for emitter in &self.producers.order_status_changed_producer {
            debug!("🔄️ Notifying order status change hook subscribers");
            let event = OrderStatusChangedEvent::new(order.clone(), previous_status);
            emitter.publish_event(event).await;
        }
    }
}
