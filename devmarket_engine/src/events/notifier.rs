use std::{future::Future, pin::Pin};

use log::*;

use crate::{
    connections::{ConnectionRegistry, DeliveryOutcome},
    events::{EventHooks, OrderStatusChangedEvent},
    objects::PushNotification,
};

/// Pushes order status changes to the order's participants over their live connections.
///
/// Participants that are offline are skipped. Nothing is queued for later.
#[derive(Debug, Clone)]
pub struct OrderEventNotifier {
    registry: ConnectionRegistry,
}

impl OrderEventNotifier {
    pub fn new(registry: ConnectionRegistry) -> Self {
        Self { registry }
    }

    /// Subscribes this notifier to order status changes.
    pub fn attach(self, hooks: &mut EventHooks) {
        hooks.on_order_status_changed(move |ev| {
            let notifier = self.clone();
            Box::pin(async move {
                notifier.notify(&ev);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    }

    /// Delivers an `order_updated` frame to both participants and reports how many received it.
    pub fn notify(&self, ev: &OrderStatusChangedEvent) -> usize {
        let order = &ev.order;
        let frame = match PushNotification::order_updated(ev).to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                error!("📬️ Could not serialize status change notification for order {}. {e}", order.id);
                return 0;
            },
        };
        [&order.client_id, &order.freelancer_id]
            .into_iter()
            .filter(|user| match self.registry.deliver(user, frame.clone()) {
                DeliveryOutcome::Delivered(_) => true,
                DeliveryOutcome::Offline => false,
                DeliveryOutcome::Failed(conn) => {
                    warn!("📬️ Status change for order {} was not delivered to {user} on {conn}", order.id);
                    false
                },
            })
            .count()
    }
}
