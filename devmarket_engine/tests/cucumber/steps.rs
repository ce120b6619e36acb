use std::time::Duration;

use cucumber::{given, then, when};
use devmarket_engine::{
    db_types::{Cents, NewGig, NewMessage, OrderStatusType},
    objects::{Pagination, PaymentDetails},
    traits::{MessagingError, OrderFlowError, OrderManagement},
    DeliveryChannel,
};
use log::*;
use tokio::time::timeout;

use super::world::{MarketSystem, MarketWorld};

#[given("a fresh marketplace")]
async fn fresh_marketplace(world: &mut MarketWorld) {
    world.system = Some(MarketSystem::new().await);
}

#[given(expr = "{word} is registered")]
async fn register_user(world: &mut MarketWorld, name: String) {
    world.system().add_user(&name).await;
}

#[given(expr = "{word} offers a gig {string} for {int} cents")]
async fn offer_gig(world: &mut MarketWorld, name: String, title: String, price: i64) {
    let system = world.system();
    let gig = NewGig {
        freelancer_id: system.user(&name),
        title: title.clone(),
        description: format!("{title}, by {name}"),
        price: Cents::from(price),
        delivery_days: 5,
    };
    let gig = system.profiles.publish_gig(gig).await.expect("Error publishing gig");
    system.gigs.insert(title, gig.id);
}

#[given(expr = "{word} is connected")]
async fn connect(world: &mut MarketWorld, name: String) {
    let system = world.system();
    let (channel, outbox) = DeliveryChannel::new();
    system.registry.register(system.user(&name), channel);
    system.outboxes.insert(name, outbox);
}

#[when(expr = "{word} orders the gig {string}")]
async fn order_gig(world: &mut MarketWorld, name: String, title: String) {
    let system = world.system();
    let gig_id = system.gigs.get(&title).cloned().expect("Unknown gig");
    let result = system.orders.create_order(&system.user(&name), &gig_id).await;
    if let Ok(order) = &result {
        system.current_order = Some(order.id.clone());
    }
    system.last_result = Some(result);
}

#[when(expr = "{word} submits a payment of {int} cents")]
async fn submit_payment(world: &mut MarketWorld, name: String, amount: i64) {
    let system = world.system();
    let details = PaymentDetails {
        proof_reference: format!("REF-{amount}"),
        payer_name: name.clone(),
        amount: Cents::from(amount),
    };
    let result = system.orders.submit_payment(&system.order_id(), &system.user(&name), details).await;
    system.last_result = Some(result);
}

#[when(expr = "{word} {word} the order")]
async fn act_on_order(world: &mut MarketWorld, name: String, action: String) {
    let system = world.system();
    let (order_id, user) = (system.order_id(), system.user(&name));
    let api = &system.orders;
    let result = match action.as_str() {
        "confirms-payment-for" => api.confirm_payment(&order_id, &user).await,
        "starts-work-on" => api.start_work(&order_id, &user).await,
        "delivers" => api.submit_work(&order_id, &user).await,
        "approves" => api.approve_work(&order_id, &user).await,
        "sends-back" => api.request_revision(&order_id, &user).await,
        other => panic!("Unknown order action: {other}"),
    };
    system.last_result = Some(result);
}

#[when(expr = "{word} moves the order to {word}")]
async fn move_order(world: &mut MarketWorld, name: String, status: String) {
    let system = world.system();
    let status = status.parse::<OrderStatusType>().expect("Unknown status");
    let result = system.orders.apply_transition(&system.order_id(), status, &system.user(&name)).await;
    system.last_result = Some(result);
}

#[when(expr = "{word} sends {string} to {word}")]
async fn send_message(world: &mut MarketWorld, from: String, content: String, to: String) {
    let system = world.system();
    let to = system.users.get(&to).cloned().unwrap_or_else(|| to.as_str().into());
    let message = NewMessage::new(system.user(&from), to, content);
    system.last_message_error = system.messages.send(message).await.err();
}

#[then(expr = "the order status is {word}")]
async fn order_status_is(world: &mut MarketWorld, status: String) {
    let system = world.system();
    let expected = status.parse::<OrderStatusType>().expect("Unknown status");
    let order = system.db.fetch_order(&system.order_id()).await.unwrap().expect("Order not found");
    assert_eq!(order.status, expected);
}

#[then("the request succeeds")]
async fn request_succeeds(world: &mut MarketWorld) {
    let result = world.system().last_result.take().expect("No request was made");
    if let Err(e) = result {
        panic!("Request failed: {e}");
    }
}

#[then(expr = "the request is rejected as {word}")]
async fn request_rejected(world: &mut MarketWorld, kind: String) {
    let err = world.system().last_result.take().expect("No request was made").expect_err("Request succeeded");
    let matched = match kind.as_str() {
        "invalid" => matches!(err, OrderFlowError::InvalidTransition { .. }),
        "forbidden" => matches!(err, OrderFlowError::Forbidden(_)),
        "own-gig" => matches!(err, OrderFlowError::CannotOrderOwnGig),
        other => panic!("Unknown rejection kind: {other}"),
    };
    assert!(matched, "Expected {kind}, got {err}");
}

#[then(expr = "{word} is told the order is now {word}")]
async fn receives_order_update(world: &mut MarketWorld, name: String, status: String) {
    let system = world.system();
    let outbox = system.outboxes.get_mut(&name).expect("User is not connected");
    let frame = timeout(Duration::from_secs(2), outbox.recv())
        .await
        .expect("Timed out waiting for a notification")
        .expect("Connection closed");
    let frame: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(frame["type"], "order_updated");
    assert_eq!(frame["status"], status.as_str());
}

#[then(expr = "{word} receives a message from {word} saying {string}")]
async fn receives_message(world: &mut MarketWorld, name: String, from: String, content: String) {
    let system = world.system();
    let sender = system.user(&from);
    let outbox = system.outboxes.get_mut(&name).expect("User is not connected");
    let frame = outbox.try_recv().expect("No message was pushed");
    let frame: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["message"]["sender_id"], sender.as_str());
    assert_eq!(frame["message"]["content"], content.as_str());
}

#[then(expr = "{word} has no pending notifications")]
async fn no_notifications(world: &mut MarketWorld, name: String) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    let outbox = world.system().outboxes.get_mut(&name).expect("User is not connected");
    if let Ok(frame) = outbox.try_recv() {
        panic!("Unexpected notification: {frame}");
    }
}

#[then(expr = "the conversation between {word} and {word} has {int} message(s)")]
async fn conversation_length(world: &mut MarketWorld, a: String, b: String, count: usize) {
    let system = world.system();
    let history = system.messages.history(&system.user(&a), &system.user(&b), Pagination::default()).await.unwrap();
    debug!("🚀️ Conversation between {a} and {b}: {history:?}");
    assert_eq!(history.len(), count);
}

#[then("the message is rejected because the recipient does not exist")]
async fn recipient_missing(world: &mut MarketWorld) {
    let err = world.system().last_message_error.take().expect("The message was accepted");
    assert!(matches!(err, MessagingError::RecipientNotFound(_)), "Got {err}");
}
