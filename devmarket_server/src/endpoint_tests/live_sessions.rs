use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_ws::{CloseCode, CloseReason, Closed, Message, ProtocolError};
use devmarket_engine::{db_types::UserId, ConnectionRegistry, MessageDispatcher, Presence};
use futures::channel::mpsc;

use super::{helpers::CLIENT, mocks::MockMessageManager};
use crate::ws::{open_session, FrameSink};

type Inbound = mpsc::UnboundedReceiver<Result<Message, ProtocolError>>;
type Peer = mpsc::UnboundedSender<Result<Message, ProtocolError>>;

/// Stands in for the socket and remembers everything written to it.
#[derive(Clone, Default)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<String>>>,
    closed: Arc<Mutex<Option<Option<CloseReason>>>>,
}

impl RecordingSink {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    fn close_reason(&self) -> Option<Option<CloseReason>> {
        self.closed.lock().unwrap().clone()
    }
}

impl FrameSink for RecordingSink {
    async fn text(&mut self, frame: String) -> Result<(), Closed> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn pong(&mut self, _payload: &[u8]) -> Result<(), Closed> {
        self.sent.lock().unwrap().push("pong".to_string());
        Ok(())
    }

    async fn close(self, reason: Option<CloseReason>) {
        *self.closed.lock().unwrap() = Some(reason);
    }
}

fn dispatcher(registry: &ConnectionRegistry) -> Arc<MessageDispatcher<MockMessageManager>> {
    Arc::new(MessageDispatcher::new(MockMessageManager::new(), registry.clone()))
}

fn connect_peer() -> (Peer, Inbound) {
    mpsc::unbounded()
}

async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

fn client() -> UserId {
    UserId::from(CLIENT)
}

#[actix_web::test]
async fn session_is_registered_until_the_peer_closes() {
    let _ = env_logger::try_init().ok();
    let registry = ConnectionRegistry::new();
    let sink = RecordingSink::default();
    let (peer, inbound) = connect_peer();
    let session = open_session(client(), sink.clone(), inbound, dispatcher(&registry));
    assert!(registry.is_online(&client()));
    let running = actix_web::rt::spawn(session);

    assert!(registry.deliver(&client(), r#"{"type":"order_updated"}"#.to_string()).is_delivered());
    assert!(eventually(|| sink.sent() == vec![r#"{"type":"order_updated"}"#.to_string()]).await);
    peer.unbounded_send(Ok(Message::Ping("hi".into()))).unwrap();
    assert!(eventually(|| sink.sent().len() == 2).await);
    assert_eq!(sink.sent()[1], "pong");

    peer.unbounded_send(Ok(Message::Close(Some(CloseCode::Normal.into())))).unwrap();
    running.await.unwrap();
    assert_eq!(registry.lookup(&client()), Presence::Offline);
    assert_eq!(sink.close_reason(), Some(Some(CloseReason::from(CloseCode::Normal))));
    assert!(!registry.deliver(&client(), "late".to_string()).is_delivered());
}

#[actix_web::test]
async fn vanished_or_misbehaving_peers_are_unregistered() {
    let _ = env_logger::try_init().ok();
    let registry = ConnectionRegistry::new();

    let sink = RecordingSink::default();
    let (peer, inbound) = connect_peer();
    let running = actix_web::rt::spawn(open_session(client(), sink.clone(), inbound, dispatcher(&registry)));
    drop(peer);
    running.await.unwrap();
    assert_eq!(registry.lookup(&client()), Presence::Offline);
    assert_eq!(sink.close_reason(), Some(None));

    let sink = RecordingSink::default();
    let (peer, inbound) = connect_peer();
    let running = actix_web::rt::spawn(open_session(client(), sink.clone(), inbound, dispatcher(&registry)));
    peer.unbounded_send(Err(ProtocolError::UnmaskedFrame)).unwrap();
    running.await.unwrap();
    assert_eq!(registry.lookup(&client()), Presence::Offline);
    assert_eq!(sink.close_reason(), Some(None));
}

#[actix_web::test]
async fn replaced_session_stays_open_and_cannot_evict_its_successor() {
    let _ = env_logger::try_init().ok();
    let registry = ConnectionRegistry::new();
    let api = dispatcher(&registry);

    let old_sink = RecordingSink::default();
    let (old_peer, old_inbound) = connect_peer();
    let old = actix_web::rt::spawn(open_session(client(), old_sink.clone(), old_inbound, api.clone()));
    let new_sink = RecordingSink::default();
    let (new_peer, new_inbound) = connect_peer();
    let new = actix_web::rt::spawn(open_session(client(), new_sink.clone(), new_inbound, api.clone()));
    let current = registry.lookup(&client());
    assert!(matches!(current, Presence::Online(_)));

    assert!(registry.deliver(&client(), "for the new device".to_string()).is_delivered());
    assert!(eventually(|| new_sink.sent() == vec!["for the new device".to_string()]).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(old_sink.sent().is_empty());
    assert!(!old.is_finished());
    assert_eq!(old_sink.close_reason(), None);

    // The old socket still answers its client
    old_peer.unbounded_send(Ok(Message::Text("not json".into()))).unwrap();
    assert!(eventually(|| old_sink.sent().len() == 1).await);
    assert!(old_sink.sent()[0].contains(r#""type":"error""#));

    drop(old_peer);
    old.await.unwrap();
    assert_eq!(registry.lookup(&client()), current);

    drop(new_peer);
    new.await.unwrap();
    assert_eq!(registry.lookup(&client()), Presence::Offline);
}
