//! Live delivery over WebSocket.
//!
//! `GET /ws` upgrades an authenticated request and registers the connection as the user's delivery channel. Frames
//! pushed through the [`ConnectionRegistry`](devmarket_engine::ConnectionRegistry) are written to the socket as text.
//! Clients can send messages over the same socket:
//!
//! ```json
//! {"type": "send", "receiver_id": "..", "content": "..", "order_id": null}
//! ```
//!
//! Each one is answered with `{"type":"sent","message":{..}}` or `{"type":"error","message":".."}`.
//!
//! A user has at most one live connection. When they connect again, the older socket stays open but no longer
//! receives pushes.
use std::{future::Future, sync::Arc};

use actix_web::{web, HttpRequest, HttpResponse};
use actix_ws::{CloseReason, Closed, Message, ProtocolError, Session};
use devmarket_engine::{
    db_types::UserId,
    traits::MessageManagement,
    ConnectionId,
    DeliveryChannel,
    MessageDispatcher,
};
use futures::{Stream, StreamExt};
use log::*;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::{
    auth::JwtClaims,
    data_objects::{AckFrame, ClientFrame},
    errors::ServerError,
    route,
};

route!(live_updates => Get "/ws" impl MessageManagement);
pub async fn live_updates<B: MessageManagement + 'static>(
    req: HttpRequest,
    body: web::Payload,
    claims: JwtClaims,
    api: web::Data<MessageDispatcher<B>>,
) -> Result<HttpResponse, ServerError> {
    let (response, session, stream) = actix_ws::handle(&req, body).map_err(|e| {
        debug!("🔌️ WebSocket handshake with {} failed. {e}", claims.sub);
        ServerError::InvalidRequestBody(e.to_string())
    })?;
    actix_web::rt::spawn(open_session(claims.sub, session, stream, api.into_inner()));
    Ok(response)
}

/// The outbound half of a live connection.
#[allow(async_fn_in_trait)]
pub(crate) trait FrameSink {
    async fn text(&mut self, frame: String) -> Result<(), Closed>;
    async fn pong(&mut self, payload: &[u8]) -> Result<(), Closed>;
    async fn close(self, reason: Option<CloseReason>);
}

impl FrameSink for Session {
    async fn text(&mut self, frame: String) -> Result<(), Closed> {
        Session::text(self, frame).await
    }

    async fn pong(&mut self, payload: &[u8]) -> Result<(), Closed> {
        Session::pong(self, payload).await
    }

    async fn close(self, reason: Option<CloseReason>) {
        let _ = Session::close(self, reason).await;
    }
}

/// Registers a fresh delivery channel for `user` and returns the session loop that serves it.
///
/// The registration happens before this returns, so pushes sent while the loop is being scheduled are not lost.
pub(crate) fn open_session<B, T, S>(
    user: UserId,
    sink: T,
    stream: S,
    api: Arc<MessageDispatcher<B>>,
) -> impl Future<Output = ()>
where
    B: MessageManagement,
    T: FrameSink,
    S: Stream<Item = Result<Message, ProtocolError>> + Unpin,
{
    let (channel, outbox) = DeliveryChannel::new();
    let conn_id = api.registry().register(user.clone(), channel);
    run_session(user, conn_id, sink, stream, outbox, api)
}

/// Pumps pushed frames out to the client and client frames into the dispatcher until either side goes away. The
/// session then removes its own registration, and only that one.
async fn run_session<B, T, S>(
    user: UserId,
    conn_id: ConnectionId,
    mut session: T,
    mut stream: S,
    mut outbox: UnboundedReceiver<String>,
    api: Arc<MessageDispatcher<B>>,
) where
    B: MessageManagement,
    T: FrameSink,
    S: Stream<Item = Result<Message, ProtocolError>> + Unpin,
{
    let mut reachable = true;
    let reason: Option<CloseReason> = loop {
        tokio::select! {
            frame = outbox.recv(), if reachable => match frame {
                Some(frame) => {
                    if session.text(frame).await.is_err() {
                        break None;
                    }
                },
                None => {
                    debug!("🔌️ {conn_id} for {user} was replaced by a newer connection");
                    reachable = false;
                },
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let ack = handle_client_frame(&user, &text, &api).await;
                    if session.text(ack).await.is_err() {
                        break None;
                    }
                },
                Some(Ok(Message::Ping(bytes))) => {
                    if session.pong(&bytes).await.is_err() {
                        break None;
                    }
                },
                Some(Ok(Message::Close(reason))) => break reason,
                Some(Ok(_)) => trace!("🔌️ Ignoring frame from {user}"),
                Some(Err(e)) => {
                    warn!("🔌️ Protocol error on {conn_id} for {user}. {e}");
                    break None;
                },
                None => break None,
            },
        }
    };
    api.registry().unregister(&user, conn_id);
    session.close(reason).await;
    trace!("🔌️ Session {conn_id} for {user} has ended");
}

/// Handles one text frame from a client and returns the acknowledgement frame.
pub(crate) async fn handle_client_frame<B: MessageManagement>(
    user: &UserId,
    text: &str,
    api: &MessageDispatcher<B>,
) -> String {
    let ack = match serde_json::from_str::<ClientFrame>(text) {
        Ok(ClientFrame::Send(params)) => match api.send(params.into_message(user.clone())).await {
            Ok(message) => AckFrame::Sent { message },
            Err(e) => {
                debug!("🔌️ Message from {user} was not sent. {e}");
                AckFrame::Error { message: e.to_string() }
            },
        },
        Err(e) => AckFrame::Error { message: format!("Unrecognised frame. {e}") },
    };
    serde_json::to_string(&ack).unwrap_or_else(|e| {
        error!("🔌️ Could not serialize acknowledgement for {user}. {e}");
        r#"{"type":"error","message":"Internal error"}"#.to_string()
    })
}
