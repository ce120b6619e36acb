//! A bounded event channel. Any number of [`EventProducer`]s publish into it and a single [`EventHandler`] runs the
//! hook on every event.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E> {
    events: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + 'static> EventHandler<E> {
    /// Producers wait once `capacity` events are queued. A capacity of zero is treated as one.
    pub fn new(capacity: usize, handler: Handler<E>) -> Self {
        let (sender, events) = mpsc::channel(capacity.max(1));
        Self { events, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer { sender: self.sender.clone() }
    }

    /// Runs the hook on each event in its own task, so a slow hook never holds up the queue.
    ///
    /// Returns once every producer has been dropped and every hook task has finished.
    pub async fn start_handler(self) {
        let Self { mut events, sender, handler } = self;
        // Only the producers may keep the queue open
        drop(sender);
        let mut tasks = JoinSet::new();
        debug!("📬️ Event handler started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        trace!("📬️ Handling event");
                        tasks.spawn((handler)(event));
                    },
                    None => break,
                },
                Some(result) = tasks.join_next(), if !tasks.is_empty() => log_failure(result),
            }
        }
        while let Some(result) = tasks.join_next().await {
            log_failure(result);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn log_failure(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("📬️ Event hook did not complete. {e}");
    }
}

pub struct EventProducer<E> {
    sender: mpsc::Sender<E>,
}

impl<E> Clone for EventProducer<E> {
    fn clone(&self) -> Self {
        Self { sender: self.sender.clone() }
    }
}

impl<E> EventProducer<E> {
    pub async fn publish_event(&self, event: E) {
        if self.sender.send(event).await.is_err() {
            error!("📬️ Event handler has shut down. Event dropped");
        }
    }
}
