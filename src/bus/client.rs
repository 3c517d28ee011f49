use tokio::sync::{mpsc, oneshot};

use super::actor::{BusActor, BusCommand, BusError};
use super::event::NotificationEvent;

/// A subscriber's inbound queue. `recv` blocks until an event arrives;
/// `recv_timeout` pops with a timeout, returning a sentinel on expiry.
pub struct Subscription {
    pub(crate) receiver: mpsc::Receiver<NotificationEvent>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<NotificationEvent> {
        self.receiver.recv().await
    }

    /// Returns `None` both on timeout and on channel close — timeout is
    /// never an error.
    pub async fn recv_timeout(&mut self, timeout: std::time::Duration) -> Option<NotificationEvent> {
        tokio::time::timeout(timeout, self.receiver.recv()).await.ok().flatten()
    }
}

/// Clonable handle to a running [`BusActor`]. Every call is a
/// send-then-await-oneshot round trip, the same request shape every other
/// client in this service uses to talk to its actor.
#[derive(Clone)]
pub struct BusClient {
    sender: mpsc::Sender<BusCommand>,
}

impl BusClient {
    pub fn spawn(subscriber_queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(256);
        let actor = BusActor::new(receiver, subscriber_queue_capacity);
        tokio::spawn(actor.run());
        Self { sender }
    }

    /// Lazily creates the topic. A second subscribe for the same
    /// `(topic, client_id)` while the first is still open succeeds,
    /// returning a fresh queue that supersedes the previous one.
    pub async fn subscribe(&self, topic: impl Into<String>, client_id: impl Into<String>) -> Result<Subscription, BusError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BusCommand::Subscribe { topic: topic.into(), client_id: client_id.into(), respond_to })
            .await
            .map_err(|_| BusError::ActorClosed)?;
        let receiver = response.await.map_err(|_| BusError::ActorClosed)??;
        Ok(Subscription { receiver })
    }

    pub async fn unsubscribe(&self, topic: impl Into<String>, client_id: impl Into<String>) -> Result<(), BusError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BusCommand::Unsubscribe { topic: topic.into(), client_id: client_id.into(), respond_to })
            .await
            .map_err(|_| BusError::ActorClosed)?;
        response.await.map_err(|_| BusError::ActorClosed)?
    }

    /// Publishing to a nonexistent topic is a no-op, logged inside the
    /// actor — never surfaced as an error to the publisher.
    pub async fn publish(&self, topic: impl Into<String>, event: NotificationEvent) -> Result<(), BusError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BusCommand::Publish { topic: topic.into(), event, respond_to })
            .await
            .map_err(|_| BusError::ActorClosed)?;
        response.await.map_err(|_| BusError::ActorClosed)?
    }

    pub async fn publish_many(&self, topics: Vec<String>, event: NotificationEvent) -> Result<(), BusError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(BusCommand::PublishMany { topics, event, respond_to })
            .await
            .map_err(|_| BusError::ActorClosed)?;
        response.await.map_err(|_| BusError::ActorClosed)?
    }
}
