use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

use super::event::NotificationEvent;

/// Errors surfaced only inside the bus API — the engine treats "publish to
/// an unknown topic" as non-fatal and never sees these.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BusError {
    #[error("topic not found: {0}")]
    TopicNotFound(String),
    #[error("client {1} not subscribed to topic {0}")]
    TopicNotYetSubscribed(String, String),
    #[error("bus actor is no longer running")]
    ActorClosed,
}

type Reply<T> = oneshot::Sender<Result<T, BusError>>;

pub(crate) enum BusCommand {
    Subscribe {
        topic: String,
        client_id: String,
        respond_to: Reply<mpsc::Receiver<NotificationEvent>>,
    },
    Unsubscribe {
        topic: String,
        client_id: String,
        respond_to: Reply<()>,
    },
    Publish {
        topic: String,
        event: NotificationEvent,
        respond_to: Reply<()>,
    },
    PublishMany {
        topics: Vec<String>,
        event: NotificationEvent,
        respond_to: Reply<()>,
    },
}

/// Owns `HashMap<Topic, HashMap<ClientId, Sender>>` exclusively; no locking
/// needed since only this task ever touches it (the same pattern the
/// teacher's `ResourceActor` uses for domain entities).
pub struct BusActor {
    receiver: mpsc::Receiver<BusCommand>,
    topics: HashMap<String, HashMap<String, mpsc::Sender<NotificationEvent>>>,
    subscriber_queue_capacity: usize,
}

impl BusActor {
    pub(super) fn new(receiver: mpsc::Receiver<BusCommand>, subscriber_queue_capacity: usize) -> Self {
        Self { receiver, topics: HashMap::new(), subscriber_queue_capacity }
    }

    pub async fn run(mut self) {
        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                BusCommand::Subscribe { topic, client_id, respond_to } => {
                    let result = self.subscribe(topic, client_id);
                    let _ = respond_to.send(result);
                }
                BusCommand::Unsubscribe { topic, client_id, respond_to } => {
                    let result = self.unsubscribe(&topic, &client_id);
                    let _ = respond_to.send(result);
                }
                BusCommand::Publish { topic, event, respond_to } => {
                    self.publish(&topic, &event);
                    let _ = respond_to.send(Ok(()));
                }
                BusCommand::PublishMany { topics, event, respond_to } => {
                    for topic in &topics {
                        self.publish(topic, &event);
                    }
                    let _ = respond_to.send(Ok(()));
                }
            }
        }
        debug!("bus actor shutting down, all clients dropped");
    }

    /// A second subscribe for the same `(topic, client_id)` while the
    /// first is still open succeeds rather than erroring: it hands back a
    /// fresh queue wired in as that client's subscription, superseding
    /// (not rejecting) the prior one.
    #[instrument(skip(self))]
    fn subscribe(&mut self, topic: String, client_id: String) -> Result<mpsc::Receiver<NotificationEvent>, BusError> {
        let subscribers = self.topics.entry(topic).or_default();

        let (tx, rx) = mpsc::channel(self.subscriber_queue_capacity);
        subscribers.insert(client_id, tx);
        Ok(rx)
    }

    #[instrument(skip(self))]
    fn unsubscribe(&mut self, topic: &str, client_id: &str) -> Result<(), BusError> {
        let subscribers = self.topics.get_mut(topic).ok_or_else(|| BusError::TopicNotFound(topic.to_string()))?;

        if subscribers.remove(client_id).is_none() {
            return Err(BusError::TopicNotYetSubscribed(topic.to_string(), client_id.to_string()));
        }

        if subscribers.is_empty() {
            self.topics.remove(topic);
        }
        Ok(())
    }

    /// Non-blocking with respect to slow subscribers: a full queue drops
    /// its oldest buffered event rather than stalling the publisher.
    #[instrument(skip(self, event))]
    fn publish(&mut self, topic: &str, event: &NotificationEvent) {
        let Some(subscribers) = self.topics.get(topic) else {
            debug!(topic, "publish to unknown topic, dropping");
            return;
        };

        for (client_id, sender) in subscribers {
            match sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(event)) => {
                    let _ = sender.try_recv();
                    if sender.try_send(event).is_err() {
                        warn!(topic, client_id, "subscriber queue full even after drop-oldest, skipping delivery");
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(topic, client_id, "subscriber channel closed, will be reaped on unsubscribe");
                }
            }
        }
    }
}

