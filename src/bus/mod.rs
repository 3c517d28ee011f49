//! Notification bus: topic-scoped subscribers with bounded, drop-oldest
//! queues, realized as an actor — state owned exclusively by one task,
//! clients talk to it over an mpsc channel with oneshot replies.

mod actor;
mod client;
mod event;

pub use actor::BusError;
pub use client::{BusClient, Subscription};
pub use event::{thread_topic, NotificationEvent};
