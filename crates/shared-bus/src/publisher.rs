//! # Event Publisher
//!
//! Defines the publishing side of the event bus and the in-memory bus itself.

use crate::subscriber::{ActiveGuard, EventStream, EventSubscriber, Subscription, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from publish operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The event bus was shut down.
    #[error("Event bus closed")]
    Closed,
}

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher<E: Send + 'static>: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event. Zero
    /// subscribers is not an error.
    async fn publish(&self, event: E) -> Result<usize, PublishError>;

    /// Get the total number of publish attempts.
    fn events_published(&self) -> u64;
}

/// A complete bus: publishing, subscribing and shutdown.
pub trait EventBus<E: Send + 'static>: EventPublisher<E> + EventSubscriber<E> {
    /// Stop accepting new subscriptions and publications.
    ///
    /// Idempotent. Existing subscriptions see end-of-stream once they have
    /// drained the events already buffered for them.
    fn shutdown(&self);

    /// Whether `shutdown` has been called.
    fn is_shut_down(&self) -> bool;
}

/// In-memory implementation of the event bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// A subscriber that falls more than `capacity` events behind loses the
/// oldest ones (see [`Subscription::recv`]).
pub struct InMemoryEventBus<E> {
    /// Broadcast sender. `None` once the bus is shut down.
    sender: RwLock<Option<broadcast::Sender<E>>>,

    /// Number of live subscriptions.
    active: Arc<AtomicUsize>,

    /// Total publish attempts.
    events_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl<E: Clone + Send + Sync + 'static> InMemoryEventBus<E> {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus with specified capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            active: Arc::new(AtomicUsize::new(0)),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Get a stream of events.
    ///
    /// This is a convenience method that returns an `EventStream`.
    pub fn event_stream(&self) -> Result<EventStream<E>, SubscriptionError> {
        self.subscribe().map(Subscription::into_stream)
    }

    /// Get the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<E: Clone + Send + Sync + 'static> Default for InMemoryEventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone + Send + Sync + 'static> EventSubscriber<E> for InMemoryEventBus<E> {
    fn subscribe(&self) -> Result<Subscription<E>, SubscriptionError> {
        let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            debug!("Subscription refused, bus is shut down");
            return Err(SubscriptionError::Closed);
        };

        let receiver = sender.subscribe();
        let active = ActiveGuard::acquire(self.active.clone());
        debug!(subscribers = self.active.load(Ordering::SeqCst), "New subscription created");

        Ok(Subscription::new(receiver, active))
    }
}

#[async_trait]
impl<E: Clone + Send + Sync + 'static> EventPublisher<E> for InMemoryEventBus<E> {
    async fn publish(&self, event: E) -> Result<usize, PublishError> {
        // Always increment counter (event was attempted)
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let guard = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = guard.as_ref() else {
            return Err(PublishError::Closed);
        };

        match sender.send(event) {
            Ok(receiver_count) => {
                debug!(receivers = receiver_count, "Event published");
                Ok(receiver_count)
            }
            Err(_) => {
                // No receivers - event is dropped
                debug!("Event dropped (no receivers)");
                Ok(0)
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl<E: Clone + Send + Sync + 'static> EventBus<E> for InMemoryEventBus<E> {
    fn shutdown(&self) {
        let mut guard = self.sender.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            debug!(subscribers = self.active.load(Ordering::SeqCst), "Event bus shut down");
        }
    }

    fn is_shut_down(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}
