//! # Shared Bus - In-Process Fan-Out
//!
//! A small publish/subscribe primitive: one published event is delivered to
//! every subscription registered at the time of publication.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Publisher   │                    │ Subscriber N │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Lifecycle
//!
//! The bus is open until [`EventBus::shutdown`] is called. After shutdown:
//!
//! - `subscribe()` fails with [`SubscriptionError::Closed`]
//! - `publish()` fails with [`PublishError::Closed`]
//! - existing subscriptions drain what is already buffered, then end

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use publisher::{EventBus, EventPublisher, InMemoryEventBus, PublishError};
pub use subscriber::{EventStream, EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
