//! # Event Bus
//!
//! A type-safe broadcast bus for domain events in a vertical slice
//! architecture.
//!
//! ## Overview
//!
//! Provides a centralized [`EventBus`] that fans events out to every
//! subscriber of their type. Slices stay decoupled: a publisher never knows
//! who listens, and a listener never imports the publisher's crate.
//!
//! ## Features
//!
//! * **Type-Safe**: events are identified by their Rust type.
//! * **Fan-out**: every subscriber of a type receives every event.
//! * **Low overhead**: `FxHashMap` + `parking_lot::RwLock`, payloads as `Arc`.
//! * **Async Ready**: built on top of `tokio` broadcast channels.
//!
//! # Example
//!
//! ```rust
//! use vhub_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct ProjectDeleted { id: String }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!
//!     let mut rx = bus.subscribe::<ProjectDeleted>()?;
//!     bus.publish(ProjectDeleted { id: "ABCDWXYZ".into() })?;
//!
//!     if let Ok(event) = rx.recv().await {
//!         assert_eq!(event.id, "ABCDWXYZ");
//!     }
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus, MIN_CAPACITY};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
