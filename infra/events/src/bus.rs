use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// A safe default for channel buffers.
/// 128 is usually enough for domain events in a vertical slice.
pub const DEFAULT_CAPACITY: usize = 128;

/// The smallest buffer a broadcast channel will accept.
pub const MIN_CAPACITY: usize = 1;

/// Marker trait for types that can travel over the [`EventBus`].
///
/// Blanket-implemented for every `Send + Sync + 'static` type, so plain
/// structs work without any ceremony.
pub trait Event: Any + Send + Sync + 'static {}

impl<T: Any + Send + Sync + 'static> Event for T {}

type AnySender = Box<dyn Any + Send + Sync>;

/// A type-keyed broadcast bus connecting decoupled feature slices.
///
/// Each event type owns a single fan-out channel, created lazily on the first
/// `subscribe` or `publish` for that type. Payloads are wrapped in [`Arc`], so
/// delivering an event to many subscribers never clones the event itself.
///
/// The bus is cheap to share: every clone refers to the same channel registry,
/// so slices can hold their own copy.
#[derive(Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, AnySender>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus").field("channels", &self.channels.read().len()).finish()
    }
}

impl EventBus {
    /// Creates an empty bus with no registered channels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to events of type `T` with the default buffer capacity.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the stored channel does not
    /// carry `T`, which indicates a registry invariant violation.
    ///
    /// # Examples
    /// ```rust
    /// use vhub_event_bus::EventBus;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct ProjectDeleted { id: String }
    ///
    /// # fn main() -> Result<(), vhub_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let _rx = bus.subscribe::<ProjectDeleted>()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to events of type `T` with a specific buffer capacity.
    ///
    /// The capacity only takes effect when this call creates the channel; an
    /// existing channel keeps the capacity it was created with.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero, or
    /// [`EventBusError::TypeMismatch`] on a registry invariant violation.
    ///
    /// # Examples
    /// ```rust
    /// use vhub_event_bus::EventBus;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Tick(u64);
    ///
    /// # fn main() -> Result<(), vhub_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let _rx = bus.subscribe_with_capacity::<Tick>(16)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let sender = self.ensure_channel::<T>(capacity)?;
        Ok(sender.subscribe())
    }

    /// Publishes an event to all current subscribers of its type.
    ///
    /// Returns the number of subscribers the event was delivered to. An event
    /// published before anyone subscribes is dropped and `Ok(0)` is returned.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] on a registry invariant
    /// violation.
    ///
    /// # Examples
    /// ```rust
    /// use vhub_event_bus::EventBus;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct ArtifactStored { version: u64 }
    ///
    /// # fn main() -> Result<(), vhub_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// bus.publish(ArtifactStored { version: 1 })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes a shared event instance without re-wrapping it.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] on a registry invariant
    /// violation.
    ///
    /// # Examples
    /// ```rust
    /// use vhub_event_bus::EventBus;
    /// use std::sync::Arc;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Ping;
    ///
    /// # fn main() -> Result<(), vhub_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// bus.publish_arc(Arc::new(Ping))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.ensure_channel::<T>(DEFAULT_CAPACITY)?;

        sender.send(event).map_or_else(
            |_| {
                trace!(event = std::any::type_name::<T>(), "Event dropped: no active subscribers");
                Ok(0)
            },
            Ok,
        )
    }

    /// Returns the number of event types with a registered channel.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }

    /// Closes every channel and returns how many were shut down.
    ///
    /// Subscribers observe the closure once they drain any buffered events.
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let closed = channels.len();
        channels.clear();
        trace!(closed, "EventBus shut down");
        closed
    }

    /// Returns the broadcast sender for `T`, creating the channel on first use.
    fn ensure_channel<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        if let Some(entry) = self.channels.read().get(&TypeId::of::<T>()) {
            return downcast_sender::<T>(entry);
        }

        let mut channels = self.channels.write();
        // Another writer may have raced us between the two locks.
        if let Some(entry) = channels.get(&TypeId::of::<T>()) {
            return downcast_sender::<T>(entry);
        }

        let (sender, _receiver) = broadcast::channel::<Arc<T>>(capacity);
        channels.insert(TypeId::of::<T>(), Box::new(sender.clone()));
        Ok(sender)
    }
}

fn downcast_sender<T: Event>(entry: &AnySender) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    entry.downcast_ref::<broadcast::Sender<Arc<T>>>().cloned().ok_or_else(|| {
        EventBusError::TypeMismatch {
            message: std::any::type_name::<T>().into(),
            context: Some("stored channel carries a different event type".into()),
        }
    })
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("capacity must be at least {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}
