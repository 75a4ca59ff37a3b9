//! Lifecycle events and the event bus players trigger them on

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

/// A lifecycle notification forwarded to the player framework
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LifecycleEvent {
    LoadStart,
    DurationChange {
        duration: f64,
    },
    Playing,
    TimeUpdate {
        #[serde(rename = "currentTime")]
        current_time: f64,
        duration: f64,
    },
    Pause,
    LoadedData,
    LoadedMetadata,
}

impl LifecycleEvent {
    /// Wire name of the event, as hosts subscribe to it
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::LoadStart => "loadstart",
            LifecycleEvent::DurationChange { .. } => "durationchange",
            LifecycleEvent::Playing => "playing",
            LifecycleEvent::TimeUpdate { .. } => "timeupdate",
            LifecycleEvent::Pause => "pause",
            LifecycleEvent::LoadedData => "loadeddata",
            LifecycleEvent::LoadedMetadata => "loadedmetadata",
        }
    }
}

type Listener = Arc<dyn Fn(&LifecycleEvent) + Send + Sync>;

/// Identifies a registered listener so it can be removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    /// `None` listens to every event
    event: Option<String>,
    listener: Listener,
}

/// Synchronous event bus; listeners run in registration order
#[derive(Default)]
pub struct EventBus {
    registrations: Vec<Registration>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, event: Option<String>, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.registrations.push(Registration { id, event, listener });
        id
    }

    /// Listen to a single event by wire name
    pub fn on<F>(&mut self, event: &str, cb: F) -> ListenerId
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.register(Some(event.to_string()), Arc::new(cb))
    }

    /// Listen to every event
    pub fn on_any<F>(&mut self, cb: F) -> ListenerId
    where
        F: Fn(&LifecycleEvent) + Send + Sync + 'static,
    {
        self.register(None, Arc::new(cb))
    }

    /// Remove a listener; returns false when it was not registered
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != before
    }

    pub fn clear(&mut self) {
        self.registrations.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn trigger(&self, event: &LifecycleEvent) {
        log::trace!("trigger {}", event.name());
        let name = event.name();
        for r in &self.registrations {
            if r.event.as_deref().map_or(true, |e| e == name) {
                (r.listener)(event);
            }
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.registrations.len())
            .finish()
    }
}

/// Shared recorder of every event seen on a bus
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start recording everything triggered on `bus`
    pub fn attach(&self, bus: &mut EventBus) -> ListenerId {
        let events = Arc::clone(&self.events);
        bus.on_any(move |ev| {
            events
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(ev.clone());
        })
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(LifecycleEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
