//! Typed, synchronous event bus
//!
//! Observers are called in subscription order on the emitting thread.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::domain::{CognitiveType, InstallMode};

/// Every event the core emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    InstallStart {
        name: String,
        cognitive_type: CognitiveType,
        target_id: String,
    },
    InstallSymlink {
        name: String,
        target_id: String,
        link: PathBuf,
        canonical: PathBuf,
    },
    InstallCopy {
        name: String,
        target_id: String,
        path: PathBuf,
        /// Copy made because symlinking failed
        fallback: bool,
    },
    InstallComplete {
        name: String,
        target_id: String,
        mode: InstallMode,
        success: bool,
    },
    LockRead {
        path: PathBuf,
        entries: usize,
    },
    LockWrite {
        path: PathBuf,
        entries: usize,
    },
    LockMigrate {
        from_version: u32,
        to_version: u32,
    },
}

impl Event {
    /// Wire name of the event, e.g. `install:start`
    pub fn name(&self) -> &'static str {
        match self {
            Event::InstallStart { .. } => "install:start",
            Event::InstallSymlink { .. } => "install:symlink",
            Event::InstallCopy { .. } => "install:copy",
            Event::InstallComplete { .. } => "install:complete",
            Event::LockRead { .. } => "lock:read",
            Event::LockWrite { .. } => "lock:write",
            Event::LockMigrate { .. } => "lock:migrate",
        }
    }
}

/// Receives emitted events
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event);
}

impl<F> Observer for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event);
    }
}

/// Fire-and-forget publisher
#[derive(Default)]
pub struct EventBus {
    observers: RwLock<Vec<Arc<dyn Observer>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("EventBus").field("observers", &count).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn Observer>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn emit(&self, event: Event) {
        tracing::debug!(event = event.name(), ?event, "emit");
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.on_event(&event);
        }
    }
}

/// Observer that keeps every event it sees
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<Event>>,
}

impl EventRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events whose wire name equals `name`
    pub fn named(&self, name: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.name() == name)
            .collect()
    }
}

impl Observer for EventRecorder {
    fn on_event(&self, event: &Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_observers_receive_events_in_order() {
        let bus = EventBus::new();
        let recorder = EventRecorder::new();
        bus.subscribe(recorder.clone());

        bus.emit(Event::LockMigrate {
            from_version: 3,
            to_version: 5,
        });
        bus.emit(Event::LockWrite {
            path: PathBuf::from("/lock.json"),
            entries: 1,
        });

        let names: Vec<_> = recorder.events().iter().map(Event::name).collect();
        assert_eq!(names, vec!["lock:migrate", "lock:write"]);
        assert_eq!(recorder.named("lock:write").len(), 1);
    }

    #[test]
    fn test_closure_observer() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        bus.subscribe(Arc::new(move |_: &Event| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));

        bus.emit(Event::LockRead {
            path: PathBuf::from("/lock.json"),
            entries: 0,
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_without_observers() {
        EventBus::new().emit(Event::InstallStart {
            name: "x".to_string(),
            cognitive_type: CognitiveType::Skill,
            target_id: "cursor".to_string(),
        });
    }
}
