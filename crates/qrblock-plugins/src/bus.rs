use qrblock_core::{format_error_chain, CourseId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

pub type Handler = Arc<dyn Fn(&BusEvent) -> anyhow::Result<()> + Send + Sync>;

/// Wraps a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&BusEvent) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub trait EventBus: Send + Sync {
    fn emit(&self, event: BusEvent);
    fn subscribe(&self, topic: &str, handler: Handler);
}

/// Synchronous bus. Handlers run in subscription order on the emitting thread.
#[derive(Default, Clone)]
pub struct InMemoryBus {
    handlers: Arc<RwLock<HashMap<String, Vec<Handler>>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.handlers
            .read()
            .map(|h| h.get(topic).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl EventBus for InMemoryBus {
    fn emit(&self, event: BusEvent) {
        // Clone the list so handlers may subscribe without deadlocking.
        let handlers = match self.handlers.read() {
            Ok(map) => map.get(&event.topic).cloned().unwrap_or_default(),
            Err(_) => {
                tracing::error!(topic = %event.topic, "event bus lock poisoned");
                return;
            }
        };
        if handlers.is_empty() {
            tracing::trace!(topic = %event.topic, "no subscribers");
        }
        for subscriber in handlers {
            if let Err(e) = subscriber(&event) {
                let chain = format_error_chain(&*e);
                tracing::warn!(topic = %event.topic, error = %chain, "event handler failed");
            }
        }
    }

    fn subscribe(&self, topic: &str, handler: Handler) {
        match self.handlers.write() {
            Ok(mut map) => map.entry(topic.to_string()).or_default().push(handler),
            Err(_) => tracing::error!(topic, "event bus lock poisoned"),
        }
    }
}

/// Emitted by the host after a course has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDeleted {
    #[serde(rename = "courseid")]
    pub course_id: CourseId,
}

impl CourseDeleted {
    pub const TOPIC: &'static str = "\\core\\event\\course_deleted";

    pub fn to_event(&self) -> BusEvent {
        BusEvent {
            topic: Self::TOPIC.to_string(),
            payload: serde_json::json!({ "courseid": i64::from(self.course_id) }),
        }
    }

    pub fn from_event(event: &BusEvent) -> anyhow::Result<Self> {
        if event.topic != Self::TOPIC {
            anyhow::bail!("unexpected topic {}", event.topic);
        }
        Ok(serde_json::from_value(event.payload.clone())?)
    }
}
