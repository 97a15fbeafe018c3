//! Observer registration and synchronous dispatch.
//!
//! Observers are registered once at startup and read on every emit, so
//! the lists live behind `ArcSwap` rather than a lock.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::context::RequestContext;

use super::{EventPayload, LogEvent, RequestLogEvent, TagSet};

type LogObserver = Arc<dyn Fn(&LogEvent) + Send + Sync>;
type RequestObserver = Arc<dyn Fn(&RequestLogEvent) + Send + Sync>;

/// The event sources a relay can subscribe to.
///
/// Mirrors a host server's `log`/`request` emitter: `log` carries
/// server-scoped events, `request` carries events logged under an
/// in-flight request.
pub struct ServerEvents {
    log: ArcSwap<Vec<LogObserver>>,
    request: ArcSwap<Vec<RequestObserver>>,
}

impl ServerEvents {
    pub fn new() -> Self {
        Self {
            log: ArcSwap::from_pointee(Vec::new()),
            request: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Register an observer for server-scoped log events.
    pub fn on_log<F>(&self, observer: F)
    where
        F: Fn(&LogEvent) + Send + Sync + 'static,
    {
        let observer: LogObserver = Arc::new(observer);
        self.log.rcu(|current| {
            let mut next: Vec<LogObserver> = current.iter().cloned().collect();
            next.push(observer.clone());
            next
        });
    }

    /// Register an observer for request-scoped log events.
    pub fn on_request<F>(&self, observer: F)
    where
        F: Fn(&RequestLogEvent) + Send + Sync + 'static,
    {
        let observer: RequestObserver = Arc::new(observer);
        self.request.rcu(|current| {
            let mut next: Vec<RequestObserver> = current.iter().cloned().collect();
            next.push(observer.clone());
            next
        });
    }

    /// Emit a server-scoped log event to every log observer.
    pub fn log(&self, tags: TagSet, payload: impl Into<EventPayload>) {
        let event = LogEvent::new(tags, payload.into());
        for observer in self.log.load().iter() {
            observer(&event);
        }
    }

    pub(crate) fn emit_request(&self, event: &RequestLogEvent) {
        for observer in self.request.load().iter() {
            observer(event);
        }
    }
}

impl Default for ServerEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-request logging handle.
///
/// Inserted into the request extensions by the relay middleware. Handlers
/// extract it to emit request-scoped log events that carry the request's
/// shaped context.
#[derive(Clone)]
pub struct RequestLog {
    events: Arc<ServerEvents>,
    context: RequestContext,
}

impl RequestLog {
    pub(crate) fn new(events: Arc<ServerEvents>, context: RequestContext) -> Self {
        Self { events, context }
    }

    /// Emit a request-scoped log event.
    pub fn log(&self, tags: TagSet, payload: impl Into<EventPayload>) {
        let event = RequestLogEvent {
            event: LogEvent::new(tags, payload.into()),
            context: self.context.clone(),
        };
        self.events.emit_request(&event);
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn log_observers_fire_in_registration_order() {
        let events = ServerEvents::new();
        let seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let seen = seen.clone();
            events.on_log(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            });
        }

        events.log(TagSet::from(["rollbar"]), "hello");
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn request_handle_emits_with_context() {
        let events = Arc::new(ServerEvents::new());
        let seen_path = Arc::new(std::sync::Mutex::new(String::new()));

        let sink = seen_path.clone();
        events.on_request(move |event| {
            *sink.lock().unwrap() = event.context.url.clone();
        });

        let context = RequestContext {
            headers: Default::default(),
            protocol: "http".to_string(),
            url: "/widgets".to_string(),
            method: "get".to_string(),
            body: None,
        };
        let log = RequestLog::new(events, context);
        log.log(TagSet::from(["rollbar"]), "widget event");

        assert_eq!(*seen_path.lock().unwrap(), "/widgets");
    }

    #[test]
    fn emit_without_observers_is_a_noop() {
        let events = ServerEvents::new();
        events.log(TagSet::new(), "nobody listening");
    }
}
