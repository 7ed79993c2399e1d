//! Listener registration against a host's request-interception event.
//!
//! `HostRuntime` is the seam between the observer and whatever actually
//! intercepts requests. `EventBus` is the in-process implementation used by
//! the CLI, the bridge server and the tests.

use crate::config::Config;
use crate::listener::observer::RequestObserver;
use crate::listener::pattern::PatternSet;
use crate::request::{BlockingResponse, RequestDescriptor};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Options a listener asks the host for at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtraInfoSpec {
    /// The host waits for the callback and honors a returned decision.
    Blocking,
    /// Include the request body in the descriptor.
    RequestBody,
}

/// Which requests reach a listener.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub urls: PatternSet,
    /// Restrict to these resource types. `None` means every type.
    pub types: Option<Vec<String>>,
}

impl RequestFilter {
    pub fn new(urls: PatternSet) -> Self {
        Self { urls, types: None }
    }

    pub fn with_types(mut self, types: Vec<String>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn matches(&self, details: &RequestDescriptor) -> bool {
        if !self.urls.matches(&details.url) {
            return false;
        }
        match (&self.types, &details.resource_type) {
            (None, _) => true,
            (Some(types), Some(t)) => types.iter().any(|allowed| allowed == t),
            (Some(_), None) => false,
        }
    }
}

pub type Callback = Box<dyn Fn(&RequestDescriptor) -> Option<BlockingResponse> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// The host's event registration surface.
pub trait HostRuntime {
    fn add_listener(
        &mut self,
        callback: Callback,
        filter: RequestFilter,
        extra_info: &[ExtraInfoSpec],
    ) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId) -> bool;

    fn has_listener(&self, id: ListenerId) -> bool;
}

struct Registration {
    id: ListenerId,
    callback: Callback,
    filter: RequestFilter,
    blocking: bool,
}

/// Outcome of delivering one request to the bus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatch {
    /// How many listeners were invoked.
    pub invoked: usize,
    /// Whether any invoked listener was registered as blocking.
    pub blocking_capable: bool,
    /// First decision returned by a blocking listener, if any.
    pub response: Option<BlockingResponse>,
}

/// In-process event bus. Listeners run in registration order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Registration>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver a request to every listener whose filter selects it.
    /// Decisions from non-blocking listeners are ignored.
    pub fn dispatch(&self, details: &RequestDescriptor) -> Dispatch {
        let mut outcome = Dispatch::default();
        for reg in &self.listeners {
            if !reg.filter.matches(details) {
                continue;
            }
            outcome.invoked += 1;
            outcome.blocking_capable |= reg.blocking;

            let decision = (reg.callback)(details);
            if reg.blocking && outcome.response.is_none() {
                outcome.response = decision;
            }
        }
        outcome
    }
}

impl HostRuntime for EventBus {
    fn add_listener(
        &mut self,
        callback: Callback,
        filter: RequestFilter,
        extra_info: &[ExtraInfoSpec],
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration {
            id,
            callback,
            filter,
            blocking: extra_info.contains(&ExtraInfoSpec::Blocking),
        });
        id
    }

    fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() != before
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|r| r.id == id)
    }
}

/// Register `observer` on `host` with the URL filters and blocking flag
/// from `config`.
pub fn register<H: HostRuntime + ?Sized>(
    host: &mut H,
    observer: Arc<RequestObserver>,
    config: &Config,
) -> Result<ListenerId> {
    let urls = PatternSet::new(&config.urls).context("Invalid URL filter in configuration")?;
    let mut filter = RequestFilter::new(urls);
    if let Some(ref types) = config.types {
        filter = filter.with_types(types.clone());
    }

    let extra_info: Vec<ExtraInfoSpec> = if config.blocking {
        vec![ExtraInfoSpec::Blocking]
    } else {
        Vec::new()
    };

    tracing::debug!(
        "Registering request observer for {} (blocking: {})",
        config.urls.join(", "),
        config.blocking
    );

    let callback: Callback =
        Box::new(move |details: &RequestDescriptor| observer.handle(details));
    Ok(host.add_listener(callback, filter, &extra_info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::AlwaysHttps;
    use crate::listener::sink::MemorySink;

    fn observer_with_sink() -> (Arc<RequestObserver>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let observer = Arc::new(RequestObserver::new(Arc::new(AlwaysHttps), sink.clone()));
        (observer, sink)
    }

    #[test]
    fn test_register_default_filter() {
        let (observer, sink) = observer_with_sink();
        let mut bus = EventBus::new();
        let id = register(&mut bus, observer, &Config::default()).unwrap();
        assert!(bus.has_listener(id));

        let hit = bus.dispatch(&RequestDescriptor::new("http://example.com/path"));
        assert_eq!(hit.invoked, 1);
        assert!(hit.blocking_capable);
        assert!(hit.response.is_none());

        let miss = bus.dispatch(&RequestDescriptor::new("https://example.com/path"));
        assert_eq!(miss.invoked, 0);

        assert_eq!(sink.lines(), vec!["Domain example.com requires HTTPS"]);
    }

    #[test]
    fn test_removed_listener_not_invoked() {
        let (observer, sink) = observer_with_sink();
        let mut bus = EventBus::new();
        let id = register(&mut bus, observer, &Config::default()).unwrap();
        assert!(bus.remove_listener(id));
        assert!(!bus.remove_listener(id));
        assert!(bus.is_empty());

        let outcome = bus.dispatch(&RequestDescriptor::new("http://example.com/"));
        assert_eq!(outcome.invoked, 0);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_type_filter() {
        let filter = RequestFilter::new(PatternSet::new(&["http://*/*".to_string()]).unwrap())
            .with_types(vec!["main_frame".to_string()]);

        let mut details = RequestDescriptor::new("http://example.com/");
        assert!(!filter.matches(&details));
        details.resource_type = Some("main_frame".to_string());
        assert!(filter.matches(&details));
        details.resource_type = Some("image".to_string());
        assert!(!filter.matches(&details));
    }

    #[test]
    fn test_non_blocking_decisions_ignored() {
        let mut bus = EventBus::new();
        let filter = RequestFilter::new(PatternSet::new(&["<all_urls>".to_string()]).unwrap());
        bus.add_listener(
            Box::new(|_: &RequestDescriptor| {
                Some(BlockingResponse {
                    cancel: Some(true),
                    redirect_url: None,
                })
            }),
            filter,
            &[],
        );

        let outcome = bus.dispatch(&RequestDescriptor::new("http://example.com/"));
        assert_eq!(outcome.invoked, 1);
        assert!(!outcome.blocking_capable);
        assert!(outcome.response.is_none());
    }

    #[test]
    fn test_register_rejects_bad_pattern() {
        let (observer, _) = observer_with_sink();
        let mut bus = EventBus::new();
        let config = Config {
            urls: vec!["not-a-pattern".to_string()],
            ..Config::default()
        };
        assert!(register(&mut bus, observer, &config).is_err());
    }
}
