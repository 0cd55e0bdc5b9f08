use serde_json::Value;
use yew::prelude::*;

use super::context::ConsentServices;
use super::types::{ConsentCategory, ConsentRecord};

#[hook]
pub fn use_consent_services() -> ConsentServices {
    use_context::<ConsentServices>().expect("ConsentProvider must wrap the app")
}

/// The stored record, read fresh on every render. The component re-renders on
/// every consent event, including ones from other tabs.
#[hook]
pub fn use_consent_record() -> Option<ConsentRecord> {
    let services = use_consent_services();
    let update = use_force_update();

    use_effect_with_deps(
        move |services: &ConsentServices| {
            let subscription = services.store.subscribe(move |_| update.force_update());
            move || drop(subscription)
        },
        services.clone(),
    );

    services.store.read()
}

/// Tracking for components. Consent is checked on every call.
#[derive(Clone, PartialEq)]
pub struct AnalyticsHandle {
    services: ConsentServices,
}

impl AnalyticsHandle {
    pub fn is_enabled(&self) -> bool {
        self.services.store.has_consent(ConsentCategory::Analytics)
    }

    pub fn track_page_view(&self, path: Option<&str>) {
        if self.is_enabled() {
            self.services.reporter.track_page_view(path);
        }
    }

    pub fn track_event(&self, name: &str, params: Option<Value>) {
        if self.is_enabled() {
            self.services.reporter.track_event(name, params);
        }
    }
}

#[hook]
pub fn use_analytics() -> AnalyticsHandle {
    AnalyticsHandle {
        services: use_consent_services(),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::analytics::testing::{Call, RecordingClient};
    use crate::analytics::AnalyticsReporter;
    use crate::consent::store::ConsentStore;
    use crate::consent::types::ConsentPreferences;
    use crate::storage::memory::MemoryStorage;

    fn returning_visitor(
        preferences: ConsentPreferences,
    ) -> (Rc<RecordingClient>, ConsentServices) {
        let storage = Rc::new(MemoryStorage::new());
        ConsentStore::new(storage.clone(), "Mozilla/5.0").write(preferences);

        let store = Rc::new(ConsentStore::new(storage, "Mozilla/5.0"));
        let client = Rc::new(RecordingClient::default());
        let reporter = Rc::new(AnalyticsReporter::new(client.clone(), Some("G-TEST".to_string())));
        (client, ConsentServices::new(store, reporter))
    }

    #[test]
    fn first_page_view_is_tracked_after_start() {
        let (client, services) = returning_visitor(ConsentPreferences::accept_all());
        let _gate = services.start();

        let analytics = AnalyticsHandle { services };
        analytics.track_page_view(Some("/"));

        assert_eq!(
            *client.calls.borrow(),
            vec![
                Call::Load("G-TEST".to_string()),
                Call::PageView(Some("/".to_string())),
            ]
        );
    }

    #[test]
    fn page_view_before_start_is_lost() {
        let (client, services) = returning_visitor(ConsentPreferences::accept_all());

        let analytics = AnalyticsHandle {
            services: services.clone(),
        };
        analytics.track_page_view(Some("/"));
        let _gate = services.start();

        assert_eq!(*client.calls.borrow(), vec![Call::Load("G-TEST".to_string())]);
    }

    #[test]
    fn rejected_analytics_tracks_nothing() {
        let (client, services) = returning_visitor(ConsentPreferences::reject_optional());
        let _gate = services.start();

        let analytics = AnalyticsHandle { services };
        analytics.track_page_view(Some("/cookies"));
        analytics.track_event("cta_click", None);

        assert!(client.calls.borrow().is_empty());
    }
}
