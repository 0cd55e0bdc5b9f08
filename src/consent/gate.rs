use std::rc::Rc;

use crate::analytics::AnalyticsReporter;

use super::drafts;
use super::events::{ConsentEvent, Subscription};
use super::store::ConsentStore;
use super::types::ConsentPreferences;

/// Turns consent decisions into effects on the integrations that depend on
/// them. Holds no state of its own.
pub struct ConsentGate {
    reporter: Rc<AnalyticsReporter>,
    store: Rc<ConsentStore>,
}

impl ConsentGate {
    pub fn new(reporter: Rc<AnalyticsReporter>, store: Rc<ConsentStore>) -> Self {
        Self { reporter, store }
    }

    /// Re-applies on every store event, including ones from other tabs.
    pub fn attach(self: &Rc<Self>) -> Subscription {
        let gate = self.clone();
        self.store.subscribe(move |event| gate.handle(event))
    }

    pub fn handle(&self, event: &ConsentEvent) {
        match event {
            ConsentEvent::Changed(preferences) => self.apply(preferences),
            ConsentEvent::Cleared => self.apply(&ConsentPreferences::reject_optional()),
        }
    }

    pub fn apply(&self, preferences: &ConsentPreferences) {
        if preferences.analytics {
            if self.reporter.is_initialized() {
                self.reporter.resume();
            } else {
                self.reporter.initialize();
            }
        } else {
            self.reporter.suppress();
        }

        if !preferences.functional {
            drafts::purge_form_drafts(self.store.storage());
        }

        // No third-party integration is wired up yet; embeds check
        // has_consent(ThirdParty) themselves before loading.
        log::debug!("Third-party consent: {}", preferences.third_party);
    }

    /// Applies whatever is stored when the page starts.
    pub fn apply_stored(&self) {
        match self.store.read() {
            Some(record) => self.apply(&record.preferences),
            None => self.reporter.suppress(),
        }
    }
}
