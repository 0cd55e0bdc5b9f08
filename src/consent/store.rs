use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::storage::{browser_user_agent, BrowserStorage, KeyValueStore};

use super::drafts;
use super::events::{ConsentBus, ConsentEvent, Subscription};
use super::types::{ConsentPreferences, ConsentRecord, CONSENT_POLICY_VERSION, CONSENT_STORAGE_KEY};

type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

/// Sole owner of the persisted [`ConsentRecord`]. Every change is published on
/// the store's bus; nothing else writes the record.
pub struct ConsentStore {
    storage: Rc<dyn KeyValueStore>,
    bus: ConsentBus,
    user_agent: String,
    clock: Clock,
}

impl ConsentStore {
    pub fn new(storage: Rc<dyn KeyValueStore>, user_agent: impl Into<String>) -> Self {
        Self {
            storage,
            bus: ConsentBus::new(),
            user_agent: user_agent.into(),
            clock: Rc::new(Utc::now),
        }
    }

    pub fn browser() -> Self {
        Self::new(Rc::new(BrowserStorage), browser_user_agent())
    }

    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + 'static,
    {
        self.clock = Rc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn storage(&self) -> &dyn KeyValueStore {
        self.storage.as_ref()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ConsentEvent) + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// The stored record, or `None` when there is none or it cannot be read.
    pub fn read(&self) -> Option<ConsentRecord> {
        let raw = match self.storage.get_item(CONSENT_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Could not read cookie consent: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<ConsentRecord>(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Ignoring malformed cookie consent record: {}", e);
                None
            }
        }
    }

    pub fn write(&self, preferences: ConsentPreferences) -> Option<ConsentRecord> {
        let record = ConsentRecord {
            preferences,
            timestamp: self.now(),
            version: CONSENT_POLICY_VERSION.to_string(),
            user_agent: self.user_agent.clone(),
        };
        let raw = match serde_json::to_string(&record) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to serialise cookie consent: {}", e);
                return None;
            }
        };
        if let Err(e) = self.storage.set_item(CONSENT_STORAGE_KEY, &raw) {
            log::error!("Failed to save cookie consent: {}", e);
            return None;
        }
        log::info!(
            "Saved cookie consent (analytics: {}, functional: {}, third-party: {})",
            preferences.analytics,
            preferences.functional,
            preferences.third_party
        );
        self.bus.publish(ConsentEvent::Changed(preferences));
        Some(record)
    }

    /// Deletes the record and every functional artifact. Scripts that already
    /// started are not unloaded; callers reload the page afterwards.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(CONSENT_STORAGE_KEY) {
            log::error!("Failed to remove cookie consent: {}", e);
        }
        drafts::purge_functional_artifacts(self.storage.as_ref());
        log::info!("Cleared cookie consent and cached data");
        self.bus.publish(ConsentEvent::Cleared);
    }

    /// Feed from the window `storage` event: another tab changed `key`, or
    /// cleared everything when `key` is `None`.
    pub fn handle_storage_change(&self, key: Option<&str>) {
        if matches!(key, Some(key) if key != CONSENT_STORAGE_KEY) {
            return;
        }
        match self.read() {
            Some(record) => {
                log::info!("Cookie consent changed in another tab");
                self.bus.publish(ConsentEvent::Changed(record.preferences));
            }
            None => {
                log::info!("Cookie consent cleared in another tab");
                self.bus.publish(ConsentEvent::Cleared);
            }
        }
    }
}
