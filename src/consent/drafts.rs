//! Functional-category artifacts: saved enquiry-form drafts and the cached
//! feature flags the site keeps between visits.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::storage::KeyValueStore;

use super::store::ConsentStore;
use super::types::ConsentCategory;

pub const FORM_DRAFT_PREFIX: &str = "advisermatch_form_draft:";
pub const FEATURE_FLAGS_KEY: &str = "advisermatch_feature_flags";

pub type DraftFields = BTreeMap<String, String>;

fn draft_key(form: &str) -> String {
    format!("{}{}", FORM_DRAFT_PREFIX, form)
}

/// Removes every saved form draft. Returns how many were removed.
pub fn purge_form_drafts(storage: &dyn KeyValueStore) -> usize {
    let keys = match storage.keys() {
        Ok(keys) => keys,
        Err(e) => {
            log::error!("Could not list stored form drafts: {}", e);
            return 0;
        }
    };
    let mut removed = 0;
    for key in keys.iter().filter(|key| key.starts_with(FORM_DRAFT_PREFIX)) {
        match storage.remove_item(key) {
            Ok(()) => removed += 1,
            Err(e) => log::error!("Failed to remove form draft {}: {}", key, e),
        }
    }
    if removed > 0 {
        log::info!("Purged {} saved form draft(s)", removed);
    }
    removed
}

/// Everything "clear all data" removes besides the consent record itself.
pub fn purge_functional_artifacts(storage: &dyn KeyValueStore) {
    purge_form_drafts(storage);
    if let Err(e) = storage.remove_item(FEATURE_FLAGS_KEY) {
        log::error!("Failed to remove cached feature flags: {}", e);
    }
}

/// Draft persistence for lead forms. Saving needs functional consent and is
/// checked at call time, since consent may change while a form is open.
#[derive(Clone)]
pub struct FormDrafts {
    store: Rc<ConsentStore>,
}

impl PartialEq for FormDrafts {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store)
    }
}

impl FormDrafts {
    pub fn new(store: Rc<ConsentStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, form: &str, fields: &DraftFields) -> bool {
        if !self.store.has_consent(ConsentCategory::Functional) {
            log::debug!("Not saving {} draft without functional consent", form);
            return false;
        }
        let raw = match serde_json::to_string(fields) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Failed to serialise {} draft: {}", form, e);
                return false;
            }
        };
        match self.store.storage().set_item(&draft_key(form), &raw) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to save {} draft: {}", form, e);
                false
            }
        }
    }

    pub fn load(&self, form: &str) -> Option<DraftFields> {
        if !self.store.has_consent(ConsentCategory::Functional) {
            return None;
        }
        let raw = self.store.storage().get_item(&draft_key(form)).ok().flatten()?;
        match serde_json::from_str(&raw) {
            Ok(fields) => Some(fields),
            Err(e) => {
                log::warn!("Discarding unreadable {} draft: {}", form, e);
                self.discard(form);
                None
            }
        }
    }

    pub fn discard(&self, form: &str) {
        if let Err(e) = self.store.storage().remove_item(&draft_key(form)) {
            log::error!("Failed to discard {} draft: {}", form, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::types::ConsentPreferences;
    use crate::storage::memory::MemoryStorage;

    fn fields() -> DraftFields {
        let mut fields = DraftFields::new();
        fields.insert("name".to_string(), "Ada".to_string());
        fields.insert("postcode".to_string(), "LS1 4AP".to_string());
        fields
    }

    fn setup() -> (Rc<MemoryStorage>, Rc<ConsentStore>, FormDrafts) {
        let storage = Rc::new(MemoryStorage::new());
        let store = Rc::new(ConsentStore::new(storage.clone(), "test-agent"));
        let drafts = FormDrafts::new(store.clone());
        (storage, store, drafts)
    }

    #[test]
    fn drafts_need_functional_consent() {
        let (storage, store, drafts) = setup();
        assert!(!drafts.save("contact", &fields()));
        assert!(!storage.contains("advisermatch_form_draft:contact"));

        store.write(ConsentPreferences::default().with(ConsentCategory::Functional, true));
        assert!(drafts.save("contact", &fields()));
        assert_eq!(drafts.load("contact"), Some(fields()));
    }

    #[test]
    fn purge_only_touches_drafts() {
        let (storage, store, drafts) = setup();
        store.write(ConsentPreferences::accept_all());
        drafts.save("contact", &fields());
        drafts.save("pension-review", &fields());
        storage.put("unrelated", "keep");

        assert_eq!(purge_form_drafts(&*storage), 2);
        assert!(storage.contains("unrelated"));
        assert!(store.read().is_some());
        assert_eq!(drafts.load("contact"), None);
    }

    #[test]
    fn unreadable_draft_is_discarded() {
        let (storage, store, drafts) = setup();
        store.write(ConsentPreferences::accept_all());
        storage.put("advisermatch_form_draft:contact", "{not json");

        assert_eq!(drafts.load("contact"), None);
        assert!(!storage.contains("advisermatch_form_draft:contact"));
    }
}
