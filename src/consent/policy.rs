//! Derived answers over whatever the store currently holds. Nothing here is
//! cached; callers ask again whenever they need to act.

use chrono::{DateTime, Months, Utc};

use super::store::ConsentStore;
use super::types::{ConsentCategory, ConsentRecord, CONSENT_MAX_AGE_MONTHS, CONSENT_POLICY_VERSION};

pub fn has_consent(record: Option<&ConsentRecord>, category: ConsentCategory) -> bool {
    record.map_or(false, |record| record.preferences.get(category))
}

pub fn has_any_decision(record: Option<&ConsentRecord>) -> bool {
    record.is_some()
}

pub fn is_stale(record: &ConsentRecord, now: DateTime<Utc>) -> bool {
    match now.checked_sub_months(Months::new(CONSENT_MAX_AGE_MONTHS)) {
        Some(cutoff) => record.timestamp < cutoff,
        None => false,
    }
}

/// Whether the banner has to ask again. Only drives prompting; feature
/// behaviour follows [`has_consent`].
pub fn needs_renewal(record: Option<&ConsentRecord>, now: DateTime<Utc>) -> bool {
    match record {
        None => true,
        Some(record) => record.version != CONSENT_POLICY_VERSION || is_stale(record, now),
    }
}

impl ConsentStore {
    pub fn has_consent(&self, category: ConsentCategory) -> bool {
        has_consent(self.read().as_ref(), category)
    }

    pub fn has_any_decision(&self) -> bool {
        has_any_decision(self.read().as_ref())
    }

    pub fn needs_renewal(&self) -> bool {
        needs_renewal(self.read().as_ref(), self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consent::types::{ConsentPreferences, CONSENT_STORAGE_KEY};
    use crate::storage::memory::MemoryStorage;
    use chrono::TimeZone;
    use std::rc::Rc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
    }

    fn record_at(timestamp: DateTime<Utc>, version: &str) -> ConsentRecord {
        ConsentRecord {
            preferences: ConsentPreferences::accept_all(),
            timestamp,
            version: version.to_string(),
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn nothing_is_consented_without_a_record() {
        for category in ConsentCategory::ALL {
            assert!(!has_consent(None, category));
        }
        assert!(!has_any_decision(None));
        assert!(needs_renewal(None, now()));
    }

    #[test]
    fn strictly_necessary_is_granted_once_a_record_exists() {
        let record = ConsentRecord {
            preferences: ConsentPreferences::reject_optional(),
            ..record_at(now(), CONSENT_POLICY_VERSION)
        };
        assert!(has_consent(Some(&record), ConsentCategory::StrictlyNecessary));
        assert!(!has_consent(Some(&record), ConsentCategory::Analytics));
        assert!(has_any_decision(Some(&record)));
    }

    #[test]
    fn version_mismatch_needs_renewal_even_when_fresh() {
        let record = record_at(now(), "0.9.0");
        assert!(needs_renewal(Some(&record), now()));
        let record = record_at(now(), CONSENT_POLICY_VERSION);
        assert!(!needs_renewal(Some(&record), now()));
    }

    #[test]
    fn staleness_window_is_thirteen_months() {
        let twelve_months = now().checked_sub_months(Months::new(12)).unwrap();
        let thirteen_months = now().checked_sub_months(Months::new(13)).unwrap();
        let just_over = thirteen_months - chrono::Duration::seconds(1);
        let fourteen_months = now().checked_sub_months(Months::new(14)).unwrap();
        let renewal_at = |timestamp| {
            needs_renewal(Some(&record_at(timestamp, CONSENT_POLICY_VERSION)), now())
        };

        assert!(!renewal_at(twelve_months));
        assert!(!renewal_at(thirteen_months));
        assert!(renewal_at(just_over));
        assert!(renewal_at(fourteen_months));
    }

    #[test]
    fn store_predicates_follow_storage() {
        let storage = Rc::new(MemoryStorage::new());
        let store = ConsentStore::new(storage.clone(), "test").with_clock(now);
        assert!(store.needs_renewal());

        store.write(ConsentPreferences::default().with(ConsentCategory::Functional, true));
        assert!(!store.needs_renewal());
        assert!(store.has_consent(ConsentCategory::Functional));
        assert!(!store.has_consent(ConsentCategory::Analytics));

        let fourteen_months = now().checked_sub_months(Months::new(14)).unwrap();
        let old = record_at(fourteen_months, CONSENT_POLICY_VERSION);
        storage.put(CONSENT_STORAGE_KEY, &serde_json::to_string(&old).unwrap());
        assert!(store.needs_renewal());
        assert!(store.has_consent(ConsentCategory::Analytics));

        store.clear();
        assert!(store.needs_renewal());
        assert!(!store.has_any_decision());
        for category in ConsentCategory::ALL {
            assert!(!store.has_consent(category));
        }
    }
}
