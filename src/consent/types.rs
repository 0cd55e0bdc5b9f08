use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CONSENT_STORAGE_KEY: &str = "advisermatch_cookie_consent";

/// Bump whenever the cookie policy text changes; stored records with another
/// version are re-prompted.
pub const CONSENT_POLICY_VERSION: &str = "1.0.0";

/// ICO guidance: a consent decision is re-asked after 13 months.
pub const CONSENT_MAX_AGE_MONTHS: u32 = 13;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsentCategory {
    StrictlyNecessary,
    Analytics,
    Functional,
    ThirdParty,
}

impl ConsentCategory {
    pub const ALL: [ConsentCategory; 4] = [
        ConsentCategory::StrictlyNecessary,
        ConsentCategory::Analytics,
        ConsentCategory::Functional,
        ConsentCategory::ThirdParty,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ConsentCategory::StrictlyNecessary => "strictly-necessary",
            ConsentCategory::Analytics => "analytics",
            ConsentCategory::Functional => "functional",
            ConsentCategory::ThirdParty => "third-party",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConsentCategory::StrictlyNecessary => "Strictly necessary",
            ConsentCategory::Analytics => "Analytics",
            ConsentCategory::Functional => "Functional",
            ConsentCategory::ThirdParty => "Third-party",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ConsentCategory::StrictlyNecessary => {
                "Required for the site to work, including remembering your cookie choices. These cannot be switched off."
            }
            ConsentCategory::Analytics => {
                "Help us understand how visitors use the site so we can improve our guides and adviser matching."
            }
            ConsentCategory::Functional => {
                "Remember things like partly completed enquiry forms between visits."
            }
            ConsentCategory::ThirdParty => {
                "Allow content and tools provided by our partners, such as embedded videos and calculators."
            }
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, ConsentCategory::StrictlyNecessary)
    }
}

/// The user's choice per category. Strictly necessary cookies are not a field:
/// they are always granted, always written as `true`, and ignored on input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PreferencesRepr", into = "PreferencesRepr")]
pub struct ConsentPreferences {
    pub analytics: bool,
    pub functional: bool,
    pub third_party: bool,
}

impl ConsentPreferences {
    pub fn accept_all() -> Self {
        Self {
            analytics: true,
            functional: true,
            third_party: true,
        }
    }

    pub fn reject_optional() -> Self {
        Self::default()
    }

    pub fn get(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::StrictlyNecessary => true,
            ConsentCategory::Analytics => self.analytics,
            ConsentCategory::Functional => self.functional,
            ConsentCategory::ThirdParty => self.third_party,
        }
    }

    pub fn set(&mut self, category: ConsentCategory, granted: bool) {
        match category {
            ConsentCategory::StrictlyNecessary => {
                if !granted {
                    log::warn!("Ignoring attempt to withdraw strictly necessary cookies");
                }
            }
            ConsentCategory::Analytics => self.analytics = granted,
            ConsentCategory::Functional => self.functional = granted,
            ConsentCategory::ThirdParty => self.third_party = granted,
        }
    }

    pub fn with(mut self, category: ConsentCategory, granted: bool) -> Self {
        self.set(category, granted);
        self
    }
}

#[derive(Serialize, Deserialize)]
struct PreferencesRepr {
    #[serde(rename = "strictly-necessary", default = "always_granted")]
    strictly_necessary: bool,
    analytics: bool,
    functional: bool,
    #[serde(rename = "third-party")]
    third_party: bool,
}

fn always_granted() -> bool {
    true
}

impl From<PreferencesRepr> for ConsentPreferences {
    fn from(repr: PreferencesRepr) -> Self {
        if !repr.strictly_necessary {
            log::warn!("Stored consent withdrew strictly necessary cookies; treating as granted");
        }
        Self {
            analytics: repr.analytics,
            functional: repr.functional,
            third_party: repr.third_party,
        }
    }
}

impl From<ConsentPreferences> for PreferencesRepr {
    fn from(preferences: ConsentPreferences) -> Self {
        Self {
            strictly_necessary: true,
            analytics: preferences.analytics,
            functional: preferences.functional,
            third_party: preferences.third_party,
        }
    }
}

/// What gets persisted under [`CONSENT_STORAGE_KEY`]. Only
/// `ConsentStore::write` builds one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub preferences: ConsentPreferences,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub user_agent: String,
}
