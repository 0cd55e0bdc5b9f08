use std::rc::Rc;

use web_sys::StorageEvent;
use yew::prelude::*;
use yew_hooks::prelude::*;

use crate::analytics::AnalyticsReporter;

use super::drafts::FormDrafts;
use super::events::Subscription;
use super::gate::ConsentGate;
use super::store::ConsentStore;
use super::types::ConsentPreferences;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsentChoice {
    AcceptAll,
    RejectOptional,
    Save(ConsentPreferences),
}

impl ConsentChoice {
    pub fn preferences(self) -> ConsentPreferences {
        match self {
            ConsentChoice::AcceptAll => ConsentPreferences::accept_all(),
            ConsentChoice::RejectOptional => ConsentPreferences::reject_optional(),
            ConsentChoice::Save(preferences) => preferences,
        }
    }
}

/// The consent services for one page session, shared through a Yew context.
#[derive(Clone)]
pub struct ConsentServices {
    pub store: Rc<ConsentStore>,
    pub reporter: Rc<AnalyticsReporter>,
    pub gate: Rc<ConsentGate>,
    pub drafts: FormDrafts,
}

impl PartialEq for ConsentServices {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.store, &other.store) && Rc::ptr_eq(&self.reporter, &other.reporter)
    }
}

impl ConsentServices {
    pub fn new(store: Rc<ConsentStore>, reporter: Rc<AnalyticsReporter>) -> Self {
        let gate = Rc::new(ConsentGate::new(reporter.clone(), store.clone()));
        let drafts = FormDrafts::new(store.clone());
        Self {
            store,
            reporter,
            gate,
            drafts,
        }
    }

    pub fn browser() -> Self {
        Self::new(
            Rc::new(ConsentStore::browser()),
            Rc::new(AnalyticsReporter::browser()),
        )
    }

    /// Returns whether the choice was persisted. The banner closes either way.
    pub fn record_choice(&self, choice: ConsentChoice) -> bool {
        log::info!("Cookie consent choice: {:?}", choice);
        self.store.write(choice.preferences()).is_some()
    }

    /// Callers reload the page afterwards so running scripts are torn down.
    pub fn clear_all_data(&self) {
        self.store.clear();
    }

    /// Attaches the gate and applies stored consent. Runs before any
    /// component effect, so the first page view already sees a started
    /// reporter. The gate stays attached while the subscription lives.
    pub fn start(&self) -> Subscription {
        let subscription = self.gate.attach();
        self.gate.apply_stored();
        subscription
    }
}

/// Services plus the gate subscription, kept for the life of the provider.
struct ConsentSession {
    services: ConsentServices,
    _gate: Subscription,
}

impl ConsentSession {
    fn browser() -> Self {
        let services = ConsentServices::browser();
        let gate = services.start();
        Self {
            services,
            _gate: gate,
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ConsentProviderProps {
    #[prop_or_default]
    pub children: Children,
}

#[function_component]
pub fn ConsentProvider(props: &ConsentProviderProps) -> Html {
    let session = use_state(ConsentSession::browser);
    let services = session.services.clone();

    {
        let store = services.store.clone();
        use_event_with_window("storage", move |e: StorageEvent| {
            store.handle_storage_change(e.key().as_deref());
        });
    }

    html! {
        <ContextProvider<ConsentServices> context={services}>
            { for props.children.iter() }
        </ContextProvider<ConsentServices>>
    }
}
