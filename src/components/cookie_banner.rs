use std::rc::Rc;

use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::consent::context::{ConsentChoice, ConsentServices};
use crate::consent::events::ConsentEvent;
use crate::consent::hooks::use_consent_services;
use crate::consent::types::{ConsentCategory, ConsentPreferences};
use crate::Route;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerView {
    Hidden,
    Summary,
    Detailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerAction {
    /// Show the summary prompt again, starting from `selection`.
    Prompt(ConsentPreferences),
    Customize,
    Back,
    Toggle(ConsentCategory, bool),
    Decided,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BannerState {
    pub view: BannerView,
    pub selection: ConsentPreferences,
}

impl BannerState {
    pub fn initial(needs_renewal: bool, stored: Option<ConsentPreferences>) -> Self {
        Self {
            view: if needs_renewal {
                BannerView::Summary
            } else {
                BannerView::Hidden
            },
            selection: stored.unwrap_or_default(),
        }
    }

    pub fn next(self, action: BannerAction) -> Self {
        match (self.view, action) {
            (_, BannerAction::Prompt(selection)) => Self {
                view: BannerView::Summary,
                selection,
            },
            (_, BannerAction::Decided) => Self {
                view: BannerView::Hidden,
                ..self
            },
            (BannerView::Summary, BannerAction::Customize) => Self {
                view: BannerView::Detailed,
                ..self
            },
            (BannerView::Detailed, BannerAction::Back) => Self {
                view: BannerView::Summary,
                ..self
            },
            (BannerView::Detailed, BannerAction::Toggle(category, granted)) => Self {
                selection: self.selection.with(category, granted),
                ..self
            },
            _ => self,
        }
    }
}

impl Reducible for BannerState {
    type Action = BannerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let next = (*self).next(action);
        if next == *self {
            self
        } else {
            Rc::new(next)
        }
    }
}

const BANNER_CSS: &str = r#"
    .cookie-banner {
        position: fixed;
        bottom: 0;
        left: 0;
        right: 0;
        z-index: 1000;
        background: #0f2540;
        color: #fff;
        padding: 1.5rem 2rem;
        box-shadow: 0 -8px 24px rgba(0, 0, 0, 0.25);
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
    }
    .cookie-banner-inner {
        max-width: 960px;
        margin: 0 auto;
    }
    .cookie-banner h2 {
        font-size: 1.25rem;
        margin: 0 0 0.5rem 0;
    }
    .cookie-banner p {
        color: #c9d6e8;
        line-height: 1.5;
        margin: 0 0 1rem 0;
    }
    .cookie-banner a {
        color: #7eb2ff;
    }
    .cookie-actions {
        display: flex;
        flex-wrap: wrap;
        gap: 0.75rem;
    }
    .cookie-actions button {
        padding: 0.6rem 1.2rem;
        border-radius: 6px;
        border: 1px solid #7eb2ff;
        background: transparent;
        color: #fff;
        cursor: pointer;
        font-size: 0.95rem;
    }
    .cookie-actions button.primary {
        background: #1e90ff;
        border-color: #1e90ff;
    }
    .cookie-category {
        display: flex;
        justify-content: space-between;
        align-items: flex-start;
        gap: 1rem;
        padding: 0.75rem 0;
        border-bottom: 1px solid rgba(126, 178, 255, 0.2);
    }
    .cookie-category h3 {
        font-size: 1rem;
        margin: 0 0 0.25rem 0;
    }
    .cookie-category p {
        margin: 0;
        font-size: 0.9rem;
    }
    @media (max-width: 600px) {
        .cookie-banner {
            padding: 1rem;
        }
        .cookie-actions button {
            flex: 1 1 100%;
        }
    }
"#;

#[derive(Properties, PartialEq)]
pub struct CategoryToggleProps {
    pub category: ConsentCategory,
    pub checked: bool,
    pub on_toggle: Callback<(ConsentCategory, bool)>,
}

#[function_component]
pub fn CategoryToggle(props: &CategoryToggleProps) -> Html {
    let category = props.category;
    let onchange = {
        let on_toggle = props.on_toggle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            on_toggle.emit((category, input.checked()));
        })
    };

    html! {
        <div class="cookie-category">
            <div>
                <h3>{category.label()}</h3>
                <p>{category.description()}</p>
            </div>
            <label class="switch">
                <input
                    type="checkbox"
                    id={format!("cookie-{}", category.key())}
                    checked={props.checked || category.is_required()}
                    disabled={category.is_required()}
                    {onchange}
                />
                <span class="slider round"></span>
            </label>
        </div>
    }
}

#[function_component]
pub fn CookieConsentBanner() -> Html {
    let services = use_consent_services();
    let state = {
        let store = services.store.clone();
        use_reducer(move || {
            BannerState::initial(store.needs_renewal(), store.read().map(|r| r.preferences))
        })
    };

    // A decision or a clear made elsewhere (preferences page, another tab).
    {
        let dispatcher = state.dispatcher();
        use_effect_with_deps(
            move |services: &ConsentServices| {
                let subscription = services.store.subscribe(move |event| match event {
                    ConsentEvent::Changed(_) => dispatcher.dispatch(BannerAction::Decided),
                    ConsentEvent::Cleared => dispatcher.dispatch(BannerAction::Prompt(
                        ConsentPreferences::reject_optional(),
                    )),
                });
                move || drop(subscription)
            },
            services.clone(),
        );
    }

    let decide = {
        let services = services.clone();
        let state = state.clone();
        Callback::from(move |choice: ConsentChoice| {
            if !services.record_choice(choice) {
                log::warn!("Cookie choice could not be saved; it will be asked again next visit");
            }
            state.dispatch(BannerAction::Decided);
        })
    };

    let accept_all = decide.reform(|_: MouseEvent| ConsentChoice::AcceptAll);
    let reject_optional = decide.reform(|_: MouseEvent| ConsentChoice::RejectOptional);
    let save_selection = {
        let selection = state.selection;
        decide.reform(move |_: MouseEvent| ConsentChoice::Save(selection))
    };
    let customize = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(BannerAction::Customize))
    };
    let back = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(BannerAction::Back))
    };
    let on_toggle = {
        let state = state.clone();
        Callback::from(move |(category, granted): (ConsentCategory, bool)| {
            state.dispatch(BannerAction::Toggle(category, granted))
        })
    };

    let body = match state.view {
        BannerView::Hidden => return html! {},
        BannerView::Summary => html! {
            <>
                <h2>{"We value your privacy"}</h2>
                <p>
                    {"We use strictly necessary cookies to run this site. With your permission we would also like to use analytics, functional and third-party cookies to improve your experience. "}
                    <Link<Route> to={Route::Cookies}>{"Read our cookie policy"}</Link<Route>>
                </p>
                <div class="cookie-actions">
                    <button class="primary" onclick={accept_all}>{"Accept all"}</button>
                    <button onclick={reject_optional}>{"Reject optional"}</button>
                    <button onclick={customize}>{"Customise"}</button>
                </div>
            </>
        },
        BannerView::Detailed => html! {
            <>
                <h2>{"Cookie preferences"}</h2>
                {
                    ConsentCategory::ALL.iter().map(|category| html! {
                        <CategoryToggle
                            key={category.key()}
                            category={*category}
                            checked={state.selection.get(*category)}
                            on_toggle={on_toggle.clone()}
                        />
                    }).collect::<Html>()
                }
                <div class="cookie-actions" style="margin-top: 1rem;">
                    <button class="primary" onclick={save_selection}>{"Save preferences"}</button>
                    <button onclick={accept_all}>{"Accept all"}</button>
                    <button onclick={reject_optional}>{"Reject optional"}</button>
                    <button onclick={back}>{"Back"}</button>
                </div>
            </>
        },
    };

    html! {
        <div class="cookie-banner" role="dialog" aria-live="polite" aria-label="Cookie consent">
            <style>{BANNER_CSS}</style>
            <div class="cookie-banner-inner">
                { body }
            </div>
        </div>
    }
}
