use web_sys::window;
use yew::prelude::*;

use crate::components::cookie_banner::CategoryToggle;
use crate::consent::context::ConsentChoice;
use crate::consent::hooks::{use_consent_record, use_consent_services};
use crate::consent::types::{ConsentCategory, ConsentPreferences};

/// Cookie settings on the cookie policy page. Unlike the banner this is always
/// shown and also offers clearing everything stored by the site.
#[function_component]
pub fn CookiePreferences() -> Html {
    let services = use_consent_services();
    let record = use_consent_record();
    let stored = record.as_ref().map(|r| r.preferences).unwrap_or_default();
    let selection = use_state(|| stored);
    let status = use_state(|| None::<String>);

    // Follow changes saved from the banner or another tab.
    {
        let selection = selection.clone();
        use_effect_with_deps(
            move |stored: &ConsentPreferences| {
                selection.set(*stored);
                || ()
            },
            stored,
        );
    }

    let on_toggle = {
        let selection = selection.clone();
        Callback::from(move |(category, granted): (ConsentCategory, bool)| {
            selection.set((*selection).with(category, granted));
        })
    };

    let decide = {
        let services = services.clone();
        let status = status.clone();
        Callback::from(move |choice: ConsentChoice| {
            if services.record_choice(choice) {
                status.set(Some("Your cookie preferences have been saved.".to_string()));
            } else {
                let message = "We couldn't save your preferences in this browser. Please try again.";
                status.set(Some(message.to_string()));
            }
        })
    };

    let save = {
        let selection = *selection;
        decide.reform(move |_: MouseEvent| ConsentChoice::Save(selection))
    };
    let accept_all = decide.reform(|_: MouseEvent| ConsentChoice::AcceptAll);
    let reject_optional = decide.reform(|_: MouseEvent| ConsentChoice::RejectOptional);

    let clear_all = {
        let services = services.clone();
        Callback::from(move |_: MouseEvent| {
            services.clear_all_data();
            if let Some(window) = window() {
                // Reload so scripts that already started are torn down
                let _ = window.location().reload();
            }
        })
    };

    html! {
        <section class="cookie-preferences">
            <h2>{"Manage your cookie settings"}</h2>
            {
                match &record {
                    Some(record) => html! {
                        <p class="cookie-audit">
                            {format!(
                                "Saved on {} (policy version {}).",
                                record.timestamp.format("%-d %B %Y at %H:%M UTC"),
                                record.version
                            )}
                        </p>
                    },
                    None => html! {
                        <p class="cookie-audit">{"You haven't made a choice yet. Only strictly necessary cookies are in use."}</p>
                    },
                }
            }
            {
                ConsentCategory::ALL.iter().map(|category| html! {
                    <CategoryToggle
                        key={category.key()}
                        category={*category}
                        checked={selection.get(*category)}
                        on_toggle={on_toggle.clone()}
                    />
                }).collect::<Html>()
            }
            <div class="cookie-actions" style="margin-top: 1rem;">
                <button class="primary" onclick={save}>{"Save preferences"}</button>
                <button onclick={accept_all}>{"Accept all"}</button>
                <button onclick={reject_optional}>{"Reject optional"}</button>
            </div>
            {
                if let Some(message) = (*status).as_ref() {
                    html! { <p class="cookie-status">{message}</p> }
                } else {
                    html! {}
                }
            }
            <div class="cookie-danger-zone">
                <h3>{"Clear all data"}</h3>
                <p>{"Removes your cookie choices and anything this site has saved in your browser, such as enquiry drafts. The page will reload."}</p>
                <button class="danger" onclick={clear_all}>{"Clear all data"}</button>
            </div>
        </section>
    }
}
