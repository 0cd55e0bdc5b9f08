use gloo_timers::callback::Timeout;
use serde_json::json;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::consent::drafts::DraftFields;
use crate::consent::hooks::{use_analytics, use_consent_services};

const ENQUIRY_FORM: &str = "enquiry";
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("name", "your name"),
    ("email", "your email address"),
    ("postcode", "your postcode"),
];

const SERVICES: &[(&str, &str)] = &[
    ("Pensions & retirement", "Plan your income, consolidate old pots and understand drawdown."),
    ("Mortgages", "Find the right deal whether you are buying, remortgaging or moving."),
    ("Investments & ISAs", "Build a portfolio that matches your goals and attitude to risk."),
    ("Inheritance tax", "Protect what you leave behind with trusts, gifts and planning."),
];

fn missing_fields(fields: &DraftFields) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .filter(|(key, _)| fields.get(*key).map_or(true, |v| v.trim().is_empty()))
        .map(|(_, label)| *label)
        .collect()
}

#[function_component]
pub fn EnquiryForm() -> Html {
    let services = use_consent_services();
    let analytics = use_analytics();
    let fields = {
        let drafts = services.drafts.clone();
        use_state(move || drafts.load(ENQUIRY_FORM).unwrap_or_default())
    };
    let error = use_state(|| None::<String>);
    let submitting = use_state(|| false);
    let submitted = use_state(|| false);

    let update_field = {
        let fields = fields.clone();
        let drafts = services.drafts.clone();
        Callback::from(move |(key, value): (&'static str, String)| {
            let mut next = (*fields).clone();
            next.insert(key.to_string(), value);
            drafts.save(ENQUIRY_FORM, &next);
            fields.set(next);
        })
    };

    let on_input = |key: &'static str| {
        update_field.reform(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            (key, input.value())
        })
    };
    let on_message = update_field.reform(|e: InputEvent| {
        let input: HtmlTextAreaElement = e.target_unchecked_into();
        ("message", input.value())
    });

    let on_submit = {
        let fields = fields.clone();
        let error = error.clone();
        let submitting = submitting.clone();
        let submitted = submitted.clone();
        let drafts = services.drafts.clone();
        let analytics = analytics.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let missing = missing_fields(&fields);
            if !missing.is_empty() {
                error.set(Some(format!("Please enter {}.", missing.join(", "))));
                return;
            }
            error.set(None);
            submitting.set(true);

            // Leads are not sent anywhere yet; simulate the round trip.
            let submitting = submitting.clone();
            let submitted = submitted.clone();
            let drafts = drafts.clone();
            let analytics = analytics.clone();
            Timeout::new(800, move || {
                drafts.discard(ENQUIRY_FORM);
                analytics.track_event("enquiry_submitted", Some(json!({ "form": ENQUIRY_FORM })));
                submitting.set(false);
                submitted.set(true);
            })
            .forget();
        })
    };

    if *submitted {
        return html! {
            <div class="enquiry-success">
                <h3>{"Thank you"}</h3>
                <p>{"A member of our team will match you with a regulated adviser and be in touch within one working day."}</p>
            </div>
        };
    }

    let value = |key: &str| fields.get(key).cloned().unwrap_or_default();

    html! {
        <form class="enquiry-form" onsubmit={on_submit}>
            <h3>{"Find your adviser"}</h3>
            <input type="text" placeholder="Full name" value={value("name")} oninput={on_input("name")} />
            <input type="email" placeholder="Email address" value={value("email")} oninput={on_input("email")} />
            <input type="text" placeholder="Postcode" value={value("postcode")} oninput={on_input("postcode")} />
            <textarea placeholder="What would you like help with?" value={value("message")} oninput={on_message} />
            {
                if let Some(message) = (*error).as_ref() {
                    html! { <p class="form-error">{message}</p> }
                } else {
                    html! {}
                }
            }
            <button type="submit" disabled={*submitting}>
                { if *submitting { "Sending..." } else { "Get matched" } }
            </button>
        </form>
    }
}

#[function_component]
pub fn Home() -> Html {
    html! {
        <div class="home">
            <section class="hero">
                <h1>{"Find a trusted financial adviser near you"}</h1>
                <p>{"Tell us what you need and we'll match you with an FCA-regulated independent adviser. Free, and with no obligation."}</p>
            </section>
            <section class="services">
                <h2>{"How we can help"}</h2>
                <div class="service-grid">
                    {
                        SERVICES.iter().map(|(title, text)| html! {
                            <div class="service-card" key={*title}>
                                <h3>{*title}</h3>
                                <p>{*text}</p>
                            </div>
                        }).collect::<Html>()
                    }
                </div>
            </section>
            <section class="enquiry">
                <EnquiryForm />
            </section>
        </div>
    }
}
