use yew::prelude::*;

use crate::components::cookie_preferences::CookiePreferences;
use crate::consent::types::{ConsentCategory, CONSENT_MAX_AGE_MONTHS, CONSENT_POLICY_VERSION};

#[function_component]
pub fn CookiePolicy() -> Html {
    {
        use_effect_with_deps(
            move |_| {
                if let Some(window) = web_sys::window() {
                    window.scroll_to_with_x_and_y(0.0, 0.0);
                }
                || ()
            },
            (),
        );
    }

    html! {
        <div class="legal-content">
            <div>
                <h1>{"Cookie Policy"}</h1>
                <section>
                    <h2>{"What cookies are"}</h2>
                    <p>{"Cookies and similar browser storage let a website remember information about your visit. We group the ones we use into four categories and only use the optional ones when you agree."}</p>
                </section>
                <section>
                    <h2>{"Categories we use"}</h2>
                    <ul>
                        {
                            ConsentCategory::ALL.iter().map(|category| html! {
                                <li key={category.key()}>
                                    <h3>{category.label()}</h3>
                                    <p>{category.description()}</p>
                                </li>
                            }).collect::<Html>()
                        }
                    </ul>
                </section>
                <section>
                    <h2>{"How long we keep your choice"}</h2>
                    <p>{format!(
                        "We store your choice in your browser together with the date and the policy version ({}). We ask again after {} months, or sooner if this policy changes.",
                        CONSENT_POLICY_VERSION, CONSENT_MAX_AGE_MONTHS
                    )}</p>
                </section>
                <CookiePreferences />
            </div>
        </div>
    }
}
