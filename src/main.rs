use yew::prelude::*;
use yew_router::prelude::*;
use log::info;
use web_sys::MouseEvent;

mod analytics;
mod config;
mod storage;
mod consent {
    pub mod types;
    pub mod events;
    pub mod store;
    pub mod policy;
    pub mod drafts;
    pub mod gate;
    pub mod context;
    pub mod hooks;
}
mod components {
    pub mod cookie_banner;
    pub mod cookie_preferences;
}
mod pages {
    pub mod home;
    pub mod cookie_policy;
}

use components::cookie_banner::CookieConsentBanner;
use consent::context::ConsentProvider;
use consent::hooks::{use_analytics, use_consent_record};
use consent::types::ConsentCategory;
use pages::{cookie_policy::CookiePolicy, home::Home};

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/cookies")]
    Cookies,
    #[not_found]
    #[at("/404")]
    NotFound,
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home | Route::NotFound => {
            info!("Rendering Home page");
            html! { <Home /> }
        },
        Route::Cookies => {
            info!("Rendering Cookie Policy page");
            html! { <CookiePolicy /> }
        },
    }
}

#[function_component]
pub fn Nav() -> Html {
    let menu_open = use_state(|| false);

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
        })
    };

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    html! {
        <nav class="top-nav">
            <div class="nav-content">
                <Link<Route> to={Route::Home} classes="nav-logo">
                    {"AdviserMatch"}
                </Link<Route>>

                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class}>
                    <div onclick={close_menu.clone()}>
                        <Link<Route> to={Route::Home} classes="nav-link">
                            {"Find an adviser"}
                        </Link<Route>>
                    </div>
                    <div onclick={close_menu}>
                        <Link<Route> to={Route::Cookies} classes="nav-link">
                            {"Cookie settings"}
                        </Link<Route>>
                    </div>
                </div>
            </div>
        </nav>
    }
}

/// Reports a page view on navigation, and for the current page as soon as
/// analytics consent is given.
#[function_component]
fn PageViewTracker() -> Html {
    let location = use_location();
    let analytics = use_analytics();
    let record = use_consent_record();
    let granted = record
        .as_ref()
        .map_or(false, |r| r.preferences.get(ConsentCategory::Analytics));
    let path = location.map(|l| l.path().to_string()).unwrap_or_default();

    use_effect_with_deps(
        move |(path, granted): &(String, bool)| {
            if *granted {
                analytics.track_page_view(Some(path.as_str()));
            }
            || ()
        },
        (path, granted),
    );

    html! {}
}

#[function_component]
fn App() -> Html {
    html! {
        <ConsentProvider>
            <BrowserRouter>
                <Nav />
                <Switch<Route> render={switch} />
                <PageViewTracker />
                <CookieConsentBanner />
            </BrowserRouter>
        </ConsentProvider>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::get_log_level()).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
