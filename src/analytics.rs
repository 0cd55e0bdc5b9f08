//! Google Analytics (gtag.js) reporting, started only after analytics consent.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::config;

const GTAG_LOADER_URL: &str = "https://www.googletagmanager.com/gtag/js";

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("no browser window")]
    NoWindow,
    #[error("gtag call failed: {0}")]
    Script(String),
}

impl From<JsValue> for AnalyticsError {
    fn from(value: JsValue) -> Self {
        AnalyticsError::Script(format!("{:?}", value))
    }
}

/// The third-party analytics client as seen by [`AnalyticsReporter`].
pub trait AnalyticsClient {
    /// Starts a reporting session for `measurement_id`.
    fn load(&self, measurement_id: &str) -> Result<(), AnalyticsError>;

    /// `path` defaults to the current location.
    fn page_view(&self, measurement_id: &str, path: Option<&str>) -> Result<(), AnalyticsError>;

    fn event(&self, name: &str, params: &Value) -> Result<(), AnalyticsError>;

    fn set_disabled(&self, measurement_id: &str, disabled: bool) -> Result<(), AnalyticsError>;
}

#[wasm_bindgen(inline_js = r#"
export function install_gtag(id) {
    window.dataLayer = window.dataLayer || [];
    window.gtag = window.gtag || function () { window.dataLayer.push(arguments); };
    window.gtag('js', new Date());
    window.gtag('config', id, { anonymize_ip: true, send_page_view: false });
}
export function gtag_event(name, params) {
    window.gtag('event', name, params);
}
export function set_ga_disabled(id, disabled) {
    window['ga-disable-' + id] = disabled;
}
"#)]
extern "C" {
    #[wasm_bindgen(catch)]
    fn install_gtag(id: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn gtag_event(name: &str, params: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    fn set_ga_disabled(id: &str, disabled: bool) -> Result<(), JsValue>;
}

/// gtag.js in the page: installs the `dataLayer` shim and appends the loader
/// script to `<head>`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GtagClient;

impl AnalyticsClient for GtagClient {
    fn load(&self, measurement_id: &str) -> Result<(), AnalyticsError> {
        install_gtag(measurement_id)?;

        let document = window()
            .and_then(|w| w.document())
            .ok_or(AnalyticsError::NoWindow)?;
        let script = document.create_element("script")?;
        script.set_attribute("async", "")?;
        script.set_attribute("src", &format!("{}?id={}", GTAG_LOADER_URL, measurement_id))?;
        let head = document.head().ok_or(AnalyticsError::NoWindow)?;
        head.append_child(&script)?;
        Ok(())
    }

    fn page_view(&self, _measurement_id: &str, path: Option<&str>) -> Result<(), AnalyticsError> {
        let window = window().ok_or(AnalyticsError::NoWindow)?;
        let path = match path {
            Some(path) => path.to_string(),
            None => window.location().pathname()?,
        };
        let title = window.document().map(|d| d.title()).unwrap_or_default();
        let location = window.location().href()?;
        self.event(
            "page_view",
            &serde_json::json!({
                "page_path": path,
                "page_title": title,
                "page_location": location,
            }),
        )
    }

    fn event(&self, name: &str, params: &Value) -> Result<(), AnalyticsError> {
        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| AnalyticsError::Script(e.to_string()))?;
        gtag_event(name, params)?;
        Ok(())
    }

    fn set_disabled(&self, measurement_id: &str, disabled: bool) -> Result<(), AnalyticsError> {
        set_ga_disabled(measurement_id, disabled)?;
        Ok(())
    }
}

/// One reporting session per page. Once started it stays loaded for the life
/// of the page; withdrawing consent suppresses sending instead.
pub struct AnalyticsReporter {
    client: Rc<dyn AnalyticsClient>,
    measurement_id: Option<String>,
    initialized: Cell<bool>,
    suppressed: Cell<bool>,
}

impl AnalyticsReporter {
    pub fn new(client: Rc<dyn AnalyticsClient>, measurement_id: Option<String>) -> Self {
        Self {
            client,
            measurement_id,
            initialized: Cell::new(false),
            suppressed: Cell::new(false),
        }
    }

    pub fn browser() -> Self {
        Self::new(
            Rc::new(GtagClient),
            config::get_analytics_measurement_id().map(str::to_string),
        )
    }

    pub fn initialize(&self) {
        let Some(measurement_id) = self.measurement_id.as_deref() else {
            log::warn!("Analytics measurement id not configured; analytics disabled");
            return;
        };
        if self.initialized.get() {
            log::warn!("Analytics already initialized");
            return;
        }
        match self.client.load(measurement_id) {
            Ok(()) => {
                self.initialized.set(true);
                self.suppressed.set(false);
                log::info!("Analytics initialized");
            }
            Err(e) => log::error!("Failed to initialize analytics: {}", e),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get() && self.measurement_id.is_some()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    /// Stops sending without unloading the client.
    pub fn suppress(&self) {
        if self.suppressed.replace(true) {
            return;
        }
        if let (true, Some(measurement_id)) =
            (self.initialized.get(), self.measurement_id.as_deref())
        {
            if let Err(e) = self.client.set_disabled(measurement_id, true) {
                log::error!("Failed to disable analytics: {}", e);
            }
            log::info!("Analytics suppressed");
        }
    }

    pub fn resume(&self) {
        if !self.suppressed.replace(false) {
            return;
        }
        if let (true, Some(measurement_id)) =
            (self.initialized.get(), self.measurement_id.as_deref())
        {
            if let Err(e) = self.client.set_disabled(measurement_id, false) {
                log::error!("Failed to re-enable analytics: {}", e);
            }
            log::info!("Analytics resumed");
        }
    }

    pub fn track_page_view(&self, path: Option<&str>) {
        let Some(measurement_id) = self.ready("page view") else {
            return;
        };
        if let Err(e) = self.client.page_view(measurement_id, path) {
            log::error!("Failed to track page view: {}", e);
        }
    }

    pub fn track_event(&self, name: &str, params: Option<Value>) {
        if self.ready(name).is_none() {
            return;
        }
        let params = params.unwrap_or_else(|| Value::Object(Default::default()));
        if let Err(e) = self.client.event(name, &params) {
            log::error!("Failed to track event {}: {}", name, e);
        }
    }

    fn ready(&self, what: &str) -> Option<&str> {
        if !self.is_initialized() {
            log::warn!("Analytics not initialized; dropping {}", what);
            return None;
        }
        if self.suppressed.get() {
            log::debug!("Analytics suppressed; dropping {}", what);
            return None;
        }
        self.measurement_id.as_deref()
    }
}

#[cfg(test)]
pub mod testing {
    use super::{AnalyticsClient, AnalyticsError};
    use serde_json::Value;
    use std::cell::RefCell;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Load(String),
        PageView(Option<String>),
        Event(String, Value),
        SetDisabled(bool),
    }

    #[derive(Default)]
    pub struct RecordingClient {
        pub calls: RefCell<Vec<Call>>,
        pub fail_load: bool,
    }

    impl RecordingClient {
        pub fn loads(&self) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|call| matches!(call, Call::Load(_)))
                .count()
        }
    }

    impl AnalyticsClient for RecordingClient {
        fn load(&self, measurement_id: &str) -> Result<(), AnalyticsError> {
            if self.fail_load {
                return Err(AnalyticsError::Script("blocked by extension".to_string()));
            }
            self.calls.borrow_mut().push(Call::Load(measurement_id.to_string()));
            Ok(())
        }

        fn page_view(
            &self,
            _measurement_id: &str,
            path: Option<&str>,
        ) -> Result<(), AnalyticsError> {
            self.calls.borrow_mut().push(Call::PageView(path.map(str::to_string)));
            Ok(())
        }

        fn event(&self, name: &str, params: &Value) -> Result<(), AnalyticsError> {
            self.calls
                .borrow_mut()
                .push(Call::Event(name.to_string(), params.clone()));
            Ok(())
        }

        fn set_disabled(
            &self,
            _measurement_id: &str,
            disabled: bool,
        ) -> Result<(), AnalyticsError> {
            self.calls.borrow_mut().push(Call::SetDisabled(disabled));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{Call, RecordingClient};
    use super::*;
    use serde_json::json;

    fn reporter(id: Option<&str>) -> (Rc<RecordingClient>, AnalyticsReporter) {
        let client = Rc::new(RecordingClient::default());
        let reporter = AnalyticsReporter::new(client.clone(), id.map(str::to_string));
        (client, reporter)
    }

    #[test]
    fn second_initialize_is_a_no_op() {
        let (client, reporter) = reporter(Some("G-TEST"));
        reporter.initialize();
        reporter.initialize();

        assert!(reporter.is_initialized());
        assert_eq!(*client.calls.borrow(), vec![Call::Load("G-TEST".to_string())]);
    }

    #[test]
    fn missing_measurement_id_never_initializes() {
        let (client, reporter) = reporter(None);
        reporter.initialize();
        reporter.track_page_view(Some("/"));

        assert!(!reporter.is_initialized());
        assert!(client.calls.borrow().is_empty());
    }

    #[test]
    fn tracking_before_initialize_is_dropped() {
        let (client, reporter) = reporter(Some("G-TEST"));
        reporter.track_page_view(None);
        reporter.track_event("enquiry_submitted", None);
        assert!(client.calls.borrow().is_empty());
    }

    #[test]
    fn failed_load_leaves_reporter_uninitialized() {
        let client = Rc::new(RecordingClient {
            fail_load: true,
            ..Default::default()
        });
        let reporter = AnalyticsReporter::new(client.clone(), Some("G-TEST".to_string()));
        reporter.initialize();
        assert!(!reporter.is_initialized());
    }

    #[test]
    fn suppress_and_resume_toggle_the_client_once() {
        let (client, reporter) = reporter(Some("G-TEST"));
        reporter.initialize();
        reporter.track_event("calculator_used", Some(json!({"calculator": "pension"})));

        reporter.suppress();
        reporter.suppress();
        reporter.track_page_view(Some("/guides/isa"));
        reporter.resume();
        reporter.track_page_view(Some("/guides/isa"));

        assert_eq!(
            *client.calls.borrow(),
            vec![
                Call::Load("G-TEST".to_string()),
                Call::Event("calculator_used".to_string(), json!({"calculator": "pension"})),
                Call::SetDisabled(true),
                Call::SetDisabled(false),
                Call::PageView(Some("/guides/isa".to_string())),
            ]
        );
    }

    #[test]
    fn event_without_params_sends_empty_object() {
        let (client, reporter) = reporter(Some("G-TEST"));
        reporter.initialize();
        reporter.track_event("cta_click", None);
        assert_eq!(
            client.calls.borrow().last(),
            Some(&Call::Event("cta_click".to_string(), json!({})))
        );
    }
}
