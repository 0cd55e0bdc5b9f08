use log::Level;

#[cfg(debug_assertions)]
pub fn get_log_level() -> Level {
    Level::Debug
}

#[cfg(not(debug_assertions))]
pub fn get_log_level() -> Level {
    Level::Info
}

#[cfg(debug_assertions)]
pub fn get_analytics_measurement_id() -> Option<&'static str> {
    // Local builds only report when a dev property is set explicitly
    non_empty(option_env!("ADVISERMATCH_GA_ID_DEV"))
}

#[cfg(not(debug_assertions))]
pub fn get_analytics_measurement_id() -> Option<&'static str> {
    non_empty(option_env!("ADVISERMATCH_GA_ID"))
}

fn non_empty(value: Option<&'static str>) -> Option<&'static str> {
    value.map(str::trim).filter(|id| !id.is_empty())
}
