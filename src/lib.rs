use wasm_bindgen::prelude::*;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;
pub mod view_state;

pub use application::{ChartSession, RenderFrame};
pub use presentation::wasm_api::CandleChartApi;
pub use view_state::ViewState;

/// Install the browser logger, clock and panic hook.
#[wasm_bindgen(start)]
pub fn initialize() {
    console_error_panic_hook::set_once();

    let console_logger = Box::new(infrastructure::services::ConsoleLogger::new_development());
    domain::logging::init_logger(console_logger);

    let browser_time_provider = Box::new(infrastructure::services::BrowserTimeProvider::new());
    domain::logging::init_time_provider(browser_time_provider);

    crate::log_info!(
        domain::logging::LogComponent::Presentation("Initialize"),
        "candle viewport initialized"
    );
}
