/// Logger setup and the single sink for failures that are deliberately swallowed
use crate::error::TranslatorError;

pub const LOG_TARGET: &str = "page_translator";

/// Route the `log` facade to the browser console
pub fn init() {
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
}

/// Record a failure that is handled by degrading rather than propagating.
///
/// Every delivery, provider, storage and page failure that the extension
/// recovers from ends up here, so the console shows one consistent line per
/// swallowed error: `[context] kind: message`.
pub fn log_swallowed(context: &str, err: &TranslatorError) {
    log::warn!(target: LOG_TARGET, "[{}] {}: {}", context, err.kind(), err);
}
