/// Pipeline tunables and fixed endpoints

pub const GOOGLE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const MYMEMORY_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Source language used when none is configured
pub const AUTO_SOURCE_LANG: &str = "auto";
/// Target language used when none is configured
pub const FALLBACK_TARGET_LANG: &str = "en";
/// Source language assumed by page detection when settings carry none
pub const FALLBACK_DETECTION_LANG: &str = "ko";

/// Popup closes this long after a translate request is acknowledged
pub const POPUP_CLOSE_DELAY_MS: u32 = 1500;
/// The "settings saved" notice disappears after this long
pub const SAVED_NOTICE_MS: u32 = 2000;

/// Knobs for a page translation session
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Nodes translated between progress updates
    pub batch_size: usize,
    /// Cooperative pause after each batch
    pub batch_pause_ms: u32,
    /// Lifetime of the success banner
    pub success_dismiss_ms: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            batch_size: 10,
            batch_pause_ms: 100,
            success_dismiss_ms: 3000,
        }
    }
}
