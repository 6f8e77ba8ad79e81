/// Error types shared by every extension context
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranslatorError {
    #[error("network request failed: {0}")]
    Network(String),

    #[error("unexpected provider response: {0}")]
    MalformedResponse(String),

    #[error("could not build request: {0}")]
    InvalidRequest(String),

    #[error("message delivery failed: {0}")]
    Delivery(String),

    #[error("storage access failed: {0}")]
    Storage(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("page access failed: {0}")]
    Page(String),
}

impl TranslatorError {
    /// Short, stable name used as the `kind` field in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            TranslatorError::Network(_) => "network",
            TranslatorError::MalformedResponse(_) => "malformed_response",
            TranslatorError::InvalidRequest(_) => "invalid_request",
            TranslatorError::Delivery(_) => "delivery",
            TranslatorError::Storage(_) => "storage",
            TranslatorError::Serialization(_) => "serialization",
            TranslatorError::Page(_) => "page",
        }
    }
}

impl From<serde_wasm_bindgen::Error> for TranslatorError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        TranslatorError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TranslatorError>;

/// Render a thrown JS value for inclusion in an error message
pub(crate) fn describe_js(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = TranslatorError::Delivery("Receiving end does not exist.".to_string());
        assert_eq!(
            err.to_string(),
            "message delivery failed: Receiving end does not exist."
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TranslatorError::Network(String::new()).kind(), "network");
        assert_eq!(TranslatorError::Page(String::new()).kind(), "page");
        assert_eq!(
            TranslatorError::MalformedResponse(String::new()).kind(),
            "malformed_response"
        );
    }
}
