/// Translation providers and the fallback chain over them

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::{GOOGLE_ENDPOINT, MYMEMORY_ENDPOINT};
use crate::error::{Result, TranslatorError};
use crate::logging::log_swallowed;
use std::rc::Rc;

/// Minimal HTTP access needed by the providers
#[async_trait(?Send)]
pub trait HttpClient {
    /// GET `url` and decode the body as JSON
    async fn get_json(&self, url: &Url) -> Result<Value>;
}

#[async_trait(?Send)]
pub trait TranslationProvider {
    fn name(&self) -> &'static str;

    /// Translate `text`; an empty or missing result is an error
    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Result<String>;
}

/// Unofficial Google Translate endpoint
pub struct GoogleProvider {
    http: Rc<dyn HttpClient>,
}

impl GoogleProvider {
    pub fn new(http: Rc<dyn HttpClient>) -> Self {
        GoogleProvider { http }
    }

    pub fn request_url(text: &str, from_lang: &str, to_lang: &str) -> Result<Url> {
        Url::parse_with_params(
            GOOGLE_ENDPOINT,
            &[
                ("client", "gtx"),
                ("sl", from_lang),
                ("tl", to_lang),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| TranslatorError::InvalidRequest(e.to_string()))
    }

    /// Translated text lives at `[0][0][0]`; only the first segment is used
    pub fn parse_response(body: &Value) -> Option<String> {
        body.get(0)
            .and_then(|segments| segments.get(0))
            .and_then(|segment| segment.get(0))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

#[async_trait(?Send)]
impl TranslationProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Result<String> {
        let url = Self::request_url(text, from_lang, to_lang)?;
        let body = self.http.get_json(&url).await?;
        Self::parse_response(&body).ok_or_else(|| {
            TranslatorError::MalformedResponse("missing [0][0][0] in google response".to_string())
        })
    }
}

/// MyMemory public endpoint
pub struct MyMemoryProvider {
    http: Rc<dyn HttpClient>,
}

impl MyMemoryProvider {
    pub fn new(http: Rc<dyn HttpClient>) -> Self {
        MyMemoryProvider { http }
    }

    pub fn request_url(text: &str, from_lang: &str, to_lang: &str) -> Result<Url> {
        let lang_pair = format!("{}|{}", from_lang, to_lang);
        Url::parse_with_params(MYMEMORY_ENDPOINT, &[("q", text), ("langpair", &lang_pair)])
            .map_err(|e| TranslatorError::InvalidRequest(e.to_string()))
    }

    pub fn parse_response(body: &Value) -> Option<String> {
        body.get("responseData")
            .and_then(|data| data.get("translatedText"))
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

#[async_trait(?Send)]
impl TranslationProvider for MyMemoryProvider {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> Result<String> {
        let url = Self::request_url(text, from_lang, to_lang)?;
        let body = self.http.get_json(&url).await?;
        Self::parse_response(&body).ok_or_else(|| {
            TranslatorError::MalformedResponse(
                "missing responseData.translatedText in mymemory response".to_string(),
            )
        })
    }
}

/// Ordered providers tried one after another until one succeeds
pub struct ProviderChain {
    providers: Vec<Box<dyn TranslationProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn TranslationProvider>>) -> Self {
        ProviderChain { providers }
    }

    /// Google first, MyMemory as fallback, both over the same client
    pub fn public(http: Rc<dyn HttpClient>) -> Self {
        Self::new(vec![
            Box::new(GoogleProvider::new(http.clone())),
            Box::new(MyMemoryProvider::new(http)),
        ])
    }

    /// Never fails: when every provider does, the input comes back unchanged
    pub async fn translate(&self, text: &str, from_lang: &str, to_lang: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        for provider in &self.providers {
            match provider.translate(text, from_lang, to_lang).await {
                Ok(translated) => return translated,
                Err(e) => log_swallowed(&format!("provider.{}", provider.name()), &e),
            }
        }

        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedHttp, ScriptedProvider};
    use futures::executor::block_on;
    use serde_json::json;

    fn query(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_google_request_url() {
        let url = GoogleProvider::request_url("안녕 세상 & more", "ko", "en").unwrap();

        assert!(url.as_str().starts_with(GOOGLE_ENDPOINT));
        assert_eq!(query(&url, "client").as_deref(), Some("gtx"));
        assert_eq!(query(&url, "sl").as_deref(), Some("ko"));
        assert_eq!(query(&url, "tl").as_deref(), Some("en"));
        assert_eq!(query(&url, "dt").as_deref(), Some("t"));
        assert_eq!(query(&url, "q").as_deref(), Some("안녕 세상 & more"));
    }

    #[test]
    fn test_mymemory_request_url() {
        let url = MyMemoryProvider::request_url("Hello", "auto", "fr").unwrap();

        assert!(url.as_str().starts_with(MYMEMORY_ENDPOINT));
        assert_eq!(query(&url, "q").as_deref(), Some("Hello"));
        assert_eq!(query(&url, "langpair").as_deref(), Some("auto|fr"));
    }

    #[test]
    fn test_google_parse_response() {
        let body = json!([[["Hello", "안녕", null, null, 10]], null, "ko"]);
        assert_eq!(GoogleProvider::parse_response(&body), Some("Hello".to_string()));
    }

    #[test]
    fn test_google_parse_response_missing_or_empty() {
        assert_eq!(GoogleProvider::parse_response(&json!(null)), None);
        assert_eq!(GoogleProvider::parse_response(&json!([])), None);
        assert_eq!(GoogleProvider::parse_response(&json!([[]])), None);
        assert_eq!(GoogleProvider::parse_response(&json!([[[""]]])), None);
        assert_eq!(GoogleProvider::parse_response(&json!({"error": "quota"})), None);
    }

    #[test]
    fn test_mymemory_parse_response() {
        let body = json!({"responseData": {"translatedText": "Bonjour", "match": 1}});
        assert_eq!(MyMemoryProvider::parse_response(&body), Some("Bonjour".to_string()));
        assert_eq!(MyMemoryProvider::parse_response(&json!({"responseData": {}})), None);
        assert_eq!(MyMemoryProvider::parse_response(&json!([1, 2])), None);
    }

    #[test]
    fn test_google_provider_uses_http_client() {
        let http = Rc::new(ScriptedHttp::new(|_| Ok(json!([[["World"]]]))));
        let provider = GoogleProvider::new(http.clone());

        let result = block_on(provider.translate("세계", "ko", "en"));

        assert_eq!(result, Ok("World".to_string()));
        assert_eq!(http.requests().len(), 1);
    }

    #[test]
    fn test_google_provider_reports_malformed_body() {
        let http = Rc::new(ScriptedHttp::new(|_| Ok(json!({"unexpected": true}))));
        let provider = GoogleProvider::new(http);

        let result = block_on(provider.translate("세계", "ko", "en"));

        assert!(matches!(result, Err(TranslatorError::MalformedResponse(_))));
    }

    #[test]
    fn test_chain_returns_first_success() {
        let first = ScriptedProvider::new("a", |text| Ok(format!("A:{}", text)));
        let second = ScriptedProvider::new("b", |text| Ok(format!("B:{}", text)));
        let second_calls = second.calls();
        let chain = ProviderChain::new(vec![Box::new(first), Box::new(second)]);

        let result = block_on(chain.translate("Hallo", "de", "en"));

        assert_eq!(result, "A:Hallo");
        assert!(second_calls.borrow().is_empty());
    }

    #[test]
    fn test_chain_falls_back_with_same_arguments() {
        let first = ScriptedProvider::new("a", |_| {
            Err(TranslatorError::Network("offline".to_string()))
        });
        let second = ScriptedProvider::new("b", |text| Ok(format!("B:{}", text)));
        let first_calls = first.calls();
        let second_calls = second.calls();
        let chain = ProviderChain::new(vec![Box::new(first), Box::new(second)]);

        let result = block_on(chain.translate("Hallo", "de", "en"));

        assert_eq!(result, "B:Hallo");
        assert_eq!(*first_calls.borrow(), *second_calls.borrow());
        assert_eq!(
            second_calls.borrow()[0],
            ("Hallo".to_string(), "de".to_string(), "en".to_string())
        );
    }

    #[test]
    fn test_chain_returns_original_when_all_fail() {
        let failing = |_: &str| Err(TranslatorError::MalformedResponse("empty".to_string()));
        let chain = ProviderChain::new(vec![
            Box::new(ScriptedProvider::new("a", failing)),
            Box::new(ScriptedProvider::new("b", failing)),
        ]);

        assert_eq!(block_on(chain.translate("Hallo", "de", "en")), "Hallo");
    }

    #[test]
    fn test_chain_skips_blank_input() {
        let provider = ScriptedProvider::new("a", |text| Ok(format!("A:{}", text)));
        let calls = provider.calls();
        let chain = ProviderChain::new(vec![Box::new(provider)]);

        assert_eq!(block_on(chain.translate("   ", "de", "en")), "   ");
        assert_eq!(block_on(chain.translate("", "de", "en")), "");
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn test_public_chain_falls_back_to_mymemory() {
        let http = Rc::new(ScriptedHttp::new(|url: &Url| {
            if url.as_str().starts_with(GOOGLE_ENDPOINT) {
                Err(TranslatorError::Network("HTTP 429".to_string()))
            } else {
                Ok(json!({"responseData": {"translatedText": "Good morning"}}))
            }
        }));
        let chain = ProviderChain::public(http.clone());

        let result = block_on(chain.translate("좋은 아침", "ko", "en"));

        assert_eq!(result, "Good morning");
        let requests = http.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].as_str().starts_with(GOOGLE_ENDPOINT));
        assert!(requests[1].as_str().starts_with(MYMEMORY_ENDPOINT));
    }
}
