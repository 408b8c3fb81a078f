//! Fetching listing pages for in-place navigation.

use davui_core::FetchError;
use gloo_net::http::Request;
use web_sys::{Document, DomParser, SupportedType};

/// Fetch `url` and parse it as an HTML document.
///
/// Anything but a 2xx answer is an error; the caller falls back to a full
/// page load in every error case.
pub async fn fetch_document(url: &str) -> Result<Document, FetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(FetchError::Http(response.status()));
    }

    let text = response
        .text()
        .await
        .map_err(|_| FetchError::ResponseReadFailed)?;

    let parser =
        DomParser::new().map_err(|_| FetchError::InvalidDocument("no DOMParser".to_string()))?;
    parser
        .parse_from_string(&text, SupportedType::TextHtml)
        .map_err(|_| FetchError::InvalidDocument("unparseable HTML".to_string()))
}
