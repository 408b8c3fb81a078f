//! DOM and Web API utility functions.
//!
//! Thin `Option`-returning wrappers so callers can chain lookups with `?`
//! instead of unwrapping every step.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get the current document.
#[inline]
pub fn document() -> Option<Document> {
    window()?.document()
}

/// Look up an element by id.
pub fn element_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

/// First element of `root` matching `selector`.
pub fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

/// First element of `document` matching `selector`.
pub fn query_document(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

/// All elements of the current document matching `selector`.
pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(list) = document().and_then(|d| d.query_selector_all(selector).ok()) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Value of `data-<key>` on the `body` of `document`.
pub fn body_data(document: &Document, key: &str) -> Option<String> {
    document.body()?.dataset().get(key)
}

// =============================================================================
// Browser Navigation
// =============================================================================

/// Current location, including query and fragment.
pub fn location_href() -> Option<String> {
    window()?.location().href().ok()
}

/// Origin of the current page (`scheme://host[:port]`).
pub fn location_origin() -> Option<String> {
    window()?.location().origin().ok()
}

/// Add a history entry for `url` without loading it.
pub fn push_state(url: &str) {
    if let Some(window) = window()
        && let Ok(history) = window.history()
    {
        let _ = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
    }
}

/// Load `url` as a regular page.
pub fn assign_location(url: &str) {
    if let Some(window) = window() {
        let _ = window.location().set_href(url);
    }
}

/// Click an element by id (opens the native file picker for file inputs).
///
/// Returns `true` if the element was found.
pub fn click_element(id: &str) -> bool {
    match element_by_id(id).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
        Some(element) => {
            element.click();
            true
        }
        None => false,
    }
}

/// `window.prompt(message, default)`; `None` when dismissed.
pub fn prompt(message: &str, default: &str) -> Option<String> {
    window()?
        .prompt_with_message_and_default(message, default)
        .ok()
        .flatten()
}

/// `navigator.language`, empty when unavailable.
pub fn browser_language() -> String {
    window()
        .and_then(|w| w.navigator().language())
        .unwrap_or_default()
}
