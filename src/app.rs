//! Page wiring.
//!
//! Builds the [`Session`] for the loaded listing page and connects it to the
//! document: header clicks sort, directory links navigate in place, the
//! back/forward buttons re-render the listing, and the server-rendered
//! buttons reach the session through functions installed on `window`.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use davui_core::i18n::keys;
use davui_core::url::is_directory_link;
use davui_core::{
    Column, HistoryMode, I18n, ListSorter, PageHost, ProgressPresenter, Session, SortDirection,
    UploadConfig,
};
use leptos::prelude::Callback;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, MouseEvent};

use crate::components::{SignalView, mount_dialog};
use crate::config::{DIALOG_HOST_ID, FILE_INPUT_ID, TRANSLATE_ATTR, globals, header_id};
use crate::utils::clock::PerformanceClock;
use crate::utils::dom;
use crate::utils::page::{DomPage, locale_collation};
use crate::utils::transport::{BrowserFile, XhrTransport};

pub type WebSession = Session<XhrTransport, DomPage>;

thread_local! {
    static SESSION: RefCell<Option<Rc<WebSession>>> = const { RefCell::new(None) };
}

/// The session of this page, once [`start`] ran.
pub fn session() -> Option<Rc<WebSession>> {
    SESSION.with(|s| s.borrow().clone())
}

/// Run an async session action on the page's event loop.
fn spawn_with_session<F, Fut>(action: F)
where
    F: FnOnce(Rc<WebSession>) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    match session() {
        Some(session) => spawn_local(action(session)),
        None => tracing::warn!("page event before start-up finished"),
    }
}

// =============================================================================
// Start-up
// =============================================================================

/// Start once the document is parsed.
pub fn start_when_ready() {
    let Some(document) = dom::document() else {
        tracing::error!("no document");
        return;
    };
    let loading = js_sys::Reflect::get(&document, &"readyState".into())
        .ok()
        .and_then(|v| v.as_string())
        .is_some_and(|state| state == "loading");

    if !loading {
        start(document);
        return;
    }

    let ready = document.clone();
    let closure = Closure::once_into_js(move || start(ready));
    let _ = document.add_event_listener_with_callback("DOMContentLoaded", closure.unchecked_ref());
}

fn start(document: Document) {
    let i18n = I18n::for_language(&dom::browser_language());
    translate_page(i18n);

    let view = SignalView::new();
    match dialog_host(&document) {
        Some(host) => mount_dialog(
            host,
            view,
            i18n.text(keys::CLOSE),
            Callback::new(|_| spawn_with_session(|s| async move { s.dismiss_dialog().await })),
        ),
        None => tracing::error!("cannot mount the progress dialog"),
    }
    let presenter = ProgressPresenter::new(
        Box::new(view),
        Rc::new(PerformanceClock),
        i18n.text(keys::MORE_THAN_ONE_DAY),
    );

    let link_handler = Closure::<dyn FnMut(MouseEvent)>::new(on_link_click);
    let session = Rc::new(Session::new(
        XhrTransport,
        DomPage::new(document, link_handler),
        presenter,
        ListSorter::new(locale_collation),
        i18n,
        UploadConfig::default(),
    ));
    SESSION.with(|s| *s.borrow_mut() = Some(session.clone()));

    session.host().rebind_listing();
    bind_headers();
    bind_file_input();
    bind_history();
    install_globals();
    session.apply_default_sort();

    tracing::info!(language = %dom::browser_language(), "listing page ready");
}

/// Translate `[data-t]` elements in place.
fn translate_page(i18n: I18n) {
    for element in dom::query_all(&format!("[{}]", TRANSLATE_ATTR)) {
        let text = element.text_content().unwrap_or_default();
        if let Some(translated) = i18n.translate(text.trim()) {
            element.set_text_content(Some(translated));
        }
        let _ = element.remove_attribute(TRANSLATE_ATTR);
    }
}

fn dialog_host(document: &Document) -> Option<HtmlElement> {
    let host = document.create_element("div").ok()?;
    host.set_id(DIALOG_HOST_ID);
    let parent = dom::query_document(document, "main").or_else(|| document.body().map(Into::into))?;
    parent.append_child(&host).ok()?;
    host.dyn_into::<HtmlElement>().ok()
}

// =============================================================================
// Event Binding
// =============================================================================

/// Keep the closure alive for the lifetime of the page.
fn listen(target: &web_sys::EventTarget, event: &str, handler: Closure<dyn FnMut(web_sys::Event)>) {
    let _ = target.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref());
    handler.forget();
}

fn bind_headers() {
    for column in Column::ALL {
        let Some(header) = dom::element_by_id(&header_id(column.key())) else {
            tracing::warn!(column = column.key(), "missing column header");
            continue;
        };
        let _ = header.set_attribute("style", "cursor: pointer");
        listen(
            &header,
            "click",
            Closure::new(move |_: web_sys::Event| {
                if let Some(session) = session() {
                    session.sort(column, None);
                }
            }),
        );
    }
}

fn file_input() -> Option<HtmlInputElement> {
    dom::element_by_id(FILE_INPUT_ID)?.dyn_into().ok()
}

fn bind_file_input() {
    let Some(input) = file_input() else {
        tracing::debug!("no file input, uploads disabled");
        return;
    };
    listen(
        &input,
        "cancel",
        Closure::new(|_: web_sys::Event| {
            if let Some(session) = session() {
                session.cancel_file_picker();
            }
        }),
    );
}

fn bind_history() {
    let Some(window) = dom::window() else {
        return;
    };
    listen(
        &window,
        "popstate",
        Closure::new(|_: web_sys::Event| {
            let Some(href) = dom::location_href() else {
                return;
            };
            spawn_with_session(|s| async move {
                s.navigate(&href, HistoryMode::Keep).await;
            });
        }),
    );
}

/// Directory links are followed in place; everything else is left to the
/// browser.
fn on_link_click(event: MouseEvent) {
    if event.default_prevented()
        || event.button() != 0
        || event.ctrl_key()
        || event.meta_key()
        || event.shift_key()
        || event.alt_key()
    {
        return;
    }
    let Some(anchor) = event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|e| e.closest("a").ok().flatten())
    else {
        return;
    };
    if anchor.has_attribute("target") || anchor.has_attribute("download") {
        return;
    }
    let Some(href) = anchor.get_attribute("href") else {
        return;
    };
    let origin = dom::location_origin().unwrap_or_default();
    if !is_directory_link(&href, &origin) {
        return;
    }

    event.prevent_default();
    spawn_with_session(|s| async move {
        s.navigate(&href, HistoryMode::Push).await;
    });
}

// =============================================================================
// Page-callable Globals
// =============================================================================

fn install_global(name: &str, function: &JsValue) {
    let Some(window) = dom::window() else {
        return;
    };
    if js_sys::Reflect::set(&window, &name.into(), function).is_err() {
        tracing::warn!(%name, "cannot install global");
    }
}

fn install_globals() {
    let open = Closure::<dyn Fn()>::new(|| {
        let Some(session) = session() else {
            return;
        };
        if session.open_file_picker() && !dom::click_element(FILE_INPUT_ID) {
            session.cancel_file_picker();
        }
    });
    install_global(globals::OPEN_FILE_INPUT, open.as_ref());
    open.forget();

    let upload = Closure::<dyn Fn()>::new(|| {
        let files = file_input()
            .map(|input| BrowserFile::selected(&input))
            .unwrap_or_default();
        spawn_with_session(|s| async move {
            s.upload_files(&files).await;
            if let Some(input) = file_input() {
                input.set_value("");
            }
        });
    });
    install_global(globals::UPLOAD_FILES, upload.as_ref());
    upload.forget();

    let new_folder = Closure::<dyn Fn()>::new(|| {
        spawn_with_session(|s| async move {
            s.create_folder(dom::prompt).await;
        });
    });
    install_global(globals::NEW_FOLDER, new_folder.as_ref());
    new_folder.forget();

    let sort = Closure::<dyn Fn(JsValue, JsValue)>::new(|field: JsValue, factor: JsValue| {
        let Some(column) = field.as_string().as_deref().and_then(Column::from_key) else {
            tracing::warn!(?field, "unknown sort field");
            return;
        };
        let explicit = factor.as_f64().map(|f| {
            if f < 0.0 {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            }
        });
        if let Some(session) = session() {
            session.sort(column, explicit);
        }
    });
    install_global(globals::SORT, sort.as_ref());
    sort.forget();
}
