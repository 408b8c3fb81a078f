//! Progress dialog overlay.
//!
//! Renders the presenter's [`ProgressState`] with the element ids the
//! server stylesheet targets. The presenter pushes each snapshot into a
//! signal through [`SignalView`].

use davui_core::{DialogPhase, ProgressState, ProgressView};
use leptos::prelude::*;
use web_sys::HtmlElement;

use crate::config::dialog_ids as ids;

/// [`ProgressView`] writing snapshots into a Leptos signal.
#[derive(Clone, Copy)]
pub struct SignalView {
    state: RwSignal<ProgressState>,
}

impl SignalView {
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(ProgressState::default()),
        }
    }

    pub fn state(&self) -> RwSignal<ProgressState> {
        self.state
    }
}

impl Default for SignalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressView for SignalView {
    fn render(&self, state: &ProgressState) {
        self.state.set(state.clone());
    }
}

/// Modal progress dialog.
///
/// While running it shows the item being processed, a bar, the percentage
/// and the remaining time. After a failed operation only the title, the
/// error log and a close button remain.
#[component]
pub fn ProgressDialog(
    state: RwSignal<ProgressState>,
    close_label: &'static str,
    on_close: Callback<()>,
) -> impl IntoView {
    let visible = move || state.with(|s| s.phase != DialogPhase::Hidden);
    let running = move || state.with(|s| s.phase == DialogPhase::Running);
    let failed = move || state.with(|s| s.phase == DialogPhase::Failed);
    let has_log = move || state.with(|s| !s.log.is_empty());

    let title = move || state.with(|s| s.title.clone());
    let description = move || state.with(|s| s.description.clone());
    let width = move || state.with(|s| format!("{}%", s.fraction * 100.0));
    let percent = move || state.with(|s| format!("{}%", s.percent));
    let eta = move || state.with(|s| s.eta.clone());
    let log = move || state.with(|s| s.log.join("\n"));

    view! {
        <Show when=visible>
            <div id=ids::BACKGROUND>
                <div id=ids::DIALOG class="dialog column">
                    <div class="row">
                        <h1 id=ids::TITLE>{title}</h1>
                        <Show when=running>
                            <h1 id=ids::DESCRIPTION>{description}</h1>
                        </Show>
                    </div>
                    <Show when=running>
                        <div id=ids::BAR>
                            <div id=ids::BAR_VALUE style:width=width></div>
                        </div>
                        <div class="row row-separation">
                            <p id=ids::PERCENT>{percent}</p>
                            <p id=ids::ETA>{eta}</p>
                        </div>
                    </Show>
                    <Show when=has_log>
                        <p id=ids::LOGGER style="color: red; white-space: pre-line">{log}</p>
                    </Show>
                    <Show when=failed>
                        <button on:click=move |_| on_close.run(())>{close_label}</button>
                    </Show>
                </div>
            </div>
        </Show>
    }
}

/// Mount the dialog into `host` for the lifetime of the page.
pub fn mount_dialog(
    host: HtmlElement,
    signal_view: SignalView,
    close_label: &'static str,
    on_close: Callback<()>,
) {
    let state = signal_view.state();
    leptos::mount::mount_to(host, move || {
        view! { <ProgressDialog state=state close_label=close_label on_close=on_close /> }
    })
    .forget();
}
