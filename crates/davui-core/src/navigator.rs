//! In-place directory navigation.
//!
//! Following a directory link fetches the target listing page and swaps only
//! its breadcrumb and table body into the current page, keeping the header
//! and the surrounding chrome. Whenever the fetched page cannot be trusted
//! (fetch failure, non-success status, or a cache token from another server
//! instance) the browser is sent to the URL with a regular page load instead.

use crate::error::FetchError;

/// The two swappable parts of a fetched listing page.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment<N> {
    /// Token identifying the server instance that rendered the page.
    pub cache_token: Option<String>,
    /// Path / breadcrumb element.
    pub breadcrumb: N,
    /// Listing table body.
    pub listing: N,
}

/// Whether a transition adds a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// User navigation: push a new entry.
    Push,
    /// Back/forward or refresh: the entry already exists.
    Keep,
}

/// The current page, as far as navigation is concerned.
#[allow(async_fn_in_trait)]
pub trait PageHost {
    /// Element type of swapped fragments.
    type Node;

    /// Cache token of the page currently loaded.
    fn cache_token(&self) -> Option<String>;

    /// URL of the directory currently displayed (ends with `/`).
    fn directory_url(&self) -> String;

    /// Fetch and parse the listing page at `url`.
    async fn load_fragment(&self, url: &str) -> Result<Fragment<Self::Node>, FetchError>;

    fn replace_breadcrumb(&self, node: Self::Node);

    fn replace_listing_body(&self, node: Self::Node);

    fn push_history(&self, url: &str);

    /// Regular page load of `url`.
    fn full_reload(&self, url: &str);

    /// Attach interaction handlers to the freshly swapped elements.
    fn rebind_listing(&self);
}

/// Why the navigator fell back to a full page load.
#[derive(Clone, Debug, PartialEq)]
pub enum ReloadReason {
    Fetch(FetchError),
    TokenMismatch {
        page: Option<String>,
        fragment: Option<String>,
    },
}

/// Result of [`navigate`].
#[derive(Clone, Debug, PartialEq)]
pub enum NavigationOutcome {
    /// Breadcrumb and listing were replaced in place.
    Swapped,
    /// The browser was sent to the URL.
    Reloaded(ReloadReason),
}

/// Cache tokens match only when both are present and equal.
pub fn tokens_match(page: Option<&str>, fragment: Option<&str>) -> bool {
    matches!((page, fragment), (Some(a), Some(b)) if a == b)
}

/// Show the directory at `url` in place, or load it normally when the
/// fetched page is not compatible with the current one.
pub async fn navigate<H: PageHost>(host: &H, url: &str, history: HistoryMode) -> NavigationOutcome {
    let fragment = match host.load_fragment(url).await {
        Ok(fragment) => fragment,
        Err(err) => {
            tracing::warn!(%url, %err, "listing fetch failed, loading page instead");
            host.full_reload(url);
            return NavigationOutcome::Reloaded(ReloadReason::Fetch(err));
        }
    };

    let page_token = host.cache_token();
    if !tokens_match(page_token.as_deref(), fragment.cache_token.as_deref()) {
        tracing::info!(%url, "cache token changed, loading page instead");
        host.full_reload(url);
        return NavigationOutcome::Reloaded(ReloadReason::TokenMismatch {
            page: page_token,
            fragment: fragment.cache_token,
        });
    }

    if history == HistoryMode::Push {
        host.push_history(url);
    }
    host.replace_breadcrumb(fragment.breadcrumb);
    host.replace_listing_body(fragment.listing);
    host.rebind_listing();
    tracing::debug!(%url, "listing swapped in place");
    NavigationOutcome::Swapped
}
