//! Platform-independent logic of the WebDAV listing front-end.
//!
//! Everything here runs without a browser; the web crate plugs the DOM and
//! XHR in through a handful of traits.
//!
//! - [`session`] - Per-page controller tying the pieces together
//! - [`upload`] - Chunked PUT/PATCH upload of a single file
//! - [`orchestrator`] - Sequential batch upload with overall progress
//! - [`progress`] - Progress dialog state and rendering seam
//! - [`speed`] - Transfer speed smoothing and remaining-time formatting
//! - [`listing`] - Listing table sorting
//! - [`navigator`] - In-place directory navigation
//! - [`guard`] - Single-operation reentrancy guard
//! - [`i18n`] - UI string translation
//! - [`size`] - Human-readable size parsing
//! - [`url`] - Directory and entry URL helpers

pub mod config;
pub mod error;
pub mod guard;
pub mod i18n;
pub mod listing;
pub mod navigator;
pub mod orchestrator;
pub mod progress;
pub mod session;
pub mod size;
pub mod speed;
pub mod upload;
pub mod url;

pub use config::UploadConfig;
pub use error::{FetchError, RequestFailure};
pub use guard::{Lease, ReentrancyGuard};
pub use i18n::I18n;
pub use listing::{Column, EntryKind, ListSorter, ListingTable, RowView, SortDirection};
pub use navigator::{Fragment, HistoryMode, NavigationOutcome, PageHost};
pub use progress::{Clock, DialogPhase, FinishOutcome, ProgressPresenter, ProgressState, ProgressView};
pub use session::{ActionOutcome, Session};
pub use upload::{ChunkRequest, DavTransport, LocalFile};
