//! Page session: the state shared by every user action.
//!
//! One [`Session`] exists per loaded page. It owns the reentrancy guard, the
//! progress presenter and the sorter, and drives the transport and the page
//! host on behalf of the page's event handlers.

use std::cell::RefCell;

use crate::config::{DEFAULT_FOLDER_NAME, UploadConfig};
use crate::guard::{Lease, ReentrancyGuard};
use crate::i18n::{I18n, keys};
use crate::listing::{Column, ListSorter, ListingTable, SortDirection};
use crate::navigator::{self, HistoryMode, NavigationOutcome, PageHost};
use crate::orchestrator::{BatchReport, upload_all};
use crate::progress::{FinishOutcome, ProgressPresenter, ProgressState};
use crate::upload::{DavTransport, LocalFile};
use crate::url::collection_url;

/// Whether `name` can be appended to the directory URL as a new collection.
fn is_valid_folder_name(name: &str) -> bool {
    !name.contains('/') && name != "." && name != ".."
}

/// How a guarded action ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Another action was running; nothing happened.
    Denied,
    /// The user backed out before anything was sent.
    Cancelled,
    /// The action ran; the dialog closed or stayed up with errors.
    Finished(FinishOutcome),
}

pub struct Session<T, H> {
    transport: T,
    host: H,
    guard: ReentrancyGuard,
    presenter: RefCell<ProgressPresenter>,
    sorter: ListSorter,
    i18n: I18n,
    config: UploadConfig,
    /// Lease held while the file picker is open.
    picker: RefCell<Option<Lease>>,
}

impl<T, H> Session<T, H>
where
    T: DavTransport,
    H: PageHost + ListingTable,
{
    pub fn new(
        transport: T,
        host: H,
        presenter: ProgressPresenter,
        sorter: ListSorter,
        i18n: I18n,
        config: UploadConfig,
    ) -> Self {
        Self {
            transport,
            host,
            guard: ReentrancyGuard::new(),
            presenter: RefCell::new(presenter),
            sorter,
            i18n,
            config,
            picker: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn guard(&self) -> &ReentrancyGuard {
        &self.guard
    }

    pub fn i18n(&self) -> I18n {
        self.i18n
    }

    /// Snapshot of the progress dialog.
    pub fn progress(&self) -> ProgressState {
        self.presenter.borrow().state().clone()
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// Take the guard for the file picker.
    ///
    /// Returns `false` when another action is running and the picker must
    /// not open. The lease stays parked until [`Session::upload_files`] or
    /// [`Session::cancel_file_picker`].
    pub fn open_file_picker(&self) -> bool {
        let mut picker = self.picker.borrow_mut();
        if picker.is_some() {
            return false;
        }
        match self.guard.try_acquire() {
            Some(lease) => {
                *picker = Some(lease);
                true
            }
            None => false,
        }
    }

    /// The picker was dismissed without a selection.
    pub fn cancel_file_picker(&self) {
        if let Some(lease) = self.picker.borrow_mut().take() {
            lease.release();
        }
    }

    /// Upload `files` into the current directory.
    pub async fn upload_files<F>(&self, files: &[F]) -> ActionOutcome
    where
        F: LocalFile<Body = T::Body>,
    {
        let parked = self.picker.borrow_mut().take();
        let Some(lease) = parked.or_else(|| self.guard.try_acquire()) else {
            return ActionOutcome::Denied;
        };
        if files.is_empty() {
            lease.release();
            return ActionOutcome::Cancelled;
        }

        self.presenter
            .borrow_mut()
            .open(self.i18n.text(keys::UPLOADING));
        let directory = self.host.directory_url();
        let report: BatchReport = upload_all(
            &self.transport,
            &self.config,
            &directory,
            files,
            &self.presenter,
        )
        .await;
        tracing::debug!(clean = report.is_clean(), "upload finished");

        ActionOutcome::Finished(self.finish(lease).await)
    }

    // =========================================================================
    // Folders
    // =========================================================================

    /// Create a folder in the current directory.
    ///
    /// `ask` receives the prompt text and the proposed name and returns the
    /// chosen name, or `None` when the user cancelled.
    pub async fn create_folder(
        &self,
        ask: impl FnOnce(&str, &str) -> Option<String>,
    ) -> ActionOutcome {
        let Some(lease) = self.guard.try_acquire() else {
            return ActionOutcome::Denied;
        };
        let answer = ask(
            self.i18n.text(keys::NEW_FOLDER_PROMPT),
            self.i18n.text(DEFAULT_FOLDER_NAME),
        );
        let Some(name) = answer.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
            lease.release();
            return ActionOutcome::Cancelled;
        };

        {
            let mut presenter = self.presenter.borrow_mut();
            presenter.open(self.i18n.text(keys::CREATING));
            presenter.update(&name, 1, 0);
        }

        if !is_valid_folder_name(&name) {
            self.presenter
                .borrow_mut()
                .log(format!("Create folder failed(invalid name): {}", name));
        } else {
            let url = collection_url(&self.host.directory_url(), &name);
            if let Err(reason) = self.transport.make_collection(&url).await {
                self.presenter
                    .borrow_mut()
                    .log(format!("Create folder failed({}): {}", reason, name));
            }
        }

        ActionOutcome::Finished(self.finish(lease).await)
    }

    /// Close the dialog (or keep it up with its errors), give the guard back
    /// and, when everything went well, reload the listing.
    async fn finish(&self, lease: Lease) -> FinishOutcome {
        let outcome = self
            .presenter
            .borrow_mut()
            .finish(self.i18n.text(keys::ERRORS_OCCURRED));
        lease.release();
        if outcome == FinishOutcome::Closed {
            self.refresh().await;
        }
        outcome
    }

    /// Take down a dialog left open with errors and reload the listing.
    pub async fn dismiss_dialog(&self) {
        if self.guard.is_held() {
            return;
        }
        self.presenter.borrow_mut().dismiss();
        self.refresh().await;
    }

    // =========================================================================
    // Listing
    // =========================================================================

    /// Sort the listing by `column`.
    ///
    /// Returns the direction applied, or `None` when another action holds the
    /// guard.
    pub fn sort(&self, column: Column, explicit: Option<SortDirection>) -> Option<SortDirection> {
        let lease = self.guard.try_acquire()?;
        let direction = self.sorter.sort(&self.host, column, explicit);
        lease.release();
        Some(direction)
    }

    /// Initial ordering: by name, ascending.
    ///
    /// Applied on start-up and after every in-place swap, whether or not an
    /// action holds the guard.
    pub fn apply_default_sort(&self) -> SortDirection {
        self.sorter
            .sort(&self.host, Column::Name, Some(SortDirection::Ascending))
    }

    /// Show the directory at `url`, in place when possible.
    pub async fn navigate(&self, url: &str, history: HistoryMode) -> NavigationOutcome {
        let outcome = navigator::navigate(&self.host, url, history).await;
        if outcome == NavigationOutcome::Swapped {
            self.apply_default_sort();
        }
        outcome
    }

    /// Reload the current directory without a new history entry.
    pub async fn refresh(&self) -> NavigationOutcome {
        let url = self.host.directory_url();
        self.navigate(&url, HistoryMode::Keep).await
    }
}
