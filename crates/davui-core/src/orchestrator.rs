//! Sequencing a batch of files through the chunked uploader.

use std::cell::RefCell;

use crate::config::UploadConfig;
use crate::error::RequestFailure;
use crate::progress::ProgressPresenter;
use crate::upload::{DavTransport, LocalFile, upload_chunked};
use crate::url::entry_url;

/// A file of the batch that could not be uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileFailure {
    pub name: String,
    pub reason: RequestFailure,
}

impl FileFailure {
    /// Line shown in the dialog's error log.
    pub fn log_line(&self) -> String {
        format!("Upload failed({}): {}", self.reason, self.name)
    }
}

/// Outcome of a whole batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub uploaded: Vec<String>,
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Upload `files` into `directory`, one after another.
///
/// Overall progress is "bytes attempted": a file's full size is counted as
/// completed once it terminates, successfully or not, so the bar never moves
/// backwards. A failing file is logged to the presenter and the batch moves on.
pub async fn upload_all<F, T>(
    transport: &T,
    config: &UploadConfig,
    directory: &str,
    files: &[F],
    presenter: &RefCell<ProgressPresenter>,
) -> BatchReport
where
    F: LocalFile,
    T: DavTransport<Body = F::Body>,
{
    let total: u64 = files.iter().map(LocalFile::size).sum();
    let mut completed = 0u64;
    let mut report = BatchReport::default();

    for file in files {
        let name = file.name();
        let url = entry_url(directory, name);
        let result = upload_chunked(transport, config, &url, file, |uploaded| {
            presenter
                .borrow_mut()
                .update(name, total, completed + uploaded);
        })
        .await;

        match result {
            Ok(()) => report.uploaded.push(name.to_string()),
            Err(reason) => {
                let failure = FileFailure {
                    name: name.to_string(),
                    reason,
                };
                presenter.borrow_mut().log(failure.log_line());
                report.failures.push(failure);
            }
        }
        completed += file.size();
    }

    tracing::info!(
        uploaded = report.uploaded.len(),
        failed = report.failures.len(),
        bytes = total,
        "upload batch finished"
    );
    report
}
