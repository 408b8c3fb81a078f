//! WebDAV requests over XMLHttpRequest.
//!
//! `fetch` cannot report upload progress, so chunks go through XHR. Its
//! callbacks feed an unbounded channel that the request future drains until
//! `loadend` arrives.

use davui_core::config::wire;
use davui_core::{ChunkRequest, DavTransport, LocalFile, RequestFailure};
use futures::StreamExt;
use futures::channel::mpsc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Blob, File, ProgressEvent, XmlHttpRequest};

/// A file picked through `<input type=file>`.
#[derive(Clone, Debug)]
pub struct BrowserFile {
    file: File,
    name: String,
}

impl BrowserFile {
    pub fn new(file: File) -> Self {
        let name = file.name();
        Self { file, name }
    }

    /// Files currently selected in `input`.
    pub fn selected(input: &web_sys::HtmlInputElement) -> Vec<Self> {
        let Some(list) = input.files() else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .map(Self::new)
            .collect()
    }
}

impl LocalFile for BrowserFile {
    type Body = Blob;

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.file.size() as u64
    }

    fn slice(&self, start: u64, end: u64) -> Option<Blob> {
        self.file
            .slice_with_f64_and_f64(start as f64, end as f64)
            .ok()
    }
}

enum XhrEvent {
    Progress(u64),
    End(u16),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct XhrTransport;

impl XhrTransport {
    async fn exchange(
        &self,
        method: &str,
        url: &str,
        headers: &[(&str, String)],
        body: Option<&Blob>,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), RequestFailure> {
        let xhr = XmlHttpRequest::new().map_err(|_| RequestFailure::NoConnection)?;
        xhr.open_with_async(method, url, true)
            .map_err(|_| RequestFailure::NoConnection)?;
        for (name, value) in headers {
            xhr.set_request_header(name, value)
                .map_err(|_| RequestFailure::NoConnection)?;
        }

        let (tx, mut rx) = mpsc::unbounded();

        let progress_tx = tx.clone();
        let on_upload_progress = Closure::<dyn FnMut(ProgressEvent)>::new(move |e: ProgressEvent| {
            let _ = progress_tx.unbounded_send(XhrEvent::Progress(e.loaded() as u64));
        });
        let upload = xhr.upload().ok();
        if let Some(upload) = &upload {
            upload.set_onprogress(Some(on_upload_progress.as_ref().unchecked_ref()));
        }

        let done = xhr.clone();
        let on_loadend = Closure::<dyn FnMut()>::new(move || {
            let _ = tx.unbounded_send(XhrEvent::End(done.status().unwrap_or(0)));
        });
        xhr.set_onloadend(Some(on_loadend.as_ref().unchecked_ref()));

        let sent = match body {
            Some(blob) => xhr.send_with_opt_blob(Some(blob)),
            None => xhr.send(),
        };

        let status = if sent.is_err() {
            0
        } else {
            loop {
                match rx.next().await {
                    Some(XhrEvent::Progress(loaded)) => on_progress(loaded),
                    Some(XhrEvent::End(status)) => break status,
                    None => break 0,
                }
            }
        };

        if let Some(upload) = &upload {
            upload.set_onprogress(None);
        }
        xhr.set_onloadend(None);
        drop(on_upload_progress);
        drop(on_loadend);

        tracing::trace!(%method, %url, status, "request finished");
        RequestFailure::check_status(status)
    }
}

impl DavTransport for XhrTransport {
    type Body = Blob;

    async fn send_chunk(
        &self,
        request: &ChunkRequest,
        body: Blob,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), RequestFailure> {
        self.exchange(
            request.method(),
            &request.url,
            &request.headers(),
            Some(&body),
            on_progress,
        )
        .await
    }

    async fn make_collection(&self, url: &str) -> Result<(), RequestFailure> {
        self.exchange(wire::MKCOL, url, &[], None, &mut |_| {}).await
    }
}
