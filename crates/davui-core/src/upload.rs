//! Chunked file upload over WebDAV.
//!
//! A file is sent as a sequence of fixed-size chunks: the first one creates
//! (or overwrites) the remote file with PUT, every following one is appended
//! with a sabredav partial-update PATCH at its exact byte offset. Chunks go
//! out strictly one after another; a failed chunk is retried in place a
//! bounded number of times before the whole file is given up.

use crate::config::{UploadConfig, wire};
use crate::error::RequestFailure;

// =============================================================================
// Seams
// =============================================================================

/// A local file selected for upload.
pub trait LocalFile {
    /// Request body produced by slicing.
    type Body;

    fn name(&self) -> &str;

    fn size(&self) -> u64;

    /// Bytes `start..end` of the file.
    fn slice(&self, start: u64, end: u64) -> Option<Self::Body>;
}

/// Issues the mutating WebDAV requests.
///
/// Implementations resolve to `Ok(())` only for a 2xx answer.
#[allow(async_fn_in_trait)]
pub trait DavTransport {
    type Body;

    /// Send one chunk, reporting bytes of `body` handed to the network so far.
    async fn send_chunk(
        &self,
        request: &ChunkRequest,
        body: Self::Body,
        on_progress: &mut dyn FnMut(u64),
    ) -> Result<(), RequestFailure>;

    /// Create the collection at `url` (MKCOL).
    async fn make_collection(&self, url: &str) -> Result<(), RequestFailure>;
}

// =============================================================================
// Requests
// =============================================================================

/// How a chunk is written on the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkWrite {
    /// First chunk: create or overwrite the file.
    Create,
    /// Later chunks: write starting at `offset`.
    Append { offset: u64 },
}

/// One chunk request: where it goes, how it writes, how long it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRequest {
    pub url: String,
    pub write: ChunkWrite,
    pub len: u64,
}

impl ChunkRequest {
    pub fn method(&self) -> &'static str {
        match self.write {
            ChunkWrite::Create => "PUT",
            ChunkWrite::Append { .. } => "PATCH",
        }
    }

    /// Headers carrying the write mode.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self.write {
            ChunkWrite::Create => vec![(
                wire::OVERWRITE_HEADER,
                wire::OVERWRITE_ALLOWED.to_string(),
            )],
            ChunkWrite::Append { offset } => vec![
                ("Content-Type", wire::PARTIAL_UPDATE_TYPE.to_string()),
                (wire::UPDATE_RANGE_HEADER, format!("bytes={}-", offset)),
            ],
        }
    }
}

/// Number of requests needed for `size` bytes; an empty file still takes one.
pub fn chunk_count(size: u64, chunk_size: u64) -> u64 {
    size.div_ceil(chunk_size).max(1)
}

// =============================================================================
// Upload State Machine
// =============================================================================

/// Transfer state of one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTask {
    size: u64,
    chunk_size: u64,
    retry_max: u32,
    /// Chunk being sent (0-based).
    pub chunk_index: u64,
    /// Failed attempts of the current chunk.
    pub retries: u32,
    /// Bytes confirmed by the server.
    pub acknowledged: u64,
}

/// What to do after a chunk attempt finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Send the chunk at the current index (next chunk or same chunk again).
    Send,
    /// All chunks were acknowledged.
    Done,
    /// The current chunk ran out of retries.
    Failed(RequestFailure),
}

impl UploadTask {
    pub fn new(size: u64, config: &UploadConfig) -> Self {
        Self {
            size,
            chunk_size: config.chunk_size.max(1),
            retry_max: config.retry_max,
            chunk_index: 0,
            retries: 0,
            acknowledged: 0,
        }
    }

    /// Byte offset of the current chunk.
    pub fn offset(&self) -> u64 {
        self.chunk_index * self.chunk_size
    }

    /// Byte range of the current chunk.
    pub fn range(&self) -> (u64, u64) {
        let start = self.offset().min(self.size);
        (start, (start + self.chunk_size).min(self.size))
    }

    pub fn is_last_chunk(&self) -> bool {
        self.chunk_index + 1 >= chunk_count(self.size, self.chunk_size)
    }

    /// Request for the current chunk of the file at `url`.
    pub fn request(&self, url: &str) -> ChunkRequest {
        let (start, end) = self.range();
        let write = if self.chunk_index == 0 {
            ChunkWrite::Create
        } else {
            ChunkWrite::Append { offset: start }
        };
        ChunkRequest {
            url: url.to_string(),
            write,
            len: end - start,
        }
    }

    /// Advance with the outcome of the current chunk.
    pub fn complete(&mut self, outcome: Result<(), RequestFailure>) -> Step {
        match outcome {
            Ok(()) => {
                self.acknowledged = self.range().1;
                if self.is_last_chunk() {
                    return Step::Done;
                }
                self.chunk_index += 1;
                self.retries = 0;
                Step::Send
            }
            Err(failure) if self.retries >= self.retry_max => Step::Failed(failure),
            Err(failure) => {
                self.retries += 1;
                tracing::debug!(
                    chunk = self.chunk_index,
                    retry = self.retries,
                    %failure,
                    "retrying chunk"
                );
                Step::Send
            }
        }
    }
}

/// Upload `file` to `url` chunk by chunk.
///
/// `on_progress` receives cumulative bytes for this file. It never goes
/// backwards, even when a chunk is retried after partial progress.
pub async fn upload_chunked<F, T>(
    transport: &T,
    config: &UploadConfig,
    url: &str,
    file: &F,
    mut on_progress: impl FnMut(u64),
) -> Result<(), RequestFailure>
where
    F: LocalFile,
    T: DavTransport<Body = F::Body>,
{
    let mut task = UploadTask::new(file.size(), config);
    let mut reported = 0u64;

    loop {
        let request = task.request(url);
        let (start, end) = task.range();
        let outcome = match file.slice(start, end) {
            Some(body) => {
                let mut report = |loaded: u64| {
                    let position = start + loaded.min(request.len);
                    if position > reported {
                        reported = position;
                        on_progress(position);
                    }
                };
                transport.send_chunk(&request, body, &mut report).await
            }
            None => Err(RequestFailure::UnreadableFile),
        };

        match task.complete(outcome) {
            Step::Send => {}
            Step::Done => {
                if task.acknowledged > reported {
                    on_progress(task.acknowledged);
                }
                return Ok(());
            }
            Step::Failed(failure) => return Err(failure),
        }

        if task.acknowledged > reported {
            reported = task.acknowledged;
            on_progress(reported);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// In-memory file; bodies are the sliced bytes.
    #[derive(Clone, Debug)]
    pub struct MemoryFile {
        pub name: String,
        pub data: Vec<u8>,
    }

    impl MemoryFile {
        pub fn new(name: &str, size: usize) -> Self {
            Self {
                name: name.to_string(),
                data: (0..size).map(|i| i as u8).collect(),
            }
        }
    }

    impl LocalFile for MemoryFile {
        type Body = Vec<u8>;

        fn name(&self) -> &str {
            &self.name
        }

        fn size(&self) -> u64 {
            self.data.len() as u64
        }

        fn slice(&self, start: u64, end: u64) -> Option<Vec<u8>> {
            self.data.get(start as usize..end as usize).map(<[u8]>::to_vec)
        }
    }

    /// A request as the fake server saw it.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct Seen {
        pub method: &'static str,
        pub url: String,
        pub headers: Vec<(&'static str, String)>,
        pub body: Vec<u8>,
    }

    /// Transport answering from a script (default: success) and recording
    /// every request. Progress is reported in two halves.
    #[derive(Default)]
    pub struct ScriptedTransport {
        pub answers: RefCell<VecDeque<Result<(), RequestFailure>>>,
        pub seen: RefCell<Vec<Seen>>,
    }

    impl ScriptedTransport {
        pub fn answering(answers: Vec<Result<(), RequestFailure>>) -> Self {
            Self {
                answers: RefCell::new(answers.into()),
                seen: RefCell::default(),
            }
        }

        fn next_answer(&self) -> Result<(), RequestFailure> {
            self.answers.borrow_mut().pop_front().unwrap_or(Ok(()))
        }

        pub fn methods(&self) -> Vec<&'static str> {
            self.seen.borrow().iter().map(|s| s.method).collect()
        }
    }

    impl DavTransport for ScriptedTransport {
        type Body = Vec<u8>;

        async fn send_chunk(
            &self,
            request: &ChunkRequest,
            body: Vec<u8>,
            on_progress: &mut dyn FnMut(u64),
        ) -> Result<(), RequestFailure> {
            let len = body.len() as u64;
            self.seen.borrow_mut().push(Seen {
                method: request.method(),
                url: request.url.clone(),
                headers: request.headers(),
                body,
            });
            on_progress(len / 2);
            let answer = self.next_answer();
            if answer.is_ok() {
                on_progress(len);
            }
            answer
        }

        async fn make_collection(&self, url: &str) -> Result<(), RequestFailure> {
            self.seen.borrow_mut().push(Seen {
                method: wire::MKCOL,
                url: url.to_string(),
                headers: Vec::new(),
                body: Vec::new(),
            });
            self.next_answer()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{MemoryFile, ScriptedTransport};
    use super::*;

    const SMALL: UploadConfig = UploadConfig {
        chunk_size: 4,
        retry_max: 3,
    };

    async fn run(
        transport: &ScriptedTransport,
        file: &MemoryFile,
    ) -> (Result<(), RequestFailure>, Vec<u64>) {
        let mut progress = Vec::new();
        let result = upload_chunked(transport, &SMALL, "http://h/d/f", file, |p| {
            progress.push(p)
        })
        .await;
        (result, progress)
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 4), 1);
        assert_eq!(chunk_count(1, 4), 1);
        assert_eq!(chunk_count(4, 4), 1);
        assert_eq!(chunk_count(5, 4), 2);
        assert_eq!(chunk_count(12, 4), 3);
    }

    #[test]
    fn test_request_headers() {
        let create = ChunkRequest {
            url: "u".into(),
            write: ChunkWrite::Create,
            len: 4,
        };
        assert_eq!(create.method(), "PUT");
        assert_eq!(create.headers(), vec![("Overwrite", "T".to_string())]);

        let append = ChunkRequest {
            url: "u".into(),
            write: ChunkWrite::Append { offset: 67108864 },
            len: 4,
        };
        assert_eq!(append.method(), "PATCH");
        assert_eq!(
            append.headers(),
            vec![
                (
                    "Content-Type",
                    "application/x-sabredav-partialupdate".to_string()
                ),
                ("X-Update-Range", "bytes=67108864-".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_request_count_matches_chunks() {
        for size in [0usize, 1, 3, 4, 5, 8, 9, 13] {
            let transport = ScriptedTransport::default();
            let file = MemoryFile::new("f", size);
            let (result, _) = run(&transport, &file).await;
            assert_eq!(result, Ok(()));
            assert_eq!(
                transport.seen.borrow().len() as u64,
                chunk_count(size as u64, 4),
                "size {}",
                size
            );
        }
    }

    #[tokio::test]
    async fn test_empty_file_sends_one_put() {
        let transport = ScriptedTransport::default();
        let (result, _) = run(&transport, &MemoryFile::new("f", 0)).await;
        assert_eq!(result, Ok(()));
        let seen = transport.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].method, "PUT");
        assert!(seen[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_chunks_cover_file_in_order() {
        let transport = ScriptedTransport::default();
        let file = MemoryFile::new("f", 10);
        let (result, progress) = run(&transport, &file).await;
        assert_eq!(result, Ok(()));

        assert_eq!(transport.methods(), vec!["PUT", "PATCH", "PATCH"]);
        let seen = transport.seen.borrow();
        let body: Vec<u8> = seen.iter().flat_map(|s| s.body.clone()).collect();
        assert_eq!(body, file.data);
        assert_eq!(seen[1].headers[1].1, "bytes=4-");
        assert_eq!(seen[2].headers[1].1, "bytes=8-");
        assert_eq!(progress.last(), Some(&10));
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_retry_keeps_offsets_aligned() {
        let transport = ScriptedTransport::answering(vec![
            Ok(()),
            Err(RequestFailure::NoConnection),
            Err(RequestFailure::Status(502)),
            Ok(()),
            Ok(()),
        ]);
        let file = MemoryFile::new("f", 12);
        let (result, progress) = run(&transport, &file).await;
        assert_eq!(result, Ok(()));

        let ranges: Vec<String> = transport
            .seen
            .borrow()
            .iter()
            .skip(1)
            .map(|s| s.headers[1].1.clone())
            .collect();
        assert_eq!(ranges, vec!["bytes=4-", "bytes=4-", "bytes=4-", "bytes=8-"]);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&12));
    }

    #[tokio::test]
    async fn test_exhausted_retries_fail_file() {
        let transport = ScriptedTransport::answering(vec![
            Ok(()),
            Err(RequestFailure::Status(500)),
            Err(RequestFailure::Status(500)),
            Err(RequestFailure::Status(500)),
            Err(RequestFailure::Status(507)),
        ]);
        let file = MemoryFile::new("f", 12);
        let (result, _) = run(&transport, &file).await;
        assert_eq!(result, Err(RequestFailure::Status(507)));
        // 1 good chunk + 4 attempts of the second, third chunk never sent
        assert_eq!(transport.seen.borrow().len(), 5);
    }

    #[tokio::test]
    async fn test_first_chunk_retry_stays_put() {
        let transport = ScriptedTransport::answering(vec![
            Err(RequestFailure::NoConnection),
            Ok(()),
        ]);
        let (result, _) = run(&transport, &MemoryFile::new("f", 3)).await;
        assert_eq!(result, Ok(()));
        assert_eq!(transport.methods(), vec!["PUT", "PUT"]);
    }

    #[test]
    fn test_task_resets_retries_on_success() {
        let mut task = UploadTask::new(10, &SMALL);
        assert_eq!(task.complete(Err(RequestFailure::NoConnection)), Step::Send);
        assert_eq!(task.retries, 1);
        assert_eq!(task.complete(Ok(())), Step::Send);
        assert_eq!(task.chunk_index, 1);
        assert_eq!(task.retries, 0);
        assert_eq!(task.acknowledged, 4);
        assert_eq!(task.offset(), 4);
    }
}
