//! Core configuration.
//!
//! Centralizes the constants shared by the upload engine, the listing sorter
//! and the navigator. Text assets are loaded at compile time using `include_str!`.

// =============================================================================
// Text Assets (loaded at compile time)
// =============================================================================

/// Localization tables: a list of language tags, each with a map from English
/// text to its translation.
pub const LOCALES_JSON: &str = include_str!("../assets/locales.json");

// =============================================================================
// Upload Configuration
// =============================================================================

/// Size of one upload chunk (64 MiB).
pub const CHUNK_SIZE: u64 = 64 * 1024 * 1024;

/// Additional attempts for a failed chunk before the file is given up.
pub const CHUNK_RETRY_MAX: u32 = 3;

/// Tunables of the chunked uploader.
///
/// Production code uses [`UploadConfig::default`]; tests shrink the chunk
/// size to exercise multi-chunk files with a handful of bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    /// Bytes per request.
    pub chunk_size: u64,
    /// Retries per chunk after the first attempt.
    pub retry_max: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            retry_max: CHUNK_RETRY_MAX,
        }
    }
}

// =============================================================================
// WebDAV Wire Contract
// =============================================================================

/// Wire names used when talking to the WebDAV server.
pub mod wire {
    /// Header allowing the first chunk to replace an existing file.
    pub const OVERWRITE_HEADER: &str = "Overwrite";
    /// Value of [`OVERWRITE_HEADER`] granting the overwrite.
    pub const OVERWRITE_ALLOWED: &str = "T";
    /// Content type announcing a sabredav partial update.
    pub const PARTIAL_UPDATE_TYPE: &str = "application/x-sabredav-partialupdate";
    /// Header carrying the byte offset of a partial update.
    pub const UPDATE_RANGE_HEADER: &str = "X-Update-Range";
    /// Method creating a collection.
    pub const MKCOL: &str = "MKCOL";
}

// =============================================================================
// Progress Display
// =============================================================================

/// Remaining durations above this many seconds are shown as a phrase.
pub const ONE_DAY_SECS: f64 = 24.0 * 60.0 * 60.0;

// =============================================================================
// Folder Creation
// =============================================================================

/// Name proposed when asking for a new folder name.
pub const DEFAULT_FOLDER_NAME: &str = "new folder";
