//! Browser adapters for the core seams.
//!
//! - [`page`] - Listing page as navigation host and sortable table
//! - [`transport`] - WebDAV requests over XMLHttpRequest
//! - [`fetch`] - Listing page download and parsing
//! - [`clock`] - `performance.now()` clock
//! - [`log`] - `tracing` output to the browser console

pub mod clock;
pub mod dom;
pub mod fetch;
pub mod log;
pub mod page;
pub mod transport;
