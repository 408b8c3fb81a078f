//! UI components built with Leptos.
//!
//! - [`progress`] - Upload / folder-creation progress dialog

pub mod progress;

pub use progress::{SignalView, mount_dialog};
