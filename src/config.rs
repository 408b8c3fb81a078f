//! Page configuration.
//!
//! Element ids, class names and attributes of the server-rendered listing
//! page. Transfer tuning lives in [`davui_core::config`].

// =============================================================================
// Listing Page
// =============================================================================

/// Table holding the directory listing.
pub const FILES_TABLE_ID: &str = "files";

/// Breadcrumb container (first child of `main`).
pub const BREADCRUMB_CLASS: &str = "path";

/// Class carried by directory rows.
pub const DIR_ROW_CLASS: &str = "dirItem";

/// Hidden `<input type=file multiple>` driven by the upload button.
pub const FILE_INPUT_ID: &str = "FileInputer";

/// `body` data attribute carrying the server instance token.
pub const CACHE_TOKEN_KEY: &str = "cacheid";

/// Attribute marking elements whose text is a translation key.
pub const TRANSLATE_ATTR: &str = "data-t";

/// Sort marker classes on the column headers.
pub mod sort_classes {
    pub const ASCENDING: &str = "SortAsc";
    pub const DESCENDING: &str = "SortDes";
}

/// Header element id of a column: `nameHeader`, `sizeHeader`, `timeHeader`.
pub fn header_id(column_key: &str) -> String {
    format!("{}Header", column_key)
}

// =============================================================================
// Progress Dialog
// =============================================================================

/// Ids styled by the server stylesheet.
pub mod dialog_ids {
    pub const BACKGROUND: &str = "PopupDialogBackground";
    pub const DIALOG: &str = "ProgressDialog";
    pub const TITLE: &str = "ProgrssTitle";
    pub const DESCRIPTION: &str = "ProgressDesc";
    pub const BAR: &str = "Progress";
    pub const BAR_VALUE: &str = "ProgressValue";
    pub const PERCENT: &str = "ProgressPercent";
    pub const ETA: &str = "ProgressETA";
    pub const LOGGER: &str = "ProgressLogger";
}

/// Element the overlay is mounted into.
pub const DIALOG_HOST_ID: &str = "davui-dialog";

// =============================================================================
// Page-callable Globals
// =============================================================================

/// Functions installed on `window` for the server-rendered buttons.
pub mod globals {
    pub const OPEN_FILE_INPUT: &str = "OpenFileInputer";
    pub const UPLOAD_FILES: &str = "UploadFiles";
    pub const NEW_FOLDER: &str = "NewFolder";
    pub const SORT: &str = "Sort";
}
