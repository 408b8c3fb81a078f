//! The server-rendered listing page as seen by the core.
//!
//! [`DomPage`] implements [`PageHost`] (navigation swaps) and [`ListingTable`]
//! (sorting) directly on the live document.

use std::cmp::Ordering;

use davui_core::url::directory_url;
use davui_core::{
    Column, EntryKind, FetchError, Fragment, ListingTable, PageHost, RowView, SortDirection,
};
use js_sys::{Array, JsString, Object};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, MouseEvent};

use crate::config::{
    BREADCRUMB_CLASS, CACHE_TOKEN_KEY, DIR_ROW_CLASS, FILES_TABLE_ID, header_id, sort_classes,
};
use crate::utils::dom;
use crate::utils::fetch::fetch_document;

/// Collation through `String.prototype.localeCompare`.
pub fn locale_collation(a: &str, b: &str) -> Ordering {
    JsString::from(a)
        .locale_compare(b, &Array::new(), &Object::new())
        .cmp(&0)
}

/// A `<tr>` of the listing body.
#[derive(Clone, Debug)]
pub struct DomRow {
    element: Element,
}

impl RowView for DomRow {
    fn kind(&self) -> EntryKind {
        if self.element.class_list().contains(DIR_ROW_CLASS) {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }

    fn cell(&self, column: Column) -> String {
        self.element
            .children()
            .item(column.cell_index() as u32)
            .and_then(|cell| cell.text_content())
            .unwrap_or_default()
    }
}

pub struct DomPage {
    document: Document,
    /// Click handler attached to every freshly swapped breadcrumb and body.
    link_handler: Closure<dyn FnMut(MouseEvent)>,
}

impl DomPage {
    pub fn new(document: Document, link_handler: Closure<dyn FnMut(MouseEvent)>) -> Self {
        Self {
            document,
            link_handler,
        }
    }

    fn table(&self) -> Option<Element> {
        self.document.get_element_by_id(FILES_TABLE_ID)
    }

    fn body(&self) -> Option<Element> {
        dom::query(&self.table()?, "tbody")
    }

    fn breadcrumb(&self) -> Option<Element> {
        self.document
            .get_elements_by_class_name(BREADCRUMB_CLASS)
            .item(0)
    }

    fn header(&self, column: Column) -> Option<Element> {
        self.document.get_element_by_id(&header_id(column.key()))
    }

    fn listen(&self, element: &Element) {
        let _ = element
            .add_event_listener_with_callback("click", self.link_handler.as_ref().unchecked_ref());
    }
}

fn fragment_of(document: &Document) -> Result<Fragment<Element>, FetchError> {
    let breadcrumb = document
        .get_elements_by_class_name(BREADCRUMB_CLASS)
        .item(0)
        .ok_or_else(|| FetchError::InvalidDocument("no breadcrumb".to_string()))?;
    let listing = dom::query_document(document, &format!("#{} tbody", FILES_TABLE_ID))
        .ok_or_else(|| FetchError::InvalidDocument("no listing body".to_string()))?;
    Ok(Fragment {
        cache_token: dom::body_data(document, CACHE_TOKEN_KEY),
        breadcrumb,
        listing,
    })
}

impl PageHost for DomPage {
    type Node = Element;

    fn cache_token(&self) -> Option<String> {
        dom::body_data(&self.document, CACHE_TOKEN_KEY)
    }

    fn directory_url(&self) -> String {
        directory_url(&dom::location_href().unwrap_or_default())
    }

    async fn load_fragment(&self, url: &str) -> Result<Fragment<Element>, FetchError> {
        let document = fetch_document(url).await?;
        fragment_of(&document)
    }

    fn replace_breadcrumb(&self, node: Element) {
        if let Some(old) = self.breadcrumb() {
            old.remove();
        }
        match dom::query_document(&self.document, "main") {
            Some(main) => {
                let _ = main.prepend_with_node_1(&node);
            }
            None => tracing::warn!("no <main> to hold the breadcrumb"),
        }
    }

    fn replace_listing_body(&self, node: Element) {
        if let Some(old) = self.body() {
            let _ = old.replace_with_with_node_1(&node);
        } else if let Some(table) = self.table() {
            let _ = table.append_child(&node);
        }
    }

    fn push_history(&self, url: &str) {
        dom::push_state(url);
    }

    fn full_reload(&self, url: &str) {
        dom::assign_location(url);
    }

    fn rebind_listing(&self) {
        if let Some(body) = self.body() {
            self.listen(&body);
        }
        if let Some(breadcrumb) = self.breadcrumb() {
            self.listen(&breadcrumb);
        }
    }
}

impl ListingTable for DomPage {
    type Row = DomRow;

    fn sort_marker(&self) -> Option<(Column, SortDirection)> {
        Column::ALL.into_iter().find_map(|column| {
            let classes = self.header(column)?.class_list();
            if classes.contains(sort_classes::ASCENDING) {
                Some((column, SortDirection::Ascending))
            } else if classes.contains(sort_classes::DESCENDING) {
                Some((column, SortDirection::Descending))
            } else {
                None
            }
        })
    }

    fn clear_sort_markers(&self) {
        for header in Column::ALL.into_iter().filter_map(|c| self.header(c)) {
            let _ = header
                .class_list()
                .remove_2(sort_classes::ASCENDING, sort_classes::DESCENDING);
        }
    }

    fn mark_sorted(&self, column: Column, direction: SortDirection) {
        let class = match direction {
            SortDirection::Ascending => sort_classes::ASCENDING,
            SortDirection::Descending => sort_classes::DESCENDING,
        };
        if let Some(header) = self.header(column) {
            let _ = header.class_list().add_1(class);
        }
    }

    fn rows(&self) -> Vec<DomRow> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        let children = body.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|element| DomRow { element })
            .collect()
    }

    fn reinsert(&self, rows: Vec<DomRow>) {
        let Some(body) = self.body() else {
            return;
        };
        for row in rows {
            let _ = body.append_child(&row.element);
        }
    }
}
