//! Pagination over `nextRecordsUrl` continuation tokens.

use crate::model::Page;

/// Whether the server has more records after this page.
pub fn has_more(page: &Page) -> bool {
    next_token(page).is_some()
}

/// The continuation token, if any. Empty tokens count as absent.
pub fn next_token(page: &Page) -> Option<&str> {
    page.next_records_url.as_deref().filter(|t| !t.is_empty())
}
