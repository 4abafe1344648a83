//! Pagination over GitLab list endpoints
//!
//! GitLab signals the end of a collection with an empty page rather than a
//! pagination cursor, so the loop here walks `page=1..` until it sees one.
//! End-of-results and request failure are kept as distinct signals even
//! though both stop the loop: only true successes count toward the
//! "API reachable" decision made after the scan.

use std::future::Future;

use log::{debug, warn};

use crate::error::ApiError;

/// Items requested per page
pub const PER_PAGE: usize = 100;

/// Hard cap on pages fetched per endpoint. Guarantees termination against
/// a backend that never returns an empty page.
pub const MAX_PAGES: usize = 1000;

/// Outcome of a single page request
#[derive(Debug)]
pub enum PageResult<T> {
    /// A successful, non-empty page
    Items(Vec<T>),
    /// A successful request past the last page
    End,
    /// Transport failure or non-success HTTP status
    Failed(ApiError),
}

/// Everything accumulated from one endpoint
#[derive(Debug)]
pub struct FetchOutcome<T> {
    /// Items from all pages fetched before the loop stopped
    pub items: Vec<T>,

    /// True iff at least one page request returned a success status.
    /// Distinguishes "API fully down" from "API up but nothing listed".
    pub succeeded: bool,
}

/// Fetch every page of a collection.
///
/// Stops on the first empty page or the first failure; a failure returns
/// whatever was accumulated so far. No retries.
pub async fn fetch_all<T, F, Fut>(resource: &str, fetch_page: F) -> FetchOutcome<T>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = PageResult<T>>,
{
    let mut items = Vec::new();
    let mut succeeded = false;

    for page in 1..=MAX_PAGES {
        match fetch_page(page).await {
            PageResult::Items(mut batch) => {
                debug!("{resource}: page {page} returned {} items", batch.len());
                succeeded = true;
                items.append(&mut batch);
            }
            PageResult::End => {
                succeeded = true;
                break;
            }
            PageResult::Failed(err) => {
                warn!("{resource}: stopping at page {page}: {err}");
                break;
            }
        }
    }

    FetchOutcome { items, succeeded }
}
