//! Generic pagination traversal
//!
//! Every pagination loop in the crawler (collections, products per
//! collection, flat product list, review timelines) follows the same
//! contract: request page 1, 2, 3, ... until a page yields an empty item
//! batch (normal end of pagination) or a non-success status (recoverable
//! truncation, already-yielded pages are kept).

use crate::fetch::retry::{fetch_json, FetchOutcome, RetryPolicy};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// A lazy, finite, non-restartable sequence of page-item batches
///
/// `B` is the decoded page body, `T` the item type extracted from it.
/// The next page is only requested when [`next_batch`](Self::next_batch)
/// is called, so callers can process each batch (and persist state)
/// before the traversal continues.
pub struct Paginator<'a, B, T, F, X>
where
    F: Fn(u32) -> String,
    X: Fn(B) -> Vec<T>,
{
    client: &'a Client,
    policy: &'a RetryPolicy,
    make_url: F,
    extract: X,
    page: u32,
    done: bool,
    _body: PhantomData<fn() -> (B, T)>,
}

impl<'a, B, T, F, X> Paginator<'a, B, T, F, X>
where
    B: DeserializeOwned,
    F: Fn(u32) -> String,
    X: Fn(B) -> Vec<T>,
{
    /// Creates a traversal starting at page 1
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to use
    /// * `policy` - Retry schedule for transient failures per page
    /// * `make_url` - Builds the request URL for a given page number
    /// * `extract` - Pulls the item batch out of a decoded page body
    pub fn new(client: &'a Client, policy: &'a RetryPolicy, make_url: F, extract: X) -> Self {
        Self {
            client,
            policy,
            make_url,
            extract,
            page: 1,
            done: false,
            _body: PhantomData,
        }
    }

    /// The page number the next call to `next_batch` will request
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Fetches the next page and returns its item batch
    ///
    /// Returns `None` once the traversal has terminated: an empty batch
    /// (expected end of pagination), a non-success HTTP status (logged,
    /// traversal stops with whatever was already yielded), or exhausted
    /// retries. A finished traversal never restarts.
    pub async fn next_batch(&mut self) -> Option<Vec<T>> {
        if self.done {
            return None;
        }

        let url = (self.make_url)(self.page);
        match fetch_json::<B>(self.client, &url, self.policy).await {
            FetchOutcome::Body(body) => {
                let items = (self.extract)(body);
                if items.is_empty() {
                    self.done = true;
                    return None;
                }
                self.page += 1;
                Some(items)
            }
            FetchOutcome::Status(code) => {
                tracing::info!("Stopping pagination at {} (HTTP {})", url, code);
                self.done = true;
                None
            }
            FetchOutcome::Failed => {
                self.done = true;
                None
            }
        }
    }
}
