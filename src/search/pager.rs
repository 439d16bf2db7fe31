//! Bounded page sequence over grouped search results

use crate::search::backend::SearchBackend;
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::SearchParams;
use crate::search::response::GroupedHit;
use futures::stream::{self, Stream};

/// Walks the pages of a grouped query.
///
/// The sequence ends on an empty page, on a page shorter than `per_page`, or
/// once `max_pages` pages have been fetched. [`GroupedPager::reset`] restarts
/// it from the first page.
pub struct GroupedPager<'a> {
    backend: &'a dyn SearchBackend,
    collection: String,
    params: SearchParams,
    next_page: u32,
    max_pages: u32,
    done: bool,
}

impl<'a> GroupedPager<'a> {
    pub fn new(
        backend: &'a dyn SearchBackend,
        collection: impl Into<String>,
        params: SearchParams,
        max_pages: u32,
    ) -> Self {
        Self {
            backend,
            collection: collection.into(),
            params,
            next_page: 1,
            max_pages,
            done: false,
        }
    }

    pub fn reset(&mut self) {
        self.next_page = 1;
        self.done = false;
    }

    /// Fetch the next page, or `None` once the sequence is exhausted
    pub async fn next_page(&mut self) -> SearchResult<Option<Vec<GroupedHit>>> {
        if self.done || self.next_page > self.max_pages || self.params.per_page == 0 {
            self.done = true;
            return Ok(None);
        }

        let params = self.params.clone().with_page(self.next_page);
        let response = self.backend.search(&self.collection, &params).await?;
        let groups = response.grouped_hits;

        self.next_page += 1;
        if groups.len() < self.params.per_page as usize || self.next_page > self.max_pages {
            self.done = true;
        }

        if groups.is_empty() {
            return Ok(None);
        }

        Ok(Some(groups))
    }

    /// Consume the pager as a stream of pages
    pub fn into_stream(self) -> impl Stream<Item = SearchResult<Vec<GroupedHit>>> + 'a {
        stream::try_unfold(self, |mut pager| async move {
            let page = pager.next_page().await?;
            Ok::<_, SearchError>(page.map(|groups| (groups, pager)))
        })
    }
}
