//! Fetch a page, show it, mutate, fetch again.
//!
//! [`RemoteCollection`] is the one list-view controller shared by every admin
//! listing. It is generic over a [`PageSource`], which knows how to fetch one
//! page of one kind of record, and keeps a [`Paginator`] in step with the
//! totals the source reports.

use std::future::Future;

use async_trait::async_trait;
use shared::protocol::PageEnvelope;
use tracing::{debug, warn};

use crate::{
    error::ClientError,
    pagination::{PageInfo, PaginationError, Paginator},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub page: u64,
    pub limit: u64,
    pub filter: F,
}

impl<F> PageRequest<F> {
    pub fn page_u32(&self) -> u32 {
        u32::try_from(self.page).unwrap_or(u32::MAX)
    }

    pub fn limit_u32(&self) -> u32 {
        u32::try_from(self.limit).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    /// Cuts the requested page out of a fully loaded collection.
    ///
    /// The page number is clamped the same way [`Paginator`] clamps it.
    pub fn from_all<F>(all: Vec<T>, request: &PageRequest<F>) -> Result<Self, PaginationError> {
        let total = all.len() as u64;
        let paginator = Paginator::new(
            total,
            request.limit,
            i64::try_from(request.page).unwrap_or(i64::MAX),
        )?;
        let range = paginator.range();
        let items = all
            .into_iter()
            .skip(range.start)
            .take(range.len())
            .collect();
        Ok(Self { items, total })
    }
}

impl<T> From<PageEnvelope<T>> for Page<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        Self {
            items: envelope.data,
            total: envelope.total,
        }
    }
}

#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;
    type Filter: Clone + Default + Send + Sync;

    async fn fetch_page(
        &self,
        request: &PageRequest<Self::Filter>,
    ) -> Result<Page<Self::Item>, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

pub struct RemoteCollection<S: PageSource> {
    source: S,
    paginator: Paginator,
    filter: S::Filter,
    items: Vec<S::Item>,
    state: LoadState,
}

impl<S: PageSource> RemoteCollection<S> {
    pub fn new(source: S, items_per_page: u64) -> Result<Self, ClientError> {
        Ok(Self {
            source,
            paginator: Paginator::new(0, items_per_page, 1)?,
            filter: S::Filter::default(),
            items: Vec::new(),
            state: LoadState::Idle,
        })
    }

    /// Sets the initial filter without fetching.
    pub fn with_filter(mut self, filter: S::Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    pub fn filter(&self) -> &S::Filter {
        &self.filter
    }

    pub fn load_state(&self) -> &LoadState {
        &self.state
    }

    pub fn page_info(&self) -> PageInfo {
        self.paginator.info()
    }

    pub async fn refresh(&mut self) -> Result<&[S::Item], ClientError> {
        self.load().await?;
        Ok(&self.items)
    }

    /// First load at an arbitrary page. The page is requested as given and
    /// clamped once the source has reported the collection size.
    pub async fn open_at(&mut self, page: i64) -> Result<(), ClientError> {
        let requested = u64::try_from(page).unwrap_or(0).max(1);
        self.load_from(requested).await
    }

    pub async fn go_to_page(&mut self, page: i64) -> Result<(), ClientError> {
        let before = self.paginator.clone();
        self.paginator.go_to_page(page);
        self.reload_if_moved(before).await
    }

    pub async fn next_page(&mut self) -> Result<(), ClientError> {
        let before = self.paginator.clone();
        self.paginator.next_page();
        self.reload_if_moved(before).await
    }

    pub async fn previous_page(&mut self) -> Result<(), ClientError> {
        let before = self.paginator.clone();
        self.paginator.previous_page();
        self.reload_if_moved(before).await
    }

    /// Replaces the filter and starts over from the first page.
    ///
    /// If the fetch fails the previous filter and page stay in effect.
    pub async fn set_filter(&mut self, filter: S::Filter) -> Result<(), ClientError> {
        let previous_filter = std::mem::replace(&mut self.filter, filter);
        let previous_paginator = self.paginator.clone();
        self.paginator.go_to_page(1);
        if let Err(error) = self.load().await {
            self.filter = previous_filter;
            self.paginator = previous_paginator;
            return Err(error);
        }
        Ok(())
    }

    /// Changes the page size and reloads; a failed load keeps the old size.
    pub async fn set_page_size(&mut self, items_per_page: u64) -> Result<(), ClientError> {
        let previous = self.paginator.clone();
        self.paginator.set_items_per_page(items_per_page)?;
        if let Err(error) = self.load().await {
            self.paginator = previous;
            return Err(error);
        }
        Ok(())
    }

    /// Runs a mutation and reloads the current page once it succeeds.
    ///
    /// A mutation error is returned as is. A failed reload after a
    /// successful mutation still returns the outcome; the failure shows up
    /// in [`load_state`](Self::load_state).
    pub async fn apply<Fut, R>(&mut self, mutation: Fut) -> Result<R, ClientError>
    where
        Fut: Future<Output = Result<R, ClientError>>,
    {
        let outcome = mutation.await?;
        if let Err(error) = self.load().await {
            warn!(%error, "mutation applied but the listing could not be reloaded");
        }
        Ok(outcome)
    }

    /// Reloads after navigation; a failed load puts the page back.
    async fn reload_if_moved(&mut self, before: Paginator) -> Result<(), ClientError> {
        if self.paginator.current_page() == before.current_page() {
            return Ok(());
        }
        if let Err(error) = self.load().await {
            self.paginator = before;
            return Err(error);
        }
        Ok(())
    }

    async fn load(&mut self) -> Result<(), ClientError> {
        self.load_from(self.paginator.current_page()).await
    }

    /// Fetches `requested` and commits paginator and items together, so a
    /// failed fetch leaves both untouched.
    async fn load_from(&mut self, requested: u64) -> Result<(), ClientError> {
        self.state = LoadState::Loading;
        let mut next = self.paginator.clone();
        let mut page = self.fetch(requested).await?;
        next.set_total_items(page.total);
        next.go_to_page(i64::try_from(requested).unwrap_or(i64::MAX));

        let clamped = next.current_page();
        if clamped != requested {
            debug!(requested, clamped, total = page.total, "page out of range; reloading clamped page");
            page = self.fetch(clamped).await?;
            next.set_total_items(page.total);
        }

        self.paginator = next;
        self.items = page.items;
        self.state = LoadState::Ready;
        Ok(())
    }

    async fn fetch(&mut self, page: u64) -> Result<Page<S::Item>, ClientError> {
        let request = PageRequest {
            page,
            limit: self.paginator.items_per_page(),
            filter: self.filter.clone(),
        };
        match self.source.fetch_page(&request).await {
            Ok(fetched) => Ok(fetched),
            Err(error) => {
                warn!(page, %error, "failed to load collection page");
                self.state = LoadState::Failed(error.to_string());
                Err(error)
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
