//! [`PageSource`] implementations for the admin listings.

use async_trait::async_trait;
use shared::{
    domain::{BookingStatus, ContactStatus, Role},
    protocol::{
        BookingSummary, ClassListing, ClassSummary, ContactMessage, ListBookingsQuery,
        ListUsersQuery, UserSummary,
    },
};

use crate::{
    api::ApiClient,
    collection::{Page, PageRequest, PageSource},
    error::ClientError,
};

#[derive(Clone)]
pub struct UserSource {
    api: ApiClient,
}

impl UserSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl PageSource for UserSource {
    type Item = UserSummary;
    /// Restricts the listing to one role.
    type Filter = Option<Role>;

    async fn fetch_page(
        &self,
        request: &PageRequest<Self::Filter>,
    ) -> Result<Page<UserSummary>, ClientError> {
        let query = ListUsersQuery {
            page: request.page_u32(),
            limit: request.limit_u32(),
            role: request.filter,
        };
        Ok(self.api.list_users(&query).await?.into())
    }
}

#[derive(Clone)]
pub struct BookingSource {
    api: ApiClient,
}

impl BookingSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl PageSource for BookingSource {
    type Item = BookingSummary;
    type Filter = Option<BookingStatus>;

    async fn fetch_page(
        &self,
        request: &PageRequest<Self::Filter>,
    ) -> Result<Page<BookingSummary>, ClientError> {
        let query = ListBookingsQuery {
            page: request.page_u32(),
            limit: request.limit_u32(),
            status: request.filter,
        };
        Ok(self.api.list_bookings(&query).await?.into())
    }
}

/// Contact messages come back as one list; pages are cut locally.
#[derive(Clone)]
pub struct ContactSource {
    api: ApiClient,
}

impl ContactSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl PageSource for ContactSource {
    type Item = ContactMessage;
    type Filter = Option<ContactStatus>;

    async fn fetch_page(
        &self,
        request: &PageRequest<Self::Filter>,
    ) -> Result<Page<ContactMessage>, ClientError> {
        let all = self.api.list_contacts(request.filter).await?;
        Ok(Page::from_all(all, request)?)
    }
}

/// Classes come back as one list; the filter is free-text search and pages
/// are cut locally.
#[derive(Clone)]
pub struct ClassSource {
    api: ApiClient,
}

impl ClassSource {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }
}

#[async_trait]
impl PageSource for ClassSource {
    type Item = ClassListing;
    /// Case-insensitive text matched against name, teacher, day and level.
    /// Blank matches every class.
    type Filter = String;

    async fn fetch_page(
        &self,
        request: &PageRequest<Self::Filter>,
    ) -> Result<Page<ClassListing>, ClientError> {
        let needle = request.filter.trim().to_lowercase();
        let matching = self
            .api
            .list_classes()
            .await?
            .into_iter()
            .filter(|listing| class_matches(&listing.class, &needle))
            .collect();
        Ok(Page::from_all(matching, request)?)
    }
}

fn class_matches(class: &ClassSummary, needle: &str) -> bool {
    needle.is_empty()
        || [&class.name, &class.teacher, &class.day, &class.level]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
#[path = "tests/sources_tests.rs"]
mod tests;
