//! HTTP client for the studio admin API.

use std::sync::Arc;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ClassId, ContactId, ContactStatus, Role, UserId},
    protocol::{
        BookingSummary, ClassInput, ClassListing, ClassSummary, ContactMessage, DashboardStats,
        ErrorBody, ListBookingsQuery, ListContactsQuery, ListUsersQuery, PageEnvelope,
        RevenueQuery, RevenueReport, SignInRequest, SignInResponse, UpdateContactStatusRequest,
        UpdateRoleRequest, UserSummary,
    },
};
use tracing::{debug, info, warn};

use crate::{
    config::ClientSettings,
    error::ClientError,
    storage::{load_json, save_json, KeyValueStore, TOKEN_KEY, USER_KEY},
};

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn KeyValueStore>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn from_settings(settings: &ClientSettings, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self::new(settings.api_url()?, store))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn token(&self) -> Result<Option<String>> {
        Ok(self.store.get(TOKEN_KEY)?)
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    pub fn current_user(&self) -> Option<UserSummary> {
        load_json(self.store.as_ref(), USER_KEY, None)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSummary> {
        let response = self
            .http
            .post(self.url("/signin"))
            .json(&SignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: SignInResponse = response.json().await?;
        self.store.set(TOKEN_KEY, &body.token)?;
        save_json(self.store.as_ref(), USER_KEY, &body.user)?;
        info!(user_id = %body.user.id, role = %body.user.role, "signed in");
        Ok(body.user)
    }

    pub fn sign_out(&self) -> Result<()> {
        self.clear_session()?;
        info!("signed out");
        Ok(())
    }

    pub async fn list_users(&self, query: &ListUsersQuery) -> Result<PageEnvelope<UserSummary>> {
        self.get_json("/admin/users", query).await
    }

    pub async fn update_user_role(&self, user_id: UserId, role: Role) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/admin/users/{user_id}/role")))
            .json(&UpdateRoleRequest { role });
        self.send(request).await?;
        Ok(())
    }

    pub async fn list_bookings(
        &self,
        query: &ListBookingsQuery,
    ) -> Result<PageEnvelope<BookingSummary>> {
        self.get_json("/admin/bookings", query).await
    }

    /// The contact endpoint is unpaginated and returns every matching message.
    pub async fn list_contacts(&self, status: Option<ContactStatus>) -> Result<Vec<ContactMessage>> {
        self.get_json("/admin/contact", &ListContactsQuery::new(status))
            .await
    }

    pub async fn update_contact_status(
        &self,
        contact_id: ContactId,
        status: ContactStatus,
    ) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/admin/contact/{contact_id}")))
            .json(&UpdateContactStatusRequest { status });
        self.send(request).await?;
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.fetch_json(self.http.get(self.url("/admin/stats")))
            .await
    }

    pub async fn revenue_report(&self, query: &RevenueQuery) -> Result<RevenueReport> {
        self.get_json("/admin/revenue", query).await
    }

    /// The same report rendered as CSV by the server.
    pub async fn revenue_csv(&self, query: &RevenueQuery) -> Result<String> {
        let request = self
            .http
            .get(self.url("/admin/revenue"))
            .query(query)
            .query(&[("export", "true")]);
        let response = self.send(request).await?;
        Ok(response.text().await?)
    }

    /// Every class with its confirmed booking count. Unpaginated.
    pub async fn list_classes(&self) -> Result<Vec<ClassListing>> {
        self.fetch_json(self.http.get(self.url("/classes"))).await
    }

    pub async fn create_class(&self, class: &ClassInput) -> Result<ClassSummary> {
        let request = self.http.post(self.url("/admin/classes")).json(class);
        self.fetch_json(request).await
    }

    pub async fn update_class(&self, class_id: ClassId, class: &ClassInput) -> Result<ClassSummary> {
        let request = self
            .http
            .put(self.url(&format!("/admin/classes/{class_id}")))
            .json(class);
        self.fetch_json(request).await
    }

    pub async fn delete_class(&self, class_id: ClassId) -> Result<()> {
        let request = self
            .http
            .delete(self.url(&format!("/admin/classes/{class_id}")));
        self.send(request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<Q, T>(&self, path: &str, query: &Q) -> Result<T>
    where
        Q: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch_json(self.http.get(self.url(path)).query(query))
            .await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = match self.token()? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let request = request.build()?;
        debug!(method = %request.method(), url = %request.url(), "studio api request");

        let response = self.http.execute(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(url = %response.url(), "studio api rejected credentials; clearing session");
            self.clear_session()?;
            return Err(ClientError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }

    fn clear_session(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&raw)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });
    ClientError::api(status.as_u16(), message)
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
