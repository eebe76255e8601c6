use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::{
    BookingId, BookingStatus, ClassId, ContactId, ContactStatus, PaymentId, Role, UserId,
};

/// Preloaded associations arrive as zero-valued objects (`"id": 0`) when the
/// related row is gone; those decode as `None`.
fn absent_when_zero_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) if value.get("id").and_then(Value::as_u64) == Some(0) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Lists can come back as `null` when empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub id: ClassId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub time: String,
    /// Minutes.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub price_cents: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub location_type: String,
    #[serde(default)]
    pub meeting_url: String,
}

/// A class as listed by `GET /classes`, with its confirmed booking count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassListing {
    #[serde(flatten)]
    pub class: ClassSummary,
    #[serde(default)]
    pub slots_booked: u64,
    #[serde(default)]
    pub is_full: bool,
}

/// Editable class fields for create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub teacher: String,
    pub day: String,
    pub time: String,
    pub duration: u32,
    pub capacity: u32,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSummary {
    #[serde(alias = "ID")]
    pub id: BookingId,
    pub user_id: UserId,
    #[serde(
        default,
        deserialize_with = "absent_when_zero_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<UserSummary>,
    pub class_id: ClassId,
    #[serde(
        default,
        deserialize_with = "absent_when_zero_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub class: Option<ClassSummary>,
    pub status: BookingStatus,
    #[serde(default)]
    pub payment_amount_cents: i64,
    #[serde(default)]
    pub payment_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    pub status: ContactStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Paginated admin list body: `{"data": [...], "total": n, "page": p, "limit": l}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListUsersQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListBookingsQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookingStatus>,
}

/// Contact listing takes `all` in place of a status to disable filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListContactsQuery {
    pub status: String,
}

impl ListContactsQuery {
    pub fn new(status: Option<ContactStatus>) -> Self {
        Self {
            status: status.map_or_else(|| "all".to_string(), |s| s.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContactStatusRequest {
    pub status: ContactStatus,
}

/// Dashboard counters from `GET /admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_students: u64,
    #[serde(default)]
    pub total_revenue: f64,
    #[serde(default)]
    pub monthly_revenue: f64,
    #[serde(default)]
    pub weekly_revenue: f64,
    #[serde(default)]
    pub active_bookings_today: u64,
    #[serde(default)]
    pub bookings_this_week: u64,
    #[serde(default)]
    pub most_popular_class: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recent_bookings: Vec<RecentBooking>,
    #[serde(default)]
    pub unread_messages: u64,
    #[serde(default)]
    pub active_memberships: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentBooking {
    pub id: BookingId,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub class_time: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Date range for `GET /admin/revenue`; both ends inclusive, `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub total: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payments: Vec<Payment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    #[serde(
        default,
        deserialize_with = "absent_when_zero_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub base_amount_aud: f64,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
