//! In-process stand-in for the studio admin API used by client tests.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use shared::{
    domain::{
        BookingId, BookingStatus, ClassId, ContactId, ContactStatus, PaymentId, Role, UserId,
    },
    protocol::{
        BookingSummary, ClassInput, ClassListing, ClassSummary, ContactMessage, DashboardStats,
        PageEnvelope, Payment, SignInRequest, UpdateContactStatusRequest, UpdateRoleRequest,
        UserSummary,
    },
};
use tokio::net::TcpListener;

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "namaste";

#[derive(Default)]
pub struct FakeStudioState {
    pub users: Vec<UserSummary>,
    pub bookings: Vec<BookingSummary>,
    pub contacts: Vec<ContactMessage>,
    pub classes: Vec<ClassListing>,
    pub payments: Vec<Payment>,
    pub stats: DashboardStats,
    pub list_requests: Vec<String>,
    pub auth_headers: Vec<Option<String>>,
}

pub type SharedStudio = Arc<Mutex<FakeStudioState>>;

pub fn user(id: u64, role: Role) -> UserSummary {
    UserSummary {
        id: UserId(id),
        email: format!("member{id}@example.com"),
        name: format!("Member {id}"),
        phone: String::new(),
        role,
        user_type: Some("client".into()),
        is_verified: false,
        created_at: None,
    }
}

pub fn booking(id: u64, status: BookingStatus) -> BookingSummary {
    BookingSummary {
        id: BookingId(id),
        user_id: UserId(1),
        user: None,
        class_id: ClassId(1),
        class: None,
        status,
        payment_amount_cents: 2500,
        payment_currency: "AUD".into(),
        appointment_id: None,
        created_at: None,
    }
}

pub fn contact(id: u64, status: ContactStatus) -> ContactMessage {
    ContactMessage {
        id: ContactId(id),
        name: format!("Visitor {id}"),
        email: format!("visitor{id}@example.com"),
        phone: String::new(),
        subject: "Class times".into(),
        message: "Do you run evening classes?".into(),
        status,
        created_at: None,
    }
}

pub fn class(id: u64, name: &str, teacher: &str, level: &str) -> ClassListing {
    ClassListing {
        class: ClassSummary {
            id: ClassId(id),
            name: name.into(),
            description: String::new(),
            teacher: teacher.into(),
            day: "Monday".into(),
            time: "07:00 AM".into(),
            duration: 60,
            capacity: 10,
            level: level.into(),
            price_cents: 2500,
            currency: "AUD".into(),
            location_type: "in-person".into(),
            meeting_url: String::new(),
        },
        slots_booked: 0,
        is_full: false,
    }
}

pub fn payment(id: u64, amount: f64, created_at: &str) -> Payment {
    Payment {
        id: PaymentId(id),
        user_id: UserId(1),
        user: None,
        order_id: format!("order_{id}"),
        amount,
        currency: "AUD".into(),
        base_amount_aud: amount,
        method: "card".into(),
        status: "success".into(),
        created_at: created_at.parse::<DateTime<Utc>>().ok(),
    }
}

/// Seeds `users` users (every fifth one an admin) and starts the server.
pub async fn spawn_studio(users: u64) -> (String, SharedStudio) {
    let state = FakeStudioState {
        users: (1..=users)
            .map(|id| user(id, if id % 5 == 0 { Role::Admin } else { Role::User }))
            .collect(),
        ..FakeStudioState::default()
    };
    spawn_with_state(state).await
}

pub async fn spawn_with_state(state: FakeStudioState) -> (String, SharedStudio) {
    let shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/signin", post(sign_in))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/role", put(update_role))
        .route("/admin/bookings", get(list_bookings))
        .route("/admin/contact", get(list_contacts))
        .route("/admin/contact/:id", put(update_contact))
        .route("/admin/stats", get(stats))
        .route("/admin/revenue", get(revenue))
        .route("/classes", get(list_classes))
        .route("/admin/classes", post(create_class))
        .route(
            "/admin/classes/:id",
            put(update_class).delete(delete_class),
        )
        .with_state(shared.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), shared)
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<u32>,
    limit: Option<u32>,
    role: Option<Role>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RevenueParams {
    from: Option<String>,
    to: Option<String>,
    export: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message}))).into_response()
}

fn class_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Class not found"})),
    )
        .into_response()
}

fn authorize(state: &SharedStudio, headers: &HeaderMap) -> Result<(), Response> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TOKEN}");
    let ok = header_value.as_deref() == Some(expected.as_str());
    state
        .lock()
        .expect("fake state")
        .auth_headers
        .push(header_value);
    if ok {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid token"})),
        )
            .into_response())
    }
}

fn page_of<T: Clone>(items: &[T], params: &PageParams) -> PageEnvelope<T> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).max(1);
    let offset = ((page - 1) * limit) as usize;
    PageEnvelope {
        data: items
            .iter()
            .skip(offset)
            .take(limit as usize)
            .cloned()
            .collect(),
        total: items.len() as u64,
        page,
        limit,
    }
}

async fn sign_in(Json(body): Json<SignInRequest>) -> Response {
    if body.password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        )
            .into_response();
    }
    let mut signed_in = user(99, Role::Admin);
    signed_in.email = body.email;
    Json(json!({"token": TOKEN, "user": signed_in})).into_response()
}

async fn list_users(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    guard.list_requests.push(format!(
        "users page={:?} limit={:?} role={:?}",
        params.page, params.limit, params.role
    ));
    let matching: Vec<UserSummary> = guard
        .users
        .iter()
        .filter(|u| params.role.map_or(true, |role| u.role == role))
        .cloned()
        .collect();
    Json(page_of(&matching, &params)).into_response()
}

async fn update_role(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<UpdateRoleRequest>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    match guard.users.iter_mut().find(|u| u.id == UserId(id)) {
        Some(user) => {
            user.role = body.role;
            Json(json!({"message": "Role updated"})).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "User not found"})),
        )
            .into_response(),
    }
}

async fn list_bookings(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    guard.list_requests.push(format!(
        "bookings page={:?} limit={:?} status={:?}",
        params.page, params.limit, params.status
    ));
    let matching: Vec<BookingSummary> = guard
        .bookings
        .iter()
        .filter(|b| {
            params
                .status
                .as_deref()
                .map_or(true, |status| b.status.as_str() == status)
        })
        .cloned()
        .collect();
    Json(page_of(&matching, &params)).into_response()
}

async fn list_contacts(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    let status = params.status.unwrap_or_else(|| "unread".to_string());
    guard.list_requests.push(format!("contacts status={status}"));
    let matching: Vec<ContactMessage> = guard
        .contacts
        .iter()
        .filter(|c| status == "all" || c.status.as_str() == status)
        .cloned()
        .collect();
    Json(matching).into_response()
}

async fn update_contact(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(body): Json<UpdateContactStatusRequest>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    if let Some(contact) = guard.contacts.iter_mut().find(|c| c.id == ContactId(id)) {
        contact.status = body.status;
    }
    Json(json!({"message": "Status updated"})).into_response()
}

async fn stats(State(state): State<SharedStudio>, headers: HeaderMap) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let guard = state.lock().expect("fake state");
    Json(guard.stats.clone()).into_response()
}

async fn revenue(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Query(params): Query<RevenueParams>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let parse = |raw: &Option<String>| -> Result<Option<NaiveDate>, ()> {
        raw.as_deref()
            .map(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| ()))
            .transpose()
    };
    let Ok(from) = parse(&params.from) else {
        return bad_request("Invalid from date");
    };
    let Ok(to) = parse(&params.to) else {
        return bad_request("Invalid to date");
    };

    let mut guard = state.lock().expect("fake state");
    guard.list_requests.push(format!(
        "revenue from={:?} to={:?} export={:?}",
        params.from, params.to, params.export
    ));
    let payments: Vec<Payment> = guard
        .payments
        .iter()
        .filter(|p| {
            let day = p.created_at.map(|at| at.date_naive());
            from.map_or(true, |from| day.is_some_and(|d| d >= from))
                && to.map_or(true, |to| day.is_some_and(|d| d <= to))
        })
        .cloned()
        .collect();

    if params.export.as_deref() == Some("true") {
        let mut csv = String::from("ID,Date,User,Amount,Method,Order ID\n");
        for p in &payments {
            let date = p
                .created_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();
            csv.push_str(&format!(
                "{},{date},,{:.2},{},{}\n",
                p.id, p.amount, p.method, p.order_id
            ));
        }
        return ([(header::CONTENT_TYPE, "text/csv")], csv).into_response();
    }

    let total: f64 = payments.iter().map(|p| p.amount).sum();
    Json(json!({
        "from": "2025-01-01T00:00:00Z",
        "to": "2025-12-31T00:00:00Z",
        "count": payments.len(),
        "total": total,
        "payments": if payments.is_empty() { None } else { Some(payments) },
    }))
    .into_response()
}

async fn list_classes(State(state): State<SharedStudio>) -> Response {
    let mut guard = state.lock().expect("fake state");
    guard.list_requests.push("classes".to_string());
    Json(guard.classes.clone()).into_response()
}

async fn create_class(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Json(input): Json<ClassInput>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    if input.name.trim().is_empty() {
        return bad_request("name is required");
    }
    let mut guard = state.lock().expect("fake state");
    let next_id = guard.classes.iter().map(|c| c.class.id.0).max().unwrap_or(0) + 1;
    let mut listing = class(next_id, &input.name, &input.teacher, &input.level);
    apply_input(&mut listing.class, input);
    guard.classes.push(listing.clone());
    (StatusCode::CREATED, Json(listing.class)).into_response()
}

async fn update_class(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<ClassInput>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    match guard.classes.iter_mut().find(|c| c.class.id == ClassId(id)) {
        Some(listing) => {
            apply_input(&mut listing.class, input);
            Json(listing.class.clone()).into_response()
        }
        None => class_not_found(),
    }
}

async fn delete_class(
    State(state): State<SharedStudio>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if let Err(rejection) = authorize(&state, &headers) {
        return rejection;
    }
    let mut guard = state.lock().expect("fake state");
    let before = guard.classes.len();
    guard.classes.retain(|c| c.class.id != ClassId(id));
    if guard.classes.len() == before {
        return class_not_found();
    }
    Json(json!({"message": "Class deleted successfully"})).into_response()
}

fn apply_input(class: &mut ClassSummary, input: ClassInput) {
    class.name = input.name;
    class.description = input.description;
    class.teacher = input.teacher;
    class.day = input.day;
    class.time = input.time;
    class.duration = input.duration;
    class.capacity = input.capacity;
    class.level = input.level;
}
