//! Plain-text and JSON output for listings.

use client_core::PageInfo;
use serde::Serialize;
use shared::protocol::{
    BookingSummary, ClassListing, ContactMessage, DashboardStats, RevenueReport, UserSummary,
};

/// One line of a listing.
pub trait Row {
    fn row(&self) -> String;
}

impl Row for UserSummary {
    fn row(&self) -> String {
        let verified = if self.is_verified { "verified" } else { "" };
        format!(
            "{:>6}  {:<5}  {:<32}  {} {}",
            self.id.0,
            self.role.as_str(),
            self.email,
            self.name,
            verified
        )
        .trim_end()
        .to_string()
    }
}

impl Row for BookingSummary {
    fn row(&self) -> String {
        let class = match &self.class {
            Some(class) => class.name.clone(),
            None => format!("class {}", self.class_id.0),
        };
        let member = match &self.user {
            Some(user) => user.email.clone(),
            None => format!("user {}", self.user_id.0),
        };
        format!(
            "{:>6}  {:<9}  {:<32}  {:<24}  {}",
            self.id.0,
            self.status.as_str(),
            member,
            class,
            amount(self.payment_amount_cents, &self.payment_currency)
        )
        .trim_end()
        .to_string()
    }
}

impl Row for ContactMessage {
    fn row(&self) -> String {
        format!(
            "{:>6}  {:<7}  {:<32}  {}",
            self.id.0,
            self.status.as_str(),
            self.email,
            self.subject
        )
        .trim_end()
        .to_string()
    }
}

impl Row for ClassListing {
    fn row(&self) -> String {
        let class = &self.class;
        let seats = if self.is_full {
            "full".to_string()
        } else {
            format!("{}/{}", self.slots_booked, class.capacity)
        };
        format!(
            "{:>6}  {:<24}  {:<16}  {:<9} {:<8}  {:>3}min  {:<12}  {}",
            class.id.0,
            class.name,
            class.teacher,
            class.day,
            class.time,
            class.duration,
            class.level,
            seats
        )
    }
}

pub fn stats(stats: &DashboardStats) -> String {
    let mut out = format!(
        "students            {}\n\
         revenue (all time)  {:.2}\n\
         revenue (month)     {:.2}\n\
         revenue (week)      {:.2}\n\
         bookings today      {}\n\
         bookings this week  {}\n\
         most popular class  {}\n\
         unread messages     {}\n\
         active memberships  {}\n",
        stats.total_students,
        stats.total_revenue,
        stats.monthly_revenue,
        stats.weekly_revenue,
        stats.active_bookings_today,
        stats.bookings_this_week,
        if stats.most_popular_class.is_empty() {
            "-"
        } else {
            stats.most_popular_class.as_str()
        },
        stats.unread_messages,
        stats.active_memberships
    );
    if !stats.recent_bookings.is_empty() {
        out.push_str("recent bookings\n");
        for booking in &stats.recent_bookings {
            out.push_str(
                format!(
                    "{:>6}  {:<9}  {:<24}  {:<24}  {}",
                    booking.id.0,
                    booking.status,
                    booking.user_name,
                    booking.class_name,
                    booking.class_time
                )
                .trim_end(),
            );
            out.push('\n');
        }
    }
    out
}

pub fn revenue(report: &RevenueReport) -> String {
    let mut out = format!(
        "{} to {}: {} payments, total {:.2}\n",
        report.from.format("%Y-%m-%d"),
        report.to.format("%Y-%m-%d"),
        report.count,
        report.total
    );
    for payment in &report.payments {
        let date = payment
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        out.push_str(&format!(
            "{:>6}  {:<16}  {:>10.2} {:<3}  {:<6}  {}\n",
            payment.id.0, date, payment.amount, payment.currency, payment.method, payment.order_id
        ));
    }
    out
}

fn amount(cents: i64, currency: &str) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02} {currency}", cents / 100, cents % 100)
        .trim_end()
        .to_string()
}

pub fn footer(info: &PageInfo) -> String {
    if info.total_items == 0 {
        return "no results".to_string();
    }
    format!(
        "page {} of {}, items {}-{} of {}",
        info.current_page,
        info.total_pages,
        info.start_index + 1,
        info.end_index,
        info.total_items
    )
}

pub fn table<T: Row>(items: &[T], info: &PageInfo) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&item.row());
        out.push('\n');
    }
    out.push_str(&footer(info));
    out.push('\n');
    out
}

#[derive(Serialize)]
struct JsonPage<'a, T> {
    items: &'a [T],
    page: &'a PageInfo,
}

pub fn json_page<T: Serialize>(items: &[T], info: &PageInfo) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonPage { items, page: info })
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
