use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::db::audit_log_repository::DEFAULT_ACTIVITY_LIMIT;
use crate::db::Repositories;
use crate::errors::AppError;
use crate::models::audit_log::{AuditAction, AuditLog};
use crate::views::currency::format_inr;

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub actor: String,
    pub summary: String,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn from_log(log: &AuditLog) -> Self {
        let verb = match log.action {
            AuditAction::Insert => "added",
            AuditAction::Update => "updated",
            AuditAction::Delete => "deleted",
        };
        let noun = table_noun(&log.table_name);
        let summary = match (log.snapshot().and_then(describe), noun) {
            (Some(subject), Some(noun)) => format!("{verb} {noun} {subject}"),
            (Some(subject), None) => format!("{verb} {} {subject}", log.table_name),
            (None, Some(noun)) => format!("{verb} {} {noun}", article(noun)),
            (None, None) => format!("{verb} an entry in {}", log.table_name),
        };
        Self {
            id: log.id,
            actor: log
                .user_email
                .clone()
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| "Someone".to_string()),
            summary,
            at: log.created_at,
        }
    }

    /// "ravi@example.com added donation Sita (₹5,000)"
    pub fn sentence(&self) -> String {
        format!("{} {}", self.actor, self.summary)
    }
}

fn table_noun(table: &str) -> Option<&'static str> {
    match table {
        "donations" => Some("donation"),
        "expenses" => Some("expense"),
        "images" => Some("image"),
        "festivals" => Some("festival"),
        "organizations" => Some("organization"),
        "settings" => Some("setting"),
        "organization_invitations" => Some("invitation"),
        "user_roles" => Some("member"),
        _ => None,
    }
}

fn article(noun: &str) -> &'static str {
    match noun.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// Best human handle for a row snapshot, with the amount when it has one.
fn describe(row: &Value) -> Option<String> {
    let label = ["name", "title", "type", "key", "email"]
        .iter()
        .find_map(|field| row.get(*field).and_then(Value::as_str))
        .filter(|s| !s.is_empty())?;
    match row.get("amount").and_then(Value::as_f64) {
        Some(amount) => Some(format!("{label} ({})", format_inr(amount))),
        None => Some(label.to_string()),
    }
}

pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds().max(0);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => plural(seconds / 60, "minute"),
        3600..=86_399 => plural(seconds / 3600, "hour"),
        _ => plural(seconds / 86_400, "day"),
    }
}

pub async fn load_activity(
    repos: &Repositories,
    organization_id: Uuid,
) -> Result<Vec<ActivityEntry>, AppError> {
    let logs = repos
        .audit_logs
        .list_recent(organization_id, DEFAULT_ACTIVITY_LIMIT)
        .await?;
    Ok(logs.iter().map(ActivityEntry::from_log).collect())
}
