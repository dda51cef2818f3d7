// src/pipeline/transform.rs

//! Per-member transaction features.

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::{FlowdagError, Result};
use crate::task::Table;

pub const MEMBER_ID: &str = "memberId";
pub const TIMESTAMP: &str = "lastTransactionUtcTs";
pub const POINTS: &str = "lastTransactionPointsBought";
pub const REVENUE: &str = "lastTransactionRevenueUSD";
pub const KIND: &str = "lastTransactionType";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output columns, in order.
pub const FEATURE_COLUMNS: [&str; 9] = [
    MEMBER_ID,
    "LAST_3_TRANSACTIONS_AVG_POINTS_BOUGHT",
    "LAST_3_TRANSACTIONS_AVG_REVENUE_USD",
    "DAYS_SINCE_LAST_TRANSACTION",
    "AVG_POINTS_BOUGHT",
    "AVG_REVENUE_USD",
    "PCT_GIFT_TRANSACTIONS",
    "PCT_REDEEM_TRANSACTIONS",
    "PCT_BUY_TRANSACTIONS",
];

const LAST_N: usize = 3;

#[derive(Debug, Clone)]
struct Transaction {
    at: NaiveDateTime,
    points: f64,
    revenue: f64,
    kind: String,
}

/// Member features relative to the current time.
pub fn transform(input: &Table) -> Result<Table> {
    transform_at(input, Utc::now())
}

/// Build one row of features per member from raw transactions.
///
/// Rows with any null cell are dropped first. Members appear in the order of
/// their first remaining transaction.
pub fn transform_at(input: &Table, now: DateTime<Utc>) -> Result<Table> {
    let member_col = input.require_column(MEMBER_ID)?;
    let ts_col = input.require_column(TIMESTAMP)?;
    let points_col = input.require_column(POINTS)?;
    let revenue_col = input.require_column(REVENUE)?;
    let kind_col = input.require_column(KIND)?;

    let mut members: IndexMap<String, (Value, Vec<Transaction>)> = IndexMap::new();
    let mut dropped = 0usize;

    for row in input.rows() {
        if row.iter().any(Value::is_null) {
            dropped += 1;
            continue;
        }

        let txn = Transaction {
            at: parse_timestamp(&row[ts_col])?,
            points: number(&row[points_col], POINTS)?,
            revenue: number(&row[revenue_col], REVENUE)?,
            kind: text(&row[kind_col]),
        };

        let id = &row[member_col];
        members
            .entry(id.to_string())
            .or_insert_with(|| (id.clone(), Vec::new()))
            .1
            .push(txn);
    }

    if dropped > 0 {
        debug!(dropped, "dropped rows with missing values");
    }

    let mut out = Table::new(FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect());
    for (id, txns) in members.into_values() {
        out.push_row(member_features(id, txns, now))?;
    }

    info!(members = out.len(), "computed member features");
    Ok(out)
}

fn member_features(id: Value, mut txns: Vec<Transaction>, now: DateTime<Utc>) -> Vec<Value> {
    let count = txns.len() as f64;
    let share = |kind: &str| txns.iter().filter(|t| t.kind == kind).count() as f64 / count;

    let pct_gift = share("gift");
    let pct_redeem = share("redeem");
    let pct_buy = share("buy");
    let avg_points = txns.iter().map(|t| t.points).sum::<f64>() / count;
    let avg_revenue = txns.iter().map(|t| t.revenue).sum::<f64>() / count;

    txns.sort_by_key(|t| t.at);
    let recent = &txns[txns.len().saturating_sub(LAST_N)..];
    let recent_count = recent.len() as f64;
    let last3_points = recent.iter().map(|t| t.points).sum::<f64>() / recent_count;
    let last3_revenue = recent.iter().map(|t| t.revenue).sum::<f64>() / recent_count;

    let days_since_last = recent
        .last()
        .map(|t| (now.naive_utc() - t.at).num_days())
        .unwrap_or_default();

    vec![
        id,
        Value::from(last3_points),
        Value::from(last3_revenue),
        Value::from(days_since_last),
        Value::from(avg_points),
        Value::from(avg_revenue),
        Value::from(pct_gift),
        Value::from(pct_redeem),
        Value::from(pct_buy),
    ]
}

fn parse_timestamp(value: &Value) -> Result<NaiveDateTime> {
    let raw = value.as_str().ok_or_else(|| {
        FlowdagError::InvalidPayload(format!("{TIMESTAMP} must be a string, got {value}"))
    })?;
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        FlowdagError::InvalidPayload(format!("invalid {TIMESTAMP} '{raw}': {e}"))
    })
}

fn number(value: &Value, column: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| FlowdagError::InvalidPayload(format!("{column} must be numeric, got {value}")))
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
