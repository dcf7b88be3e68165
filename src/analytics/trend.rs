use std::collections::BTreeMap;

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};

use crate::model::Response;

#[derive(Enum, Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum TrendMode {
    #[default]
    Daily,
    /// Weeks start on Sunday.
    Weekly,
}

#[derive(SimpleObject, Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    /// The bucket's start date, `YYYY-MM-DD`.
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Buckets `responses` by their submission date, oldest bucket first.
///
/// Responses whose `created_at` cannot be parsed are left out.
pub fn build_trend(responses: &[Response], mode: TrendMode) -> Vec<TrendPoint> {
    let buckets = responses
        .iter()
        .filter_map(|response| parse_timestamp(&response.created_at))
        .fold(BTreeMap::new(), |mut acc, created_at| {
            *acc.entry(bucket_start(created_at.date_naive(), mode))
                .or_insert(0) += 1;
            acc
        });

    buckets
        .into_iter()
        .map(|(start, count)| TrendPoint {
            key: start.format("%Y-%m-%d").to_string(),
            label: label(start, mode),
            count,
        })
        .collect()
}

fn bucket_start(date: NaiveDate, mode: TrendMode) -> NaiveDate {
    match mode {
        TrendMode::Daily => date,
        TrendMode::Weekly => {
            let offset = u64::from(date.weekday().num_days_from_sunday());
            date.checked_sub_days(Days::new(offset)).unwrap_or(date)
        }
    }
}

fn label(start: NaiveDate, mode: TrendMode) -> String {
    let date = start.format("%-m/%-d/%Y");
    match mode {
        TrendMode::Daily => date.to_string(),
        TrendMode::Weekly => format!("Week of {date}"),
    }
}

/// Accepts RFC 3339, a naive ISO date-time (read as UTC), or a bare date.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
