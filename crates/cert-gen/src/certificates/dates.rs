//! Date handling shared by the payload commands.
//!
//! Certificate bodies print dates as `DD.MM.YYYY`; the IVA and MSVA fail
//! notices use `DD/MM/YYYY`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use super::domain::{TestOutcome, VehicleType};

pub const CERTIFICATE_DATE_FORMAT: &str = "%d.%m.%Y";
pub const APPROVAL_DATE_FORMAT: &str = "%d/%m/%Y";

pub fn certificate_date(date: NaiveDate) -> String {
    date.format(CERTIFICATE_DATE_FORMAT).to_string()
}

pub fn approval_date(date: NaiveDate) -> String {
    date.format(APPROVAL_DATE_FORMAT).to_string()
}

/// Goods vehicles that pass may be presented from the first day of the month
/// before their anniversary; everything else prints the anniversary itself.
pub fn earliest_date_of_next_test(
    vehicle_type: VehicleType,
    outcome: TestOutcome,
    anniversary: NaiveDate,
) -> NaiveDate {
    let passed = matches!(outcome, TestOutcome::Pass | TestOutcome::Prs);
    if !(vehicle_type.is_goods_vehicle() && passed) {
        return anniversary;
    }

    let (year, month) = if anniversary.month() == 1 {
        (anniversary.year() - 1, 12)
    } else {
        (anniversary.year(), anniversary.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(anniversary)
}

pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|dt| dt.date_naive()))
}

pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("failed to parse '{raw}' as an ISO-8601 timestamp"))
    })
}

pub(crate) fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_timestamp(raw).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("failed to parse '{raw}' as an ISO-8601 timestamp"))
        }),
    }
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_date(raw).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("failed to parse '{raw}' as a date"))
        }),
    }
}
