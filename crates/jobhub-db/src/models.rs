//! Database-side record types and column decoding helpers.
//! Entity types themselves live in jobhub-types; rows are decoded straight
//! into them.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

use jobhub_types::models::{Role, User};

/// Fields needed to insert a user. The password is already hashed.
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: Role,
}

/// A user together with the stored password hash. Never serialized.
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Current time in the fixed-width format stored in every timestamp column,
/// so lexical and chronological order agree.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => raw.parse().map(Some).map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

pub(crate) fn enum_col<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn timestamp_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_date_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(raw) => raw.parse().map(Some).map_err(|e| conversion_error(idx, e)),
        None => Ok(None),
    }
}

pub(crate) fn opt_u32_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u32>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|v| v.max(0) as u32))
}

pub(crate) fn u32_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    Ok(row.get::<_, i64>(idx)?.max(0) as u32)
}

/// Accepts RFC 3339 and SQLite's own `datetime('now')` format (naive UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    raw.parse::<DateTime<Utc>>().or_else(|_| {
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_timestamp_formats() {
        let rfc = parse_timestamp("2026-03-01T10:20:30.000000Z").unwrap();
        let sqlite = parse_timestamp("2026-03-01 10:20:30").unwrap();
        assert_eq!(rfc, sqlite);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn now_is_fixed_width() {
        assert_eq!(now().len(), "2026-03-01T10:20:30.000000Z".len());
    }
}
