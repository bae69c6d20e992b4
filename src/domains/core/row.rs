//! Conversions between SQLite TEXT columns and domain values.

use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;
use uuid::Uuid;

/// Calendar dates are stored as `YYYY-MM-DD`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_uuid(value: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| DomainError::InvalidUuid(value.to_string()))
}

pub fn parse_optional_uuid(value: Option<&str>) -> DomainResult<Option<Uuid>> {
    value.map(parse_uuid).transpose()
}

pub fn parse_datetime(value: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}

pub fn parse_date(value: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}

pub fn parse_optional_date(value: Option<&str>) -> DomainResult<Option<NaiveDate>> {
    value.map(parse_date).transpose()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a TEXT column into one of the string-backed enums in `crate::types`
pub fn parse_enum<T>(field: &str, value: &str) -> DomainResult<T>
where
    T: FromStr<Err = String>,
{
    T::from_str(value).map_err(|e| DomainError::Internal(format!("Invalid {} column: {}", field, e)))
}

/// Integer columns that must fit an unsigned locator (week, month)
pub fn parse_optional_u32(field: &str, value: Option<i64>) -> DomainResult<Option<u32>> {
    value
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| DomainError::Internal(format!("Invalid {} column: {}", field, v)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PriorityScope;

    #[test]
    fn test_parse_helpers() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_uuid("nope"), Err(DomainError::InvalidUuid(_))));
        assert_eq!(parse_optional_uuid(None).unwrap(), None);

        let date = parse_date("2025-01-27").unwrap();
        assert_eq!(format_date(date), "2025-01-27");
        assert!(parse_date("27/01/2025").is_err());

        assert!(parse_datetime("2025-01-27T08:00:00+00:00").is_ok());
        assert!(matches!(parse_datetime("yesterday"), Err(DomainError::InvalidDate(_))));

        let scope: PriorityScope = parse_enum("scope", "monthly").unwrap();
        assert_eq!(scope, PriorityScope::Monthly);
        assert!(parse_enum::<PriorityScope>("scope", "hourly").is_err());

        assert_eq!(parse_optional_u32("month", Some(3)).unwrap(), Some(3));
        assert!(parse_optional_u32("month", Some(-1)).is_err());
    }
}
