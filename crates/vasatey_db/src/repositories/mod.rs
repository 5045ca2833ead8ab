//! Repository modules for database access

pub mod alert_sql;
pub mod notification_sql;

pub use alert_sql::SqlAlertRepository;
pub use notification_sql::SqlNotificationRepository;

use chrono::{DateTime, Utc};

use crate::error::DbError;

/// Timestamps are stored as epoch milliseconds; `Any` cannot decode dates.
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| DbError::DecodeError(format!("timestamp out of range: {ms}")))
}

/// Placeholder selected for a NULL timestamp column. `Any` cannot decode NULL
/// into `Option<T>`, so nullable columns are read through `COALESCE`.
pub(crate) const NULL_MILLIS: i64 = -1;

pub(crate) fn optional_millis(ms: i64) -> Result<Option<DateTime<Utc>>, DbError> {
    if ms == NULL_MILLIS {
        return Ok(None);
    }
    from_millis(ms).map(Some)
}

/// Nullable text columns are read as `COALESCE(col, '')`.
pub(crate) fn optional_text(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
