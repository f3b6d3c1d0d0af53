//! Deprecation status of resolved dependencies.

use crate::DependencyRecord;
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// How far ahead of its deprecation date a dependency is flagged.
pub const DEPRECATION_WARNING_DAYS: i64 = 30;

/// Where a dependency stands relative to its deprecation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeprecationStatus {
    /// No date, or the date is further away than the warning window.
    Current,
    /// The date falls within the warning window.
    SoonDeprecated(DateTime<Utc>),
    /// The date has passed.
    Deprecated(DateTime<Utc>),
}

impl DeprecationStatus {
    /// Classify `record` as of `now`.
    #[must_use]
    pub fn of(record: &DependencyRecord, now: DateTime<Utc>) -> Self {
        match record.deprecation_date {
            None => Self::Current,
            Some(date) if date <= now => Self::Deprecated(date),
            Some(date) if date - now <= Duration::days(DEPRECATION_WARNING_DAYS) => {
                Self::SoonDeprecated(date)
            }
            Some(_) => Self::Current,
        }
    }
}

/// Log a warning if `record` is deprecated or close to it.
pub fn warn_if_deprecated(record: &DependencyRecord, now: DateTime<Utc>) -> DeprecationStatus {
    let status = DeprecationStatus::of(record, now);
    match status {
        DeprecationStatus::Deprecated(date) => warn!(
            id = %record.id,
            version = %record.version,
            %date,
            "Dependency is deprecated"
        ),
        DeprecationStatus::SoonDeprecated(date) => warn!(
            id = %record.id,
            version = %record.version,
            %date,
            "Dependency will be deprecated soon"
        ),
        DeprecationStatus::Current => {}
    }
    status
}
