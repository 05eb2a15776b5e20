use chrono::{DateTime, FixedOffset, NaiveDate};

/// Numeric field of an hourly record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Field {
    #[display("consumption")]
    Consumption,

    #[display("spot_price")]
    SpotPrice,

    #[display("profile_weight")]
    ProfileWeight,
}

/// The input violates a domain invariant and cannot be aggregated.
///
/// Fatal to the aggregation call: nothing is ever coerced or skipped.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("record at {timestamp}: `{field}` must not be negative, got {value}")]
    Negative { timestamp: DateTime<FixedOffset>, field: Field, value: f64 },

    #[error("record at {timestamp}: `{field}` is not a finite number")]
    NotFinite { timestamp: DateTime<FixedOffset>, field: Field },

    #[error("record at {timestamp} is not aligned to the hour")]
    NotHourAligned { timestamp: DateTime<FixedOffset> },

    #[error("duplicate record at {timestamp}")]
    DuplicateHour { timestamp: DateTime<FixedOffset> },

    #[error("record #{index}: timestamp `{timestamp}` carries no timezone offset")]
    MissingTimezone { index: usize, timestamp: String },

    #[error("record #{index}: `{timestamp}` is not a valid timestamp")]
    InvalidTimestamp { index: usize, timestamp: String },

    #[error("profile weights on {date} sum to zero, the consumption cannot be redistributed")]
    DegenerateProfile { date: NaiveDate },

    #[error("the totals on {date} are not finite numbers")]
    NotFiniteTotal { date: NaiveDate },

    #[error("the day of {date} does not start after the previous day, mixed offsets collide")]
    InconsistentOffsets { date: NaiveDate },
}
