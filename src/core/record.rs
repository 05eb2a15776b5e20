use std::str::FromStr;

use bon::Builder;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::{
    core::error::{DataIntegrityError, Field},
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// One clock hour of household consumption with its spot price
/// and the reference profile weight of that hour.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Builder)]
pub struct HourlyRecord {
    /// Start of the hour, with the offset the provider stamped it with.
    pub timestamp: DateTime<FixedOffset>,

    #[builder(into)]
    pub consumption: KilowattHours,

    #[builder(into)]
    pub spot_price: KilowattHourRate,

    /// Relative share of the day's consumption a typical household uses in this hour.
    pub profile_weight: f64,
}

impl HourlyRecord {
    pub fn validate(&self) -> Result<(), DataIntegrityError> {
        self.ensure_non_negative(Field::Consumption, self.consumption.0.0)?;
        self.ensure_non_negative(Field::SpotPrice, self.spot_price.0.0)?;
        self.ensure_non_negative(Field::ProfileWeight, self.profile_weight)?;
        if self.timestamp.minute() != 0
            || self.timestamp.second() != 0
            || self.timestamp.nanosecond() != 0
        {
            return Err(DataIntegrityError::NotHourAligned { timestamp: self.timestamp });
        }
        Ok(())
    }

    fn ensure_non_negative(&self, field: Field, value: f64) -> Result<(), DataIntegrityError> {
        if !value.is_finite() {
            Err(DataIntegrityError::NotFinite { timestamp: self.timestamp, field })
        } else if value < 0.0 {
            Err(DataIntegrityError::Negative { timestamp: self.timestamp, field, value })
        } else {
            Ok(())
        }
    }
}

/// Hourly record as it comes in from a file, before the timestamp is checked.
#[derive(Deserialize)]
pub struct RawHourlyRecord {
    pub timestamp: String,
    pub consumption: f64,
    pub spot_price: f64,
    pub profile_weight: f64,
}

impl RawHourlyRecord {
    /// Convert the raw record, `index` is its position in the input and identifies it in errors.
    pub fn try_into_record(self, index: usize) -> Result<HourlyRecord, DataIntegrityError> {
        Ok(HourlyRecord::builder()
            .timestamp(parse_timestamp(index, &self.timestamp)?)
            .consumption(self.consumption)
            .spot_price(self.spot_price)
            .profile_weight(self.profile_weight)
            .build())
    }
}

pub fn try_from_raw(
    records: impl IntoIterator<Item = RawHourlyRecord>,
) -> Result<Vec<HourlyRecord>, DataIntegrityError> {
    records.into_iter().enumerate().map(|(index, record)| record.try_into_record(index)).collect()
}

/// Parse an RFC 3339 timestamp, telling a missing offset apart from garbage.
fn parse_timestamp(
    index: usize,
    timestamp: &str,
) -> Result<DateTime<FixedOffset>, DataIntegrityError> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(timestamp) {
        return Ok(timestamp);
    }
    if is_naive(timestamp) {
        Err(DataIntegrityError::MissingTimezone { index, timestamp: timestamp.to_owned() })
    } else {
        Err(DataIntegrityError::InvalidTimestamp { index, timestamp: timestamp.to_owned() })
    }
}

/// Whether the timestamp is a local date or date-time without any offset.
fn is_naive(timestamp: &str) -> bool {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    NaiveDateTime::from_str(timestamp).is_ok()
        || FORMATS.iter().any(|format| NaiveDateTime::parse_from_str(timestamp, format).is_ok())
        || NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::prelude::*;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    #[test]
    fn test_validate_ok() {
        let record = HourlyRecord::builder()
            .timestamp(cet().with_ymd_and_hms(2025, 1, 15, 7, 0, 0).unwrap())
            .consumption(1.2)
            .spot_price(0.0)
            .profile_weight(0.04)
            .build();
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn test_validate_negative_consumption() {
        let timestamp = cet().with_ymd_and_hms(2025, 1, 15, 7, 0, 0).unwrap();
        let record = HourlyRecord::builder()
            .timestamp(timestamp)
            .consumption(-1.0)
            .spot_price(1.0)
            .profile_weight(0.04)
            .build();
        assert_eq!(
            record.validate(),
            Err(DataIntegrityError::Negative { timestamp, field: Field::Consumption, value: -1.0 })
        );
    }

    #[test]
    fn test_validate_negative_price() {
        let record = HourlyRecord::builder()
            .timestamp(cet().with_ymd_and_hms(2025, 1, 15, 7, 0, 0).unwrap())
            .consumption(1.0)
            .spot_price(-0.05)
            .profile_weight(0.04)
            .build();
        assert!(matches!(
            record.validate(),
            Err(DataIntegrityError::Negative { field: Field::SpotPrice, .. })
        ));
    }

    #[test]
    fn test_validate_not_finite_weight() {
        let record = HourlyRecord::builder()
            .timestamp(cet().with_ymd_and_hms(2025, 1, 15, 7, 0, 0).unwrap())
            .consumption(1.0)
            .spot_price(1.0)
            .profile_weight(f64::NAN)
            .build();
        assert!(matches!(
            record.validate(),
            Err(DataIntegrityError::NotFinite { field: Field::ProfileWeight, .. })
        ));
    }

    #[test]
    fn test_validate_not_hour_aligned() {
        let record = HourlyRecord::builder()
            .timestamp(cet().with_ymd_and_hms(2025, 1, 15, 7, 30, 0).unwrap())
            .consumption(1.0)
            .spot_price(1.0)
            .profile_weight(0.04)
            .build();
        assert!(matches!(record.validate(), Err(DataIntegrityError::NotHourAligned { .. })));
    }

    #[test]
    fn test_try_from_raw_ok() -> Result {
        // language=JSON
        const INPUT: &str = r#"
            [
                {
                    "timestamp": "2025-01-15T00:00:00+01:00",
                    "consumption": 2.0,
                    "spot_price": 1.0,
                    "profile_weight": 0.5
                }
            ]
        "#;
        let records = try_from_raw(serde_json::from_str::<Vec<RawHourlyRecord>>(INPUT)?)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].timestamp, cet().with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(records[0].consumption, KilowattHours::from(2.0));
        Ok(())
    }

    #[test]
    fn test_try_from_raw_missing_timezone() {
        let records = [
            RawHourlyRecord {
                timestamp: "2025-01-15T00:00:00Z".to_owned(),
                consumption: 1.0,
                spot_price: 1.0,
                profile_weight: 0.5,
            },
            RawHourlyRecord {
                timestamp: "2025-01-15T01:00:00".to_owned(),
                consumption: 1.0,
                spot_price: 1.0,
                profile_weight: 0.5,
            },
        ];
        assert_eq!(
            try_from_raw(records),
            Err(DataIntegrityError::MissingTimezone {
                index: 1,
                timestamp: "2025-01-15T01:00:00".to_owned()
            })
        );
    }

    #[test]
    fn test_try_from_raw_invalid_timestamp() {
        let records = [RawHourlyRecord {
            timestamp: "yesterday".to_owned(),
            consumption: 1.0,
            spot_price: 1.0,
            profile_weight: 0.5,
        }];
        assert!(matches!(
            try_from_raw(records),
            Err(DataIntegrityError::InvalidTimestamp { index: 0, .. })
        ));
    }

    #[test]
    fn test_try_from_raw_missing_timezone_short_forms() {
        for timestamp in ["2025-01-15T01:00", "2025-01-15 01:00", "2025-01-15"] {
            let records = [RawHourlyRecord {
                timestamp: timestamp.to_owned(),
                consumption: 1.0,
                spot_price: 1.0,
                profile_weight: 0.5,
            }];
            assert_eq!(
                try_from_raw(records),
                Err(DataIntegrityError::MissingTimezone {
                    index: 0,
                    timestamp: timestamp.to_owned()
                }),
                "{timestamp}",
            );
        }
    }
}
