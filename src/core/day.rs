use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::Serialize;

use crate::{
    core::{error::DataIntegrityError, record::HourlyRecord},
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
};

/// Per-day summary carrying both cost models side by side.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Day {
    /// Local midnight of the day.
    pub start_time: DateTime<FixedOffset>,

    pub consumption: KilowattHours,

    /// Cost under hourly spot-price billing.
    pub total_cost: Cost,

    /// Cost if the day's consumption followed the reference profile shape.
    pub potential_cost: Cost,

    /// Effective average price paid, absent when nothing was consumed.
    pub actual_kwh_price: Option<KilowattHourRate>,
}

impl Day {
    /// Fold the day's hours, which must be sorted by time and already validated.
    pub(super) fn try_from_hours(
        date: NaiveDate,
        hours: &[HourlyRecord],
    ) -> Result<Self, DataIntegrityError> {
        let consumption: KilowattHours = hours.iter().map(|hour| hour.consumption).sum();
        let total_cost: Cost = hours.iter().map(|hour| hour.consumption * hour.spot_price).sum();

        let potential_cost = if consumption == KilowattHours::ZERO {
            Cost::ZERO
        } else {
            let weights =
                normalized_weights(hours).ok_or(DataIntegrityError::DegenerateProfile { date })?;
            let profiled_rate: KilowattHourRate =
                hours.iter().zip(weights).map(|(hour, weight)| hour.spot_price * weight).sum();
            consumption * profiled_rate
        };

        if !(consumption.0.0.is_finite()
            && total_cost.0.0.is_finite()
            && potential_cost.0.0.is_finite())
        {
            return Err(DataIntegrityError::NotFiniteTotal { date });
        }

        // The first hour of the day carries the offset in effect at midnight:
        let offset = hours.first().map_or_else(|| Utc.fix(), |hour| *hour.timestamp.offset());
        let start_time =
            DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN) - offset, offset);

        Ok(Self {
            start_time,
            consumption,
            total_cost,
            potential_cost,
            actual_kwh_price: (consumption != KilowattHours::ZERO)
                .then(|| total_cost / consumption),
        })
    }

    pub const fn has_sufficient_data(&self) -> bool {
        self.actual_kwh_price.is_some()
    }

    /// Average price under the profiled model, absent when nothing was consumed.
    pub fn profiled_kwh_price(&self) -> Option<KilowattHourRate> {
        self.has_sufficient_data().then(|| self.potential_cost / self.consumption)
    }

    /// Positive when hourly billing was cheaper than the profiled one.
    pub fn savings(&self) -> Cost {
        self.potential_cost - self.total_cost
    }
}

/// Rescale the hours' profile weights to sum up to one.
///
/// Partial days carry only a part of the full-day profile, the rescaled weights
/// still redistribute the whole of the day's consumption.
pub(super) fn normalized_weights(hours: &[HourlyRecord]) -> Option<Vec<f64>> {
    let total: f64 = hours.iter().map(|hour| hour.profile_weight).sum();
    (total > 0.0).then(|| hours.iter().map(|hour| hour.profile_weight / total).collect())
}
