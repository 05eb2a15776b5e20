use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use itertools::Itertools;

use crate::{
    core::record::HourlyRecord,
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

/// Hourly shares of the reference household's daily consumption, keyed by local wall-clock time.
#[must_use]
#[derive(Debug, Default)]
pub struct ProfileWeights(BTreeMap<NaiveDateTime, f64>);

impl FromIterator<(NaiveDateTime, f64)> for ProfileWeights {
    /// Build the weights from an absolute consumption profile.
    ///
    /// Each hour gets its share of the date's total.
    fn from_iter<T: IntoIterator<Item = (NaiveDateTime, f64)>>(iterator: T) -> Self {
        let mut weights = BTreeMap::new();
        for (_, points) in iterator.into_iter().into_group_map_by(|(time, _)| time.date()) {
            let total: f64 = points.iter().map(|(_, value)| value).sum();
            if total > 0.0 {
                weights.extend(points.into_iter().map(|(time, value)| (time, value / total)));
            }
        }
        Self(weights)
    }
}

impl ProfileWeights {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, time: NaiveDateTime) -> Option<f64> {
        self.0.get(&time).copied()
    }

    /// Attach the profile weight to each metered hour.
    ///
    /// Hours the profile does not cover are dropped,
    /// the aggregation then treats their day as partial.
    pub fn weigh(
        &self,
        hours: impl IntoIterator<Item = (DateTime<FixedOffset>, KilowattHours, KilowattHourRate)>,
    ) -> Vec<HourlyRecord> {
        let mut n_dropped = 0_usize;
        let records = hours
            .into_iter()
            .filter_map(|(timestamp, consumption, spot_price)| {
                let Some(profile_weight) = self.get(timestamp.naive_local()) else {
                    n_dropped += 1;
                    return None;
                };
                Some(
                    HourlyRecord::builder()
                        .timestamp(timestamp)
                        .consumption(consumption)
                        .spot_price(spot_price)
                        .profile_weight(profile_weight)
                        .build(),
                )
            })
            .collect_vec();
        if n_dropped != 0 {
            warn!(n_dropped, "the consumption profile does not cover some of the metered hours");
        }
        records
    }
}
