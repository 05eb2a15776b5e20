use std::collections::{BTreeMap, btree_map::Entry};

use chrono::NaiveDate;
use itertools::Itertools;

use crate::core::{day::Day, error::DataIntegrityError, record::HourlyRecord};

impl<T> AggregateDaily for T where T: ?Sized {}

pub trait AggregateDaily {
    /// Group the hourly records by their local calendar date and fold each group into a [`Day`].
    ///
    /// The records may come in any order and the days may be partial. Days absent from the input
    /// are not synthesized. The result is all-or-nothing: the first invalid record fails the call.
    fn try_aggregate_daily(self) -> Result<Vec<Day>, DataIntegrityError>
    where
        Self: Sized + IntoIterator<Item = HourlyRecord>,
    {
        let mut hours = BTreeMap::new();
        for record in self {
            record.validate()?;
            match hours.entry(record.timestamp) {
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
                Entry::Occupied(_) => {
                    return Err(DataIntegrityError::DuplicateHour { timestamp: record.timestamp });
                }
            }
        }

        let mut dates: BTreeMap<NaiveDate, Vec<HourlyRecord>> = BTreeMap::new();
        for record in hours.into_values() {
            dates.entry(record.timestamp.date_naive()).or_default().push(record);
        }

        let days = dates
            .into_iter()
            .map(|(date, hours)| Day::try_from_hours(date, &hours))
            .collect::<Result<Vec<_>, _>>()?;

        // Dates are local, so mixed offsets may reorder or collide the days' start instants:
        if let Some((_, day)) = days
            .iter()
            .tuple_windows()
            .find(|(previous, day)| previous.start_time >= day.start_time)
        {
            let date = day.start_time.date_naive();
            return Err(DataIntegrityError::InconsistentOffsets { date });
        }
        Ok(days)
    }
}
