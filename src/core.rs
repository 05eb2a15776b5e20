mod aggregate;
mod day;
mod error;
mod profile;
mod record;

pub use self::{
    aggregate::AggregateDaily,
    day::Day,
    error::DataIntegrityError,
    profile::ProfileWeights,
    record::{HourlyRecord, RawHourlyRecord, try_from_raw},
};
