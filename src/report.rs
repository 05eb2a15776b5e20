use serde::{Serialize, Serializer, ser::SerializeStruct};

use crate::{
    core::{AggregateDaily, Day, HourlyRecord},
    prelude::*,
    quantity::{cost::Cost, energy::KilowattHours},
};

/// What the report is built for, passed explicitly rather than kept in a global session.
#[must_use]
#[derive(Clone, Debug)]
pub struct ReportContext {
    /// Currency code the costs are expressed in, for display.
    pub currency: String,
}

#[must_use]
#[derive(Serialize)]
pub struct Report {
    pub currency: String,
    pub days: Vec<Day>,
    pub summary: Summary,
}

impl Report {
    /// Aggregate the hourly records and summarise the days.
    #[instrument(skip_all, fields(n_records = records.len()))]
    pub fn try_build(context: &ReportContext, records: Vec<HourlyRecord>) -> Result<Self> {
        ensure!(!records.is_empty(), "no hourly data is available for the requested period");
        let days = records
            .try_aggregate_daily()
            .context("the hourly data is corrupted, refusing to compare the costs")?;
        let summary = days.iter().collect::<Summary>();
        info!(n_days = summary.n_days, verdict = ?summary.verdict(), "built the report");
        Ok(Self { currency: context.currency.clone(), days, summary })
    }
}

/// Window totals, always plain sums over the days so that they match the per-day figures.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Summary {
    pub n_days: usize,
    pub consumption: KilowattHours,
    pub total_cost: Cost,
    pub potential_cost: Cost,
}

impl<'a> FromIterator<&'a Day> for Summary {
    fn from_iter<T: IntoIterator<Item = &'a Day>>(iterator: T) -> Self {
        let mut this = Self {
            n_days: 0,
            consumption: KilowattHours::ZERO,
            total_cost: Cost::ZERO,
            potential_cost: Cost::ZERO,
        };
        for day in iterator {
            this.n_days += 1;
            this.consumption += day.consumption;
            this.total_cost += day.total_cost;
            this.potential_cost += day.potential_cost;
        }
        this
    }
}

impl Summary {
    /// Positive when hourly billing was cheaper than the profiled one.
    pub fn savings(&self) -> Cost {
        self.potential_cost - self.total_cost
    }

    pub fn verdict(&self) -> Verdict {
        if self.total_cost < self.potential_cost { Verdict::Saved } else { Verdict::PaidMore }
    }
}

impl Serialize for Summary {
    /// Serialize the totals together with the derived savings and verdict.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Summary", 6)?;
        state.serialize_field("n_days", &self.n_days)?;
        state.serialize_field("consumption", &self.consumption)?;
        state.serialize_field("total_cost", &self.total_cost)?;
        state.serialize_field("potential_cost", &self.potential_cost)?;
        state.serialize_field("savings", &self.savings())?;
        state.serialize_field("verdict", &self.verdict())?;
        state.end()
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Hourly billing came out cheaper.
    Saved,

    /// Hourly billing cost at least as much as the profiled price would have.
    PaidMore,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{FixedOffset, TimeZone};

    use super::*;

    fn context() -> ReportContext {
        ReportContext { currency: "SEK".to_owned() }
    }

    fn record(day: u32, hour: u32, consumption: f64, spot_price: f64) -> HourlyRecord {
        HourlyRecord::builder()
            .timestamp(
                FixedOffset::east_opt(3600)
                    .unwrap()
                    .with_ymd_and_hms(2025, 4, day, hour, 0, 0)
                    .unwrap(),
            )
            .consumption(consumption)
            .spot_price(spot_price)
            .profile_weight(if hour < 12 { 0.3 } else { 0.7 })
            .build()
    }

    #[test]
    fn test_summary_is_sum_of_days() -> Result {
        let records = vec![
            record(1, 3, 2.0, 0.5),
            record(1, 18, 1.0, 2.0),
            record(2, 3, 0.5, 0.4),
            record(2, 18, 0.5, 1.6),
        ];
        let report = Report::try_build(&context(), records)?;
        assert_eq!(report.currency, "SEK");
        assert_eq!(report.summary.n_days, 2);

        let consumption: KilowattHours = report.days.iter().map(|day| day.consumption).sum();
        let total_cost: Cost = report.days.iter().map(|day| day.total_cost).sum();
        let potential_cost: Cost = report.days.iter().map(|day| day.potential_cost).sum();
        assert_eq!(report.summary.consumption, consumption);
        assert_eq!(report.summary.total_cost, total_cost);
        assert_eq!(report.summary.potential_cost, potential_cost);
        Ok(())
    }

    #[test]
    fn test_verdict_saved() -> Result {
        // Consuming mostly in the cheap night hours:
        let report =
            Report::try_build(&context(), vec![record(1, 3, 3.0, 0.5), record(1, 18, 1.0, 2.0)])?;
        assert_abs_diff_eq!(report.summary.total_cost.0.0, 3.5);
        assert_abs_diff_eq!(report.summary.potential_cost.0.0, 4.0 * (0.3 * 0.5 + 0.7 * 2.0));
        assert_eq!(report.summary.verdict(), Verdict::Saved);
        assert!(report.summary.savings() > Cost::ZERO);
        Ok(())
    }

    #[test]
    fn test_verdict_paid_more() -> Result {
        let report =
            Report::try_build(&context(), vec![record(1, 3, 0.1, 0.5), record(1, 18, 3.0, 2.0)])?;
        assert_eq!(report.summary.verdict(), Verdict::PaidMore);
        assert!(report.summary.savings() < Cost::ZERO);
        Ok(())
    }

    #[test]
    fn test_even_is_not_saved() {
        let summary = Summary {
            n_days: 1,
            consumption: KilowattHours::from(1.0),
            total_cost: Cost::from(1.0),
            potential_cost: Cost::from(1.0),
        };
        assert_eq!(summary.verdict(), Verdict::PaidMore);
    }

    #[test]
    fn test_serialize_summary() -> Result {
        let summary = Summary {
            n_days: 2,
            consumption: KilowattHours::from(10.0),
            total_cost: Cost::from(8.0),
            potential_cost: Cost::from(9.0),
        };
        assert_eq!(
            serde_json::to_value(summary)?,
            serde_json::json!({
                "n_days": 2,
                "consumption": 10.0,
                "total_cost": 8.0,
                "potential_cost": 9.0,
                "savings": 1.0,
                "verdict": "saved",
            })
        );
        Ok(())
    }

    #[test]
    fn test_no_data() {
        assert!(Report::try_build(&context(), Vec::new()).is_err());
    }

    #[test]
    fn test_corrupted_data() {
        let result = Report::try_build(&context(), vec![record(1, 3, -2.0, 0.5)]);
        let error = result.err().unwrap();
        assert!(error.downcast_ref::<crate::core::DataIntegrityError>().is_some());
    }
}
