use clap::Parser;
use itertools::Itertools;

use crate::{
    api::{svk, tibber},
    prelude::*,
    report::{Report, ReportContext},
};

#[derive(Parser)]
pub struct ReportArgs {
    #[clap(long = "tibber-access-token", env = "TIBBER_ACCESS_TOKEN", hide_env_values = true)]
    pub tibber_access_token: String,

    /// Tibber home, defaults to the first home of the account.
    #[clap(long = "tibber-home-id", env = "TIBBER_HOME_ID")]
    pub tibber_home_id: Option<String>,

    /// Number of past days to compare.
    #[clap(
        long = "days",
        default_value = "30",
        env = "HISTORY_DAYS",
        value_parser = clap::value_parser!(u32).range(1..=366),
    )]
    pub n_days: u32,

    /// SVK network area (elområde), for example `SE3`.
    #[clap(long = "network-area", env = "SVK_NETWORK_AREA")]
    pub network_area: String,
}

impl ReportArgs {
    #[instrument(skip_all, fields(n_days = self.n_days, network_area = %self.network_area))]
    pub async fn run(&self) -> Result<Report> {
        let consumption = tibber::Api::try_new(self.tibber_access_token.clone())?
            .get_hourly_consumption(self.tibber_home_id.as_deref(), self.n_days * 24)
            .await?;

        let dates = consumption.hours.iter().map(|(timestamp, _, _)| timestamp.date_naive());
        let records = match dates.minmax().into_option() {
            Some((from, to)) => {
                let weights =
                    svk::Api::try_new()?.get_profile(from, to, &self.network_area).await?;
                if weights.is_empty() {
                    warn!(%from, %to, "the consumption profile is empty");
                }
                weights.weigh(consumption.hours)
            }
            None => Vec::new(),
        };

        let context = ReportContext { currency: consumption.currency.unwrap_or_default() };
        Report::try_build(&context, records)
    }
}
