//! [Svenska kraftnät](https://mimer.svk.se) consumption profile client.

use chrono::{NaiveDate, NaiveDateTime};
use reqwest::{Client, Url};

use crate::{api::client, core::ProfileWeights, prelude::*};

const URL: &str = "https://mimer.svk.se/ConsumptionProfile/DownloadText";

pub struct Api(Client);

impl Api {
    pub fn try_new() -> Result<Self> {
        Ok(Self(client::try_new()?))
    }

    /// Get the hourly consumption profile of the network area over the dates, both inclusive.
    #[instrument(skip_all, fields(from = %from, to = %to, network_area = network_area))]
    pub async fn get_profile(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        network_area: &str,
    ) -> Result<ProfileWeights> {
        info!("fetching…");
        let mut url = Url::parse(URL)?;
        url.query_pairs_mut()
            .append_pair("groupByType", "0")
            .append_pair("periodFrom", &from.format("%Y-%m-%d").to_string())
            .append_pair("periodTo", &to.format("%Y-%m-%d").to_string())
            .append_pair("networkAreaIdString", network_area);
        let text = client::send_with_retry(self.0.get(url))
            .await
            .context("failed to call SVK")?
            .text()
            .await
            .context("failed to read the SVK response")?;
        let points = parse_profile(&text).context("failed to parse the SVK profile")?;
        info!(n_points = points.len(), "fetched");
        Ok(points.into_iter().collect())
    }
}

/// Parse the semicolon-separated profile export into hourly points.
///
/// Lines that do not start with a timestamp are headers.
pub fn parse_profile(text: &str) -> Result<Vec<(NaiveDateTime, f64)>> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

fn parse_line(line_number: usize, line: &str) -> Option<Result<(NaiveDateTime, f64)>> {
    let mut fields = line.split(';').map(str::trim);
    let time = fields.next().and_then(parse_time)?;
    let Some(value) = fields.rfind(|field| !field.is_empty()) else {
        return Some(Err(anyhow!("line {line_number}: the value is missing")));
    };
    Some(
        value
            .replace(',', ".")
            .parse::<f64>()
            .map(|value| (time, value))
            .with_context(|| format!("line {line_number}: invalid value `{value}`")),
    )
}

fn parse_time(field: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S"))
        .ok()
}
