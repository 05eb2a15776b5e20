//! [Tibber](https://developer.tibber.com/docs/overview) GraphQL client.

use chrono::{DateTime, FixedOffset};
use itertools::Itertools;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
    api::client,
    prelude::*,
    quantity::{energy::KilowattHours, rate::KilowattHourRate},
};

const URL: &str = "https://api.tibber.com/v1-beta/gql";

const HOMES_QUERY: &str = "{ viewer { homes { id appNickname } } }";

const CONSUMPTION_QUERY: &str = "query Consumption($last: Int!) { viewer { homes { id appNickname consumption(resolution: HOURLY, last: $last) { nodes { from to unitPrice consumption currency } } } } }";

pub struct Api {
    client: Client,
    access_token: String,
}

impl Api {
    pub fn try_new(access_token: String) -> Result<Self> {
        Ok(Self { client: client::try_new()?, access_token })
    }

    #[instrument(skip_all)]
    pub async fn get_homes(&self) -> Result<Vec<Home>> {
        let viewer = self.query(&Request { query: HOMES_QUERY, variables: None }).await?;
        Ok(viewer.homes.into_iter().map(Home::from).collect())
    }

    /// Get the last `n_hours` of metered consumption of the home.
    ///
    /// Without an explicit home ID, the first home of the account is taken.
    #[instrument(skip_all, fields(home_id = ?home_id, n_hours = n_hours))]
    pub async fn get_hourly_consumption(
        &self,
        home_id: Option<&str>,
        n_hours: u32,
    ) -> Result<Consumption> {
        info!("fetching…");
        let request =
            Request { query: CONSUMPTION_QUERY, variables: Some(Variables { last: n_hours }) };
        let consumption = self.query(&request).await?.try_into_consumption(home_id)?;
        info!(
            home_id = %consumption.home.id,
            n_hours = consumption.hours.len(),
            currency = ?consumption.currency,
            "fetched",
        );
        Ok(consumption)
    }

    async fn query(&self, request: &Request) -> Result<Viewer> {
        let request = self.client.post(URL).bearer_auth(&self.access_token).json(request);
        client::send_with_retry(request)
            .await
            .context("failed to call Tibber")?
            .json::<Response<Data>>()
            .await
            .context("failed to deserialize the Tibber response")?
            .try_into_data()
            .map(|data| data.viewer)
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Home {
    pub id: String,
    pub nickname: Option<String>,
}

impl From<HomeNode> for Home {
    fn from(node: HomeNode) -> Self {
        Self { id: node.id, nickname: node.nickname }
    }
}

#[must_use]
pub struct Consumption {
    pub home: Home,

    /// Currency of the unit prices, absent when no hour carried one.
    pub currency: Option<String>,

    pub hours: Vec<(DateTime<FixedOffset>, KilowattHours, KilowattHourRate)>,
}

#[derive(Serialize)]
struct Request {
    query: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Variables>,
}

#[derive(Serialize)]
struct Variables {
    last: u32,
}

#[derive(Deserialize)]
struct Response<D> {
    data: Option<D>,

    #[serde(default)]
    errors: Vec<ResponseError>,
}

impl<D> Response<D> {
    fn try_into_data(self) -> Result<D> {
        if !self.errors.is_empty() {
            bail!(
                "Tibber returned errors: {}",
                self.errors.into_iter().map(|error| error.message).join("; "),
            );
        }
        self.data.context("Tibber returned no data")
    }
}

#[derive(Deserialize)]
struct ResponseError {
    message: String,
}

#[derive(Deserialize)]
struct Data {
    viewer: Viewer,
}

#[derive(Deserialize)]
struct Viewer {
    homes: Vec<HomeNode>,
}

impl Viewer {
    fn try_into_consumption(self, home_id: Option<&str>) -> Result<Consumption> {
        let home = match home_id {
            Some(home_id) => self
                .homes
                .into_iter()
                .find(|home| home.id == home_id)
                .with_context(|| format!("there is no home `{home_id}` on the account"))?,
            None => self.homes.into_iter().next().context("there are no homes on the account")?,
        };
        let nodes =
            home.consumption.as_ref().map_or(&[][..], |connection| connection.nodes.as_slice());
        let currency = nodes.iter().find_map(|node| node.currency.clone());
        let hours = nodes
            .iter()
            .filter_map(|node| {
                let (Some(consumption), Some(unit_price)) = (node.consumption, node.unit_price)
                else {
                    debug!(from = %node.from, "skipped unavailable hour");
                    return None;
                };
                Some((
                    node.from,
                    KilowattHours::from(consumption),
                    KilowattHourRate::from(unit_price),
                ))
            })
            .collect();
        Ok(Consumption { home: home.into(), currency, hours })
    }
}

#[derive(Deserialize)]
struct HomeNode {
    id: String,

    #[serde(rename = "appNickname")]
    nickname: Option<String>,

    #[serde(default)]
    consumption: Option<ConsumptionConnection>,
}

#[derive(Deserialize)]
struct ConsumptionConnection {
    nodes: Vec<ConsumptionNode>,
}

#[derive(Deserialize)]
struct ConsumptionNode {
    from: DateTime<FixedOffset>,

    #[serde(rename = "unitPrice")]
    unit_price: Option<f64>,

    consumption: Option<f64>,

    currency: Option<String>,
}
