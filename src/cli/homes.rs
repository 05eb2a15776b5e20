use clap::Parser;

use crate::{
    api::tibber::{self, Home},
    prelude::*,
};

#[derive(Parser)]
pub struct HomesArgs {
    #[clap(long = "tibber-access-token", env = "TIBBER_ACCESS_TOKEN", hide_env_values = true)]
    pub tibber_access_token: String,
}

impl HomesArgs {
    pub async fn run(&self) -> Result<Vec<Home>> {
        let homes = tibber::Api::try_new(self.tibber_access_token.clone())?.get_homes().await?;
        info!(n_homes = homes.len(), "fetched");
        Ok(homes)
    }
}
