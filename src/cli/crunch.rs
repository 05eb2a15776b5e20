use std::{fs, path::PathBuf};

use clap::Parser;

use crate::{
    core::{RawHourlyRecord, try_from_raw},
    prelude::*,
    report::{Report, ReportContext},
};

#[derive(Parser)]
pub struct CrunchArgs {
    /// JSON file with an array of `{timestamp, consumption, spot_price, profile_weight}` records.
    pub path: PathBuf,

    #[clap(long, default_value = "SEK", env = "CURRENCY")]
    pub currency: String,
}

impl CrunchArgs {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub fn run(&self) -> Result<Report> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read `{}`", self.path.display()))?;
        let raw_records: Vec<RawHourlyRecord> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to deserialize `{}`", self.path.display()))?;
        let records = try_from_raw(raw_records).context("the input records are invalid")?;
        info!(n_records = records.len(), "loaded");
        Report::try_build(&ReportContext { currency: self.currency.clone() }, records)
    }
}
