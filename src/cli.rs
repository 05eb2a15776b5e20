mod crunch;
mod homes;
mod report;

use clap::{Parser, Subcommand};

pub use self::{crunch::CrunchArgs, homes::HomesArgs, report::ReportArgs};
use crate::{
    prelude::*,
    report::Report,
    tables::{build_days_table, build_homes_table, build_summary_table, verdict_text},
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Print the report as JSON instead of the tables.
    #[clap(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the consumption and the profile, and compare the costs.
    #[clap(name = "report")]
    Report(Box<ReportArgs>),

    /// Compare the costs over hourly records read from a JSON file.
    #[clap(name = "crunch")]
    Crunch(Box<CrunchArgs>),

    /// List the Tibber homes of the account.
    #[clap(name = "homes")]
    Homes(Box<HomesArgs>),
}

impl Args {
    pub async fn run(self) -> Result {
        let report = match self.command {
            Command::Report(args) => args.run().await?,
            Command::Crunch(args) => args.run()?,
            Command::Homes(args) => {
                let homes = args.run().await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&homes)?);
                } else {
                    println!("{}", build_homes_table(&homes));
                }
                return Ok(());
            }
        };
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &Report) {
    println!("{}", build_days_table(report));
    println!("{}", build_summary_table(report));
    println!("{}", verdict_text(&report.summary));
}
