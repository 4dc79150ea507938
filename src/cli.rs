use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sitegrade",
    version,
    about = "Website health grader for lead lists"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Grade a single website and print the report
    Audit {
        /// Website URL (scheme optional, https assumed)
        url: String,

        /// Also write the audit report as a PDF
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,
    },

    /// Grade every row of a lead CSV (requires a 'Website' column)
    Bulk {
        /// Lead list CSV
        input: PathBuf,

        /// Scored CSV output, worst leads first
        #[arg(short, long, default_value = "scored.csv", value_name = "FILE")]
        output: PathBuf,

        /// Also dump one JSON audit record per row
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Geocode the 'Address' column and write a Leaflet map
        #[arg(long, value_name = "FILE")]
        map: Option<PathBuf>,

        /// Plain per-row progress lines instead of the dashboard
        #[arg(long)]
        quiet: bool,
    },
}
