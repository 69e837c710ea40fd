use clap::Parser;
use std::path::PathBuf;

use crate::config::AppType;
use crate::window::TimeUnit;

pub const DEFAULT_REPORT_NAME: &str = "inefficient-cluster-costs";

#[derive(Parser, Debug)]
#[command(
    name = "inefficient-cluster-costs",
    about = "Report cluster costs and analysis insights for recent jobs as CSV",
    version,
    long_about = None
)]
pub struct Args {
    /// Base URL of the monitoring platform
    #[arg(short, long, env = "UNRAVEL_URL")]
    pub url: String,

    /// Unit of the look-back window; match it to how often the report runs
    #[arg(long, value_enum, default_value_t = TimeUnit::Days)]
    pub poll_unit: TimeUnit,

    /// Length of the look-back window in `poll_unit`s
    #[arg(long, default_value_t = 90, allow_negative_numbers = true)]
    pub poll_value: i64,

    /// Workload types to search for
    #[arg(long = "app-type", value_enum, default_values_t = [AppType::Spark])]
    pub app_types: Vec<AppType>,

    /// Number of records requested per search page
    #[arg(long, default_value_t = 10_000)]
    pub page_size: usize,

    /// Keep requesting pages until every matching record is fetched
    #[arg(long)]
    pub paginate: bool,

    /// Keep duplicate insights, for impact assessment
    #[arg(long)]
    pub keep_duplicates: bool,

    /// Emit a row for clusters that have no insights
    #[arg(long)]
    pub include_clusters_without_insights: bool,

    /// Directory the report is written to [default: Data/<report-name>]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Prefix of the report file name
    #[arg(long, default_value = DEFAULT_REPORT_NAME)]
    pub report_name: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
