use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments. Anything left unset falls back to the config
/// file, then to built-in defaults.
#[derive(Clone, Parser, Debug)]
#[command(
    name = "agri_dashboard",
    version,
    about = "District-level crop production insights for one state"
)]
pub struct Args {
    /// Path to the pre-cleaned crop production CSV
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// State to analyse (case-insensitive)
    #[arg(long)]
    pub state: Option<String>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of districts offered and crops shown per view
    #[arg(long = "top-k", value_name = "N")]
    pub top_k: Option<usize>,

    /// District to show (defaults to the highest ranked one)
    #[arg(long)]
    pub district: Option<String>,

    /// First year of the range (inclusive)
    #[arg(long, value_name = "YEAR")]
    pub from: Option<i32>,

    /// Last year of the range (inclusive)
    #[arg(long, value_name = "YEAR")]
    pub to: Option<i32>,

    /// Plot top-crop production on a linear axis
    #[arg(long = "no-log-scale")]
    pub no_log_scale: bool,

    /// Render a single dashboard and exit instead of opening the menu
    #[arg(long)]
    pub once: bool,

    /// Directory for CSV/JSON/SVG exports
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,
}
