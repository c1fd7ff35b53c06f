use clap::Parser;
use std::path::{Path, PathBuf};

// ── Benchmark constants ───────────────────────────────────────────────────────

/// Assumed cost per click (CAD) used to impute missing PPC clicks.
/// Typical CPC runs 0.50 to 5.00; this is the midpoint estimate.
pub const DEFAULT_ASSUMED_CPC: f64 = 2.0;

/// Assumed cost (CAD) per 1000 emails sent, used to impute missing email
/// spend. Typical CPM runs 5 to 50; this is the midpoint estimate.
pub const DEFAULT_EMAIL_CPM: f64 = 30.0;

// ── Fixed file names ──────────────────────────────────────────────────────────

pub const PPC_FILE: &str = "ppc_spend.csv";
pub const EMAIL_FILE: &str = "email_campaigns.csv";
pub const SOCIAL_FILE: &str = "social_media_ads.csv";
pub const CONVERSIONS_FILE: &str = "website_conversions.csv";
pub const DAILY_OUT_FILE: &str = "aggregated_daily.csv";
pub const WEEKLY_OUT_FILE: &str = "aggregated_weekly.csv";

// ── BenchmarkRates ────────────────────────────────────────────────────────────

/// Industry-benchmark rates used when a source omits a numeric column.
///
/// Both rates must be positive; the defaults are the named constants above,
/// and tests override them explicitly instead of relying on literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkRates {
    /// Cost per click; missing PPC clicks are estimated as spend / cpc.
    pub assumed_cpc: f64,
    /// Cost per 1000 emails; missing email spend is estimated as
    /// emails_sent * cpm / 1000.
    pub email_cpm: f64,
}

impl Default for BenchmarkRates {
    fn default() -> Self {
        Self {
            assumed_cpc: DEFAULT_ASSUMED_CPC,
            email_cpm: DEFAULT_EMAIL_CPM,
        }
    }
}

// ── Settings (CLI) ────────────────────────────────────────────────────────────

/// Daily and weekly channel aggregation over the four marketing CSV sources
#[derive(Parser, Debug, Clone)]
#[command(
    name = "campaign-metrics",
    about = "Merge PPC, email and social activity with website conversions into daily/weekly KPI tables",
    version
)]
pub struct Settings {
    /// Directory containing the four input CSV files
    #[arg(long, default_value = "data")]
    pub data_path: PathBuf,

    /// Directory for the aggregated output files (defaults to the data directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Assumed cost per click used to impute missing PPC clicks
    #[arg(long, default_value_t = DEFAULT_ASSUMED_CPC)]
    pub assumed_cpc: f64,

    /// Assumed cost per 1000 emails used to impute missing email spend
    #[arg(long, default_value_t = DEFAULT_EMAIL_CPM)]
    pub email_cpm: f64,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,
}

impl Settings {
    /// The benchmark rates selected on the command line.
    pub fn rates(&self) -> BenchmarkRates {
        BenchmarkRates {
            assumed_cpc: self.assumed_cpc,
            email_cpm: self.email_cpm,
        }
    }

    pub fn ppc_file(&self) -> PathBuf {
        self.data_path.join(PPC_FILE)
    }

    pub fn email_file(&self) -> PathBuf {
        self.data_path.join(EMAIL_FILE)
    }

    pub fn social_file(&self) -> PathBuf {
        self.data_path.join(SOCIAL_FILE)
    }

    pub fn conversions_file(&self) -> PathBuf {
        self.data_path.join(CONVERSIONS_FILE)
    }

    pub fn daily_out(&self) -> PathBuf {
        self.out_dir().join(DAILY_OUT_FILE)
    }

    pub fn weekly_out(&self) -> PathBuf {
        self.out_dir().join(WEEKLY_OUT_FILE)
    }

    fn out_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or(&self.data_path)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
