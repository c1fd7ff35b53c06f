use std::collections::BTreeMap;

use crate::models::{Channel, MergedRecord, WeeklyRecord};

/// Divide, resolving a zero denominator to `None`.
///
/// A missing KPI is "not applicable", never 0, infinity, or NaN, and is
/// excluded from channel summaries rather than dragging them down.
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Render a KPI for display: `"n/a"` when the ratio is undefined.
pub fn format_kpi(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

// ── MetricTotals ──────────────────────────────────────────────────────────────

/// Interface for any row or total that carries the summable marketing
/// metrics, so the same ratio KPIs can be derived at every granularity.
pub trait MetricTotals {
    fn spend(&self) -> f64;
    fn clicks(&self) -> f64;
    fn impressions(&self) -> f64;
    fn emails_sent(&self) -> f64;
    fn revenue(&self) -> f64;
    fn conversions(&self) -> u64;
}

impl MetricTotals for MergedRecord {
    fn spend(&self) -> f64 {
        self.spend
    }
    fn clicks(&self) -> f64 {
        self.clicks
    }
    fn impressions(&self) -> f64 {
        self.impressions
    }
    fn emails_sent(&self) -> f64 {
        self.emails_sent
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
    fn conversions(&self) -> u64 {
        self.conversions
    }
}

impl MetricTotals for WeeklyRecord {
    fn spend(&self) -> f64 {
        self.spend
    }
    fn clicks(&self) -> f64 {
        self.clicks
    }
    fn impressions(&self) -> f64 {
        self.impressions
    }
    fn emails_sent(&self) -> f64 {
        self.emails_sent
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
    fn conversions(&self) -> u64 {
        self.conversions
    }
}

// ── ChannelKpis ───────────────────────────────────────────────────────────────

/// The standard ratio KPIs derived from one set of metric totals.
///
/// Every field is `None` when its denominator is zero, so CTR is naturally
/// absent for channels without impressions and email CTR for channels
/// without sent emails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelKpis {
    /// Click-through rate: clicks / impressions.
    pub ctr: Option<f64>,
    /// Conversion rate: conversions / clicks.
    pub cvr: Option<f64>,
    /// Cost per click: spend / clicks.
    pub cpc: Option<f64>,
    /// Cost per acquisition: spend / conversions.
    pub cpa: Option<f64>,
    /// Return on ad spend: revenue / spend.
    pub roas: Option<f64>,
    /// Email click-through rate: clicks / emails sent.
    pub email_ctr: Option<f64>,
}

impl ChannelKpis {
    /// Derive all ratio KPIs from summed numerators and denominators.
    ///
    /// Ratios must be recomputed from sums at each granularity, never
    /// averaged from finer-grained ratios.
    pub fn from_totals<T: MetricTotals>(totals: &T) -> Self {
        Self {
            ctr: safe_ratio(totals.clicks(), totals.impressions()),
            cvr: safe_ratio(totals.conversions() as f64, totals.clicks()),
            cpc: safe_ratio(totals.spend(), totals.clicks()),
            cpa: safe_ratio(totals.spend(), totals.conversions() as f64),
            roas: safe_ratio(totals.revenue(), totals.spend()),
            email_ctr: safe_ratio(totals.clicks(), totals.emails_sent()),
        }
    }
}

// ── Channel summaries ─────────────────────────────────────────────────────────

/// Metric totals accumulated across all of one channel's daily rows.
#[derive(Debug, Clone, Default)]
pub struct ChannelTotals {
    pub spend: f64,
    pub clicks: f64,
    pub impressions: f64,
    pub emails_sent: f64,
    pub revenue: f64,
    pub conversions: u64,
}

impl ChannelTotals {
    /// Add a single daily row's metrics to the running totals.
    pub fn add_record(&mut self, record: &MergedRecord) {
        self.spend += record.spend;
        self.clicks += record.clicks;
        self.impressions += record.impressions;
        self.emails_sent += record.emails_sent;
        self.revenue += record.revenue;
        self.conversions += record.conversions;
    }
}

impl MetricTotals for ChannelTotals {
    fn spend(&self) -> f64 {
        self.spend
    }
    fn clicks(&self) -> f64 {
        self.clicks
    }
    fn impressions(&self) -> f64 {
        self.impressions
    }
    fn emails_sent(&self) -> f64 {
        self.emails_sent
    }
    fn revenue(&self) -> f64 {
        self.revenue
    }
    fn conversions(&self) -> u64 {
        self.conversions
    }
}

/// Totals plus derived KPIs for one channel.
#[derive(Debug, Clone)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub totals: ChannelTotals,
    pub kpis: ChannelKpis,
}

/// Sum each channel's daily rows and recompute the ratio KPIs from the sums.
///
/// Returns one summary per channel present in `records`, in channel order.
pub fn summarize_channels(records: &[MergedRecord]) -> Vec<ChannelSummary> {
    let mut totals: BTreeMap<Channel, ChannelTotals> = BTreeMap::new();

    for record in records {
        totals.entry(record.channel).or_default().add_record(record);
    }

    totals
        .into_iter()
        .map(|(channel, totals)| {
            let kpis = ChannelKpis::from_totals(&totals);
            ChannelSummary {
                channel,
                totals,
                kpis,
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
