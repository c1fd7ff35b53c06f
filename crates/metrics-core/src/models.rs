use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketing channel a spend or conversion row is attributed to.
///
/// Variants are declared in label order so the derived `Ord` matches the
/// alphabetical channel ordering of the exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Email campaigns.
    Email,
    /// Paid search (pay-per-click).
    #[serde(rename = "PPC")]
    Ppc,
    /// Paid social advertising.
    Social,
}

impl Channel {
    /// All channels, in output order.
    pub const ALL: [Channel; 3] = [Channel::Email, Channel::Ppc, Channel::Social];

    /// The canonical label used in the exported CSV files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::Ppc => "PPC",
            Channel::Social => "Social",
        }
    }

    /// Case-insensitive construction from a raw CSV label.
    ///
    /// Accepts the canonical labels plus `"Social Media"`, the label the
    /// legacy conversions log used for the social channel.
    /// Returns `None` for anything outside the fixed 3-element set.
    pub fn parse_label(value: &str) -> Option<Channel> {
        match value.trim().to_lowercase().as_str() {
            "ppc" => Some(Channel::Ppc),
            "email" => Some(Channel::Email),
            "social" | "social media" => Some(Channel::Social),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day of activity for a single channel, read from a channel source file.
///
/// Numeric columns a source does not carry are zero-filled so the three
/// channel tables share a common column superset. `impressions` is meaningful
/// for Social only, `emails_sent` for Email only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Calendar date of the activity (no time component).
    pub date: NaiveDate,
    /// Channel this row is attributed to.
    pub channel: Channel,
    /// Money spent on this channel that day.
    #[serde(default)]
    pub spend: f64,
    /// Clicks recorded (or imputed) that day.
    #[serde(default)]
    pub clicks: f64,
    /// Ad impressions served (Social only).
    #[serde(default)]
    pub impressions: f64,
    /// Emails delivered (Email only).
    #[serde(default)]
    pub emails_sent: f64,
}

/// A single raw row from the website conversions log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRecord {
    /// Unique conversion identifier. Rows sharing an id are line items of
    /// one conversion.
    pub conversion_id: String,
    /// Calendar date the conversion occurred.
    pub date: NaiveDate,
    /// Channel credited with the conversion.
    pub channel: Channel,
    /// Revenue attributed to this row.
    #[serde(default)]
    pub revenue: f64,
}

/// Conversions grouped by (date, channel), the authoritative join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionAggregate {
    pub date: NaiveDate,
    pub channel: Channel,
    /// Revenue summed over every raw row in the group.
    pub revenue: f64,
    /// Count of distinct conversion ids within the group.
    pub conversions: u64,
}

/// One (date, channel) row of the daily output table: activity left-joined
/// with the conversion aggregate for the same key.
///
/// Field order matches the `aggregated_daily.csv` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub channel: Channel,
    pub spend: f64,
    pub clicks: f64,
    pub impressions: f64,
    pub emails_sent: f64,
    pub revenue: f64,
    pub conversions: u64,
}

impl MergedRecord {
    /// Start a merged row from an activity row with explicit zero defaults
    /// for the conversion-side columns.
    pub fn from_activity(activity: &ActivityRecord) -> Self {
        Self {
            date: activity.date,
            channel: activity.channel,
            spend: activity.spend,
            clicks: activity.clicks,
            impressions: activity.impressions,
            emails_sent: activity.emails_sent,
            revenue: 0.0,
            conversions: 0,
        }
    }

    /// Fold another activity row for the same (date, channel) key into this
    /// one. Keeps the at-most-once key invariant when a source repeats a day.
    pub fn absorb_activity(&mut self, activity: &ActivityRecord) {
        self.spend += activity.spend;
        self.clicks += activity.clicks;
        self.impressions += activity.impressions;
        self.emails_sent += activity.emails_sent;
    }
}

/// Metrics summed within one Monday-anchored week for one channel.
///
/// Field order matches the `aggregated_weekly.csv` header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    /// The Monday that opens this row's 7-day window.
    pub week_start: NaiveDate,
    pub channel: Channel,
    pub spend: f64,
    pub clicks: f64,
    pub impressions: f64,
    pub emails_sent: f64,
    pub revenue: f64,
    pub conversions: u64,
}

impl WeeklyRecord {
    /// An empty weekly bucket for the given key.
    pub fn new(week_start: NaiveDate, channel: Channel) -> Self {
        Self {
            week_start,
            channel,
            spend: 0.0,
            clicks: 0.0,
            impressions: 0.0,
            emails_sent: 0.0,
            revenue: 0.0,
            conversions: 0,
        }
    }

    /// Accumulate a daily row into this bucket. Only additive metrics are
    /// summed; ratio KPIs are recomputed from the sums afterwards.
    pub fn add(&mut self, record: &MergedRecord) {
        self.spend += record.spend;
        self.clicks += record.clicks;
        self.impressions += record.impressions;
        self.emails_sent += record.emails_sent;
        self.revenue += record.revenue;
        self.conversions += record.conversions;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
