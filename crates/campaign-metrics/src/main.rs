mod bootstrap;

use anyhow::Result;
use clap::Parser;
use metrics_core::kpi::{format_kpi, summarize_channels, ChannelSummary};
use metrics_core::settings::Settings;
use metrics_data::exporter;
use metrics_data::pipeline::run_pipeline;

fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("campaign-metrics v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data dir: {}, assumed CPC: {:.2}, email CPM: {:.2}",
        settings.data_path.display(),
        settings.assumed_cpc,
        settings.email_cpm
    );

    let result = run_pipeline(&settings)?;

    let daily_out = settings.daily_out();
    let weekly_out = settings.weekly_out();
    exporter::export_daily(&daily_out, &result.daily)?;
    exporter::export_weekly(&weekly_out, &result.weekly)?;

    tracing::info!(
        "Done in {:.2}s load + {:.2}s transform. Outputs: {} and {}",
        result.metadata.load_time_seconds,
        result.metadata.transform_time_seconds,
        daily_out.display(),
        weekly_out.display()
    );

    println!(
        "Aggregated {} daily rows into {} weekly rows.",
        result.daily.len(),
        result.weekly.len()
    );
    if result.metadata.unmatched_conversions > 0 {
        println!(
            "Note: {} conversion group(s) had no matching activity day (see log).",
            result.metadata.unmatched_conversions
        );
    }

    println!("Channel summary:");
    for summary in summarize_channels(&result.daily) {
        print_channel_summary(&summary);
    }

    Ok(())
}

/// One channel's totals and KPIs, with "n/a" for undefined ratios.
fn print_channel_summary(summary: &ChannelSummary) {
    let totals = &summary.totals;
    println!(
        "- {}: spend {:.2}, clicks {:.0}, conversions {}, revenue {:.2}",
        summary.channel, totals.spend, totals.clicks, totals.conversions, totals.revenue
    );

    let kpis = &summary.kpis;
    let mut line = format!(
        "    CTR {}  CVR {}  CPC {}  CPA {}  ROAS {}",
        format_kpi(kpis.ctr, 4),
        format_kpi(kpis.cvr, 4),
        format_kpi(kpis.cpc, 2),
        format_kpi(kpis.cpa, 2),
        format_kpi(kpis.roas, 2)
    );
    if kpis.email_ctr.is_some() {
        line.push_str(&format!("  email CTR {}", format_kpi(kpis.email_ctr, 4)));
    }
    println!("{line}");
}
