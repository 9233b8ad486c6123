use crate::Config;
use crate::database::{DatabaseManager, DatabaseSubscriptionStore};
use crate::mrr::{MrrRow, MrrService};
use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};
use std::fmt::Write;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,
}

pub async fn handle_report_command(
    args: ReportArgs,
    config: &Config,
    database: Arc<dyn DatabaseManager>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(DatabaseSubscriptionStore::new(database));
    let service = MrrService::new(store, config.mrr.clone());

    let as_of = args.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let rows = service.series(as_of).await?;

    let output = match args.format {
        ReportFormat::Json => serde_json::to_string_pretty(&rows)?,
        ReportFormat::Table => render_table(&rows),
    };
    println!("{}", output);

    Ok(())
}

fn optional(value: Option<f64>, suffix: &str) -> String {
    value
        .map(|v| format!("{:.1}{}", v, suffix))
        .unwrap_or_else(|| "-".to_string())
}

/// Fixed-width text table of the series
pub fn render_table(rows: &[MrrRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>6} {:>9} {:>12} {:>11} {:>8}",
        "month", "subs", "customers", "mrr", "change", "change%"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<8} {:>6} {:>9} {:>12.2} {:>11} {:>8}",
            row.month,
            row.active_subscriptions,
            row.active_customers,
            row.mrr_amount,
            row.mrr_change
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string()),
            optional(row.mrr_change_pct, "%"),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(month: &str, cents: i64, change: Option<f64>, pct: Option<f64>) -> MrrRow {
        MrrRow {
            month: month.to_string(),
            active_subscriptions: 2,
            active_customers: 2,
            mrr_amount: cents as f64 / 100.0,
            mrr_cents: cents,
            mrr_change: change,
            mrr_change_pct: pct,
        }
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&[
            row("2025-01", 10800, None, None),
            row("2025-02", 17383, Some(65.83), Some(61.0)),
        ]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("month"));
        assert!(lines[1].starts_with("2025-01"));
        assert!(lines[1].contains("108.00"));
        assert!(lines[1].trim_end().ends_with('-'));
        assert!(lines[2].contains("173.83"));
        assert!(lines[2].contains("65.83"));
        assert!(lines[2].contains("61.0%"));
    }

    #[test]
    fn test_render_empty_series() {
        assert_eq!(render_table(&[]).lines().count(), 1);
    }
}
