//! Text and JSON rendering of analysis results.

use std::io::{self, Write};

use archive_core::error::ArchiveError;
use archive_core::formatting::{bar_length, format_count, format_seconds};
use archive_data::analysis::MessageAnalysis;
use archive_data::reader::FileStatus;

const BAR_CHAR: char = '█';

/// Which activity views to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    All,
    Daily,
    Hourly,
    Monthly,
}

impl View {
    /// Parse a `--view` value; unknown values fall back to `All`.
    pub fn parse(s: &str) -> Self {
        match s {
            "daily" => View::Daily,
            "hourly" => View::Hourly,
            "monthly" => View::Monthly,
            _ => View::All,
        }
    }

    fn shows(self, view: View) -> bool {
        self == View::All || self == view
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Print the selected views as bar charts followed by a run summary.
pub fn write_messages_text<W: Write>(
    out: &mut W,
    analysis: &MessageAnalysis,
    view: View,
    bar_width: usize,
) -> io::Result<()> {
    let metrics = &analysis.metrics;

    if metrics.is_empty() {
        writeln!(out, "No messages found.")?;
    } else {
        if view.shows(View::Daily) {
            let rows = metrics
                .daily
                .iter()
                .map(|(day, total)| (day.format("%Y-%m-%d").to_string(), *total))
                .collect();
            write_chart(out, "Daily Activity", rows, bar_width)?;
        }
        if view.shows(View::Hourly) {
            let rows = metrics
                .hourly
                .iter()
                .map(|(hour, total)| (format!("{:02}:00", hour), *total))
                .collect();
            write_chart(out, "Hourly Activity", rows, bar_width)?;
        }
        if view.shows(View::Monthly) {
            let rows = metrics
                .monthly
                .iter()
                .map(|(month, total)| (month.to_string(), *total))
                .collect();
            write_chart(out, "Monthly Activity", rows, bar_width)?;
        }
    }

    write_summary(out, analysis)
}

/// Print the analysis as JSON, keeping only the selected views.
pub fn write_messages_json<W: Write>(
    out: &mut W,
    analysis: &MessageAnalysis,
    view: View,
) -> anyhow::Result<()> {
    let mut value = serde_json::to_value(analysis)?;
    if let Some(metrics) = value.get_mut("metrics").and_then(|m| m.as_object_mut()) {
        for (key, kind) in [
            ("daily", View::Daily),
            ("hourly", View::Hourly),
            ("monthly", View::Monthly),
        ] {
            if !view.shows(kind) {
                metrics.remove(key);
            }
        }
    }
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}

fn write_chart<W: Write>(
    out: &mut W,
    title: &str,
    rows: Vec<(String, u64)>,
    bar_width: usize,
) -> io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))?;

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, total)| *total).max().unwrap_or(0);

    for (label, total) in &rows {
        let bar: String = std::iter::repeat(BAR_CHAR)
            .take(bar_length(*total, max, bar_width))
            .collect();
        writeln!(
            out,
            "{:<width$}  {} {}",
            label,
            bar,
            format_count(*total),
            width = label_width
        )?;
    }
    writeln!(out)
}

fn write_summary<W: Write>(out: &mut W, analysis: &MessageAnalysis) -> io::Result<()> {
    let meta = &analysis.metadata;

    writeln!(
        out,
        "{} messages, {} characters ({} skipped) from {} of {} files [{}]",
        format_count(meta.records as u64),
        format_count(meta.total_characters),
        format_count(meta.entries_skipped as u64),
        meta.files_loaded,
        meta.files_requested,
        meta.timezone,
    )?;
    if let (Some(first), Some(last)) = (&meta.first_message, &meta.last_message) {
        writeln!(out, "Range: {} .. {}", first, last)?;
    }
    if meta.decode_failures > 0 {
        writeln!(
            out,
            "{} garbled character sequences could not be decoded and were dropped",
            meta.decode_failures
        )?;
    }
    for file in &analysis.files {
        if let FileStatus::Failed { reason } = &file.status {
            writeln!(out, "Skipped {}: {}", file.path.display(), reason)?;
        }
    }
    writeln!(
        out,
        "Loaded in {}, aggregated in {}",
        format_seconds(meta.load_time_seconds),
        format_seconds(meta.aggregate_time_seconds)
    )
}

// ── Unfollowers ───────────────────────────────────────────────────────────────

/// Print the non-reciprocal follows, one `@name` per line.
pub fn write_unfollowers_text<W: Write>(out: &mut W, names: &[String]) -> io::Result<()> {
    if names.is_empty() {
        return writeln!(out, "Everyone you follow follows you back.");
    }
    writeln!(out, "Users who don't follow you back:")?;
    writeln!(out)?;
    for name in names {
        writeln!(out, "- @{}", name)?;
    }
    writeln!(out)?;
    writeln!(out, "{} accounts", format_count(names.len() as u64))
}

pub fn write_unfollowers_json<W: Write>(out: &mut W, names: &[String]) -> anyhow::Result<()> {
    let value = serde_json::json!({ "status": "ok", "unfollowers": names });
    serde_json::to_writer_pretty(&mut *out, &value)?;
    writeln!(out)?;
    Ok(())
}

/// Report a reconciliation that could not read its inputs.
///
/// This is a notice, not a crash: the shell still exits normally.
pub fn write_follow_failure<W: Write>(
    out: &mut W,
    error: &ArchiveError,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({ "status": "failed", "reason": error.to_string() });
        serde_json::to_writer_pretty(&mut *out, &value)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Could not compare follow lists: {}", error)?;
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use archive_core::models::{ActivityMetrics, MonthKey};
    use archive_data::analysis::AnalysisMetadata;
    use archive_data::reader::FileReport;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn sample_analysis() -> MessageAnalysis {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut metrics = ActivityMetrics::default();
        metrics.daily.insert(day, 1_500);
        metrics
            .daily
            .insert(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 750);
        metrics.hourly.insert(7, 750);
        metrics.hourly.insert(21, 1_500);
        metrics.monthly.insert(MonthKey::from_date(day), 2_250);

        MessageAnalysis {
            metrics,
            metadata: AnalysisMetadata {
                generated_at: "2024-03-11T00:00:00+00:00".to_string(),
                timezone: "UTC".to_string(),
                files_requested: 2,
                files_loaded: 1,
                files_failed: 1,
                records: 12,
                entries_skipped: 3,
                decode_failures: 1,
                total_characters: 2_250,
                first_message: Some("2024-03-09T07:00:00+00:00".to_string()),
                last_message: Some("2024-03-10T21:00:00+00:00".to_string()),
                load_time_seconds: 0.012,
                aggregate_time_seconds: 0.0,
            },
            files: vec![
                FileReport {
                    path: PathBuf::from("inbox/a/message_1.json"),
                    status: FileStatus::Loaded {
                        records: 12,
                        skipped: 3,
                        decode_failures: 1,
                    },
                },
                FileReport {
                    path: PathBuf::from("inbox/b/message_1.json"),
                    status: FileStatus::Failed {
                        reason: "Failed to parse JSON: EOF".to_string(),
                    },
                },
            ],
        }
    }

    fn render_text(analysis: &MessageAnalysis, view: View) -> String {
        let mut buf = Vec::new();
        write_messages_text(&mut buf, analysis, view, 20).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_view_parse() {
        assert_eq!(View::parse("daily"), View::Daily);
        assert_eq!(View::parse("hourly"), View::Hourly);
        assert_eq!(View::parse("monthly"), View::Monthly);
        assert_eq!(View::parse("all"), View::All);
        assert_eq!(View::parse("bogus"), View::All);
    }

    #[test]
    fn test_text_report_all_views() {
        let text = render_text(&sample_analysis(), View::All);

        assert!(text.contains("Daily Activity"));
        assert!(text.contains("Hourly Activity"));
        assert!(text.contains("Monthly Activity"));
        assert!(text.contains(&format!("2024-03-09  {} 1,500", "█".repeat(20))));
        assert!(text.contains(&format!("2024-03-10  {} 750", "█".repeat(10))));
        assert!(text.contains("07:00"));
        assert!(text.contains(&format!("3-24  {} 2,250", "█".repeat(20))));
    }

    #[test]
    fn test_text_report_hourly_in_ascending_order() {
        let text = render_text(&sample_analysis(), View::Hourly);
        let seven = text.find("07:00").unwrap();
        let twenty_one = text.find("21:00").unwrap();
        assert!(seven < twenty_one);
        assert!(!text.contains("Daily Activity"));
        assert!(!text.contains("Monthly Activity"));
    }

    #[test]
    fn test_text_report_summary_lists_failures() {
        let text = render_text(&sample_analysis(), View::Monthly);
        assert!(text.contains("12 messages, 2,250 characters (3 skipped) from 1 of 2 files [UTC]"));
        assert!(text.contains("Skipped inbox/b/message_1.json: Failed to parse JSON: EOF"));
        assert!(text.contains("1 garbled character sequences"));
        assert!(text.contains("Loaded in 12ms"));
    }

    #[test]
    fn test_text_report_empty_metrics() {
        let mut analysis = sample_analysis();
        analysis.metrics = ActivityMetrics::default();
        let text = render_text(&analysis, View::All);
        assert!(text.starts_with("No messages found."));
        assert!(!text.contains("Daily Activity"));
    }

    #[test]
    fn test_json_report_filters_views() {
        let mut buf = Vec::new();
        write_messages_json(&mut buf, &sample_analysis(), View::Monthly).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["metrics"]["monthly"]["3-24"], 2_250);
        assert!(value["metrics"].get("daily").is_none());
        assert!(value["metrics"].get("hourly").is_none());
        assert_eq!(value["files"][1]["status"], "failed");
    }

    #[test]
    fn test_unfollowers_text() {
        let mut buf = Vec::new();
        write_unfollowers_text(&mut buf, &["bob".to_string(), "carol".to_string()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Users who don't follow you back:\n\n- @bob\n- @carol\n\n2 accounts\n"
        );
    }

    #[test]
    fn test_unfollowers_text_empty() {
        let mut buf = Vec::new();
        write_unfollowers_text(&mut buf, &[]).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Everyone you follow follows you back.\n"
        );
    }

    #[test]
    fn test_unfollowers_json() {
        let mut buf = Vec::new();
        write_unfollowers_json(&mut buf, &["bob".to_string()]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["unfollowers"][0], "bob");
    }

    #[test]
    fn test_follow_failure_notice() {
        let err = ArchiveError::InvalidShape("followers entry 0 has no string_list_data".into());

        let mut buf = Vec::new();
        write_follow_failure(&mut buf, &err, false).unwrap();
        assert!(String::from_utf8(buf)
            .unwrap()
            .starts_with("Could not compare follow lists: Invalid follow list"));

        let mut buf = Vec::new();
        write_follow_failure(&mut buf, &err, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["status"], "failed");
    }
}
