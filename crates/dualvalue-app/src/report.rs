// Rendering batch and comparison results as plain text or JSON.

use chrono::{DateTime, Utc};
use dualvalue_baseball::valuation::{BatchReport, Comparison, EvaluationRecord, Signal};
use serde::Serialize;
use std::io::{self, Write};

/// A batch result stamped with its source and generation time.
#[derive(Debug, Serialize)]
pub struct EvaluationReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    #[serde(flatten)]
    pub batch: &'a BatchReport,
}

#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    #[serde(flatten)]
    pub comparison: &'a Comparison,
}

fn fmt_score(score: Option<f64>) -> String {
    score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}"))
}

fn fmt_delta(delta: Option<f64>) -> String {
    delta.map_or_else(|| "-".to_string(), |d| format!("{d:+.1}"))
}

fn write_record_line(out: &mut impl Write, record: &EvaluationRecord) -> io::Result<()> {
    writeln!(
        out,
        "  {:<24} {:<6} {:>7} {:>7} {:>7}  {:<15} {:>4.2}",
        record.name,
        record.position,
        fmt_score(record.fantasy_score()),
        fmt_score(record.peripheral_score()),
        fmt_delta(record.delta),
        record.signal.label(),
        record.confidence,
    )?;
    if !record.flags.is_empty() {
        writeln!(out, "      {}", record.flags.join("; "))?;
    }
    if let Some(reason) = &record.reason {
        writeln!(out, "      {reason}")?;
    }
    Ok(())
}

fn write_header(out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "  {:<24} {:<6} {:>7} {:>7} {:>7}  {:<15} {:>4}",
        "Player", "Pos", "Fantasy", "Periph", "Delta", "Signal", "Conf"
    )
}

fn write_section(out: &mut impl Write, title: &str, records: &[EvaluationRecord]) -> io::Result<()> {
    writeln!(out, "{title} ({})", records.len())?;
    if records.is_empty() {
        writeln!(out, "  none")?;
    } else {
        write_header(out)?;
        for record in records {
            write_record_line(out, record)?;
        }
    }
    writeln!(out)
}

/// Human-readable rendering of a batch run.
pub fn write_evaluation_text(out: &mut impl Write, report: &EvaluationReport<'_>) -> io::Result<()> {
    let batch = report.batch;
    writeln!(
        out,
        "Dual-value report for {} ({})",
        report.source,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    )?;
    writeln!(out)?;

    write_section(out, "Buy-low candidates", &batch.buy_low)?;
    write_section(out, "Sell-high candidates", &batch.sell_high)?;
    write_section(out, "All players", &batch.records)?;

    if !batch.unevaluated.is_empty() {
        writeln!(out, "Skipped ({})", batch.unevaluated.len())?;
        for skipped in &batch.unevaluated {
            writeln!(out, "  {:<24} {}", skipped.name, skipped.reason)?;
        }
        writeln!(out)?;
    }

    let unevaluable = batch
        .records
        .iter()
        .filter(|r| r.signal == Signal::Unevaluable)
        .count();
    writeln!(
        out,
        "{} players, {} unevaluable, {} skipped",
        batch.total(),
        unevaluable,
        batch.unevaluated.len()
    )
}

/// Human-readable rendering of a head-to-head comparison.
pub fn write_comparison_text(out: &mut impl Write, report: &ComparisonReport<'_>) -> io::Result<()> {
    let cmp = report.comparison;
    writeln!(out, "Comparison from {}", report.source)?;
    writeln!(out)?;
    write_header(out)?;
    write_record_line(out, &cmp.first)?;
    write_record_line(out, &cmp.second)?;
    writeln!(out)?;
    writeln!(out, "Verdict: {}", cmp.summary)
}

/// Pretty JSON followed by a newline.
pub fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dualvalue_baseball::config::EngineConfig;
    use dualvalue_baseball::player::PlayerRow;
    use dualvalue_baseball::valuation::{compare_players, evaluate_batch, BatchOptions};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap()
    }

    fn sample_batch() -> BatchReport {
        let rows = vec![
            PlayerRow::new("Contact Guy", "2B")
                .with_stat("OBP", 0.400)
                .with_stat("Hard_Hit%", 50.0),
            PlayerRow::new("Empty Line", "C"),
            PlayerRow::new("Skip Me", "MGR"),
        ];
        let options = BatchOptions {
            min_confidence: 0.0,
            ..BatchOptions::default()
        };
        evaluate_batch(&rows, &EngineConfig::default(), &options)
    }

    #[test]
    fn text_report_lists_sections() {
        let batch = sample_batch();
        let report = EvaluationReport {
            generated_at: fixed_time(),
            source: "roster.csv".into(),
            batch: &batch,
        };
        let mut buf = Vec::new();
        write_evaluation_text(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Dual-value report for roster.csv (2026-04-01 12:00 UTC)"));
        assert!(text.contains("Buy-low candidates (1)"));
        assert!(text.contains("Sell-high candidates (0)"));
        assert!(text.contains("Contact Guy"));
        assert!(text.contains("+100.0"));
        assert!(text.contains("Skipped (1)"));
        assert!(text.contains("3 players, 1 unevaluable, 1 skipped"));
    }

    #[test]
    fn json_report_is_flattened_and_stamped() {
        let batch = sample_batch();
        let report = EvaluationReport {
            generated_at: fixed_time(),
            source: "roster.csv".into(),
            batch: &batch,
        };
        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["generated_at"], "2026-04-01T12:00:00Z");
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
        assert_eq!(value["buy_low"][0]["name"], "Contact Guy");
        assert_eq!(value["unevaluated"][0]["name"], "Skip Me");
        assert!(value["records"][1]["delta"].is_null());
    }

    #[test]
    fn comparison_text_ends_with_verdict() {
        let a = PlayerRow::new("Cooling Off", "SS")
            .with_stat("R", 110.0)
            .with_stat("RBI", 100.0)
            .with_stat("OBP", 0.370)
            .with_stat("Hard_Hit%", 28.0)
            .with_stat("Barrel%", 4.0);
        let b = PlayerRow::new("Heating Up", "SS")
            .with_stat("R", 50.0)
            .with_stat("RBI", 45.0)
            .with_stat("OBP", 0.300)
            .with_stat("Hard_Hit%", 48.0)
            .with_stat("Barrel%", 14.0);
        let cmp = compare_players(&a, &b, &EngineConfig::default()).unwrap();
        let report = ComparisonReport {
            generated_at: fixed_time(),
            source: "pool.csv".into(),
            comparison: &cmp,
        };
        let mut buf = Vec::new();
        write_comparison_text(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.trim_end().ends_with(&cmp.summary));
        assert!(text.contains("Cooling Off"));
        assert!(text.contains("Heating Up"));
    }
}
