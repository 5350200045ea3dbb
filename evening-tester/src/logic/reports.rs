use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::{DuelRecord, StrategyAggregate};

#[derive(Serialize)]
struct JsonReport<'a> {
    aggregates: &'a [StrategyAggregate],
    records: &'a [DuelRecord],
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[DuelRecord],
    aggregates: &[StrategyAggregate],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Duel Sweep Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=====================".cyan())?;

    let total = records.len();
    let clean = records.iter().filter(|r| r.passed()).count();
    let broken = total - clean;

    writeln!(writer, "Total duels: {total}")?;
    writeln!(writer, "Clean: {}", clean.to_string().green())?;
    writeln!(writer, "Contract violations: {}", broken.to_string().red())?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for aggregate in aggregates {
        let status = if aggregate.violations == 0 {
            "✅".green()
        } else {
            "❌".red()
        };
        writeln!(writer, "{status} {}", aggregate.strategy.label().bold())?;
        writeln!(
            writer,
            "   Duels: {} | Wins {} ({:.1}%) | Losses {} ({:.1}%) | Unfinished {}",
            aggregate.duels,
            aggregate.wins,
            aggregate.win_rate * 100.0,
            aggregate.losses,
            aggregate.loss_rate * 100.0,
            aggregate.unfinished
        )?;
        writeln!(
            writer,
            "   Mean turns {:.2} | Mean shots {:.2} | Items used {} | Mean HP left {:.2}",
            aggregate.mean_turns,
            aggregate.mean_shots,
            aggregate.items_used,
            aggregate.mean_player_hp
        )?;
        writeln!(writer)?;
    }

    let failures: Vec<&DuelRecord> = records.iter().filter(|r| !r.passed()).collect();
    if !failures.is_empty() {
        writeln!(writer, "{}", "⚠️  Violations".bright_yellow().bold())?;
        writeln!(writer, "{}", "=============".yellow())?;
        for record in failures {
            writeln!(
                writer,
                "   • {} seed {}: {}",
                record.strategy,
                record.seed,
                record.violations.join(" | ").red()
            )?;
        }
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[DuelRecord],
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    let report = JsonReport {
        aggregates,
        records,
    };
    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[DuelRecord],
    aggregates: &[StrategyAggregate],
) -> Result<()> {
    writeln!(writer, "# Evening Duel Sweep Results\n")?;

    let total = records.len();
    let clean = records.iter().filter(|r| r.passed()).count();
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total duels**: {total}")?;
    writeln!(writer, "- **Clean**: {clean}")?;
    writeln!(writer, "- **Contract violations**: {}\n", total - clean)?;

    writeln!(writer, "## Strategies\n")?;
    writeln!(
        writer,
        "| Strategy | Duels | Win % | Loss % | Unfinished | Mean turns | Mean shots | Items | Mean HP left |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|---|")?;
    for aggregate in aggregates {
        writeln!(
            writer,
            "| {} | {} | {:.1} | {:.1} | {} | {:.2} | {:.2} | {} | {:.2} |",
            aggregate.strategy.label(),
            aggregate.duels,
            aggregate.win_rate * 100.0,
            aggregate.loss_rate * 100.0,
            aggregate.unfinished,
            aggregate.mean_turns,
            aggregate.mean_shots,
            aggregate.items_used,
            aggregate.mean_player_hp
        )?;
    }

    let failures: Vec<&DuelRecord> = records.iter().filter(|r| !r.passed()).collect();
    if !failures.is_empty() {
        writeln!(writer, "\n## Violations\n")?;
        for record in failures {
            writeln!(
                writer,
                "- {} seed {}: {}",
                record.strategy,
                record.seed,
                record.violations.join("; ")
            )?;
        }
    }
    Ok(())
}

pub fn generate_csv_report<W: Write + ?Sized>(writer: &mut W, records: &[DuelRecord]) -> Result<()> {
    writeln!(
        writer,
        "strategy,seed,iteration,outcome,turns,shots,items_used,player_hp,adversary_hp,violations"
    )?;
    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{},{}",
            record.strategy.key(),
            record.seed,
            record.iteration,
            record.outcome_label(),
            record.turns,
            record.shots,
            record.items_used,
            record.player_hp,
            record.adversary_hp,
            record.violations.len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::Strategy;
    use crate::logic::tester::aggregate_records;
    use evening_duel::DuelOutcome;

    fn sample_records() -> Vec<DuelRecord> {
        let base = DuelRecord {
            strategy: Strategy::Odds,
            seed: 42,
            iteration: 0,
            outcome: Some(DuelOutcome::Victory),
            turns: 5,
            shots: 9,
            items_used: 2,
            actions: 12,
            player_hp: 3,
            adversary_hp: 0,
            violations: Vec::new(),
            duration: Duration::from_millis(2),
        };
        let broken = DuelRecord {
            seed: 43,
            outcome: Some(DuelOutcome::Defeat),
            player_hp: 0,
            adversary_hp: 2,
            violations: vec!["adversary committed to a blank".to_string()],
            ..base.clone()
        };
        vec![base, broken]
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn console_report_lists_strategies_and_violations() {
        let records = sample_records();
        let aggregates = aggregate_records(&records);
        let out = render(|w| {
            generate_console_report(w, &records, &aggregates, Duration::from_millis(5))
        });
        assert!(out.contains("Duel Sweep Summary"));
        assert!(out.contains("Odds"));
        assert!(out.contains("adversary committed to a blank"));
    }

    #[test]
    fn json_report_is_parseable() {
        let records = sample_records();
        let aggregates = aggregate_records(&records);
        let out = render(|w| generate_json_report(w, &records, &aggregates));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["records"].as_array().map(Vec::len), Some(2));
        assert_eq!(value["aggregates"][0]["strategy"], "odds");
    }

    #[test]
    fn markdown_report_has_table_row() {
        let records = sample_records();
        let aggregates = aggregate_records(&records);
        let out = render(|w| generate_markdown_report(w, &records, &aggregates));
        assert!(out.starts_with("# Evening Duel Sweep Results"));
        assert!(out.contains("| Odds | 2 | 50.0 | 50.0 |"));
        assert!(out.contains("## Violations"));
    }

    #[test]
    fn csv_report_has_header_and_rows() {
        let records = sample_records();
        let out = render(|w| generate_csv_report(w, &records));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("strategy,seed"));
        assert_eq!(lines[2], "odds,43,0,defeat,5,9,2,0,2,1");
    }
}
