mod common;
mod logic;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use evening_duel::PlayerStats;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use common::split_csv;
use logic::{
    DuelRecord, DuelTester, Strategy, StrategyAggregate, aggregate_records, resolve_seed_inputs,
    resolve_strategies, validate_records,
};

#[derive(Debug, Parser)]
#[command(name = "evening-tester", version = "0.1.0")]
#[command(about = "Headless duel sweeps for the evening stage - strategies, seeds, and reports")]
struct Args {
    /// Strategies to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of duels per strategy and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Player vitality (1-10), drives starting HP
    #[arg(long, default_value_t = 8, allow_negative_numbers = true)]
    vitality: i32,

    /// Player resolve (1-10), drives the item grant
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    resolve: i32,

    /// Player insight (1-10), biases adversary targeting
    #[arg(long, default_value_t = 7, allow_negative_numbers = true)]
    insight: i32,

    /// Player rapport (1-10)
    #[arg(long, default_value_t = 6, allow_negative_numbers = true)]
    rapport: i32,

    /// Turn limit per duel
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Items the player may use per turn (unlimited when omitted)
    #[arg(long)]
    item_cap: Option<u32>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Args {
    fn stats(&self) -> PlayerStats {
        PlayerStats::new(self.vitality, self.resolve, self.insight, self.rapport)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let strategies = resolve_strategies(&split_csv(&args.strategies))?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let tester = DuelTester::new(args.stats(), args.verbose)
        .with_max_turns(args.max_turns)
        .with_item_cap(args.item_cap);

    let records = tester.run(&strategies, &seeds, args.iterations);
    let aggregates = aggregate_records(&records);

    write_reports(&args, &records, &aggregates, start_time)?;

    if let Err(err) = validate_records(&records) {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in Strategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:12} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🔫 Evening Duel Tester".bright_cyan().bold());
    println!("{}", "======================".cyan());
}

fn write_reports(
    args: &Args,
    records: &[DuelRecord],
    aggregates: &[StrategyAggregate],
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, records, aggregates)?,
        "markdown" => {
            if records.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Evening Duel Sweep Results\n\n_No duels executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, records, aggregates)?;
            }
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, records)?,
        _ => {
            if records.is_empty() {
                writeln!(&mut output_target, "No duels executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    records,
                    aggregates,
                    start_time.elapsed(),
                )?;
            }
            let duration = start_time.elapsed();
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            strategies: "cautious".to_string(),
            list_strategies: false,
            seeds: "1337".to_string(),
            iterations: 1,
            vitality: 8,
            resolve: 5,
            insight: 7,
            rapport: 6,
            max_turns: 200,
            item_cap: None,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn sweep(args: &Args) -> (Vec<DuelRecord>, Vec<StrategyAggregate>) {
        let strategies = resolve_strategies(&split_csv(&args.strategies)).unwrap();
        let seeds = resolve_seed_inputs(&split_csv(&args.seeds)).unwrap();
        let records = DuelTester::new(args.stats(), false).run(&strategies, &seeds, args.iterations);
        let aggregates = aggregate_records(&records);
        (records, aggregates)
    }

    #[test]
    fn args_parse_stat_overrides() {
        let args = Args::try_parse_from([
            "evening-tester",
            "--vitality",
            "-3",
            "--insight",
            "12",
            "--item-cap",
            "1",
        ])
        .unwrap();
        let stats = args.stats();
        assert_eq!(stats.vitality(), 1);
        assert_eq!(stats.insight(), 10);
        assert_eq!(args.item_cap, Some(1));
        assert_eq!(args.report, "console");
    }

    #[test]
    fn args_reject_unknown_report() {
        assert!(Args::try_parse_from(["evening-tester", "--report", "xml"]).is_err());
    }

    #[test]
    fn maybe_list_strategies_writes_output() {
        let temp = std::env::temp_dir().join("evening-strategies.txt");
        let args = Args {
            list_strategies: true,
            output: Some(temp.clone()),
            ..base_args()
        };
        assert!(maybe_list_strategies(&args).unwrap());
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Available strategies"));
        assert!(content.contains("tactician"));
    }

    #[test]
    fn maybe_list_strategies_returns_false_when_disabled() {
        assert!(!maybe_list_strategies(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_emits_json_output() {
        let temp = std::env::temp_dir().join("evening-report.json");
        let args = Args {
            output: Some(temp.clone()),
            ..base_args()
        };
        let (records, aggregates) = sweep(&args);
        write_reports(&args, &records, &aggregates, Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("\"aggregates\""));
        assert!(content.contains("cautious"));
    }

    #[test]
    fn write_reports_markdown_empty_results() {
        let temp = std::env::temp_dir().join("evening-report.md");
        let args = Args {
            report: "markdown".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        write_reports(&args, &[], &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("No duels executed"));
    }

    #[test]
    fn write_reports_emits_csv_report() {
        let temp = std::env::temp_dir().join("evening-report.csv");
        let args = Args {
            report: "csv".to_string(),
            seeds: "1,2".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        let (records, aggregates) = sweep(&args);
        write_reports(&args, &records, &aggregates, Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(content.starts_with("strategy,seed"));
    }

    #[test]
    fn write_reports_emits_console_summary() {
        let temp = std::env::temp_dir().join("evening-report.txt");
        let args = Args {
            report: "console".to_string(),
            output: Some(temp.clone()),
            ..base_args()
        };
        let (records, aggregates) = sweep(&args);
        write_reports(&args, &records, &aggregates, Instant::now()).unwrap();
        let content = std::fs::read_to_string(temp).unwrap();
        assert!(content.contains("Duel Sweep Summary"));
        assert!(content.contains("Total time"));
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
