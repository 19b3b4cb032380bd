//! solvelog - coding-practice analytics CLI
//!
//! Reads a submission event file and prints one analytics view as a
//! terminal report, markdown, or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use solvelog_core::analytics::{
    compute_cumulative_series, compute_dashboard, compute_entity_rollup, compute_milestones,
    compute_skill_matrix, compute_streaks_and_records, compute_superlatives, outcome_breakdown,
    Calendar, DashboardStats, FilterSpec, Granularity, GroupBy, MilestoneList, SeriesMetric,
    TimeWindow,
};
use solvelog_core::format::{format_days, format_percent, format_relative_time};
use solvelog_core::ingest::{load_catalog, load_raw_submissions, Corpus, Normalizer};
use solvelog_core::present::{
    milestone_table, outcome_table, records_table, rollup_chart, rollup_table, series_chart,
    series_table, skill_table, trophy_table, RollupMetric, TableData,
};
use solvelog_core::{Config, Difficulty};

#[derive(Parser, Debug)]
#[command(name = "solvelog")]
#[command(about = "Analytics over your coding-practice submission history")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    view: Option<View>,

    /// Submission event file (default: from config, then ~/.local/share/solvelog/submissions.json)
    #[arg(long, global = true)]
    events: Option<PathBuf>,

    /// Problem metadata catalog used to fill in missing difficulty/topics
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Only look at the last N days
    #[arg(long, global = true, conflicts_with = "all_time")]
    days: Option<u32>,

    /// Ignore the configured default window
    #[arg(long, global = true)]
    all_time: bool,

    /// Only count problems of this difficulty (easy, medium, hard)
    #[arg(long, global = true)]
    difficulty: Option<Difficulty>,

    /// Bucket width for time series (daily, monthly, yearly)
    #[arg(long, global = true)]
    granularity: Option<Granularity>,

    /// Calendar zone for day boundaries: local, utc, or +HH:MM
    #[arg(long, global = true)]
    timezone: Option<String>,

    /// Evaluate trailing windows as of this RFC 3339 instant (default: now)
    #[arg(long, global = true)]
    as_of: Option<String>,

    /// Export format (md = markdown, json = JSON)
    #[arg(long, global = true)]
    export: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum View {
    /// Headline numbers, streaks and activity (default)
    Summary,
    /// Per-bucket counts over time
    Series {
        /// solved-cumulative, submissions-cumulative, solved, submissions
        #[arg(long, default_value = "solved-cumulative")]
        metric: SeriesMetric,
    },
    /// Metrics per language, topic or difficulty
    Rollup {
        /// language, topic or difficulty
        #[arg(long, default_value = "language")]
        group_by: GroupBy,
    },
    /// Topic x difficulty solve matrix
    Skills,
    /// Personal bests: streaks, breaks, busiest days
    Records,
    /// Superlatives with unlock thresholds
    Trophies,
    /// Round-number achievements and what's next
    Milestones,
}

/// A rendered view: display tables plus the engine result for JSON.
struct Report {
    title: String,
    lines: Vec<String>,
    tables: Vec<TableData>,
    json: serde_json::Value,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration and logging
    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = solvelog_core::logging::init(&config.logging).ok();

    let calendar = match &args.timezone {
        Some(tz) => Calendar::parse(tz)
            .with_context(|| format!("Invalid timezone {:?}. Use local, utc or +HH:MM", tz))?,
        None => config.calendar()?,
    };

    let now = match &args.as_of {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("Invalid --as-of instant: {}", s))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let corpus = load_corpus(&args, &config)?;
    let filter = build_filter(&args, &config, now)?;
    let view = args.view.clone().unwrap_or(View::Summary);

    tracing::info!(
        submissions = corpus.len(),
        view = ?view,
        window = ?filter.window,
        "Rendering view"
    );

    let report = build_report(&view, &corpus, &filter, &calendar, now)?;

    // Output based on export format
    match args.export.as_deref() {
        Some("json") => print_json(&report)?,
        Some("md") => print_markdown(&report, corpus.is_empty()),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&report, corpus.is_empty()),
    }

    Ok(())
}

fn load_corpus(args: &Args, config: &Config) -> Result<Corpus> {
    let events = args.events.clone().unwrap_or_else(|| config.events_path());
    let raw = load_raw_submissions(&events)
        .with_context(|| format!("failed to read submissions from {}", events.display()))?;

    let catalog_path = args.catalog.clone().or_else(|| config.data.catalog_path.clone());
    let normalizer = match catalog_path {
        Some(path) => {
            let catalog = load_catalog(&path)
                .with_context(|| format!("failed to read catalog from {}", path.display()))?;
            Normalizer::with_catalog(catalog)
        }
        None => Normalizer::new(),
    };

    let outcome = normalizer.normalize(raw);
    for rejected in &outcome.rejected {
        tracing::warn!(
            index = rejected.index,
            id = ?rejected.id,
            reason = %rejected.reason,
            "Skipped submission"
        );
    }
    if outcome.duplicates > 0 || outcome.unknown_statuses > 0 {
        tracing::info!(
            duplicates = outcome.duplicates,
            unknown_statuses = outcome.unknown_statuses,
            "Normalized with warnings"
        );
    }

    Ok(outcome.corpus)
}

fn build_filter(args: &Args, config: &Config, now: DateTime<Utc>) -> Result<FilterSpec> {
    let days = if args.all_time {
        None
    } else {
        args.days.or(config.analytics.default_window_days)
    };

    let mut filter = match days {
        Some(0) => anyhow::bail!("--days must be at least 1"),
        Some(days) => FilterSpec::trailing(days, now),
        None => FilterSpec::all_time(now),
    };
    if let Some(difficulty) = args.difficulty {
        filter = filter.with_difficulty(difficulty);
    }
    if let Some(granularity) = args.granularity {
        filter = filter.with_granularity(granularity);
    }
    Ok(filter)
}

fn window_name(filter: &FilterSpec) -> String {
    match filter.window {
        TimeWindow::AllTime => "all time".to_string(),
        TimeWindow::Trailing { days } => format!("last {}", format_days(days as u64)),
    }
}

fn build_report(
    view: &View,
    corpus: &Corpus,
    filter: &FilterSpec,
    calendar: &Calendar,
    now: DateTime<Utc>,
) -> Result<Report> {
    let report = match view {
        View::Summary => {
            let stats = compute_dashboard(corpus, filter, calendar);
            let outcomes = outcome_breakdown(corpus, filter);
            let mut lines = summary_lines(&stats);
            if let Some(last) = corpus.chronological().next_back() {
                lines.push(format!(
                    "Last submission: {} ({})",
                    last.title,
                    format_relative_time(last.timestamp, now)
                ));
            }
            Report {
                title: format!("Summary ({})", window_name(filter)),
                lines,
                tables: vec![summary_table(&stats), outcome_table(&outcomes)],
                json: serde_json::json!({
                    "dashboard": stats,
                    "outcomes": outcomes,
                }),
            }
        }
        View::Series { metric } => {
            let filter = filter.clone().with_metric(*metric);
            let table = compute_cumulative_series(corpus, &filter, calendar);
            Report {
                title: format!("{} ({})", metric.as_str(), window_name(&filter)),
                lines: Vec::new(),
                tables: vec![series_table(&table)],
                json: serde_json::json!({
                    "series": table,
                    "chart": series_chart(&table),
                }),
            }
        }
        View::Rollup { group_by } => {
            let rollup = compute_entity_rollup(corpus, *group_by, filter, calendar);
            Report {
                title: format!("By {} ({})", group_by.as_str(), window_name(filter)),
                lines: Vec::new(),
                tables: vec![rollup_table(&rollup)],
                json: serde_json::json!({
                    "chart": rollup_chart(&rollup, RollupMetric::Solved),
                    "rollup": rollup,
                }),
            }
        }
        View::Skills => {
            let matrix = compute_skill_matrix(corpus, filter);
            Report {
                title: format!("Skills ({})", window_name(filter)),
                lines: Vec::new(),
                tables: vec![skill_table(&matrix)],
                json: serde_json::to_value(&matrix)?,
            }
        }
        View::Records => {
            let records = compute_streaks_and_records(corpus, calendar);
            Report {
                title: "Records".to_string(),
                lines: Vec::new(),
                tables: vec![records_table(&records)],
                json: serde_json::to_value(&records)?,
            }
        }
        View::Trophies => {
            let trophies = compute_superlatives(corpus);
            let unlocked = trophies.achieved().count();
            Report {
                title: "Trophies".to_string(),
                lines: vec![format!(
                    "{} of {} unlocked",
                    unlocked,
                    trophies.trophies.len()
                )],
                tables: vec![trophy_table(&trophies)],
                json: serde_json::to_value(&trophies)?,
            }
        }
        View::Milestones => {
            let milestones = compute_milestones(corpus);
            Report {
                title: "Milestones".to_string(),
                lines: progress_lines(&milestones),
                tables: vec![milestone_table(&milestones)],
                json: serde_json::to_value(&milestones)?,
            }
        }
    };
    Ok(report)
}

fn summary_lines(stats: &DashboardStats) -> Vec<String> {
    vec![
        format!(
            "Streak: {} (longest {})",
            format_days(stats.current_streak.max(0) as u64),
            format_days(stats.longest_streak.max(0) as u64)
        ),
        format!("Last 4 weeks: {}", stats.format_heatmap()),
        format!(
            "Peak hour: {}   Busiest day: {}",
            stats.format_peak_hour(),
            stats.format_busiest_day()
        ),
    ]
}

fn summary_table(stats: &DashboardStats) -> TableData {
    let totals = &stats.totals;
    let mut rows = vec![
        vec!["Submissions".to_string(), totals.submissions.to_string()],
        vec!["Accepted".to_string(), totals.accepted.to_string()],
        vec![
            "Acceptance rate".to_string(),
            format_percent(totals.acceptance_rate),
        ],
        vec![
            "Solved".to_string(),
            format!("{} of {} attempted", totals.solved, totals.attempted),
        ],
    ];
    for difficulty in Difficulty::ALL {
        let tier = totals.tier(difficulty);
        rows.push(vec![
            format!("{} solved", difficulty.label()),
            format!("{}/{}", tier.solved, tier.attempted),
        ]);
    }
    if !totals.languages.is_empty() {
        let languages: Vec<String> = totals
            .languages
            .iter()
            .map(|(lang, count)| format!("{} ({})", lang, count))
            .collect();
        rows.push(vec!["Languages".to_string(), languages.join(", ")]);
    }

    TableData {
        title: "totals".to_string(),
        headers: vec!["Metric".to_string(), "Value".to_string()],
        rows,
    }
}

fn progress_lines(milestones: &MilestoneList) -> Vec<String> {
    milestones
        .progress
        .iter()
        .map(|p| match p.next {
            Some(next) => format!("{}: {} (next at {})", p.counter.as_str(), p.current, next),
            None => format!("{}: {} (all reached)", p.counter.as_str(), p.current),
        })
        .collect()
}

fn print_terminal(report: &Report, empty: bool) {
    // Header
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", report.title);
    println!("╰{}╯", "─".repeat(60));
    println!();

    // Check if there's any data
    if empty {
        println!("  No submissions found.");
        println!();
        return;
    }

    for line in &report.lines {
        println!("   {}", line);
    }
    if !report.lines.is_empty() {
        println!();
    }

    for table in &report.tables {
        if table.is_empty() {
            println!("  Nothing to show for {}.", table.title);
            println!();
            continue;
        }
        for line in table.to_text().lines() {
            println!("   {}", line);
        }
        println!();
    }
}

fn print_markdown(report: &Report, empty: bool) {
    println!("# {}", report.title);
    println!();

    if empty {
        println!("*No submissions found.*");
        return;
    }

    for line in &report.lines {
        println!("- {}", line);
    }
    if !report.lines.is_empty() {
        println!();
    }

    for table in &report.tables {
        if table.is_empty() {
            continue;
        }
        print!("{}", table.to_markdown());
        println!();
    }

    println!("---");
    println!("*Generated by solvelog*");
}

fn print_json(report: &Report) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&report.json)?);
    Ok(())
}
