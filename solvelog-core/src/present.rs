//! Renderer-agnostic view models.
//!
//! Engine results are mapped into two shapes: [`ChartData`] (labelled
//! numeric series) and [`TableData`] (rows of display strings). Undefined
//! ratios become `None` points in charts, which renderers skip, and `—`
//! cells in tables.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::analytics::{
    EntityMetrics, MilestoneList, OutcomeCount, Ratio, RecordKind, RecordList, Rollup, SeriesTable,
    SkillMatrix, TrophyKind, TrophyList,
};
use crate::format::{
    format_days, format_duration_secs, format_percent, format_ratio, ordinal, UNDEFINED_CELL,
};
use crate::types::Difficulty;

// ============================================
// Shapes
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    /// Aligned with [`ChartData::labels`]; `None` points are not drawn
    pub points: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableData {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    fn new(title: &str, headers: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }
        widths
    }

    /// Plain-text rendering with padded columns.
    pub fn to_text(&self) -> String {
        let widths = self.widths();
        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&line(&self.headers));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }

    /// GitHub-flavoured markdown table.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("| {} |\n", self.headers.join(" | "));
        out.push_str(&format!(
            "|{}|\n",
            self.headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        ));
        for row in &self.rows {
            out.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        out
    }
}

// ============================================
// Series
// ============================================

pub fn series_chart(table: &SeriesTable) -> ChartData {
    ChartData {
        title: table.metric.as_str().to_string(),
        labels: table.labels.clone(),
        series: table
            .series
            .iter()
            .map(|s| ChartSeries {
                name: s.name.clone(),
                points: s.values.iter().map(|v| Some(*v as f64)).collect(),
            })
            .collect(),
    }
}

/// One row per bucket, one column per series.
pub fn series_table(table: &SeriesTable) -> TableData {
    let mut headers = vec!["Bucket"];
    headers.extend(table.series.iter().map(|s| s.name.as_str()));
    let mut out = TableData::new(table.metric.as_str(), &headers);

    for (i, label) in table.labels.iter().enumerate() {
        let mut row = vec![label.clone()];
        row.extend(
            table
                .series
                .iter()
                .map(|s| s.values.get(i).map_or_else(String::new, u64::to_string)),
        );
        out.push(row);
    }
    out
}

// ============================================
// Rollups
// ============================================

/// Metric plotted by [`rollup_chart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollupMetric {
    Submissions,
    Solved,
    AvgAttempts,
    FirstAceRate,
}

impl RollupMetric {
    fn point(&self, m: &EntityMetrics) -> Option<f64> {
        match self {
            RollupMetric::Submissions => Some(m.submissions as f64),
            RollupMetric::Solved => Some(m.solved as f64),
            RollupMetric::AvgAttempts => m.avg_attempts.value(),
            RollupMetric::FirstAceRate => m.first_ace_rate.value(),
        }
    }

    fn title(&self) -> &'static str {
        match self {
            RollupMetric::Submissions => "Submissions",
            RollupMetric::Solved => "Solved",
            RollupMetric::AvgAttempts => "Avg attempts",
            RollupMetric::FirstAceRate => "First-ace rate",
        }
    }
}

/// Per-key table, busiest key first.
pub fn rollup_table(rollup: &Rollup) -> TableData {
    let mut out = TableData::new(
        rollup.group_by.as_str(),
        &[
            "Key",
            "Attempted",
            "Solved",
            "Submissions",
            "Accepted",
            "Avg attempts",
            "First-ace rate",
        ],
    );

    for key in rollup.keys_by_volume() {
        let Some(m) = rollup.per_key.get(key) else {
            continue;
        };
        out.push(vec![
            key.to_string(),
            m.attempted.to_string(),
            m.solved.to_string(),
            m.submissions.to_string(),
            m.accepted.to_string(),
            format_ratio(m.avg_attempts, 2),
            format_percent(m.first_ace_rate),
        ]);
    }
    out
}

/// Rollup time series on a shared axis.
///
/// Labels are the union of buckets seen by any key. A key's line has no
/// point where it had no activity or where the metric is undefined.
pub fn rollup_chart(rollup: &Rollup, metric: RollupMetric) -> ChartData {
    let labels: Vec<String> = rollup
        .time_series
        .values()
        .flatten()
        .map(|p| (p.bucket_start, p.label.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|(_, label)| label)
        .collect();

    let series = rollup
        .time_series
        .iter()
        .map(|(key, points)| {
            let values = labels
                .iter()
                .map(|label| {
                    points
                        .iter()
                        .find(|p| &p.label == label)
                        .and_then(|p| metric.point(&p.metrics))
                })
                .collect();
            ChartSeries {
                name: key.clone(),
                points: values,
            }
        })
        .collect();

    ChartData {
        title: format!("{} by {}", metric.title(), rollup.group_by.as_str()),
        labels,
        series,
    }
}

pub fn skill_table(matrix: &SkillMatrix) -> TableData {
    let mut headers = vec!["Topic"];
    headers.extend(Difficulty::ALL.iter().map(|d| d.label()));
    headers.extend(["Total", "Solve rate"]);
    let mut out = TableData::new("skills", &headers);

    for row in &matrix.rows {
        let mut cells = vec![row.topic.clone()];
        cells.extend(Difficulty::ALL.iter().map(|d| {
            let cell = row.cell(*d);
            format!("{}/{}", cell.solved, cell.attempted)
        }));
        cells.push(format!("{}/{}", row.total.solved, row.total.attempted));
        cells.push(format_percent(row.total.solve_rate()));
        out.push(cells);
    }
    out
}

// ============================================
// Records, trophies, milestones
// ============================================

pub fn records_table(records: &RecordList) -> TableData {
    let mut out = TableData::new("records", &["Record", "Value", "From", "To", "Detail"]);
    for record in &records.records {
        let value = match record.kind {
            RecordKind::LongestSubmissionStreak
            | RecordKind::LongestAcceptedStreak
            | RecordKind::LongestBreak => format_days(record.value),
            _ => format!("{} {}", record.value, record.kind.unit()),
        };
        out.push(vec![
            record.kind.label().to_string(),
            value,
            record.start_date.to_string(),
            record.end_date.to_string(),
            record.detail.clone().unwrap_or_default(),
        ]);
    }
    out
}

fn trophy_value(kind: TrophyKind, value: i64) -> String {
    match kind {
        TrophyKind::LongestTimeToSolve => format_duration_secs(value),
        TrophyKind::FirstAccepted => String::new(),
        TrophyKind::StubbornEasy => format!("{} failed", value),
        TrophyKind::MostAcceptedResubmits => format!("{} accepted", value),
        _ => format!("{} attempts", value),
    }
}

pub fn trophy_table(trophies: &TrophyList) -> TableData {
    let mut out = TableData::new(
        "trophies",
        &["Trophy", "Status", "Problem", "Value", "Date", "Unlocks at"],
    );
    for trophy in &trophies.trophies {
        let status = if trophy.achieved { "unlocked" } else { "locked" };
        let (problem, value, date) = match &trophy.holder {
            Some(h) => (
                h.title.clone(),
                trophy_value(trophy.kind, h.value),
                h.at.format("%Y-%m-%d").to_string(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        out.push(vec![
            trophy.kind.title().to_string(),
            status.to_string(),
            problem,
            value,
            date,
            trophy_value(trophy.kind, trophy.kind.threshold()),
        ]);
    }
    out
}

pub fn milestone_table(milestones: &MilestoneList) -> TableData {
    let mut out = TableData::new("milestones", &["Milestone", "Date", "Problem"]);
    for m in &milestones.milestones {
        out.push(vec![
            format!("{} {}", ordinal(m.value), m.counter.noun()),
            m.at.format("%Y-%m-%d").to_string(),
            m.title.clone(),
        ]);
    }
    out
}

pub fn outcome_table(breakdown: &[OutcomeCount]) -> TableData {
    let total: u64 = breakdown.iter().map(|o| o.count).sum();
    let mut out = TableData::new("outcomes", &["Outcome", "Category", "Count", "Share"]);
    for outcome in breakdown {
        let category = outcome
            .status
            .failure_category()
            .map_or(UNDEFINED_CELL, |c| c.label());
        out.push(vec![
            outcome.label().to_string(),
            category.to_string(),
            outcome.count.to_string(),
            format_percent(Ratio::percent(outcome.count, total)),
        ]);
    }
    out
}
