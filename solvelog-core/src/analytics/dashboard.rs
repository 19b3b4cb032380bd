//! Dashboard analytics for the summary view.
//!
//! Provides aggregate statistics, a four-week activity heatmap, and
//! streak data for the summary printed at the top of the CLI.

use serde::Serialize;

use super::calendar::{day_diff, Calendar};
use super::filter::FilterSpec;
use super::streak::{compute_streak, current_streak};
use super::totals::{compute_totals, Totals};
use crate::ingest::Corpus;

/// Days shown in the activity heatmap.
pub const HEATMAP_DAYS: usize = 28;

/// Dashboard statistics for the summary header.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    // Totals
    /// Totals over the filter's window and difficulty
    pub totals: Totals,

    // Activity heatmap (last 28 days, index 0 = oldest, 27 = today)
    /// Submission count per day for the last 28 days
    pub daily_activity: [i64; HEATMAP_DAYS],

    // Streaks
    /// Consecutive active days ending today or yesterday, over all history
    pub current_streak: i64,
    /// Longest streak ever
    pub longest_streak: i64,

    // Patterns
    /// Peak activity hour (0-23)
    pub peak_hour: u8,
    /// Busiest day of week (0=Sunday, 1=Monday, ..., 6=Saturday)
    pub busiest_day: u8,
}

impl DashboardStats {
    /// Format the peak hour for display (e.g., "2pm-3pm").
    pub fn format_peak_hour(&self) -> String {
        let hour = self.peak_hour as u32;
        let next_hour = (hour + 1) % 24;

        let format_hour = |h: u32| -> String {
            match h {
                0 => "12am".to_string(),
                1..=11 => format!("{}am", h),
                12 => "12pm".to_string(),
                13..=23 => format!("{}pm", h - 12),
                _ => format!("{}h", h),
            }
        };

        format!("{}-{}", format_hour(hour), format_hour(next_hour))
    }

    /// Format the busiest day for display.
    pub fn format_busiest_day(&self) -> &'static str {
        match self.busiest_day {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Unknown",
        }
    }

    /// Heatmap as a row of block characters, oldest day first.
    pub fn format_heatmap(&self) -> String {
        let max = self.daily_activity.iter().copied().max().unwrap_or(0);
        self.daily_activity
            .iter()
            .map(|&count| match count {
                0 => '·',
                c if max > 0 && c * 3 <= max => '░',
                c if max > 0 && c * 3 <= max * 2 => '▒',
                _ => '█',
            })
            .collect()
    }
}

/// Index of the largest count; ties keep the lowest index.
fn argmax(counts: &[i64]) -> u8 {
    counts
        .iter()
        .enumerate()
        .fold((0usize, 0i64), |best, (i, &c)| if c > best.1 { (i, c) } else { best })
        .0 as u8
}

/// Summary statistics as seen at the filter's `now`.
///
/// Totals honor the filter. The heatmap, streaks and activity patterns
/// always cover the whole history.
pub fn compute_dashboard(corpus: &Corpus, filter: &FilterSpec, cal: &Calendar) -> DashboardStats {
    let today = cal.date_of(filter.now);
    let mut daily_activity = [0i64; HEATMAP_DAYS];
    let mut hours = [0i64; 24];
    let mut weekdays = [0i64; 7];

    for sub in corpus.chronological() {
        let age = day_diff(cal.date_of(sub.timestamp), today);
        if (0..HEATMAP_DAYS as i64).contains(&age) {
            daily_activity[HEATMAP_DAYS - 1 - age as usize] += 1;
        }
        hours[cal.hour_of(sub.timestamp) as usize] += 1;
        weekdays[cal.weekday_of(sub.timestamp) as usize] += 1;
    }

    let longest = compute_streak(corpus.chronological(), cal).map_or(0, |s| s.length);

    DashboardStats {
        totals: compute_totals(corpus, filter),
        daily_activity,
        current_streak: i64::from(current_streak(corpus.chronological(), cal, today)),
        longest_streak: i64::from(longest),
        peak_hour: argmax(&hours),
        busiest_day: argmax(&weekdays),
    }
}
