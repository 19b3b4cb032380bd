//! Calendar-day truncation and time bucketing.
//!
//! All "per day" logic works on local calendar dates, not 24h windows:
//! two submissions twenty hours apart that straddle midnight land on two
//! different days. [`Calendar`] decides which time zone "local" means.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, Months, NaiveDate, Offset, Timelike, Utc,
};
use serde::Serialize;

/// Spans up to this many days are bucketed by day.
pub const DAILY_MAX_SPAN_DAYS: i64 = 90;
/// Spans up to this many days (about five years) are bucketed by month.
pub const MONTHLY_MAX_SPAN_DAYS: i64 = 1825;

/// Time zone used to truncate instants to calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Calendar {
    /// The machine's local zone, including DST transitions
    #[default]
    Local,
    /// A fixed UTC offset
    Fixed(FixedOffset),
}

impl Calendar {
    pub fn utc() -> Self {
        Calendar::Fixed(Utc.fix())
    }

    /// Parse `local`, `utc`, or a `±HH:MM` offset.
    pub fn parse(spec: &str) -> Option<Self> {
        let spec = spec.trim();
        match spec.to_ascii_lowercase().as_str() {
            "local" => return Some(Calendar::Local),
            "utc" | "z" => return Some(Calendar::utc()),
            _ => {}
        }

        let (sign, rest) = match spec.as_bytes().first()? {
            b'+' => (1, &spec[1..]),
            b'-' => (-1, &spec[1..]),
            _ => return None,
        };
        let (hours, minutes) = rest.split_once(':')?;
        let hours: i32 = hours.parse().ok()?;
        let minutes: i32 = minutes.parse().ok()?;
        if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(Calendar::Fixed)
    }

    /// Local calendar date of an instant.
    pub fn date_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        match self {
            Calendar::Local => ts.with_timezone(&Local).date_naive(),
            Calendar::Fixed(offset) => ts.with_timezone(offset).date_naive(),
        }
    }

    /// Local hour of day (0-23).
    pub fn hour_of(&self, ts: DateTime<Utc>) -> u32 {
        match self {
            Calendar::Local => ts.with_timezone(&Local).hour(),
            Calendar::Fixed(offset) => ts.with_timezone(offset).hour(),
        }
    }

    /// Local day of week, 0 = Sunday.
    pub fn weekday_of(&self, ts: DateTime<Utc>) -> u32 {
        self.date_of(ts).weekday().num_days_from_sunday()
    }
}

/// Whole calendar days from `a` to `b`.
pub fn day_diff(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Bucket width for time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
    Yearly,
}

impl Granularity {
    /// Pick a width that keeps the bucket count readable for a span.
    pub fn auto(span_days: i64) -> Self {
        if span_days <= DAILY_MAX_SPAN_DAYS {
            Granularity::Daily
        } else if span_days <= MONTHLY_MAX_SPAN_DAYS {
            Granularity::Monthly
        } else {
            Granularity::Yearly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }

    /// First date of the bucket containing `date`.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => date,
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
            Granularity::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Start of the bucket after the one starting at `start`.
    fn next(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Granularity::Daily => start.checked_add_days(Days::new(1)),
            Granularity::Monthly => start.checked_add_months(Months::new(1)),
            Granularity::Yearly => start.checked_add_months(Months::new(12)),
        }
    }

    /// Machine-friendly label for a bucket start (`2024-03-05`, `2024-03`, `2024`).
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Daily => start.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => start.format("%Y-%m").to_string(),
            Granularity::Yearly => start.format("%Y").to_string(),
        }
    }

    /// Bucket ordinal, comparable within one granularity.
    fn ordinal(&self, date: NaiveDate) -> i64 {
        match self {
            Granularity::Daily => i64::from(date.num_days_from_ce()),
            Granularity::Monthly => i64::from(date.year()) * 12 + i64::from(date.month0()),
            Granularity::Yearly => i64::from(date.year()),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "monthly" | "month" => Ok(Granularity::Monthly),
            "yearly" | "year" => Ok(Granularity::Yearly),
            _ => Err(format!("unknown granularity: {}", s)),
        }
    }
}

/// A complete, gap-free sequence of buckets between two dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketRange {
    granularity: Granularity,
    first: NaiveDate,
    last: NaiveDate,
}

impl BucketRange {
    /// Buckets covering `start..=end`. An inverted range collapses to `end`.
    pub fn new(granularity: Granularity, start: NaiveDate, end: NaiveDate) -> Self {
        let start = start.min(end);
        Self {
            granularity,
            first: granularity.bucket_start(start),
            last: granularity.bucket_start(end),
        }
    }

    /// Buckets covering `start..=end` with an automatically chosen width.
    pub fn auto(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Granularity::auto(day_diff(start.min(end), end)), start, end)
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn len(&self) -> usize {
        (self.granularity.ordinal(self.last) - self.granularity.ordinal(self.first) + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Bucket index of a date, `None` when outside the range.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        let ordinal = self.granularity.ordinal(date);
        let first = self.granularity.ordinal(self.first);
        let last = self.granularity.ordinal(self.last);
        if ordinal < first || ordinal > last {
            None
        } else {
            Some((ordinal - first) as usize)
        }
    }

    /// Whether a date falls before the first bucket.
    pub fn is_before(&self, date: NaiveDate) -> bool {
        self.granularity.ordinal(date) < self.granularity.ordinal(self.first)
    }

    /// Start date of the bucket at `index`, clamped to the last bucket.
    pub fn starts_at(&self, index: usize) -> NaiveDate {
        let steps = index as u32;
        let start = match self.granularity {
            Granularity::Daily => self.first.checked_add_days(Days::new(u64::from(steps))),
            Granularity::Monthly => self.first.checked_add_months(Months::new(steps)),
            Granularity::Yearly => self
                .first
                .checked_add_months(Months::new(steps.saturating_mul(12))),
        };
        start.map_or(self.last, |s| s.min(self.last))
    }

    pub fn label_at(&self, index: usize) -> String {
        self.granularity.label(self.starts_at(index))
    }

    /// Start date of every bucket, in order.
    pub fn starts(&self) -> Vec<NaiveDate> {
        let mut starts = Vec::with_capacity(self.len());
        let mut cursor = Some(self.first);
        while let Some(start) = cursor {
            if start > self.last {
                break;
            }
            starts.push(start);
            cursor = self.granularity.next(start);
        }
        starts
    }

    pub fn labels(&self) -> Vec<String> {
        self.starts()
            .into_iter()
            .map(|start| self.granularity.label(start))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calendar_parse() {
        assert_eq!(Calendar::parse("local"), Some(Calendar::Local));
        assert_eq!(Calendar::parse("UTC"), Some(Calendar::utc()));
        assert_eq!(
            Calendar::parse("+05:30"),
            Some(Calendar::Fixed(FixedOffset::east_opt(19_800).unwrap()))
        );
        assert_eq!(
            Calendar::parse("-08:00"),
            Some(Calendar::Fixed(FixedOffset::west_opt(28_800).unwrap()))
        );
        assert_eq!(Calendar::parse("+25:00"), None);
        assert_eq!(Calendar::parse("mars"), None);
        assert_eq!(Calendar::parse(""), None);
    }

    #[test]
    fn test_date_truncation_uses_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        assert_eq!(Calendar::utc().date_of(ts), date(2024, 3, 1));
        let plus_two = Calendar::parse("+02:00").unwrap();
        assert_eq!(plus_two.date_of(ts), date(2024, 3, 2));
        assert_eq!(plus_two.hour_of(ts), 1);
    }

    #[test]
    fn test_auto_granularity_thresholds() {
        assert_eq!(Granularity::auto(0), Granularity::Daily);
        assert_eq!(Granularity::auto(90), Granularity::Daily);
        assert_eq!(Granularity::auto(91), Granularity::Monthly);
        assert_eq!(Granularity::auto(1825), Granularity::Monthly);
        assert_eq!(Granularity::auto(1826), Granularity::Yearly);
    }

    #[test]
    fn test_daily_range_is_complete() {
        let range = BucketRange::new(Granularity::Daily, date(2024, 2, 27), date(2024, 3, 2));
        assert_eq!(range.len(), 5);
        assert_eq!(
            range.labels(),
            vec!["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]
        );
        assert_eq!(range.index_of(date(2024, 3, 1)), Some(3));
        assert_eq!(range.index_of(date(2024, 3, 3)), None);
        assert!(range.is_before(date(2024, 2, 1)));
    }

    #[test]
    fn test_monthly_range_crosses_year() {
        let range = BucketRange::new(Granularity::Monthly, date(2023, 11, 15), date(2024, 2, 3));
        assert_eq!(range.len(), 4);
        assert_eq!(range.labels(), vec!["2023-11", "2023-12", "2024-01", "2024-02"]);
        assert_eq!(range.index_of(date(2024, 1, 31)), Some(2));
        assert_eq!(range.starts().len(), range.len());
        assert_eq!(range.starts_at(2), date(2024, 1, 1));
        assert_eq!(range.label_at(3), "2024-02");
        assert_eq!(range.starts_at(99), date(2024, 2, 1));
    }

    #[test]
    fn test_yearly_range() {
        let range = BucketRange::new(Granularity::Yearly, date(2015, 6, 1), date(2024, 1, 1));
        assert_eq!(range.len(), 10);
        assert_eq!(range.labels().first().map(String::as_str), Some("2015"));
        assert_eq!(range.labels().last().map(String::as_str), Some("2024"));
    }

    #[test]
    fn test_auto_range_picks_width_from_span() {
        let short = BucketRange::auto(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(short.granularity(), Granularity::Daily);
        assert_eq!(short.len(), 31);

        let medium = BucketRange::auto(date(2022, 1, 1), date(2024, 12, 31));
        assert_eq!(medium.granularity(), Granularity::Monthly);
        assert_eq!(medium.len(), 36);
    }

    #[test]
    fn test_inverted_range_collapses() {
        let range = BucketRange::new(Granularity::Daily, date(2024, 5, 2), date(2024, 5, 1));
        assert_eq!(range.len(), 1);
        assert_eq!(range.labels(), vec!["2024-05-01"]);
    }
}
