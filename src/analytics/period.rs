//! Calendar-month buckets and the date-range presets the front ends offer.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::MAX_SERIES_MONTHS;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One calendar month, `[start, next.start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthBucket {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthBucket {
    pub fn containing(at: NaiveDateTime) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// The bucket `delta` months away (negative goes back in time).
    pub fn offset(self, delta: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn start(self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .unwrap_or(NaiveDate::MIN)
            .and_time(NaiveTime::MIN)
    }

    /// Exclusive upper bound: the first instant of the following month.
    pub fn end(self) -> NaiveDateTime {
        self.offset(1).start()
    }

    pub fn contains(self, at: NaiveDateTime) -> bool {
        at >= self.start() && at < self.end()
    }

    /// Three-letter English month name, e.g. `"Jan"`.
    pub fn label(self) -> &'static str {
        MONTH_NAMES[(self.month as usize - 1) % 12]
    }
}

/// `count` consecutive buckets ending with the month containing `now`,
/// oldest first. `count` is capped at [`MAX_SERIES_MONTHS`].
pub fn trailing_months(now: NaiveDateTime, count: u32) -> Vec<MonthBucket> {
    let current = MonthBucket::containing(now);
    let count = i32::try_from(count.min(MAX_SERIES_MONTHS)).unwrap_or(0);
    (0..count)
        .rev()
        .map(|back| current.offset(-back))
        .collect()
}

/// Inclusive date bounds; an open side is `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

/// Preset windows for analytics queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    LastDay,
    ThisMonth,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    ThisYear,
}

impl DateFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::LastDay => "last-1-day",
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::LastThreeMonths => "last-3-months",
            Self::LastSixMonths => "last-6-months",
            Self::ThisYear => "this-year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.as_str() == s.trim().to_lowercase())
    }

    pub fn all() -> &'static [DateFilter] {
        &[
            Self::All,
            Self::LastDay,
            Self::ThisMonth,
            Self::LastMonth,
            Self::LastThreeMonths,
            Self::LastSixMonths,
            Self::ThisYear,
        ]
    }

    /// Number of monthly buckets a series over this window should have.
    /// `None` means the caller's default applies.
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::All => None,
            Self::LastDay | Self::ThisMonth | Self::LastMonth => Some(1),
            Self::LastThreeMonths => Some(3),
            Self::LastSixMonths => Some(6),
            Self::ThisYear => Some(12),
        }
    }

    /// Inclusive bounds of the window relative to `now`.
    pub fn range(&self, now: NaiveDateTime) -> DateRange {
        let current = MonthBucket::containing(now);
        match self {
            Self::All => DateRange::default(),
            Self::LastDay => DateRange::new(Some(now - Duration::days(1)), Some(now)),
            Self::ThisMonth => DateRange::new(Some(current.start()), Some(last_instant(current))),
            Self::LastMonth => {
                let previous = current.offset(-1);
                DateRange::new(Some(previous.start()), Some(last_instant(previous)))
            }
            Self::LastThreeMonths => DateRange::new(Some(current.offset(-3).start()), Some(now)),
            Self::LastSixMonths => DateRange::new(Some(current.offset(-6).start()), Some(now)),
            Self::ThisYear => {
                let january = MonthBucket {
                    year: current.year,
                    month: 1,
                };
                DateRange::new(Some(january.start()), Some(now))
            }
        }
    }
}

impl std::fmt::Display for DateFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn last_instant(bucket: MonthBucket) -> NaiveDateTime {
    bucket.end() - Duration::seconds(1)
}
