use std::fmt::{self, Display};

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A calendar month in UTC, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetMonth {
    year: i32,
    month: u32,
}

impl TargetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("month must be between 1 and 12, got {month}");
        }
        if !(1970..=9999).contains(&year) {
            bail!("year out of range: {year}");
        }
        Ok(Self { year, month })
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let (year, month) = raw
            .trim()
            .split_once('-')
            .ok_or_else(|| anyhow!("expected YYYY-MM, got {raw:?}"))?;
        if year.len() != 4 || month.len() != 2 {
            bail!("expected YYYY-MM, got {raw:?}");
        }
        let year = year
            .parse::<i32>()
            .map_err(|_| anyhow!("expected YYYY-MM, got {raw:?}"))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| anyhow!("expected YYYY-MM, got {raw:?}"))?;
        Self::new(year, month)
    }

    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self {
            year: instant.year(),
            month: instant.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// First instant of the month.
    pub fn start(&self) -> DateTime<Utc> {
        first_instant(self.year, self.month)
    }

    /// Last instant of the month (one millisecond before the next month starts).
    pub fn end(&self) -> DateTime<Utc> {
        let next = self.next();
        first_instant(next.year, next.month) - Duration::milliseconds(1)
    }

    /// Inclusive range of months from `self` to `to`.
    pub fn through(&self, to: TargetMonth) -> Vec<TargetMonth> {
        let mut months = Vec::new();
        let mut current = *self;
        while current <= to {
            months.push(current);
            current = current.next();
        }
        months
    }
}

fn first_instant(year: i32, month: u32) -> DateTime<Utc> {
    // TargetMonth::new keeps year and month in range, so the date always exists.
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    Utc.from_utc_datetime(&midnight)
}

impl Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for TargetMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyRevenueDto {
    pub month: TargetMonth,
    pub revenue: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RevenueTrendsDto {
    pub trends: Vec<MonthlyRevenueDto>,
}

/// Either a single month or a trend report, depending on the query.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum RevenueReportDto {
    Monthly(MonthlyRevenueDto),
    Trends(RevenueTrendsDto),
}

/// Query string of `GET /reports/revenue`. Months stay raw until validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenueQuery {
    pub month: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RevenueOverviewDto {
    pub month: TargetMonth,
    pub revenue: i64,
    pub previous_month_revenue: i64,
    pub growth_percent: Option<f64>,
    pub active_clients: usize,
    pub inactive_clients: usize,
    pub enquired_clients: usize,
}
