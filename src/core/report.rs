//! Dashboard reporting aggregation.
//!
//! Works purely over an already-fetched list of revenue entries: filter by shop and
//! an inclusive calendar-date range, sum the four headline metrics, and group the
//! filtered entries into one chart point per local calendar day. Changing which
//! metrics are plotted only reads [`DailyPoint::value`]; it never re-aggregates.

use crate::core::dates;
use crate::entities::revenue_entry;
use crate::errors::Result;
use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A plottable dashboard metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Sum of revenue
    Revenue,
    /// Sum of total sales
    TotalSales,
    /// Total sales minus ad-driven sales
    OrganicSales,
    /// Sum of ad-driven sales
    AdSales,
}

impl Metric {
    /// All metrics in legend order.
    pub const ALL: [Self; 4] = [
        Self::Revenue,
        Self::TotalSales,
        Self::OrganicSales,
        Self::AdSales,
    ];

    /// Legend label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Revenue => "Omzet",
            Self::TotalSales => "Total Penjualan",
            Self::OrganicSales => "Penjualan Organik",
            Self::AdSales => "Penjualan Iklan",
        }
    }
}

/// Which shops the dashboard covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShopFilter {
    /// Every shop
    #[default]
    All,
    /// A single shop id
    Shop(String),
}

impl ShopFilter {
    /// Whether an entry for `shop_id` passes the filter.
    #[must_use]
    pub fn matches(&self, shop_id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Shop(id) => id == shop_id,
        }
    }
}

/// Shop filter plus an inclusive calendar-date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFilter {
    /// Shops to include
    pub shop: ShopFilter,
    /// First day, included from its local midnight
    pub start: NaiveDate,
    /// Last day, included up to its final instant
    pub end: NaiveDate,
}

impl ReportFilter {
    /// All shops over the `days` days ending `today`.
    #[must_use]
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        let (start, end) = dates::trailing_range(today, days);
        Self {
            shop: ShopFilter::All,
            start,
            end,
        }
    }
}

/// Sums over the filtered entries.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Totals {
    /// Sum of revenue
    pub revenue: f64,
    /// Sum of total sales
    pub total_sales: i64,
    /// Sum of ad-driven sales
    pub ad_sales: i64,
}

impl Totals {
    fn add(&mut self, entry: &revenue_entry::Model) {
        self.revenue += entry.revenue;
        self.total_sales += entry.total_sales;
        self.ad_sales += entry.ad_sales;
    }

    /// Organic sales, derived from the aggregate sums.
    #[must_use]
    pub const fn organic_sales(&self) -> i64 {
        self.total_sales - self.ad_sales
    }

    /// Value of `metric` as a chart ordinate.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::TotalSales => self.total_sales as f64,
            Metric::OrganicSales => self.organic_sales() as f64,
            Metric::AdSales => self.ad_sales as f64,
        }
    }
}

/// One chart point: the sums of a single local calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPoint {
    /// The local calendar day
    pub day: NaiveDate,
    /// Sums of that day's entries
    pub totals: Totals,
}

impl DailyPoint {
    /// Value of `metric` on this day.
    #[must_use]
    pub const fn value(&self, metric: Metric) -> f64 {
        self.totals.value(metric)
    }
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    /// Headline totals
    pub totals: Totals,
    /// Chart points, ascending by day, one per day that has entries
    pub points: Vec<DailyPoint>,
}

impl Report {
    /// True when no entry matched; the dashboard shows a "no data" state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Filters `entries` and aggregates them into totals and per-day points.
///
/// # Errors
/// Returns `Error::InvalidDate` if the range bounds cannot be mapped to instants in `tz`.
pub fn aggregate<'a, Tz, I>(entries: I, filter: &ReportFilter, tz: &Tz) -> Result<Report>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a revenue_entry::Model>,
{
    let from = dates::start_of_day(tz, filter.start)?;
    let until = dates::end_of_day(tz, filter.end)?;

    let mut totals = Totals::default();
    let mut days: BTreeMap<NaiveDate, Totals> = BTreeMap::new();

    for entry in entries.into_iter().filter(|entry| {
        filter.shop.matches(&entry.shop_id) && entry.entry_date >= from && entry.entry_date <= until
    }) {
        totals.add(entry);
        days.entry(dates::calendar_day(tz, entry.entry_date))
            .or_default()
            .add(entry);
    }

    let points = days
        .into_iter()
        .map(|(day, totals)| DailyPoint { day, totals })
        .collect();

    Ok(Report { totals, points })
}
