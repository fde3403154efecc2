//! Dashboard page: headline totals and a per-day chart over revenue entries.
//!
//! The report is recomputed from the latest entry snapshot on every read, so a push
//! from the store or a filter change is reflected immediately. Toggling a plotted
//! metric only changes which series are read from the same report.

use super::{TableState, display_name};
use crate::{
    config::settings::DashboardSettings,
    core::{
        dates,
        report::{self, Metric, Report, ReportFilter, ShopFilter},
        revenue::all_entries_query,
        shops::shops_by_name_query,
    },
    entities::{RevenueEntryModel, ShopModel},
    errors::Result,
    store::{RecordStore, Subscription},
};
use chrono::{Local, NaiveDate};
use tracing::debug;

/// A revenue entry labelled with its shop.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRow {
    /// The entry
    pub entry: RevenueEntryModel,
    /// Shop name, or `"Unknown"`
    pub shop_name: String,
}

/// Dashboard page.
#[derive(Debug)]
pub struct DashboardScreen {
    entries: Subscription<RevenueEntryModel>,
    shops: Subscription<ShopModel>,
    filter: ReportFilter,
    metrics: Vec<Metric>,
}

impl DashboardScreen {
    /// Mounts the dashboard over the trailing range ending `today`.
    #[must_use]
    pub fn mount(store: &RecordStore, settings: &DashboardSettings, today: NaiveDate) -> Self {
        let mut metrics = Vec::new();
        for metric in Metric::ALL {
            if settings.default_metrics.contains(&metric) {
                metrics.push(metric);
            }
        }
        Self {
            entries: store.subscribe(all_entries_query()),
            shops: store.subscribe(shops_by_name_query()),
            filter: ReportFilter::trailing(today, settings.trailing_days),
            metrics,
        }
    }

    /// Whether the first entry snapshot is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.entries.is_loading()
    }

    /// Shop filter options, alphabetically.
    #[must_use]
    pub fn shops(&self) -> Vec<ShopModel> {
        self.shops.rows()
    }

    /// Current filter.
    #[must_use]
    pub const fn filter(&self) -> &ReportFilter {
        &self.filter
    }

    /// Restricts the report to one shop or all shops.
    pub fn set_shop(&mut self, shop: ShopFilter) {
        self.filter.shop = shop;
    }

    /// Sets the inclusive date range.
    pub fn set_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.filter.start = start;
        self.filter.end = end;
    }

    /// Sets the date range from `YYYY-MM-DD` form values.
    ///
    /// # Errors
    /// Returns `Error::InvalidDate` if either value is not a date; the range is unchanged.
    pub fn set_range_from_form(&mut self, start: &str, end: &str) -> Result<()> {
        let start = dates::parse_form_date(start)?;
        let end = dates::parse_form_date(end)?;
        self.set_range(start, end);
        Ok(())
    }

    /// Plotted metrics, in legend order.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Shows or hides a metric's series.
    pub fn toggle_metric(&mut self, metric: Metric) {
        if self.metrics.contains(&metric) {
            self.metrics.retain(|m| *m != metric);
        } else {
            self.metrics = Metric::ALL
                .into_iter()
                .filter(|m| *m == metric || self.metrics.contains(m))
                .collect();
        }
        debug!("Plotting {:?}", self.metrics);
    }

    /// Totals and chart points for the current filter.
    ///
    /// # Errors
    /// Returns `Error::InvalidDate` if the range bounds have no local instant.
    pub fn report(&self) -> Result<Report> {
        self.entries
            .with_rows(|entries| report::aggregate(entries, &self.filter, &Local))
    }

    /// `(day, value)` series of every plotted metric.
    ///
    /// # Errors
    /// Same as [`DashboardScreen::report`].
    pub fn series(&self) -> Result<Vec<(Metric, Vec<(NaiveDate, f64)>)>> {
        let report = self.report()?;
        Ok(self
            .metrics
            .iter()
            .map(|&metric| {
                let points = report
                    .points
                    .iter()
                    .map(|point| (point.day, point.value(metric)))
                    .collect();
                (metric, points)
            })
            .collect())
    }

    /// Entries passing the filter, newest first, labelled with their shop.
    ///
    /// # Errors
    /// Same as [`DashboardScreen::report`].
    pub fn rows(&self) -> Result<Vec<DashboardRow>> {
        let from = dates::start_of_day(&Local, self.filter.start)?;
        let until = dates::end_of_day(&Local, self.filter.end)?;
        Ok(self.entries.with_rows(|entries| {
            entries
                .iter()
                .filter(|entry| {
                    self.filter.shop.matches(&entry.shop_id)
                        && entry.entry_date >= from
                        && entry.entry_date <= until
                })
                .map(|entry| DashboardRow {
                    shop_name: display_name(&self.shops, &entry.shop_id),
                    entry: entry.clone(),
                })
                .collect()
        }))
    }

    /// Chart area state: loading, "no data", or a chart.
    #[must_use]
    pub fn table_state(&self) -> TableState {
        if self.is_loading() {
            return TableState::Loading;
        }
        TableState::loaded(self.report().map_or(0, |report| report.points.len()))
    }

    /// Waits until the entries or shops change.
    pub async fn next_update(&mut self) -> bool {
        tokio::select! {
            alive = self.entries.changed() => alive,
            alive = self.shops.changed() => alive,
        }
    }

    /// Waits for the first entry snapshot.
    pub async fn loaded(&mut self) -> bool {
        self.entries.wait_for_snapshot().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{UNKNOWN_NAME, shops::delete_shop};
    use crate::test_utils::*;

    async fn seeded() -> Result<(RecordStore, String, String)> {
        let (store, admin, shop_a) = setup_with_shop().await?;
        let shop_b = create_test_shop(&store, "Shop B", &admin.id).await?;
        create_test_entry_on(&store, &shop_a.id, day(2024, 5, 1), 100.0, 10, 4).await?;
        create_test_entry_on(&store, &shop_b.id, day(2024, 5, 1), 50.0, 5, 5).await?;
        create_test_entry_on(&store, &shop_a.id, day(2024, 5, 3), 30.0, 3, 0).await?;
        create_test_entry_on(&store, &shop_a.id, day(2024, 6, 1), 999.0, 99, 9).await?;
        Ok((store, shop_a.id, shop_b.id))
    }

    async fn mounted(store: &RecordStore) -> DashboardScreen {
        let mut screen = DashboardScreen::mount(store, &DashboardSettings::default(), day(2024, 5, 31));
        assert!(within(screen.loaded()).await);
        within(screen.shops.wait_until(|rows| !rows.is_empty())).await;
        screen
    }

    #[tokio::test]
    async fn test_default_range_and_metrics() -> Result<()> {
        let (store, _, _) = seeded().await?;
        let screen = mounted(&store).await;

        assert_eq!(screen.filter().start, day(2024, 5, 1));
        assert_eq!(screen.filter().end, day(2024, 5, 31));
        assert_eq!(screen.metrics(), &[Metric::Revenue, Metric::TotalSales]);

        let report = screen.report()?;
        assert_eq!(report.totals.revenue, 180.0);
        assert_eq!(report.totals.total_sales, 18);
        assert_eq!(report.totals.ad_sales, 9);
        assert_eq!(report.totals.organic_sales(), 9);
        let days: Vec<NaiveDate> = report.points.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![day(2024, 5, 1), day(2024, 5, 3)]);
        assert_eq!(screen.table_state(), TableState::Rows);
        Ok(())
    }

    #[tokio::test]
    async fn test_shop_filter_and_rows() -> Result<()> {
        let (store, shop_a, shop_b) = seeded().await?;
        let mut screen = mounted(&store).await;

        screen.set_shop(ShopFilter::Shop(shop_b.clone()));
        let report = screen.report()?;
        assert_eq!(report.totals.revenue, 50.0);
        assert_eq!(report.totals.organic_sales(), 0);

        let rows = screen.rows()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].shop_name, "Shop B");

        delete_shop(&store, &shop_b).await?;
        within(screen.shops.wait_until(|rows| rows.len() == 1)).await;
        assert_eq!(screen.rows()?[0].shop_name, UNKNOWN_NAME);

        screen.set_shop(ShopFilter::Shop(shop_a));
        screen.set_range_from_form("2024-05-02", "2024-06-30")?;
        assert_eq!(screen.report()?.totals.revenue, 1029.0);
        assert!(screen.set_range_from_form("bukan tanggal", "2024-06-30").is_err());
        assert_eq!(screen.filter().start, day(2024, 5, 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_toggling_metrics_reads_same_report() -> Result<()> {
        let (store, _, _) = seeded().await?;
        let mut screen = mounted(&store).await;
        let before = screen.report()?;

        screen.toggle_metric(Metric::AdSales);
        screen.toggle_metric(Metric::Revenue);
        screen.toggle_metric(Metric::OrganicSales);
        assert_eq!(
            screen.metrics(),
            &[Metric::TotalSales, Metric::OrganicSales, Metric::AdSales]
        );
        assert_eq!(screen.report()?, before);

        let series = screen.series()?;
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].0, Metric::OrganicSales);
        assert_eq!(series[1].1, vec![(day(2024, 5, 1), 6.0), (day(2024, 5, 3), 3.0)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_new_entries_reach_report() -> Result<()> {
        let (store, _admin, shop) = setup_with_shop().await?;
        let mut screen = mounted_empty(&store).await;
        assert!(screen.report()?.is_empty());
        assert_eq!(screen.table_state(), TableState::Empty);

        create_test_entry_on(&store, &shop.id, day(2024, 5, 10), 10.0, 1, 0).await?;
        within(async {
            while screen.report().unwrap().is_empty() {
                screen.next_update().await;
            }
        })
        .await;
        assert_eq!(screen.report()?.totals.revenue, 10.0);
        Ok(())
    }

    async fn mounted_empty(store: &RecordStore) -> DashboardScreen {
        let mut screen = DashboardScreen::mount(store, &DashboardSettings::default(), day(2024, 5, 31));
        assert!(within(screen.loaded()).await);
        screen
    }
}
