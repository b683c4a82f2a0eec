//! Aggregation and comparison over a canonical table
//!
//! Every function here is a read-only projection: the source table is never
//! modified, and all CPI figures use zero-guarded division. Sums saturate at
//! `Decimal::MAX` instead of overflowing.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::comparison::cost_per_install;
use crate::domain::result::{Error, Result};
use crate::domain::{
    CanonicalTable, ComparisonRow, CountryInstalls, DailyPoint, DailyTotals, DashboardSummary,
};

/// Installs, spend and CPI for one exact date
pub fn daily_totals(table: &CanonicalTable, date: NaiveDate) -> DailyTotals {
    let (installs, spend) = table
        .records_on(date)
        .fold((Decimal::ZERO, Decimal::ZERO), |(installs, spend), r| {
            (installs.saturating_add(r.installs), spend.saturating_add(r.spend()))
        });
    DailyTotals::new(installs, spend)
}

/// Per-campaign (installs, spend) sums for one date
fn campaign_sums(table: &CanonicalTable, date: NaiveDate) -> HashMap<&str, (Decimal, Decimal)> {
    let mut sums: HashMap<&str, (Decimal, Decimal)> = HashMap::new();
    for r in table.records_on(date) {
        let entry = sums
            .entry(r.campaign_name.as_str())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = entry.0.saturating_add(r.installs);
        entry.1 = entry.1.saturating_add(r.spend());
    }
    sums
}

/// Campaign-level change in installs between two dates
///
/// Campaigns present on only one date take zero for the other. Rows are
/// ordered by `|diff|` descending; ties keep the order in which campaigns
/// first appear in the table.
pub fn campaign_variance(
    table: &CanonicalTable,
    date_now: NaiveDate,
    date_prev: NaiveDate,
) -> Vec<ComparisonRow> {
    let now = campaign_sums(table, date_now);
    let prev = campaign_sums(table, date_prev);

    let mut order: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for r in table.records() {
        let name = r.campaign_name.as_str();
        if (now.contains_key(name) || prev.contains_key(name)) && seen.insert(name) {
            order.push(name);
        }
    }

    let zero = (Decimal::ZERO, Decimal::ZERO);
    let mut rows: Vec<ComparisonRow> = order
        .into_iter()
        .map(|name| {
            let (installs_now, spend_now) = now.get(name).copied().unwrap_or(zero);
            let (installs_prev, spend_prev) = prev.get(name).copied().unwrap_or(zero);
            ComparisonRow {
                campaign_name: name.to_string(),
                installs_now,
                installs_prev,
                spend_now,
                spend_prev,
                cpi_now: cost_per_install(spend_now, installs_now),
                cpi_prev: cost_per_install(spend_prev, installs_prev),
                diff: installs_now.saturating_sub(installs_prev),
            }
        })
        .collect();

    // sort_by is stable
    rows.sort_by(|a, b| b.diff.abs().cmp(&a.diff.abs()));
    rows
}

/// Installs summed by (date, country), ordered by date then country
pub fn country_trend(table: &CanonicalTable) -> Vec<CountryInstalls> {
    let mut sums: BTreeMap<(NaiveDate, &str), Decimal> = BTreeMap::new();
    for r in table.records() {
        let entry = sums.entry((r.date, r.country.as_str())).or_insert(Decimal::ZERO);
        *entry = entry.saturating_add(r.installs);
    }
    sums.into_iter()
        .map(|((date, country), installs)| CountryInstalls {
            date,
            country: country.to_string(),
            installs,
        })
        .collect()
}

/// Per-date installs, spend and CPI, ascending by date
pub fn daily_cpi_series(table: &CanonicalTable) -> Vec<DailyPoint> {
    let mut sums: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for r in table.records() {
        let entry = sums.entry(r.date).or_insert((Decimal::ZERO, Decimal::ZERO));
        entry.0 = entry.0.saturating_add(r.installs);
        entry.1 = entry.1.saturating_add(r.spend());
    }
    sums.into_iter()
        .map(|(date, (installs, spend))| DailyPoint {
            date,
            totals: DailyTotals::new(installs, spend),
        })
        .collect()
}

/// Pick the two dates to compare
///
/// Defaults to the latest date and the one before it. With a single date
/// present both sides are that date. Requested dates must lie within the
/// table's date range.
pub fn resolve_comparison_dates(
    table: &CanonicalTable,
    date_now: Option<NaiveDate>,
    date_prev: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let dates = table.dates();
    let (Some(&first), Some(&latest)) = (dates.first(), dates.last()) else {
        return Err(Error::EmptyResult);
    };
    let previous = dates.len().checked_sub(2).map(|i| dates[i]).unwrap_or(latest);

    let check = |date: NaiveDate| {
        if date < first || date > latest {
            Err(Error::validation(format!(
                "{} is outside the data range {} to {}",
                date, first, latest
            )))
        } else {
            Ok(date)
        }
    };

    let now = date_now.map(check).transpose()?.unwrap_or(latest);
    let prev = date_prev.map(check).transpose()?.unwrap_or(previous);
    Ok((now, prev))
}

/// Headline metrics for two dates and the top `top_n` movers
pub fn dashboard_summary(
    table: &CanonicalTable,
    date_now: NaiveDate,
    date_prev: NaiveDate,
    top_n: usize,
) -> DashboardSummary {
    let now = daily_totals(table, date_now);
    let prev = daily_totals(table, date_prev);
    let mut top_campaigns = campaign_variance(table, date_now, date_prev);
    top_campaigns.truncate(top_n);

    DashboardSummary {
        date_now,
        date_prev,
        now,
        prev,
        installs_delta: now.installs.saturating_sub(prev.installs),
        spend_delta: now.spend.saturating_sub(prev.spend),
        cpi_delta: now.cpi.saturating_sub(prev.cpi),
        top_campaigns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CanonicalRecord, ColumnMapping, CostMetric, LoadProvenance, MetricVariant, SourceFormat,
    };

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate, name: &str, installs: i64, spend: i64) -> CanonicalRecord {
        CanonicalRecord {
            date,
            campaign_name: name.to_string(),
            installs: Decimal::from(installs),
            cost: CostMetric::Spend(Decimal::from(spend)),
            country: crate::services::country::country_from_name(name),
        }
    }

    fn table(records: Vec<CanonicalRecord>) -> CanonicalTable {
        CanonicalTable::new(
            MetricVariant::Spend,
            records,
            LoadProvenance {
                format: SourceFormat::Csv,
                encoding: None,
                header_line: 0,
                detected_columns: Vec::new(),
                mapping: ColumnMapping::default(),
                rows_read: 0,
                rows_dropped: 0,
                rows_malformed: 0,
            },
        )
    }

    fn sample() -> CanonicalTable {
        let d1 = ymd(2024, 1, 1);
        let d2 = ymd(2024, 1, 2);
        table(vec![
            record(d1, "US_A", 100, 50),
            record(d1, "UK_B", 50, 25),
            record(d1, "JP_C", 10, 10),
            record(d2, "US_A", 80, 40),
            record(d2, "JP_C", 30, 15),
            record(d2, "US_A", 5, 5),
            record(d2, "DE_D", 20, 0),
        ])
    }

    #[test]
    fn test_daily_totals() {
        let totals = daily_totals(&sample(), ymd(2024, 1, 1));
        assert_eq!(totals.installs, Decimal::from(160));
        assert_eq!(totals.spend, Decimal::from(85));
        assert_eq!(totals.cpi, Decimal::from(85) / Decimal::from(160));
    }

    #[test]
    fn test_daily_totals_without_rows_is_zero() {
        assert_eq!(daily_totals(&sample(), ymd(2023, 12, 31)), DailyTotals::zero());
    }

    #[test]
    fn test_campaign_variance_outer_join() {
        let rows = campaign_variance(&sample(), ymd(2024, 1, 2), ymd(2024, 1, 1));
        let summary: Vec<(&str, Decimal)> = rows
            .iter()
            .map(|r| (r.campaign_name.as_str(), r.diff))
            .collect();

        // |diff|: UK_B 50, JP_C 20, DE_D 20, US_A 15
        assert_eq!(
            summary,
            vec![
                ("UK_B", Decimal::from(-50)),
                ("JP_C", Decimal::from(20)),
                ("DE_D", Decimal::from(20)),
                ("US_A", Decimal::from(-15)),
            ]
        );

        let uk = &rows[0];
        assert_eq!(uk.installs_now, Decimal::ZERO);
        assert_eq!(uk.cpi_now, Decimal::ZERO);
        assert_eq!(uk.installs_prev, Decimal::from(50));

        let us = &rows[3];
        assert_eq!(us.installs_now, Decimal::from(85));
        assert_eq!(us.spend_now, Decimal::from(45));
    }

    #[test]
    fn test_campaign_variance_is_antisymmetric() {
        let t = sample();
        let forward = campaign_variance(&t, ymd(2024, 1, 2), ymd(2024, 1, 1));
        let backward = campaign_variance(&t, ymd(2024, 1, 1), ymd(2024, 1, 2));

        assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(backward.iter()) {
            assert_eq!(f.campaign_name, b.campaign_name);
            assert_eq!(f.diff, -b.diff);
            assert_eq!(f.installs_now, b.installs_prev);
            assert_eq!(f.installs_prev, b.installs_now);
            assert_eq!(f.spend_now, b.spend_prev);
            assert_eq!(f.cpi_now, b.cpi_prev);
        }
    }

    #[test]
    fn test_country_trend() {
        let trend = country_trend(&sample());
        let d2: Vec<(&str, Decimal)> = trend
            .iter()
            .filter(|c| c.date == ymd(2024, 1, 2))
            .map(|c| (c.country.as_str(), c.installs))
            .collect();
        assert_eq!(
            d2,
            vec![
                ("DE", Decimal::from(20)),
                ("JP", Decimal::from(30)),
                ("US", Decimal::from(85)),
            ]
        );
        assert_eq!(trend[0].date, ymd(2024, 1, 1));
    }

    #[test]
    fn test_daily_cpi_series() {
        let series = daily_cpi_series(&sample());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, ymd(2024, 1, 1));
        assert_eq!(series[1].totals.installs, Decimal::from(135));
        assert_eq!(series[1].totals.spend, Decimal::from(60));
    }

    #[test]
    fn test_resolve_dates_defaults() {
        let t = sample();
        assert_eq!(
            resolve_comparison_dates(&t, None, None).unwrap(),
            (ymd(2024, 1, 2), ymd(2024, 1, 1))
        );

        let single = table(vec![record(ymd(2024, 3, 1), "US_A", 1, 1)]);
        assert_eq!(
            resolve_comparison_dates(&single, None, None).unwrap(),
            (ymd(2024, 3, 1), ymd(2024, 3, 1))
        );
    }

    #[test]
    fn test_resolve_dates_out_of_range() {
        let err = resolve_comparison_dates(&sample(), Some(ymd(2024, 2, 1)), None).unwrap_err();
        assert_eq!(err.code(), "validation");
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let d1 = ymd(2024, 1, 1);
        let big = |name: &str| CanonicalRecord {
            date: d1,
            campaign_name: name.to_string(),
            installs: Decimal::MAX,
            cost: CostMetric::Spend(Decimal::MAX),
            country: "US".to_string(),
        };
        let t = table(vec![big("US_A"), big("US_A"), big("UK_B")]);

        let totals = daily_totals(&t, d1);
        assert_eq!(totals.installs, Decimal::MAX);
        assert_eq!(totals.spend, Decimal::MAX);
        assert_eq!(totals.cpi, Decimal::ONE);

        let rows = campaign_variance(&t, d1, ymd(2024, 1, 2));
        assert_eq!(rows[0].installs_now, Decimal::MAX);
        assert_eq!(rows[0].diff, Decimal::MAX);

        assert_eq!(country_trend(&t)[0].installs, Decimal::MAX);
        assert_eq!(daily_cpi_series(&t)[0].totals.spend, Decimal::MAX);

        let summary = dashboard_summary(&t, d1, d1, 5);
        assert_eq!(summary.installs_delta, Decimal::ZERO);
    }

    #[test]
    fn test_variance_keeps_first_appearance_order_for_ties() {
        let d1 = ymd(2024, 1, 1);
        let d2 = ymd(2024, 1, 2);
        let t = table(vec![
            record(d1, "JP_C", 5, 1),
            record(d2, "US_A", 10, 1),
            record(d1, "US_A", 5, 1),
            record(d2, "JP_C", 10, 1),
            record(d2, "DE_D", 5, 1),
        ]);
        let names: Vec<String> = campaign_variance(&t, d2, d1)
            .into_iter()
            .map(|r| r.campaign_name)
            .collect();
        assert_eq!(names, vec!["JP_C", "US_A", "DE_D"]);
    }

    #[test]
    fn test_dashboard_summary() {
        let summary = dashboard_summary(&sample(), ymd(2024, 1, 2), ymd(2024, 1, 1), 2);
        assert_eq!(summary.installs_delta, Decimal::from(-25));
        assert_eq!(summary.spend_delta, Decimal::from(-25));
        assert_eq!(summary.top_campaigns.len(), 2);
        assert_eq!(summary.top_campaigns[0].campaign_name, "UK_B");
    }
}
