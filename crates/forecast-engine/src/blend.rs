//! Additive blending of two strategies' reports into one forecast.

use crate::ForecastError;
use forecast_core::PeriodSeries;
use forecast_report::ForecastReport;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use tracing::debug;

/// Sum two reports scenario by scenario and period by period.
///
/// Both reports must cover the same scenario names and the same number of
/// periods. The result keeps `a`'s scenario order and period labels.
pub fn combine(a: &ForecastReport, b: &ForecastReport) -> Result<ForecastReport, ForecastError> {
    let left: BTreeSet<&str> = a.scenario_names().collect();
    let right: BTreeSet<&str> = b.scenario_names().collect();
    if left != right {
        return Err(ForecastError::MismatchedScenarios {
            missing_in_left: right.difference(&left).map(|s| s.to_string()).collect(),
            missing_in_right: left.difference(&right).map(|s| s.to_string()).collect(),
        });
    }
    if a.period_count() != b.period_count() {
        return Err(ForecastError::MismatchedHorizon {
            left: a.period_count(),
            right: b.period_count(),
        });
    }

    let mut blended = Vec::with_capacity(a.len());
    for (name, sa) in a.iter() {
        let sb = b
            .get(name)
            .ok_or_else(|| ForecastError::MismatchedScenarios {
                missing_in_left: vec![],
                missing_in_right: vec![name.to_string()],
            })?;
        blended.push((name.to_string(), add_series(sa, sb)?));
    }
    debug!(scenarios = blended.len(), periods = a.period_count(), "combined reports");
    Ok(ForecastReport::build(blended, a.period_labels().to_vec())?)
}

fn add_series(a: &PeriodSeries, b: &PeriodSeries) -> Result<PeriodSeries, ForecastError> {
    Ok(PeriodSeries {
        revenue: add(&a.revenue, &b.revenue)?,
        cost: add(&a.cost, &b.cost)?,
        cumulative_revenue: add(&a.cumulative_revenue, &b.cumulative_revenue)?,
        cumulative_cost: add(&a.cumulative_cost, &b.cumulative_cost)?,
        profitability: add(&a.profitability, &b.profitability)?,
        new_business_revenue: add(&a.new_business_revenue, &b.new_business_revenue)?,
        support_revenue: add(&a.support_revenue, &b.support_revenue)?,
    })
}

fn add(x: &[Decimal], y: &[Decimal]) -> Result<Vec<Decimal>, ForecastError> {
    x.iter()
        .zip(y)
        .enumerate()
        .map(|(period, (l, r))| l.checked_add(*r).ok_or(ForecastError::Overflow { period }))
        .collect()
}
