#![deny(warnings)]

//! Projection engine for GTM Forecast.
//!
//! Turns a static demand scenario and a strategy's parameters into a
//! growth-adjusted, support-amortized, cost-loaded period series, and
//! blends two strategies' reports into a combined forecast.
//!
//! All arithmetic is decimal, so the cumulative and profitability series
//! are exact running sums of the per-period values.

mod blend;

pub use blend::combine;

use forecast_core::{
    validate_horizon, validate_scenario, validate_strategy, ForecastConfig, PeriodSeries,
    ProjectSize, ScenarioModel, StrategyParameters, ValidationError,
};
use forecast_report::{period_labels, ForecastReport, ReportError};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, debug_span, info};

/// Errors produced by projection and blending.
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    /// Inputs failed validation; nothing was computed.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),
    /// Reports being blended do not cover the same scenarios.
    #[error(
        "scenario sets differ (missing on left: {missing_in_left:?}, missing on right: {missing_in_right:?})"
    )]
    MismatchedScenarios {
        missing_in_left: Vec<String>,
        missing_in_right: Vec<String>,
    },
    /// Reports being blended have different period counts.
    #[error("period counts differ: {left} vs {right}")]
    MismatchedHorizon { left: usize, right: usize },
    #[error(transparent)]
    Report(#[from] ReportError),
    /// A blend names a strategy that was not projected.
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    /// A value exceeded the decimal range.
    #[error("decimal overflow in period {period}")]
    Overflow { period: usize },
}

/// Project one scenario under one strategy for periods `0..=horizon`.
///
/// Each period's new-business revenue is the scenario's deal counts, scaled
/// by the headcount multiplier and the compounded growth factor, priced by
/// size. A fraction `support_rate` of it is paid back as a flat annuity over
/// `support_period` periods starting with the period of the win, clipped to
/// the horizon. Periods before `activation_delay` win nothing. Costs are
/// compensation every period, the non-margin share of new business, and the
/// marketing budget once in period 0.
pub fn project(
    scenario: &ScenarioModel,
    params: &StrategyParameters,
    horizon: u32,
) -> Result<PeriodSeries, ForecastError> {
    validate_scenario(scenario)?;
    validate_strategy(params)?;
    let horizon = validate_horizon(i64::from(horizon))?;
    let _span = debug_span!(
        "project",
        scenario = %scenario.name,
        strategy = %params.name,
        horizon
    )
    .entered();

    let n = horizon as usize + 1;
    let delay = params.activation_delay as usize;
    let growth = Decimal::ONE + params.growth_rate;
    let multiplier = params.headcount_multiplier();
    let project_cost_share = Decimal::ONE - params.margin;
    let support_span = params.support_period as usize;
    let support_divisor = Decimal::from(params.support_period);
    let compensation = Decimal::from(params.headcount)
        .checked_mul(params.compensation_per_head)
        .ok_or(ForecastError::Overflow { period: 0 })?;

    // Support owed to each period, filled forward as deals are won.
    let mut support = vec![Decimal::ZERO; n];
    let mut out = PeriodSeries {
        revenue: Vec::with_capacity(n),
        cost: Vec::with_capacity(n),
        cumulative_revenue: Vec::with_capacity(n),
        cumulative_cost: Vec::with_capacity(n),
        profitability: Vec::with_capacity(n),
        new_business_revenue: Vec::with_capacity(n),
        support_revenue: Vec::with_capacity(n),
    };
    let mut factor = Decimal::ONE;
    let mut cum_revenue = Decimal::ZERO;
    let mut cum_cost = Decimal::ZERO;

    for t in 0..n {
        let overflow = || ForecastError::Overflow { period: t };
        if t > 0 {
            factor = factor.checked_mul(growth).ok_or_else(overflow)?;
        }

        let base = if t < delay {
            Decimal::ZERO
        } else {
            new_business_revenue(scenario, params, multiplier, factor).ok_or_else(overflow)?
        };

        let unit = base
            .checked_mul(params.support_rate)
            .and_then(|v| v.checked_div(support_divisor))
            .ok_or_else(overflow)?;
        for owed in support.iter_mut().skip(t).take(support_span) {
            *owed = owed.checked_add(unit).ok_or_else(overflow)?;
        }

        let revenue = base.checked_add(support[t]).ok_or_else(overflow)?;
        let mut cost = base
            .checked_mul(project_cost_share)
            .and_then(|v| v.checked_add(compensation))
            .ok_or_else(overflow)?;
        if t == 0 {
            cost = cost
                .checked_add(params.marketing_budget)
                .ok_or_else(overflow)?;
        }

        cum_revenue = cum_revenue.checked_add(revenue).ok_or_else(overflow)?;
        cum_cost = cum_cost.checked_add(cost).ok_or_else(overflow)?;
        let profit = cum_revenue.checked_sub(cum_cost).ok_or_else(overflow)?;

        out.new_business_revenue.push(base);
        out.support_revenue.push(support[t]);
        out.revenue.push(revenue);
        out.cost.push(cost);
        out.cumulative_revenue.push(cum_revenue);
        out.cumulative_cost.push(cum_cost);
        out.profitability.push(profit);
    }

    debug!(
        total_revenue = %cum_revenue,
        total_cost = %cum_cost,
        "projection complete"
    );
    Ok(out)
}

/// Like [`project`], for a horizon taken from untrusted signed input.
pub fn project_checked(
    scenario: &ScenarioModel,
    params: &StrategyParameters,
    horizon: i64,
) -> Result<PeriodSeries, ForecastError> {
    let horizon = validate_horizon(horizon)?;
    project(scenario, params, horizon)
}

fn new_business_revenue(
    scenario: &ScenarioModel,
    params: &StrategyParameters,
    multiplier: Decimal,
    factor: Decimal,
) -> Option<Decimal> {
    let mut total = Decimal::ZERO;
    for size in ProjectSize::ALL {
        let wins = scenario
            .count(size)
            .checked_mul(multiplier)?
            .checked_mul(factor)?;
        total = total.checked_add(wins.checked_mul(params.revenue_per_size.price(size))?)?;
    }
    Some(total)
}

/// Project every scenario under one strategy into a report, in scenario order.
pub fn project_strategy(
    params: &StrategyParameters,
    scenarios: &[ScenarioModel],
    horizon: u32,
    label_prefix: &str,
) -> Result<ForecastReport, ForecastError> {
    let outputs = scenarios
        .iter()
        .map(|s| project(s, params, horizon).map(|series| (s.name.clone(), series)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ForecastReport::build(
        outputs,
        period_labels(label_prefix, horizon),
    )?)
}

/// Reports produced by one configured run, in configuration order, with the
/// blended report (if any) last.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastRun {
    pub reports: Vec<(String, ForecastReport)>,
}

impl ForecastRun {
    pub fn get(&self, name: &str) -> Option<&ForecastReport> {
        self.reports
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }
}

/// Project every configured strategy and, when configured, their blend.
pub fn run_config(cfg: &ForecastConfig) -> Result<ForecastRun, ForecastError> {
    let mut reports = Vec::with_capacity(cfg.strategies.len() + 1);
    for s in &cfg.strategies {
        let report = project_strategy(&s.parameters, &s.scenarios, cfg.horizon, &cfg.period_label)?;
        info!(
            strategy = %s.parameters.name,
            scenarios = report.len(),
            horizon = cfg.horizon,
            "projected strategy"
        );
        reports.push((s.parameters.name.clone(), report));
    }
    if let Some(b) = &cfg.blend {
        let find = |name: &str| {
            reports
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, r)| r)
                .ok_or_else(|| ForecastError::UnknownStrategy(name.to_string()))
        };
        let blended = combine(find(&b.left)?, find(&b.right)?)?;
        info!(blend = %b.name, left = %b.left, right = %b.right, "blended strategies");
        reports.push((b.name.clone(), blended));
    }
    Ok(ForecastRun { reports })
}
