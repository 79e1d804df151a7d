#![deny(warnings)]

//! Core domain models and invariants for GTM Forecast.
//!
//! This crate defines the serializable inputs of a projection (demand
//! scenarios and strategy parameters), the per-scenario output series, and
//! validation helpers that guarantee the invariants the engine relies on.

pub mod config;
pub mod presets;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use config::{BlendConfig, ConfigError, ForecastConfig, StrategyConfig};

/// Largest horizon a projection accepts. Every series holds `horizon + 1`
/// values, so this bounds the memory of a single projection.
pub const MAX_HORIZON: u32 = 1_000;

/// Project size buckets used for both deal counts and pricing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectSize {
    /// Small engagement.
    Small,
    /// Medium engagement.
    Medium,
    /// Large engagement.
    Large,
}

impl ProjectSize {
    /// All sizes in canonical order.
    pub const ALL: [ProjectSize; 3] = [ProjectSize::Small, ProjectSize::Medium, ProjectSize::Large];
}

impl fmt::Display for ProjectSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectSize::Small => "small",
            ProjectSize::Medium => "medium",
            ProjectSize::Large => "large",
        };
        f.write_str(s)
    }
}

/// A named demand level expressed as expected project wins per period.
///
/// Counts are decimals because they are averages (e.g. half a large deal
/// per salesperson per year), not strict integers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioModel {
    /// Scenario name, e.g. "Low". Used as the join key when blending.
    pub name: String,
    /// Expected small project wins per period (>= 0).
    #[serde(rename = "small")]
    pub small_count: Decimal,
    /// Expected medium project wins per period (>= 0).
    #[serde(rename = "medium")]
    pub medium_count: Decimal,
    /// Expected large project wins per period (>= 0).
    #[serde(rename = "large")]
    pub large_count: Decimal,
}

impl ScenarioModel {
    /// Build a validated scenario.
    pub fn new(
        name: impl Into<String>,
        small_count: Decimal,
        medium_count: Decimal,
        large_count: Decimal,
    ) -> Result<Self, ValidationError> {
        let scenario = Self {
            name: name.into(),
            small_count,
            medium_count,
            large_count,
        };
        validate_scenario(&scenario)?;
        Ok(scenario)
    }

    /// Expected wins for one project size.
    pub fn count(&self, size: ProjectSize) -> Decimal {
        match size {
            ProjectSize::Small => self.small_count,
            ProjectSize::Medium => self.medium_count,
            ProjectSize::Large => self.large_count,
        }
    }
}

/// Revenue earned per won project, by size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizePrices {
    pub small: Decimal,
    pub medium: Decimal,
    pub large: Decimal,
}

impl SizePrices {
    pub fn new(small: Decimal, medium: Decimal, large: Decimal) -> Self {
        Self {
            small,
            medium,
            large,
        }
    }

    /// Price for one project size.
    pub fn price(&self, size: ProjectSize) -> Decimal {
        match size {
            ProjectSize::Small => self.small,
            ProjectSize::Medium => self.medium,
            ProjectSize::Large => self.large,
        }
    }
}

/// Cost and pricing structure of one go-to-market strategy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyParameters {
    /// Strategy label, e.g. "Direct" or "Partnership".
    pub name: String,
    /// Number of salespeople (> 0).
    pub headcount: u32,
    /// Annual compensation per salesperson (>= 0).
    pub compensation_per_head: Decimal,
    /// Marketing spend charged once in period 0 (>= 0).
    pub marketing_budget: Decimal,
    /// Revenue per won project by size (each >= 0).
    pub revenue_per_size: SizePrices,
    /// Fraction of project revenue kept after direct project cost, in [0,1].
    pub margin: Decimal,
    /// Organic growth per period applied to deal counts (> -1).
    pub growth_rate: Decimal,
    /// Fraction of a period's new-project revenue paid back as support, in [0,1].
    pub support_rate: Decimal,
    /// Number of periods the support annuity is spread over (>= 1).
    pub support_period: u32,
    /// Leading periods in which no new projects are won.
    #[serde(default)]
    pub activation_delay: u32,
    /// Whether deal counts scale with headcount (direct sales) or not (partner channel).
    #[serde(default = "default_scales_with_headcount")]
    pub scales_with_headcount: bool,
}

fn default_scales_with_headcount() -> bool {
    true
}

impl StrategyParameters {
    /// Validate and return the parameters unchanged.
    pub fn validated(self) -> Result<Self, ValidationError> {
        validate_strategy(&self)?;
        Ok(self)
    }

    /// Multiplier applied to scenario deal counts.
    pub fn headcount_multiplier(&self) -> Decimal {
        if self.scales_with_headcount {
            Decimal::from(self.headcount)
        } else {
            Decimal::ONE
        }
    }

    /// Fixed compensation charged every period.
    pub fn total_compensation(&self) -> Decimal {
        Decimal::from(self.headcount) * self.compensation_per_head
    }
}

/// Period-indexed output of one projection. All vectors have the same length.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSeries {
    /// Total revenue per period (new business plus support).
    pub revenue: Vec<Decimal>,
    /// Total cost per period.
    pub cost: Vec<Decimal>,
    /// Running sum of `revenue`.
    pub cumulative_revenue: Vec<Decimal>,
    /// Running sum of `cost`.
    pub cumulative_cost: Vec<Decimal>,
    /// `cumulative_revenue - cumulative_cost`.
    pub profitability: Vec<Decimal>,
    /// Revenue from projects won in the period.
    pub new_business_revenue: Vec<Decimal>,
    /// Support annuity revenue recognised in the period.
    pub support_revenue: Vec<Decimal>,
}

impl PeriodSeries {
    /// An all-zero series with `len` periods.
    pub fn zeros(len: usize) -> Self {
        let z = vec![Decimal::ZERO; len];
        Self {
            revenue: z.clone(),
            cost: z.clone(),
            cumulative_revenue: z.clone(),
            cumulative_cost: z.clone(),
            profitability: z.clone(),
            new_business_revenue: z.clone(),
            support_revenue: z,
        }
    }

    /// Number of periods (horizon + 1).
    pub fn len(&self) -> usize {
        self.revenue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty()
    }

    /// Last period index, or `None` for an empty series.
    pub fn horizon(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    pub fn total_revenue(&self) -> Decimal {
        self.cumulative_revenue.last().copied().unwrap_or(Decimal::ZERO)
    }

    pub fn total_cost(&self) -> Decimal {
        self.cumulative_cost.last().copied().unwrap_or(Decimal::ZERO)
    }

    pub fn final_profitability(&self) -> Decimal {
        self.profitability.last().copied().unwrap_or(Decimal::ZERO)
    }

    /// First period whose cumulative profitability is non-negative.
    pub fn breakeven_period(&self) -> Option<usize> {
        self.profitability.iter().position(|p| *p >= Decimal::ZERO)
    }

    /// Length of every parallel sequence, keyed by field name.
    pub fn field_lengths(&self) -> [(&'static str, usize); 7] {
        [
            ("revenue", self.revenue.len()),
            ("cost", self.cost.len()),
            ("cumulative_revenue", self.cumulative_revenue.len()),
            ("cumulative_cost", self.cumulative_cost.len()),
            ("profitability", self.profitability.len()),
            ("new_business_revenue", self.new_business_revenue.len()),
            ("support_revenue", self.support_revenue.len()),
        ]
    }

    /// Check the parallel-length and accumulation invariants. A series whose
    /// sums overflow `Decimal` fails the check.
    pub fn check_invariants(&self) -> bool {
        let n = self.len();
        if self.field_lengths().iter().any(|&(_, l)| l != n) {
            return false;
        }
        let mut rev = Decimal::ZERO;
        let mut cost = Decimal::ZERO;
        for t in 0..n {
            match (rev.checked_add(self.revenue[t]), cost.checked_add(self.cost[t])) {
                (Some(r), Some(c)) => {
                    rev = r;
                    cost = c;
                }
                _ => return false,
            }
            let parts = self.new_business_revenue[t].checked_add(self.support_revenue[t]);
            if self.cumulative_revenue[t] != rev
                || self.cumulative_cost[t] != cost
                || Some(self.profitability[t]) != rev.checked_sub(cost)
                || Some(self.revenue[t]) != parts
            {
                return false;
            }
        }
        true
    }
}

/// Validation errors for forecast inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Scenario and strategy names must be non-empty.
    #[error("name must not be empty")]
    EmptyName,
    /// Deal counts must be non-negative.
    #[error("{size} count must be >= 0, got {value}")]
    NegativeCount { size: ProjectSize, value: Decimal },
    /// Prices, compensation and budgets must be non-negative.
    #[error("negative monetary value for {0}")]
    NegativeMoney(&'static str),
    /// Margin must be within [0, 1].
    #[error("margin must be within [0,1], got {0}")]
    MarginOutOfRange(Decimal),
    /// Support rate must be within [0, 1].
    #[error("support rate must be within [0,1], got {0}")]
    SupportRateOutOfRange(Decimal),
    /// Growth rate must be strictly greater than -1.
    #[error("growth rate must be > -1, got {0}")]
    GrowthRateTooLow(Decimal),
    /// Headcount must be at least one.
    #[error("headcount must be > 0")]
    ZeroHeadcount,
    /// Support period must be at least one period.
    #[error("support period must be >= 1")]
    ZeroSupportPeriod,
    /// Horizon must be non-negative.
    #[error("horizon must be >= 0, got {0}")]
    NegativeHorizon(i64),
    /// Horizon exceeds [`MAX_HORIZON`].
    #[error("horizon {0} exceeds the maximum of {max}", max = MAX_HORIZON)]
    HorizonTooLarge(i64),
}

/// Validate a demand scenario.
pub fn validate_scenario(s: &ScenarioModel) -> Result<(), ValidationError> {
    if s.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    for size in ProjectSize::ALL {
        let value = s.count(size);
        if value < Decimal::ZERO {
            return Err(ValidationError::NegativeCount { size, value });
        }
    }
    Ok(())
}

/// Validate per-size prices.
pub fn validate_prices(p: &SizePrices) -> Result<(), ValidationError> {
    if ProjectSize::ALL.iter().any(|&s| p.price(s) < Decimal::ZERO) {
        return Err(ValidationError::NegativeMoney("revenue_per_size"));
    }
    Ok(())
}

/// Validate a strategy parameter bundle.
pub fn validate_strategy(p: &StrategyParameters) -> Result<(), ValidationError> {
    if p.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if p.headcount == 0 {
        return Err(ValidationError::ZeroHeadcount);
    }
    if p.compensation_per_head < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("compensation_per_head"));
    }
    if p.marketing_budget < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("marketing_budget"));
    }
    validate_prices(&p.revenue_per_size)?;
    if p.margin < Decimal::ZERO || p.margin > Decimal::ONE {
        return Err(ValidationError::MarginOutOfRange(p.margin));
    }
    if p.support_rate < Decimal::ZERO || p.support_rate > Decimal::ONE {
        return Err(ValidationError::SupportRateOutOfRange(p.support_rate));
    }
    if p.growth_rate <= Decimal::NEGATIVE_ONE {
        return Err(ValidationError::GrowthRateTooLow(p.growth_rate));
    }
    if p.support_period == 0 {
        return Err(ValidationError::ZeroSupportPeriod);
    }
    Ok(())
}

/// Convert a signed horizon from untrusted input, bounded by [`MAX_HORIZON`].
pub fn validate_horizon(horizon: i64) -> Result<u32, ValidationError> {
    if horizon < 0 {
        return Err(ValidationError::NegativeHorizon(horizon));
    }
    match u32::try_from(horizon) {
        Ok(h) if h <= MAX_HORIZON => Ok(h),
        _ => Err(ValidationError::HorizonTooLarge(horizon)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strategy() -> StrategyParameters {
        presets::direct_sales()
    }

    #[test]
    fn scenario_new_rejects_negative_counts() {
        let err = ScenarioModel::new("Low", Decimal::ONE, Decimal::new(-1, 0), Decimal::ZERO)
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NegativeCount {
                size: ProjectSize::Medium,
                value: Decimal::new(-1, 0)
            }
        );
        assert!(ScenarioModel::new(" ", Decimal::ONE, Decimal::ONE, Decimal::ONE).is_err());
    }

    #[test]
    fn margin_outside_unit_interval_is_rejected() {
        let mut p = strategy();
        p.margin = Decimal::new(12, 1);
        assert_eq!(
            validate_strategy(&p),
            Err(ValidationError::MarginOutOfRange(Decimal::new(12, 1)))
        );
        p.margin = Decimal::new(-1, 2);
        assert!(validate_strategy(&p).is_err());
    }

    #[test]
    fn growth_rate_at_or_below_minus_one_is_rejected() {
        let mut p = strategy();
        p.growth_rate = Decimal::NEGATIVE_ONE;
        assert!(matches!(
            validate_strategy(&p),
            Err(ValidationError::GrowthRateTooLow(_))
        ));
        p.growth_rate = Decimal::new(-5, 1);
        assert!(validate_strategy(&p).is_ok());
    }

    #[test]
    fn zero_headcount_and_support_period_are_rejected() {
        let mut p = strategy();
        p.headcount = 0;
        assert_eq!(validate_strategy(&p), Err(ValidationError::ZeroHeadcount));
        let mut p = strategy();
        p.support_period = 0;
        assert_eq!(validate_strategy(&p), Err(ValidationError::ZeroSupportPeriod));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut p = strategy();
        p.revenue_per_size.large = Decimal::new(-1, 0);
        assert_eq!(
            validate_strategy(&p),
            Err(ValidationError::NegativeMoney("revenue_per_size"))
        );
    }

    #[test]
    fn headcount_multiplier_respects_scaling_flag() {
        let mut p = strategy();
        p.headcount = 3;
        assert_eq!(p.headcount_multiplier(), Decimal::new(3, 0));
        p.scales_with_headcount = false;
        assert_eq!(p.headcount_multiplier(), Decimal::ONE);
        let p = p.validated().unwrap();
        assert_eq!(p.total_compensation(), Decimal::new(300_000, 0));
    }

    #[test]
    fn negative_horizon_is_rejected() {
        assert_eq!(validate_horizon(4), Ok(4));
        assert_eq!(
            validate_horizon(-1),
            Err(ValidationError::NegativeHorizon(-1))
        );
        assert_eq!(
            validate_horizon(i64::MAX),
            Err(ValidationError::HorizonTooLarge(i64::MAX))
        );
    }

    #[test]
    fn horizon_is_capped() {
        let max = i64::from(MAX_HORIZON);
        assert_eq!(validate_horizon(max), Ok(MAX_HORIZON));
        assert_eq!(
            validate_horizon(max + 1),
            Err(ValidationError::HorizonTooLarge(max + 1))
        );
        assert_eq!(
            validate_horizon(i64::from(u32::MAX)),
            Err(ValidationError::HorizonTooLarge(i64::from(u32::MAX)))
        );
    }

    #[test]
    fn strategy_serde_defaults() {
        let json = r#"{
            "name": "Direct",
            "headcount": 2,
            "compensation_per_head": 100000,
            "marketing_budget": 200000,
            "revenue_per_size": {"small": 75000, "medium": 100000, "large": 150000},
            "margin": "0.3",
            "growth_rate": "0.05",
            "support_rate": "0.2",
            "support_period": 5
        }"#;
        let p: StrategyParameters = serde_json::from_str(json).unwrap();
        assert_eq!(p.activation_delay, 0);
        assert!(p.scales_with_headcount);
        assert!(validate_strategy(&p).is_ok());
    }

    #[test]
    fn zeros_series_satisfies_invariants() {
        let s = PeriodSeries::zeros(5);
        assert_eq!(s.len(), 5);
        assert_eq!(s.horizon(), Some(4));
        assert!(s.check_invariants());
        assert_eq!(s.breakeven_period(), Some(0));
        assert_eq!(PeriodSeries::default().horizon(), None);
    }

    #[test]
    fn overflowing_sums_fail_invariants_without_panicking() {
        let mut s = PeriodSeries::zeros(2);
        s.revenue = vec![Decimal::MAX, Decimal::MAX];
        s.cumulative_revenue = vec![Decimal::MAX, Decimal::MAX];
        s.profitability = vec![Decimal::MAX, Decimal::MAX];
        s.new_business_revenue = vec![Decimal::MAX, Decimal::MAX];
        assert!(!s.check_invariants());

        let mut s = PeriodSeries::zeros(1);
        s.new_business_revenue[0] = Decimal::MAX;
        s.support_revenue[0] = Decimal::MAX;
        assert!(!s.check_invariants());
    }

    #[test]
    fn ragged_series_fails_invariants() {
        let mut s = PeriodSeries::zeros(3);
        s.support_revenue.pop();
        assert!(!s.check_invariants());
        assert_eq!(s.field_lengths()[6], ("support_revenue", 2));
    }

    proptest! {
        #[test]
        fn non_negative_counts_validate(s in 0i64..1_000, m in 0i64..1_000, l in 0i64..1_000) {
            let sc = ScenarioModel::new(
                "Seg",
                Decimal::new(s, 1),
                Decimal::new(m, 1),
                Decimal::new(l, 1),
            );
            prop_assert!(sc.is_ok());
        }

        #[test]
        fn margin_in_unit_interval_validates(pct in 0i64..=100) {
            let mut p = presets::direct_sales();
            p.margin = Decimal::new(pct, 2);
            prop_assert!(validate_strategy(&p).is_ok());
        }
    }
}
