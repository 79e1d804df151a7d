//! Built-in strategies and scenarios for the direct and partnership models.

use crate::{ScenarioModel, SizePrices, StrategyParameters};
use crate::config::{BlendConfig, ForecastConfig, StrategyConfig};
use rust_decimal::Decimal;

/// Default projection horizon: periods 0 through 4.
pub const DEFAULT_HORIZON: u32 = 4;

fn scenario(name: &str, small: Decimal, medium: Decimal, large: Decimal) -> ScenarioModel {
    ScenarioModel {
        name: name.to_string(),
        small_count: small,
        medium_count: medium,
        large_count: large,
    }
}

/// Direct sales: two salespeople, deal counts scale with headcount, wins
/// start in period 1.
pub fn direct_sales() -> StrategyParameters {
    StrategyParameters {
        name: "Direct".to_string(),
        headcount: 2,
        compensation_per_head: Decimal::new(100_000, 0),
        marketing_budget: Decimal::new(200_000, 0),
        revenue_per_size: SizePrices::new(
            Decimal::new(75_000, 0),
            Decimal::new(100_000, 0),
            Decimal::new(150_000, 0),
        ),
        margin: Decimal::new(3, 1),
        growth_rate: Decimal::new(5, 2),
        support_rate: Decimal::new(20, 2),
        support_period: 5,
        activation_delay: 1,
        scales_with_headcount: true,
    }
}

/// Name of the direct-sales leg that feeds the default "Hybrid" blend.
pub const HYBRID_DIRECT: &str = "Hybrid Direct";

/// The direct leg of the hybrid model: the same channel as
/// [`direct_sales`] run by a single salesperson alongside the partner.
pub fn hybrid_direct_sales() -> StrategyParameters {
    StrategyParameters {
        name: HYBRID_DIRECT.to_string(),
        headcount: 1,
        ..direct_sales()
    }
}

/// Partnership channel: one partner manager, larger deals at lower margin,
/// wins start in period 2.
pub fn partnership() -> StrategyParameters {
    StrategyParameters {
        name: "Partnership".to_string(),
        headcount: 1,
        compensation_per_head: Decimal::new(100_000, 0),
        marketing_budget: Decimal::new(150_000, 0),
        revenue_per_size: SizePrices::new(
            Decimal::new(150_000, 0),
            Decimal::new(200_000, 0),
            Decimal::new(300_000, 0),
        ),
        margin: Decimal::new(15, 2),
        growth_rate: Decimal::new(10, 2),
        support_rate: Decimal::new(20, 2),
        support_period: 5,
        activation_delay: 2,
        scales_with_headcount: false,
    }
}

pub fn direct_scenarios() -> Vec<ScenarioModel> {
    let half = Decimal::new(5, 1);
    vec![
        scenario("Low", Decimal::from(3), Decimal::from(1), half),
        scenario("Medium", Decimal::from(4), Decimal::from(2), half),
        scenario("High", Decimal::from(5), Decimal::from(2), half),
    ]
}

pub fn partnership_scenarios() -> Vec<ScenarioModel> {
    vec![
        scenario("Low", Decimal::from(2), Decimal::from(3), Decimal::from(3)),
        scenario("Medium", Decimal::from(3), Decimal::from(4), Decimal::from(3)),
        scenario("High", Decimal::from(4), Decimal::from(5), Decimal::from(4)),
    ]
}

/// Direct and partnership strategies, plus a "Hybrid" blend of a
/// one-person direct team with the partnership channel.
pub fn default_config() -> ForecastConfig {
    ForecastConfig {
        horizon: DEFAULT_HORIZON,
        period_label: crate::config::DEFAULT_PERIOD_LABEL.to_string(),
        strategies: vec![
            StrategyConfig {
                parameters: direct_sales(),
                scenarios: direct_scenarios(),
            },
            StrategyConfig {
                parameters: partnership(),
                scenarios: partnership_scenarios(),
            },
            StrategyConfig {
                parameters: hybrid_direct_sales(),
                scenarios: direct_scenarios(),
            },
        ],
        blend: Some(BlendConfig {
            name: "Hybrid".to_string(),
            left: HYBRID_DIRECT.to_string(),
            right: "Partnership".to_string(),
        }),
    }
}
