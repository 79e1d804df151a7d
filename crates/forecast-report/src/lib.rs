#![deny(warnings)]

//! Forecast reports: per-scenario series keyed by name, in registration
//! order, with tabular and chart-ready views for export collaborators.

use forecast_core::PeriodSeries;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

/// Errors produced while assembling a report.
#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    /// Scenario names are join keys and must be unique within a report.
    #[error("duplicate scenario: {0}")]
    DuplicateScenario(String),
    /// Every series must have one value per period label.
    #[error("scenario {scenario} has {actual} periods, expected {expected}")]
    LabelCountMismatch {
        scenario: String,
        expected: usize,
        actual: usize,
    },
    /// A series whose parallel sequences disagree on length.
    #[error("scenario {scenario}: {field} has {actual} periods, expected {expected}")]
    RaggedSeries {
        scenario: String,
        field: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Labels `"{prefix} 0"` through `"{prefix} {horizon}"`.
pub fn period_labels(prefix: &str, horizon: u32) -> Vec<String> {
    (0..=horizon).map(|t| format!("{prefix} {t}")).collect()
}

/// Scenario name to series, in insertion order, plus period labels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastReport {
    period_labels: Vec<String>,
    scenarios: Vec<(String, PeriodSeries)>,
}

impl ForecastReport {
    /// Assemble a report from engine outputs. Order of `outputs` is kept.
    pub fn build<I>(outputs: I, period_labels: Vec<String>) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = (String, PeriodSeries)>,
    {
        let expected = period_labels.len();
        let mut seen = BTreeSet::new();
        let mut scenarios = Vec::new();
        for (name, series) in outputs {
            if !seen.insert(name.clone()) {
                return Err(ReportError::DuplicateScenario(name));
            }
            if series.len() != expected {
                return Err(ReportError::LabelCountMismatch {
                    scenario: name,
                    expected,
                    actual: series.len(),
                });
            }
            if let Some(&(field, actual)) =
                series.field_lengths().iter().find(|&&(_, l)| l != expected)
            {
                return Err(ReportError::RaggedSeries {
                    scenario: name,
                    field,
                    expected,
                    actual,
                });
            }
            scenarios.push((name, series));
        }
        debug!(scenarios = scenarios.len(), periods = expected, "built forecast report");
        Ok(Self {
            period_labels,
            scenarios,
        })
    }

    /// A report of the same shape as `other` with every value zero.
    pub fn zeros_like(other: &ForecastReport) -> Self {
        let n = other.period_count();
        Self {
            period_labels: other.period_labels.clone(),
            scenarios: other
                .scenarios
                .iter()
                .map(|(name, _)| (name.clone(), PeriodSeries::zeros(n)))
                .collect(),
        }
    }

    pub fn period_labels(&self) -> &[String] {
        &self.period_labels
    }

    /// Number of periods (horizon + 1).
    pub fn period_count(&self) -> usize {
        self.period_labels.len()
    }

    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// (scenario, series) pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PeriodSeries)> + '_ {
        self.scenarios.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.scenarios.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, scenario: &str) -> Option<&PeriodSeries> {
        self.scenarios
            .iter()
            .find(|(n, _)| n == scenario)
            .map(|(_, s)| s)
    }

    /// One row per period with `{scenario}_Revenue` and `{scenario}_Cost` columns.
    pub fn to_table(&self) -> ForecastTable {
        let mut header = Vec::with_capacity(1 + 2 * self.scenarios.len());
        header.push("Period".to_string());
        for (name, _) in &self.scenarios {
            header.push(format!("{name}_Revenue"));
            header.push(format!("{name}_Cost"));
        }
        let rows = self
            .period_labels
            .iter()
            .enumerate()
            .map(|(t, label)| TableRow {
                label: label.clone(),
                values: self
                    .scenarios
                    .iter()
                    .flat_map(|(_, s)| [s.revenue[t], s.cost[t]])
                    .collect(),
            })
            .collect();
        ForecastTable { header, rows }
    }

    /// Revenue and cost sequences per scenario, for one subplot each.
    pub fn chart_series(&self) -> Vec<ChartSeries<'_>> {
        self.scenarios
            .iter()
            .map(|(name, s)| ChartSeries {
                scenario: name,
                labels: &self.period_labels,
                revenue: &s.revenue,
                cost: &s.cost,
            })
            .collect()
    }

    /// Headline figures per scenario.
    pub fn summaries(&self) -> Vec<ScenarioSummary> {
        self.scenarios
            .iter()
            .map(|(name, s)| ScenarioSummary {
                scenario: name.clone(),
                total_revenue: s.total_revenue(),
                total_cost: s.total_cost(),
                final_profitability: s.final_profitability(),
                breakeven_period: s.breakeven_period(),
            })
            .collect()
    }
}

/// Row/column view of a report.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastTable {
    pub header: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub label: String,
    pub values: Vec<Decimal>,
}

impl TableRow {
    /// Label followed by the values, as strings.
    pub fn to_record(&self) -> Vec<String> {
        std::iter::once(self.label.clone())
            .chain(self.values.iter().map(|v| v.normalize().to_string()))
            .collect()
    }
}

/// Plain ordered sequences for a plotting collaborator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartSeries<'a> {
    pub scenario: &'a str,
    pub labels: &'a [String],
    pub revenue: &'a [Decimal],
    pub cost: &'a [Decimal],
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub total_revenue: Decimal,
    pub total_cost: Decimal,
    pub final_profitability: Decimal,
    /// First period with non-negative cumulative profitability.
    pub breakeven_period: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn series(values: &[i64]) -> PeriodSeries {
        let mut s = PeriodSeries::zeros(values.len());
        let mut acc = Decimal::ZERO;
        for (t, v) in values.iter().enumerate() {
            let v = Decimal::from(*v);
            acc += v;
            s.revenue[t] = v;
            s.new_business_revenue[t] = v;
            s.cumulative_revenue[t] = acc;
            s.profitability[t] = acc;
        }
        s
    }

    #[test]
    fn labels_cover_period_zero_through_horizon() {
        assert_eq!(period_labels("Year", 2), vec!["Year 0", "Year 1", "Year 2"]);
        assert_eq!(period_labels("Period", 0), vec!["Period 0"]);
    }

    #[test]
    fn build_keeps_insertion_order() {
        let labels = period_labels("Year", 1);
        let report = ForecastReport::build(
            vec![
                ("Low".to_string(), series(&[1, 2])),
                ("High".to_string(), series(&[3, 4])),
                ("Medium".to_string(), series(&[5, 6])),
            ],
            labels,
        )
        .unwrap();
        let names: Vec<_> = report.scenario_names().collect();
        assert_eq!(names, vec!["Low", "High", "Medium"]);
        assert_eq!(report.get("High").unwrap().revenue[1], Decimal::from(4));
        assert!(report.get("Missing").is_none());
    }

    #[test]
    fn build_rejects_duplicates_and_length_mismatch() {
        let labels = period_labels("Year", 1);
        let dup = ForecastReport::build(
            vec![
                ("Low".to_string(), series(&[1, 2])),
                ("Low".to_string(), series(&[1, 2])),
            ],
            labels.clone(),
        );
        assert_eq!(dup, Err(ReportError::DuplicateScenario("Low".to_string())));
        let short = ForecastReport::build(vec![("Low".to_string(), series(&[1]))], labels);
        assert_eq!(
            short,
            Err(ReportError::LabelCountMismatch {
                scenario: "Low".to_string(),
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn build_rejects_series_with_a_short_field() {
        let mut s = PeriodSeries::zeros(2);
        s.cost.pop();
        let ragged = ForecastReport::build(vec![("Low".to_string(), s)], period_labels("Year", 1));
        assert_eq!(
            ragged,
            Err(ReportError::RaggedSeries {
                scenario: "Low".to_string(),
                field: "cost",
                expected: 2,
                actual: 1
            })
        );

        let mut s = PeriodSeries::zeros(2);
        s.support_revenue.push(Decimal::ONE);
        let long = ForecastReport::build(vec![("Low".to_string(), s)], period_labels("Year", 1));
        assert!(matches!(
            long,
            Err(ReportError::RaggedSeries { field: "support_revenue", actual: 3, .. })
        ));
    }

    #[test]
    fn table_has_revenue_and_cost_columns_per_scenario() {
        let mut low = series(&[10, 20]);
        low.cost = vec![Decimal::from(7), Decimal::from(8)];
        let report = ForecastReport::build(
            vec![
                ("Low".to_string(), low),
                ("High".to_string(), series(&[30, 40])),
            ],
            period_labels("Year", 1),
        )
        .unwrap();
        let table = report.to_table();
        assert_eq!(
            table.header,
            vec!["Period", "Low_Revenue", "Low_Cost", "High_Revenue", "High_Cost"]
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].to_record(), vec!["Year 1", "20", "8", "40", "0"]);
    }

    #[test]
    fn chart_series_borrow_report_sequences() {
        let report = ForecastReport::build(
            vec![("Low".to_string(), series(&[1, 2, 3]))],
            period_labels("Year", 2),
        )
        .unwrap();
        let charts = report.chart_series();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].scenario, "Low");
        assert_eq!(charts[0].labels.len(), 3);
        assert_eq!(charts[0].revenue[2], Decimal::from(3));
    }

    #[test]
    fn summaries_report_totals_and_breakeven() {
        let mut s = series(&[0, 5, 10]);
        s.cost = vec![Decimal::from(8), Decimal::ZERO, Decimal::ZERO];
        s.cumulative_cost = vec![Decimal::from(8); 3];
        s.profitability = vec![Decimal::from(-8), Decimal::from(-3), Decimal::from(7)];
        let report =
            ForecastReport::build(vec![("Low".to_string(), s)], period_labels("Year", 2)).unwrap();
        let summary = &report.summaries()[0];
        assert_eq!(summary.total_revenue, Decimal::from(15));
        assert_eq!(summary.total_cost, Decimal::from(8));
        assert_eq!(summary.final_profitability, Decimal::from(7));
        assert_eq!(summary.breakeven_period, Some(2));
    }

    #[test]
    fn zeros_like_keeps_shape() {
        let report = ForecastReport::build(
            vec![("Low".to_string(), series(&[1, 2]))],
            period_labels("Year", 1),
        )
        .unwrap();
        let z = ForecastReport::zeros_like(&report);
        assert_eq!(z.period_labels(), report.period_labels());
        assert_eq!(z.get("Low").unwrap(), &PeriodSeries::zeros(2));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = ForecastReport::build(
            vec![("Low".to_string(), series(&[1]))],
            period_labels("Year", 0),
        )
        .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["period_labels"][0], "Year 0");
        assert_eq!(json["scenarios"][0][0], "Low");
    }

    proptest! {
        #[test]
        fn table_shape_matches_report(n_scen in 1usize..6, horizon in 0u32..10) {
            let outputs = (0..n_scen)
                .map(|i| (format!("S{i}"), PeriodSeries::zeros(horizon as usize + 1)));
            let report = ForecastReport::build(outputs, period_labels("Year", horizon)).unwrap();
            let table = report.to_table();
            prop_assert_eq!(table.header.len(), 1 + 2 * n_scen);
            prop_assert_eq!(table.rows.len(), horizon as usize + 1);
            for row in &table.rows {
                prop_assert_eq!(row.values.len(), 2 * n_scen);
            }
        }
    }
}
