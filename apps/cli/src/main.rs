#![deny(warnings)]

//! Headless CLI: project configured strategies, blend them, and export.

use anyhow::{bail, Context, Result};
use forecast_core::{presets, BlendConfig, ForecastConfig};
use forecast_engine::{run_config, ForecastRun};
use forecast_report::{ForecastReport, ForecastTable};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    horizon: Option<u32>,
    blend: Option<(String, String)>,
    report: Option<String>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    version: bool,
}

fn parse_args<I>(argv: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args::default();
    let mut it = argv.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(it.next().context("--config needs a path")?.into());
            }
            "--horizon" => {
                let v = it.next().context("--horizon needs a value")?;
                args.horizon = Some(v.parse().with_context(|| format!("bad horizon: {v}"))?);
            }
            "--blend" => {
                let v = it.next().context("--blend needs <left>,<right>")?;
                let (l, r) = v
                    .split_once(',')
                    .with_context(|| format!("bad blend: {v}"))?;
                args.blend = Some((l.trim().to_string(), r.trim().to_string()));
            }
            "--report" => args.report = Some(it.next().context("--report needs a name")?),
            "--csv" => args.csv = Some(it.next().context("--csv needs a path")?.into()),
            "--json" => args.json = Some(it.next().context("--json needs a path")?.into()),
            "--version" => args.version = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<ForecastConfig> {
    let mut cfg = match &args.config {
        Some(path) => ForecastConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => presets::default_config(),
    };
    if let Some(h) = args.horizon {
        cfg.horizon = h;
    }
    if let Some((left, right)) = &args.blend {
        cfg.blend = Some(BlendConfig {
            name: format!("{left}+{right}"),
            left: left.clone(),
            right: right.clone(),
        });
    }
    cfg.validate()?;
    Ok(cfg)
}

/// The report to export: the named one, else the last produced (the blend if any).
fn select_report<'a>(
    run: &'a ForecastRun,
    name: Option<&'a str>,
) -> Result<(&'a str, &'a ForecastReport)> {
    match name {
        Some(n) => run
            .get(n)
            .map(|r| (n, r))
            .with_context(|| format!("no report named {n}")),
        None => run
            .reports
            .last()
            .map(|(n, r)| (n.as_str(), r))
            .context("no strategies configured"),
    }
}

fn write_csv(path: &Path, table: &ForecastTable) -> Result<()> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(&table.header)?;
    for row in &table.rows {
        w.write_record(row.to_record())?;
    }
    w.flush()?;
    Ok(())
}

fn print_summary(run: &ForecastRun) {
    for (strategy, report) in &run.reports {
        for s in report.summaries() {
            let breakeven = s
                .breakeven_period
                .and_then(|t| report.period_labels().get(t))
                .map(String::as_str)
                .unwrap_or("never");
            println!(
                "{} | {} | revenue: ${} | cost: ${} | profit: ${} | breakeven: {}",
                strategy,
                s.scenario,
                s.total_revenue.round_dp(2),
                s.total_cost.round_dp(2),
                s.final_profitability.round_dp(2),
                breakeven
            );
        }
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.version {
        println!(
            "gtm-forecast {} ({}, {})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    info!(config = ?args.config, horizon = ?args.horizon, "starting CLI");

    let cfg = load_config(&args)?;
    let run = run_config(&cfg)?;
    print_summary(&run);

    if let Some(path) = &args.csv {
        let (name, report) = select_report(&run, args.report.as_deref())?;
        write_csv(path, &report.to_table())
            .with_context(|| format!("writing {}", path.display()))?;
        info!(report = name, path = %path.display(), "wrote CSV");
    }
    if let Some(path) = &args.json {
        let text = serde_json::to_string_pretty(&run)?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote JSON");
    }
    Ok(())
}
