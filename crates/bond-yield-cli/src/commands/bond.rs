use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, ValueEnum};
use serde_json::Value;
use std::time::Instant;
use tracing::debug;

use bond_yield_core::fixed_income::{
    analyze_bond, generate_cash_flow_schedule, price_at_yield, solve_ytm_for_periods,
    validate_bond_input, validate_solver_config, BondInput, BondRequest, CouponFrequency,
    PeriodDecomposition, PriceAtYieldInput, SolverConfig,
};
use bond_yield_core::with_metadata;

use crate::input;

/// Coupon frequency flag
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Annual,
    SemiAnnual,
}

impl From<FrequencyArg> for CouponFrequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Annual => CouponFrequency::Annual,
            FrequencyArg::SemiAnnual => CouponFrequency::SemiAnnual,
        }
    }
}

/// Bond terms shared by the metrics, ytm and schedule commands
#[derive(Args)]
pub struct BondArgs {
    /// Face (par) value (e.g. 1000)
    #[arg(long)]
    pub face_value: Option<f64>,

    /// Annual coupon rate in percent (e.g. 5 for 5%)
    #[arg(long, alias = "coupon-rate")]
    pub annual_coupon_rate: Option<f64>,

    /// Current market price
    #[arg(long)]
    pub market_price: Option<f64>,

    /// Years to maturity (whole coupon periods)
    #[arg(long, alias = "years")]
    pub years_to_maturity: Option<f64>,

    /// Coupon frequency
    #[arg(long, value_enum, default_value = "annual")]
    pub frequency: FrequencyArg,

    /// Schedule start, RFC 3339 or YYYY-MM-DD (defaults to now)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Override the bisection iteration cap
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Override the absolute price tolerance
    #[arg(long)]
    pub abs_tolerance: Option<f64>,

    /// Override the relative price tolerance
    #[arg(long)]
    pub rel_tolerance: Option<f64>,

    /// Path to JSON input file, or - for stdin (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for pricing a bond at a quoted yield
#[derive(Args)]
pub struct PriceArgs {
    /// Face (par) value
    #[arg(long)]
    pub face_value: Option<f64>,

    /// Annual coupon rate in percent
    #[arg(long, alias = "coupon-rate")]
    pub annual_coupon_rate: Option<f64>,

    /// Years to maturity (whole coupon periods)
    #[arg(long, alias = "years")]
    pub years_to_maturity: Option<f64>,

    /// Coupon frequency
    #[arg(long, value_enum, default_value = "annual")]
    pub frequency: FrequencyArg,

    /// Annual yield in percent
    #[arg(long = "yield", alias = "annual-yield", allow_hyphen_values = true)]
    pub annual_yield: Option<f64>,

    /// Path to JSON input file, or - for stdin (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_metrics(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(&args)?;
    let result = analyze_bond(&request, Utc::now())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_ytm(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let request = resolve_request(&args)?;
    validate_bond_input(&request.bond)?;
    validate_solver_config(&request.solver)?;

    let periods = PeriodDecomposition::from_input(&request.bond);
    let solution = solve_ytm_for_periods(
        request.bond.face_value,
        request.bond.market_price,
        &periods,
        &request.solver,
    )?;

    let result = with_metadata(
        "Bisection yield to maturity",
        &request.solver,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        solution,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: BondArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = resolve_request(&args)?;
    validate_bond_input(&request.bond)?;

    let start = request.start_date.unwrap_or_else(Utc::now);
    let schedule = generate_cash_flow_schedule(&request.bond, start)?;
    Ok(serde_json::to_value(schedule)?)
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let price_input: PriceAtYieldInput =
        if let Some(parsed) = input::read_json_input(args.input.as_deref())? {
            parsed
        } else {
            PriceAtYieldInput {
                face_value: args
                    .face_value
                    .ok_or("--face-value is required (or provide --input)")?,
                annual_coupon_rate: args
                    .annual_coupon_rate
                    .ok_or("--annual-coupon-rate is required (or provide --input)")?,
                years_to_maturity: args
                    .years_to_maturity
                    .ok_or("--years-to-maturity is required (or provide --input)")?,
                coupon_frequency: args.frequency.into(),
                annual_yield: args
                    .annual_yield
                    .ok_or("--yield is required (or provide --input)")?,
            }
        };
    let result = price_at_yield(&price_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Build the request from JSON or flags; tolerance and start-date flags
/// apply on top of either source.
fn resolve_request(args: &BondArgs) -> Result<BondRequest, Box<dyn std::error::Error>> {
    let mut request: BondRequest =
        if let Some(parsed) = input::read_json_input(args.input.as_deref())? {
            parsed
        } else {
            BondRequest {
                bond: BondInput {
                    face_value: args
                        .face_value
                        .ok_or("--face-value is required (or provide --input)")?,
                    annual_coupon_rate: args
                        .annual_coupon_rate
                        .ok_or("--annual-coupon-rate is required (or provide --input)")?,
                    market_price: args
                        .market_price
                        .ok_or("--market-price is required (or provide --input)")?,
                    years_to_maturity: args
                        .years_to_maturity
                        .ok_or("--years-to-maturity is required (or provide --input)")?,
                    coupon_frequency: args.frequency.into(),
                },
                start_date: None,
                solver: SolverConfig::default(),
            }
        };

    if let Some(ref raw) = args.start_date {
        request.start_date = Some(parse_start_date(raw)?);
    }
    if let Some(n) = args.max_iterations {
        request.solver.max_iterations = n;
    }
    if let Some(tol) = args.abs_tolerance {
        request.solver.abs_tolerance = tol;
    }
    if let Some(tol) = args.rel_tolerance {
        request.solver.rel_tolerance = tol;
    }

    debug!(
        frequency = %request.bond.coupon_frequency,
        max_iterations = request.solver.max_iterations,
        "resolved bond request"
    );
    Ok(request)
}

fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("--start-date '{raw}' is not RFC 3339 or YYYY-MM-DD"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| format!("--start-date '{raw}' has no midnight"))?;
    Ok(Utc.from_utc_datetime(&midnight))
}
